use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::error::ApiError;
use crate::modules::auth::model::{Identity, Role};

pub const WILDCARD: &str = "*";

lazy_static! {
    static ref ROLE_PERMISSIONS: HashMap<Role, Vec<&'static str>> = HashMap::from([
        (Role::SuperAdmin, vec![WILDCARD]),
        (
            Role::Admin,
            vec![
                "users.manage",
                "roles.manage",
                "settings.manage",
                "content.manage",
                "media.manage",
            ],
        ),
        (Role::Editor, vec!["content.manage", "media.manage"]),
        (Role::Viewer, vec!["content.view", "reports.view"]),
    ]);
}

// =============================================================================
// PERMISSION SET
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<String>);

impl PermissionSet {
    pub fn new<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(permissions.into_iter().map(Into::into).collect())
    }

    pub fn is_wildcard(&self) -> bool {
        self.0.contains(WILDCARD)
    }

    pub fn contains(&self, permission: &str) -> bool {
        self.0.contains(permission)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Roles missing from the table get nothing.
pub fn permissions_for(role: Role) -> PermissionSet {
    ROLE_PERMISSIONS
        .get(&role)
        .map(|perms| PermissionSet::new(perms.iter().copied()))
        .unwrap_or_default()
}

/// Lookup by role name; an unknown name is denied like an unlisted role.
pub fn permissions_for_name(role: &str) -> PermissionSet {
    role.parse::<Role>()
        .map(permissions_for)
        .unwrap_or_default()
}

/// Wildcard or exact membership. No prefix or hierarchy matching.
pub fn can_access(permissions: &PermissionSet, required: &str) -> bool {
    permissions.is_wildcard() || permissions.contains(required)
}

/// Role gate. Independent of permissions: a wildcard holder still needs a
/// listed role.
pub fn authorize(identity: &Identity, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&identity.role) {
        return Ok(());
    }
    tracing::warn!(
        "Role {} denied for account {} (allowed: {:?})",
        identity.role,
        identity.id,
        allowed
    );
    Err(ApiError::Forbidden(format!(
        "User role {} is not authorized to access this route",
        identity.role
    )))
}

// =============================================================================
// NAVIGATION TREE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MenuNode {
    Leaf {
        title: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        permission: Option<String>,
    },
    Container {
        title: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        permission: Option<String>,
        children: Vec<MenuNode>,
    },
}

impl MenuNode {
    pub fn title(&self) -> &str {
        match self {
            MenuNode::Leaf { title, .. } | MenuNode::Container { title, .. } => title,
        }
    }

    fn permission(&self) -> Option<&str> {
        match self {
            MenuNode::Leaf { permission, .. } | MenuNode::Container { permission, .. } => {
                permission.as_deref()
            }
        }
    }
}

/// Prunes nodes the permission set cannot see. A container survives when its
/// own permission is held (or absent) or when any child survives; a surviving
/// container keeps only its surviving children.
pub fn filter_tree(nodes: &[MenuNode], permissions: &PermissionSet) -> Vec<MenuNode> {
    if permissions.is_wildcard() {
        return nodes.to_vec();
    }

    nodes
        .iter()
        .filter_map(|node| {
            let own_access = node
                .permission()
                .map_or(true, |p| permissions.contains(p));

            match node {
                MenuNode::Leaf { .. } => own_access.then(|| node.clone()),
                MenuNode::Container {
                    title,
                    icon,
                    permission,
                    children,
                } => {
                    let visible = filter_tree(children, permissions);
                    (own_access || !visible.is_empty()).then(|| MenuNode::Container {
                        title: title.clone(),
                        icon: icon.clone(),
                        permission: permission.clone(),
                        children: visible,
                    })
                }
            }
        })
        .collect()
}
