use axum::Json;
use serde::Serialize;

use super::menu::DEFAULT_MENU;
use crate::modules::auth::{model::Role, AuthUser};
use crate::services::authorization::{filter_tree, permissions_for, MenuNode, PermissionSet};

#[derive(Debug, Serialize)]
pub struct PermissionsResponse {
    pub role: Role,
    pub permissions: PermissionSet,
}

/// Navigation tree pruned to what the caller's role may see.
pub async fn menu(AuthUser(identity): AuthUser) -> Json<Vec<MenuNode>> {
    Json(filter_tree(&DEFAULT_MENU, &permissions_for(identity.role)))
}

pub async fn permissions(AuthUser(identity): AuthUser) -> Json<PermissionsResponse> {
    Json(PermissionsResponse {
        role: identity.role,
        permissions: permissions_for(identity.role),
    })
}
