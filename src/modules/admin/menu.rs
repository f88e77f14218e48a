use lazy_static::lazy_static;

use crate::services::authorization::MenuNode;

fn leaf(title: &str, icon: Option<&str>, url: &str, permission: &str) -> MenuNode {
    MenuNode::Leaf {
        title: title.to_string(),
        icon: icon.map(str::to_string),
        url: url.to_string(),
        permission: Some(permission.to_string()),
    }
}

fn section(title: &str, icon: &str, permission: &str, children: Vec<MenuNode>) -> MenuNode {
    MenuNode::Container {
        title: title.to_string(),
        icon: Some(icon.to_string()),
        permission: Some(permission.to_string()),
        children,
    }
}

lazy_static! {
    /// Admin dashboard navigation before permission filtering.
    pub static ref DEFAULT_MENU: Vec<MenuNode> = vec![
        leaf("Dashboard", Some("tachometer-alt"), "dashboard.html", "dashboard.view"),
        leaf("Users", Some("users"), "users.html", "users.manage"),
        leaf("Roles & Permissions", Some("user-shield"), "roles.html", "roles.manage"),
        section(
            "Content",
            "file-alt",
            "content.manage",
            vec![
                leaf("Pages", None, "pages.html", "pages.manage"),
                leaf("Media", None, "media.html", "media.manage"),
                leaf("Menus", None, "menus.html", "menus.manage"),
                leaf("Email Templates", None, "email-templates.html", "email_templates.manage"),
            ],
        ),
        section(
            "Waste Management",
            "trash-alt",
            "waste.manage",
            vec![
                leaf("Pickup Requests", None, "pickups.html", "pickups.manage"),
                leaf("Waste Categories", None, "waste-categories.html", "categories.manage"),
                leaf("Disposal Sites", None, "disposal-sites.html", "sites.manage"),
            ],
        ),
        section(
            "Reports",
            "chart-bar",
            "reports.view",
            vec![
                leaf("User Activity", None, "reports/activity.html", "reports.activity"),
                leaf("Waste Analytics", None, "reports/waste.html", "reports.waste"),
                leaf("Financial Reports", None, "reports/financial.html", "reports.financial"),
            ],
        ),
        section(
            "Settings",
            "cog",
            "settings.manage",
            vec![
                leaf("General", None, "settings/general.html", "settings.general"),
                leaf("Email", None, "settings/email.html", "settings.email"),
                leaf("Security", None, "settings/security.html", "settings.security"),
                leaf("Backup", None, "settings/backup.html", "settings.backup"),
                leaf("API", None, "settings/api.html", "settings.api"),
                leaf("System", None, "settings/system.html", "settings.system"),
            ],
        ),
    ];
}
