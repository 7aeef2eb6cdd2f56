// common/src/models/user.rs
use serde::{Deserialize, Serialize};

/// An admin panel user record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub discord_id: Option<String>,
    #[serde(default)]
    pub role_id: Option<String>,
    #[serde(default)]
    pub status: UserStatus,
    /// Per-user permission overrides on top of the role's set
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub last_login: Option<String>,
    #[serde(default)]
    pub require_password_change: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

/// A role granting a set of permissions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    /// Raw permission strings as stored; echoed back untouched on writes
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub can_invite_users: bool,
    #[serde(default)]
    pub requires_approval: bool,
}

/// The closed permission vocabulary the admin UI understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ManageUsers,
    ManageRoles,
    ManageContent,
    ManageGames,
    ManageNews,
    ManageJobs,
    ManagePages,
    ViewContactSubmissions,
    ViewAnalytics,
    ManageSettings,
}

impl Permission {
    pub const ALL: [Permission; 10] = [
        Permission::ManageUsers,
        Permission::ManageRoles,
        Permission::ManageContent,
        Permission::ManageGames,
        Permission::ManageNews,
        Permission::ManageJobs,
        Permission::ManagePages,
        Permission::ViewContactSubmissions,
        Permission::ViewAnalytics,
        Permission::ManageSettings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ManageUsers => "manage_users",
            Permission::ManageRoles => "manage_roles",
            Permission::ManageContent => "manage_content",
            Permission::ManageGames => "manage_games",
            Permission::ManageNews => "manage_news",
            Permission::ManageJobs => "manage_jobs",
            Permission::ManagePages => "manage_pages",
            Permission::ViewContactSubmissions => "view_contact_submissions",
            Permission::ViewAnalytics => "view_analytics",
            Permission::ManageSettings => "manage_settings",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Permission::ALL.into_iter().find(|p| p.as_str() == raw)
    }
}

/// Map stored permission strings into the closed vocabulary.
/// Unknown strings are logged and dropped from UI payloads; the stored
/// record itself is never rewritten.
pub fn known_permissions(raw: &[String]) -> Vec<Permission> {
    raw.iter()
        .filter_map(|s| {
            let parsed = Permission::parse(s);
            if parsed.is_none() {
                tracing::warn!("Dropping unknown permission string: {}", s);
            }
            parsed
        })
        .collect()
}
