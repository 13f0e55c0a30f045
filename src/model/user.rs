//! User profile as returned by `/api/auth/me` and the user management endpoints.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub permission: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub role_name: Option<String>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

/// Authenticated user. Every field is optional because the backend omits what it
/// doesn't know (the password is never sent back).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub status: Option<i32>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub authorities: Vec<String>,
}

impl AuthUser {
    /// Accounts are enabled when `status == 1`.
    pub fn is_enabled(&self) -> bool {
        self.status == Some(1)
    }

    pub fn role_name(&self) -> Option<&str> {
        self.role.as_ref()?.role_name.as_deref()
    }

    pub fn has_role(&self, role_name: &str) -> bool {
        self.role_name() == Some(role_name)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role("ADMIN")
    }

    /// `ROLE_<name>`, then the role's permissions, then extra authorities. Blank entries
    /// are dropped.
    pub fn all_authorities(&self) -> Vec<String> {
        let mut all = Vec::new();
        if let Some(name) = self.role_name().filter(|n| !n.is_empty()) {
            all.push(format!("ROLE_{name}"));
        }
        if let Some(role) = &self.role {
            all.extend(
                role.permissions
                    .iter()
                    .filter_map(|p| p.permission.as_deref())
                    .filter(|p| !p.trim().is_empty())
                    .map(str::to_owned),
            );
        }
        all.extend(
            self.authorities
                .iter()
                .filter(|a| !a.trim().is_empty())
                .cloned(),
        );
        all
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.all_authorities().iter().any(|a| a == authority)
    }
}
