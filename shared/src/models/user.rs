//! User / Profile Model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role returned by the backend with the profile.
///
/// The console is only usable by staff roles; `User` is a regular
/// customer account and is rejected at login.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "restaurant manager")]
    RestaurantManager,
    #[serde(rename = "admin")]
    Admin,
}

impl Role {
    /// Whether this role is allowed into the admin console.
    ///
    /// Admins and restaurant managers share one capability set; there is
    /// no finer-grained screen restriction between them.
    pub fn is_console_staff(self) -> bool {
        matches!(self, Role::Admin | Role::RestaurantManager)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::RestaurantManager => write!(f, "restaurant manager"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// Account status, toggled by the admin user screen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

/// User profile entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(rename = "profilePicture", default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub status: UserStatus,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_wire_strings() {
        let manager: Role = serde_json::from_str("\"restaurant manager\"").unwrap();
        assert_eq!(manager, Role::RestaurantManager);
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }

    #[test]
    fn staff_gate() {
        assert!(Role::Admin.is_console_staff());
        assert!(Role::RestaurantManager.is_console_staff());
        assert!(!Role::User.is_console_staff());
    }
}
