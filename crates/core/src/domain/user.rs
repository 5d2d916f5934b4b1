//! Staff accounts and the roles that drive authorization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Staff roles recognised by the workflow engine.
///
/// Serialised in camelCase to match the wire format, e.g.
/// `"checkerDoctor"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Admin,
    Reception,
    CheckerDoctor,
    LabTech,
    MainDoctor,
    Pharmacy,
}

impl Role {
    /// All roles, in the order they appear in the workflow.
    pub const ALL: [Role; 6] = [
        Role::Admin,
        Role::Reception,
        Role::CheckerDoctor,
        Role::LabTech,
        Role::MainDoctor,
        Role::Pharmacy,
    ];

    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Reception => "reception",
            Role::CheckerDoctor => "checkerDoctor",
            Role::LabTech => "labTech",
            Role::MainDoctor => "mainDoctor",
            Role::Pharmacy => "pharmacy",
        }
    }

    /// Parses a wire name back into a role.
    pub fn parse(value: &str) -> Option<Role> {
        Role::ALL.iter().copied().find(|role| role.as_str() == value)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated identity an operation runs as.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }
}

/// A staff account.
///
/// The bearer `token` authenticates the account against the REST API.
/// Tokens are opaque and never returned by listing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing, default)]
    pub token: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, name: String, role: Role, token: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            name,
            role,
            token,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Identity used when this user performs an operation.
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialise_in_camel_case() {
        let json = serde_json::to_string(&Role::CheckerDoctor).expect("Failed to serialise");
        assert_eq!(json, "\"checkerDoctor\"");
        let parsed: Role = serde_json::from_str("\"labTech\"").expect("Failed to deserialise");
        assert_eq!(parsed, Role::LabTech);
    }

    #[test]
    fn role_parse_round_trips_every_role() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("janitor"), None);
    }

    #[test]
    fn user_serialisation_never_leaks_the_token() {
        let user = User::new(
            "reception.desk".to_string(),
            "Front Desk".to_string(),
            Role::Reception,
            "secret-token".to_string(),
        );
        let json = serde_json::to_string(&user).expect("Failed to serialise");
        assert!(!json.contains("secret-token"));
        assert!(json.contains("\"username\":\"reception.desk\""));
    }
}
