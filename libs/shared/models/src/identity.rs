use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller identity as propagated by the upstream API gateway through the
/// `X-User-ID` / `X-User-Role` headers. The gateway owns authentication;
/// these components only ever see the resolved identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub role: Option<Role>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, role: Option<Role>) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, Some(Role::Admin))
    }

    pub fn is_doctor(&self) -> bool {
        matches!(self.role, Some(Role::Doctor))
    }

    pub fn is_patient(&self) -> bool {
        matches!(self.role, Some(Role::Patient))
    }

    /// Admin and the system dispatcher share assignment privileges.
    pub fn is_dispatcher(&self) -> bool {
        matches!(self.role, Some(Role::Admin) | Some(Role::System))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Patient,
    Doctor,
    Clinic,
    Admin,
    System,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Role> {
        match raw {
            "patient" => Some(Role::Patient),
            "doctor" => Some(Role::Doctor),
            "clinic" => Some(Role::Clinic),
            "admin" => Some(Role::Admin),
            "system" => Some(Role::System),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Patient => write!(f, "patient"),
            Role::Doctor => write!(f, "doctor"),
            Role::Clinic => write!(f, "clinic"),
            Role::Admin => write!(f, "admin"),
            Role::System => write!(f, "system"),
        }
    }
}
