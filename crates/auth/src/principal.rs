use core::str::FromStr;

use serde::{Deserialize, Serialize};

use posthub_core::{IamError, UserId};

use crate::roles::Role;

/// Account lifecycle status, carried by name inside token claims.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    #[default]
    Active,
    Pending,
    Suspended,
}

impl core::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RegistrationStatus::Active => f.write_str("ACTIVE"),
            RegistrationStatus::Pending => f.write_str("PENDING"),
            RegistrationStatus::Suspended => f.write_str("SUSPENDED"),
        }
    }
}

impl FromStr for RegistrationStatus {
    type Err = IamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(RegistrationStatus::Active),
            "PENDING" => Ok(RegistrationStatus::Pending),
            "SUSPENDED" => Ok(RegistrationStatus::Suspended),
            other => Err(IamError::invalid_data(format!(
                "Invalid user registration status: {other}"
            ))),
        }
    }
}

/// Authenticated identity for one request.
///
/// Ephemeral by design: reconstructed from verified token claims on every
/// request, never persisted. Role order is preserved for display inside
/// issued claims; authorization treats roles as a set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub registration_status: RegistrationStatus,
    pub roles: Vec<Role>,
}

impl Principal {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_privileged(&self) -> bool {
        self.roles.iter().any(Role::is_privileged)
    }

    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.as_str().to_string()).collect()
    }
}
