use core::str::FromStr;

use serde::{Deserialize, Serialize};

use posthub_core::IamError;

/// Capability tag held by a user.
///
/// The enumeration is fixed: role semantics are baked into the authorization
/// rules, so an open string type would only defer errors to the gate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }

    /// True for roles that may act on resources they do not own.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }

    /// Lenient parse: unknown names map to `None` instead of an error.
    ///
    /// Token claims travel through client hands; a stray role name in a claim
    /// must never grant anything, but it must not crash the decode path
    /// either.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "SUPER_ADMIN" => Some(Role::SuperAdmin),
            "ADMIN" => Some(Role::Admin),
            "USER" => Some(Role::User),
            _ => None,
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = IamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::from_name(s).ok_or_else(|| IamError::invalid_data(format!("unknown role: {s}")))
    }
}
