use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use posthub_core::{IamError, UserId};

use crate::principal::{Principal, RegistrationStatus};
use crate::roles::Role;

/// Session token claims (HS256-signed JWT payload).
///
/// The claim set is fixed and strongly typed at the serialization boundary;
/// the only lenient spot is `roles`, which decodes a missing or non-sequence
/// claim as an empty list instead of failing the whole token. A forged roles
/// claim therefore grants nothing and breaks nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the user's email.
    pub sub: String,

    pub user_id: UserId,
    pub username: String,
    pub email: String,

    /// Registration status by name (e.g. `ACTIVE`).
    pub registration_status: String,

    /// Role names in issue order (display order; authorization is set-based).
    #[serde(default, deserialize_with = "lenient_roles")]
    pub roles: Vec<String>,

    /// Timestamp of the last identity update, RFC 3339.
    pub last_update: String,

    /// Issued-at, seconds since the epoch.
    pub iat: i64,

    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

impl SessionClaims {
    /// Build the claim set for a principal at `now`, valid for `validity`.
    pub fn for_principal(principal: &Principal, now: DateTime<Utc>, validity: chrono::Duration) -> Self {
        Self {
            sub: principal.email.clone(),
            user_id: principal.user_id,
            username: principal.username.clone(),
            email: principal.email.clone(),
            registration_status: principal.registration_status.to_string(),
            roles: principal.role_names(),
            last_update: now.to_rfc3339(),
            iat: now.timestamp(),
            exp: (now + validity).timestamp(),
        }
    }

    /// Reconstruct the principal carried by these claims.
    ///
    /// Fails on an unparseable registration status; unknown role names are
    /// dropped (they can never grant anything).
    pub fn to_principal(&self) -> Result<Principal, IamError> {
        let registration_status: RegistrationStatus = self.registration_status.parse()?;
        Ok(Principal {
            user_id: self.user_id,
            username: self.username.clone(),
            email: self.email.clone(),
            registration_status,
            roles: self.role_set(),
        })
    }

    /// Roles as the fixed enum, unknown names filtered out.
    pub fn role_set(&self) -> Vec<Role> {
        self.roles.iter().filter_map(|name| Role::from_name(name)).collect()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(self.exp, 0).unwrap_or_else(|| DateTime::<Utc>::MIN_UTC)
    }
}

/// Decode a roles claim defensively: anything other than an array of strings
/// becomes an empty list.
fn lenient_roles<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}
