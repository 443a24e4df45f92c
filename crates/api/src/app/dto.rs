use serde::{Deserialize, Serialize};

use posthub_auth::{AuthSession, Principal};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub new_password: String,
    pub confirm_password: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub registration_status: String,
    pub roles: Vec<String>,
}

impl From<&Principal> for UserProfile {
    fn from(principal: &Principal) -> Self {
        Self {
            user_id: principal.user_id.as_i64(),
            username: principal.username.clone(),
            email: principal.email.clone(),
            registration_status: principal.registration_status.to_string(),
            roles: principal.role_names(),
        }
    }
}

/// Session payload: the profile plus both tokens, for clients that send the
/// session as a Bearer header instead of replaying cookies.
#[derive(Debug, Serialize)]
pub struct SessionProfile {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub token: String,
    pub refresh_token: String,
}

impl From<&AuthSession> for SessionProfile {
    fn from(session: &AuthSession) -> Self {
        Self {
            profile: UserProfile::from(&session.principal),
            token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
        }
    }
}
