//! Persistence and credential seams.
//!
//! Everything stateful the authentication flows touch comes in through these
//! traits. The infra crate supplies Postgres and in-memory implementations;
//! tests script them directly.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use posthub_core::{IamResult, UserId};

use crate::principal::RegistrationStatus;
use crate::roles::Role;

/// A stored user, as the pipeline sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub registration_status: RegistrationStatus,
    pub roles: Vec<Role>,
    pub last_update: DateTime<Utc>,
}

/// Input to user creation; the store assigns the id and timestamps.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub registration_status: RegistrationStatus,
    pub roles: Vec<Role>,
}

/// A seeded role row. Registration requires the role to exist up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleRecord {
    pub role_id: i64,
    pub role: Role,
}

/// One refresh token row; at most one per user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: UserId,
    pub created: DateTime<Utc>,
}

/// Deliberately detail-free verification failure.
///
/// The login path maps every cause, unknown user included, onto the same
/// message so responses cannot be used to enumerate accounts.
#[derive(Debug, Error)]
#[error("Invalid email or password. Try again")]
pub struct AuthenticationFailed;

/// User lookup and mutation.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, user_id: UserId) -> IamResult<Option<UserRecord>>;
    async fn find_by_username(&self, username: &str) -> IamResult<Option<UserRecord>>;
    async fn find_by_email(&self, email: &str) -> IamResult<Option<UserRecord>>;
    async fn insert(&self, user: NewUserRecord) -> IamResult<UserRecord>;
    async fn update_password(&self, user_id: UserId, password_hash: &str) -> IamResult<()>;
}

/// Role seed lookup.
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    async fn find_by_role(&self, role: Role) -> IamResult<Option<RoleRecord>>;
}

/// Compares a raw credential against a stored hash.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, candidate: &str, stored_hash: &str) -> Result<(), AuthenticationFailed>;
}

/// Produces a storable hash from a raw password.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, raw: &str) -> IamResult<String>;
}

/// Refresh token persistence.
///
/// `upsert` and `rotate` are single atomic statements on real storage: one
/// row per user, replaced in place, so no window exists in which a user has
/// zero or two live refresh tokens.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    async fn find_by_token(&self, token: &str) -> IamResult<Option<RefreshTokenRecord>>;

    /// Insert the user's refresh token, replacing any existing one.
    async fn upsert(
        &self,
        user_id: UserId,
        token: &str,
        created: DateTime<Utc>,
    ) -> IamResult<RefreshTokenRecord>;

    /// Atomically swap `old_token` for `new_token`; `None` when `old_token`
    /// is not present (already rotated or never issued).
    async fn rotate(
        &self,
        old_token: &str,
        new_token: &str,
        created: DateTime<Utc>,
    ) -> IamResult<Option<RefreshTokenRecord>>;

    /// Drop the user's refresh token; `true` when a row was removed.
    async fn delete_for_user(&self, user_id: UserId) -> IamResult<bool>;
}
