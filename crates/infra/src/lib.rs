//! Infrastructure layer: configuration, credential hashing, Postgres and
//! in-memory persistence adapters.

pub mod config;
pub mod credentials;
pub mod refresh_tokens;
pub mod users;

pub use config::AppConfig;
pub use credentials::Argon2Credentials;
pub use refresh_tokens::{InMemoryRefreshTokenRepository, PostgresRefreshTokenRepository};
pub use users::{InMemoryRoleDirectory, InMemoryUserStore, PostgresRoleDirectory, PostgresUserStore};
