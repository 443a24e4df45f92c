//! Identity/access error model.

use thiserror::Error;

/// Result type used across the identity core.
pub type IamResult<T> = Result<T, IamError>;

/// Identity and access-control error.
///
/// Keep this focused on deterministic auth/authz failures. Each variant maps
/// to exactly one HTTP status at the boundary, so callers can branch on it;
/// infrastructure faults collapse into [`IamError::Store`] and never leak
/// detail past the boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IamError {
    /// Bad login: wrong password or no active account for the email.
    ///
    /// Both cases intentionally share one message so a caller cannot learn
    /// which accounts exist.
    #[error("Invalid email or password. Try again")]
    InvalidCredentials,

    /// Ownership/role check failed.
    #[error("You don't have the necessary permissions")]
    AccessDenied,

    /// A user, role, or refresh token lookup came up empty.
    #[error("{0}")]
    NotFound(String),

    /// Password strength policy violation; carries the policy text.
    #[error("{0}")]
    InvalidPassword(String),

    /// Malformed input (mismatched confirmation, unparseable value, ...).
    #[error("{0}")]
    InvalidData(String),

    /// Uniqueness violation (username/email already taken).
    #[error("{0}")]
    DataExists(String),

    /// Session token expired past the refresh window.
    #[error("Token is too old to refresh")]
    TooOldToRefresh,

    /// Structurally invalid or badly signed session token.
    #[error("Invalid token")]
    TokenMalformed,

    /// Persistence collaborator failure.
    #[error("storage error: {0}")]
    Store(String),
}

impl IamError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_password(msg: impl Into<String>) -> Self {
        Self::InvalidPassword(msg.into())
    }

    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    pub fn data_exists(msg: impl Into<String>) -> Self {
        Self::DataExists(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}
