//! `posthub-auth` — identity and access-control core (zero-trust).
//!
//! This crate is intentionally decoupled from HTTP and storage: persistence
//! and credential verification are consumed through the traits in [`store`],
//! and transport concerns stay in the API crate.

pub mod claims;
pub mod gate;
pub mod password;
pub mod pipeline;
pub mod principal;
pub mod refresh;
pub mod roles;
pub mod store;
pub mod token;

pub use claims::SessionClaims;
pub use gate::AccessGate;
pub use pipeline::{AuthPipeline, AuthSession, RegistrationRequest};
pub use principal::{Principal, RegistrationStatus};
pub use refresh::RefreshTokenStore;
pub use roles::Role;
pub use store::{
    AuthenticationFailed, CredentialVerifier, NewUserRecord, PasswordHasher, RefreshTokenRecord,
    RefreshTokenRepository, RoleDirectory, RoleRecord, UserRecord, UserStore,
};
pub use token::{TokenCodec, TokenError};
