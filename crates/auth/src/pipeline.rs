//! Authentication flows: login, registration, session refresh, password
//! change, logout.
//!
//! The pipeline composes the codec, the gate and the refresh store over the
//! storage traits; it owns flow ordering and error shaping but no IO of its
//! own. Every entry point short-circuits on the first failure, so no flow
//! leaves partial state behind.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, instrument, warn};

use posthub_core::{IamError, IamResult, UserId};

use crate::gate::AccessGate;
use crate::principal::Principal;
use crate::refresh::RefreshTokenStore;
use crate::roles::Role;
use crate::store::{
    CredentialVerifier, NewUserRecord, PasswordHasher, RoleDirectory, UserRecord, UserStore,
};
use crate::token::TokenCodec;

pub const ROLE_NOT_FOUND: &str = "Role was not found";

/// Registration input as received from the outside.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// A freshly established session: who, plus both token halves.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub principal: Principal,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct AuthPipeline {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleDirectory>,
    verifier: Arc<dyn CredentialVerifier>,
    hasher: Arc<dyn PasswordHasher>,
    codec: Arc<TokenCodec>,
    gate: AccessGate,
    refresh_tokens: RefreshTokenStore,
}

impl AuthPipeline {
    pub fn new(
        users: Arc<dyn UserStore>,
        roles: Arc<dyn RoleDirectory>,
        verifier: Arc<dyn CredentialVerifier>,
        hasher: Arc<dyn PasswordHasher>,
        codec: Arc<TokenCodec>,
        refresh_tokens: RefreshTokenStore,
    ) -> Self {
        let gate = AccessGate::new(Arc::clone(&users));
        Self { users, roles, verifier, hasher, codec, gate, refresh_tokens }
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Authenticate by email and password, establishing a full session.
    ///
    /// Unknown account and wrong password collapse into one error so the
    /// response cannot confirm whether an email is registered.
    #[instrument(skip_all, fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> IamResult<AuthSession> {
        let Some(user) = self.users.find_by_email(email).await? else {
            warn!("login failed: unknown email");
            return Err(IamError::InvalidCredentials);
        };
        if self.verifier.verify(password, &user.password_hash).is_err() {
            warn!(user_id = %user.user_id, "login failed: bad credentials");
            return Err(IamError::InvalidCredentials);
        }

        let session = self.establish_session(user).await?;
        info!(user_id = %session.principal.user_id, "login succeeded");
        Ok(session)
    }

    /// Register a new account with the default `USER` role and establish a
    /// session for it, exactly as login would.
    ///
    /// The role must already be seeded in storage; a missing seed is a
    /// deployment fault surfaced as `NotFound`.
    #[instrument(skip_all, fields(username = %request.username))]
    pub async fn register(&self, request: &RegistrationRequest) -> IamResult<AuthSession> {
        self.gate
            .ensure_registrable(
                &request.username,
                &request.email,
                &request.password,
                &request.confirm_password,
            )
            .await?;

        let role = self
            .roles
            .find_by_role(Role::User)
            .await?
            .ok_or_else(|| IamError::not_found(ROLE_NOT_FOUND))?;

        let user = self
            .users
            .insert(NewUserRecord {
                username: request.username.trim().to_string(),
                email: request.email.trim().to_string(),
                password_hash: self.hasher.hash(request.password.trim())?,
                registration_status: Default::default(),
                roles: vec![role.role],
            })
            .await?;

        info!(user_id = %user.user_id, "registered new user");
        self.establish_session(user).await
    }

    /// Redeem a live refresh handle for a fresh session pair.
    ///
    /// The handle alone authenticates the request; no access token is
    /// involved, so a session stays renewable for the handle's whole
    /// lifetime even long after its last access token expired. The swap is
    /// atomic and single-use, and the new claims are rebuilt from the stored
    /// user, not copied from any old token, so role and status changes take
    /// effect on refresh.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> IamResult<AuthSession> {
        let rotated = self.refresh_tokens.rotate(refresh_token).await?;

        let user = self.users.find_by_id(rotated.user_id).await?.ok_or_else(|| {
            IamError::not_found(format!("User with ID: {} was not found", rotated.user_id))
        })?;

        let principal = principal_of(&user);
        let access_token = self.codec.issue(&principal).map_err(IamError::from)?;

        info!(user_id = %principal.user_id, "session refreshed");
        Ok(AuthSession { principal, access_token, refresh_token: rotated.token })
    }

    /// Change a user's password on their own behalf or by a privileged actor.
    ///
    /// The caller id comes from the verified token, never from the request,
    /// and authorization is the whole credential here: a privileged caller
    /// resets a password without knowing the old one, and an owner already
    /// proved theirs at login. Ordering: authorization, target lookup,
    /// confirmation, strength. The target's refresh handle is revoked on
    /// success, forcing re-authentication everywhere.
    #[instrument(skip_all, fields(caller = %caller, target = %target))]
    pub async fn change_password(
        &self,
        caller: UserId,
        target: UserId,
        new_password: &str,
        confirm_password: &str,
    ) -> IamResult<()> {
        self.gate.authorize_owner_or_privileged(caller, target).await?;

        if self.users.find_by_id(target).await?.is_none() {
            return Err(IamError::not_found(format!("User with ID: {target} was not found")));
        }

        self.gate.assert_passwords_match(new_password, confirm_password)?;
        self.gate.assert_password_strong(new_password)?;

        let hash = self.hasher.hash(new_password.trim())?;
        self.users.update_password(target, &hash).await?;
        self.refresh_tokens.revoke(target).await?;

        info!("password changed");
        Ok(())
    }

    /// Tear down the user's session server-side.
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn logout(&self, user_id: UserId) -> IamResult<()> {
        self.refresh_tokens.revoke(user_id).await?;
        info!("logged out");
        Ok(())
    }

    /// Resolve a live access token into its principal.
    pub fn authenticate(&self, access_token: &str) -> IamResult<Principal> {
        if !self.codec.verify(access_token) {
            return Err(IamError::TokenMalformed);
        }
        self.codec.claims(access_token)?.to_principal()
    }

    async fn establish_session(&self, user: UserRecord) -> IamResult<AuthSession> {
        let principal = principal_of(&user);
        let access_token = self.codec.issue(&principal).map_err(IamError::from)?;
        let refresh = self.refresh_tokens.issue(principal.user_id).await?;
        Ok(AuthSession { principal, access_token, refresh_token: refresh.token })
    }
}

fn principal_of(user: &UserRecord) -> Principal {
    Principal {
        user_id: user.user_id,
        username: user.username.clone(),
        email: user.email.clone(),
        registration_status: user.registration_status,
        roles: user.roles.clone(),
    }
}
