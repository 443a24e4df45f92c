//! Authorization and registration admission checks.

use std::sync::Arc;

use tracing::warn;

use posthub_core::{IamError, IamResult, UserId};

use crate::password;
use crate::store::UserStore;

/// Owner-or-privileged access decisions plus registration admission.
///
/// Decisions run on *stored* state: privilege is looked up by caller id, not
/// taken from token claims, so a role revocation takes effect immediately
/// even while old tokens are still live.
#[derive(Clone)]
pub struct AccessGate {
    users: Arc<dyn UserStore>,
}

impl AccessGate {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Whether the user currently holds a role that may act on resources
    /// they do not own. Unknown ids fail with `NotFound`.
    pub async fn is_privileged(&self, user_id: UserId) -> IamResult<bool> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| IamError::not_found(format!("User with ID: {user_id} was not found")))?;
        Ok(user.roles.iter().any(|r| r.is_privileged()))
    }

    /// Allow when the caller owns the target resource or holds a privileged
    /// role; everything else is denied.
    ///
    /// Both ids must come from trusted sources: the caller id from the
    /// verified token, the owner id from the loaded entity.
    pub async fn authorize_owner_or_privileged(
        &self,
        caller: UserId,
        owner: UserId,
    ) -> IamResult<()> {
        if caller == owner {
            return Ok(());
        }
        if self.is_privileged(caller).await? {
            return Ok(());
        }
        warn!(caller = %caller, owner = %owner, "access denied");
        Err(IamError::AccessDenied)
    }

    /// Fails with `DataExists` when the username or email is already taken.
    /// Username is checked before email; the first violation wins.
    pub async fn assert_new_user_is_unique(&self, username: &str, email: &str) -> IamResult<()> {
        if self.users.find_by_username(username).await?.is_some() {
            return Err(IamError::data_exists(format!("Username: {username} already exists")));
        }
        if self.users.find_by_email(email).await?.is_some() {
            return Err(IamError::data_exists(format!("Email: {email} already exists")));
        }
        Ok(())
    }

    /// Fails with `InvalidData` when the confirmation differs.
    pub fn assert_passwords_match(&self, password: &str, confirm: &str) -> IamResult<()> {
        if password != confirm {
            return Err(IamError::invalid_data("Password does not match"));
        }
        Ok(())
    }

    /// Fails with `InvalidPassword` (carrying the policy text) on a weak
    /// candidate.
    pub fn assert_password_strong(&self, password: &str) -> IamResult<()> {
        if password::is_invalid(password) {
            return Err(IamError::invalid_password(password::policy_text()));
        }
        Ok(())
    }

    /// Composed admission checks for a new registration, in a fixed order:
    /// username taken, email taken, confirmation mismatch, strength. Callers
    /// surface the *first* violation only.
    pub async fn ensure_registrable(
        &self,
        username: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> IamResult<()> {
        self.assert_new_user_is_unique(username, email).await?;
        self.assert_passwords_match(password, confirm_password)?;
        self.assert_password_strong(password)
    }
}
