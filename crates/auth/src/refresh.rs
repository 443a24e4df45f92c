//! Rotating single-use refresh tokens.
//!
//! A refresh token is an opaque 32-character lowercase-hex handle (a dashless
//! UUID), one per user. Presenting it consumes it: the store swaps the row
//! for a fresh handle in a single atomic statement, so a replayed token can
//! never succeed twice.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use posthub_core::{IamError, IamResult, UserId};

use crate::store::{RefreshTokenRecord, RefreshTokenRepository};

pub const REFRESH_TOKEN_NOT_FOUND: &str = "Refresh token not found.";

/// Issues, rotates and revokes refresh tokens over a [`RefreshTokenRepository`].
#[derive(Clone)]
pub struct RefreshTokenStore {
    repo: Arc<dyn RefreshTokenRepository>,
}

impl RefreshTokenStore {
    pub fn new(repo: Arc<dyn RefreshTokenRepository>) -> Self {
        Self { repo }
    }

    /// Mint a new handle for the user, displacing any existing one.
    ///
    /// Called on login: a second login from another device invalidates the
    /// first device's refresh token.
    pub async fn issue(&self, user_id: UserId) -> IamResult<RefreshTokenRecord> {
        let record = self.repo.upsert(user_id, &new_handle(), Utc::now()).await?;
        debug!(user_id = %user_id, "issued refresh token");
        Ok(record)
    }

    /// Consume `presented` and return its replacement.
    ///
    /// Unknown, already-consumed and revoked handles are indistinguishable:
    /// all surface as `NotFound`.
    pub async fn rotate(&self, presented: &str) -> IamResult<RefreshTokenRecord> {
        let rotated = self.repo.rotate(presented, &new_handle(), Utc::now()).await?;
        match rotated {
            Some(record) => {
                debug!(user_id = %record.user_id, "rotated refresh token");
                Ok(record)
            }
            None => Err(IamError::not_found(REFRESH_TOKEN_NOT_FOUND)),
        }
    }

    /// Look up the live handle without consuming it.
    pub async fn find(&self, token: &str) -> IamResult<RefreshTokenRecord> {
        self.repo
            .find_by_token(token)
            .await?
            .ok_or_else(|| IamError::not_found(REFRESH_TOKEN_NOT_FOUND))
    }

    /// Drop the user's handle; logout path. Revoking an absent handle is not
    /// an error.
    pub async fn revoke(&self, user_id: UserId) -> IamResult<()> {
        let removed = self.repo.delete_for_user(user_id).await?;
        debug!(user_id = %user_id, removed, "revoked refresh token");
        Ok(())
    }
}

/// Dashless lowercase-hex UUID, 32 characters.
fn new_handle() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemRepo {
        // token -> record
        rows: Mutex<HashMap<String, RefreshTokenRecord>>,
    }

    #[async_trait]
    impl RefreshTokenRepository for MemRepo {
        async fn find_by_token(&self, token: &str) -> IamResult<Option<RefreshTokenRecord>> {
            Ok(self.rows.lock().unwrap().get(token).cloned())
        }

        async fn upsert(
            &self,
            user_id: UserId,
            token: &str,
            created: DateTime<Utc>,
        ) -> IamResult<RefreshTokenRecord> {
            let mut rows = self.rows.lock().unwrap();
            rows.retain(|_, r| r.user_id != user_id);
            let record = RefreshTokenRecord { token: token.to_string(), user_id, created };
            rows.insert(token.to_string(), record.clone());
            Ok(record)
        }

        async fn rotate(
            &self,
            old_token: &str,
            new_token: &str,
            created: DateTime<Utc>,
        ) -> IamResult<Option<RefreshTokenRecord>> {
            let mut rows = self.rows.lock().unwrap();
            let Some(old) = rows.remove(old_token) else {
                return Ok(None);
            };
            let record =
                RefreshTokenRecord { token: new_token.to_string(), user_id: old.user_id, created };
            rows.insert(new_token.to_string(), record.clone());
            Ok(Some(record))
        }

        async fn delete_for_user(&self, user_id: UserId) -> IamResult<bool> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|_, r| r.user_id != user_id);
            Ok(rows.len() < before)
        }
    }

    fn store() -> RefreshTokenStore {
        RefreshTokenStore::new(Arc::new(MemRepo::default()))
    }

    #[tokio::test]
    async fn issued_handle_is_32_lowercase_hex() {
        let record = store().issue(UserId::from_raw(1)).await.unwrap();
        assert_eq!(record.token.len(), 32);
        assert!(record.token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[tokio::test]
    async fn reissue_displaces_previous_handle() {
        let store = store();
        let first = store.issue(UserId::from_raw(1)).await.unwrap();
        let second = store.issue(UserId::from_raw(1)).await.unwrap();
        assert_ne!(first.token, second.token);
        assert!(store.find(&first.token).await.is_err());
        assert!(store.find(&second.token).await.is_ok());
    }

    #[tokio::test]
    async fn rotation_is_single_use() {
        let store = store();
        let issued = store.issue(UserId::from_raw(7)).await.unwrap();

        let rotated = store.rotate(&issued.token).await.unwrap();
        assert_eq!(rotated.user_id, UserId::from_raw(7));
        assert_ne!(rotated.token, issued.token);

        // Replay of the consumed handle fails.
        let replay = store.rotate(&issued.token).await;
        assert!(matches!(replay, Err(IamError::NotFound(msg)) if msg == REFRESH_TOKEN_NOT_FOUND));

        // The replacement still works.
        assert!(store.rotate(&rotated.token).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_handle_is_not_found() {
        let err = store().rotate("0123456789abcdef0123456789abcdef").await.unwrap_err();
        assert!(matches!(err, IamError::NotFound(msg) if msg == REFRESH_TOKEN_NOT_FOUND));
    }

    #[tokio::test]
    async fn revoke_invalidates_handle_and_is_idempotent() {
        let store = store();
        let issued = store.issue(UserId::from_raw(3)).await.unwrap();
        store.revoke(UserId::from_raw(3)).await.unwrap();
        assert!(store.find(&issued.token).await.is_err());
        store.revoke(UserId::from_raw(3)).await.unwrap();
    }
}
