//! In-memory refresh token storage for development mode and tests.
//!
//! The whole map sits behind one mutex, so `rotate` gets the same
//! remove-and-replace atomicity the Postgres adapter gets from a single
//! UPDATE statement.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use posthub_auth::store::{RefreshTokenRecord, RefreshTokenRepository};
use posthub_core::{IamError, IamResult, UserId};

#[derive(Default)]
pub struct InMemoryRefreshTokenRepository {
    rows: Mutex<HashMap<String, RefreshTokenRecord>>,
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn find_by_token(&self, token: &str) -> IamResult<Option<RefreshTokenRecord>> {
        Ok(self.rows.lock().map_err(poisoned)?.get(token).cloned())
    }

    async fn upsert(
        &self,
        user_id: UserId,
        token: &str,
        created: DateTime<Utc>,
    ) -> IamResult<RefreshTokenRecord> {
        let mut rows = self.rows.lock().map_err(poisoned)?;
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
        let mut rows = self.rows.lock().map_err(poisoned)?;
        let Some(old) = rows.remove(old_token) else {
            return Ok(None);
        };
        let record =
            RefreshTokenRecord { token: new_token.to_string(), user_id: old.user_id, created };
        rows.insert(new_token.to_string(), record.clone());
        Ok(Some(record))
    }

    async fn delete_for_user(&self, user_id: UserId) -> IamResult<bool> {
        let mut rows = self.rows.lock().map_err(poisoned)?;
        let before = rows.len();
        rows.retain(|_, r| r.user_id != user_id);
        Ok(rows.len() < before)
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> IamError {
    IamError::store("refresh token store lock poisoned")
}
