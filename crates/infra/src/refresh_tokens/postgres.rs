//! Postgres-backed refresh token storage.
//!
//! One row per user, keyed by `user_id` with a unique index on `token`.
//! Both write paths are single statements: `upsert` rides the ON CONFLICT
//! clause, `rotate` is one conditional UPDATE whose row count tells whether
//! the presented token was live. Concurrent rotations of the same token
//! therefore serialize in the database and at most one wins.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use posthub_auth::store::{RefreshTokenRecord, RefreshTokenRepository};
use posthub_core::{IamError, IamResult, UserId};

pub struct PostgresRefreshTokenRepository {
    pool: PgPool,
}

impl PostgresRefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for PostgresRefreshTokenRepository {
    async fn find_by_token(&self, token: &str) -> IamResult<Option<RefreshTokenRecord>> {
        let row = sqlx::query(
            "SELECT user_id, token, created FROM refresh_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;
        row.map(record_from_row).transpose()
    }

    async fn upsert(
        &self,
        user_id: UserId,
        token: &str,
        created: DateTime<Utc>,
    ) -> IamResult<RefreshTokenRecord> {
        let row = sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token, created)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id)
            DO UPDATE SET token = EXCLUDED.token, created = EXCLUDED.created
            RETURNING user_id, token, created
            "#,
        )
        .bind(user_id.as_i64())
        .bind(token)
        .bind(created)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;
        record_from_row(row)
    }

    async fn rotate(
        &self,
        old_token: &str,
        new_token: &str,
        created: DateTime<Utc>,
    ) -> IamResult<Option<RefreshTokenRecord>> {
        let row = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET token = $2, created = $3
            WHERE token = $1
            RETURNING user_id, token, created
            "#,
        )
        .bind(old_token)
        .bind(new_token)
        .bind(created)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;
        row.map(record_from_row).transpose()
    }

    async fn delete_for_user(&self, user_id: UserId) -> IamResult<bool> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected() > 0)
    }
}

fn record_from_row(row: PgRow) -> IamResult<RefreshTokenRecord> {
    Ok(RefreshTokenRecord {
        user_id: UserId::from_raw(row.try_get("user_id").map_err(store_err)?),
        token: row.try_get("token").map_err(store_err)?,
        created: row.try_get("created").map_err(store_err)?,
    })
}

fn store_err(err: sqlx::Error) -> IamError {
    IamError::store(err.to_string())
}
