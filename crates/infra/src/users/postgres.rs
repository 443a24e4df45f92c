//! Postgres-backed user and role storage.
//!
//! Uniqueness is enforced twice: the admission gate pre-checks for friendly
//! errors, and the unique indexes on `username`/`email` close the race
//! window. A constraint violation here still maps to `DataExists`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;

use posthub_auth::Role;
use posthub_auth::store::{NewUserRecord, RoleDirectory, RoleRecord, UserRecord, UserStore};
use posthub_core::{IamError, IamResult, UserId};

const SELECT_USER: &str = r#"
SELECT u.user_id, u.username, u.email, u.password_hash, u.registration_status, u.last_update,
       COALESCE(ARRAY_AGG(r.name) FILTER (WHERE r.name IS NOT NULL), '{}') AS roles
FROM users u
LEFT JOIN user_roles ur ON ur.user_id = u.user_id
LEFT JOIN roles r ON r.role_id = ur.role_id
"#;

pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_where(&self, predicate: &str, value: &str) -> IamResult<Option<UserRecord>> {
        let query = format!("{SELECT_USER} WHERE {predicate} = $1 GROUP BY u.user_id");
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        row.map(user_from_row).transpose()
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn find_by_id(&self, user_id: UserId) -> IamResult<Option<UserRecord>> {
        let query = format!("{SELECT_USER} WHERE u.user_id = $1 GROUP BY u.user_id");
        let row = sqlx::query(&query)
            .bind(user_id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        row.map(user_from_row).transpose()
    }

    async fn find_by_username(&self, username: &str) -> IamResult<Option<UserRecord>> {
        self.find_where("u.username", username).await
    }

    async fn find_by_email(&self, email: &str) -> IamResult<Option<UserRecord>> {
        self.find_where("u.email", email).await
    }

    async fn insert(&self, user: NewUserRecord) -> IamResult<UserRecord> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        let row = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, registration_status, last_update)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING user_id, last_update
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.registration_status.to_string())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| insert_err(e, &user))?;

        let user_id: i64 = row.try_get("user_id").map_err(store_err)?;
        let last_update: DateTime<Utc> = row.try_get("last_update").map_err(store_err)?;

        for role in &user.roles {
            sqlx::query(
                "INSERT INTO user_roles (user_id, role_id) \
                 SELECT $1, role_id FROM roles WHERE name = $2",
            )
            .bind(user_id)
            .bind(role.as_str())
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;
        }

        tx.commit().await.map_err(store_err)?;
        debug!(user_id, username = %user.username, "inserted user");

        Ok(UserRecord {
            user_id: UserId::from_raw(user_id),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            registration_status: user.registration_status,
            roles: user.roles,
            last_update,
        })
    }

    async fn update_password(&self, user_id: UserId, password_hash: &str) -> IamResult<()> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, last_update = NOW() WHERE user_id = $1",
        )
        .bind(user_id.as_i64())
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        if result.rows_affected() == 0 {
            return Err(IamError::not_found(format!("User with ID: {user_id} was not found")));
        }
        Ok(())
    }
}

pub struct PostgresRoleDirectory {
    pool: PgPool,
}

impl PostgresRoleDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleDirectory for PostgresRoleDirectory {
    async fn find_by_role(&self, role: Role) -> IamResult<Option<RoleRecord>> {
        let row = sqlx::query("SELECT role_id FROM roles WHERE name = $1")
            .bind(role.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        row.map(|r| {
            let role_id: i64 = r.try_get("role_id").map_err(store_err)?;
            Ok(RoleRecord { role_id, role })
        })
        .transpose()
    }
}

fn user_from_row(row: PgRow) -> IamResult<UserRecord> {
    let status: String = row.try_get("registration_status").map_err(store_err)?;
    let role_names: Vec<String> = row.try_get("roles").map_err(store_err)?;
    Ok(UserRecord {
        user_id: UserId::from_raw(row.try_get("user_id").map_err(store_err)?),
        username: row.try_get("username").map_err(store_err)?,
        email: row.try_get("email").map_err(store_err)?,
        password_hash: row.try_get("password_hash").map_err(store_err)?,
        registration_status: status.parse()?,
        roles: role_names.iter().filter_map(|n| Role::from_name(n)).collect(),
        last_update: row.try_get("last_update").map_err(store_err)?,
    })
}

fn store_err(err: sqlx::Error) -> IamError {
    IamError::store(err.to_string())
}

fn insert_err(err: sqlx::Error, user: &NewUserRecord) -> IamError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            let constraint = db.constraint().unwrap_or_default();
            return if constraint.contains("email") {
                IamError::data_exists(format!("Email: {} already exists", user.email))
            } else {
                IamError::data_exists(format!("Username: {} already exists", user.username))
            };
        }
    }
    store_err(err)
}
