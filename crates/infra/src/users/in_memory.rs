//! In-memory user storage for development mode and tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use posthub_auth::Role;
use posthub_auth::store::{NewUserRecord, RoleDirectory, RoleRecord, UserRecord, UserStore};
use posthub_core::{IamError, IamResult, UserId};

#[derive(Default)]
pub struct InMemoryUserStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    rows: Vec<UserRecord>,
    next_id: i64,
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, user_id: UserId) -> IamResult<Option<UserRecord>> {
        let inner = self.inner.lock().map_err(poisoned)?;
        Ok(inner.rows.iter().find(|u| u.user_id == user_id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> IamResult<Option<UserRecord>> {
        let inner = self.inner.lock().map_err(poisoned)?;
        Ok(inner.rows.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> IamResult<Option<UserRecord>> {
        let inner = self.inner.lock().map_err(poisoned)?;
        Ok(inner.rows.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: NewUserRecord) -> IamResult<UserRecord> {
        let mut inner = self.inner.lock().map_err(poisoned)?;
        // Uniqueness is re-checked under the lock; the admission gate's
        // pre-check can race with a concurrent insert.
        if inner.rows.iter().any(|u| u.username == user.username) {
            return Err(IamError::data_exists(format!(
                "Username: {} already exists",
                user.username
            )));
        }
        if inner.rows.iter().any(|u| u.email == user.email) {
            return Err(IamError::data_exists(format!("Email: {} already exists", user.email)));
        }

        inner.next_id += 1;
        let record = UserRecord {
            user_id: UserId::from_raw(inner.next_id),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            registration_status: user.registration_status,
            roles: user.roles,
            last_update: Utc::now(),
        };
        inner.rows.push(record.clone());
        Ok(record)
    }

    async fn update_password(&self, user_id: UserId, password_hash: &str) -> IamResult<()> {
        let mut inner = self.inner.lock().map_err(poisoned)?;
        let user = inner
            .rows
            .iter_mut()
            .find(|u| u.user_id == user_id)
            .ok_or_else(|| IamError::not_found(format!("User with ID: {user_id} was not found")))?;
        user.password_hash = password_hash.to_string();
        user.last_update = Utc::now();
        Ok(())
    }
}

/// Role directory with all three roles pre-seeded, ids in declaration order.
pub struct InMemoryRoleDirectory {
    seeded: Vec<RoleRecord>,
}

impl Default for InMemoryRoleDirectory {
    fn default() -> Self {
        let seeded = [Role::SuperAdmin, Role::Admin, Role::User]
            .into_iter()
            .enumerate()
            .map(|(i, role)| RoleRecord { role_id: i as i64 + 1, role })
            .collect();
        Self { seeded }
    }
}

impl InMemoryRoleDirectory {
    /// An empty directory, for exercising the missing-seed failure path.
    pub fn unseeded() -> Self {
        Self { seeded: Vec::new() }
    }
}

#[async_trait]
impl RoleDirectory for InMemoryRoleDirectory {
    async fn find_by_role(&self, role: Role) -> IamResult<Option<RoleRecord>> {
        Ok(self.seeded.iter().find(|r| r.role == role).copied())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> IamError {
    IamError::store("user store lock poisoned")
}
