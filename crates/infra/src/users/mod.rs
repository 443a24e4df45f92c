//! User and role persistence adapters.

mod in_memory;
mod postgres;

pub use in_memory::{InMemoryRoleDirectory, InMemoryUserStore};
pub use postgres::{PostgresRoleDirectory, PostgresUserStore};
