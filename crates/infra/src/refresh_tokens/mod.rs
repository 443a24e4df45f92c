//! Refresh token persistence adapters.

mod in_memory;
mod postgres;

pub use in_memory::InMemoryRefreshTokenRepository;
pub use postgres::PostgresRefreshTokenRepository;
