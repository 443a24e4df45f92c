//! Storage and pipeline wiring.
//!
//! With `DATABASE_URL` set the app runs against Postgres (migrations
//! applied at startup); without it everything lives in memory, which is what
//! development mode and the black-box tests use.

use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;

use posthub_auth::{AuthPipeline, RefreshTokenStore, TokenCodec};
use posthub_infra::{
    AppConfig, Argon2Credentials, InMemoryRefreshTokenRepository, InMemoryRoleDirectory,
    InMemoryUserStore, PostgresRefreshTokenRepository, PostgresRoleDirectory, PostgresUserStore,
};

pub struct AppServices {
    pub pipeline: Arc<AuthPipeline>,
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let codec = Arc::new(
        TokenCodec::new(&config.token_secret, config.token_validity)
            .context("JWT_SECRET is not valid base64")?,
    );
    let credentials = Arc::new(Argon2Credentials);

    let pipeline = match &config.database_url {
        Some(url) => {
            let pool = PgPool::connect(url).await.context("failed to connect to Postgres")?;
            sqlx::migrate!("../infra/migrations")
                .run(&pool)
                .await
                .context("failed to run migrations")?;
            tracing::info!("using postgres storage");

            AuthPipeline::new(
                Arc::new(PostgresUserStore::new(pool.clone())),
                Arc::new(PostgresRoleDirectory::new(pool.clone())),
                credentials.clone(),
                credentials,
                codec,
                RefreshTokenStore::new(Arc::new(PostgresRefreshTokenRepository::new(pool))),
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory storage");
            AuthPipeline::new(
                Arc::new(InMemoryUserStore::default()),
                Arc::new(InMemoryRoleDirectory::default()),
                credentials.clone(),
                credentials,
                codec,
                RefreshTokenStore::new(Arc::new(InMemoryRefreshTokenRepository::default())),
            )
        }
    };

    Ok(AppServices { pipeline: Arc::new(pipeline) })
}
