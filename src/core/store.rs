// Persistence collaborator contract

use crate::core::config::{Config, StoreBackend};
use crate::core::database::{Database, SqliteSessionStore};
use crate::core::http_store::HttpSessionStore;
use crate::models::exercise::ExerciseType;
use crate::models::session::{CompletedSession, LifetimeStats, SessionRecord};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Store not configured: {0}")]
    NotConfigured(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Where finalized sessions go and where lifetime totals come from.
///
/// Implementations decide on retries; callers never retry.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a finished session
    async fn save_session(&self, session: &CompletedSession) -> StoreResult<()>;

    /// Lifetime totals for one exercise
    async fn lifetime_stats(&self, exercise: ExerciseType) -> StoreResult<LifetimeStats>;

    /// Most recent sessions first
    async fn session_history(
        &self,
        exercise: ExerciseType,
        limit: u32,
    ) -> StoreResult<Vec<SessionRecord>>;

    async fn delete_session(&self, exercise: ExerciseType, id: &str) -> StoreResult<()>;

    /// Drop every saved session for the exercise
    async fn reset_stats(&self, exercise: ExerciseType) -> StoreResult<()>;
}

/// Open the store selected by the configuration
pub async fn open_store(config: &Config) -> StoreResult<Arc<dyn SessionStore>> {
    match config.store_backend {
        StoreBackend::Sqlite => {
            let db = Database::init(&config.database_path).await?;
            Ok(Arc::new(SqliteSessionStore::new(Arc::new(db))))
        }
        StoreBackend::Http => {
            let base_url = config
                .api_base_url
                .as_deref()
                .ok_or_else(|| StoreError::NotConfigured("api_base_url is not set".to_string()))?;
            tracing::info!(%base_url, "using remote session store");
            Ok(Arc::new(HttpSessionStore::new(base_url, config.api_token.clone())?))
        }
    }
}
