//! Store selection for the configured database provider.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

use termset_core::config::{DatabaseConfig, DatabaseProvider};
use termset_core::error::{AppError, ErrorKind};
use termset_core::result::AppResult;

use crate::memory::{MemoryJobStore, MemoryTranslationSetStore};
use crate::repositories::{PgJobStore, PgTranslationSetStore};
use crate::traits::{JobStore, TranslationSetStore};

/// The translation set and job stores behind one backend.
///
/// For PostgreSQL the pool is retained so it can be closed on shutdown.
#[derive(Clone)]
pub struct Stores {
    pub sets: Arc<dyn TranslationSetStore>,
    pub jobs: Arc<dyn JobStore>,
    pool: Option<PgPool>,
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores")
            .field("postgres", &self.pool.is_some())
            .finish()
    }
}

impl Stores {
    /// Process-local stores. Nothing survives a restart.
    pub fn memory() -> Self {
        Self {
            sets: Arc::new(MemoryTranslationSetStore::new()),
            jobs: Arc::new(MemoryJobStore::new()),
            pool: None,
        }
    }

    /// Open the stores for `config.provider`. PostgreSQL is migrated before use.
    pub async fn open(config: &DatabaseConfig) -> AppResult<Self> {
        match config.provider {
            DatabaseProvider::Memory => {
                warn!("Using in-memory stores; translation sets are lost on restart");
                Ok(Self::memory())
            }
            DatabaseProvider::Postgres => {
                let pool = connect(config).await?;
                migrate(&pool).await?;
                Ok(Self {
                    sets: Arc::new(PgTranslationSetStore::new(pool.clone())),
                    jobs: Arc::new(PgJobStore::new(pool.clone())),
                    pool: Some(pool),
                })
            }
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.pool.is_some()
    }

    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
            info!("Database pool closed");
        }
    }
}

async fn connect(config: &DatabaseConfig) -> AppResult<PgPool> {
    if config.url.trim().is_empty() {
        return Err(AppError::configuration(
            "database.url is required when database.provider is postgres",
        ));
    }

    info!(
        url = %redact_url(&config.url),
        max_connections = config.max_connections,
        "Connecting to translation set database"
    );

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
        .connect(&config.url)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to connect to database: {e}"),
                e,
            )
        })
}

/// Applies `migrations/` (translation_sets, jobs).
async fn migrate(pool: &PgPool) -> AppResult<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, format!("Migration failed: {e}"), e)
        })?;
    info!("Translation set schema is up to date");
    Ok(())
}

/// Drops the credentials from a connection URL before it is logged.
fn redact_url(url: &str) -> String {
    match (url.split_once("://"), url.rfind('@')) {
        (Some((scheme, _)), Some(at)) => format!("{scheme}://****@{}", &url[at + 1..]),
        _ => url.to_string(),
    }
}
