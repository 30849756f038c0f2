use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use mongodb::Client as MongoClient;
use sea_orm::{ConnectOptions, Database};
use sqlx::postgres::PgPool;

use crate::config::{Config, StoreBackend};
use crate::repositories::{CatalogStore, InMemoryStore, MongoStore, PostgresStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
    pub config: Config,
}

impl AppState {
    /// Connect to the configured backend, retrying with exponential backoff
    pub async fn new(config: Config) -> Result<Self, AppStateError> {
        let store: Arc<dyn CatalogStore> = match config.store_backend {
            StoreBackend::Postgres => {
                let url = config
                    .database_url
                    .clone()
                    .ok_or(AppStateError::Config("DATABASE_URL"))?;
                let store = with_retry(&config, "postgres", || connect_postgres(&url)).await?;
                Arc::new(store)
            }
            StoreBackend::Mongo => {
                let url = config
                    .mongodb_url
                    .clone()
                    .ok_or(AppStateError::Config("MONGODB_URL"))?;
                let database = config.mongodb_database.clone();
                let store =
                    with_retry(&config, "mongo", || connect_mongo(&url, &database)).await?;
                Arc::new(store)
            }
            StoreBackend::Memory => {
                tracing::warn!("Using the in-memory store; data is lost on shutdown");
                Arc::new(InMemoryStore::new())
            }
        };

        Ok(Self { store, config })
    }

    /// Create AppState around an existing store (for testing)
    pub fn with_store(config: Config, store: Arc<dyn CatalogStore>) -> Self {
        Self { store, config }
    }
}

async fn connect_postgres(url: &str) -> Result<PostgresStore, AppStateError> {
    // Connect to PostgreSQL with SQLx (for migrations)
    let pg_pool = PgPool::connect(url)
        .await
        .map_err(|e| AppStateError::Postgres(e.to_string()))?;

    sqlx::migrate!("./migrations")
        .run(&pg_pool)
        .await
        .map_err(|e| AppStateError::Migration(e.to_string()))?;

    // Connect to PostgreSQL with SeaORM
    let mut opt = ConnectOptions::new(url);
    opt.max_connections(20)
        .min_connections(1)
        .sqlx_logging(true);

    let db = Database::connect(opt)
        .await
        .map_err(|e| AppStateError::Postgres(e.to_string()))?;

    Ok(PostgresStore::new(db))
}

async fn connect_mongo(url: &str, database: &str) -> Result<MongoStore, AppStateError> {
    let client = MongoClient::with_uri_str(url)
        .await
        .map_err(|e| AppStateError::Mongo(e.to_string()))?;

    let store = MongoStore::new(client.database(database));
    // The driver connects lazily; ping so a dead server fails here
    store
        .ping()
        .await
        .map_err(|e| AppStateError::Mongo(e.to_string()))?;

    Ok(store)
}

/// Run `connect` up to `db_connect_retries` times, doubling the delay
/// after each failure
async fn with_retry<T, F, Fut>(
    config: &Config,
    backend: &str,
    mut connect: F,
) -> Result<T, AppStateError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppStateError>>,
{
    let attempts = config.db_connect_retries.max(1);
    let mut delay = Duration::from_millis(config.db_connect_delay_ms);

    for attempt in 1..=attempts {
        match connect().await {
            Ok(value) => {
                tracing::info!(backend, attempt, "Database connection established");
                return Ok(value);
            }
            Err(err) if attempt < attempts => {
                tracing::warn!(
                    backend,
                    attempt,
                    retry_in_ms = delay.as_millis() as u64,
                    error = %err,
                    "Database connection failed, retrying"
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(err) => {
                tracing::error!(backend, attempt, error = %err, "Database connection failed");
                return Err(err);
            }
        }
    }

    Err(AppStateError::Config("DB_CONNECT_RETRIES"))
}

#[derive(Debug, thiserror::Error)]
pub enum AppStateError {
    #[error("Missing configuration: {0}")]
    Config(&'static str),

    #[error("PostgreSQL connection error: {0}")]
    Postgres(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("MongoDB connection error: {0}")]
    Mongo(String),
}
