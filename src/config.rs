use std::env;
use std::str::FromStr;

/// Which persistence backend the catalog runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Mongo,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::Invalid("STORE_BACKEND")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Storage
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub mongodb_url: Option<String>,
    pub mongodb_database: String,

    // Startup connectivity probe
    pub db_connect_retries: u32,
    pub db_connect_delay_ms: u64,

    // Import
    pub max_upload_bytes: usize,

    // Server
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if exists

        let store_backend: StoreBackend = env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .parse()?;

        let database_url = env::var("DATABASE_URL").ok();
        let mongodb_url = env::var("MONGODB_URL").ok();

        match store_backend {
            StoreBackend::Postgres if database_url.is_none() => {
                return Err(ConfigError::Missing("DATABASE_URL"))
            }
            StoreBackend::Mongo if mongodb_url.is_none() => {
                return Err(ConfigError::Missing("MONGODB_URL"))
            }
            _ => {}
        }

        Ok(Self {
            store_backend,
            database_url,
            mongodb_url,
            mongodb_database: env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| "api_catalog".to_string()),

            db_connect_retries: parse_var("DB_CONNECT_RETRIES", 5)?,
            db_connect_delay_ms: parse_var("DB_CONNECT_DELAY_MS", 5000)?,

            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,

            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 5000)?,
        })
    }

    /// Configuration for an in-process store (tests, local demos)
    pub fn in_memory() -> Self {
        Self {
            store_backend: StoreBackend::Memory,
            database_url: None,
            mongodb_url: None,
            mongodb_database: "api_catalog".to_string(),
            db_connect_retries: 1,
            db_connect_delay_ms: 0,
            max_upload_bytes: 10 * 1024 * 1024,
            host: "127.0.0.1".to_string(),
            port: 0,
        }
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid environment variable: {0}")]
    Invalid(&'static str),
}
