//! Configuration module
//!
//! Env-driven configuration for the repositories, storage backend, and
//! upload limits. Call `dotenvy::dotenv().ok()` before `from_env` in binaries.

use std::env;

const DEFAULT_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_UPLOAD_MAX_BYTES: usize = 100 * 1024 * 1024;
const DEFAULT_LOGO_UPLOAD_MAX_BYTES: usize = 5 * 1024 * 1024;
const DEFAULT_UPLOAD_MAX_FILES: usize = 10;

#[derive(Clone, Debug)]
pub struct LingoraConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
    // Local storage backend (development and tests)
    pub local_storage_path: String,
    pub local_storage_base_url: String,
    // Upload ceilings, enforced before any storage call
    pub upload_max_bytes: usize,
    pub logo_upload_max_bytes: usize,
    pub upload_max_files: usize,
}

impl LingoraConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        Ok(LingoraConfig {
            database_url,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CONNECTION_TIMEOUT_SECS),
            environment,
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| "./storage".to_string()),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000/media".to_string()),
            upload_max_bytes: env::var("UPLOAD_MAX_SIZE_MB")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .map(|mb| mb * 1024 * 1024)
                .unwrap_or(DEFAULT_UPLOAD_MAX_BYTES),
            logo_upload_max_bytes: env::var("LOGO_UPLOAD_MAX_SIZE_MB")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .map(|mb| mb * 1024 * 1024)
                .unwrap_or(DEFAULT_LOGO_UPLOAD_MAX_BYTES),
            upload_max_files: env::var("UPLOAD_MAX_FILES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_UPLOAD_MAX_FILES),
        })
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}
