//! Environment-driven configuration.
//!
//! All tunables are read once at startup via [`Config::from_env`]. Provider
//! credentials and the storage backend selection are opaque to the pipeline
//! itself; they are only threaded into the storage/verification factories.

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_PRESIGN_TTL_SECS: u64 = 3600;
const DEFAULT_UPLOAD_URL_TTL_SECS: u64 = 900;
const DEFAULT_VERIFICATION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_VERIFICATION_WORKERS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackendKind {
    S3,
    Local,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: String,

    /// When absent the service runs against the in-memory repository
    /// (dev/test only; nothing survives a restart).
    pub database_url: Option<String>,

    pub storage_backend: StorageBackendKind,
    pub s3_bucket: String,
    pub s3_region: String,
    pub s3_endpoint_url: Option<String>,
    pub local_storage_path: String,
    pub local_public_base_url: String,

    pub max_upload_bytes: usize,
    pub allowed_mime_types: Vec<String>,
    pub presign_ttl_secs: u64,
    pub upload_url_ttl_secs: u64,

    pub auto_verification_enabled: bool,
    pub verification_api_url: Option<String>,
    pub verification_api_key: Option<String>,
    pub verification_timeout_secs: u64,
    pub verification_workers: usize,

    pub jwt_secret: String,
}

fn env_or<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e)),
        Err(_) => Ok(default),
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

fn env_csv(key: &str, default: &[&str]) -> Vec<String> {
    env::var(key)
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_else(|_| default.iter().map(|s| s.to_string()).collect())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Best-effort .env loading; missing file is fine.
        let _ = dotenvy::dotenv();

        let storage_backend = match env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".to_string())
            .to_lowercase()
            .as_str()
        {
            "s3" => StorageBackendKind::S3,
            "local" => StorageBackendKind::Local,
            other => anyhow::bail!("Unknown STORAGE_BACKEND: {}", other),
        };

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_or("PORT", 8080u16)?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            database_url: env::var("DATABASE_URL").ok(),
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").unwrap_or_default(),
            s3_region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            s3_endpoint_url: env::var("S3_ENDPOINT_URL").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| "./data/documents".to_string()),
            local_public_base_url: env::var("LOCAL_PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080/files".to_string()),
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            allowed_mime_types: env_csv(
                "ALLOWED_MIME_TYPES",
                &["image/jpeg", "image/png", "image/webp", "application/pdf"],
            ),
            presign_ttl_secs: env_or("PRESIGN_TTL_SECS", DEFAULT_PRESIGN_TTL_SECS)?,
            upload_url_ttl_secs: env_or("UPLOAD_URL_TTL_SECS", DEFAULT_UPLOAD_URL_TTL_SECS)?,
            auto_verification_enabled: env_bool("AUTO_VERIFICATION_ENABLED", false),
            verification_api_url: env::var("VERIFICATION_API_URL").ok(),
            verification_api_key: env::var("VERIFICATION_API_KEY").ok(),
            verification_timeout_secs: env_or(
                "VERIFICATION_TIMEOUT_SECS",
                DEFAULT_VERIFICATION_TIMEOUT_SECS,
            )?,
            verification_workers: env_or("VERIFICATION_WORKERS", DEFAULT_VERIFICATION_WORKERS)?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
        };

        if config.storage_backend == StorageBackendKind::S3 && config.s3_bucket.is_empty() {
            anyhow::bail!("S3_BUCKET must be set when STORAGE_BACKEND=s3");
        }

        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment.to_lowercase().as_str(), "production" | "prod")
    }

    /// The mock verification tier is only legal when the feature flag is off
    /// or no provider key is configured.
    pub fn external_verification_configured(&self) -> bool {
        self.auto_verification_enabled
            && self.verification_api_url.is_some()
            && self.verification_api_key.is_some()
    }

    /// A config suitable for unit/integration tests; no environment access.
    pub fn for_tests() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            database_url: None,
            storage_backend: StorageBackendKind::Local,
            s3_bucket: String::new(),
            s3_region: "us-east-1".to_string(),
            s3_endpoint_url: None,
            local_storage_path: String::new(),
            local_public_base_url: "http://localhost:8080/files".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_mime_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/webp".to_string(),
                "application/pdf".to_string(),
            ],
            presign_ttl_secs: DEFAULT_PRESIGN_TTL_SECS,
            upload_url_ttl_secs: DEFAULT_UPLOAD_URL_TTL_SECS,
            auto_verification_enabled: false,
            verification_api_url: None,
            verification_api_key: None,
            verification_timeout_secs: 1,
            verification_workers: 2,
            jwt_secret: "test-secret".to_string(),
        }
    }
}
