use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    /// Base URL that uploaded objects are reachable under. Defaults to
    /// path-style `{endpoint}/{bucket}`.
    pub public_base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub analysis: AnalysisConfig,
}

impl AppConfig {
    /// Resolve configuration from the environment once at startup. The
    /// signing secret and storage credentials only live here — handlers
    /// receive them through `AppState`, never from ambient globals.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = require_env("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: require_env("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "resumind".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "resumind-users".into()),
            ttl_days: std::env::var("JWT_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(7),
        };
        let storage = StorageConfig {
            endpoint: require_env("STORAGE_ENDPOINT")?,
            bucket: require_env("STORAGE_BUCKET")?,
            access_key: require_env("STORAGE_ACCESS_KEY")?,
            secret_key: require_env("STORAGE_SECRET_KEY")?,
            region: std::env::var("STORAGE_REGION").unwrap_or_else(|_| "us-east-1".into()),
            public_base_url: std::env::var("STORAGE_PUBLIC_URL").ok(),
        };
        let analysis = AnalysisConfig {
            base_url: require_env("ANALYSIS_BASE_URL")?,
            timeout_secs: std::env::var("ANALYSIS_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60),
        };
        Ok(Self {
            database_url,
            jwt,
            storage,
            analysis,
        })
    }
}

fn require_env(key: &str) -> anyhow::Result<String> {
    std::env::var(key).with_context(|| format!("required environment variable '{key}' is not set"))
}
