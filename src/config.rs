//! Application configuration loaded from environment variables.
//!
//! Loaded once at startup and passed explicitly to every component that
//! needs it; nothing reads the environment after `Config::from_env` returns.

use std::env;
use std::time::Duration;

/// Which persistence backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local maps; data is lost on restart
    Memory,
    /// Google Cloud Firestore (or the emulator)
    Firestore,
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "firestore" => Ok(StoreBackend::Firestore),
            _ => Err(ConfigError::Invalid("STORE_BACKEND")),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Server port
    pub port: u16,
    /// Deployment platform; `dev` unlocks `/admin/reset`
    pub platform: String,
    /// Persistence backend
    pub store_backend: StoreBackend,
    /// GCP project ID (Firestore backend only)
    pub gcp_project_id: String,
    /// Frontend origin allowed by CORS
    pub frontend_url: String,
    /// Directory served under `/app/`
    pub static_dir: String,
    /// Lifetime of issued access tokens
    pub access_token_ttl: Duration,
    /// Words masked by the content moderator
    pub denylist: Vec<String>,

    // --- Secrets ---
    /// HMAC key for access tokens (raw bytes)
    pub jwt_secret: Vec<u8>,
}

pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 60 * 60;
pub const DEFAULT_DENYLIST: &[&str] = &["kerfuffle", "sharbert", "fornax"];
pub const DEFAULT_STATIC_DIR: &str = "static";

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            platform: "dev".to_string(),
            store_backend: StoreBackend::Memory,
            gcp_project_id: "test-project".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            static_dir: DEFAULT_STATIC_DIR.to_string(),
            access_token_ttl: Duration::from_secs(DEFAULT_ACCESS_TOKEN_TTL_SECS),
            denylist: DEFAULT_DENYLIST.iter().map(|w| w.to_string()).collect(),
            jwt_secret: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let access_token_ttl = match env::var("ACCESS_TOKEN_TTL_SECS") {
            Ok(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid("ACCESS_TOKEN_TTL_SECS"))?;
                if secs == 0 {
                    return Err(ConfigError::Invalid("ACCESS_TOKEN_TTL_SECS"));
                }
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_ACCESS_TOKEN_TTL_SECS),
        };

        let denylist = match env::var("CHIRPY_DENYLIST") {
            Ok(raw) => parse_denylist(&raw),
            Err(_) => DEFAULT_DENYLIST.iter().map(|w| w.to_string()).collect(),
        };

        let jwt_secret = env::var("JWT_SECRET")
            .map(|v| v.trim().to_string())
            .map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.is_empty() {
            return Err(ConfigError::Invalid("JWT_SECRET"));
        }

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            platform: env::var("PLATFORM").unwrap_or_else(|_| "prod".to_string()),
            store_backend: env::var("STORE_BACKEND")
                .unwrap_or_else(|_| "memory".to_string())
                .parse()?,
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| DEFAULT_STATIC_DIR.to_string()),
            access_token_ttl,
            denylist,
            jwt_secret: jwt_secret.into_bytes(),
        })
    }

    /// Whether destructive admin endpoints are enabled.
    pub fn is_dev(&self) -> bool {
        self.platform == "dev"
    }
}

/// Parse a comma-separated denylist, dropping blanks and normalizing case.
fn parse_denylist(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("JWT_SECRET", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("CHIRPY_DENYLIST", "Kerfuffle, sharbert,,fornax ");
        env::remove_var("ACCESS_TOKEN_TTL_SECS");
        env::remove_var("STORE_BACKEND");
        env::remove_var("STATIC_DIR");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.jwt_secret, b"test_jwt_key_32_bytes_minimum!!");
        assert_eq!(config.denylist, vec!["kerfuffle", "sharbert", "fornax"]);
        assert_eq!(
            config.access_token_ttl,
            Duration::from_secs(DEFAULT_ACCESS_TOKEN_TTL_SECS)
        );
        assert_eq!(config.store_backend, StoreBackend::Memory);
        // Never the working directory, which holds .env
        assert_eq!(config.static_dir, DEFAULT_STATIC_DIR);
    }

    #[test]
    fn test_store_backend_parse() {
        assert_eq!(
            "Firestore".parse::<StoreBackend>().unwrap(),
            StoreBackend::Firestore
        );
        assert!("postgres".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_only_dev_platform_is_dev() {
        let mut config = Config::test_default();
        assert!(config.is_dev());
        config.platform = "prod".to_string();
        assert!(!config.is_dev());
    }
}
