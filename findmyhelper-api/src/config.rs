/// Configuration management for the API server
///
/// Loads configuration from environment variables into a typed struct.
/// Startup fails on missing or invalid required values; there are no silent
/// fallbacks between storage backends.
///
/// # Environment Variables
///
/// - `API_HOST`: host to bind to (default: 0.0.0.0)
/// - `API_PORT`: port to bind to (default: 8080)
/// - `PUBLIC_BASE_URL`: external URL used in emailed links (default: http://API_HOST:API_PORT)
/// - `STORAGE_BACKEND`: `postgres` or `memory` (required)
/// - `DATABASE_URL`: PostgreSQL connection string (required when backend is postgres)
/// - `SESSION_TTL_HOURS`: session lifetime (default: 168)
/// - `ADMIN_EMAIL`: account promoted to admin at startup (optional)
/// - `IDENTITY_ISSUER` / `IDENTITY_AUDIENCE` / `IDENTITY_SECRET`: federated
///   login verification parameters (all three or none)
/// - `EMAIL_API_URL` / `EMAIL_API_KEY` / `EMAIL_FROM_ADDRESS`: transactional
///   email provider (unset = emails are logged, not sent)
/// - `ADMIN_NOTIFY_ADDRESS`: recipient of new-application alerts (default: EMAIL_FROM_ADDRESS)
/// - `OBJECT_STORE_BASE_URL` / `OBJECT_STORE_BUCKET` / `OBJECT_STORE_API_KEY`:
///   image upload target (unset = uploads return a placeholder local URL)
/// - `CORS_ORIGINS`: comma-separated allowed origins (default: `*`)
/// - `PRODUCTION`: enables HSTS and secure cookies (default: false)
use findmyhelper_shared::auth::identity::IdentityConfig;
use serde::{Deserialize, Serialize};
use std::env;

/// Which storage backend to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendChoice {
    Postgres,
    Memory,
}

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Storage selection and connection
    pub storage: StorageConfig,

    /// Session configuration
    pub session: SessionConfig,

    /// Federated identity verification (None disables the federated path)
    pub identity: Option<IdentityConfig>,

    /// Transactional email provider (None means log-only)
    pub email: Option<EmailConfig>,

    /// Recipient of new provider-application alerts
    pub admin_notify_address: Option<String>,

    /// Account promoted to admin at startup
    pub admin_email: Option<String>,

    /// Object storage for image uploads (None means placeholder URLs)
    pub object_store: Option<ObjectStoreConfig>,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// External base URL for emailed links
    pub public_base_url: String,

    /// Allowed CORS origins; `*` means permissive
    pub cors_origins: Vec<String>,

    /// Production mode: HSTS and Secure cookies
    pub production: bool,
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Selected backend; never falls back to the other one
    pub backend: StorageBackendChoice,

    /// PostgreSQL connection URL (required for the postgres backend)
    pub database_url: Option<String>,

    /// Maximum number of pooled connections
    pub max_connections: u32,
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in hours
    pub ttl_hours: i64,
}

/// Transactional email provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// HTTP API endpoint of the email provider
    pub api_url: String,

    /// Bearer token for the provider
    pub api_key: String,

    /// From address on outgoing mail
    pub from_address: String,
}

/// Object storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectStoreConfig {
    /// HTTP API endpoint of the object store
    pub base_url: String,

    /// Bucket for uploaded images
    pub bucket: String,

    /// Bearer token for the store
    pub api_key: String,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or invalid, in
    /// particular an unknown `STORAGE_BACKEND` or a postgres backend without
    /// `DATABASE_URL`.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", host, port));

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let production = env::var("PRODUCTION")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let backend = match env::var("STORAGE_BACKEND")
            .map_err(|_| {
                anyhow::anyhow!(
                    "STORAGE_BACKEND environment variable is required (postgres or memory)"
                )
            })?
            .as_str()
        {
            "postgres" => StorageBackendChoice::Postgres,
            "memory" => StorageBackendChoice::Memory,
            other => anyhow::bail!("Unknown STORAGE_BACKEND: {} (expected postgres or memory)", other),
        };

        let database_url = env::var("DATABASE_URL").ok();
        if backend == StorageBackendChoice::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL is required when STORAGE_BACKEND=postgres");
        }

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let ttl_hours = env::var("SESSION_TTL_HOURS")
            .unwrap_or_else(|_| "168".to_string())
            .parse::<i64>()?;
        if ttl_hours <= 0 {
            anyhow::bail!("SESSION_TTL_HOURS must be positive");
        }

        let identity = match (
            env::var("IDENTITY_ISSUER").ok(),
            env::var("IDENTITY_AUDIENCE").ok(),
            env::var("IDENTITY_SECRET").ok(),
        ) {
            (Some(issuer), Some(audience), Some(secret)) => {
                if secret.len() < 32 {
                    anyhow::bail!("IDENTITY_SECRET must be at least 32 characters long");
                }
                Some(IdentityConfig {
                    issuer,
                    audience,
                    secret,
                })
            }
            (None, None, None) => None,
            _ => anyhow::bail!(
                "IDENTITY_ISSUER, IDENTITY_AUDIENCE, and IDENTITY_SECRET must be set together"
            ),
        };

        let email = match (
            env::var("EMAIL_API_URL").ok(),
            env::var("EMAIL_API_KEY").ok(),
            env::var("EMAIL_FROM_ADDRESS").ok(),
        ) {
            (Some(api_url), Some(api_key), Some(from_address)) => Some(EmailConfig {
                api_url,
                api_key,
                from_address,
            }),
            (None, None, None) => None,
            _ => anyhow::bail!(
                "EMAIL_API_URL, EMAIL_API_KEY, and EMAIL_FROM_ADDRESS must be set together"
            ),
        };

        let admin_notify_address = env::var("ADMIN_NOTIFY_ADDRESS")
            .ok()
            .or_else(|| email.as_ref().map(|e| e.from_address.clone()));

        let object_store = match (
            env::var("OBJECT_STORE_BASE_URL").ok(),
            env::var("OBJECT_STORE_BUCKET").ok(),
            env::var("OBJECT_STORE_API_KEY").ok(),
        ) {
            (Some(base_url), Some(bucket), Some(api_key)) => Some(ObjectStoreConfig {
                base_url,
                bucket,
                api_key,
            }),
            (None, None, None) => None,
            _ => anyhow::bail!(
                "OBJECT_STORE_BASE_URL, OBJECT_STORE_BUCKET, and OBJECT_STORE_API_KEY must be set together"
            ),
        };

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                public_base_url,
                cors_origins,
                production,
            },
            storage: StorageConfig {
                backend,
                database_url,
                max_connections,
            },
            session: SessionConfig { ttl_hours },
            identity,
            email,
            admin_notify_address,
            admin_email: env::var("ADMIN_EMAIL").ok(),
            object_store,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Configuration suitable for tests: memory backend, no external services
    pub fn for_tests() -> Self {
        Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                public_base_url: "http://localhost:8080".to_string(),
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            storage: StorageConfig {
                backend: StorageBackendChoice::Memory,
                database_url: None,
                max_connections: 1,
            },
            session: SessionConfig { ttl_hours: 24 },
            identity: Some(IdentityConfig {
                issuer: "https://id.test".to_string(),
                audience: "findmyhelper".to_string(),
                secret: "test-identity-secret-test-identity".to_string(),
            }),
            email: None,
            admin_notify_address: Some("ops@findmyhelper.test".to_string()),
            admin_email: None,
            object_store: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let mut config = Config::for_tests();
        config.api.host = "127.0.0.1".to_string();
        config.api.port = 8080;
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_test_config_uses_memory_backend() {
        let config = Config::for_tests();
        assert_eq!(config.storage.backend, StorageBackendChoice::Memory);
        assert!(config.email.is_none());
    }
}
