//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::net::SocketAddr;
use textcal::{
    auth::{DEFAULT_ITERATIONS, DEFAULT_MEMORY_KIB, DEFAULT_PARALLELISM},
    db::DatabaseConfig,
    session::DEFAULT_SESSION_TTL_SECS,
};

use crate::api::cookies::DEFAULT_COOKIE_NAME;

const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Ten years
const MAX_SESSION_TTL_SECS: i64 = 10 * 365 * 86_400;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Where accounts, sessions and events live
    pub storage: StorageConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Session cookie and lifetime
    pub session: SessionConfig,
    /// Date extractor process
    pub extractor: ExtractorConfig,
    /// Prometheus listener; metrics are off when unset
    pub metrics_bind: Option<SocketAddr>,
}

/// Storage backend
#[derive(Debug, Clone)]
pub enum StorageConfig {
    Postgres(DatabaseConfig),
    /// In-process stores; nothing survives a restart
    Memory,
}

/// Security-related configuration
#[derive(Clone)]
pub struct SecurityConfig {
    /// Password hashing pepper (required)
    pub password_pepper: String,
    /// Argon2 memory cost in KiB
    pub argon2_memory_kib: u32,
    /// Argon2 iterations
    pub argon2_iterations: u32,
    /// Argon2 lanes
    pub argon2_parallelism: u32,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("password_pepper", &"<redacted>")
            .field("argon2_memory_kib", &self.argon2_memory_kib)
            .field("argon2_iterations", &self.argon2_iterations)
            .field("argon2_parallelism", &self.argon2_parallelism)
            .finish()
    }
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    /// Idle lifetime of a session, also the cookie `Max-Age`
    pub ttl_secs: i64,
    /// Mark the cookie `Secure`
    pub secure_cookie: bool,
    /// Seconds between expired-session sweeps
    pub purge_interval_secs: u64,
}

/// Date extractor configuration
///
/// The extractor runs as `program args... <text>`.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub program: String,
    pub args: Vec<String>,
    pub timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Bind address from the command line
    /// * `database_url_override` - Database URL from the command line
    /// * `memory` - Use in-memory stores instead of PostgreSQL
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
        memory: bool,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_addr("SERVER_BIND", DEFAULT_BIND)?,
        };

        let storage = if memory {
            StorageConfig::Memory
        } else {
            let mut database = DatabaseConfig::from_env();
            if let Some(url) = database_url_override {
                database.database_url = url;
            }
            StorageConfig::Postgres(database)
        };

        // Security configuration (REQUIRED)
        let password_pepper =
            std::env::var("PASSWORD_PEPPER").map_err(|_| ConfigError::MissingRequired {
                var: "PASSWORD_PEPPER".to_string(),
                hint: "Generate with: openssl rand -hex 16".to_string(),
            })?;

        let security = SecurityConfig {
            password_pepper,
            argon2_memory_kib: parse_env_or("ARGON2_MEMORY_KIB", DEFAULT_MEMORY_KIB),
            argon2_iterations: parse_env_or("ARGON2_ITERATIONS", DEFAULT_ITERATIONS),
            argon2_parallelism: parse_env_or("ARGON2_PARALLELISM", DEFAULT_PARALLELISM),
        };

        let session = SessionConfig {
            cookie_name: std::env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| DEFAULT_COOKIE_NAME.to_string()),
            ttl_secs: parse_env_or("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS),
            secure_cookie: parse_env_or("SESSION_COOKIE_SECURE", false),
            purge_interval_secs: parse_env_or("SESSION_PURGE_INTERVAL_SECS", 300),
        };

        let extractor = ExtractorConfig {
            program: std::env::var("EXTRACTOR_PROGRAM").unwrap_or_else(|_| "python3".to_string()),
            args: vec![std::env::var("EXTRACTOR_SCRIPT").unwrap_or_else(|_| "./main.py".to_string())],
            timeout_secs: parse_env_or("EXTRACTOR_TIMEOUT_SECS", 10),
        };

        let metrics_bind = match std::env::var("METRICS_BIND") {
            Ok(value) if !value.is_empty() => {
                Some(value.parse().map_err(|_| ConfigError::Invalid {
                    var: "METRICS_BIND".to_string(),
                    reason: format!("Not a socket address: {value}"),
                })?)
            }
            _ => None,
        };

        Ok(ServerConfig {
            bind,
            storage,
            security,
            session,
            extractor,
            metrics_bind,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.password_pepper.len() < 16 {
            return Err(ConfigError::Invalid {
                var: "PASSWORD_PEPPER".to_string(),
                reason: "Must be at least 16 characters (64-bit security)".to_string(),
            });
        }

        if self.session.cookie_name.is_empty()
            || !self
                .session
                .cookie_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ConfigError::Invalid {
                var: "SESSION_COOKIE_NAME".to_string(),
                reason: "Must be non-empty ASCII letters, digits, '_' or '-'".to_string(),
            });
        }

        if self.session.ttl_secs <= 0 || self.session.ttl_secs > MAX_SESSION_TTL_SECS {
            return Err(ConfigError::Invalid {
                var: "SESSION_TTL_SECS".to_string(),
                reason: format!("Must be between 1 and {MAX_SESSION_TTL_SECS}"),
            });
        }

        if self.session.purge_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "SESSION_PURGE_INTERVAL_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.extractor.program.is_empty() {
            return Err(ConfigError::Invalid {
                var: "EXTRACTOR_PROGRAM".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        if self.extractor.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "EXTRACTOR_TIMEOUT_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if let StorageConfig::Postgres(database) = &self.storage {
            if database.max_connections < database.min_connections {
                return Err(ConfigError::Invalid {
                    var: "DB_MAX_CONNECTIONS".to_string(),
                    reason: format!(
                        "Must be at least min connections ({})",
                        database.min_connections
                    ),
                });
            }
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn parse_addr(key: &str, default: &str) -> Result<SocketAddr, ConfigError> {
    let value = std::env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|_| ConfigError::Invalid {
        var: key.to_string(),
        reason: format!("Not a socket address: {value}"),
    })
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
