//! Configuration management for the web server
//!
//! This module loads configuration from environment variables and provides
//! a type-safe configuration struct. `main` loads `.env` before reading it.
//!
//! # Environment Variables
//!
//! - `APP_HOST`: Host to bind to (default: 0.0.0.0)
//! - `APP_PORT`: Port to bind to (default: 8080)
//! - `APP_PRODUCTION`: Enables HSTS and Secure cookies (default: false)
//! - `DATABASE_URL`: SQLite connection string (default: sqlite://taskboard.db)
//! - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 5)
//! - `SESSION_SECRET`: Secret key for session signing (required)
//! - `SESSION_TTL_HOURS`: Session lifetime (default: 168)
//! - `ADMIN_USERNAME` / `ADMIN_PASSWORD`: Admin account created at startup
//! - `RUST_LOG`: Log filter (default: taskboard_web=debug,taskboard_shared=info,tower_http=debug)
//! - `LOG_FORMAT`: `json` for JSON log lines
//!
//! # Example
//!
//! ```no_run
//! use taskboard_web::config::Config;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! println!("Server will listen on {}", config.bind_address());
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::env;

/// Minimum accepted length of the session secret
pub const MIN_SECRET_LENGTH: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub app: AppConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Session configuration
    pub session: SessionConfig,

    /// Admin account to create at startup, if any
    pub admin: Option<AdminBootstrap>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Production mode (HTTPS deployment)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Secret key for session signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    #[serde(skip_serializing)]
    pub secret: String,

    /// Session lifetime in hours
    pub ttl_hours: i64,
}

/// Admin bootstrap credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminBootstrap {
    /// Admin username
    pub username: String,

    /// Admin password (plaintext, hashed on creation)
    #[serde(skip_serializing)]
    pub password: String,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `SESSION_SECRET` is missing or shorter than 32 characters
    /// - A numeric or boolean variable has an invalid value
    pub fn from_env() -> anyhow::Result<Self> {
        let host = env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;
        let production = env::var("APP_PRODUCTION")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()?;

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://taskboard.db".to_string());
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()?;

        let secret = env::var("SESSION_SECRET")
            .map_err(|_| anyhow::anyhow!("SESSION_SECRET environment variable is required"))?;
        let ttl_hours = env::var("SESSION_TTL_HOURS")
            .unwrap_or_else(|_| "168".to_string())
            .parse::<i64>()?;

        let admin = match (env::var("ADMIN_USERNAME"), env::var("ADMIN_PASSWORD")) {
            (Ok(username), Ok(password)) => Some(AdminBootstrap { username, password }),
            _ => None,
        };

        let config = Self {
            app: AppConfig {
                host,
                port,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            session: SessionConfig { secret, ttl_hours },
            admin,
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks values that parse but are unusable
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.session.secret.len() < MIN_SECRET_LENGTH {
            anyhow::bail!(
                "SESSION_SECRET must be at least {} characters long",
                MIN_SECRET_LENGTH
            );
        }

        if self.session.ttl_hours <= 0 {
            anyhow::bail!("SESSION_TTL_HOURS must be positive");
        }

        if let Some(admin) = &self.admin {
            if admin.username.trim().is_empty() || admin.password.is_empty() {
                anyhow::bail!("ADMIN_USERNAME and ADMIN_PASSWORD must not be empty");
            }
        }

        Ok(())
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            app: AppConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                production: false,
            },
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
            },
            session: SessionConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
                ttl_hours: 1,
            },
            admin: None,
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(test_config().bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_short_secret() {
        let mut config = test_config();
        config.session.secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_admin() {
        let mut config = test_config();
        config.admin = Some(AdminBootstrap {
            username: " ".to_string(),
            password: "pw".to_string(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_secrets_not_serialized() {
        let mut config = test_config();
        config.admin = Some(AdminBootstrap {
            username: "root".to_string(),
            password: "hunter2".to_string(),
        });

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("test-secret-key"));
        assert!(!json.contains("hunter2"));
        assert!(json.contains("root"));
    }
}
