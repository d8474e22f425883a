//! Configuration management for the Stock Chic server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with STOCKCHIC__ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// CORS configuration
    pub cors: CorsConfig,

    /// Point-of-sale rules
    pub sales: SalesConfig,

    /// Initial manager account
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWT tokens
    pub secret: String,

    /// Access token expiration in seconds
    pub access_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    /// Allowed browser origin; "*" allows any
    pub allowed_origin: String,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct SalesConfig {
    /// Reject sales whose payment does not cover the total
    pub reject_underpayment: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BootstrapConfig {
    /// Email of the manager created when no account exists
    pub manager_email: Option<String>,

    /// Password of that manager
    pub manager_password: Option<String>,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("STOCKCHIC_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("jwt.access_token_expiry", 86400)?
            .set_default("cors.allowed_origin", "*")?
            .set_default("sales.reject_underpayment", false)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (STOCKCHIC__ prefix)
            .add_source(
                Environment::with_prefix("STOCKCHIC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl SalesConfig {
    pub fn policy(&self) -> shared::SalePolicy {
        shared::SalePolicy {
            reject_underpayment: self.reject_underpayment,
        }
    }
}

impl BootstrapConfig {
    /// Both credentials, when configured
    pub fn manager_credentials(&self) -> Option<(&str, &str)> {
        match (&self.manager_email, &self.manager_password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some((email.as_str(), password.as_str()))
            }
            _ => None,
        }
    }
}
