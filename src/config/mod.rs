use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_duration_hours: i64,
    #[serde(default)]
    pub secure_cookies: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaginationConfig {
    pub default_limit: i64,
    pub max_limit: i64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("server.base_url", "http://localhost:5000")?
            .set_default("database.url", "sqlite://clubhub.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("auth.jwt_secret", "change-me-in-production")?
            .set_default("auth.token_duration_hours", 24 * 7)?
            .set_default("auth.secure_cookies", false)?
            .set_default("pagination.default_limit", 10)?
            .set_default("pagination.max_limit", 100)?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with CLUBHUB__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("CLUBHUB").separator("__"))

            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
                base_url: "http://localhost:5000".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://clubhub.db?mode=rwc".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                jwt_secret: "change-me-in-production".to_string(),
                token_duration_hours: 24 * 7,
                secure_cookies: false,
            },
            pagination: PaginationConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable_without_any_source() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 5000);
        assert!(settings.database.url.starts_with("sqlite:"));
        assert!(settings.pagination.max_limit >= settings.pagination.default_limit);
    }
}
