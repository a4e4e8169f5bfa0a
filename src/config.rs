use std::env;

use thiserror::Error;

/// Minimum key length accepted by `actix_web::cookie::Key::from`.
const SECRET_KEY_MIN_LEN: usize = 64;

/// Errors raised while reading the server configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got `{value}`")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("SECRET_KEY must be at least {SECRET_KEY_MIN_LEN} bytes long")]
    SecretTooShort,
}

/// Runtime settings for the HTTP server, read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub address: String,
    pub port: u16,
    /// Cookie signing/encryption secret; a random key is generated when absent.
    pub secret_key: Option<String>,
    /// Cookie domain shared by the storefront and admin hosts.
    pub domain: Option<String>,
    pub cookie_secure: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: "app.db".to_string(),
            address: "127.0.0.1".to_string(),
            port: 8080,
            secret_key: None,
            domain: None,
            cookie_secure: false,
        }
    }
}

impl ServerConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                expected: "port number",
                value,
            })?,
            None => defaults.port,
        };

        let cookie_secure = match lookup("COOKIE_SECURE") {
            Some(value) => parse_bool(&value).ok_or(ConfigError::Invalid {
                name: "COOKIE_SECURE",
                expected: "boolean",
                value,
            })?,
            None => defaults.cookie_secure,
        };

        let secret_key = lookup("SECRET_KEY").filter(|value| !value.is_empty());
        if secret_key
            .as_ref()
            .is_some_and(|secret| secret.len() < SECRET_KEY_MIN_LEN)
        {
            return Err(ConfigError::SecretTooShort);
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            address: lookup("ADDRESS").unwrap_or(defaults.address),
            port,
            secret_key,
            domain: lookup("DOMAIN").filter(|value| !value.is_empty()),
            cookie_secure,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
