//! Runtime configuration loaded from the environment

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Server configuration
///
/// | Env Var           | Default   |
/// |-------------------|-----------|
/// | `HOST`            | `0.0.0.0` |
/// | `PORT`            | `8080`    |
/// | `DATABASE_URL`    | `data.db` |
/// | `MEDIA_ROOT`      | `media`   |
/// | `AUTHORIZATION`   | unset     |
/// | `SEED_CATEGORIES` | empty     |
/// | `DEVELOPMENT`     | unset     |
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,

    /// Path of the redb database file
    pub database_url: String,

    /// Directory uploaded listing images are written to
    pub media_root: PathBuf,

    /// When set, add/edit/delete require a matching `Authorization` header.
    /// An empty value disables the check.
    pub admin_token: Option<String>,

    /// Categories created at startup if they do not exist yet
    pub seed_categories: Vec<String>,

    /// Enables debug logging
    pub development: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 8080,
            database_url: "data.db".to_string(),
            media_root: PathBuf::from("media"),
            admin_token: None,
            seed_categories: Vec::new(),
            development: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host = match env::var("HOST") {
            Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "HOST",
                expected: "IP address",
                value,
            })?,
            Err(_) => defaults.host,
        };

        let port = match env::var("PORT") {
            Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                expected: "port number",
                value,
            })?,
            Err(_) => defaults.port,
        };

        let admin_token = env::var("AUTHORIZATION")
            .ok()
            .filter(|token| !token.is_empty());

        let seed_categories = env::var("SEED_CATEGORIES")
            .map(|raw| split_list(&raw))
            .unwrap_or_default();

        Ok(Self {
            host,
            port,
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            media_root: env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.media_root),
            admin_token,
            seed_categories,
            development: env::var_os("DEVELOPMENT").is_some(),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Default tracing filter when `RUST_LOG` is not set
    pub fn log_filter(&self) -> &'static str {
        if self.development {
            "listings=debug,tower_http=debug"
        } else {
            "listings=info,tower_http=info"
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
