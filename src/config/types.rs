//! The configuration structs used to build the AppConfig, and their impls.
use std::{str::FromStr, time::Duration};

use lazy_regex::regex_captures;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sqlx::{
    postgres::{PgConnectOptions, PgSslMode},
    ConnectOptions,
};
use strum_macros::AsRefStr;

use crate::config::ConfigError;

// ###################################
// ->   STRUCTS
// ###################################
#[derive(AsRefStr)]
pub enum Environment {
    Local,
    Production,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AppConfig {
    pub net_config: NetConfig,
    pub db_config: DbConfig,
    pub turnstile_config: TurnstileConfig,
}

#[derive(Deserialize, Clone, Debug)]
pub struct NetConfig {
    pub host: [u8; 4],
    pub app_port: u16,
    pub base_url: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DbConfig {
    pub username: String,
    pub password: SecretString,
    pub port: u16,
    pub host: String,
    pub db_name: String,
    #[serde(default)]
    pub require_ssl: SslRequire,
}

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SslRequire {
    #[default]
    Prefer,
    Require,
    Disable,
}

/// Bot verification settings.
/// Verification is only enforced when `secret_key` is present and non-empty.
#[derive(Deserialize, Clone, Debug)]
pub struct TurnstileConfig {
    pub url: String,
    #[serde(default)]
    pub secret_key: Option<SecretString>,
    /// Public key rendered into the landing page widget.
    #[serde(default)]
    pub site_key: Option<String>,
    pub timeout_millis: u64,
}

// ###################################
// ->   IMPLs
// ###################################
impl TurnstileConfig {
    pub fn secret(&self) -> Option<&SecretString> {
        self.secret_key
            .as_ref()
            .filter(|secret| !secret.expose_secret().trim().is_empty())
    }

    pub fn site_key(&self) -> Option<&str> {
        self.site_key.as_deref().filter(|key| !key.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_millis)
    }
}

impl DbConfig {
    pub fn connection_options(&self) -> PgConnectOptions {
        self.connection_options_without_db().database(&self.db_name)
    }
    pub fn connection_options_without_db(&self) -> PgConnectOptions {
        // Don't try to use the '$HOME/.pgpass' file.
        PgConnectOptions::new_without_pgpass()
            .host(&self.host)
            .username(&self.username)
            .password(self.password.expose_secret())
            .port(self.port)
            .ssl_mode(self.require_ssl.into())
            .log_statements(tracing::log::LevelFilter::Trace)
    }
}

impl From<SslRequire> for PgSslMode {
    fn from(value: SslRequire) -> Self {
        match value {
            SslRequire::Require => PgSslMode::Require,
            SslRequire::Disable => PgSslMode::Disable,
            SslRequire::Prefer => PgSslMode::Prefer,
        }
    }
}

// ###################################
// ->   PARSING
// ###################################
impl TryFrom<String> for Environment {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            _ => Err(Self::Error::StringToEnvironmentFail(value)),
        }
    }
}

impl FromStr for DbConfig {
    type Err = ConfigError;

    /// Parses `postgres://{username}:{password}@{hostname}:{port}/{database}?{options}`.
    /// Only the `sslmode` option is honoured.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (_whole, username, password, host, port, db_name, options) = regex_captures!(
            r#"^postgres:\/\/([^:]+):([^@]+)@([^:\/]+):(\d+)\/([^\s\/?]+)(\?[^\s]*)?$"#,
            value
        )
        .ok_or(ConfigError::StringToDbConfigFail)?;

        let port = port.parse().map_err(|_| ConfigError::StringToDbConfigFail)?;

        let require_ssl = options
            .strip_prefix('?')
            .into_iter()
            .flat_map(|options| options.split(['&', ',']))
            .filter_map(|option| option.split_once('='))
            .find_map(|(id, val)| match (id, val) {
                ("sslmode", "disable") => Some(SslRequire::Disable),
                ("sslmode", "require") => Some(SslRequire::Require),
                ("sslmode", "prefer") => Some(SslRequire::Prefer),
                _ => None,
            })
            .unwrap_or_default();

        Ok(DbConfig {
            username: username.to_string(),
            password: SecretString::from(password.to_string()),
            port,
            host: host.to_string(),
            db_name: db_name.to_string(),
            require_ssl,
        })
    }
}

// ###################################
// ->   TESTS
// ###################################
