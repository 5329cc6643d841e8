//! Tries to create an `AppConfig` from config files.
//! Layers `base.toml`, the environment specific file and `APP_` prefixed environment variables
//! with `figment`.
//! Gets initialized with `OnceLock` so it only needs to get initialized once.

mod error;
mod types;

use std::{path::Path, sync::OnceLock};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use secrecy::SecretString;
use tracing::info;

pub use error::{ConfigError, ConfigResult};
pub use types::{AppConfig, DbConfig, Environment, NetConfig, SslRequire, TurnstileConfig};

/// Allocates a static `OnceLock` containing `AppConfig`.
/// This ensures configuration only gets initialized the first time we call this function.
/// Every other caller gets a &'static ref to AppConfig.
/// Panics if anything goes wrong.
pub fn get_or_init_config() -> &'static AppConfig {
    static CONFIG_INIT: OnceLock<AppConfig> = OnceLock::new();
    CONFIG_INIT.get_or_init(|| {
        info!("{:<20} - Initializing the configuration", "get_or_init_config");
        let base_path = std::env::current_dir().expect("Failed to determine the current DIR.");
        let config_dir = base_path.join("config");

        let environment: Environment = std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()
            .unwrap_or_else(|er| panic!("Fatal Error: Parsing APP_ENVIRONMENT: {er}"));

        let mut config = AppConfig::load(&config_dir, &environment)
            .unwrap_or_else(|er| panic!("Fatal Error: Building config: {er}"));

        // Setup DbConfig for production
        if matches!(environment, Environment::Production) {
            // Panic early if there are any problems.
            let production_db = std::env::var("DATABASE_URL").unwrap_or_else(|er| {
                panic!("Fatal Error: While looking for DATABASE_URL env variable: {er:?}")
            });
            config.db_config = production_db.parse().unwrap_or_else(|er| {
                panic!("Fatal Error: While parsing DbConfig from String: {er:?}")
            });
        }

        config.turnstile_config.apply_env_overrides(
            std::env::var("TURNSTILE_SECRET_KEY").ok(),
            std::env::var("TURNSTILE_SITE_KEY").ok(),
        );

        config
    })
}

impl AppConfig {
    /// Merges `base.toml`, `{environment}.toml` and `APP_` prefixed environment variables,
    /// later sources overriding earlier ones. Nested keys are separated with `__` in env variables,
    /// e.g. `APP_NET_CONFIG__APP_PORT=9000`.
    pub fn load(config_dir: &Path, environment: &Environment) -> ConfigResult<Self> {
        let environment_filename = format!("{}.toml", environment.as_ref().to_lowercase());

        let config = Figment::new()
            .merge(Toml::file(config_dir.join("base.toml")))
            .merge(Toml::file(config_dir.join(environment_filename)))
            .merge(Env::prefixed("APP_").split("__"))
            .extract()?;

        Ok(config)
    }
}

impl TurnstileConfig {
    /// Environment keys take precedence over the file based ones.
    /// An empty secret switches verification off, the same as a missing one.
    pub fn apply_env_overrides(&mut self, secret_key: Option<String>, site_key: Option<String>) {
        if let Some(secret_key) = secret_key {
            self.secret_key = Some(SecretString::from(secret_key));
        }
        if let Some(site_key) = site_key {
            self.site_key = Some(site_key);
        }
    }
}
