use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// People and teams offered in the assignee pickers.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Directory {
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub teams: Vec<String>,
}

/// Configuration options of the settings console.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    pub database_url: String,
    pub address: String,
    pub port: u16,
    pub templates_dir: String,
    pub static_dir: String,
    /// Signing key of the flash message cookie; at least 64 bytes.
    #[serde(default)]
    pub secret_key: String,
    #[serde(default)]
    pub directory: Directory,
}

impl ServerConfig {
    /// Loads `config/default.yaml`, then `config/{APP_ENV}.yaml`, then
    /// `APP_*` environment variables, later sources overriding earlier ones.
    pub fn load() -> Result<Self, ConfigError> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());

        Config::builder()
            .add_source(File::with_name("config/default"))
            .add_source(File::with_name(&format!("config/{app_env}")).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()
    }
}
