use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub media: MediaConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MediaConfig {
    /// Directory that image urls resolve under when unlinking files.
    pub root_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    #[serde(default = "default_currency")]
    pub default_currency: String,
    #[serde(default = "default_min_description")]
    pub min_active_description_chars: usize,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_min_description() -> usize {
    10
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Layer on the environment-specific file, if present
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Finally environment variables, e.g. VOYAGO__SERVER__PORT=9090
            .add_source(config::Environment::with_prefix("VOYAGO").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
