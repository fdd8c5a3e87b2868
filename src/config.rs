use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use validator::Validate;
use crate::core::CacheTtls;
use crate::models::SearchSettings;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub places: PlacesSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlacesSettings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_places_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Restricts autocomplete, e.g. `country:in`
    pub autocomplete_components: Option<String>,
}

impl PlacesSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Refuse to start without a usable API key
    pub fn require_api_key(&self) -> Result<(), ConfigError> {
        let key = self.api_key.trim();
        if key.is_empty() || key == crate::services::google::PLACEHOLDER_API_KEY {
            return Err(ConfigError::Message(
                "GOOGLE_PLACES_API_KEY is not set (or still the placeholder)".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_places_base_url() -> String { crate::services::google::DEFAULT_BASE_URL.to_string() }
fn default_timeout_secs() -> u64 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,
    #[serde(default = "default_nearby_ttl_secs")]
    pub nearby_ttl_secs: u64,
    #[serde(default = "default_details_ttl_secs")]
    pub details_ttl_secs: u64,
    #[serde(default = "default_geocode_ttl_secs")]
    pub geocode_ttl_secs: u64,
    #[serde(default = "default_autocomplete_ttl_secs")]
    pub autocomplete_ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            default_ttl_secs: default_ttl_secs(),
            nearby_ttl_secs: default_nearby_ttl_secs(),
            details_ttl_secs: default_details_ttl_secs(),
            geocode_ttl_secs: default_geocode_ttl_secs(),
            autocomplete_ttl_secs: default_autocomplete_ttl_secs(),
        }
    }
}

impl CacheSettings {
    pub fn ttls(&self) -> CacheTtls {
        CacheTtls {
            nearby: Duration::from_secs(self.nearby_ttl_secs),
            details: Duration::from_secs(self.details_ttl_secs),
            geocode: Duration::from_secs(self.geocode_ttl_secs),
            autocomplete: Duration::from_secs(self.autocomplete_ttl_secs),
        }
    }
}

fn default_max_entries() -> usize { 200 }
fn default_ttl_secs() -> u64 { 5 * 60 }
fn default_nearby_ttl_secs() -> u64 { 5 * 60 }
fn default_details_ttl_secs() -> u64 { 60 * 60 }
fn default_geocode_ttl_secs() -> u64 { 30 * 60 }
fn default_autocomplete_ttl_secs() -> u64 { 2 * 60 }

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SearchConfig {
    #[serde(default = "default_radius_cap_m")]
    #[validate(range(min = 100, max = 20000))]
    pub radius_cap_m: u32,
    #[serde(default = "default_growth_factor")]
    #[validate(range(min = 1.1, max = 10.0))]
    pub growth_factor: f64,
    #[serde(default = "default_max_attempts")]
    #[validate(range(min = 2, max = 32))]
    pub max_attempts: u32,
    #[serde(default = "default_fallback_limit")]
    #[validate(range(min = 1, max = 60))]
    pub fallback_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            radius_cap_m: default_radius_cap_m(),
            growth_factor: default_growth_factor(),
            max_attempts: default_max_attempts(),
            fallback_limit: default_fallback_limit(),
        }
    }
}

impl From<&SearchConfig> for SearchSettings {
    fn from(config: &SearchConfig) -> Self {
        SearchSettings {
            radius_cap_m: config.radius_cap_m,
            growth_factor: config.growth_factor,
            max_attempts: config.max_attempts,
            fallback_limit: config.fallback_limit,
        }
    }
}

fn default_radius_cap_m() -> u32 { 20_000 }
fn default_growth_factor() -> f64 { 2.0 }
fn default_max_attempts() -> u32 { 12 }
fn default_fallback_limit() -> usize { 15 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with CAFFY__)
    /// 5. `GOOGLE_PLACES_API_KEY`, if set
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., CAFFY__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("CAFFY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = apply_api_key_override(settings)?;
        Self::finish(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("CAFFY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = apply_api_key_override(settings)?;
        Self::finish(settings)
    }

    fn finish(settings: Config) -> Result<Self, ConfigError> {
        let settings: Settings = settings.try_deserialize()?;
        settings
            .search
            .validate()
            .map_err(|e| ConfigError::Message(format!("Invalid search settings: {}", e)))?;
        Ok(settings)
    }
}

/// The conventional `GOOGLE_PLACES_API_KEY` wins over the config files
fn apply_api_key_override(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("GOOGLE_PLACES_API_KEY") {
        Ok(key) if !key.is_empty() => Config::builder()
            .add_source(settings)
            .set_override("places.api_key", key)?
            .build(),
        _ => Ok(settings),
    }
}
