use config::{Config, Environment, File, FileFormat};
use error_stack::{Report, ResultExt};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::{
    DEFAULT_CURRENCY, DEFAULT_ENDPOINT_HOST, DEFAULT_ENDPOINT_PATH, DEFAULT_SYNC_IFRAME_URL,
    DEFAULT_TTL_MS,
};
use crate::error::AdapterError;

pub const ENVIRONMENT_VARIABLE_PREFIX: &str = "JUSTPREMIUM";
pub const ENVIRONMENT_VARIABLE_SEPARATOR: &str = "__";

/// Bidder endpoint and response defaults.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct AdapterSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Host of the remote auction endpoint, without scheme.
    #[serde(default = "default_endpoint_host")]
    #[validate(length(min = 1))]
    pub endpoint_host: String,

    #[serde(default = "default_endpoint_path")]
    #[validate(length(min = 1))]
    pub endpoint_path: String,

    /// TTL used when a bid omits its own, in milliseconds.
    #[serde(default = "default_ttl_ms")]
    #[validate(range(min = 1))]
    pub default_ttl_ms: u32,

    /// ISO 4217 code used when a bid omits its currency.
    #[serde(default = "default_currency")]
    #[validate(length(equal = 3))]
    pub default_currency: String,

    #[serde(default = "default_timeout_ms")]
    #[validate(range(min = 1, max = 60000))]
    pub timeout_ms: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SyncSettings {
    /// Protocol-relative iframe URL registered on user sync.
    #[serde(default = "default_sync_iframe_url")]
    #[validate(length(min = 1))]
    pub iframe_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct Settings {
    #[serde(default)]
    #[validate(nested)]
    pub adapter: AdapterSettings,
    #[serde(default)]
    #[validate(nested)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

fn default_enabled() -> bool {
    true
}

fn default_endpoint_host() -> String {
    DEFAULT_ENDPOINT_HOST.to_string()
}

fn default_endpoint_path() -> String {
    DEFAULT_ENDPOINT_PATH.to_string()
}

fn default_ttl_ms() -> u32 {
    DEFAULT_TTL_MS
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_timeout_ms() -> u32 {
    1000
}

fn default_sync_iframe_url() -> String {
    DEFAULT_SYNC_IFRAME_URL.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            endpoint_host: default_endpoint_host(),
            endpoint_path: default_endpoint_path(),
            default_ttl_ms: default_ttl_ms(),
            default_currency: default_currency(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            iframe_url: default_sync_iframe_url(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load the settings embedded at build time, merged with the environment.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the merged configuration
    /// cannot be deserialized or fails validation.
    pub fn new() -> Result<Self, Report<AdapterError>> {
        let toml_str = include_str!("../../../justpremium.toml");
        Self::from_toml(toml_str)
    }

    /// Parse settings from a TOML string, then apply `JUSTPREMIUM__` overrides.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] on invalid TOML, wrong value
    /// types or failed validation.
    pub fn from_toml(toml_str: &str) -> Result<Self, Report<AdapterError>> {
        let environment = Environment::default()
            .prefix(ENVIRONMENT_VARIABLE_PREFIX)
            .separator(ENVIRONMENT_VARIABLE_SEPARATOR);

        let toml = File::from_str(toml_str, FileFormat::Toml);
        let config = Config::builder()
            .add_source(toml)
            .add_source(environment)
            .build()
            .change_context(AdapterError::Configuration {
                message: "Failed to build configuration".to_string(),
            })?;

        let settings: Self =
            config
                .try_deserialize()
                .change_context(AdapterError::Configuration {
                    message: "Failed to deserialize configuration".to_string(),
                })?;

        settings
            .validate()
            .change_context(AdapterError::Configuration {
                message: "Settings validation failed".to_string(),
            })?;

        Ok(settings)
    }

    /// Serialize the effective settings back to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if serialization fails.
    pub fn to_canonical_toml(&self) -> Result<String, Report<AdapterError>> {
        toml::to_string(self).change_context(AdapterError::Configuration {
            message: "Failed to serialize settings to TOML".to_string(),
        })
    }
}
