//! Configuration module for the motbook CLI.
//!
//! Handles loading configuration from the TOML file and CLI arguments, then
//! converts it into the runtime types the SDK and the core expect.

pub mod file;

use crate::config::file::FileConfig;
use motbook_sdk::config::{ApiConfig, BookingDefaults, PaymentPolicy};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("no backend URL configured (set [api] base_url, --api-url or MOTBOOK_API_URL)")]
    MissingApiUrl,
}

/// Loaded configuration result containing all parts.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub api: ApiConfig,
    pub payment: PaymentPolicy,
    pub booking: BookingDefaults,
    pub credentials_path: PathBuf,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    api_url_override: Option<Url>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, api_url_override: Option<Url>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            api_url_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file, falling back to defaults when it does not exist
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    /// 4. Build the loaded configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let mut file_config = match std::fs::read_to_string(&self.config_path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    path = %self.config_path.display(),
                    "Config file not found, using defaults"
                );
                FileConfig::default()
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(url) = &self.api_url_override {
            file_config.api.base_url = Some(url.clone());
        }

        self.validate(&file_config)?;
        self.build_loaded_config(file_config)
    }

    fn validate(&self, config: &FileConfig) -> Result<(), ConfigError> {
        if config.api.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "api.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if config.payment.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "payment.timeout_secs must be greater than zero".to_string(),
            ));
        }
        // tokio intervals cannot have a zero period
        if config.payment.tick_secs == 0 {
            return Err(ConfigError::ValidationError(
                "payment.tick_secs must be greater than zero".to_string(),
            ));
        }
        if config.payment.tick_secs > config.payment.timeout_secs {
            return Err(ConfigError::ValidationError(format!(
                "payment.tick_secs ({}) exceeds payment.timeout_secs ({})",
                config.payment.tick_secs, config.payment.timeout_secs
            )));
        }
        if config.payment.currency.len() != 3
            || !config.payment.currency.chars().all(|c| c.is_ascii_uppercase())
        {
            return Err(ConfigError::ValidationError(format!(
                "payment.currency must be a three-letter ISO code, got {:?}",
                config.payment.currency
            )));
        }
        if config.booking.price.is_sign_negative() || config.booking.price.is_zero() {
            return Err(ConfigError::ValidationError(format!(
                "booking.price must be positive, got {}",
                config.booking.price
            )));
        }
        Ok(())
    }

    fn build_loaded_config(&self, config: FileConfig) -> Result<LoadedConfig, ConfigError> {
        let base_url = config.api.base_url.ok_or(ConfigError::MissingApiUrl)?;

        Ok(LoadedConfig {
            api: ApiConfig::new(base_url)
                .with_timeout(Duration::from_secs(config.api.timeout_secs)),
            payment: PaymentPolicy {
                approval_timeout: Duration::from_secs(config.payment.timeout_secs),
                tick: Duration::from_secs(config.payment.tick_secs),
                success_close_delay: Duration::from_secs(config.payment.success_close_secs),
                currency: config.payment.currency,
                cash_completes_on_creation: config.payment.cash_completes_on_creation,
            },
            booking: BookingDefaults {
                total_price: config.booking.price,
            },
            credentials_path: config.session.credentials_path,
        })
    }
}
