//! TOML file configuration structures.
//!
//! These structs directly map to the `motbook.toml` file format. Every
//! section and field is optional; missing values fall back to the defaults
//! below.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub payment: PaymentConfig,
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Backend API section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Root URL of the booking backend. Required unless given on the
    /// command line or through `MOTBOOK_API_URL`.
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

/// Payment session section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaymentConfig {
    /// Seconds the payer has to approve a created order.
    #[serde(default = "default_payment_timeout_secs")]
    pub timeout_secs: u64,
    /// Countdown step in seconds.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
    /// Seconds the confirmation stays up before the session closes.
    #[serde(default = "default_success_close_secs")]
    pub success_close_secs: u64,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Treat order creation as completion for cash bookings.
    #[serde(default = "default_true")]
    pub cash_completes_on_creation: bool,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_payment_timeout_secs(),
            tick_secs: default_tick_secs(),
            success_close_secs: default_success_close_secs(),
            currency: default_currency(),
            cash_completes_on_creation: true,
        }
    }
}

fn default_payment_timeout_secs() -> u64 {
    600
}

fn default_tick_secs() -> u64 {
    1
}

fn default_success_close_secs() -> u64 {
    10
}

fn default_currency() -> String {
    "GBP".to_string()
}

fn default_true() -> bool {
    true
}

/// Booking form section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookingConfig {
    /// Price quoted on new bookings, e.g. `"43.20"`.
    #[serde(default = "default_price")]
    pub price: Decimal,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            price: default_price(),
        }
    }
}

fn default_price() -> Decimal {
    motbook_sdk::objects::DEFAULT_TOTAL_PRICE
}

/// Admin session section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Where the admin credentials are stored between runs.
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            credentials_path: default_credentials_path(),
        }
    }
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from(".motbook/credentials.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parsing() {
        let toml_str = r#"
[api]
base_url = "https://api.example.com"
timeout_secs = 15

[payment]
timeout_secs = 300
tick_secs = 1
success_close_secs = 5
currency = "GBP"
cash_completes_on_creation = false

[booking]
price = "45.00"

[session]
credentials_path = "/tmp/motbook/credentials.json"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.api.base_url.as_ref().map(Url::as_str),
            Some("https://api.example.com/")
        );
        assert_eq!(config.api.timeout_secs, 15);
        assert_eq!(config.payment.timeout_secs, 300);
        assert!(!config.payment.cash_completes_on_creation);
        assert_eq!(config.booking.price.to_string(), "45.00");
        assert_eq!(
            config.session.credentials_path,
            PathBuf::from("/tmp/motbook/credentials.json")
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert!(config.api.base_url.is_none());
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.payment.timeout_secs, 600);
        assert_eq!(config.payment.tick_secs, 1);
        assert_eq!(config.payment.success_close_secs, 10);
        assert_eq!(config.payment.currency, "GBP");
        assert!(config.payment.cash_completes_on_creation);
        assert_eq!(config.booking.price.to_string(), "43.20");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let toml_str = r#"
[payment]
timeout = 300
"#;
        assert!(toml::from_str::<FileConfig>(toml_str).is_err());
    }
}
