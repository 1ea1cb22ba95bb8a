//! Configuration types for the booking client.
//!
//! These types represent the validated runtime configuration shared across
//! crates. The actual config loading/parsing is handled by the CLI crate.

mod api;
mod payment;

pub use api::ApiConfig;
pub use payment::PaymentPolicy;

/// Booking defaults applied to new forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDefaults {
    /// Price quoted on every new booking.
    pub total_price: rust_decimal::Decimal,
}

impl Default for BookingDefaults {
    fn default() -> Self {
        Self {
            total_price: crate::objects::DEFAULT_TOTAL_PRICE,
        }
    }
}
