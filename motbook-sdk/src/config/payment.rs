//! Payment session timing and policy.

use std::time::Duration;

use crate::objects::PaymentMethod;

/// Timing and policy knobs of a payment session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentPolicy {
    /// Time the payer has to approve a created order.
    pub approval_timeout: Duration,
    /// Countdown granularity.
    pub tick: Duration,
    /// How long the confirmation stays on screen before the modal closes.
    pub success_close_delay: Duration,
    /// ISO 4217 currency of quoted prices.
    pub currency: String,
    /// Treat a successful order creation as completion for cash bookings.
    pub cash_completes_on_creation: bool,
}

impl Default for PaymentPolicy {
    fn default() -> Self {
        Self {
            approval_timeout: Duration::from_secs(10 * 60),
            tick: Duration::from_secs(1),
            success_close_delay: Duration::from_secs(10),
            currency: "GBP".to_string(),
            cash_completes_on_creation: true,
        }
    }
}

impl PaymentPolicy {
    /// Whether a booking paid with `method` needs payer approval before it
    /// can complete.
    pub fn requires_approval(&self, method: PaymentMethod) -> bool {
        method.uses_hosted_checkout() || !self.cash_completes_on_creation
    }
}
