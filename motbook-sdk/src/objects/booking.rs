//! Booking draft submitted by the customer and admin forms.

use compact_str::CompactString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

/// Quoted price of a standard MOT test, in pounds sterling.
pub const DEFAULT_TOTAL_PRICE: Decimal = Decimal::from_parts(4320, 0, 0, false, 2);

/// How the customer intends to pay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Paid up front through the provider's hosted checkout.
    #[default]
    PayPal,
    /// Paid at the test centre.
    Cash,
}

impl PaymentMethod {
    /// Whether the hosted payment widget is involved.
    pub fn uses_hosted_checkout(self) -> bool {
        matches!(self, PaymentMethod::PayPal)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::PayPal => write!(f, "PayPal"),
            PaymentMethod::Cash => write!(f, "Cash"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paypal" | "card" => Ok(PaymentMethod::PayPal),
            "cash" => Ok(PaymentMethod::Cash),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

/// "How did you hear about us" answers offered by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferralSource {
    #[serde(rename = "Thomson Local")]
    ThomsonLocal,
    Google,
    #[serde(rename = "Through a friend")]
    ThroughAFriend,
    #[serde(rename = "Yell.com")]
    YellCom,
    Other,
}

impl ReferralSource {
    pub const ALL: [ReferralSource; 5] = [
        ReferralSource::ThomsonLocal,
        ReferralSource::Google,
        ReferralSource::ThroughAFriend,
        ReferralSource::YellCom,
        ReferralSource::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ReferralSource::ThomsonLocal => "Thomson Local",
            ReferralSource::Google => "Google",
            ReferralSource::ThroughAFriend => "Through a friend",
            ReferralSource::YellCom => "Yell.com",
            ReferralSource::Other => "Other",
        }
    }

    /// Look up an answer by its label, ignoring case.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|source| source.label().eq_ignore_ascii_case(label.trim()))
    }
}

/// A validated booking, ready to be submitted.
///
/// Built by the booking form once every field passed validation. Once handed
/// to a payment session it is never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub first_name: String,
    pub last_name: String,
    /// Empty for admin bookings made without an email address.
    #[serde(default)]
    pub email: String,
    pub contact_number: String,
    #[serde(default)]
    pub make_and_model: String,
    #[serde(default)]
    pub registration_no: String,
    #[serde(with = "super::calendar_date")]
    pub selected_date: Date,
    pub selected_time_slot: CompactString,
    #[serde(default)]
    pub how_did_you_hear_about_us: Option<ReferralSource>,
    pub aware_of_cancellation_policy: bool,
    pub total_price: Decimal,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

impl BookingDraft {
    pub fn customer_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
