//! Booking request files.
//!
//! The terminal has no form widgets, so the customer and admin booking
//! commands read the form fields from a TOML file:
//!
//! ```toml
//! first_name = "Jane"
//! last_name = "Doe"
//! email = "jane@example.com"
//! contact_number = "07123456789"
//! registration_no = "AB12 CDE"
//! date = "2025-03-04"
//! time_slot = "09:30"
//! referral = "Google"
//! accept_cancellation_policy = true
//! payment_method = "cash"
//! ```

use anyhow::Context;
use motbook_core::booking::FormFields;
use motbook_sdk::objects::{PaymentMethod, ReferralSource, calendar_date};
use serde::Deserialize;
use std::path::Path;
use time::Date;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookingRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub contact_number: String,
    #[serde(default)]
    pub make_and_model: String,
    #[serde(default)]
    pub registration_no: String,
    #[serde(with = "calendar_date")]
    pub date: Date,
    pub time_slot: String,
    #[serde(default)]
    pub referral: Option<String>,
    #[serde(default)]
    pub accept_cancellation_policy: Option<bool>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

impl BookingRequest {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read booking request {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("invalid booking request {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Copy the free-text fields, checkboxes and selects into `fields`.
    ///
    /// Date and slot are left to the form. `method_override` wins over the
    /// file's `payment_method`.
    pub fn apply_to(
        &self,
        fields: &mut FormFields,
        method_override: Option<PaymentMethod>,
    ) -> anyhow::Result<()> {
        fields.first_name.clone_from(&self.first_name);
        fields.last_name.clone_from(&self.last_name);
        fields.email.clone_from(&self.email);
        fields.contact_number.clone_from(&self.contact_number);
        fields.make_and_model.clone_from(&self.make_and_model);
        fields.registration_no.clone_from(&self.registration_no);

        fields.how_did_you_hear_about_us = match self.referral.as_deref() {
            None => None,
            Some(label) => Some(ReferralSource::from_label(label).with_context(|| {
                let known: Vec<_> = ReferralSource::ALL.iter().map(|r| r.label()).collect();
                format!("unknown referral {label:?}, expected one of {known:?}")
            })?),
        };
        if let Some(accepted) = self.accept_cancellation_policy {
            fields.aware_of_cancellation_policy = accepted;
        }

        let method = match (method_override, self.payment_method.as_deref()) {
            (Some(method), _) => Some(method),
            (None, Some(raw)) => Some(raw.parse().map_err(anyhow::Error::msg)?),
            (None, None) => None,
        };
        if let Some(method) = method {
            fields.payment_method = method;
        }
        Ok(())
    }
}
