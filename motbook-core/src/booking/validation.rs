//! Field validation of the booking forms.

use std::sync::LazyLock;

use compact_str::CompactString;
use motbook_sdk::config::BookingDefaults;
use motbook_sdk::objects::{BookingDraft, PaymentMethod, ReferralSource};
use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;
use time::Date;

#[allow(clippy::expect_used)]
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("literal pattern"));

#[allow(clippy::expect_used)]
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10,}$").expect("literal pattern"));

/// Which booking form is being filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormVariant {
    /// Public form; requires an email and the cancellation-policy checkbox.
    Customer,
    /// Staff booking on behalf of a customer.
    Admin,
}

/// A validated field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    FirstName,
    LastName,
    Email,
    ContactNumber,
    SelectedDate,
    SelectedTimeSlot,
    AwareOfCancellationPolicy,
}

impl Field {
    /// Wire name of the field.
    pub fn name(self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Email => "email",
            Field::ContactNumber => "contactNumber",
            Field::SelectedDate => "selectedDate",
            Field::SelectedTimeSlot => "selectedTimeSlot",
            Field::AwareOfCancellationPolicy => "awareOfCancellationPolicy",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

/// Every field that failed validation, in form order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} invalid field(s)", .errors.len())]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The message for `field`, if it failed.
    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message)
    }
}

/// Raw, editable state of a booking form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub contact_number: String,
    pub make_and_model: String,
    pub registration_no: String,
    pub selected_date: Option<Date>,
    pub selected_time_slot: Option<CompactString>,
    pub how_did_you_hear_about_us: Option<ReferralSource>,
    pub aware_of_cancellation_policy: bool,
    pub total_price: Decimal,
    pub payment_method: PaymentMethod,
}

impl FormFields {
    /// Initial values of a new form.
    ///
    /// Staff bookings are made with the customer present, so the policy
    /// checkbox starts ticked for the admin variant.
    pub fn initial(variant: FormVariant, defaults: &BookingDefaults) -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            contact_number: String::new(),
            make_and_model: String::new(),
            registration_no: String::new(),
            selected_date: None,
            selected_time_slot: None,
            how_did_you_hear_about_us: None,
            aware_of_cancellation_policy: variant == FormVariant::Admin,
            total_price: defaults.total_price,
            payment_method: PaymentMethod::PayPal,
        }
    }

    /// Validate the fields and build the draft to submit.
    pub fn validate(&self, variant: FormVariant) -> Result<BookingDraft, ValidationErrors> {
        let mut errors = Vec::new();
        let mut fail = |field, message| errors.push(FieldError { field, message });

        let first_name = self.first_name.trim();
        let last_name = self.last_name.trim();
        let email = self.email.trim();
        let contact_number = self.contact_number.trim();

        if first_name.is_empty() {
            fail(Field::FirstName, "First name is required");
        }
        if last_name.is_empty() {
            fail(Field::LastName, "Last name is required");
        }
        if variant == FormVariant::Customer {
            if email.is_empty() {
                fail(Field::Email, "Email is required");
            } else if !EMAIL_PATTERN.is_match(email) {
                fail(Field::Email, "Invalid email format");
            }
        }
        if contact_number.is_empty() {
            fail(Field::ContactNumber, "Contact number is required");
        } else if !PHONE_PATTERN.is_match(contact_number) {
            fail(Field::ContactNumber, "Invalid contact number");
        }
        if self.selected_date.is_none() {
            fail(Field::SelectedDate, "Date is required");
        }
        if self.selected_time_slot.is_none() {
            fail(Field::SelectedTimeSlot, "Time slot is required");
        }
        if variant == FormVariant::Customer && !self.aware_of_cancellation_policy {
            fail(
                Field::AwareOfCancellationPolicy,
                "Please accept the cancellation policy",
            );
        }

        match (self.selected_date, &self.selected_time_slot) {
            (Some(selected_date), Some(slot)) if errors.is_empty() => Ok(BookingDraft {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                email: email.to_string(),
                contact_number: contact_number.to_string(),
                make_and_model: self.make_and_model.trim().to_string(),
                registration_no: self.registration_no.trim().to_string(),
                selected_date,
                selected_time_slot: slot.clone(),
                how_did_you_hear_about_us: self.how_did_you_hear_about_us,
                aware_of_cancellation_policy: self.aware_of_cancellation_policy,
                total_price: self.total_price,
                payment_method: self.payment_method,
            }),
            _ => Err(ValidationErrors { errors }),
        }
    }
}
