//! Booking form state and actions.

use std::collections::BTreeSet;
use std::sync::Arc;

use compact_str::CompactString;
use motbook_sdk::config::BookingDefaults;
use motbook_sdk::objects::{BookingDraft, slots::available_labels};
use thiserror::Error;
use time::Date;
use tracing::{debug, info, warn};

use super::backend::{AdminBookingSink, AvailabilitySource, CustomerCheck};
use super::calendar;
use super::validation::{FormFields, FormVariant, ValidationErrors};
use crate::events::{Notification, NotificationSender};
use crate::routing::Route;

pub const SLOTS_FAILED: &str = "Failed to load time slots";
pub const DISABLED_DATES_FAILED: &str = "Failed to load unavailable dates";
pub const NO_SLOTS: &str = "No available slots for this date";
pub const INCOMPLETE_FORM: &str = "Please complete all required fields";
pub const SUBMIT_FAILED: &str = "An error occurred";
pub const ADMIN_BOOKING_OK: &str = "Booking successful";

/// Errors from editing the form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{0} cannot be booked")]
    DateNotSelectable(Date),

    #[error("no date selected")]
    NoDateSelected,

    #[error("time slot {0} is not available")]
    UnknownSlot(String),
}

/// Errors from submitting the form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),

    /// The backend refused or the call failed; carries the user-facing message.
    #[error("{0}")]
    Rejected(String),
}

/// A booking form, customer or admin variant.
pub struct BookingForm {
    variant: FormVariant,
    defaults: BookingDefaults,
    source: Arc<dyn AvailabilitySource>,
    notifications: NotificationSender,
    today: Date,
    fields: FormFields,
    available_slots: Vec<CompactString>,
    disabled_dates: BTreeSet<Date>,
    errors: Option<ValidationErrors>,
}

impl BookingForm {
    /// Create an empty form.
    ///
    /// # Arguments
    ///
    /// * `variant` - Customer or admin form
    /// * `defaults` - Price applied by [`reset()`](Self::reset)
    /// * `source` - Slot and calendar availability
    /// * `notifications` - Where user-facing toasts are sent
    /// * `today` - Earliest bookable date
    pub fn new(
        variant: FormVariant,
        defaults: BookingDefaults,
        source: Arc<dyn AvailabilitySource>,
        notifications: NotificationSender,
        today: Date,
    ) -> Self {
        let fields = FormFields::initial(variant, &defaults);
        Self {
            variant,
            defaults,
            source,
            notifications,
            today,
            fields,
            available_slots: Vec::new(),
            disabled_dates: BTreeSet::new(),
            errors: None,
        }
    }

    pub fn variant(&self) -> FormVariant {
        self.variant
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    /// Mutable access for free-text fields, checkboxes and selects.
    ///
    /// Date and slot go through [`select_date`](Self::select_date) and
    /// [`select_time_slot`](Self::select_time_slot).
    pub fn fields_mut(&mut self) -> &mut FormFields {
        &mut self.fields
    }

    /// Slots offered for the selected date.
    pub fn available_slots(&self) -> &[CompactString] {
        &self.available_slots
    }

    pub fn disabled_dates(&self) -> &BTreeSet<Date> {
        &self.disabled_dates
    }

    /// Field errors of the last validation, if it failed.
    pub fn errors(&self) -> Option<&ValidationErrors> {
        self.errors.as_ref()
    }

    pub fn is_selectable(&self, date: Date) -> bool {
        calendar::is_selectable(date, self.today, &self.disabled_dates)
    }

    /// Load the disabled dates of the current month.
    pub async fn load(&mut self) {
        let (year, month) = (self.today.year(), u8::from(self.today.month()));
        self.change_month(year, month).await;
    }

    /// Replace the disabled-date set with the one of `year`/`month`.
    ///
    /// On failure the previous set is kept and a notification is raised.
    pub async fn change_month(&mut self, year: i32, month: u8) {
        match self.source.list_disabled_dates(year, month).await {
            Ok(dates) => {
                self.disabled_dates = dates.into_iter().map(|d| d.date).collect();
                debug!(
                    year,
                    month,
                    disabled = self.disabled_dates.len(),
                    "Loaded disabled dates"
                );
            }
            Err(e) => {
                warn!(year, month, error = %e, "Failed to load disabled dates");
                self.notify(Notification::error(DISABLED_DATES_FAILED)).await;
            }
        }
    }

    /// Select a date and load its available slots.
    ///
    /// Re-selecting the current date does nothing. A date with no available
    /// slot is added to the disabled set.
    pub async fn select_date(&mut self, date: Date) -> Result<&[CompactString], FormError> {
        if self.fields.selected_date == Some(date) {
            return Ok(&self.available_slots);
        }
        if !self.is_selectable(date) {
            return Err(FormError::DateNotSelectable(date));
        }

        self.fields.selected_date = Some(date);
        self.fields.selected_time_slot = None;

        self.available_slots = match self.source.list_available_slots(date).await {
            Ok(slots) => available_labels(&slots),
            Err(e) => {
                warn!(%date, error = %e, "Failed to load time slots");
                self.notify(Notification::error(SLOTS_FAILED)).await;
                Vec::new()
            }
        };

        if self.available_slots.is_empty() {
            self.disabled_dates.insert(date);
            self.notify(Notification::warning(NO_SLOTS)).await;
        }
        debug!(%date, slots = self.available_slots.len(), "Selected date");

        Ok(&self.available_slots)
    }

    /// Pick one of the offered slots.
    pub fn select_time_slot(&mut self, label: &str) -> Result<(), FormError> {
        if self.fields.selected_date.is_none() {
            return Err(FormError::NoDateSelected);
        }
        let slot = self
            .available_slots
            .iter()
            .find(|s| s.as_str() == label.trim())
            .ok_or_else(|| FormError::UnknownSlot(label.to_string()))?;
        self.fields.selected_time_slot = Some(slot.clone());
        Ok(())
    }

    /// Reset every field to its initial value.
    pub fn reset(&mut self) {
        self.fields = FormFields::initial(self.variant, &self.defaults);
        self.available_slots.clear();
        self.errors = None;
    }

    /// Validate the fields, recording field errors.
    ///
    /// Any error raises a single "complete all required fields" notification.
    pub async fn validate(&mut self) -> Result<BookingDraft, ValidationErrors> {
        match self.fields.validate(self.variant) {
            Ok(draft) => {
                self.errors = None;
                Ok(draft)
            }
            Err(errors) => {
                debug!(invalid = errors.len(), "Form validation failed");
                self.errors = Some(errors.clone());
                self.notify(Notification::error(INCOMPLETE_FORM)).await;
                Err(errors)
            }
        }
    }

    /// Submit the customer form.
    ///
    /// On success the returned draft is ready for a payment session.
    pub async fn submit_customer(
        &mut self,
        backend: &dyn CustomerCheck,
    ) -> Result<BookingDraft, SubmitError> {
        let draft = self.validate().await?;

        match backend.check_customer(&draft).await {
            Ok(()) => {
                info!(
                    date = %draft.selected_date,
                    slot = %draft.selected_time_slot,
                    "Booking accepted for payment"
                );
                Ok(draft)
            }
            Err(e) => {
                warn!(error = %e, "Customer check failed");
                let message = e.backend_message().unwrap_or(SUBMIT_FAILED).to_string();
                self.notify(Notification::error(message.clone())).await;
                Err(SubmitError::Rejected(message))
            }
        }
    }

    /// Submit the admin form and return where to navigate next.
    pub async fn submit_admin(
        &mut self,
        backend: &dyn AdminBookingSink,
    ) -> Result<Route, SubmitError> {
        let draft = self.validate().await?;

        match backend.create_booking(&draft).await {
            Ok(created) => {
                info!(
                    booking_id = ?created.map(|c| c.id),
                    date = %draft.selected_date,
                    slot = %draft.selected_time_slot,
                    "Admin booking created"
                );
                self.notify(Notification::success(ADMIN_BOOKING_OK)).await;
                Ok(Route::AdminDashboard)
            }
            Err(e) => {
                warn!(error = %e, "Admin booking failed");
                let message = e.backend_message().unwrap_or(SUBMIT_FAILED).to_string();
                self.notify(Notification::error(message.clone())).await;
                Err(SubmitError::Rejected(message))
            }
        }
    }

    async fn notify(&self, notification: Notification) {
        if let Err(e) = self.notifications.send(notification).await {
            warn!(error = %e, "Failed to send notification, receiver dropped");
        }
    }
}
