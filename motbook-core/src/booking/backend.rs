//! Backend seams used by the booking forms.

use async_trait::async_trait;
use motbook_sdk::client::{AdminClient, BookingClient, ClientError};
use motbook_sdk::objects::admin::AdminBookingCreated;
use motbook_sdk::objects::{BookingDraft, DisabledDate, TimeSlot};
use time::Date;

/// Slot and calendar availability.
#[async_trait]
pub trait AvailabilitySource: Send + Sync {
    async fn list_available_slots(&self, date: Date) -> Result<Vec<TimeSlot>, ClientError>;

    async fn list_disabled_dates(
        &self,
        year: i32,
        month: u8,
    ) -> Result<Vec<DisabledDate>, ClientError>;
}

/// Pre-payment check of a customer booking.
#[async_trait]
pub trait CustomerCheck: Send + Sync {
    async fn check_customer(&self, draft: &BookingDraft) -> Result<(), ClientError>;
}

/// Booking made by staff on behalf of a customer.
#[async_trait]
pub trait AdminBookingSink: Send + Sync {
    async fn create_booking(
        &self,
        draft: &BookingDraft,
    ) -> Result<Option<AdminBookingCreated>, ClientError>;
}

#[async_trait]
impl AvailabilitySource for BookingClient {
    async fn list_available_slots(&self, date: Date) -> Result<Vec<TimeSlot>, ClientError> {
        BookingClient::list_available_slots(self, date).await
    }

    async fn list_disabled_dates(
        &self,
        year: i32,
        month: u8,
    ) -> Result<Vec<DisabledDate>, ClientError> {
        BookingClient::list_disabled_dates(self, year, month).await
    }
}

#[async_trait]
impl CustomerCheck for BookingClient {
    async fn check_customer(&self, draft: &BookingDraft) -> Result<(), ClientError> {
        BookingClient::check_customer(self, draft).await
    }
}

#[async_trait]
impl AdminBookingSink for AdminClient {
    async fn create_booking(
        &self,
        draft: &BookingDraft,
    ) -> Result<Option<AdminBookingCreated>, ClientError> {
        AdminClient::create_booking(self, draft).await
    }
}
