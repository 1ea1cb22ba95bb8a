//! Request and response types for the booking backend.
//!
//! Every backend response is wrapped in an [`ApiEnvelope`]; the payload
//! types live in the submodules.

pub mod admin;
pub mod booking;
pub mod calendar_date;
pub mod payment;
pub mod slots;

pub use admin::{AdminProfile, BookedBy, CustomerRecord, LoginRequest, LoginResponse};
pub use booking::{BookingDraft, DEFAULT_TOTAL_PRICE, PaymentMethod, ReferralSource};
pub use payment::{ApprovalDetails, Confirmation, CreatedOrder, PurchaseUnit, UnitAmount};
pub use slots::{DisabledDate, SlotStatus, TimeSlot};

use serde::{Deserialize, Serialize};

/// Message used when the backend gives no reason for a failure.
pub const FALLBACK_ERROR_MESSAGE: &str = "Something went wrong";

/// Wrapper the backend puts around every response body.
///
/// ```json
/// { "statusCode": 200, "success": true, "message": "...", "data": { ... } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub status_code: u16,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// The backend message, or [`FALLBACK_ERROR_MESSAGE`] when absent or blank.
    pub fn message_or_fallback(&self) -> &str {
        self.message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(FALLBACK_ERROR_MESSAGE)
    }
}

/// Error body returned alongside non-2xx statuses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_parsing() {
        let json = r#"{"statusCode":201,"success":true,"message":"created","data":{"bookingId":"b-1"}}"#;
        let envelope: ApiEnvelope<CreatedOrder> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.status_code, 201);
        assert!(envelope.success);
        assert_eq!(envelope.data.unwrap().booking_id, "b-1");
    }

    #[test]
    fn test_envelope_missing_data_field() {
        // `AdminProfile` has no `Default` impl.
        let json = r#"{"statusCode":200,"success":true,"message":"ok"}"#;
        let envelope: ApiEnvelope<AdminProfile> = serde_json::from_str(json).unwrap();
        assert!(envelope.data.is_none());
        assert_eq!(envelope.message_or_fallback(), "ok");
    }

    #[test]
    fn test_envelope_without_data() {
        let json = r#"{"statusCode":400,"success":false,"message":"   "}"#;
        let envelope: ApiEnvelope<CreatedOrder> = serde_json::from_str(json).unwrap();
        assert!(envelope.data.is_none());
        assert_eq!(envelope.message_or_fallback(), FALLBACK_ERROR_MESSAGE);
    }
}
