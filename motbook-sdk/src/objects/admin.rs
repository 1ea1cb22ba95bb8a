//! Admin API request and response types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;
use url::Url;

use super::booking::{PaymentMethod, ReferralSource};

/// Request body for `POST /api/v1/admin/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token for subsequent admin requests, when the backend issues one.
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub admin: Option<AdminProfile>,
}

/// The signed-in administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Who made a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookedBy {
    Customer,
    Admin,
}

/// Customer booking as shown in the admin customer viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    #[serde(alias = "_id")]
    pub id: String,
    pub customer_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub contact_number: String,
    #[serde(default)]
    pub make_and_model: Option<String>,
    #[serde(default)]
    pub registration_no: Option<String>,
    #[serde(default, with = "super::calendar_date::option")]
    pub selected_date: Option<Date>,
    #[serde(default)]
    pub selected_time_slot: Option<String>,
    #[serde(default)]
    pub total_price: Option<Decimal>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub booked_by: Option<BookedBy>,
    #[serde(default)]
    pub aware_of_cancellation_policy: bool,
    #[serde(default)]
    pub how_did_you_hear_about_us: Option<ReferralSource>,
    #[serde(default)]
    pub paypal_order_id: Option<String>,
    #[serde(default)]
    pub capture_id: Option<String>,
    #[serde(default)]
    pub refund_status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub photos: Vec<Url>,
}

/// Payload returned when an admin books on behalf of a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminBookingCreated {
    #[serde(alias = "_id", alias = "bookingId")]
    pub id: String,
}
