//! Customer detail viewer.

use async_trait::async_trait;
use motbook_sdk::client::{AdminClient, ClientError};
use motbook_sdk::objects::{BookedBy, CustomerRecord, calendar_date};
use tracing::{debug, warn};

pub const FETCH_FAILED: &str = "Failed to fetch customer information";

/// Lookup of a single customer booking.
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    async fn get_customer(&self, customer_id: &str) -> Result<CustomerRecord, ClientError>;
}

#[async_trait]
impl CustomerDirectory for AdminClient {
    async fn get_customer(&self, customer_id: &str) -> Result<CustomerRecord, ClientError> {
        AdminClient::get_customer(self, customer_id).await
    }
}

/// State of the customer detail view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CustomerView {
    /// Nothing requested yet.
    #[default]
    Empty,
    Loaded(Box<CustomerRecord>),
    Failed(&'static str),
}

/// Fetches and presents one customer booking.
#[derive(Debug, Default)]
pub struct CustomerViewer {
    view: CustomerView,
}

impl CustomerViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &CustomerView {
        &self.view
    }

    pub fn customer(&self) -> Option<&CustomerRecord> {
        match &self.view {
            CustomerView::Loaded(record) => Some(&**record),
            _ => None,
        }
    }

    /// Load `customer_id`. A blank id leaves the view untouched.
    pub async fn open(
        &mut self,
        directory: &dyn CustomerDirectory,
        customer_id: &str,
    ) -> &CustomerView {
        let customer_id = customer_id.trim();
        if customer_id.is_empty() {
            return &self.view;
        }

        self.view = match directory.get_customer(customer_id).await {
            Ok(record) => {
                debug!(%customer_id, "Loaded customer");
                CustomerView::Loaded(Box::new(record))
            }
            Err(e) => {
                warn!(%customer_id, error = %e, "Failed to fetch customer");
                CustomerView::Failed(FETCH_FAILED)
            }
        };
        &self.view
    }
}

/// "Booked" for self-service bookings, "Not Booked" otherwise.
pub fn booking_label(record: &CustomerRecord) -> &'static str {
    if record.booked_by == Some(BookedBy::Customer) {
        "Booked"
    } else {
        "Not Booked"
    }
}

/// Label/value rows describing a customer booking, in display order.
pub fn detail_rows(record: &CustomerRecord) -> Vec<(&'static str, String)> {
    let text = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    vec![
        ("Customer", record.customer_name.clone()),
        ("Email", text(&record.email)),
        ("Contact number", record.contact_number.clone()),
        ("Make and model", text(&record.make_and_model)),
        ("Registration", text(&record.registration_no)),
        (
            "Date",
            record
                .selected_date
                .map(calendar_date::format)
                .unwrap_or_else(|| "-".to_string()),
        ),
        ("Time slot", text(&record.selected_time_slot)),
        (
            "Total price",
            record
                .total_price
                .map(|p| format!("£{p}"))
                .unwrap_or_else(|| "-".to_string()),
        ),
        (
            "Payment method",
            record
                .payment_method
                .map(|m| m.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
        ("Payment status", text(&record.payment_status)),
        ("Status", booking_label(record).to_string()),
        (
            "Referral",
            record
                .how_did_you_hear_about_us
                .map(|r| r.label().to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
        ("Photos", record.photos.len().to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn record(booked_by: Option<BookedBy>) -> CustomerRecord {
        CustomerRecord {
            id: "c-9".to_string(),
            customer_name: "Jane Doe".to_string(),
            email: None,
            contact_number: "07123456789".to_string(),
            make_and_model: None,
            registration_no: Some("AB12 CDE".to_string()),
            selected_date: Some(date!(2025 - 03 - 04)),
            selected_time_slot: Some("09:30".to_string()),
            total_price: None,
            payment_method: None,
            payment_status: None,
            booked_by,
            aware_of_cancellation_policy: true,
            how_did_you_hear_about_us: None,
            paypal_order_id: None,
            capture_id: None,
            refund_status: None,
            created_at: None,
            photos: Vec::new(),
        }
    }

    struct FakeDirectory(Option<CustomerRecord>);

    #[async_trait]
    impl CustomerDirectory for FakeDirectory {
        async fn get_customer(&self, _customer_id: &str) -> Result<CustomerRecord, ClientError> {
            self.0.clone().ok_or(ClientError::MissingData)
        }
    }

    #[test]
    fn test_booking_label() {
        assert_eq!(booking_label(&record(Some(BookedBy::Customer))), "Booked");
        assert_eq!(booking_label(&record(Some(BookedBy::Admin))), "Not Booked");
        assert_eq!(booking_label(&record(None)), "Not Booked");
    }

    #[test]
    fn test_detail_rows() {
        let rows = detail_rows(&record(Some(BookedBy::Customer)));
        assert!(rows.contains(&("Date", "2025-03-04".to_string())));
        assert!(rows.contains(&("Email", "-".to_string())));
        assert!(rows.contains(&("Status", "Booked".to_string())));
    }

    #[tokio::test]
    async fn test_open() {
        let mut viewer = CustomerViewer::new();
        let found = FakeDirectory(Some(record(None)));

        viewer.open(&found, "   ").await;
        assert_eq!(viewer.view(), &CustomerView::Empty);

        viewer.open(&found, "c-9").await;
        assert_eq!(viewer.customer().unwrap().id, "c-9");

        let view = viewer.open(&FakeDirectory(None), "c-9").await;
        assert_eq!(view, &CustomerView::Failed(FETCH_FAILED));
        assert!(viewer.customer().is_none());
    }
}
