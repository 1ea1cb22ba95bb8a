//! Booking API client (booking form and payment modal → backend).

use reqwest::Client;
use time::Date;
use url::Url;

use super::{
    ClientError, build_http_client, parse_ack, parse_data, parse_envelope, parse_success,
    path_segment, rejected,
};
use crate::config::ApiConfig;
use crate::objects::calendar_date;
use crate::objects::{ApprovalDetails, BookingDraft, CreatedOrder, DisabledDate, TimeSlot};

/// Typed HTTP client for the public **Booking API**.
///
/// Used by the customer booking form (availability, customer check) and by
/// the payment session (order creation, capture, cancellation). None of
/// these endpoints require authentication.
#[derive(Debug, Clone)]
pub struct BookingClient {
    http: Client,
    base_url: Url,
}

impl BookingClient {
    /// Create a new `BookingClient`.
    ///
    /// * `base_url` – root URL of the booking backend.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Create a client honouring the timeout from `config`.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ClientError> {
        Ok(Self {
            http: build_http_client(config)?,
            base_url: config.base_url.clone(),
        })
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /api/v1/slots/available?date=YYYY-MM-DD` – every slot of a day,
    /// available or not.
    pub async fn list_available_slots(&self, date: Date) -> Result<Vec<TimeSlot>, ClientError> {
        let url = self.base_url.join("/api/v1/slots/available")?;

        let resp = self
            .http
            .get(url)
            .query(&[("date", calendar_date::format(date))])
            .send()
            .await?;

        parse_data(resp).await
    }

    /// `GET /api/v1/slots/disabled-dates?year=&month=` – dates of a month
    /// with no availability at all.
    pub async fn list_disabled_dates(
        &self,
        year: i32,
        month: u8,
    ) -> Result<Vec<DisabledDate>, ClientError> {
        let url = self.base_url.join("/api/v1/slots/disabled-dates")?;

        let resp = self
            .http
            .get(url)
            .query(&[("year", year.to_string()), ("month", month.to_string())])
            .send()
            .await?;

        parse_data(resp).await
    }

    /// `POST /api/v1/customer/check` – ask the backend whether this booking
    /// may proceed to payment.
    pub async fn check_customer(&self, draft: &BookingDraft) -> Result<(), ClientError> {
        let url = self.base_url.join("/api/v1/customer/check")?;

        let resp = self.http.post(url).json(draft).send().await?;

        let envelope = parse_envelope::<serde::de::IgnoredAny>(resp).await?;
        if !envelope.success {
            return Err(rejected(&envelope));
        }
        Ok(())
    }

    /// `POST /api/v1/customer` – create the pending booking and, for
    /// hosted-checkout payments, the provider order.
    pub async fn create_order(&self, draft: &BookingDraft) -> Result<CreatedOrder, ClientError> {
        let url = self.base_url.join("/api/v1/customer")?;

        let resp = self.http.post(url).json(draft).send().await?;

        parse_success(resp).await
    }

    /// `POST /api/v1/payments/capture` – capture the funds of an approved
    /// provider order.
    pub async fn capture_order(&self, details: &ApprovalDetails) -> Result<(), ClientError> {
        let url = self.base_url.join("/api/v1/payments/capture")?;

        let resp = self.http.post(url).json(details).send().await?;

        parse_ack(resp).await
    }

    /// `POST /api/v1/payments/{order_id}/cancel` – abandon a provider order.
    pub async fn cancel_order(&self, order_id: &str) -> Result<(), ClientError> {
        let url = self.base_url.join(&format!(
            "/api/v1/payments/{}/cancel",
            path_segment(order_id)
        ))?;

        let resp = self.http.post(url).send().await?;

        parse_ack(resp).await
    }
}
