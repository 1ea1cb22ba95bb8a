//! Admin API client (admin dashboard → backend).
//!
//! Every request except `login` carries the access token returned by the
//! login endpoint as a bearer token.

use reqwest::{Client, RequestBuilder};
use url::Url;

use super::{
    ClientError, build_http_client, parse_ack, parse_data, parse_envelope, path_segment, rejected,
};
use crate::config::ApiConfig;
use crate::objects::admin::AdminBookingCreated;
use crate::objects::{AdminProfile, BookingDraft, CustomerRecord, LoginRequest, LoginResponse};

/// `statusCode` the backend reports for a successful login.
const LOGIN_OK: u16 = 200;
/// `statusCode` the backend reports for a booking created by an admin.
const BOOKING_CREATED: u16 = 201;

/// Typed HTTP client for the **Admin API**.
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: Client,
    base_url: Url,
    access_token: Option<String>,
}

impl AdminClient {
    /// Create a new, unauthenticated `AdminClient`.
    ///
    /// * `base_url` – root URL of the booking backend.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
            access_token: None,
        }
    }

    /// Create a client honouring the timeout from `config`.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ClientError> {
        Ok(Self {
            http: build_http_client(config)?,
            base_url: config.base_url.clone(),
            access_token: None,
        })
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Attach the access token used on authenticated requests.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn set_access_token(&mut self, token: Option<String>) {
        self.access_token = token;
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// `POST /api/v1/admin/login` – exchange credentials for a session.
    ///
    /// Succeeds only when the envelope reports `statusCode == 200`.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let url = self.base_url.join("/api/v1/admin/login")?;

        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let resp = self.http.post(url).json(&body).send().await?;

        let envelope = parse_envelope::<LoginResponse>(resp).await?;
        if envelope.status_code != LOGIN_OK {
            return Err(rejected(&envelope));
        }
        Ok(envelope.data.unwrap_or_default())
    }

    /// `GET /api/v1/admin/me` – check that the stored session is still valid.
    pub async fn verify_session(&self) -> Result<AdminProfile, ClientError> {
        let url = self.base_url.join("/api/v1/admin/me")?;

        let resp = self.authorized(self.http.get(url)).send().await?;

        parse_data(resp).await
    }

    /// `POST /api/v1/admin/logout` – end the session server-side.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let url = self.base_url.join("/api/v1/admin/logout")?;

        let resp = self.authorized(self.http.post(url)).send().await?;

        parse_ack(resp).await
    }

    /// `GET /api/v1/admin/customers/{id}` – full detail of one booking.
    pub async fn get_customer(&self, customer_id: &str) -> Result<CustomerRecord, ClientError> {
        let url = self.base_url.join(&format!(
            "/api/v1/admin/customers/{}",
            path_segment(customer_id)
        ))?;

        let resp = self.authorized(self.http.get(url)).send().await?;

        parse_data(resp).await
    }

    /// `POST /api/v1/admin/customers` – book on behalf of a customer.
    ///
    /// Succeeds only when the envelope reports `statusCode == 201`.
    pub async fn create_booking(
        &self,
        draft: &BookingDraft,
    ) -> Result<Option<AdminBookingCreated>, ClientError> {
        let url = self.base_url.join("/api/v1/admin/customers")?;

        let resp = self.authorized(self.http.post(url)).json(draft).send().await?;

        let envelope = parse_envelope::<AdminBookingCreated>(resp).await?;
        if envelope.status_code != BOOKING_CREATED {
            return Err(rejected(&envelope));
        }
        Ok(envelope.data)
    }
}
