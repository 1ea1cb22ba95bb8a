//! Network seam of the payment session.

use async_trait::async_trait;
use motbook_sdk::client::{BookingClient, ClientError};
use motbook_sdk::objects::{ApprovalDetails, BookingDraft, CreatedOrder};
use thiserror::Error;

/// Errors returned by a [`PaymentGateway`].
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The backend call failed.
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl GatewayError {
    /// Message the backend gave for this failure, if any.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            GatewayError::Client(e) => e.backend_message(),
        }
    }
}

/// The three network calls a payment session makes.
///
/// Each is a single attempt; the session never retries.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create the pending booking and, for hosted checkout, the provider order.
    async fn create_order(&self, draft: &BookingDraft) -> Result<CreatedOrder, GatewayError>;

    /// Capture an approved order. The details are forwarded as received.
    async fn capture_order(&self, details: &ApprovalDetails) -> Result<(), GatewayError>;

    /// Abandon a created order.
    async fn cancel_order(&self, order_id: &str) -> Result<(), GatewayError>;
}

#[async_trait]
impl PaymentGateway for BookingClient {
    async fn create_order(&self, draft: &BookingDraft) -> Result<CreatedOrder, GatewayError> {
        Ok(BookingClient::create_order(self, draft).await?)
    }

    async fn capture_order(&self, details: &ApprovalDetails) -> Result<(), GatewayError> {
        Ok(BookingClient::capture_order(self, details).await?)
    }

    async fn cancel_order(&self, order_id: &str) -> Result<(), GatewayError> {
        Ok(BookingClient::cancel_order(self, order_id).await?)
    }
}
