//! Order creation, capture and confirmation types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Response to `POST /api/v1/customer`: the pending booking plus, for
/// hosted-checkout payments, the provider order awaiting approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    /// Backend booking record identifier.
    #[serde(alias = "_id", alias = "customerId")]
    pub booking_id: String,
    /// Provider order identifier; absent for cash bookings.
    #[serde(default)]
    pub paypal_order_id: Option<String>,
}

/// Amount of one purchase unit as reported by the payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitAmount {
    #[serde(default)]
    pub currency_code: Option<String>,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseUnit {
    #[serde(default)]
    pub reference_id: Option<String>,
    pub amount: UnitAmount,
}

/// Order details handed over by the hosted widget once the payer approved.
///
/// Forwarded verbatim to the backend for capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalDetails {
    /// Provider order identifier, doubling as the invoice number.
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub purchase_units: Vec<PurchaseUnit>,
}

impl ApprovalDetails {
    /// Details for an order approved for `amount`.
    pub fn new(order_id: impl Into<String>, amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            id: order_id.into(),
            status: Some("APPROVED".to_string()),
            purchase_units: vec![PurchaseUnit {
                reference_id: None,
                amount: UnitAmount {
                    currency_code: Some(currency.into()),
                    value: amount,
                },
            }],
        }
    }

    /// Receipt for these details: the order id and the first unit's amount.
    pub fn confirmation(&self) -> Option<Confirmation> {
        let unit = self.purchase_units.first()?;
        Some(Confirmation {
            invoice_number: self.id.clone(),
            amount: unit.amount.value,
        })
    }
}

/// User-facing receipt shown once a booking is paid or confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    pub invoice_number: String,
    pub amount: Decimal,
}

impl std::fmt::Display for Confirmation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invoice {} (£{})", self.invoice_number, self.amount)
    }
}
