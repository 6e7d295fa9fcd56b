use super::money::Amount;
use crate::error::CheckoutError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Open,
    Pending,
    Paid,
    Failed,
    Canceled,
    Expired,
}

impl PaymentStatus {
    /// A payment is completed once it has left `open` and `pending`.
    pub fn completed(&self) -> bool {
        !matches!(self, Self::Open | Self::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A payment as last reported by the server.
///
/// Never patched in place: a re-fetch replaces the whole value, and the latest
/// fetch always wins even if it reports a "less complete" status.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Payment {
    /// Server-assigned id, absent until creation completes.
    #[serde(default)]
    pub id: Option<u64>,
    /// Reference id at the payment provider.
    #[serde(default)]
    pub mollie_id: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
    pub amount: Amount,
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
    pub status: PaymentStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Payment {
    /// The redirect URL, only when present and a valid absolute URL.
    pub fn checkout_url(&self) -> Option<Url> {
        self.url.as_deref().and_then(|raw| Url::parse(raw).ok())
    }
}

/// Request body for `POST payments`.
///
/// Absent method and issuer let the server choose.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct CreatePayment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    pub amount: Amount,
    pub description: String,
}

/// Amount and description collected from the user, already validated.
#[derive(Debug, PartialEq, Clone)]
pub struct PaymentDraft {
    pub amount: Amount,
    pub description: String,
}

impl PaymentDraft {
    /// Validates raw form input. These are the only user-facing validation
    /// messages produced by the checkout core.
    pub fn parse(amount: &str, description: &str) -> Result<Self, CheckoutError> {
        let amount = amount.parse::<Amount>().map_err(|_| {
            CheckoutError::MalformedData(
                "Please enter an amount greater than zero".to_string(),
            )
        })?;

        let description = description.trim();
        if description.is_empty() {
            return Err(CheckoutError::MalformedData(
                "Please enter a description".to_string(),
            ));
        }

        Ok(Self {
            amount,
            description: description.to_string(),
        })
    }

    /// Request that lets the server pick the method.
    pub fn into_request(self) -> CreatePayment {
        CreatePayment {
            method: None,
            issuer: None,
            amount: self.amount,
            description: self.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const PAYMENT_JSON: &str = r#"{
        "id": 42,
        "mollie_id": "tr_WDqYK6vllg",
        "method": "ideal",
        "issuer": "ideal_INGBNL2A",
        "amount": 19.99,
        "description": "Walkman",
        "url": "https://www.mollie.com/checkout/select-issuer/ideal/WDqYK6vllg",
        "status": "open",
        "created_at": "2021-03-01T10:00:00Z",
        "updated_at": "2021-03-01T10:00:05Z"
    }"#;

    #[test]
    fn test_payment_deserialization() {
        let payment: Payment = serde_json::from_str(PAYMENT_JSON).unwrap();
        assert_eq!(payment.id, Some(42));
        assert_eq!(payment.amount.value(), dec!(19.99));
        assert_eq!(payment.status, PaymentStatus::Open);
        assert!(payment.created_at.is_some());
        assert!(payment.checkout_url().is_some());
    }

    #[test]
    fn test_invalid_url_yields_no_checkout_url() {
        let mut payment: Payment = serde_json::from_str(PAYMENT_JSON).unwrap();
        payment.url = Some("not a url".to_string());
        assert!(payment.checkout_url().is_none());
        payment.url = None;
        assert!(payment.checkout_url().is_none());
    }

    #[test]
    fn test_completed_statuses() {
        assert!(!PaymentStatus::Open.completed());
        assert!(!PaymentStatus::Pending.completed());
        for status in [
            PaymentStatus::Paid,
            PaymentStatus::Failed,
            PaymentStatus::Canceled,
            PaymentStatus::Expired,
        ] {
            assert!(status.completed(), "{status} should be completed");
        }
    }

    #[test]
    fn test_create_payment_omits_absent_method() {
        let request = CreatePayment {
            method: None,
            issuer: None,
            amount: Amount::new(dec!(6)).unwrap(),
            description: "DVD".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("method").is_none());
        assert!(json.get("issuer").is_none());
        assert_eq!(json["amount"], serde_json::json!(6.0));
    }

    #[test]
    fn test_draft_validation_messages() {
        let err = PaymentDraft::parse("0", "Goldfish").unwrap_err();
        assert!(err.to_string().contains("greater than zero"));

        let err = PaymentDraft::parse("2,99", "   ").unwrap_err();
        assert!(err.to_string().contains("description"));

        let draft = PaymentDraft::parse("2,99", " Goldfish ").unwrap();
        assert_eq!(draft.amount.value(), dec!(2.99));
        assert_eq!(draft.description, "Goldfish");
    }
}
