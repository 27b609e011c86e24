//! Wire types for the payment challenge flow

use serde::{Deserialize, Serialize};

use super::category::Category;
use super::offer::{offers, Offer};

/// Version string carried in every payment challenge
pub const L402_VERSION: &str = "0.2.3";

/// Body of the `402 Payment Required` response presented to programmatic
/// clients without a valid bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentChallenge {
    /// Challenge format version
    pub version: String,
    /// Where to POST the accepted offer
    pub payment_request_url: String,
    /// Fresh context token correlating the payment; becomes the bearer
    /// credential once payment is confirmed
    pub payment_context_token: String,
    /// The static offer catalog
    pub offers: Vec<Offer>,
}

impl PaymentChallenge {
    /// Create a challenge carrying the full catalog
    pub fn new(
        payment_request_url: impl Into<String>,
        payment_context_token: impl Into<String>,
    ) -> Self {
        Self {
            version: L402_VERSION.to_string(),
            payment_request_url: payment_request_url.into(),
            payment_context_token: payment_context_token.into(),
            offers: offers::catalog(),
        }
    }
}

/// Body of `POST /l402/payment-request`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Context token from the challenge this request answers
    pub payment_context_token: String,
    /// Accepted offer id
    pub offer_id: String,
    /// Chosen category; only meaningful for the single-category offer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

/// Successful response to a payment request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutCreated {
    /// Human-readable status message
    pub message: String,
    /// Processor-hosted page where the payer completes the purchase
    pub checkout_url: String,
    /// Checkout session id at the processor
    pub session_id: String,
}

/// Webhook acknowledgement body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub status: String,
}

impl WebhookAck {
    /// The acknowledgement returned for every accepted webhook delivery
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}
