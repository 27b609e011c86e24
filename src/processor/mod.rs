//! Checkout processor client
//!
//! HTTP client for the external payment processor that hosts the checkout
//! pages and settles card payments. The wire contract is the Stripe Checkout
//! Session API: form-encoded session creation with bracketed field names,
//! bearer-key authentication, and a retrieve endpoint that reports
//! `payment_status`. The processor is reached over plain HTTP so any
//! service speaking the same shape (including a local stub) can stand in.
//!
//! # Architecture
//!
//! - [`ProcessorConfig`]: connection settings, validated before use
//! - [`CheckoutClient`]: the HTTP client for session create/retrieve
//! - [`CheckoutSession`]: the session object returned by the processor
//! - [`webhook`]: event envelope parsing and signature verification
//!
//! # Examples
//!
//! ```rust,no_run
//! use newspay::processor::{CheckoutClient, ProcessorConfig};
//!
//! # async fn example() -> newspay::Result<()> {
//! let config = ProcessorConfig::new("sk_test_123");
//! let client = CheckoutClient::new(config)?;
//! let session = client.retrieve_session("cs_test_abc").await?;
//! if session.is_paid() {
//!     println!("settled for {:?}", session.amount_total);
//! }
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{GateError, Result};

pub mod webhook;


/// Default processor API base URL
pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// `payment_status` value reported once a session has settled
pub const PAYMENT_STATUS_PAID: &str = "paid";

/// Configuration for the checkout processor connection
#[derive(Clone)]
pub struct ProcessorConfig {
    /// Base URL of the processor API
    pub api_base: String,
    /// Secret API key sent as bearer auth on every request
    pub secret_key: String,
    /// Request timeout
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for ProcessorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorConfig")
            .field("api_base", &self.api_base)
            .field("secret_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProcessorConfig {
    /// Create a new processor configuration against the default API base
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            secret_key: secret_key.into(),
            timeout: Some(Duration::from_secs(30)),
        }
    }

    /// Point the client at a different API base
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.secret_key.is_empty() {
            return Err(GateError::config("Processor secret key cannot be empty"));
        }
        if !self.api_base.starts_with("http://") && !self.api_base.starts_with("https://") {
            return Err(GateError::config(
                "Processor API base must start with http:// or https://",
            ));
        }
        Ok(())
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self::new("")
    }
}

/// Metadata attached to a checkout session and echoed back on retrieval
/// and in webhook deliveries
///
/// The processor stores metadata as string key/value pairs, so every field
/// here is a string and an empty string means the field was absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Context token minted with the payment challenge
    #[serde(default)]
    pub payment_context_token: String,
    /// Offer the payer selected
    #[serde(default)]
    pub offer_id: String,
    /// Category for single-category offers, empty otherwise
    #[serde(default)]
    pub category: String,
    /// Charged amount in cents, as a string
    #[serde(default)]
    pub amount: String,
}

/// Parameters for creating a checkout session
#[derive(Debug, Clone)]
pub struct CreateSessionParams {
    /// Product description shown on the checkout page
    pub description: String,
    /// Amount to charge, in cents
    pub unit_amount_cents: i64,
    /// ISO currency code, e.g. `usd`
    pub currency: String,
    /// Where the processor redirects after payment
    pub success_url: String,
    /// Where the processor redirects on cancellation
    pub cancel_url: String,
    /// Metadata echoed back on retrieval and webhooks
    pub metadata: SessionMetadata,
}

/// A checkout session as returned by the processor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Session identifier
    pub id: String,
    /// Hosted checkout page URL, present on freshly created sessions
    #[serde(default)]
    pub url: Option<String>,
    /// Payment status, `paid` once settled
    #[serde(default)]
    pub payment_status: String,
    /// Total charged, in cents
    #[serde(default)]
    pub amount_total: Option<i64>,
    /// Metadata supplied at creation
    #[serde(default)]
    pub metadata: SessionMetadata,
}

impl CheckoutSession {
    /// Whether the session's payment has settled
    pub fn is_paid(&self) -> bool {
        self.payment_status == PAYMENT_STATUS_PAID
    }

    /// Total charged, converted from cents to dollars
    pub fn amount_in_dollars(&self) -> Decimal {
        Decimal::new(self.amount_total.unwrap_or(0), 2)
    }
}

/// HTTP client for the checkout processor
#[derive(Clone)]
pub struct CheckoutClient {
    api_base: String,
    secret_key: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for CheckoutClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutClient")
            .field("api_base", &self.api_base)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

impl CheckoutClient {
    /// Create a new client from a validated configuration
    pub fn new(config: ProcessorConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GateError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_base: config.api_base,
            secret_key: config.secret_key,
            client,
        })
    }

    /// The API base this client talks to
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Create a checkout session for a single line item
    ///
    /// Sends the processor's form-encoded creation request. The returned
    /// session carries the hosted checkout URL the payer must visit.
    pub async fn create_session(&self, params: &CreateSessionParams) -> Result<CheckoutSession> {
        tracing::debug!(
            "Creating checkout session for offer: {}",
            params.metadata.offer_id
        );

        let form: Vec<(&str, String)> = vec![
            ("payment_method_types[0]", "card".to_string()),
            (
                "line_items[0][price_data][currency]",
                params.currency.clone(),
            ),
            (
                "line_items[0][price_data][product_data][name]",
                params.description.clone(),
            ),
            (
                "line_items[0][price_data][product_data][description]",
                params.description.clone(),
            ),
            (
                "line_items[0][price_data][unit_amount]",
                params.unit_amount_cents.to_string(),
            ),
            ("line_items[0][quantity]", "1".to_string()),
            ("mode", "payment".to_string()),
            ("success_url", params.success_url.clone()),
            ("cancel_url", params.cancel_url.clone()),
            (
                "metadata[payment_context_token]",
                params.metadata.payment_context_token.clone(),
            ),
            ("metadata[offer_id]", params.metadata.offer_id.clone()),
            ("metadata[category]", params.metadata.category.clone()),
            ("metadata[amount]", params.metadata.amount.clone()),
        ];

        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(GateError::processor(format!(
                "Payment processing failed: session creation returned {}: {}",
                status, error_text
            )));
        }

        let session: CheckoutSession = response.json().await?;
        tracing::debug!("Created checkout session: {}", session.id);
        Ok(session)
    }

    /// Retrieve a checkout session by id
    pub async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession> {
        tracing::debug!("Retrieving checkout session: {}", session_id);

        let response = self
            .client
            .get(format!(
                "{}/v1/checkout/sessions/{}",
                self.api_base, session_id
            ))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(GateError::processor(format!(
                "Error verifying payment: session retrieval returned {}: {}",
                status, error_text
            )));
        }

        let session: CheckoutSession = response.json().await?;
        Ok(session)
    }
}
