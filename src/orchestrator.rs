//! Payment orchestration
//!
//! Glue between the offer catalog, the checkout processor, and the
//! entitlement store. Creates checkout sessions for accepted offers and
//! turns confirmed payments into entitlement records, arriving either
//! through the redirect callback or through the asynchronous webhook.
//! Both confirmation paths upsert the record keyed by the context token,
//! so they can race or repeat without corrupting the store.
//!
//! # Examples
//!
//! ```rust,no_run
//! use newspay::orchestrator::PaymentOrchestrator;
//! use newspay::processor::{CheckoutClient, ProcessorConfig};
//! use newspay::store::EntitlementStore;
//! use newspay::types::PaymentRequest;
//!
//! # async fn example() -> newspay::Result<()> {
//! let client = CheckoutClient::new(ProcessorConfig::new("sk_test_123"))?;
//! let store = EntitlementStore::in_memory();
//! let orchestrator = PaymentOrchestrator::new(client, store, "http://localhost:8000");
//!
//! let request = PaymentRequest {
//!     payment_context_token: "ctx-1".to_string(),
//!     offer_id: "one_category".to_string(),
//!     category: None,
//! };
//! let checkout = orchestrator.create_checkout(&request).await?;
//! println!("Pay at: {}", checkout.checkout_url);
//! # Ok(())
//! # }
//! ```

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::error::{GateError, Result};
use crate::processor::webhook::{self, WebhookEvent, CHECKOUT_SESSION_COMPLETED};
use crate::processor::{CheckoutClient, CreateSessionParams, SessionMetadata};
use crate::store::EntitlementStore;
use crate::types::{
    offers, Category, CheckoutCreated, EntitlementRecord, OfferKind, PaymentRequest, WebhookAck,
};

/// Drives the payment lifecycle from accepted offer to entitlement record
#[derive(Clone)]
pub struct PaymentOrchestrator {
    client: CheckoutClient,
    store: EntitlementStore,
    public_url: String,
    webhook_secret: Option<String>,
}

impl std::fmt::Debug for PaymentOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentOrchestrator")
            .field("client", &self.client)
            .field("public_url", &self.public_url)
            .field(
                "webhook_secret",
                &self.webhook_secret.as_deref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl PaymentOrchestrator {
    /// Create a new orchestrator
    ///
    /// `public_url` is the externally reachable base URL of this gate; the
    /// processor redirects payers back to it after checkout.
    pub fn new(
        client: CheckoutClient,
        store: EntitlementStore,
        public_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            store,
            public_url: public_url.into(),
            webhook_secret: None,
        }
    }

    /// Set the shared secret used to verify webhook deliveries
    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_secret = Some(secret.into());
        self
    }

    /// The store confirmed payments are recorded in
    pub fn store(&self) -> &EntitlementStore {
        &self.store
    }

    /// Create a checkout session for an accepted offer
    ///
    /// Rejects offer ids outside the catalog before any processor call.
    /// The success URL keeps the processor's `{CHECKOUT_SESSION_ID}`
    /// placeholder verbatim; the processor substitutes the real session id
    /// when redirecting the payer back.
    pub async fn create_checkout(&self, request: &PaymentRequest) -> Result<CheckoutCreated> {
        let offer = offers::find(&request.offer_id)
            .ok_or_else(|| GateError::invalid_offer(&request.offer_id))?;

        let description = match OfferKind::from_offer_id(&offer.id) {
            Some(OfferKind::SingleCategory) => match request.category {
                Some(category) => format!("Access to {} category", category),
                None => "Access to one category".to_string(),
            },
            Some(OfferKind::AllCategories) => "Access to all categories for one month".to_string(),
            _ => return Err(GateError::invalid_offer(&request.offer_id)),
        };

        let unit_amount_cents = offer.unit_amount_cents();
        let category_param = request
            .category
            .map(|category| category.as_str().to_string())
            .unwrap_or_default();

        // The catalog advertises "USD" but the processor wants lowercase codes.
        let params = CreateSessionParams {
            description,
            unit_amount_cents,
            currency: offer.currency.to_lowercase(),
            success_url: self.success_url(
                &request.payment_context_token,
                &offer.id,
                &category_param,
            ),
            cancel_url: format!("{}/payment/cancel", self.public_url),
            metadata: SessionMetadata {
                payment_context_token: request.payment_context_token.clone(),
                offer_id: offer.id.clone(),
                category: category_param,
                amount: unit_amount_cents.to_string(),
            },
        };

        let session = self.client.create_session(&params).await?;
        let checkout_url = session.url.clone().ok_or_else(|| {
            GateError::processor("Payment processing failed: checkout session has no URL")
        })?;

        tracing::info!(
            "Created checkout session {} for context token: {}",
            session.id,
            request.payment_context_token
        );

        Ok(CheckoutCreated {
            message: "Checkout session created".to_string(),
            checkout_url,
            session_id: session.id,
        })
    }

    /// Confirm a payment after the processor redirected the payer back
    ///
    /// Retrieves the session and records the entitlement only when the
    /// processor reports the payment settled. An unpaid session leaves the
    /// store untouched.
    pub async fn confirm_success_callback(
        &self,
        session_id: &str,
        context_token: &str,
        offer_id: &str,
        category: Option<Category>,
    ) -> Result<EntitlementRecord> {
        let session = self.client.retrieve_session(session_id).await?;

        if !session.is_paid() {
            tracing::warn!(
                "Session {} not settled, payment_status: {}",
                session.id,
                session.payment_status
            );
            return Err(GateError::PaymentNotCompleted);
        }

        let kind = OfferKind::from_offer_id(offer_id).unwrap_or(OfferKind::Unknown);
        let record = EntitlementRecord::new(
            kind,
            category,
            session.id.clone(),
            session.amount_in_dollars(),
        );
        self.store.put(context_token, record.clone()).await;

        tracing::info!(
            "Payment successful for session {}, token: {}",
            session.id,
            context_token
        );
        Ok(record)
    }

    /// Apply a webhook delivery
    ///
    /// With a webhook secret configured the delivery signature is verified
    /// first; without one the payload is accepted unverified. A settled
    /// checkout event upserts the entitlement record for its context token,
    /// overwriting whatever the redirect callback already wrote. Deliveries
    /// of other event types, and settled events missing payment metadata,
    /// are acknowledged without touching the store.
    pub async fn confirm_webhook(
        &self,
        payload: &[u8],
        signature_header: Option<&str>,
    ) -> Result<WebhookAck> {
        let event = match &self.webhook_secret {
            Some(secret) => {
                let header = signature_header.ok_or(GateError::InvalidWebhookSignature)?;
                webhook::verify_signature(payload, header, secret)?;
                WebhookEvent::parse(payload)?
            }
            None => {
                tracing::warn!(
                    "No webhook secret configured, skipping signature verification"
                );
                WebhookEvent::parse(payload)?
            }
        };

        if event.event_type == CHECKOUT_SESSION_COMPLETED {
            let session = event.session()?;
            tracing::info!("Payment completed for session: {}", session.id);

            let context_token = session.metadata.payment_context_token.clone();
            let offer_id = session.metadata.offer_id.clone();

            if context_token.is_empty() || offer_id.is_empty() {
                tracing::warn!(
                    "Session {} missing payment metadata, skipping record",
                    session.id
                );
                return Ok(WebhookAck::success());
            }

            let kind = OfferKind::from_offer_id(&offer_id).unwrap_or(OfferKind::Unknown);
            let category = Category::from_param(&session.metadata.category);
            let record = EntitlementRecord::new(
                kind,
                category,
                session.id.clone(),
                session.amount_in_dollars(),
            )
            .with_webhook_confirmation();
            self.store.put(context_token.clone(), record).await;

            tracing::info!("Webhook confirmed payment for token: {}", context_token);
        }

        Ok(WebhookAck::success())
    }

    fn success_url(&self, context_token: &str, offer_id: &str, category: &str) -> String {
        format!(
            "{}/payment/success?session_id={{CHECKOUT_SESSION_ID}}&context_token={}&offer_id={}&category={}",
            self.public_url,
            utf8_percent_encode(context_token, NON_ALPHANUMERIC),
            utf8_percent_encode(offer_id, NON_ALPHANUMERIC),
            utf8_percent_encode(category, NON_ALPHANUMERIC),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::ProcessorConfig;
    use mockito::Server;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn orchestrator_against(api_base: &str) -> PaymentOrchestrator {
        let config = ProcessorConfig::new("sk_test_123").with_api_base(api_base);
        let client = CheckoutClient::new(config).unwrap();
        PaymentOrchestrator::new(client, EntitlementStore::in_memory(), "http://localhost:8000")
    }

    fn single_category_request() -> PaymentRequest {
        PaymentRequest {
            payment_context_token: "ctx-token-1".to_string(),
            offer_id: "one_category".to_string(),
            category: Some(Category::Politics),
        }
    }

    fn completed_event(token: &str, offer_id: &str, category: &str) -> String {
        json!({
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": "cs_test_hook",
                    "payment_status": "paid",
                    "amount_total": 100,
                    "metadata": {
                        "payment_context_token": token,
                        "offer_id": offer_id,
                        "category": category,
                        "amount": "100"
                    }
                }
            }
        })
        .to_string()
    }

    #[test]
    fn test_success_url_keeps_session_placeholder() {
        let orchestrator = orchestrator_against("http://localhost:9");
        let url = orchestrator.success_url("token-1", "one_category", "politics");
        assert!(url.starts_with(
            "http://localhost:8000/payment/success?session_id={CHECKOUT_SESSION_ID}"
        ));
        assert!(url.contains("context_token=token%2D1"));
        assert!(url.contains("offer_id=one%5Fcategory"));
        assert!(url.ends_with("category=politics"));
    }

    #[tokio::test]
    async fn test_create_checkout_success() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/checkout/sessions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "id": "cs_test_abc",
                    "url": "https://checkout.stripe.com/c/pay/cs_test_abc",
                    "payment_status": "unpaid"
                })
                .to_string(),
            )
            .create();

        let orchestrator = orchestrator_against(&server.url());
        let created = orchestrator
            .create_checkout(&single_category_request())
            .await
            .unwrap();

        assert_eq!(created.message, "Checkout session created");
        assert_eq!(
            created.checkout_url,
            "https://checkout.stripe.com/c/pay/cs_test_abc"
        );
        assert_eq!(created.session_id, "cs_test_abc");
        assert!(orchestrator.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_create_checkout_rejects_unknown_offer() {
        let orchestrator = orchestrator_against("http://localhost:9");
        let request = PaymentRequest {
            payment_context_token: "ctx".to_string(),
            offer_id: "premium".to_string(),
            category: None,
        };

        let result = orchestrator.create_checkout(&request).await;
        assert!(matches!(
            result,
            Err(GateError::InvalidOffer { ref offer_id }) if offer_id == "premium"
        ));
    }

    #[tokio::test]
    async fn test_create_checkout_requires_session_url() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/checkout/sessions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "id": "cs_test_abc" }).to_string())
            .create();

        let orchestrator = orchestrator_against(&server.url());
        let result = orchestrator.create_checkout(&single_category_request()).await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("checkout session has no URL"));
    }

    #[tokio::test]
    async fn test_confirm_success_callback_records_entitlement() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/checkout/sessions/cs_test_abc")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "id": "cs_test_abc",
                    "payment_status": "paid",
                    "amount_total": 100
                })
                .to_string(),
            )
            .create();

        let orchestrator = orchestrator_against(&server.url());
        let record = orchestrator
            .confirm_success_callback(
                "cs_test_abc",
                "ctx-token-1",
                "one_category",
                Some(Category::Politics),
            )
            .await
            .unwrap();

        assert_eq!(record.offer_kind, OfferKind::SingleCategory);
        assert_eq!(record.category, Some(Category::Politics));
        assert_eq!(record.amount_paid, Decimal::new(100, 2));
        assert!(!record.confirmed_via_webhook);

        let stored = orchestrator.store().get("ctx-token-1").await.unwrap();
        assert_eq!(stored.processor_session_id, "cs_test_abc");
    }

    #[tokio::test]
    async fn test_confirm_success_callback_rejects_unpaid_session() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/checkout/sessions/cs_test_open")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "id": "cs_test_open",
                    "payment_status": "unpaid"
                })
                .to_string(),
            )
            .create();

        let orchestrator = orchestrator_against(&server.url());
        let result = orchestrator
            .confirm_success_callback("cs_test_open", "ctx-token-1", "one_category", None)
            .await;

        assert!(matches!(result, Err(GateError::PaymentNotCompleted)));
        assert!(orchestrator.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_confirm_webhook_with_valid_signature() {
        let orchestrator =
            orchestrator_against("http://localhost:9").with_webhook_secret("whsec_test");

        let payload = completed_event("ctx-token-1", "one_category", "politics");
        let header = webhook::sign_payload(payload.as_bytes(), 1700000000, "whsec_test");

        let ack = orchestrator
            .confirm_webhook(payload.as_bytes(), Some(&header))
            .await
            .unwrap();
        assert_eq!(ack.status, "success");

        let record = orchestrator.store().get("ctx-token-1").await.unwrap();
        assert_eq!(record.offer_kind, OfferKind::SingleCategory);
        assert_eq!(record.category, Some(Category::Politics));
        assert!(record.confirmed_via_webhook);
    }

    #[tokio::test]
    async fn test_confirm_webhook_rejects_bad_signature() {
        let orchestrator =
            orchestrator_against("http://localhost:9").with_webhook_secret("whsec_test");

        let payload = completed_event("ctx-token-1", "one_category", "");
        let header = webhook::sign_payload(payload.as_bytes(), 1700000000, "whsec_other");

        let result = orchestrator
            .confirm_webhook(payload.as_bytes(), Some(&header))
            .await;
        assert!(matches!(result, Err(GateError::InvalidWebhookSignature)));
        assert!(orchestrator.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_confirm_webhook_requires_header_when_secret_set() {
        let orchestrator =
            orchestrator_against("http://localhost:9").with_webhook_secret("whsec_test");

        let payload = completed_event("ctx-token-1", "one_category", "");
        let result = orchestrator.confirm_webhook(payload.as_bytes(), None).await;
        assert!(matches!(result, Err(GateError::InvalidWebhookSignature)));
    }

    #[tokio::test]
    async fn test_confirm_webhook_unverified_without_secret() {
        let orchestrator = orchestrator_against("http://localhost:9");

        let payload = completed_event("ctx-token-2", "all_categories", "");
        let ack = orchestrator
            .confirm_webhook(payload.as_bytes(), None)
            .await
            .unwrap();
        assert_eq!(ack.status, "success");

        let record = orchestrator.store().get("ctx-token-2").await.unwrap();
        assert_eq!(record.offer_kind, OfferKind::AllCategories);
        assert_eq!(record.category, None);
    }

    #[tokio::test]
    async fn test_confirm_webhook_skips_missing_metadata() {
        let orchestrator = orchestrator_against("http://localhost:9");

        let payload = completed_event("", "", "");
        let ack = orchestrator
            .confirm_webhook(payload.as_bytes(), None)
            .await
            .unwrap();
        assert_eq!(ack.status, "success");
        assert!(orchestrator.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_confirm_webhook_ignores_other_events() {
        let orchestrator = orchestrator_against("http://localhost:9");

        let payload = json!({
            "type": "invoice.paid",
            "data": { "object": { "lines": [] } }
        })
        .to_string();

        let ack = orchestrator
            .confirm_webhook(payload.as_bytes(), None)
            .await
            .unwrap();
        assert_eq!(ack.status, "success");
        assert!(orchestrator.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_confirm_webhook_rejects_malformed_payload() {
        let orchestrator = orchestrator_against("http://localhost:9");
        let result = orchestrator.confirm_webhook(b"not json", None).await;
        assert!(matches!(result, Err(GateError::InvalidWebhookPayload)));
    }

    #[tokio::test]
    async fn test_webhook_overwrites_callback_record() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/checkout/sessions/cs_test_hook")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "id": "cs_test_hook",
                    "payment_status": "paid",
                    "amount_total": 100
                })
                .to_string(),
            )
            .create();

        let orchestrator = orchestrator_against(&server.url());
        orchestrator
            .confirm_success_callback(
                "cs_test_hook",
                "ctx-token-1",
                "one_category",
                Some(Category::Politics),
            )
            .await
            .unwrap();

        let payload = completed_event("ctx-token-1", "one_category", "politics");
        orchestrator
            .confirm_webhook(payload.as_bytes(), None)
            .await
            .unwrap();

        assert_eq!(orchestrator.store().len().await, 1);
        let record = orchestrator.store().get("ctx-token-1").await.unwrap();
        assert!(record.confirmed_via_webhook);
    }

    #[tokio::test]
    async fn test_webhook_delivered_twice_is_idempotent() {
        let orchestrator = orchestrator_against("http://localhost:9");
        let payload = completed_event("ctx-token-1", "one_category", "politics");

        orchestrator
            .confirm_webhook(payload.as_bytes(), None)
            .await
            .unwrap();
        let first = orchestrator.store().get("ctx-token-1").await.unwrap();

        orchestrator
            .confirm_webhook(payload.as_bytes(), None)
            .await
            .unwrap();

        assert_eq!(orchestrator.store().len().await, 1);
        let second = orchestrator.store().get("ctx-token-1").await.unwrap();
        assert_eq!(second.offer_kind, first.offer_kind);
        assert_eq!(second.category, first.category);
        assert_eq!(second.processor_session_id, first.processor_session_id);
        assert_eq!(second.amount_paid, first.amount_paid);
        assert!(second.confirmed_via_webhook);
    }

    #[tokio::test]
    async fn test_callback_after_webhook_keeps_entitlement() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/checkout/sessions/cs_test_hook")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "id": "cs_test_hook",
                    "payment_status": "paid",
                    "amount_total": 100
                })
                .to_string(),
            )
            .create();

        let orchestrator = orchestrator_against(&server.url());
        let payload = completed_event("ctx-token-1", "one_category", "politics");
        orchestrator
            .confirm_webhook(payload.as_bytes(), None)
            .await
            .unwrap();

        // The redirect callback lands second and overwrites; last writer wins.
        orchestrator
            .confirm_success_callback(
                "cs_test_hook",
                "ctx-token-1",
                "one_category",
                Some(Category::Politics),
            )
            .await
            .unwrap();

        assert_eq!(orchestrator.store().len().await, 1);
        let record = orchestrator.store().get("ctx-token-1").await.unwrap();
        assert_eq!(record.offer_kind, OfferKind::SingleCategory);
        assert_eq!(record.category, Some(Category::Politics));
        assert!(!record.confirmed_via_webhook);
    }
}
