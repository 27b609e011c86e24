//! HTTP surface of the gate
//!
//! Routes:
//!
//! - `GET /` serves content, shaped by client classification and bearer token
//! - `POST /l402/payment-request` accepts an offer and returns a checkout URL
//! - `GET /payment/success` is the processor's redirect callback
//! - `GET /payment/cancel` is the abandoned-checkout landing page
//! - `POST /webhook` receives processor event deliveries
//!
//! Browsers always get the full HTML newsroom. Programmatic clients get
//! JSON when their bearer token has a confirmed entitlement and a `402`
//! payment challenge otherwise.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::classifier::{Classification, ClientClassifier, UserAgentClassifier};
use crate::config::GateConfig;
use crate::decision::{AccessDecision, DecisionEngine};
use crate::error::{GateError, Result};
use crate::gate;
use crate::html;
use crate::orchestrator::PaymentOrchestrator;
use crate::processor::webhook::SIGNATURE_HEADER;
use crate::processor::CheckoutClient;
use crate::store::EntitlementStore;
use crate::types::{
    Category, CheckoutCreated, ContentSource, MockNewsSource, PaymentChallenge, PaymentRequest,
    WebhookAck, L402_VERSION,
};

/// Shared state behind every route
#[derive(Clone)]
pub struct AppState {
    classifier: Arc<dyn ClientClassifier>,
    engine: DecisionEngine,
    orchestrator: PaymentOrchestrator,
    content: Arc<dyn ContentSource>,
    config: GateConfig,
}

impl AppState {
    /// Wire up the state from a configuration and an opened store
    pub fn new(config: GateConfig, store: EntitlementStore) -> Result<Self> {
        let client = CheckoutClient::new(config.processor_config())?;
        let mut orchestrator =
            PaymentOrchestrator::new(client, store.clone(), config.public_url.clone());
        if let Some(secret) = &config.webhook_secret {
            orchestrator = orchestrator.with_webhook_secret(secret.clone());
        }

        Ok(Self {
            classifier: Arc::new(UserAgentClassifier),
            engine: DecisionEngine::new(store),
            orchestrator,
            content: Arc::new(MockNewsSource::default()),
            config,
        })
    }

    /// Swap in a different content source
    pub fn with_content_source(mut self, source: impl ContentSource + 'static) -> Self {
        self.content = Arc::new(source);
        self
    }

    /// Swap in a different client classifier
    pub fn with_classifier(mut self, classifier: impl ClientClassifier + 'static) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }
}

/// Build the gate router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_content))
        .route("/l402/payment-request", post(create_payment_request))
        .route("/payment/success", get(payment_success))
        .route("/payment/cancel", get(payment_cancel))
        .route("/webhook", post(receive_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn serve_content(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok());

    let classification = state.classifier.classify(user_agent);
    let token = bearer_token(&headers);
    let decision = state.engine.decide(classification, token.as_deref()).await;
    let items = gate::filter(state.content.items(), &decision);

    match classification {
        Classification::Browser => {
            tracing::debug!("Browser request detected (User-Agent: {:?})", user_agent);
            Html(html::newsroom_page(&items)).into_response()
        }
        Classification::ProgrammaticClient => match decision {
            AccessDecision::ServeAll | AccessDecision::ServeCategory(_) => {
                Json(json!({ "news": items })).into_response()
            }
            AccessDecision::Challenge {
                context_token,
                offers,
            } => {
                tracing::debug!("No valid token presented, returning 402 with offers");
                let challenge = PaymentChallenge {
                    version: L402_VERSION.to_string(),
                    payment_request_url: state.config.payment_request_url(),
                    payment_context_token: context_token,
                    offers,
                };
                (StatusCode::PAYMENT_REQUIRED, Json(challenge)).into_response()
            }
            AccessDecision::Deny { .. } => GateError::IncompleteEntitlement.into_response(),
        },
    }
}

async fn create_payment_request(
    State(state): State<AppState>,
    Json(request): Json<PaymentRequest>,
) -> Result<Json<CheckoutCreated>> {
    tracing::info!(
        "Received payment request for offer: {}",
        request.offer_id
    );
    let created = state.orchestrator.create_checkout(&request).await?;
    Ok(Json(created))
}

#[derive(Debug, Deserialize)]
struct SuccessParams {
    session_id: String,
    context_token: String,
    offer_id: String,
    #[serde(default)]
    category: String,
}

async fn payment_success(
    State(state): State<AppState>,
    Query(params): Query<SuccessParams>,
) -> Result<Html<String>> {
    let category = Category::from_param(&params.category);
    state
        .orchestrator
        .confirm_success_callback(
            &params.session_id,
            &params.context_token,
            &params.offer_id,
            category,
        )
        .await?;
    Ok(Html(html::success_page(&params.context_token)))
}

async fn payment_cancel() -> Html<&'static str> {
    Html(html::cancel_page())
}

async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    let ack = state.orchestrator.confirm_webhook(&body, signature).await?;
    Ok(Json(ack))
}

/// Extract the token from an `Authorization: Bearer <token>` header
///
/// Anything that is not exactly two whitespace-separated parts with a
/// case-insensitive `bearer` scheme is treated as no token.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => {
            Some(token.to_string())
        }
        _ => None,
    }
}
