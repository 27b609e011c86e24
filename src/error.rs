//! Error handling for the newspay gate
//!
//! All fallible operations in this crate return [`Result`]. Errors that reach
//! an HTTP handler are translated into a status code plus a structured
//! `{"detail": ...}` JSON body; nothing propagates as an unhandled fault.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, GateError>;

/// Errors produced by the gate, the orchestrator, and the processor client
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// Configuration error
    #[error("configuration error: {message}")]
    Config { message: String },

    /// The requested offer id is not in the catalog
    #[error("Invalid offer_id: {offer_id}")]
    InvalidOffer { offer_id: String },

    /// The processor reports the checkout session as not paid
    #[error("Payment not completed")]
    PaymentNotCompleted,

    /// A stored entitlement is malformed and cannot authorize access
    #[error("Access Denied: Invalid or incomplete payment token details")]
    IncompleteEntitlement,

    /// The payment processor rejected a request
    #[error("{message}")]
    Processor { message: String },

    /// Webhook payload could not be parsed
    #[error("Invalid payload")]
    InvalidWebhookPayload,

    /// Webhook signature header is missing or does not match the payload
    #[error("Invalid signature")]
    InvalidWebhookSignature,

    /// Durable store could not be read or written
    #[error("persistence error: {message}")]
    Persistence { message: String },

    /// HTTP transport failure talking to the processor
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GateError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid-offer error
    pub fn invalid_offer(offer_id: impl Into<String>) -> Self {
        Self::InvalidOffer {
            offer_id: offer_id.into(),
        }
    }

    /// Create a processor error
    pub fn processor(message: impl Into<String>) -> Self {
        Self::Processor {
            message: message.into(),
        }
    }

    /// Create a persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// HTTP status this error maps to at the endpoint boundary
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidOffer { .. }
            | Self::PaymentNotCompleted
            | Self::Processor { .. }
            | Self::InvalidWebhookPayload
            | Self::InvalidWebhookSignature => StatusCode::BAD_REQUEST,
            Self::IncompleteEntitlement => StatusCode::FORBIDDEN,
            Self::Config { .. }
            | Self::Persistence { .. }
            | Self::Http(_)
            | Self::Json(_)
            | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }
        let body = serde_json::json!({ "detail": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_400() {
        assert_eq!(
            GateError::invalid_offer("premium").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GateError::PaymentNotCompleted.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GateError::InvalidWebhookPayload.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GateError::InvalidWebhookSignature.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GateError::processor("declined").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_incomplete_entitlement_maps_to_403() {
        assert_eq!(
            GateError::IncompleteEntitlement.status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_internal_errors_map_to_500() {
        assert_eq!(
            GateError::config("missing key").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            GateError::persistence("disk full").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            GateError::invalid_offer("gold").to_string(),
            "Invalid offer_id: gold"
        );
        assert_eq!(
            GateError::PaymentNotCompleted.to_string(),
            "Payment not completed"
        );
        assert_eq!(
            GateError::InvalidWebhookSignature.to_string(),
            "Invalid signature"
        );
    }

    #[tokio::test]
    async fn test_into_response_detail_body() {
        let response = GateError::invalid_offer("gold").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["detail"], "Invalid offer_id: gold");
    }
}
