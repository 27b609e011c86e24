//! Gate configuration
//!
//! All settings come from the environment (a `.env` file is honored when
//! present). Only the processor secret key is mandatory; everything else
//! has a local-development default.

use std::env;
use std::path::PathBuf;

use crate::error::{GateError, Result};
use crate::processor::{ProcessorConfig, DEFAULT_API_BASE};

/// Default listen address
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Default externally reachable base URL
pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:8000";

/// Default entitlement snapshot path
pub const DEFAULT_DB_PATH: &str = "payments_db.json";

/// Runtime configuration for the gate server
#[derive(Clone)]
pub struct GateConfig {
    /// Address the HTTP server listens on
    pub bind_addr: String,
    /// Base URL the processor redirects payers back to
    pub public_url: String,
    /// Path of the entitlement snapshot file
    pub db_path: PathBuf,
    /// Processor secret API key
    pub secret_key: String,
    /// Shared secret for webhook signature verification; unset means
    /// deliveries are accepted unverified
    pub webhook_secret: Option<String>,
    /// Processor API base URL
    pub api_base: String,
}

impl std::fmt::Debug for GateConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateConfig")
            .field("bind_addr", &self.bind_addr)
            .field("public_url", &self.public_url)
            .field("db_path", &self.db_path)
            .field("secret_key", &"<redacted>")
            .field(
                "webhook_secret",
                &self.webhook_secret.as_deref().map(|_| "<redacted>"),
            )
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GateConfig {
    /// Create a configuration with local-development defaults
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            public_url: DEFAULT_PUBLIC_URL.to_string(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            secret_key: secret_key.into(),
            webhook_secret: None,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Load the configuration from environment variables
    ///
    /// `STRIPE_SECRET_KEY` is required. `NEWSPAY_BIND`, `NEWSPAY_PUBLIC_URL`,
    /// `NEWSPAY_DB`, `STRIPE_WEBHOOK_SECRET` and `STRIPE_API_BASE` are
    /// optional overrides.
    pub fn from_env() -> Result<Self> {
        let secret_key = env::var("STRIPE_SECRET_KEY")
            .map_err(|_| GateError::config("STRIPE_SECRET_KEY must be set"))?;

        let config = Self {
            bind_addr: env::var("NEWSPAY_BIND").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            public_url: normalize_url(
                env::var("NEWSPAY_PUBLIC_URL").unwrap_or_else(|_| DEFAULT_PUBLIC_URL.to_string()),
            ),
            db_path: env::var("NEWSPAY_DB")
                .unwrap_or_else(|_| DEFAULT_DB_PATH.to_string())
                .into(),
            secret_key,
            webhook_secret: env::var("STRIPE_WEBHOOK_SECRET")
                .ok()
                .filter(|secret| !secret.is_empty()),
            api_base: env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Override the externally reachable base URL
    pub fn with_public_url(mut self, public_url: impl Into<String>) -> Self {
        self.public_url = normalize_url(public_url.into());
        self
    }

    /// Override the snapshot path
    pub fn with_db_path(mut self, db_path: impl Into<PathBuf>) -> Self {
        self.db_path = db_path.into();
        self
    }

    /// Set the webhook signature secret
    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_secret = Some(secret.into());
        self
    }

    /// Override the processor API base
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.secret_key.is_empty() {
            return Err(GateError::config("STRIPE_SECRET_KEY cannot be empty"));
        }
        if !self.public_url.starts_with("http://") && !self.public_url.starts_with("https://") {
            return Err(GateError::config(
                "Public URL must start with http:// or https://",
            ));
        }
        Ok(())
    }

    /// The URL challenges tell clients to POST accepted offers to
    pub fn payment_request_url(&self) -> String {
        format!("{}/l402/payment-request", self.public_url)
    }

    /// Processor client configuration derived from this gate configuration
    pub fn processor_config(&self) -> ProcessorConfig {
        ProcessorConfig::new(self.secret_key.clone()).with_api_base(self.api_base.clone())
    }
}

fn normalize_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
