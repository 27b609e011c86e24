//! # NewsPay Content Gate
//!
//! A **pay-per-access content gate** implementing an L402-style HTTP 402
//! payment flow on top of a Stripe-shaped checkout processor.
//!
//! ## Features
//!
//! - 🚦 **Client classification**: browsers get the free HTML newsroom, programmatic clients are gated
//! - 💳 **HTTP-native challenges**: `402 Payment Required` carrying a machine-readable offer catalog
//! - 🎫 **Context tokens as credentials**: the token minted with a challenge becomes the bearer token once payment settles
//! - 🔁 **Dual confirmation paths**: redirect callback and signed webhook race to the same idempotent record
//! - 🗂️ **Category entitlements**: single-category and all-category access tiers
//! - 💾 **Snapshot persistence**: the entitlement store survives restarts in a single JSON file
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use newspay::config::GateConfig;
//! use newspay::server::{router, AppState};
//! use newspay::store::{EntitlementStore, JsonFileBackend};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Requires STRIPE_SECRET_KEY in the environment
//!     let config = GateConfig::from_env()?;
//!     let store = EntitlementStore::open(JsonFileBackend::new(&config.db_path)).await;
//!     let app = router(AppState::new(config.clone(), store)?);
//!
//!     let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The crate is organized into several modules:
//!
//! - **`types`**: offer catalog, categories, entitlement records, and wire types
//! - **`classifier`**: User-Agent based browser/programmatic split
//! - **`store`**: entitlement store with pluggable snapshot backends
//! - **`decision`**: access decisions from classification plus stored entitlements
//! - **`gate`**: category filtering and grouping of content
//! - **`processor`**: checkout processor client and webhook signature verification
//! - **`orchestrator`**: checkout creation and the two payment confirmation paths
//! - **`html`**: newsroom, success, and cancel pages
//! - **`server`**: axum router and handlers
//! - **`config`**: environment-driven runtime configuration
//! - **`error`**: error taxonomy with HTTP status mapping

pub mod classifier;
pub mod config;
pub mod decision;
pub mod error;
pub mod gate;
pub mod html;
pub mod orchestrator;
pub mod processor;
pub mod server;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use classifier::{Classification, ClientClassifier, UserAgentClassifier};
pub use config::GateConfig;
pub use decision::{AccessDecision, DecisionEngine};
pub use error::{GateError, Result};
pub use orchestrator::PaymentOrchestrator;
pub use processor::{CheckoutClient, ProcessorConfig};
pub use store::{EntitlementStore, JsonFileBackend};
pub use types::*;

/// Current version of the newspay crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
