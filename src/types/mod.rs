//! Core types for the payment-gated content service
//!
//! This module defines the data structures shared by the classifier, the
//! access decision engine, the payment orchestrator, and the HTTP surface:
//! categories, content items, the static offer catalog, entitlement records,
//! and the wire types of the challenge flow.
//!
//! # Architecture
//!
//! The types module is organized as follows:
//! - [`category`] - The closed set of content categories
//! - [`content`] - Content items and the pluggable content source
//! - [`offer`] - The static two-entry offer catalog
//! - [`entitlement`] - Entitlement records keyed by context token
//! - [`challenge`] - Wire types for the 402 challenge flow
//!
//! # Examples
//!
//! ## Looking up offers
//!
//! ```
//! use newspay::types::offers;
//!
//! let catalog = offers::catalog();
//! assert_eq!(catalog.len(), 2);
//!
//! let offer = offers::find("one_category").expect("catalog offer");
//! assert_eq!(offer.amount, 1);
//! assert_eq!(offer.unit_amount_cents(), 100);
//! ```
//!
//! ## Building a challenge
//!
//! ```
//! use newspay::types::PaymentChallenge;
//!
//! let challenge = PaymentChallenge::new(
//!     "http://localhost:8000/l402/payment-request",
//!     "5b42c6a1-447e-4a20-9e3b-bd0e7a67c1a1",
//! );
//! assert_eq!(challenge.version, "0.2.3");
//! assert_eq!(challenge.offers.len(), 2);
//! ```
//!
//! ## Entitlement records
//!
//! ```
//! use newspay::types::{Category, EntitlementRecord, OfferKind};
//! use rust_decimal::Decimal;
//!
//! let record = EntitlementRecord::new(
//!     OfferKind::SingleCategory,
//!     Some(Category::Technology),
//!     "cs_test_123",
//!     Decimal::new(100, 2),
//! );
//! assert!(record.offer_kind.requires_category());
//! ```

pub mod category;
pub mod challenge;
pub mod content;
pub mod entitlement;
pub mod offer;

// Re-export commonly used types
pub use category::{Category, UnknownCategory};
pub use challenge::{
    CheckoutCreated, PaymentChallenge, PaymentRequest, WebhookAck, L402_VERSION,
};
pub use content::{ContentItem, ContentSource, MockNewsSource};
pub use entitlement::{EntitlementRecord, OfferKind};
pub use offer::{offers, Offer};
