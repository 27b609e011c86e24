//! Entitlement records
//!
//! An entitlement record exists for a context token only after a confirmed
//! payment; the presence of the token as a key in the store is the
//! authorization proof. Records are never expired or revoked.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::category::Category;

/// The access tier a payment was made for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfferKind {
    /// Access to a single category
    #[serde(rename = "one_category")]
    SingleCategory,
    /// Access to every category
    #[serde(rename = "all_categories")]
    AllCategories,
    /// Unrecognized value found in a persisted record
    #[serde(rename = "unknown", other)]
    Unknown,
}

impl OfferKind {
    /// Map a catalog offer id to its kind; `None` for ids outside the catalog
    pub fn from_offer_id(offer_id: &str) -> Option<OfferKind> {
        match offer_id {
            super::offer::offers::ONE_CATEGORY => Some(OfferKind::SingleCategory),
            super::offer::offers::ALL_CATEGORIES => Some(OfferKind::AllCategories),
            _ => None,
        }
    }

    /// The catalog offer id for this kind
    pub fn as_offer_id(&self) -> &'static str {
        match self {
            OfferKind::SingleCategory => "one_category",
            OfferKind::AllCategories => "all_categories",
            OfferKind::Unknown => "unknown",
        }
    }

    /// Whether an entitlement of this kind needs a category to be usable
    pub fn requires_category(&self) -> bool {
        matches!(self, OfferKind::SingleCategory)
    }
}

/// Proof that a context token has paid for an offer
///
/// Persisted in the same shape the store has always used: the offer id under
/// `offer_id`, the grant time under `timestamp`, the processor session under
/// `stripe_session_id`, and the amount in dollars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitlementRecord {
    /// The purchased access tier
    #[serde(rename = "offer_id")]
    pub offer_kind: OfferKind,
    /// Purchased category; present iff the tier is single-category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// When the payment was confirmed
    #[serde(rename = "timestamp")]
    pub granted_at: DateTime<Utc>,
    /// Checkout session id at the processor, kept for audit
    #[serde(rename = "stripe_session_id")]
    pub processor_session_id: String,
    /// Amount paid, in dollars
    #[serde(rename = "amount", with = "rust_decimal::serde::float")]
    pub amount_paid: Decimal,
    /// Whether the asynchronous webhook (rather than only the redirect
    /// callback) has confirmed this payment
    #[serde(rename = "webhook_confirmed", default)]
    pub confirmed_via_webhook: bool,
}

impl EntitlementRecord {
    /// Create a record for a freshly confirmed payment
    pub fn new(
        offer_kind: OfferKind,
        category: Option<Category>,
        processor_session_id: impl Into<String>,
        amount_paid: Decimal,
    ) -> Self {
        Self {
            offer_kind,
            category,
            granted_at: Utc::now(),
            processor_session_id: processor_session_id.into(),
            amount_paid,
            confirmed_via_webhook: false,
        }
    }

    /// Mark this record as confirmed by the webhook path
    pub fn with_webhook_confirmation(mut self) -> Self {
        self.confirmed_via_webhook = true;
        self
    }
}
