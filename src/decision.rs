//! Access decision engine
//!
//! Given a request classification and an optionally presented bearer token,
//! decides whether to serve content, challenge with the offer catalog, or
//! deny. The engine reads the entitlement store and never writes it: a
//! challenge token is minted fresh on each challenge and is not persisted
//! until a payment confirms it.

use uuid::Uuid;

use crate::classifier::Classification;
use crate::store::EntitlementStore;
use crate::types::{offers, Category, Offer, OfferKind};

/// Outcome of an access decision
#[derive(Debug, Clone, PartialEq)]
pub enum AccessDecision {
    /// Serve every content item
    ServeAll,
    /// Serve only items tagged with the given category
    ServeCategory(Category),
    /// No valid entitlement; answer with a payment challenge
    Challenge {
        /// Freshly minted context token for this challenge
        context_token: String,
        /// The static offer catalog
        offers: Vec<Offer>,
    },
    /// A stored entitlement exists but cannot authorize access
    Deny {
        /// Human-readable denial reason
        reason: String,
    },
}

/// Decides access from classification, presented token, and stored entitlements
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    store: EntitlementStore,
}

impl DecisionEngine {
    /// Create an engine reading from the given store
    pub fn new(store: EntitlementStore) -> Self {
        Self { store }
    }

    /// Decide what a request may see
    ///
    /// Browsers bypass entitlement checks entirely; the human-facing page is
    /// unrestricted. Programmatic clients are served only for a token with a
    /// confirmed entitlement and challenged otherwise. A malformed stored
    /// record denies access instead of crashing; that branch exists for data
    /// corruption, not as a normal path.
    pub async fn decide(
        &self,
        classification: Classification,
        presented_token: Option<&str>,
    ) -> AccessDecision {
        if classification == Classification::Browser {
            return AccessDecision::ServeAll;
        }

        let record = match presented_token {
            Some(token) => self.store.get(token).await,
            None => None,
        };

        let Some(record) = record else {
            let context_token = Uuid::new_v4().to_string();
            tracing::debug!(
                "no valid entitlement presented, issuing challenge with token {}",
                context_token
            );
            return AccessDecision::Challenge {
                context_token,
                offers: offers::catalog(),
            };
        };

        match (record.offer_kind, record.category) {
            (OfferKind::AllCategories, _) => AccessDecision::ServeAll,
            (OfferKind::SingleCategory, Some(category)) => AccessDecision::ServeCategory(category),
            (kind, _) => {
                tracing::warn!(
                    "token has incomplete entitlement (offer {}, category missing)",
                    kind.as_offer_id()
                );
                AccessDecision::Deny {
                    reason: "incomplete entitlement".to_string(),
                }
            }
        }
    }
}
