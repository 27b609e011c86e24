//! Static offer catalog
//!
//! The catalog is fixed configuration: exactly two access tiers, a cheap
//! single-category pass and a pricier all-categories subscription. Prices are
//! whole dollars on the wire and converted to cents only at the processor
//! boundary.

use serde::{Deserialize, Serialize};

/// A priced access tier in the static catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    /// Catalog identifier presented in challenges and payment requests
    pub id: String,
    /// Human-readable title
    pub title: String,
    /// Human-readable description
    pub description: String,
    /// Price in whole dollars
    pub amount: u64,
    /// ISO currency code
    pub currency: String,
    /// Offer flavor (e.g. "subscription"); absent for one-time purchases
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub offer_type: Option<String>,
    /// Informational subscription length; not enforced as an expiry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// Payment methods accepted for this offer
    pub payment_methods: Vec<String>,
}

impl Offer {
    /// Price in cents, the unit the processor expects
    pub fn unit_amount_cents(&self) -> i64 {
        (self.amount * 100) as i64
    }
}

/// The offer catalog
pub mod offers {
    use super::Offer;

    /// Single-category access tier
    pub const ONE_CATEGORY: &str = "one_category";
    /// All-categories subscription tier
    pub const ALL_CATEGORIES: &str = "all_categories";

    /// The full catalog, in presentation order
    pub fn catalog() -> Vec<Offer> {
        vec![
            Offer {
                id: ONE_CATEGORY.to_string(),
                title: "Access to one category".to_string(),
                description: "Access to all the data in one category".to_string(),
                amount: 1,
                currency: "USD".to_string(),
                offer_type: None,
                duration: None,
                payment_methods: vec!["stripe".to_string()],
            },
            Offer {
                id: ALL_CATEGORIES.to_string(),
                title: "Monthly Subscription".to_string(),
                description:
                    "Access all the data in our website for a month, any category, any time"
                        .to_string(),
                amount: 5,
                currency: "USD".to_string(),
                offer_type: Some("subscription".to_string()),
                duration: Some("1 month".to_string()),
                payment_methods: vec!["stripe".to_string()],
            },
        ]
    }

    /// Look up an offer by id
    pub fn find(offer_id: &str) -> Option<Offer> {
        catalog().into_iter().find(|offer| offer.id == offer_id)
    }

    /// Check whether an offer id is in the catalog
    pub fn is_known(offer_id: &str) -> bool {
        matches!(offer_id, ONE_CATEGORY | ALL_CATEGORIES)
    }
}
