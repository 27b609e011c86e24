//! Content items and content sources
//!
//! The gate treats content as an opaque source keyed by category. The bundled
//! [`MockNewsSource`] fabricates a plausible newsroom at startup so the demo
//! works without any upstream feed.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::category::Category;

/// A single content item served by the gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Publication time
    pub timestamp: DateTime<Utc>,
    /// Headline
    pub title: String,
    /// Short summary
    pub description: String,
    /// Category tag used for entitlement filtering
    pub category: Category,
}

/// Source of content items, consulted on every content request
pub trait ContentSource: Send + Sync {
    /// All available items, newest first
    fn items(&self) -> Vec<ContentItem>;
}

/// Generated stand-in newsroom with a fixed number of items per category
#[derive(Debug, Clone)]
pub struct MockNewsSource {
    items: Vec<ContentItem>,
}

const HEADLINE_VERBS: &[&str] = &[
    "Streamline",
    "Reinvent",
    "Expand",
    "Overhaul",
    "Accelerate",
    "Reshape",
    "Unveil",
    "Scale",
];

const HEADLINE_ADJECTIVES: &[&str] = &[
    "global",
    "next-generation",
    "cross-border",
    "unexpected",
    "long-awaited",
    "controversial",
    "record-breaking",
    "emerging",
];

const HEADLINE_NOUNS: &[&str] = &[
    "initiatives",
    "markets",
    "partnerships",
    "negotiations",
    "platforms",
    "reforms",
    "breakthroughs",
    "campaigns",
];

const SUMMARY_SENTENCES: &[&str] = &[
    "Officials confirmed the development late on Tuesday.",
    "Analysts say the move could reshape the sector for years.",
    "Early reactions have been mixed across the industry.",
    "Sources close to the matter describe the talks as constructive.",
    "A formal announcement is expected within the week.",
    "Critics argue the plan leaves key questions unanswered.",
    "Observers point to similar efforts that stalled last year.",
    "The decision follows months of behind-the-scenes preparation.",
];

impl MockNewsSource {
    /// Generate a newsroom with `items_per_category` items in every category,
    /// timestamped within the last three days and sorted newest first
    pub fn new(items_per_category: usize) -> Self {
        let mut rng = rand::thread_rng();
        let now = Utc::now();
        let mut items = Vec::with_capacity(items_per_category * Category::ALL.len());

        for category in Category::ALL {
            for _ in 0..items_per_category {
                let age = Duration::hours(rng.gen_range(0..=72))
                    + Duration::minutes(rng.gen_range(0..60));
                items.push(ContentItem {
                    timestamp: now - age,
                    title: format!(
                        "{} News: {} {} {}",
                        category.display_name(),
                        HEADLINE_VERBS[rng.gen_range(0..HEADLINE_VERBS.len())],
                        HEADLINE_ADJECTIVES[rng.gen_range(0..HEADLINE_ADJECTIVES.len())],
                        HEADLINE_NOUNS[rng.gen_range(0..HEADLINE_NOUNS.len())],
                    ),
                    description: (0..3)
                        .map(|_| SUMMARY_SENTENCES[rng.gen_range(0..SUMMARY_SENTENCES.len())])
                        .collect::<Vec<_>>()
                        .join(" "),
                    category,
                });
            }
        }

        items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Self { items }
    }

    /// Build a source from fixed items, newest first
    pub fn from_items(mut items: Vec<ContentItem>) -> Self {
        items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Self { items }
    }
}

impl Default for MockNewsSource {
    fn default() -> Self {
        Self::new(4)
    }
}

impl ContentSource for MockNewsSource {
    fn items(&self) -> Vec<ContentItem> {
        self.items.clone()
    }
}
