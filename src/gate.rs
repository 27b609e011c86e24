//! Content gate
//!
//! Applies an access decision to the content source. Pure filtering, no I/O
//! and no failure modes: a challenge or denial simply yields no content.

use crate::decision::AccessDecision;
use crate::types::{Category, ContentItem};

/// Filter content according to a decision
pub fn filter(items: Vec<ContentItem>, decision: &AccessDecision) -> Vec<ContentItem> {
    match decision {
        AccessDecision::ServeAll => items,
        AccessDecision::ServeCategory(category) => items
            .into_iter()
            .filter(|item| item.category == *category)
            .collect(),
        AccessDecision::Challenge { .. } | AccessDecision::Deny { .. } => Vec::new(),
    }
}

/// Group items by category in catalog order for browser display
///
/// Items inside each group are newest first; categories without items are
/// omitted.
pub fn group_by_category(items: &[ContentItem]) -> Vec<(Category, Vec<&ContentItem>)> {
    let mut groups = Vec::new();
    for category in Category::ALL {
        let mut group: Vec<&ContentItem> = items
            .iter()
            .filter(|item| item.category == category)
            .collect();
        if group.is_empty() {
            continue;
        }
        group.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        groups.push((category, group));
    }
    groups
}
