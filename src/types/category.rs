//! Content category identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of content categories served by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Politics,
    International,
    Economy,
    Technology,
    Sports,
    Entertainment,
}

/// Error returned when parsing an unknown category name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl Category {
    /// All categories in display order
    pub const ALL: [Category; 6] = [
        Category::Politics,
        Category::International,
        Category::Economy,
        Category::Technology,
        Category::Sports,
        Category::Entertainment,
    ];

    /// Get the category identifier string
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Politics => "politics",
            Category::International => "international",
            Category::Economy => "economy",
            Category::Technology => "technology",
            Category::Sports => "sports",
            Category::Entertainment => "entertainment",
        }
    }

    /// Capitalized name for page headers
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Politics => "Politics",
            Category::International => "International",
            Category::Economy => "Economy",
            Category::Technology => "Technology",
            Category::Sports => "Sports",
            Category::Entertainment => "Entertainment",
        }
    }

    /// Parse a query or metadata parameter where an empty string means absent
    pub fn from_param(value: &str) -> Option<Category> {
        if value.is_empty() {
            return None;
        }
        match value.parse() {
            Ok(category) => Some(category),
            Err(UnknownCategory(raw)) => {
                tracing::warn!("ignoring unknown category parameter: {}", raw);
                None
            }
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "politics" => Ok(Category::Politics),
            "international" => Ok(Category::International),
            "economy" => Ok(Category::Economy),
            "technology" => Ok(Category::Technology),
            "sports" => Ok(Category::Sports),
            "entertainment" => Ok(Category::Entertainment),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}
