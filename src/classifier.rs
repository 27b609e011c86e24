//! Request classification
//!
//! Decides whether an incoming request comes from a human browser or a
//! programmatic client. The default strategy is a deliberately simple
//! user-agent heuristic: it makes no attempt to defeat spoofing, and anything
//! it cannot recognize degrades to the stricter programmatic classification.
//! The strategy sits behind [`ClientClassifier`] so it can be swapped without
//! touching the access decision engine.

/// How a request was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// A human-facing browser; gets the full HTML experience
    Browser,
    /// Anything else; subject to the payment challenge flow
    ProgrammaticClient,
}

/// Strategy for classifying requests from their user-agent header
pub trait ClientClassifier: Send + Sync {
    /// Classify a request given its `User-Agent` header, if any
    fn classify(&self, user_agent: Option<&str>) -> Classification;
}

/// Substring tokens that identify common browsers
const BROWSER_TOKENS: &[&str] = &["mozilla", "chrome", "safari", "firefox", "edge", "opera"];

/// Default classifier: case-insensitive substring match against a fixed
/// allow-list of browser tokens
#[derive(Debug, Clone, Copy, Default)]
pub struct UserAgentClassifier;

impl ClientClassifier for UserAgentClassifier {
    fn classify(&self, user_agent: Option<&str>) -> Classification {
        let Some(user_agent) = user_agent else {
            return Classification::ProgrammaticClient;
        };
        if user_agent.trim().is_empty() {
            return Classification::ProgrammaticClient;
        }

        let lowered = user_agent.to_lowercase();
        if BROWSER_TOKENS.iter().any(|token| lowered.contains(token)) {
            Classification::Browser
        } else {
            Classification::ProgrammaticClient
        }
    }
}
