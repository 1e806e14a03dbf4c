//! Summary lookup abstraction.
//!
//! The search handler only sees [`SummaryProvider`] so the Wikipedia client can
//! be swapped for a stub in tests.

use async_trait::async_trait;
use thiserror::Error;

/// Text rendered in place of a summary whenever a lookup fails.
pub const NOT_FOUND_PLACEHOLDER: &str = "Information not found";

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("No search term supplied")]
    MissingTerm,

    #[error("No page matches \"{0}\"")]
    NotFound(String),

    #[error("\"{0}\" is a disambiguation page")]
    Ambiguous(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl LookupError {
    pub fn kind(&self) -> &'static str {
        match self {
            LookupError::MissingTerm => "missing_input",
            LookupError::NotFound(_) => "not_found",
            LookupError::Ambiguous(_) => "ambiguous",
            LookupError::Api(_) => "api",
            LookupError::Transport(_) => "transport",
            LookupError::Decode(_) => "decode",
        }
    }
}

/// Service that turns a free-text term into a short descriptive passage.
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    async fn summary(&self, term: &str) -> Result<String, LookupError>;
}

/// What the search page shows for one POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(String),
    /// Carries the `app_errors_total` category.
    NotFound(&'static str),
}

impl SearchOutcome {
    pub fn info(&self) -> &str {
        match self {
            SearchOutcome::Found(summary) => summary,
            SearchOutcome::NotFound(_) => NOT_FOUND_PLACEHOLDER,
        }
    }

    /// `app_errors_total` label for a failed lookup, `None` on success.
    pub fn error_category(&self) -> Option<&'static str> {
        match self {
            SearchOutcome::Found(_) => None,
            SearchOutcome::NotFound(category) => Some(*category),
        }
    }
}
