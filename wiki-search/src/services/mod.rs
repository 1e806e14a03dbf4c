pub mod metrics;
pub mod search;
pub mod summary;
pub mod wikipedia;

pub use metrics::Metrics;
pub use summary::{LookupError, SearchOutcome, SummaryProvider, NOT_FOUND_PLACEHOLDER};
pub use wikipedia::WikipediaClient;
