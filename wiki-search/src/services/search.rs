use super::metrics::{Metrics, SearchStatus, WIKIPEDIA_SEARCH_ERROR};
use super::summary::{LookupError, SearchOutcome, SummaryProvider};
use std::time::Instant;

/// Look `term` up and record the outcome.
///
/// A missing term counts as a failed search. Exactly one search counter
/// increment and one duration observation happen per call.
pub async fn search(
    provider: &dyn SummaryProvider,
    metrics: &Metrics,
    term: Option<&str>,
) -> SearchOutcome {
    let start = Instant::now();

    let result = match term {
        Some(term) => provider.summary(term).await,
        None => Err(LookupError::MissingTerm),
    };

    let elapsed = start.elapsed().as_secs_f64();

    let outcome = match result {
        Ok(summary) => SearchOutcome::Found(summary),
        Err(e) => {
            tracing::warn!(kind = e.kind(), error = %e, "Wikipedia search failed");
            SearchOutcome::NotFound(WIKIPEDIA_SEARCH_ERROR)
        }
    };

    match outcome.error_category() {
        None => metrics.record_search(SearchStatus::Success, elapsed),
        Some(category) => {
            metrics.record_search(SearchStatus::Error, elapsed);
            metrics.record_error(category);
        }
    }

    outcome
}
