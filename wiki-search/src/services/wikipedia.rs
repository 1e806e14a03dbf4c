//! Wikipedia summary provider.
//!
//! Talks to the MediaWiki Action API: an optional search step resolves the term
//! to a page title, then one `extracts` query fetches the plain-text intro.

use super::summary::{LookupError, SummaryProvider};
use crate::config::WikipediaSettings;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub struct WikipediaClient {
    client: Client,
    settings: WikipediaSettings,
}

impl WikipediaClient {
    pub fn new(settings: WikipediaSettings) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder().user_agent(settings.user_agent.clone());
        if let Some(timeout) = settings.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            settings,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.settings.api_url
    }

    /// Resolve a free-text term to the best matching page title.
    async fn resolve_title(&self, term: &str) -> Result<String, LookupError> {
        let query: SearchQuery = self
            .query(&[
                ("list", "search"),
                ("srsearch", term),
                ("srlimit", "1"),
                ("srinfo", "suggestion"),
                ("srprop", ""),
            ])
            .await?;

        if let Some(suggestion) = query.searchinfo.and_then(|info| info.suggestion) {
            return Ok(suggestion);
        }

        query
            .search
            .into_iter()
            .next()
            .map(|hit| hit.title)
            .ok_or_else(|| LookupError::NotFound(term.to_string()))
    }

    async fn fetch_extract(&self, title: &str) -> Result<String, LookupError> {
        let mut params = vec![
            ("prop", "extracts|pageprops"),
            ("ppprop", "disambiguation"),
            ("exintro", ""),
            ("explaintext", ""),
            ("titles", title),
        ];
        if self.settings.follow_redirects {
            params.push(("redirects", ""));
        }

        let query: PagesQuery = self.query(&params).await?;
        let page = query
            .pages
            .into_iter()
            .next()
            .ok_or_else(|| LookupError::NotFound(title.to_string()))?;

        if page.missing || page.invalid {
            return Err(LookupError::NotFound(title.to_string()));
        }

        if page
            .pageprops
            .as_ref()
            .is_some_and(|props| props.disambiguation.is_some())
        {
            return Err(LookupError::Ambiguous(page.title));
        }

        Ok(page.extract.unwrap_or_default())
    }

    async fn query<Q: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<Q, LookupError> {
        let response = self
            .client
            .get(&self.settings.api_url)
            .query(&[("action", "query"), ("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let envelope: ApiEnvelope<Q> = response
            .json()
            .await
            .map_err(|e| LookupError::Decode(e.to_string()))?;

        if let Some(error) = envelope.error {
            return Err(LookupError::Api(format!("{}: {}", error.code, error.info)));
        }

        envelope
            .query
            .ok_or_else(|| LookupError::Decode("response has no query object".to_string()))
    }
}

#[async_trait]
impl SummaryProvider for WikipediaClient {
    async fn summary(&self, term: &str) -> Result<String, LookupError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(LookupError::NotFound(String::new()));
        }

        let title = if self.settings.auto_suggest {
            self.resolve_title(term).await?
        } else {
            term.to_string()
        };

        tracing::debug!(term = %term, title = %title, "Fetching Wikipedia extract");

        self.fetch_extract(&title).await
    }
}

#[derive(Deserialize)]
struct ApiEnvelope<Q> {
    error: Option<ApiErrorBody>,
    query: Option<Q>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Deserialize)]
struct SearchQuery {
    searchinfo: Option<SearchInfo>,
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchInfo {
    suggestion: Option<String>,
}

#[derive(Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Deserialize)]
struct PagesQuery {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    extract: Option<String>,
    pageprops: Option<PageProps>,
}

#[derive(Deserialize)]
struct PageProps {
    disambiguation: Option<serde_json::Value>,
}
