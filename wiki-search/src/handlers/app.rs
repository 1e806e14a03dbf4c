use crate::AppState;
use askama::Template;
use axum::{
    extract::{rejection::FormRejection, State},
    response::IntoResponse,
    Form, Json,
};
use serde::Deserialize;
use serde_json::json;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub info: String,
}

#[derive(Deserialize)]
pub struct SearchForm {
    pub search: Option<String>,
}

pub async fn index() -> impl IntoResponse {
    IndexTemplate {
        info: String::new(),
    }
}

/// POST `/`. Always renders the page; lookup failures show the placeholder.
pub async fn search(
    State(state): State<AppState>,
    form: Result<Form<SearchForm>, FormRejection>,
) -> impl IntoResponse {
    let term = match form {
        Ok(Form(form)) => form.search,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Search form could not be decoded");
            None
        }
    };

    let outcome =
        crate::services::search::search(state.provider.as_ref(), &state.metrics, term.as_deref())
            .await;

    IndexTemplate {
        info: outcome.info().to_string(),
    }
}

pub async fn health_check() -> impl IntoResponse {
    let timestamp = chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0;

    Json(json!({
        "status": "healthy",
        "timestamp": timestamp
    }))
}
