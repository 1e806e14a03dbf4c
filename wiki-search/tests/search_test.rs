mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{
    body_string, form_request, get_request, search_request, stub_provider, test_router,
    StubProvider, TestApp,
};
use std::time::Duration;
use tower::util::ServiceExt;
use wiki_search::services::metrics::{SearchStatus, WIKIPEDIA_SEARCH_ERROR};

const EMPTY_INFO: &str = r#"<p id="info"></p>"#;

fn info_paragraph(text: &str) -> String {
    format!(r#"<p id="info">{}</p>"#, text)
}

#[tokio::test]
async fn get_renders_empty_form() {
    let (app, metrics) = test_router(stub_provider());

    let response = app.oneshot(get_request("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));

    let body = body_string(response).await;
    assert!(body.contains(r#"name="search""#));
    assert!(body.contains(EMPTY_INFO));
    assert_eq!(metrics.searches(SearchStatus::Success), 0);
    assert_eq!(metrics.searches(SearchStatus::Error), 0);
}

#[tokio::test]
async fn get_stays_empty_after_searches() {
    let (app, _metrics) = test_router(stub_provider());

    app.clone().oneshot(search_request("Rust")).await.unwrap();
    app.clone().oneshot(search_request("Mercury")).await.unwrap();
    let response = app.oneshot(get_request("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains(EMPTY_INFO));
}

#[tokio::test]
async fn successful_search_renders_summary() {
    let (app, metrics) = test_router(stub_provider());

    let response = app.oneshot(search_request("Rust")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains(&info_paragraph(
        "Rust is a general-purpose programming language."
    )));
    assert!(!body.contains("Information not found"));

    assert_eq!(metrics.searches(SearchStatus::Success), 1);
    assert_eq!(metrics.searches(SearchStatus::Error), 0);
    assert_eq!(metrics.errors(WIKIPEDIA_SEARCH_ERROR), 0);
}

#[tokio::test]
async fn every_fault_kind_renders_placeholder() {
    let (app, metrics) = test_router(stub_provider());

    // ambiguous, transport failure, not found
    for (i, term) in ["Mercury", "Timeout", "Qwxzzy"].into_iter().enumerate() {
        let response = app.clone().oneshot(search_request(term)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK, "term {term}");
        let body = body_string(response).await;
        assert!(body.contains(&info_paragraph("Information not found")));

        let expected = i as u64 + 1;
        assert_eq!(metrics.searches(SearchStatus::Error), expected);
        assert_eq!(metrics.errors(WIKIPEDIA_SEARCH_ERROR), expected);
    }

    assert_eq!(metrics.searches(SearchStatus::Success), 0);
}

#[tokio::test]
async fn missing_search_field_behaves_like_fault() {
    let (app, metrics) = test_router(stub_provider());

    let response = app.oneshot(form_request("query=Rust")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response)
        .await
        .contains(&info_paragraph("Information not found")));
    assert_eq!(metrics.searches(SearchStatus::Error), 1);
    assert_eq!(metrics.errors(WIKIPEDIA_SEARCH_ERROR), 1);
}

#[tokio::test]
async fn non_form_body_behaves_like_fault() {
    let (app, metrics) = test_router(stub_provider());

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"search":"Rust"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Information not found"));
    assert_eq!(metrics.searches(SearchStatus::Error), 1);
    assert_eq!(metrics.requests("POST", "/", 200), 1);
}

#[tokio::test]
async fn summary_text_is_html_escaped() {
    let provider = StubProvider::new().with_summary("xss", "<script>alert(1)</script>");
    let (app, _metrics) = test_router(provider);

    let response = app.oneshot(search_request("xss")).await.unwrap();
    let body = body_string(response).await;

    assert!(!body.contains("<script>alert(1)</script>"));
    assert!(body.contains("&lt;script&gt;"));
}

#[tokio::test]
async fn active_gauge_returns_to_zero_after_fault() {
    let (app, metrics) = test_router(stub_provider());

    app.clone().oneshot(search_request("Mercury")).await.unwrap();
    assert_eq!(metrics.active_requests(), 0);

    app.oneshot(form_request("")).await.unwrap();
    assert_eq!(metrics.active_requests(), 0);
    assert_eq!(metrics.requests("POST", "/", 200), 2);
}

#[tokio::test]
async fn search_over_tcp_uses_form_encoding() {
    let app = TestApp::spawn(stub_provider()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(&app.address)
        .form(&[("search", "Ferris")])
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains(&info_paragraph("Ferris is a crab.")));
    assert_eq!(app.metrics.searches(SearchStatus::Success), 1);
}

#[tokio::test]
async fn concurrent_searches_do_not_lose_updates() {
    let provider = stub_provider().with_delay(Duration::from_millis(20));
    let app = TestApp::spawn(provider).await;
    let client = reqwest::Client::new();

    let terms = ["Rust", "Ferris", "Mercury", "Timeout", "Nope"];
    let requests = (0..40).map(|i| {
        let client = client.clone();
        let url = app.address.clone();
        let term = terms[i % terms.len()];
        async move {
            client
                .post(url)
                .form(&[("search", term)])
                .send()
                .await
                .expect("Failed to execute request")
                .status()
        }
    });

    let statuses = futures::future::join_all(requests).await;

    assert!(statuses.iter().all(|status| *status == StatusCode::OK));
    assert_eq!(app.metrics.searches(SearchStatus::Success), 16);
    assert_eq!(app.metrics.searches(SearchStatus::Error), 24);
    assert_eq!(app.metrics.errors(WIKIPEDIA_SEARCH_ERROR), 24);
    assert_eq!(app.metrics.requests("POST", "/", 200), 40);
    assert_eq!(app.metrics.active_requests(), 0);
}
