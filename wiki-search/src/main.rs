use dotenvy::dotenv;
use service_core::observability::init_tracing;
use std::sync::Arc;
use wiki_search::config::get_configuration;
use wiki_search::services::WikipediaClient;
use wiki_search::startup::Application;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing("wiki-search", &configuration.log.level);

    let provider = Arc::new(
        WikipediaClient::new(configuration.wikipedia.clone()).map_err(|e| {
            tracing::error!("Failed to build Wikipedia client: {}", e);
            anyhow::anyhow!("HTTP client error: {}", e)
        })?,
    );
    tracing::info!("Summaries served from {}", provider.api_url());

    let application = Application::build(configuration, provider)
        .await
        .map_err(|e| anyhow::anyhow!("Startup error: {}", e))?;

    application.run_until_stopped().await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
