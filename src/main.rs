use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use web_summarizer::{
    config::Config,
    api::routes::create_router,
    extractor::PageFetcher,
    llm::GeminiClient,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "web_summarizer=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Missing API key stops us here, before anything is served
    let config = Config::load()?;
    let server_addr = config.server_addr;
    info!(model = %config.gemini_model, "Configuration loaded");

    let model = GeminiClient::from_config(&config)?;

    // Create application state
    let app_state = AppState {
        fetcher: PageFetcher::new()?,
        model: Arc::new(model),
    };

    // Build the router with routes
    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;

    info!("Listening on {}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
