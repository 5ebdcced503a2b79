use idea_feed::config::Config;
use idea_feed::services::background_jobs::BackgroundJobsService;
use idea_feed::{AppState, create_app};
use tokio::net::TcpListener;
use tokio::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "idea_feed=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {e}"))?;
    tracing::info!("Configuration loaded successfully");

    if config.comparables_url.is_none() {
        tracing::info!("COMPARABLES_URL not set, using placeholder comparables");
    }

    // Create application state
    let state = AppState::new(config.clone())?;

    // Expire stale sessions in the background
    BackgroundJobsService::new(
        state.sessions.clone(),
        Duration::from_secs(config.session_sweep_secs),
    )
    .start_all_jobs();

    // Create application
    let app = create_app(state);

    // Create listener
    let listener = TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;
    tracing::info!("Server listening on {}:{}", config.host, config.port);

    // Start server
    axum::serve(listener, app).await?;

    Ok(())
}
