// Notion Clipper Server - session API for the URL to Notion page workflow

use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;
use tracing_subscriber::EnvFilter;

use notion_clipper::{app_state::AppState, config::Config, server::{create_router, ROUTES}};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("notion_clipper=info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize application state
    let app_state = AppState::new(config.clone()).await?;
    let registry = app_state.registry.clone();

    // Build main application router
    let mut app = create_router(app_state);
    if let Some(dir) = &config.server.static_dir {
        info!("Serving front-end assets from {}", dir);
        app = app.fallback_service(ServeDir::new(dir));
    }
    let app = app.layer(ServiceBuilder::new().layer(CorsLayer::permissive()));

    // Start server
    let addr = config.server_address();
    info!("Notion clipper listening on http://{}", addr);
    info!("Backend at {}", config.backend.base_url);
    info!("API:");
    for (method, path, summary) in ROUTES {
        info!("  {:<7} {:<52} - {}", method, path, summary);
    }

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    registry.settle_all().await;
    Ok(())
}
