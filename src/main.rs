use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use wordsearch_provider::api::{self, AppState};
use wordsearch_provider::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("wordsearch_provider=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Config::load();
    tracing::info!(base_url = %config.base_url, "Launch URLs will use this base");

    let mut app = api::router(AppState::new(&config.base_url));

    if let Some(dir) = &config.static_dir {
        tracing::info!(dir = %dir.display(), "Serving static files");
        app = api::with_static(app, dir);
    }

    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;

    tracing::info!("Activity provider listening on {}:{}", config.host, config.port);
    axum::serve(listener, app).await?;
    Ok(())
}
