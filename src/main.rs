use std::net::SocketAddr;

use axum::http::{header, HeaderValue, Method};
use mimalloc::MiMalloc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use trenddash::config::AppConfig;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Maximum request body size (the only bodies are small JSON credentials).
const MAX_BODY_BYTES: usize = 16 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trenddash=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = AppConfig::from_env().expect("Failed to load configuration");

    let pool =
        trenddash::db::create_pool(&config.database_url, config.database_max_connections).await?;
    trenddash::db::run_migrations(&pool).await?;

    // Only the configured frontend origin may call the API, with credentials
    // so the session cookie travels on cross-origin requests.
    let frontend_origin = config
        .frontend_url
        .parse::<HeaderValue>()
        .expect("FRONTEND_URL is not a valid origin");
    let cors = CorsLayer::new()
        .allow_origin(frontend_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let state = trenddash::AppState {
        db: pool,
        config: config.clone(),
    };

    let app = trenddash::routes::api_router()
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CompressionLayer::new());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(host = %addr, "Starting trenddash API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
