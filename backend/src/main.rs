use curvy_backend::{
    config::AppConfig, corridor::PgCorridorSource, create_router, database::Database,
    engine::OsrmEngine, AppState,
};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "curvy_backend=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let db = Database::connect(&config.database_url, config.db_max_connections).await?;
    let corridor = PgCorridorSource::new(db.into_pool(), config.corridor_timeout);
    let engine = OsrmEngine::new(config.osrm_url.as_str(), config.osrm_timeout)?;
    tracing::info!("routing engine at {}", engine.base_url());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = create_router(AppState::new(engine, corridor)).layer(cors);

    tracing::info!("starting backend on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
