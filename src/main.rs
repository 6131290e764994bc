use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use docvault::auth::jwt::JwtService;
use docvault::config::AppConfig;
use docvault::db;
use docvault::routes;
use docvault::state::AppState;
use docvault::store::PgStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    tracing::info!(
        component = "api",
        database_url = %config.redacted_database_url(),
        pool_size = config.database_max_pool_size,
        server_host = %config.server_host,
        server_port = config.server_port,
        external_ingest_key = config.external_ingest_key.is_some(),
        "loaded configuration"
    );

    let jwt = Arc::new(JwtService::from_config(&config)?);
    let state = match config.database_url.clone() {
        Some(database_url) => {
            let pool = db::init_pool_with_size(&database_url, config.database_max_pool_size)?;
            db::run_migrations(&pool)?;
            let store = Arc::new(PgStore::new(pool));
            AppState::new(config, store.clone(), store, jwt)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, keeping all data in memory");
            AppState::in_memory(config, jwt)
        }
    };

    let listen_addr: SocketAddr =
        format!("{}:{}", state.config.server_host, state.config.server_port).parse()?;
    let router = routes::create_router(state);

    let listener = TcpListener::bind(listen_addr).await?;
    tracing::info!("listening on {}", listen_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
