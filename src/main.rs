use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use diwali_night::config::Config;
use diwali_night::database::schema;
use diwali_night::services::blob_service::GithubBlobStore;
use diwali_night::services::records_service::RestRecordStore;
use diwali_night::services::session_service;
use diwali_night::web::{self, state::AppState};

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    info!("Connecting to database: {}", config.database_url);
    let pool = SqlitePoolOptions::new()
        .connect(&config.database_url)
        .await
        .expect("Cannot connect to the database");
    schema::ensure_schema(&pool)
        .await
        .expect("Cannot create local tables");

    spawn_session_sweeper(pool.clone(), config.session_idle_hours);

    let state = AppState::new(
        pool,
        Arc::new(RestRecordStore::new(config.records.clone())),
        Arc::new(GithubBlobStore::new(config.blob.clone())),
    );
    let app = web::router(state);

    // Start the server, one port up if the configured one is taken.
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Cannot parse host/port");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            let fallback = SocketAddr::new(addr.ip(), addr.port().saturating_add(1));
            warn!("⚠️  Could not bind {}: {}. Trying fallback {}", addr, e, fallback);
            tokio::net::TcpListener::bind(fallback)
                .await
                .expect("Cannot bind the fallback port")
        }
    };

    let bound_addr = listener.local_addr().expect("Listener has no local address");
    info!("🚀 Server running on http://{} (build {})", bound_addr, diwali_night::BUILD_ID);
    info!("📍 Register at http://{}/register, admin at /admin", bound_addr);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server stopped: {}", e);
    }
}

const SESSION_SWEEP_EVERY: Duration = Duration::from_secs(60 * 60);

/// Clears idle session values at startup and then hourly.
fn spawn_session_sweeper(pool: SqlitePool, idle_hours: i64) {
    let idle = chrono::Duration::hours(idle_hours);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_EVERY);
        loop {
            ticker.tick().await;
            if let Err(e) = session_service::sweep_idle_sessions(&pool, idle).await {
                warn!("Session sweep failed: {}", e);
            }
        }
    });
}
