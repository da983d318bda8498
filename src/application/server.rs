use std::net::SocketAddr;

use anyhow::Context;
use chrono::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use crate::application::routes::app_router;
use crate::application::state::{AppState, AppStateConfig};
use crate::infrastructure::auth::JwtKeys;
use crate::infrastructure::database::Database;

pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub token_secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
    pub auth_rate_limit_per_minute: u32,
}

pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let database = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    if config.access_ttl_minutes <= 0 || config.refresh_ttl_days <= 0 {
        anyhow::bail!("token lifetimes must be positive");
    }
    let jwt_keys = JwtKeys::new(
        &config.token_secret,
        Duration::minutes(config.access_ttl_minutes),
        Duration::days(config.refresh_ttl_days),
    );

    let state = AppState::from_database(
        &database,
        AppStateConfig {
            jwt_keys,
            auth_rate_limit_per_minute: config.auth_rate_limit_per_minute,
        },
    );

    let listener = TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_address))?;

    let app = app_router(state);

    info!(
        address = %config.bind_address,
        database = %config.database_url,
        "starting HTTP server"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server terminated unexpectedly")?;

    info!("server shutdown complete");

    Ok(())
}

#[allow(clippy::expect_used)] // Startup: panicking is appropriate if signal handlers fail
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
