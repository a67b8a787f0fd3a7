//! Nexus Realtime server binary.

use std::sync::Arc;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nexus_realtime::adapters::access::{HttpBoardAccessChecker, InMemoryBoardAccess};
use nexus_realtime::adapters::auth::JwtSessionValidator;
use nexus_realtime::adapters::http::app_router;
use nexus_realtime::adapters::websocket::{Hub, WebSocketState};
use nexus_realtime::config::{AccessMode, AppConfig};
use nexus_realtime::ports::BoardAccessChecker;

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let addr = config.server.socket_addr()?;

    let validator = Arc::new(JwtSessionValidator::new(&config.auth.jwt_secret()));
    let access: Arc<dyn BoardAccessChecker> = match config.access.mode {
        AccessMode::Http => {
            let base_url = config.access.base_url.as_deref().unwrap_or_default();
            Arc::new(HttpBoardAccessChecker::new(
                base_url,
                config.access.service_token(),
                config.access.timeout(),
            )?)
        }
        AccessMode::AllowAll => {
            tracing::warn!("Board access checks disabled, every user may join every board");
            Arc::new(InMemoryBoardAccess::allow_all())
        }
    };

    let (hub, hub_task) = Hub::spawn(config.realtime.hub_settings());

    let ws_state = WebSocketState::new(hub, validator, access)
        .with_connection_settings(config.realtime.connection_settings())
        .with_max_message_size(config.realtime.max_message_size);

    let app = app_router(
        ws_state,
        config.internal.api_token(),
        &config.server.cors_origins_list(),
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        access_mode = ?config.access.mode,
        "Nexus realtime listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Open connections still hold hub handles; don't wait on them.
    hub_task.abort();
    tracing::info!("Server stopped");

    Ok(())
}
