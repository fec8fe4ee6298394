//! Server setup: middleware stack, bind and graceful shutdown.

use crate::api::handlers::AppState;
use crate::api::middleware::{create_cors_layer, request_id_middleware};
use crate::api::routes::create_router;
use crate::errors::{CasinoError, CasinoResult};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            allowed_origins: vec!["*".to_string()],
            request_timeout_secs: 30,
        }
    }
}

pub struct ApiServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    pub async fn run(self) -> CasinoResult<()> {
        let app = self.create_app();
        let addr = self.socket_addr()?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| CasinoError::Configuration(format!("bind {}: {}", addr, e)))?;

        info!("listening on http://{}", addr);
        info!(
            "CORS origins: {:?}, request timeout: {}s",
            self.config.allowed_origins, self.config.request_timeout_secs
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| CasinoError::Configuration(format!("server error: {}", e)))?;

        info!("server stopped");
        Ok(())
    }

    fn create_app(&self) -> axum::Router {
        create_router(self.state.clone())
            .layer(axum::middleware::from_fn(request_id_middleware))
            .layer(create_cors_layer(&self.config.allowed_origins))
            .layer(TimeoutLayer::new(Duration::from_secs(
                self.config.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    fn socket_addr(&self) -> CasinoResult<SocketAddr> {
        let ip = self
            .config
            .host
            .parse::<std::net::IpAddr>()
            .map_err(|e| CasinoError::Configuration(format!("invalid host: {}", e)))?;
        Ok(SocketAddr::from((ip, self.config.port)))
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C"),
        _ = terminate => info!("received terminate signal"),
    }
}
