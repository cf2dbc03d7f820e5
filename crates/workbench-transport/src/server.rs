//! HTTP transport server using Axum.
//!
//! Binds the listener, layers CORS and request logging over the host's
//! router, and runs it until stopped.

use std::net::SocketAddr;

use axum::{Router, response::Json, routing::get};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Errors starting the transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid listen address {0}")]
    Address(String),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Transport server configuration.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Port to listen on (0 for OS-assigned)
    pub port: u16,
    /// Hostname to bind to
    pub hostname: String,
    /// Log every HTTP request
    pub log_requests: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            hostname: "localhost".into(),
            log_requests: true,
        }
    }
}

impl TransportConfig {
    fn socket_addr(&self) -> Result<SocketAddr, TransportError> {
        let host = match self.hostname.as_str() {
            "localhost" => "127.0.0.1",
            other => other,
        };
        let literal = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]:{}", self.port)
        } else {
            format!("{host}:{}", self.port)
        };
        literal
            .parse()
            .map_err(|_| TransportError::Address(literal))
    }
}

/// The transport server — owns the listener task.
pub struct TransportServer {
    /// Shutdown signal
    shutdown_tx: Option<mpsc::Sender<()>>,
    /// Server task handle
    handle: Option<tokio::task::JoinHandle<()>>,
    /// Actual bound address
    addr: SocketAddr,
}

impl TransportServer {
    /// Wrap `app` with the transport layers and start serving it.
    pub async fn start(config: TransportConfig, app: Router) -> Result<Self, TransportError> {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);

        let app = wrap(app, config.log_requests);

        let addr = config.socket_addr()?;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|source| TransportError::Bind { addr, source })?;
        let addr = listener
            .local_addr()
            .map_err(|source| TransportError::Bind { addr, source })?;

        info!("Workbench host listening on http://{addr}");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.recv().await;
                })
                .await
            {
                error!("HTTP server error: {e}");
            }
        });

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
            addr,
        })
    }

    /// Get the actual bound port.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Get the actual bound address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Gracefully stop the server.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        info!("Workbench host stopped");
    }
}

/// Add the health route, CORS and (optionally) request logging to `app`.
pub fn wrap(app: Router, log_requests: bool) -> Router {
    let app = app
        .route("/health", get(health_handler))
        .layer(CorsLayer::new().allow_origin(Any));
    if log_requests {
        app.layer(TraceLayer::new_for_http())
    } else {
        app
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
