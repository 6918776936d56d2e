//! HTTP server builder utilities.
//!
//! Binds an `axum` router to a TCP address and serves it until a shutdown
//! signal arrives (SIGTERM/SIGINT, or a programmatic shutdown channel).
//!
//! # Example
//!
//! ```ignore
//! use video_insight_common::server::WebServerBuilder;
//!
//! let router = axum::Router::new();
//! WebServerBuilder::new(router)
//!     .with_address("127.0.0.1", 8080)
//!     .run()
//!     .await?;
//! ```

use axum::Router;
use thiserror::Error;
use tokio::sync::oneshot;

/// Errors that can occur when running the HTTP server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address
    #[error("Failed to bind to {host}:{port}: {message}")]
    BindFailed {
        host: String,
        port: u16,
        message: String,
    },

    /// Error while serving connections
    #[error("Serve error: {0}")]
    Serve(String),
}

/// Builder for configuring and running the web server.
pub struct WebServerBuilder {
    router: Router,
    host: String,
    port: u16,
    shutdown_rx: Option<oneshot::Receiver<()>>,
}

impl WebServerBuilder {
    /// Create a new server builder for the given router.
    ///
    /// Listens on `127.0.0.1:8080` unless `with_address` is called.
    pub fn new(router: Router) -> Self {
        Self {
            router,
            host: "127.0.0.1".to_string(),
            port: 8080,
            shutdown_rx: None,
        }
    }

    /// Set the bind host and port.
    pub fn with_address(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    /// Set a shutdown signal receiver for graceful shutdown.
    ///
    /// When the sender is dropped or a message is sent, the server
    /// will initiate graceful shutdown.
    pub fn with_shutdown(mut self, shutdown_rx: oneshot::Receiver<()>) -> Self {
        self.shutdown_rx = Some(shutdown_rx);
        self
    }

    /// Bind and serve until shut down.
    pub async fn run(self) -> Result<(), ServerError> {
        let bind_addr = format!("{}:{}", self.host, self.port);
        let tcp_listener = tokio::net::TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| ServerError::BindFailed {
                host: self.host.clone(),
                port: self.port,
                message: e.to_string(),
            })?;

        tracing::info!(address = %bind_addr, "HTTP server listening");

        let shutdown_future = async {
            if let Some(rx) = self.shutdown_rx {
                let _ = rx.await;
            } else {
                wait_for_shutdown_signal().await;
            }
        };

        axum::serve(tcp_listener, self.router)
            .with_graceful_shutdown(shutdown_future)
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");
        let mut sigint =
            signal(SignalKind::interrupt()).expect("Failed to register SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM");
            }
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to register Ctrl+C handler");
        tracing::info!("Received Ctrl+C");
    }
}

/// Convenience function to set up graceful shutdown handling.
///
/// Returns a sender that can be used to trigger shutdown programmatically,
/// and a receiver to pass to the server builder.
pub fn shutdown_channel() -> (oneshot::Sender<()>, oneshot::Receiver<()>) {
    oneshot::channel()
}
