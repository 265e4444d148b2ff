//! Web server for CloudBox.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::app::AppContext;
use crate::{CloudboxError, Result};

use super::router::create_router;

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Shared application context.
    ctx: Arc<AppContext>,
}

impl WebServer {
    /// Create a new web server from the application context.
    pub fn new(ctx: AppContext) -> Result<Self> {
        let addr = format!("{}:{}", ctx.config.server.host, ctx.config.server.port)
            .parse()
            .map_err(|e| CloudboxError::Config(format!("invalid server address: {e}")))?;

        Ok(Self {
            addr,
            ctx: Arc::new(ctx),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Run the web server until Ctrl-C or SIGTERM.
    ///
    /// In-flight requests get `server.shutdown_grace_secs` to finish once a
    /// signal arrives.
    pub async fn run(self) -> Result<()> {
        let grace = Duration::from_secs(self.ctx.config.server.shutdown_grace_secs);
        let router = create_router(self.ctx);

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);

        let (signal_tx, signal_rx) = tokio::sync::oneshot::channel::<()>();
        let serve = axum::serve(listener, router).with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signal_tx.send(());
        });
        let serve = tokio::spawn(async move { serve.await });

        tokio::select! {
            result = serve => {
                result.map_err(|e| CloudboxError::Internal(e.to_string()))??;
            }
            _ = async {
                let _ = signal_rx.await;
                tokio::time::sleep(grace).await;
            } => {
                tracing::warn!("Shutdown grace period elapsed; dropping open connections");
            }
        }

        tracing::info!("Web server stopped");
        Ok(())
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr> {
        let router = create_router(self.ctx);

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

/// Resolve when the process receives Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
