// pulp-image/src/server/mod.rs
//! Local browser UI: a small axum app bound to the loopback interface.
mod handlers;
pub mod paths;

pub use handlers::{ApiError, RunConfig, RunResponse};

use anyhow::{anyhow, Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;

pub const DEFAULT_PORT: u16 = 3000;
const MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

pub fn router() -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/version", get(handlers::version))
        .route("/api/run", post(handlers::run))
        .route("/api/resolve-output-path", post(handlers::resolve_output_path))
        .route("/api/validate-output-path", post(handlers::validate_output_path))
        .route("/api/open-folder", post(handlers::open_folder_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// Serves until Ctrl-C.
pub async fn serve(port: u16, open_browser: bool) -> Result<()> {
    if port == 0 {
        return Err(anyhow!("Invalid port: {}", port));
    }

    let addr = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::AddrInUse {
            anyhow!("Port {} is already in use. Please try a different port.", port)
        } else {
            anyhow!("Failed to bind to {}: {}", addr, e)
        }
    })?;

    let url = format!("http://localhost:{}", port);
    println!("\n🌐 UI server running at {}", url);
    println!("Press Ctrl+C to stop\n");

    if open_browser {
        if let Err(e) = webbrowser::open(&url) {
            log::warn!("Could not open browser automatically: {}", e);
            println!("Please open {} manually in your browser.", url);
        }
    }

    axum::serve(listener, router())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    log::info!("UI server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {}", e);
    }
}
