//! Axum web server implementation for camweb.

use std::net::SocketAddr;

use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::routes::api::api_routes;
use super::routes::media::media_routes;
use super::routes::static_files::{serve_index, serve_static_file};
use super::state::WebAppState;

/// Server configuration options.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Allow cross-origin requests from any origin.
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_permissive: false,
        }
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: WebAppState, cors_permissive: bool) -> Router {
    let cors = if cors_permissive {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
    };

    Router::new()
        .nest("/api", api_routes())
        .merge(media_routes())
        .route("/assets/{*path}", get(serve_static_file))
        .route("/", get(serve_index))
        // Unknown paths get the single page UI
        .fallback(serve_index)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the web server.
///
/// Blocks until Ctrl-C / SIGTERM. On shutdown, open preview streams are
/// ended and any continuous recording is stopped and converted.
pub async fn run_server(state: WebAppState, config: ServerConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let app = build_router(state.clone(), config.cors_permissive);

    tracing::info!("Starting web server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let token = state.shutdown_token().clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown requested");
            token.cancel();
        })
        .await?;

    state.core().recordings().shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
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
}
