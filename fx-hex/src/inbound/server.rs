//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use fx_types::ExchangeRateRepository;

use super::handlers::{self, AppState};
use crate::RateUpdateService;

/// HTTP Server for the exchange rate API.
pub struct HttpServer<R: ExchangeRateRepository> {
    state: Arc<AppState<R>>,
}

impl<R: ExchangeRateRepository> HttpServer<R> {
    /// Creates a new HTTP server sharing the given service with the scheduler.
    pub fn new(service: Arc<RateUpdateService<R>>) -> Self {
        Self {
            state: Arc::new(AppState { service }),
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        Router::new()
            .route("/health", get(handlers::health::<R>))
            .route("/api-docs/openapi.json", get(handlers::openapi_json))
            .route(
                "/api/rates/{base}/{target}",
                get(handlers::get_cross_rate::<R>),
            )
            .route(
                "/api/pairs",
                get(handlers::list_pairs::<R>).post(handlers::create_pair::<R>),
            )
            .route("/api/offsets", get(handlers::offset_configuration::<R>))
            .route(
                "/api/offsets/{pair}",
                get(handlers::get_offset::<R>).put(handlers::set_offset::<R>),
            )
            .route("/api/refresh", post(handlers::refresh::<R>))
            .route("/api/sync-log", get(handlers::sync_log::<R>))
            .layer(metrics)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

/// Resolves on Ctrl-C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
