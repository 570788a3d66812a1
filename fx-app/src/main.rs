//! # FX Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the repository adapter and the rate provider
//! - Create the rate update service and its refresh scheduler
//! - Start the HTTP server

mod config;

use std::sync::Arc;

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exchange_rates::{OpenErApiProvider, RateCache, StaticRateProvider};
use fx_hex::{RateUpdateService, RefreshScheduler, inbound::HttpServer};
use fx_repo::build_repo;
use fx_types::UsdRateProvider;

use config::{Config, ProviderKind};

fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // gRPC exporter with batch processing; endpoint comes from OTEL_EXPORTER_OTLP_ENDPOINT
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("fx-rate-service"), provider))
}

fn build_provider(config: &Config) -> anyhow::Result<Arc<dyn UsdRateProvider>> {
    let provider: Arc<dyn UsdRateProvider> = match config.provider {
        ProviderKind::OpenErApi => Arc::new(OpenErApiProvider::with_timeout(
            config.provider_url.clone(),
            config.provider_timeout,
        )?),
        ProviderKind::Static => {
            tracing::warn!("Using the static development rate table");
            Arc::new(StaticRateProvider::development())
        }
    };
    Ok(provider)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // OpenTelemetry export is opt-in
    let otel = match config.otlp_endpoint {
        Some(_) => Some(init_tracer()?),
        None => None,
    };
    let telemetry = otel
        .as_ref()
        .map(|(tracer, _)| tracing_opentelemetry::layer().with_tracer(tracer.clone()));

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,fx_app=debug,fx_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    tracing::info!("Starting FX rate server on port {}", config.port);
    tracing::info!(
        backend = config.database_url.split(':').next().unwrap_or_default(),
        provider = ?config.provider,
        "Using database"
    );

    // Build repository (handles connection and migration)
    let repo = build_repo(&config.database_url).await?;

    // Shared converter over the configured USD rate source
    let converter = Arc::new(RateCache::new(build_provider(&config)?));

    let service = Arc::new(
        RateUpdateService::new(repo, converter)
            .with_fresh_cache_per_run(config.fresh_cache_per_run),
    );

    let scheduler = if config.refresh_enabled {
        let scheduler = RefreshScheduler::new(service.clone(), config.refresh_interval);
        Some(tokio::spawn(scheduler.run()))
    } else {
        tracing::info!("Scheduled refresh disabled");
        None
    };

    // Create and run the HTTP server
    let server = HttpServer::new(service);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    if let Some(task) = scheduler {
        task.abort();
    }

    // Ensure traces are flushed before exit
    if let Some((_, provider)) = otel {
        let _ = provider.shutdown();
    }
    Ok(())
}
