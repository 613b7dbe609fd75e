#![allow(clippy::doc_markdown)]
//! `Dashlytics` Server - REST API for the `Dashlytics` analytical engine.

use axum::Router;
use clap::Parser;
use dashlytics_core::{CacheSweeper, DashConfig, LoggingConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dashlytics_server::{create_router, ApiDoc, AppState};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Dashlytics Server - analytics engine for BI dashboards
#[derive(Parser, Debug)]
#[command(name = "dashlytics-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = "dashlytics.toml", env = "DASHLYTICS_CONFIG")]
    config: PathBuf,

    /// Host address to bind to (overrides the configuration file)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides the configuration file)
    #[arg(short, long)]
    port: Option<u16>,
}

fn init_tracing(logging: &LoggingConfig) {
    // RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=debug", logging.level)));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load and override configuration
    let mut config = DashConfig::load_from_path(&args.config)?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate()?;

    init_tracing(&config.logging);
    tracing::info!("Starting Dashlytics server...");
    tracing::info!(
        ttl_ms = config.cache.default_ttl_ms,
        max_entries = config.cache.max_entries,
        single_flight = config.cache.single_flight,
        "Result cache configured"
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let sweep_interval = config.cache.sweep_interval();
    let state = Arc::new(AppState::new(config));
    let sweeper = CacheSweeper::spawn(Arc::clone(&state.cache), sweep_interval);

    // Swagger UI (stateless router)
    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi());

    let app = create_router(state).merge(Router::<()>::new().merge(swagger_ui));

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Dashlytics server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.shutdown().await;
    tracing::info!("Dashlytics server stopped");
    Ok(())
}
