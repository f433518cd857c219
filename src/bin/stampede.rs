//! Stampede Binary
//!
//! Loads the runtime configuration and the load specification, builds the
//! value pool registry, and serves the HTTP trigger endpoints.

use anyhow::{Context, Result};
use clap::Parser;
use stampede::assembler::RequestAssembler;
use stampede::client::{FeatureClient, HttpFeatureClient};
use stampede::config::RuntimeConfig;
use stampede::dispatch::Dispatcher;
use stampede::logging::init_logging;
use stampede::pool::PoolRegistry;
use stampede::server::{build_router, AppState};
use stampede::spec::LoadSpec;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "stampede")]
#[command(about = "Synthetic load generator for feature-serving backends")]
struct Cli {
    /// Path to the runtime config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the load specification (overrides config)
    #[arg(long)]
    spec: Option<PathBuf>,

    /// Port to listen on for triggers (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Base URL of the serving backend (overrides config)
    #[arg(long)]
    serving_url: Option<String>,

    /// Log level (overrides config)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = RuntimeConfig::load(cli.config.as_deref())
        .context("Failed to load runtime configuration")?;
    if let Some(spec) = cli.spec {
        config.spec_path = spec;
    }
    if let Some(port) = cli.port {
        config.listen_port = port;
    }
    if let Some(serving_url) = cli.serving_url {
        config.serving_url = serving_url;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    init_logging(Some(&config.logging)).context("Failed to initialize logging")?;

    info!(serving_url = %config.serving_url, "Creating serving client");
    let client: Arc<dyn FeatureClient> = Arc::new(
        HttpFeatureClient::new(&config.serving_url)
            .context("Failed to create serving client")?,
    );

    info!(path = %config.spec_path.display(), "Loading load specification");
    let spec = LoadSpec::load(&config.spec_path).with_context(|| {
        format!(
            "Failed to load specification at {}",
            config.spec_path.display()
        )
    })?;

    let registry =
        Arc::new(PoolRegistry::from_spec(&spec).context("Failed to build value pools")?);
    info!(entities = registry.len(), "Value pools built");

    let assembler = RequestAssembler::new(registry, spec.requests, &config.project_name)
        .context("Failed to build request assembler")?;
    let dispatcher = Dispatcher::new(Arc::clone(&client), config.request_timeout());

    let state = Arc::new(AppState {
        assembler,
        dispatcher,
        client,
    });
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.listen_port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.listen_port))?;
    info!(port = config.listen_port, "Trigger server listening");
    axum::serve(listener, app)
        .await
        .context("Trigger server failed")?;

    Ok(())
}
