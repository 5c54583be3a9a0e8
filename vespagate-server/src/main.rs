use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vespagate::{gateway_router, GatewayConfig, GatewayState, IndexMetadataStore, VespaClient};

#[derive(Parser, Debug)]
#[command(name = "vespagate-server")]
#[command(about = "OpenSearch-compatible gateway for Vespa")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "vespagate.toml")]
    config: String,

    /// Address to bind to (overrides the config file)
    #[arg(long)]
    bind: Option<String>,

    /// Vespa endpoint URL (overrides the config file)
    #[arg(long)]
    vespa_endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,vespagate=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // Load config, with CLI overrides
    let mut config = GatewayConfig::load_or_create(std::path::Path::new(&args.config))?;
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }
    if let Some(endpoint) = args.vespa_endpoint {
        config.vespa.endpoint = endpoint;
    }

    tracing::info!("Starting vespagate on {}", config.server.bind_addr);
    tracing::info!("Vespa endpoint: {}", config.vespa.endpoint);
    tracing::info!("Config file: {}", args.config);

    let client = Arc::new(VespaClient::new(
        &config.vespa.endpoint,
        &config.vespa.document_type,
    ));
    let state = GatewayState {
        client,
        metadata: Arc::new(IndexMetadataStore::new()),
        config: Arc::new(config.clone()),
    };

    let router = gateway_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    tracing::info!("Listening on {}", config.server.bind_addr);
    axum::serve(listener, router).await?;

    Ok(())
}
