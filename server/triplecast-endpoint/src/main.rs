//! Triplecast endpoint server binary.

use clap::Parser;
use std::path::PathBuf;
use triplecast_endpoint::{server, ServerConfig};

#[derive(Parser)]
#[command(name = "triplecast")]
#[command(about = "SPARQL query endpoint with format dispatch and conversion")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listener host override
    #[arg(long)]
    host: Option<String>,

    /// Listener port override
    #[arg(short, long)]
    port: Option<u16>,

    /// Backing store SPARQL endpoint override
    #[arg(long)]
    backend_endpoint: Option<String>,

    /// Logging level override
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = ServerConfig::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(endpoint) = args.backend_endpoint {
        config.backend.endpoint = endpoint;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    let level = match config.logging.level.as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    server::run(config).await?;
    Ok(())
}
