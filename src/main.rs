//! sockswarden - Corporate SOCKS5 Intercepting Proxy
//!
//! This is the main entry point for the sockswarden daemon.

use anyhow::Result;
use clap::Parser;
use sockswarden::config::load_config;
use sockswarden::logging::build_sink;
use sockswarden::server::ProxyServer;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Corporate SOCKS5 intercepting proxy
#[derive(Parser, Debug)]
#[command(name = "sockswarden")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the INI configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Log level for process diagnostics (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(&args.log_level)?;

    let config = Arc::new(load_config(&args.config)?);
    info!("sockswarden v{}", sockswarden::VERSION);
    info!("configuration loaded from {:?}", args.config);

    let sink = build_sink(&config.logging)?;
    let server = Arc::new(ProxyServer::bind(Arc::clone(&config), sink)?);
    info!("proxy listening on {}", server.local_addr()?);

    // Handle Ctrl+C and termination signals (cross-platform)
    let shutdown_server = Arc::clone(&server);
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm =
                signal(SignalKind::terminate()).expect("Failed to setup SIGTERM handler");

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Received Ctrl+C, shutting down...");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            // On Windows, only handle Ctrl+C
            let _ = tokio::signal::ctrl_c().await;
            info!("Received Ctrl+C, shutting down...");
        }

        shutdown_server.stop();
    });

    server.run().await?;
    info!("sockswarden stopped");
    Ok(())
}

/// Setup process diagnostics based on the CLI flag
fn setup_logging(level: &str) -> Result<()> {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}
