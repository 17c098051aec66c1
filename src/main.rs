mod address;
mod api;
mod config;
mod explorer;
mod models;
mod stats;

use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stdout)
        .with_target(false)
        .init();

    info!("Wallet Stats service starting...");

    let cfg = config::load()?;
    info!("  Explorer URL: {}", cfg.explorer_url);
    info!("  Port: {}", cfg.port);

    let api_handle = tokio::spawn({
        let cfg = cfg.clone();
        async move { api::serve(cfg).await }
    });

    tokio::select! {
        res = api_handle => match res {
            Ok(Ok(_)) => info!("API exited cleanly"),
            Ok(Err(e)) => error!("API error: {:?}", e),
            Err(e) => error!("API task panicked: {:?}", e),
        },
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received, stopping...");
        }
    }

    info!("Wallet Stats service stopped.");
    Ok(())
}
