//! Headless server binary.
//!
//! Runs the live sync polling loop until Ctrl+C.

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use live_notifier::background;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting live notifier");

    let (db, config, dir) = live_notifier::init_foundation()?;
    tracing::info!(data_dir = %dir.display(), ?config, "Configuration loaded");
    let engine = live_notifier::build_engine(db, &config);

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutting down..."),
            Err(e) => tracing::error!("Failed to listen for Ctrl+C: {e}"),
        }
        signal_token.cancel();
    });

    background::live_sync_loop(&engine, config.poll_interval(), shutdown).await;
    Ok(())
}
