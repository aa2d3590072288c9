use std::time::{Duration, Instant};

use live_sync::{CycleReport, StoreError};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::adapters::Engine;

async fn sleep_or_cancel(token: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        _ = token.cancelled() => true,
        _ = sleep(duration) => false,
    }
}

/// Run polling cycles every `interval` until `shutdown` is cancelled.
///
/// Cycles never overlap. A running cycle is always finished, so that every
/// posted message ends up recorded in its guild's config.
pub async fn live_sync_loop(engine: &Engine, interval: Duration, shutdown: CancellationToken) {
    tracing::info!(interval_secs = interval.as_secs(), "Live sync loop started");

    loop {
        if let Err(e) = sync_once(engine).await {
            tracing::warn!(error = %e, "Live sync cycle skipped");
        }
        if sleep_or_cancel(&shutdown, interval).await {
            tracing::info!("Live sync loop stopped (shutdown)");
            return;
        }
    }
}

async fn sync_once(engine: &Engine) -> Result<CycleReport, StoreError> {
    let guilds = engine.store().list_guilds()?;
    if guilds.is_empty() {
        tracing::debug!("No guild configs stored, nothing to sync");
        return Ok(CycleReport::default());
    }

    let started = Instant::now();
    let report = engine.run_cycle(&guilds).await;
    log_report(&report, started.elapsed());
    Ok(report)
}

fn log_report(report: &CycleReport, elapsed: Duration) {
    let summary = report.summary();
    tracing::info!(
        guilds = summary.synced,
        skipped = summary.skipped,
        failed = summary.failed,
        created = summary.actions.created,
        updated = summary.actions.updated,
        deleted = summary.actions.deleted,
        already_gone = summary.actions.already_gone,
        deferred = summary.actions.deferred,
        upstream_failures = summary.upstream_failures,
        elapsed_ms = elapsed.as_millis() as u64,
        "Live sync cycle finished"
    );
    if summary.actions.failed > 0 {
        tracing::warn!(
            failed_actions = summary.actions.failed,
            "Some announcements could not be updated, retrying next cycle"
        );
    }
    if let Ok(json) = serde_json::to_string(&summary) {
        tracing::debug!(summary = %json, "Cycle summary");
    }
}
