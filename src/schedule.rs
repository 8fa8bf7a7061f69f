//! Interval trigger for repeated sync runs.

use std::future::Future;
use std::time::Duration;

use checkpoint::CursorStore;
use product_store::RecordStore;
use serde::Serialize;
use sync_core::{Result, SourceClient};
use tokio::time::MissedTickBehavior;

use crate::sync::SyncEngine;

/// What a watch loop did before it stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WatchSummary {
    pub runs: u64,
    /// Runs that failed with a retryable error.
    pub failures: u64,
}

/// Run `engine` now and then once per `period` until `shutdown` resolves.
///
/// Runs never overlap: a tick that comes due while a run is in progress is
/// skipped. Shutdown is observed between runs only. A retryable failure is
/// logged and the schedule continues; any other failure stops the loop and
/// is returned.
pub async fn watch<S, R, C, F>(
    engine: &SyncEngine<S, R, C>,
    period: Duration,
    shutdown: F,
) -> Result<WatchSummary>
where
    S: SourceClient,
    R: RecordStore,
    C: CursorStore,
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    let mut summary = WatchSummary::default();
    tracing::info!("Watching for changes every {period:?}");

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!(
                    "Shutdown requested, stopping after {} runs",
                    summary.runs
                );
                return Ok(summary);
            }
            _ = ticker.tick() => {}
        }

        summary.runs += 1;
        match engine.run().await {
            Ok(_) => {}
            Err(e) if e.is_retryable() => {
                summary.failures += 1;
                tracing::warn!("Will retry on the next tick: {e}");
            }
            Err(e) => return Err(e),
        }
    }
}
