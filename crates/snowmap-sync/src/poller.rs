//! Periodic refresh loop

use crate::config::SyncConfig;
use crate::reconciler::SyncReconciler;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Handle on the background refresh timer.
///
/// Dropping the handle aborts the timer; [`Poller::shutdown`] stops it and
/// waits for the loop to exit. Neither cancels a refresh already in flight.
pub struct Poller {
    shutdown_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Start refreshing on a fixed period. The first tick fires one period
    /// after the call, so the caller is expected to have initialized the
    /// reconciler already.
    pub fn spawn(reconciler: Arc<SyncReconciler>, config: &SyncConfig) -> Self {
        let period = config.poll_interval();
        let backoff = Backoff::new(config.max_backoff_ticks());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(run(reconciler, period, backoff, shutdown_rx));

        Self {
            shutdown_tx,
            handle: Some(handle),
        }
    }

    /// Stop the timer and wait for the loop to exit
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn run(
    reconciler: Arc<SyncReconciler>,
    period: Duration,
    mut backoff: Backoff,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(period_secs = period.as_secs(), "Polling started");

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => break,
            _ = ticker.tick() => {
                if reconciler.is_closed() {
                    break;
                }

                if backoff.should_skip(reconciler.consecutive_failures()) {
                    debug!(failures = reconciler.consecutive_failures(), "Backing off, skipping tick");
                    continue;
                }

                // Runs detached so a slow fetch never delays the timer; the
                // reconciler's in-flight flag turns overlapping ticks into skips.
                let reconciler = reconciler.clone();
                tokio::spawn(async move {
                    match reconciler.refresh().await {
                        Ok(_) => {}
                        // already recorded and logged by the reconciler
                        Err(e) if e.is_transient() => {}
                        Err(e) => warn!(error = %e, "Refresh rejected"),
                    }
                });
            }
        }
    }

    info!("Polling stopped");
}

/// Skips ticks after consecutive failures: 0, 1, 3, 7, ... ticks, capped.
#[derive(Debug)]
struct Backoff {
    max_ticks: u32,
    seen_failures: u32,
    remaining: u32,
}

impl Backoff {
    fn new(max_ticks: u32) -> Self {
        Self {
            max_ticks,
            seen_failures: 0,
            remaining: 0,
        }
    }

    fn should_skip(&mut self, failures: u32) -> bool {
        if self.max_ticks == 0 || failures == 0 {
            self.seen_failures = failures;
            self.remaining = 0;
            return false;
        }

        if failures != self.seen_failures {
            self.seen_failures = failures;
            let ticks = 1u32
                .checked_shl(failures - 1)
                .map_or(u32::MAX, |n| n - 1);
            self.remaining = ticks.min(self.max_ticks);
        }

        if self.remaining > 0 {
            self.remaining -= 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::SyncEvent;
    use crate::testing::ScriptedSource;
    use snowmap_types::UpdateBatch;

    fn config(backoff_max_secs: u64) -> SyncConfig {
        SyncConfig {
            poll_interval_secs: 15,
            backoff_max_secs,
            ..Default::default()
        }
    }

    async fn initialized(source: &Arc<ScriptedSource>) -> Arc<SyncReconciler> {
        source.push(UpdateBatch::empty(chrono::Utc::now())).await;
        let reconciler = SyncReconciler::new(source.clone());
        reconciler.initialize().await.unwrap();
        reconciler
    }

    #[test]
    fn test_backoff_disabled() {
        let mut backoff = Backoff::new(0);
        assert!(!backoff.should_skip(5));
        assert!(!backoff.should_skip(6));
    }

    #[test]
    fn test_backoff_grows_and_resets() {
        let mut backoff = Backoff::new(4);

        // first failure: retry on the very next tick
        assert!(!backoff.should_skip(1));

        // second failure: skip one tick
        assert!(backoff.should_skip(2));
        assert!(!backoff.should_skip(2));

        // third failure: skip three ticks
        assert!(backoff.should_skip(3));
        assert!(backoff.should_skip(3));
        assert!(backoff.should_skip(3));
        assert!(!backoff.should_skip(3));

        // capped
        for _ in 0..4 {
            assert!(backoff.should_skip(9));
        }
        assert!(!backoff.should_skip(9));

        assert!(!backoff.should_skip(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refreshes_every_period() {
        let source = ScriptedSource::new();
        let reconciler = initialized(&source).await;

        let poller = Poller::spawn(reconciler.clone(), &config(0));
        tokio::time::sleep(Duration::from_secs(46)).await;

        // initialize + ticks at 15s, 30s, 45s
        assert_eq!(source.calls(), 4);

        poller.shutdown().await;
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_refresh_never_overlaps() {
        let source = ScriptedSource::new();
        let reconciler = initialized(&source).await;
        let mut events = reconciler.events();
        let gate = source.hold_next().await;

        let poller = Poller::spawn(reconciler.clone(), &config(0));
        tokio::time::sleep(Duration::from_secs(61)).await;

        // first tick is stuck on the gate, the next three are skipped
        assert_eq!(source.calls(), 2);
        assert!(reconciler.is_refreshing());

        let mut skipped = 0;
        while let Ok(event) = events.try_recv() {
            if event == SyncEvent::RefreshSkipped {
                skipped += 1;
            }
        }
        assert_eq!(skipped, 3);

        gate.notify_one();
        tokio::time::sleep(Duration::from_secs(15)).await;
        assert!(!reconciler.is_refreshing());
        assert_eq!(source.calls(), 3);

        poller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_reconciler_closed() {
        let source = ScriptedSource::new();
        let reconciler = initialized(&source).await;

        let poller = Poller::spawn(reconciler.clone(), &config(0));
        reconciler.close();
        tokio::time::sleep(Duration::from_secs(31)).await;

        assert_eq!(source.calls(), 1);
        poller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_skips_ticks_after_failures() {
        let source = ScriptedSource::new();
        let reconciler = initialized(&source).await;
        source.push_error("down").await;
        source.push_error("down").await;

        let poller = Poller::spawn(reconciler.clone(), &config(60));

        // 15s: fails (1). 30s: fails (2). 45s: skipped. 60s: succeeds.
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(source.calls(), 4);
        assert_eq!(reconciler.consecutive_failures(), 0);

        poller.shutdown().await;
    }
}
