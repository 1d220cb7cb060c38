//! Sync reconciler
//!
//! Owns the dataset. Consumers only ever see `Arc<Dataset>` snapshots; the
//! reconciler swaps in a new snapshot (copy-on-write) after each merge.

use crate::error::{SyncError, SyncResult};
use crate::events::{RefreshOutcome, SyncEvent, SyncFailure, SyncPhase};
use crate::merge::merge_batch;
use crate::remote::RemoteSource;
use snowmap_types::Dataset;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, instrument};

const UNINITIALIZED: u8 = 0;
const INITIALIZING: u8 = 1;
const READY: u8 = 2;

/// Keeps the local dataset in step with a [`RemoteSource`]
pub struct SyncReconciler {
    source: Arc<dyn RemoteSource>,
    dataset: watch::Sender<Arc<Dataset>>,
    errors: watch::Sender<Option<SyncFailure>>,
    event_tx: broadcast::Sender<SyncEvent>,
    phase: AtomicU8,
    in_flight: AtomicBool,
    closed: AtomicBool,
    consecutive_failures: AtomicU32,
}

/// Clears the in-flight flag when a refresh ends, including when its
/// future is dropped mid-fetch.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SyncReconciler {
    /// Create a reconciler holding an empty dataset
    pub fn new(source: Arc<dyn RemoteSource>) -> Arc<Self> {
        let (dataset, _) = watch::channel(Arc::new(Dataset::empty()));
        let (errors, _) = watch::channel(None);
        let (event_tx, _) = broadcast::channel(256);

        Arc::new(Self {
            source,
            dataset,
            errors,
            event_tx,
            phase: AtomicU8::new(UNINITIALIZED),
            in_flight: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            consecutive_failures: AtomicU32::new(0),
        })
    }

    /// Current dataset snapshot
    pub fn snapshot(&self) -> Arc<Dataset> {
        self.dataset.borrow().clone()
    }

    /// Watch dataset snapshots as they are replaced
    pub fn subscribe(&self) -> watch::Receiver<Arc<Dataset>> {
        self.dataset.subscribe()
    }

    /// Watch the error slot
    pub fn errors(&self) -> watch::Receiver<Option<SyncFailure>> {
        self.errors.subscribe()
    }

    /// Last recorded fetch failure, cleared by the next success
    pub fn last_error(&self) -> Option<SyncFailure> {
        self.errors.borrow().clone()
    }

    /// Subscribe to sync events
    pub fn events(&self) -> broadcast::Receiver<SyncEvent> {
        self.event_tx.subscribe()
    }

    pub fn is_initialized(&self) -> bool {
        self.phase.load(Ordering::Acquire) == READY
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Acquire)
    }

    /// Full fetch replacing the dataset wholesale.
    ///
    /// Succeeds at most once per reconciler. A failed attempt leaves the
    /// dataset empty and may be retried.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> SyncResult<()> {
        if self.is_closed() {
            return Err(SyncError::Closed);
        }

        if self
            .phase
            .compare_exchange(UNINITIALIZED, INITIALIZING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SyncError::AlreadyInitialized);
        }

        let batch = match self.source.fetch_since(None).await {
            Ok(batch) => batch,
            Err(e) => {
                self.phase.store(UNINITIALIZED, Ordering::Release);
                self.record_failure(SyncPhase::Initialize, &e);
                return Err(e);
            }
        };

        let segments = batch.segments.len();
        let contributions = batch.contributions.len();
        let as_of = batch.as_of;

        let applied = self.dataset.send_if_modified(|current| {
            if self.closed.load(Ordering::Acquire) {
                return false;
            }
            *current = Arc::new(Dataset::from(batch));
            true
        });

        if !applied {
            self.phase.store(UNINITIALIZED, Ordering::Release);
            debug!("Initial fetch finished after close, discarded");
            return Err(SyncError::Closed);
        }

        self.phase.store(READY, Ordering::Release);
        self.record_success();

        info!(segments, contributions, as_of = %as_of, "Dataset initialized");
        self.emit(SyncEvent::Initialized {
            segments,
            contributions,
            as_of,
        });

        Ok(())
    }

    /// Incremental fetch from the current cursor, upserted into the dataset.
    ///
    /// Returns [`RefreshOutcome::Skipped`] without touching the remote when
    /// another refresh is still in flight.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> SyncResult<RefreshOutcome> {
        if self.is_closed() {
            return Err(SyncError::Closed);
        }
        if !self.is_initialized() {
            return Err(SyncError::NotInitialized);
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Refresh already in flight, skipping");
            self.emit(SyncEvent::RefreshSkipped);
            return Ok(RefreshOutcome::Skipped);
        }
        let _in_flight = InFlight(&self.in_flight);

        let from = self.dataset.borrow().as_of;

        let batch = match self.source.fetch_since(from).await {
            Ok(batch) => batch,
            Err(e) => {
                self.record_failure(SyncPhase::Refresh, &e);
                return Err(e);
            }
        };

        let as_of = batch.as_of;
        let mut stats = None;
        self.dataset.send_if_modified(|current| {
            if self.closed.load(Ordering::Acquire) {
                return false;
            }
            stats = Some(merge_batch(Arc::make_mut(current), batch));
            true
        });

        let Some(stats) = stats else {
            debug!("Refresh finished after close, discarded");
            return Ok(RefreshOutcome::Discarded);
        };

        self.record_success();

        if stats.is_noop() {
            debug!(as_of = %as_of, "Refresh brought no changes");
        } else {
            info!(
                segments_updated = stats.segments.updated,
                segments_added = stats.segments.added,
                contributions_updated = stats.contributions.updated,
                contributions_added = stats.contributions.added,
                as_of = %as_of,
                "Dataset refreshed"
            );
        }
        self.emit(SyncEvent::Refreshed { stats, as_of });

        Ok(RefreshOutcome::Applied(stats))
    }

    /// Stop accepting results. A fetch still in flight completes but its
    /// batch is dropped.
    pub fn close(&self) {
        let mut was_open = false;
        // Flipped under the dataset lock so no merge can land afterwards.
        self.dataset.send_if_modified(|_| {
            was_open = !self.closed.swap(true, Ordering::AcqRel);
            false
        });

        if was_open {
            info!("Reconciler closed");
            self.emit(SyncEvent::Closed);
        }
    }

    fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::Release);
        self.errors.send_if_modified(|slot| slot.take().is_some());
    }

    fn record_failure(&self, phase: SyncPhase, e: &SyncError) {
        let consecutive = self.consecutive_failures.fetch_add(1, Ordering::AcqRel) + 1;
        error!(phase = ?phase, error = %e, consecutive, "Sync fetch failed");

        let failure = SyncFailure {
            phase,
            message: e.to_string(),
            at: chrono::Utc::now(),
            consecutive,
        };
        self.errors.send_replace(Some(failure.clone()));
        self.emit(SyncEvent::Failed(failure));
    }

    fn emit(&self, event: SyncEvent) {
        let _ = self.event_tx.send(event);
    }
}
