//! Scripted remote source for tests

use crate::error::{SyncError, SyncResult};
use crate::remote::RemoteSource;
use async_trait::async_trait;
use snowmap_types::{Timestamp, UpdateBatch};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

/// Replays queued responses in order.
///
/// When the queue runs dry it answers with an empty batch stamped with the
/// last `from` it saw. [`ScriptedSource::hold_next`] arms a gate that
/// keeps the next fetch pending until the returned `Notify` fires.
#[derive(Default)]
pub struct ScriptedSource {
    responses: Mutex<VecDeque<SyncResult<UpdateBatch>>>,
    requests: Mutex<Vec<Option<Timestamp>>>,
    calls: AtomicUsize,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl ScriptedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn push(&self, batch: UpdateBatch) {
        self.responses.lock().await.push_back(Ok(batch));
    }

    pub async fn push_error(&self, message: &str) {
        self.responses
            .lock()
            .await
            .push_back(Err(SyncError::Unavailable(message.to_string())));
    }

    pub async fn hold_next(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().await = Some(notify.clone());
        notify
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn requests(&self) -> Vec<Option<Timestamp>> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl RemoteSource for ScriptedSource {
    async fn fetch_since(&self, from: Option<Timestamp>) -> SyncResult<UpdateBatch> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(from);

        let gate = self.gate.lock().await.take();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        match self.responses.lock().await.pop_front() {
            Some(response) => response,
            None => Ok(UpdateBatch::empty(from.unwrap_or_else(chrono::Utc::now))),
        }
    }
}
