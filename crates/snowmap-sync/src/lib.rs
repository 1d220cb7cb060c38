//! # Snowmap Sync - Incremental synchronization of winter path data
//!
//! Keeps a local [`Dataset`](snowmap_types::Dataset) consistent with a
//! periodically polled remote source.
//!
//! ## Key Components
//!
//! - [`RemoteSource`]: the remote seam, [`HttpRemoteSource`] speaks `GET /update`
//! - [`SyncReconciler`]: owns the dataset, `initialize` then `refresh`
//! - [`merge`]: replace-by-id-or-append, idempotent, never deletes
//! - [`Poller`]: fixed-period refresh timer, cancelable
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use snowmap_sync::{HttpRemoteSource, Poller, SyncConfig, SyncReconciler};
//!
//! # async fn example() -> snowmap_sync::SyncResult<()> {
//! let config = SyncConfig::default();
//! let source = HttpRemoteSource::new(&config.endpoint, config.request_timeout())?;
//! let reconciler = SyncReconciler::new(Arc::new(source));
//!
//! reconciler.initialize().await?;
//! let poller = Poller::spawn(reconciler.clone(), &config);
//!
//! let dataset = reconciler.snapshot();
//! println!("{} segments", dataset.segments.len());
//!
//! reconciler.close();
//! poller.shutdown().await;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod events;
pub mod merge;
pub mod poller;
pub mod reconciler;
pub mod remote;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use events::{RefreshOutcome, SyncEvent, SyncFailure, SyncPhase};
pub use merge::{merge_batch, upsert_by_id, MergeStats, UpsertCount};
pub use poller::Poller;
pub use reconciler::SyncReconciler;
pub use remote::{HttpRemoteSource, RemoteSource};
