//! The synchronized dataset and the batches that feed it

use crate::{Contribution, Segment, Timestamp};
use serde::{Deserialize, Serialize};
use std::hash::Hash;

/// An entity with a stable identity used by the upsert merge.
pub trait Identified {
    type Id: Copy + Eq + Hash + std::fmt::Debug;

    fn id(&self) -> Self::Id;
}

/// Local copy of the remote segments and contributions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// Path segments in arrival order
    pub segments: Vec<Segment>,

    /// Contributions in arrival order
    pub contributions: Vec<Contribution>,

    /// Cursor for the next incremental fetch; `None` until the first fetch
    pub as_of: Option<Timestamp>,
}

impl Dataset {
    /// An empty dataset, as held before the first successful fetch.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the dataset has received a first full fetch.
    pub fn is_loaded(&self) -> bool {
        self.as_of.is_some()
    }
}

impl From<UpdateBatch> for Dataset {
    fn from(batch: UpdateBatch) -> Self {
        Self {
            segments: batch.segments,
            contributions: batch.contributions,
            as_of: Some(batch.as_of),
        }
    }
}

/// One response from the remote source, with its cursor resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBatch {
    pub segments: Vec<Segment>,
    pub contributions: Vec<Contribution>,
    pub as_of: Timestamp,
}

impl UpdateBatch {
    pub fn empty(as_of: Timestamp) -> Self {
        Self {
            segments: Vec::new(),
            contributions: Vec::new(),
            as_of,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.contributions.is_empty()
    }
}
