//! Upsert merge of incremental updates
//!
//! For each incoming entity: replace the existing entity with the same id in
//! place, or append it. Nothing is ever removed, so applying the same batch
//! twice gives the same result as applying it once.

use serde::Serialize;
use snowmap_types::{Dataset, Identified, UpdateBatch};
use std::collections::HashMap;

/// Counts for one collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpsertCount {
    pub updated: usize,
    pub added: usize,
}

/// Counts for one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub segments: UpsertCount,
    pub contributions: UpsertCount,
}

impl MergeStats {
    pub fn is_noop(&self) -> bool {
        self.segments == UpsertCount::default() && self.contributions == UpsertCount::default()
    }
}

/// Replace-by-id-or-append.
///
/// Positions come from an id index built once per call, which gives the
/// same result as scanning the collection for every incoming entity. When
/// the batch repeats an id, the later entity wins at the earlier one's slot.
pub fn upsert_by_id<T: Identified>(existing: &mut Vec<T>, incoming: Vec<T>) -> UpsertCount {
    let mut index: HashMap<T::Id, usize> = HashMap::with_capacity(existing.len() + incoming.len());
    for (position, entity) in existing.iter().enumerate() {
        index.entry(entity.id()).or_insert(position);
    }

    let mut count = UpsertCount::default();
    for entity in incoming {
        match index.get(&entity.id()) {
            Some(&position) => {
                existing[position] = entity;
                count.updated += 1;
            }
            None => {
                index.insert(entity.id(), existing.len());
                existing.push(entity);
                count.added += 1;
            }
        }
    }

    count
}

/// Merge a batch into the dataset and advance its cursor.
pub fn merge_batch(dataset: &mut Dataset, batch: UpdateBatch) -> MergeStats {
    let stats = MergeStats {
        segments: upsert_by_id(&mut dataset.segments, batch.segments),
        contributions: upsert_by_id(&mut dataset.contributions, batch.contributions),
    };
    dataset.as_of = Some(batch.as_of);
    stats
}
