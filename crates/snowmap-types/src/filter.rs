//! User filter selection

use crate::{Catalog, IssueTypeId, SegmentType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which segments and reports the user wants on the map.
///
/// Only mutated through the setters below; the filter engine reads it on
/// every derivation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    segment_types: BTreeSet<SegmentType>,
    contribution_type_ids: BTreeSet<IssueTypeId>,
    from_days: Option<u32>,
}

impl FilterSelection {
    /// Everything visible, no day window.
    pub fn all(catalog: &Catalog) -> Self {
        Self {
            segment_types: SegmentType::ALL.into_iter().collect(),
            contribution_type_ids: catalog.ids().collect(),
            from_days: None,
        }
    }

    pub fn segment_types(&self) -> &BTreeSet<SegmentType> {
        &self.segment_types
    }

    pub fn contribution_type_ids(&self) -> &BTreeSet<IssueTypeId> {
        &self.contribution_type_ids
    }

    pub fn from_days(&self) -> Option<u32> {
        self.from_days
    }

    pub fn shows_segment_type(&self, segment_type: SegmentType) -> bool {
        self.segment_types.contains(&segment_type)
    }

    pub fn shows_contribution_type(&self, id: IssueTypeId) -> bool {
        self.contribution_type_ids.contains(&id)
    }

    pub fn set_segment_type(&mut self, segment_type: SegmentType, visible: bool) {
        if visible {
            self.segment_types.insert(segment_type);
        } else {
            self.segment_types.remove(&segment_type);
        }
    }

    pub fn set_contribution_type(&mut self, id: IssueTypeId, visible: bool) {
        if visible {
            self.contribution_type_ids.insert(id);
        } else {
            self.contribution_type_ids.remove(&id);
        }
    }

    /// Restrict snow reports to the last `days` days, or lift the window with `None`.
    pub fn set_from_days(&mut self, days: Option<u32>) {
        self.from_days = days;
    }

    pub fn with_segment_types(mut self, types: impl IntoIterator<Item = SegmentType>) -> Self {
        self.segment_types = types.into_iter().collect();
        self
    }

    pub fn with_contribution_types(mut self, ids: impl IntoIterator<Item = IssueTypeId>) -> Self {
        self.contribution_type_ids = ids.into_iter().collect();
        self
    }

    pub fn with_from_days(mut self, days: Option<u32>) -> Self {
        self.from_days = days;
        self
    }
}
