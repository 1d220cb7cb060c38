//! Segment line layers
//!
//! Segments are bucketed by their two clearance codes into five groups drawn
//! in a fixed order. Later groups draw over earlier ones.

use crate::style::LineStyle;
use snowmap_types::{FeatureData, LineFeature, LineLayer, Segment};
use tracing::trace;

/// Clearance codes meaning work is planned on a side.
const PLANNED_STATES: [i32; 4] = [2, 3, 4, 10];

const SNOWY_STATE: i32 = 0;
const CLEARED_STATE: i32 = 1;
const IN_PROGRESS_STATE: i32 = 5;

/// Rendering bucket of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClearanceBucket {
    Unknown,
    Cleared,
    Snowy,
    Planned,
    InProgress,
}

impl ClearanceBucket {
    /// Draw order, bottom first.
    pub const ORDER: [ClearanceBucket; 5] = [
        ClearanceBucket::Unknown,
        ClearanceBucket::Cleared,
        ClearanceBucket::Snowy,
        ClearanceBucket::Planned,
        ClearanceBucket::InProgress,
    ];

    pub fn color(self) -> &'static str {
        match self {
            ClearanceBucket::Unknown => "#666666",
            ClearanceBucket::Cleared => "#4fae77",
            ClearanceBucket::Snowy => "#367c98",
            ClearanceBucket::Planned => "#f09035",
            ClearanceBucket::InProgress => "#8962c7",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ClearanceBucket::Unknown => "unknown",
            ClearanceBucket::Cleared => "cleared",
            ClearanceBucket::Snowy => "snowy",
            ClearanceBucket::Planned => "planned",
            ClearanceBucket::InProgress => "in_progress",
        }
    }

    fn position(self) -> usize {
        match self {
            ClearanceBucket::Unknown => 0,
            ClearanceBucket::Cleared => 1,
            ClearanceBucket::Snowy => 2,
            ClearanceBucket::Planned => 3,
            ClearanceBucket::InProgress => 4,
        }
    }

    /// Bucket for a pair of side codes, tested in priority order.
    ///
    /// Returns `None` for combinations no bucket models, e.g. one side
    /// unknown and the other cleared.
    pub fn classify(side_one: Option<i32>, side_two: Option<i32>) -> Option<Self> {
        let either = |pred: &dyn Fn(i32) -> bool| {
            side_one.is_some_and(|s| pred(s)) || side_two.is_some_and(|s| pred(s))
        };

        if side_one.is_none() && side_two.is_none() {
            Some(ClearanceBucket::Unknown)
        } else if side_one == Some(CLEARED_STATE) && side_two == Some(CLEARED_STATE) {
            Some(ClearanceBucket::Cleared)
        } else if either(&|s| s == SNOWY_STATE) {
            Some(ClearanceBucket::Snowy)
        } else if either(&|s| PLANNED_STATES.contains(&s)) {
            Some(ClearanceBucket::Planned)
        } else if either(&|s| s == IN_PROGRESS_STATE) {
            Some(ClearanceBucket::InProgress)
        } else {
            None
        }
    }

    pub fn of(segment: &Segment) -> Option<Self> {
        Self::classify(segment.side_one_state, segment.side_two_state)
    }
}

/// Partition segments into the five line groups, in draw order.
///
/// All five groups are always returned, possibly empty. Segments that fit no
/// bucket or have unusable geometry are skipped.
pub fn derive_line_layers<'a, I>(segments: I, style: &LineStyle) -> Vec<LineLayer>
where
    I: IntoIterator<Item = &'a Segment>,
{
    let mut layers: Vec<LineLayer> = ClearanceBucket::ORDER
        .iter()
        .map(|bucket| LineLayer {
            key: format!("line:{}", bucket.name()),
            color: bucket.color().to_string(),
            width: style.width,
            features: Vec::new(),
        })
        .collect();

    for segment in segments {
        if !segment.is_drawable() {
            trace!(segment_id = %segment.id, points = segment.geometry.len(), "Skipping segment with unusable geometry");
            continue;
        }

        let Some(bucket) = ClearanceBucket::of(segment) else {
            trace!(
                segment_id = %segment.id,
                side_one = ?segment.side_one_state,
                side_two = ?segment.side_two_state,
                "Skipping segment with unmodeled clearance state"
            );
            continue;
        };

        layers[bucket.position()].features.push(LineFeature {
            geometry: segment.geometry.clone(),
            data: FeatureData::Segment {
                id: segment.id,
                name: segment.name.clone(),
                updated_at: segment.updated_at,
            },
        });
    }

    layers
}
