//! Path segments and their winter-maintenance classification
//!
//! A segment carries two independent classification axes:
//!
//! - the maintenance flags (`winter`, `winter_protected`), which say how the
//!   city commits to maintain the path and drive the segment-type filter;
//! - the per-side clearance codes (`side_one_state`, `side_two_state`), which
//!   report the current plowing state and drive line styling.

use crate::{Identified, SegmentId, Timestamp};
use serde::{Deserialize, Serialize};

/// A path section with a two-sided snow-clearance state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    /// Stable identifier
    pub id: SegmentId,

    /// Ordered polyline, at least two points when well-formed
    pub geometry: Vec<crate::GeoPoint>,

    /// Clearance code of the first side (`None` when unknown)
    #[serde(default)]
    pub side_one_state: Option<i32>,

    /// Clearance code of the second side (`None` when unknown)
    #[serde(default)]
    pub side_two_state: Option<i32>,

    /// Path is part of the winter network
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub winter: bool,

    /// Path is part of the protected winter network
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub winter_protected: bool,

    /// Street or path name, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Length in meters, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,

    /// Last update on the remote
    pub updated_at: Timestamp,

    /// Tombstone set by the remote when the segment was retired
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub deleted: bool,
}

/// Winter-maintenance category a segment belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentType {
    /// Protected winter network
    WinterProtected,
    /// Plowed, not protected
    Winter,
    /// Not maintained in winter
    Uncleared,
}

impl SegmentType {
    pub const ALL: [SegmentType; 3] = [
        SegmentType::WinterProtected,
        SegmentType::Winter,
        SegmentType::Uncleared,
    ];
}

impl Segment {
    /// Maintenance category derived from the `winter`/`winter_protected` flags.
    ///
    /// The protected flag wins: a protected path is never reported as plain
    /// `Winter`, whatever its `winter` flag says.
    pub fn segment_type(&self) -> SegmentType {
        if self.winter_protected {
            SegmentType::WinterProtected
        } else if self.winter {
            SegmentType::Winter
        } else {
            SegmentType::Uncleared
        }
    }

    /// A segment needs at least two valid points to be drawn.
    pub fn is_drawable(&self) -> bool {
        self.geometry.len() >= 2 && self.geometry.iter().all(|p| p.is_valid())
    }
}

impl Identified for Segment {
    type Id = SegmentId;

    fn id(&self) -> SegmentId {
        self.id
    }
}
