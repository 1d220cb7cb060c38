//! Renderable layer descriptors
//!
//! Value objects rebuilt on every derivation pass. The `key` of a group is
//! stable across passes so renderers can diff, but nothing else is.

use crate::{ContributionId, GeoPoint, IssueTypeId, SegmentId, Timestamp};
use serde::{Deserialize, Serialize};

/// A styled group of lines or markers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerDescriptor {
    Lines(LineLayer),
    Markers(MarkerLayer),
}

impl LayerDescriptor {
    pub fn key(&self) -> &str {
        match self {
            LayerDescriptor::Lines(layer) => &layer.key,
            LayerDescriptor::Markers(layer) => &layer.key,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            LayerDescriptor::Lines(layer) => layer.features.len(),
            LayerDescriptor::Markers(layer) => layer.features.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lines sharing one stroke style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineLayer {
    pub key: String,
    pub color: String,
    pub width: f64,
    pub features: Vec<LineFeature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineFeature {
    pub geometry: Vec<GeoPoint>,
    pub data: FeatureData,
}

/// Markers sharing one icon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerLayer {
    pub key: String,
    pub icon_src: String,
    pub scale: f64,
    pub features: Vec<MarkerFeature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerFeature {
    pub coords: GeoPoint,
    pub data: FeatureData,
    pub clickable: bool,
}

/// Entity attributes attached to a drawn feature, shown on click
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeatureData {
    Segment {
        id: SegmentId,
        name: Option<String>,
        updated_at: Timestamp,
    },
    Contribution {
        id: ContributionId,
        issue_type_id: IssueTypeId,
        quality: Option<i32>,
        score: i64,
        replies: u32,
        created_at: Timestamp,
    },
}
