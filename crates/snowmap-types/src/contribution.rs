//! User contributions (point reports)

use crate::{ContributionId, GeoPoint, Identified, IssueTypeId, Timestamp};
use serde::{Deserialize, Serialize};

/// A user-submitted point report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    /// Stable identifier
    pub id: ContributionId,

    /// Report category, see [`Catalog`](crate::Catalog)
    pub issue_type_id: IssueTypeId,

    /// Quality tier, meaningful only for categories that define tiers
    #[serde(default)]
    pub quality: Option<i32>,

    /// Location of the report. Reports without one stay in the dataset
    /// but are never rendered.
    #[serde(default)]
    pub coords: Option<GeoPoint>,

    /// Free-text comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Author display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Net votes
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub score: i64,

    /// Number of replies
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub replies: u32,

    /// Creation timestamp
    pub created_at: Timestamp,

    /// Last update timestamp
    pub updated_at: Timestamp,

    /// Tombstone set by the remote when the report was removed
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub deleted: bool,
}

impl Contribution {
    /// Coordinates usable for rendering, if any.
    pub fn renderable_coords(&self) -> Option<GeoPoint> {
        self.coords.filter(GeoPoint::is_valid)
    }
}

impl Identified for Contribution {
    type Id = ContributionId;

    fn id(&self) -> ContributionId {
        self.id
    }
}
