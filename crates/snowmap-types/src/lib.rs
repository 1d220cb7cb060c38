//! Snowmap Types - Core types for the winter bike-path map
//!
//! The client keeps a local copy of the remote path network and the
//! user reports attached to it, and turns that copy into styled map layers.
//!
//! ## Key Concepts
//!
//! - **Segment**: a path section with a two-sided snow-clearance state
//! - **Contribution**: a user point report with a category and an optional quality tier
//! - **Dataset**: the reconciler-owned collection of segments and contributions
//! - **FilterSelection**: which segment types and report categories the user wants to see
//! - **Catalog**: the static, ordered list of report categories
//! - **LayerDescriptor**: a styled, renderable group of lines or markers

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod catalog;
pub mod contribution;
pub mod dataset;
mod de;
pub mod filter;
pub mod geo;
pub mod ids;
pub mod layer;
pub mod segment;

pub use catalog::{Catalog, CatalogError, IssueCategory, QualityTier};
pub use contribution::Contribution;
pub use dataset::{Dataset, Identified, UpdateBatch};
pub use filter::FilterSelection;
pub use geo::GeoPoint;
pub use ids::{ContributionId, IssueTypeId, SegmentId};
pub use layer::{FeatureData, LayerDescriptor, LineFeature, LineLayer, MarkerFeature, MarkerLayer};
pub use segment::{Segment, SegmentType};

/// Instant attached to every entity and to the sync cursor.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
