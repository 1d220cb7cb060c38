//! # Snowmap Layers - Filtering and map-layer derivation
//!
//! Pure, synchronous functions that turn a [`Dataset`] snapshot and a
//! [`FilterSelection`] into the ordered list of styled layers handed to the
//! map renderer.
//!
//! ## Key Components
//!
//! - [`filter`]: category-membership filters for segments and contributions
//! - [`lines`]: segment line groups bucketed by clearance state
//! - [`markers`]: contribution marker groups, one per catalog icon
//! - [`LayerDeriver`]: one full pass, filter then derive
//!
//! Nothing here panics on a malformed entity: anything that cannot be
//! classified is left out of the output.

#![deny(unsafe_code)]

pub mod filter;
pub mod lines;
pub mod markers;
pub mod style;

pub use filter::{filter_contributions, filter_segments};
pub use lines::{derive_line_layers, ClearanceBucket};
pub use markers::{derive_marker_layers, icon_identities, IconIdentity};
pub use style::{icon_src, LineStyle};

use snowmap_types::{Catalog, Dataset, FilterSelection, LayerDescriptor, Timestamp};
use tracing::debug;

/// Runs a full derivation pass against a fixed catalog and line style
#[derive(Debug, Clone)]
pub struct LayerDeriver {
    catalog: Catalog,
    line_style: LineStyle,
}

impl LayerDeriver {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            line_style: LineStyle::default(),
        }
    }

    pub fn with_line_style(mut self, line_style: LineStyle) -> Self {
        self.line_style = line_style;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Filter the dataset and derive every layer, bottom layer first.
    ///
    /// Line groups come before marker groups so markers draw over paths.
    pub fn derive(
        &self,
        dataset: &Dataset,
        selection: &FilterSelection,
        now: Timestamp,
    ) -> Vec<LayerDescriptor> {
        let segments = filter_segments(&dataset.segments, selection);
        let contributions =
            filter_contributions(&dataset.contributions, selection, &self.catalog, now);

        debug!(
            segments = segments.len(),
            contributions = contributions.len(),
            "Deriving map layers"
        );

        derive_line_layers(segments, &self.line_style)
            .into_iter()
            .map(LayerDescriptor::Lines)
            .chain(
                derive_marker_layers(contributions, &self.catalog)
                    .into_iter()
                    .map(LayerDescriptor::Markers),
            )
            .collect()
    }
}
