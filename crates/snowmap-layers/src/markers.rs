//! Contribution marker layers
//!
//! Every (category, quality tier) pair of the catalog gets its own icon and
//! its own marker group. Groups come out in reverse catalog order so the
//! first-declared categories are drawn last, on top of the others.

use crate::style::{icon_src, PRIMARY_MARKER_SCALE, SECONDARY_MARKER_SCALE};
use snowmap_types::{
    Catalog, Contribution, FeatureData, IssueCategory, IssueTypeId, MarkerFeature, MarkerLayer,
    QualityTier,
};
use std::collections::HashMap;
use tracing::trace;

/// One icon of the expanded catalog
#[derive(Debug, Clone, Copy)]
pub struct IconIdentity<'a> {
    pub category: &'a IssueCategory,
    pub tier: Option<&'a QualityTier>,
}

impl IconIdentity<'_> {
    fn slot(&self) -> (IssueTypeId, Option<i32>) {
        (self.category.id, self.tier.map(|t| t.value))
    }

    pub fn key(&self) -> String {
        match self.tier {
            Some(tier) => format!("marker:{}:{}", self.category.id, tier.value),
            None => format!("marker:{}", self.category.id),
        }
    }

    pub fn color(&self) -> &str {
        self.tier.map_or(&self.category.color, |t| &t.color)
    }
}

/// Expand the catalog into icon identities, in catalog order.
///
/// A graded category yields one identity per tier and none for the
/// category as a whole.
pub fn icon_identities(catalog: &Catalog) -> Vec<IconIdentity<'_>> {
    catalog
        .categories
        .iter()
        .flat_map(|category| {
            let tiers: Vec<_> = if category.has_tiers() {
                category.tiers().iter().map(Some).collect()
            } else {
                vec![None]
            };
            tiers
                .into_iter()
                .map(move |tier| IconIdentity { category, tier })
        })
        .collect()
}

/// Group contributions by icon, bottom group first.
///
/// A contribution lands in the group of its tier when its category is
/// graded, otherwise in its category's group. Contributions without usable
/// coordinates, of an unknown category, or with a quality matching no tier
/// are skipped.
pub fn derive_marker_layers<'a, I>(contributions: I, catalog: &Catalog) -> Vec<MarkerLayer>
where
    I: IntoIterator<Item = &'a Contribution>,
{
    let primary = catalog.primary_id();
    let identities = icon_identities(catalog);

    let slots: HashMap<_, _> = identities
        .iter()
        .enumerate()
        .map(|(index, identity)| (identity.slot(), index))
        .collect();

    let mut layers: Vec<MarkerLayer> = identities
        .iter()
        .map(|identity| MarkerLayer {
            key: identity.key(),
            icon_src: icon_src(&identity.category.icon, identity.color()),
            scale: if Some(identity.category.id) == primary {
                PRIMARY_MARKER_SCALE
            } else {
                SECONDARY_MARKER_SCALE
            },
            features: Vec::new(),
        })
        .collect();

    for contribution in contributions {
        let Some(coords) = contribution.renderable_coords() else {
            trace!(contribution_id = %contribution.id, "Skipping contribution without coordinates");
            continue;
        };

        let Some(category) = catalog.get(contribution.issue_type_id) else {
            trace!(
                contribution_id = %contribution.id,
                issue_type_id = %contribution.issue_type_id,
                "Skipping contribution of unknown category"
            );
            continue;
        };

        let slot = if category.has_tiers() {
            (category.id, contribution.quality)
        } else {
            (category.id, None)
        };

        let Some(&index) = slots.get(&slot) else {
            trace!(
                contribution_id = %contribution.id,
                quality = ?contribution.quality,
                "Skipping contribution with unknown quality tier"
            );
            continue;
        };

        layers[index].features.push(MarkerFeature {
            coords,
            data: FeatureData::Contribution {
                id: contribution.id,
                issue_type_id: contribution.issue_type_id,
                quality: contribution.quality,
                score: contribution.score,
                replies: contribution.replies,
                created_at: contribution.created_at,
            },
            clickable: true,
        });
    }

    layers.reverse();
    layers
}
