//! Static catalog of report categories
//!
//! The catalog is ordered: the first-declared category is the primary one
//! (drawn largest and on top), later ones are drawn beneath it.

use crate::IssueTypeId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Catalog validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("catalog has no categories")]
    Empty,

    #[error("duplicate category id {0}")]
    DuplicateCategory(IssueTypeId),

    #[error("category {category} declares quality tier {value} twice")]
    DuplicateQuality { category: IssueTypeId, value: i32 },

    #[error("snow report category {0} is not in the catalog")]
    UnknownSnowReport(IssueTypeId),
}

/// One quality tier of a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityTier {
    /// Value carried by `Contribution::quality`
    pub value: i32,

    /// Icon color for this tier, overrides the category color
    pub color: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A report category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCategory {
    pub id: IssueTypeId,
    pub name: String,

    /// Base icon color (`#rrggbb`)
    pub color: String,

    /// Icon name
    pub icon: String,

    /// Quality tiers, if the category grades its reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualities: Option<Vec<QualityTier>>,
}

impl IssueCategory {
    /// Tiers of this category, empty when the category is not graded.
    pub fn tiers(&self) -> &[QualityTier] {
        self.qualities.as_deref().unwrap_or(&[])
    }

    pub fn has_tiers(&self) -> bool {
        !self.tiers().is_empty()
    }
}

/// Ordered list of report categories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub categories: Vec<IssueCategory>,

    /// Category whose reports expire after the selected day window
    pub snow_report_type_id: IssueTypeId,
}

impl Catalog {
    /// First-declared category id.
    pub fn primary_id(&self) -> Option<IssueTypeId> {
        self.categories.first().map(|c| c.id)
    }

    pub fn get(&self, id: IssueTypeId) -> Option<&IssueCategory> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = IssueTypeId> + '_ {
        self.categories.iter().map(|c| c.id)
    }

    /// Check ids are unique and the snow report category exists.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.categories.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for category in &self.categories {
            if !seen.insert(category.id) {
                return Err(CatalogError::DuplicateCategory(category.id));
            }

            let mut values = HashSet::new();
            for tier in category.tiers() {
                if !values.insert(tier.value) {
                    return Err(CatalogError::DuplicateQuality {
                        category: category.id,
                        value: tier.value,
                    });
                }
            }
        }

        if !seen.contains(&self.snow_report_type_id) {
            return Err(CatalogError::UnknownSnowReport(self.snow_report_type_id));
        }

        Ok(())
    }
}

impl Default for Catalog {
    /// Built-in categories shipped with the client.
    fn default() -> Self {
        fn tier(value: i32, color: &str, label: &str) -> QualityTier {
            QualityTier {
                value,
                color: color.to_string(),
                label: Some(label.to_string()),
            }
        }

        fn category(id: u32, name: &str, color: &str, icon: &str) -> IssueCategory {
            IssueCategory {
                id: IssueTypeId::new(id),
                name: name.to_string(),
                color: color.to_string(),
                icon: icon.to_string(),
                qualities: None,
            }
        }

        let mut snow = category(1, "Snow conditions", "#367c98", "snowflake");
        snow.qualities = Some(vec![
            tier(0, "#4fae77", "Clear"),
            tier(1, "#f09035", "Partly covered"),
            tier(2, "#e54f4f", "Covered"),
        ]);

        Self {
            categories: vec![
                snow,
                category(2, "Obstacle", "#e54f4f", "triangle-exclamation"),
                category(3, "Ice", "#5fa8d3", "icicles"),
                category(4, "Construction", "#f09035", "person-digging"),
                category(5, "Other", "#666666", "comment"),
            ],
            snow_report_type_id: IssueTypeId::new(1),
        }
    }
}
