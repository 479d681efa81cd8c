//! Law records and the catalog that holds them.

pub mod catalog;
pub mod recipe;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::law::recipe::{ChartRecipe, RecipeOverlay};

pub use catalog::{LawCatalog, default_catalog, load_catalog_path, load_catalog_str};

/// Shape violations found while normalizing a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("law #{index} has an empty id")]
    EmptyId { index: usize },

    #[error("duplicate law id after normalization: {0}")]
    DuplicateId(String),

    #[error("law {0} has an empty title")]
    EmptyTitle(String),

    #[error("catalog contains no laws")]
    Empty,
}

/// One documented rule, read-only to the pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Law {
    /// `law_<n>`; the number drives the fibGrid parity rule.
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_en: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_recipe: Option<ChartRecipe>,
    /// Free-text provenance of the recipe; scanned by keyword rules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipe_sources: Vec<String>,
}

impl Law {
    /// Minimal law with just an id and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            title_en: None,
            summary: String::new(),
            details: String::new(),
            category: String::new(),
            conditions: Vec::new(),
            chart_recipe: None,
            recipe_sources: Vec::new(),
        }
    }

    /// Integer after the first `_` of the id; missing or non-positive → 1.
    pub fn number(&self) -> u32 {
        self.id
            .split('_')
            .nth(1)
            .and_then(|n| n.trim().parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(1)
    }

    pub fn recipe_overlays(&self) -> &[RecipeOverlay] {
        self.chart_recipe
            .as_ref()
            .map(|r| r.overlays.as_slice())
            .unwrap_or(&[])
    }

    /// Recipe inputs the learner must supply, if any.
    pub fn guided_inputs(&self) -> Option<&[String]> {
        self.chart_recipe
            .as_ref()
            .filter(|r| r.needs_guided_input())
            .map(|r| r.inputs.as_slice())
    }

    /// Text scanned by keyword rules.
    pub fn searchable_text(&self) -> String {
        let mut parts: Vec<&str> = vec![&self.title];
        if let Some(en) = &self.title_en {
            parts.push(en);
        }
        parts.push(&self.summary);
        parts.push(&self.details);
        parts.extend(self.conditions.iter().map(String::as_str));
        parts.extend(self.recipe_sources.iter().map(String::as_str));
        parts.join(" ")
    }
}
