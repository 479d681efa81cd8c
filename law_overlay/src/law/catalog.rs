//! Law catalog: parsing, normalization, and loading.
//!
//! The catalog is a TOML document with one `[[laws]]` table per law. The
//! bundled catalog is embedded at compile time; an alternate file can be
//! loaded with [`load_catalog_path`].
//!
//! Normalization trims ids, titles and categories, drops blank conditions and
//! recipe inputs, and de-duplicates conditions while preserving order. Empty
//! or duplicate ids are errors.

use std::collections::HashSet;

use anyhow::Context;
use indexmap::IndexMap;
use serde::Deserialize;
use toml::from_str;
use tracing::debug;

use crate::law::{CatalogError, Law};

const BUNDLED_CATALOG: &str = include_str!("../../data/laws.toml");

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCatalog {
    laws: Vec<Law>,
}

/// Normalized laws keyed by id, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LawCatalog {
    laws: IndexMap<String, Law>,
}

/// Summary of changes performed during normalization.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct NormalizationReport {
    pub ids_trimmed: usize,
    pub blank_conditions_dropped: usize,
    pub conditions_deduped: usize,
    pub blank_inputs_dropped: usize,
}

impl LawCatalog {
    /// Build from already-parsed laws, normalizing each.
    pub fn from_laws(laws: Vec<Law>) -> Result<(Self, NormalizationReport), CatalogError> {
        if laws.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut report = NormalizationReport::default();
        let mut out: IndexMap<String, Law> = IndexMap::with_capacity(laws.len());

        for (index, mut law) in laws.into_iter().enumerate() {
            let id = law.id.trim().to_string();
            if id.is_empty() {
                return Err(CatalogError::EmptyId { index });
            }
            if id != law.id {
                report.ids_trimmed += 1;
            }
            if out.contains_key(&id) {
                return Err(CatalogError::DuplicateId(id));
            }
            law.id = id;

            law.title = law.title.trim().to_string();
            if law.title.is_empty() {
                return Err(CatalogError::EmptyTitle(law.id));
            }
            law.category = law.category.trim().to_string();

            let before = law.conditions.len();
            let mut seen = HashSet::new();
            let mut conditions = Vec::with_capacity(before);
            for c in std::mem::take(&mut law.conditions) {
                let c = c.trim().to_string();
                if c.is_empty() {
                    report.blank_conditions_dropped += 1;
                } else if seen.insert(c.clone()) {
                    conditions.push(c);
                } else {
                    report.conditions_deduped += 1;
                }
            }
            law.conditions = conditions;

            if let Some(recipe) = law.chart_recipe.as_mut() {
                let before = recipe.inputs.len();
                recipe.inputs.retain(|i| !i.trim().is_empty());
                report.blank_inputs_dropped += before - recipe.inputs.len();
            }

            out.insert(law.id.clone(), law);
        }

        Ok((Self { laws: out }, report))
    }

    pub fn get(&self, id: &str) -> Option<&Law> {
        self.laws.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.laws.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Law> {
        self.laws.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.laws.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.laws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.laws.is_empty()
    }
}

/// Parse and normalize a catalog from a TOML string.
pub fn load_catalog_str(toml_str: &str) -> anyhow::Result<LawCatalog> {
    let raw: RawCatalog = from_str(toml_str).context("failed to parse law catalog TOML")?;
    let (catalog, report) = LawCatalog::from_laws(raw.laws).context("normalize law catalog failed")?;
    debug!(laws = catalog.len(), ?report, "loaded law catalog");
    Ok(catalog)
}

/// Read a catalog TOML file from disk, parse, and normalize it.
pub fn load_catalog_path(path: impl AsRef<std::path::Path>) -> anyhow::Result<LawCatalog> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("read law catalog {}", path.as_ref().display()))?;
    load_catalog_str(&text)
}

/// The catalog shipped with the crate.
pub fn default_catalog() -> anyhow::Result<LawCatalog> {
    load_catalog_str(BUNDLED_CATALOG).context("bundled law catalog is invalid")
}
