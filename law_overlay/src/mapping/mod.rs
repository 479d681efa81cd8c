//! Law-to-feature mapping.
//!
//! Each law gets exactly one [`MappingEntry`], a pure function of its static
//! text and recipe:
//!
//! 1. **direct**: the law carries recipe overlays.
//! 2. **keyword_inferred**: no overlays, but at least one keyword rule matches.
//! 3. **category_heuristic**: nothing matched; the category table picks one
//!    existing feature family. Treated as unknown downstream.
//!
//! Laws absent from a precomputed table resolve to [`MappingEntry::missing`].
//! The mapper only ever selects which existing geometry family to draw; it
//! never produces trigger conditions of its own.

pub mod rules;

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    indicator::highlights::HighlightKey,
    law::{Law, LawCatalog},
    mapping::rules::KeywordRules,
};

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("failed to parse mapping JSON")]
    Json(#[from] serde_json::Error),

    #[error("mapping entry {0} has no features")]
    EmptyFeatures(String),

    #[error("mapping entry {0} is unknown but carries no reason")]
    MissingReason(String),

    #[error("unknown feature tag: {0}")]
    UnknownFeature(String),
}

/// A drawable feature tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Feature {
    Baseline,
    Highlight(HighlightKey),
    FibGrid,
    UnitHL,
    /// Plain 0.5 line; the generic category fallback.
    Equilibrium,
    RecipeOverlay,
    LawSpecific(String),
}

impl Feature {
    /// Features a keyword rule or category may select.
    pub fn is_family(&self) -> bool {
        matches!(
            self,
            Feature::Highlight(_) | Feature::FibGrid | Feature::UnitHL | Feature::Equilibrium
        )
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Baseline => f.write_str("baseline"),
            Feature::Highlight(k) => f.write_str(k.as_str()),
            Feature::FibGrid => f.write_str("fibGrid"),
            Feature::UnitHL => f.write_str("unitHL"),
            Feature::Equilibrium => f.write_str("equilibrium"),
            Feature::RecipeOverlay => f.write_str("recipeOverlay"),
            Feature::LawSpecific(id) => write!(f, "lawSpecific:{id}"),
        }
    }
}

impl FromStr for Feature {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let feature = match s {
            "baseline" => Feature::Baseline,
            "fibGrid" => Feature::FibGrid,
            "unitHL" => Feature::UnitHL,
            "equilibrium" => Feature::Equilibrium,
            "recipeOverlay" => Feature::RecipeOverlay,
            other => {
                if let Some(id) = other.strip_prefix("lawSpecific:") {
                    if id.trim().is_empty() {
                        return Err(MappingError::UnknownFeature(s.to_string()));
                    }
                    Feature::LawSpecific(id.to_string())
                } else {
                    other
                        .parse::<HighlightKey>()
                        .map(Feature::Highlight)
                        .map_err(|_| MappingError::UnknownFeature(s.to_string()))?
                }
            }
        };
        Ok(feature)
    }
}

impl TryFrom<String> for Feature {
    type Error = MappingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Feature> for String {
    fn from(value: Feature) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingMode {
    Direct,
    KeywordInferred,
    CategoryHeuristic,
    Unknown,
}

impl MappingMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MappingMode::Direct => "direct",
            MappingMode::KeywordInferred => "keyword_inferred",
            MappingMode::CategoryHeuristic => "category_heuristic",
            MappingMode::Unknown => "unknown",
        }
    }

    /// Provenance tag only; nothing branches on it.
    pub const fn attempts(&self) -> u8 {
        match self {
            MappingMode::Direct => 1,
            MappingMode::KeywordInferred => 2,
            MappingMode::CategoryHeuristic => 3,
            MappingMode::Unknown => 5,
        }
    }

    /// Best-effort modes: drawn in fallback styling and must explain themselves.
    pub const fn is_unknown(&self) -> bool {
        matches!(self, MappingMode::CategoryHeuristic | MappingMode::Unknown)
    }
}

impl fmt::Display for MappingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub book: String,
    pub indicator: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingEntry {
    pub mode: MappingMode,
    pub features: Vec<Feature>,
    pub reason: String,
    pub attempts: u8,
    #[serde(default)]
    pub source_refs: Vec<SourceRef>,
}

impl MappingEntry {
    /// Entry used when a law has no row in the mapping table.
    pub fn missing() -> Self {
        Self {
            mode: MappingMode::Unknown,
            features: vec![Feature::Baseline],
            reason: "missing mapping entry".to_string(),
            attempts: MappingMode::Unknown.attempts(),
            source_refs: Vec::new(),
        }
    }

    pub fn has(&self, feature: &Feature) -> bool {
        self.features.contains(feature)
    }

    pub fn has_highlight(&self, key: HighlightKey) -> bool {
        self.has(&Feature::Highlight(key))
    }

    pub fn is_unknown(&self) -> bool {
        self.mode.is_unknown()
    }

    fn check(&self, law_id: &str) -> Result<(), MappingError> {
        if self.features.is_empty() {
            return Err(MappingError::EmptyFeatures(law_id.to_string()));
        }
        if self.is_unknown() && self.reason.trim().is_empty() {
            return Err(MappingError::MissingReason(law_id.to_string()));
        }
        Ok(())
    }
}

/// Classify one law against the rule table.
pub fn map_law(law: &Law, rules: &KeywordRules) -> MappingEntry {
    let matched: Vec<_> = rules.matching(&law.searchable_text()).collect();
    let mut matched_features: Vec<Feature> = Vec::new();
    for rule in &matched {
        if !matched_features.contains(&rule.feature) {
            matched_features.push(rule.feature.clone());
        }
    }
    let source_refs: Vec<SourceRef> = matched
        .iter()
        .map(|r| SourceRef {
            book: r.book.clone(),
            indicator: r.indicator.clone(),
        })
        .collect();
    let law_specific = Feature::LawSpecific(law.id.clone());

    if !law.recipe_overlays().is_empty() {
        let mut features = vec![Feature::Baseline];
        features.extend(matched_features);
        features.push(Feature::RecipeOverlay);
        features.push(law_specific);
        return MappingEntry {
            mode: MappingMode::Direct,
            features,
            reason: "direct recipe mapping: explicit chart recipe overlays drawn with baseline and law-specific geometry"
                .to_string(),
            attempts: MappingMode::Direct.attempts(),
            source_refs,
        };
    }

    if !matched_features.is_empty() {
        let names: Vec<String> = matched_features.iter().map(Feature::to_string).collect();
        let mut features = vec![Feature::Baseline];
        features.extend(matched_features);
        features.push(law_specific);
        return MappingEntry {
            mode: MappingMode::KeywordInferred,
            features,
            reason: format!(
                "keyword mapping: law text matched {}; no trigger condition added",
                names.join(", ")
            ),
            attempts: MappingMode::KeywordInferred.attempts(),
            source_refs,
        };
    }

    let feature = rules.category_feature(&law.category).clone();
    let category = if law.category.is_empty() {
        "(none)"
    } else {
        law.category.as_str()
    };
    debug!(law = %law.id, %feature, category, "no keyword match, using category heuristic");
    MappingEntry {
        mode: MappingMode::CategoryHeuristic,
        reason: format!(
            "no deterministic textual trigger found; category {category} selects the {feature} feature family"
        ),
        features: vec![Feature::Baseline, feature, law_specific],
        attempts: MappingMode::CategoryHeuristic.attempts(),
        source_refs: Vec::new(),
    }
}

/// Law id → mapping entry, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingTable {
    entries: IndexMap<String, MappingEntry>,
}

impl MappingTable {
    /// Map every law in `catalog`.
    pub fn build(catalog: &LawCatalog, rules: &KeywordRules) -> Self {
        let entries = catalog
            .iter()
            .map(|law| (law.id.clone(), map_law(law, rules)))
            .collect();
        Self { entries }
    }

    /// Parse a precomputed table and check every entry's shape.
    pub fn from_json_str(json: &str) -> Result<Self, MappingError> {
        let table: MappingTable = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> Result<(), MappingError> {
        self.entries.iter().try_for_each(|(id, e)| e.check(id))
    }

    pub fn get(&self, law_id: &str) -> Option<&MappingEntry> {
        self.entries.get(law_id)
    }

    /// Catalog ids with no entry in this table.
    pub fn missing_ids<'a>(&self, catalog: &'a LawCatalog) -> Vec<&'a str> {
        catalog.ids().filter(|id| !self.entries.contains_key(*id)).collect()
    }

    pub fn insert(&mut self, law_id: impl Into<String>, entry: MappingEntry) {
        self.entries.insert(law_id.into(), entry);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MappingEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json_pretty(&self) -> Result<String, MappingError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
