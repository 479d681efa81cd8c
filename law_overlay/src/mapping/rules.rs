//! Ordered keyword → feature rules and the category fallback table.
//!
//! Rules are data, not code: the bundled table lives in
//! `data/keyword_rules.toml` and can be swapped for another file. Rules are
//! evaluated top to bottom; every rule whose keys appear in a law's text
//! contributes its feature once, in rule order.

use anyhow::{Context, bail};
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use toml::from_str;

use crate::mapping::Feature;

const BUNDLED_RULES: &str = include_str!("../../data/keyword_rules.toml");

static DEFAULT_RULES: OnceCell<KeywordRules> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KeywordRule {
    pub feature: Feature,
    /// Matched case-insensitively as substrings.
    pub keys: Vec<String>,
    /// Indicator toggle this rule corresponds to.
    #[serde(default)]
    pub indicator: String,
    /// Book section the wording comes from.
    #[serde(default)]
    pub book: String,
}

impl KeywordRule {
    /// `haystack` must already be lowercased.
    pub fn matches(&self, haystack: &str) -> bool {
        self.keys.iter().any(|k| haystack.contains(k.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KeywordRules {
    pub rules: Vec<KeywordRule>,
    /// Exact category name → feature used when no rule matches.
    #[serde(default)]
    pub categories: IndexMap<String, Feature>,
    pub category_default: Feature,
}

impl KeywordRules {
    /// Rules whose keys occur in `text`, in table order.
    pub fn matching<'a>(&'a self, text: &str) -> impl Iterator<Item = &'a KeywordRule> + 'a {
        let haystack = text.to_lowercase();
        self.rules.iter().filter(move |r| r.matches(&haystack))
    }

    pub fn category_feature(&self, category: &str) -> &Feature {
        self.categories
            .get(category.trim())
            .unwrap_or(&self.category_default)
    }

    fn normalize(&mut self) -> anyhow::Result<()> {
        if self.rules.is_empty() {
            bail!("keyword rule table cannot be empty");
        }
        for (i, rule) in self.rules.iter_mut().enumerate() {
            if !rule.feature.is_family() {
                bail!("rule #{i} targets {}, which is not a feature family", rule.feature);
            }
            let mut keys = Vec::with_capacity(rule.keys.len());
            for k in std::mem::take(&mut rule.keys) {
                let k = k.trim().to_lowercase();
                if !k.is_empty() && !keys.contains(&k) {
                    keys.push(k);
                }
            }
            if keys.is_empty() {
                bail!("rule #{i} ({}) has no keys", rule.feature);
            }
            rule.keys = keys;
        }
        for (name, feature) in &self.categories {
            if !feature.is_family() {
                bail!("category '{name}' targets {feature}, which is not a feature family");
            }
        }
        if !self.category_default.is_family() {
            bail!("category_default {} is not a feature family", self.category_default);
        }
        Ok(())
    }
}

/// Parse and normalize a rule table from a TOML string.
pub fn load_rules_str(toml_str: &str) -> anyhow::Result<KeywordRules> {
    let mut rules: KeywordRules = from_str(toml_str).context("failed to parse keyword rules TOML")?;
    rules.normalize().context("invalid keyword rules")?;
    Ok(rules)
}

pub fn load_rules_path(path: impl AsRef<std::path::Path>) -> anyhow::Result<KeywordRules> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("read keyword rules {}", path.as_ref().display()))?;
    load_rules_str(&text)
}

/// The bundled rule table, parsed once.
pub fn default_rules() -> anyhow::Result<&'static KeywordRules> {
    DEFAULT_RULES.get_or_try_init(|| load_rules_str(BUNDLED_RULES).context("bundled keyword rules are invalid"))
}
