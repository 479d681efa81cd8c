//! Explicit chart recipes attached to a law.
//!
//! ```toml
//! [laws.chart_recipe]
//! inputs = []
//! [[laws.chart_recipe.overlays]]
//! type = "priceLine"
//! value = "ratio(0.5)"
//! label = "equilibrium"
//! ```

use serde::{Deserialize, Serialize};

use crate::indicator::levels::{LineStyle, price_at};

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartRecipe {
    /// Anchors the learner must click before the recipe can be drawn.
    pub inputs: Vec<String>,
    pub overlays: Vec<RecipeOverlay>,
}

impl ChartRecipe {
    pub fn needs_guided_input(&self) -> bool {
        !self.inputs.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RecipeOverlay {
    PriceLine {
        #[serde(alias = "price")]
        value: RecipeValue,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
        #[serde(
            default,
            rename = "lineStyle",
            alias = "line_style",
            skip_serializing_if = "Option::is_none"
        )]
        line_style: Option<LineStyle>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    Marker {
        #[serde(alias = "value")]
        price: RecipeValue,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
        #[serde(default, alias = "label", skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    Zone {
        from: RecipeValue,
        to: RecipeValue,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
}

impl RecipeOverlay {
    pub const fn kind(&self) -> &'static str {
        match self {
            RecipeOverlay::PriceLine { .. } => "priceLine",
            RecipeOverlay::Marker { .. } => "marker",
            RecipeOverlay::Zone { .. } => "zone",
        }
    }
}

/// A literal price or a `ratio(x)` expression.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RecipeValue {
    Number(f64),
    Expr(String),
}

impl RecipeValue {
    /// Resolve against a unit's `low`/`high`. `None` when the value is not a
    /// finite number or a well-formed `ratio(x)` over a finite range.
    pub fn resolve(&self, low: f64, high: f64) -> Option<f64> {
        let price = match self {
            RecipeValue::Number(n) => *n,
            RecipeValue::Expr(expr) => {
                if !low.is_finite() || !high.is_finite() {
                    return None;
                }
                price_at(low, high, parse_ratio_expr(expr)?)
            }
        };
        price.is_finite().then_some(price)
    }
}

/// `ratio(0.5)`, `RATIO( -0.236 )` → the inner fraction.
pub fn parse_ratio_expr(expr: &str) -> Option<f64> {
    let s = expr.trim();
    let open = s.find('(')?;
    if !s[..open].trim().eq_ignore_ascii_case("ratio") || !s.ends_with(')') {
        return None;
    }
    let inner = s[open + 1..s.len() - 1].trim();
    let ratio: f64 = inner.parse().ok()?;
    ratio.is_finite().then_some(ratio)
}
