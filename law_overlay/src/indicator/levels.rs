//! Ratio levels between a unit's low and high.

use serde::{Deserialize, Serialize};

/// Ratios drawn on the last unit when no config overrides them.
pub const DEFAULT_LEVELS: [f64; 11] = [
    0.0, 0.236, 0.382, 0.5, 0.618, 0.764, 1.0, 1.236, 1.382, -0.236, -0.382,
];

/// Ratios drawn on the higher-timeframe unit.
pub const HTF_LEVELS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.764, 1.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
}

impl LineStyle {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LineStyle::Solid => "solid",
            LineStyle::Dashed => "dashed",
            LineStyle::Dotted => "dotted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub ratio: f64,
    pub price: f64,
    pub line_style: LineStyle,
    pub line_width: u8,
}

/// Visual weight of a ratio. Exact comparisons, first match wins:
/// boundaries (0, 1) are solid and bold, ±0.236 / ±0.764 dashed and bold,
/// everything else dotted and thin.
pub fn style_for_ratio(ratio: f64) -> (LineStyle, u8) {
    if ratio == 0.0 || ratio == 1.0 {
        (LineStyle::Solid, 2)
    } else if ratio.abs() == 0.236 || ratio.abs() == 0.764 {
        (LineStyle::Dashed, 2)
    } else {
        (LineStyle::Dotted, 1)
    }
}

/// Price at `ratio` of the way from `low` to `high`.
pub fn price_at(low: f64, high: f64, ratio: f64) -> f64 {
    low + (high - low) * ratio
}

/// One [`Level`] per ratio, in input order.
///
/// Returns an empty list unless `high - low` is positive and finite.
pub fn compute_levels(low: f64, high: f64, ratios: &[f64]) -> Vec<Level> {
    let diff = high - low;
    if !diff.is_finite() || diff <= 0.0 {
        return Vec::new();
    }
    ratios
        .iter()
        .map(|&ratio| {
            let (line_style, line_width) = style_for_ratio(ratio);
            Level {
                ratio,
                price: low + diff * ratio,
                line_style,
                line_width,
            }
        })
        .collect()
}
