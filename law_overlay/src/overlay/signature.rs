//! Canonical dedup keys for drawn primitives.
//!
//! `kind|scope|values|style|label`, with every price rounded to a fixed number
//! of decimals. Two primitives with equal signatures would render on top of
//! each other.

use crate::plan::{Band, Label, Marker, PriceLine};

/// Scope shared by baseline primitives.
pub const BASELINE_SCOPE: &str = "baseline";
/// Scope shared by recipe primitives across laws.
pub const RECIPE_SCOPE: &str = "recipe";

pub trait Signature {
    fn signature(&self, scope: &str, precision: u32) -> String;
}

/// Round half away from zero; `-0` collapses to `0`.
pub fn round_value(value: f64, precision: u32) -> String {
    let p = precision as usize;
    let factor = 10f64.powi(precision as i32);
    let rounded = (value * factor).round() / factor + 0.0;
    format!("{rounded:.p$}")
}

impl Signature for PriceLine {
    fn signature(&self, scope: &str, precision: u32) -> String {
        format!(
            "line|{scope}|{}|{}/{}/{}|{}",
            round_value(self.price, precision),
            self.line_style.as_str(),
            self.line_width,
            self.color,
            self.label
        )
    }
}

impl Signature for Band {
    fn signature(&self, scope: &str, precision: u32) -> String {
        format!(
            "band|{scope}|{},{}|{}|{}",
            round_value(self.from, precision),
            round_value(self.to, precision),
            self.color,
            self.label
        )
    }
}

impl Signature for Marker {
    fn signature(&self, scope: &str, precision: u32) -> String {
        format!(
            "marker|{scope}|{}@{}|{:?}/{}|{}",
            round_value(self.price, precision),
            self.time,
            self.shape,
            self.color,
            self.text
        )
    }
}

impl Signature for Label {
    fn signature(&self, scope: &str, _precision: u32) -> String {
        format!("label|{scope}|||{}", self.text)
    }
}
