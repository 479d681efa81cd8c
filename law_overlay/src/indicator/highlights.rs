//! Structural flags from two adjacent units.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::indicator::units::Unit;

/// Body-to-previous-range ratio below which a unit counts as weak.
pub const WEAK_BODY_RATIO: f64 = 0.236;

/// Range fraction used by the "short" comparisons.
pub const SHORT_RANGE_FACTOR: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HighlightKey {
    PrevBreakHL,
    InsideHL,
    InsideShortHL,
    BothSidesBreak,
    Weak123,
    BackInsideShort,
}

impl HighlightKey {
    /// Fixed output order of [`classify`].
    pub const ALL: [HighlightKey; 6] = [
        HighlightKey::PrevBreakHL,
        HighlightKey::InsideHL,
        HighlightKey::InsideShortHL,
        HighlightKey::BothSidesBreak,
        HighlightKey::Weak123,
        HighlightKey::BackInsideShort,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            HighlightKey::PrevBreakHL => "PrevBreakHL",
            HighlightKey::InsideHL => "InsideHL",
            HighlightKey::InsideShortHL => "InsideShortHL",
            HighlightKey::BothSidesBreak => "BothSidesBreak",
            HighlightKey::Weak123 => "Weak123",
            HighlightKey::BackInsideShort => "BackInsideShort",
        }
    }
}

impl fmt::Display for HighlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HighlightKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HighlightKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown highlight key: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Highlight {
    pub key: HighlightKey,
    pub enabled: bool,
}

/// Every condition computed for one (previous, current) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitComparison {
    pub break_high: bool,
    pub break_low: bool,
    pub inside: bool,
    pub inside_short: bool,
    pub both_sides_break: bool,
    pub weak123: bool,
    pub back_inside_short: bool,
}

impl UnitComparison {
    pub fn compute(prev: &Unit, current: &Unit) -> Self {
        let break_high = current.high > prev.high;
        let break_low = current.low < prev.low;
        let inside = current.high <= prev.high && current.low >= prev.low;
        let prev_usable = prev.range > 0.0;

        Self {
            break_high,
            break_low,
            inside,
            inside_short: inside && current.range < prev.range * SHORT_RANGE_FACTOR,
            both_sides_break: break_high && break_low,
            weak123: prev_usable
                && (current.close - current.open).abs() / prev.range < WEAK_BODY_RATIO,
            back_inside_short: prev_usable
                && prev.range < current.range * SHORT_RANGE_FACTOR
                && current.high >= prev.high
                && current.low <= prev.low,
        }
    }

    pub fn is_enabled(&self, key: HighlightKey) -> bool {
        match key {
            HighlightKey::PrevBreakHL => self.break_high || self.break_low,
            HighlightKey::InsideHL => self.inside,
            HighlightKey::InsideShortHL => self.inside_short,
            HighlightKey::BothSidesBreak => self.both_sides_break,
            HighlightKey::Weak123 => self.weak123,
            HighlightKey::BackInsideShort => self.back_inside_short,
        }
    }

    pub fn highlights(&self) -> Vec<Highlight> {
        HighlightKey::ALL
            .into_iter()
            .map(|key| Highlight {
                key,
                enabled: self.is_enabled(key),
            })
            .collect()
    }
}

/// Flags for `(prev, current)` in [`HighlightKey::ALL`] order; empty when either is absent.
pub fn classify(prev: Option<&Unit>, current: Option<&Unit>) -> Vec<Highlight> {
    match (prev, current) {
        (Some(p), Some(c)) => UnitComparison::compute(p, c).highlights(),
        _ => Vec::new(),
    }
}
