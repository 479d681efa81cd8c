//! Indicator model: units, ratio levels and highlights for a bar series.

pub mod highlights;
pub mod levels;
pub mod units;

use ohlc_bars::Bar;
use serde::Serialize;

use crate::{
    config::OverlayConfig,
    indicator::{
        highlights::{Highlight, UnitComparison},
        levels::{Level, compute_levels},
        units::{Unit, segment},
    },
};

/// Everything the baseline geometry is drawn from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorModel {
    pub units: Vec<Unit>,
    pub last_unit: Option<Unit>,
    pub prev_unit: Option<Unit>,
    /// Levels on the last unit.
    pub fib: Vec<Level>,
    pub comparison: Option<UnitComparison>,
    pub highlights: Vec<Highlight>,
    /// Second-to-last unit when more than two exist, else the last unit.
    pub htf_unit: Option<Unit>,
    pub htf_fib: Vec<Level>,
}

impl IndicatorModel {
    pub fn build(bars: &[Bar], cfg: &OverlayConfig) -> Self {
        let units = segment(bars, cfg.unit_size);
        let last_unit = units.last().cloned();
        let prev_unit = units.len().checked_sub(2).map(|i| units[i].clone());

        let fib = last_unit
            .as_ref()
            .map(|u| compute_levels(u.low, u.high, &cfg.levels))
            .unwrap_or_default();

        let comparison = match (&prev_unit, &last_unit) {
            (Some(p), Some(c)) => Some(UnitComparison::compute(p, c)),
            _ => None,
        };
        let highlights = comparison.map(|c| c.highlights()).unwrap_or_default();

        let htf_unit = if units.len() > 2 {
            prev_unit.clone()
        } else {
            last_unit.clone()
        };
        let htf_fib = htf_unit
            .as_ref()
            .map(|u| compute_levels(u.low, u.high, &cfg.htf_levels))
            .unwrap_or_default();

        Self {
            units,
            last_unit,
            prev_unit,
            fib,
            comparison,
            highlights,
            htf_unit,
            htf_fib,
        }
    }

    pub fn enabled_highlights(&self) -> impl Iterator<Item = &Highlight> {
        self.highlights.iter().filter(|h| h.enabled)
    }
}
