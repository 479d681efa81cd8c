//! Fixed-size aggregation of bars into units.

use ohlc_bars::Bar;
use serde::Serialize;

/// High/low/open/close block over a contiguous run of bars.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    /// `U1`, `U2`, ... in sequence order.
    pub id: String,
    pub start_time: i64,
    pub end_time: i64,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub range: f64,
}

impl Unit {
    pub fn mid(&self) -> f64 {
        self.low + self.range * 0.5
    }

    /// True when the range is usable for ratio geometry.
    pub fn has_range(&self) -> bool {
        self.range.is_finite() && self.range > 0.0
    }
}

/// Partition `bars` into consecutive chunks of `unit_size`; the last chunk may
/// be shorter. Bars without finite high/low are ignored inside a chunk and a
/// chunk with none left produces no unit. `unit_size == 0` yields nothing.
pub fn segment(bars: &[Bar], unit_size: usize) -> Vec<Unit> {
    if unit_size == 0 {
        return Vec::new();
    }

    let mut out: Vec<Unit> = Vec::with_capacity(bars.len().div_ceil(unit_size));
    for chunk in bars.chunks(unit_size) {
        let valid: Vec<&Bar> = chunk
            .iter()
            .filter(|b| b.high.is_finite() && b.low.is_finite())
            .collect();
        let (Some(first), Some(last)) = (valid.first(), valid.last()) else {
            continue;
        };
        let high = valid.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let low = valid.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        out.push(Unit {
            id: format!("U{}", out.len() + 1),
            start_time: first.time,
            end_time: last.time,
            open: first.open,
            close: last.close,
            high,
            low,
            range: high - low,
        });
    }
    out
}
