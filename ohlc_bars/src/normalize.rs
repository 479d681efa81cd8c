//! Bar normalizer: the only place that interprets provider time units.
//!
//! Input may come as typed [`RawBar`]s or as a raw JSON payload. The output is
//! a canonical ascending series with unique timestamps, or an explicit
//! [`BarError`] when fewer than two usable bars remain.

use serde_json::Value;
use tracing::debug;

use crate::{
    errors::BarError,
    models::bar::{Bar, RawBar},
};

/// Times above this are treated as milliseconds.
pub const MILLIS_THRESHOLD: f64 = 1e12;

/// Minimum number of bars for a usable series.
pub const MIN_BARS: usize = 2;

/// Result of a normalization pass.
///
/// `bars` is empty whenever `error` is set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Normalized {
    pub bars: Vec<Bar>,
    pub error: Option<BarError>,
}

impl Normalized {
    fn failed(error: BarError) -> Self {
        Self {
            bars: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<Vec<Bar>, BarError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.bars),
        }
    }
}

/// Normalize typed raw records.
///
/// - ms → s when `time > 1e12`; fractional seconds are floored
/// - records with any non-finite field are dropped
/// - stable sort by time; on equal time the later input record wins
pub fn normalize<I>(input: I) -> Normalized
where
    I: IntoIterator<Item = RawBar>,
{
    let mut dropped = 0usize;
    let mut bars: Vec<Bar> = input
        .into_iter()
        .filter_map(|raw| {
            let bar = canonical_bar(raw);
            if bar.is_none() {
                dropped += 1;
            }
            bar
        })
        .collect();

    // sort_by_key is stable, so input order survives among equal times
    bars.sort_by_key(|b| b.time);

    let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
    let mut replaced = 0usize;
    for bar in bars {
        match deduped.last_mut() {
            Some(last) if last.time == bar.time => {
                *last = bar;
                replaced += 1;
            }
            _ => deduped.push(bar),
        }
    }

    if dropped > 0 || replaced > 0 {
        debug!(dropped, replaced, kept = deduped.len(), "normalized bar input");
    }

    if deduped.len() < MIN_BARS {
        return Normalized::failed(BarError::NotEnoughBars);
    }

    Normalized {
        bars: deduped,
        error: None,
    }
}

/// Normalize a provider JSON payload (`[{time, open, high, low, close}, ...]`).
///
/// `time` must be a JSON number; prices may be numbers or numeric strings.
pub fn normalize_value(payload: &Value) -> Normalized {
    let Some(items) = payload.as_array() else {
        return Normalized::failed(BarError::NotArray);
    };
    normalize(items.iter().map(raw_from_value))
}

fn raw_from_value(v: &Value) -> RawBar {
    let time = v.get("time").and_then(Value::as_f64).unwrap_or(f64::NAN);
    RawBar::new(
        time,
        price_field(v, "open"),
        price_field(v, "high"),
        price_field(v, "low"),
        price_field(v, "close"),
    )
}

fn price_field(v: &Value, key: &str) -> f64 {
    match v.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

fn canonical_bar(raw: RawBar) -> Option<Bar> {
    let fields = [raw.time, raw.open, raw.high, raw.low, raw.close];
    if !fields.iter().all(|f| f.is_finite()) {
        return None;
    }
    let secs = if raw.time > MILLIS_THRESHOLD {
        (raw.time / 1000.0).floor()
    } else {
        raw.time.floor()
    };
    // f64 → i64 saturates; reject anything that would not round-trip
    if secs.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(Bar::new(secs as i64, raw.open, raw.high, raw.low, raw.close))
}
