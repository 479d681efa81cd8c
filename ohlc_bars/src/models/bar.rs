//! Canonical in-memory representation of an OHLC bar.
//!
//! [`Bar`] is what the rest of the workspace consumes. [`RawBar`] is the loose
//! shape a provider or CSV row hands to the [normalizer](crate::normalize),
//! where any field may be missing or non-finite.

use serde::{Deserialize, Serialize};

/// A single OHLC sample, `time` in whole seconds since the Unix epoch (UTC).
///
/// Within a canonical series `time` is strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar open time, seconds since epoch.
    pub time: i64,
    /// Opening price.
    pub open: f64,
    /// Highest price during the bar interval.
    pub high: f64,
    /// Lowest price during the bar interval.
    pub low: f64,
    /// Closing price.
    pub close: f64,
}

impl Bar {
    pub const fn new(time: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
        }
    }
}

/// An unvalidated bar record. `time` may be in seconds or milliseconds.
///
/// Missing fields are represented as `NaN`, which the normalizer drops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawBar {
    pub time: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl RawBar {
    pub const fn new(time: f64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
        }
    }
}

impl From<Bar> for RawBar {
    fn from(b: Bar) -> Self {
        Self::new(b.time as f64, b.open, b.high, b.low, b.close)
    }
}
