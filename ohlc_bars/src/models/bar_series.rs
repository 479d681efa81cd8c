//! Normalized bars tagged with where they came from.

use crate::{
    models::{bar::Bar, timeframe::ChartTimeframe},
    normalize::MIN_BARS,
};

/// Output of a [`BarSource`](crate::providers::BarSource). `bars` is ascending
/// and unique by time.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub symbol: String,
    pub timeframe: ChartTimeframe,
    pub bars: Vec<Bar>,
}

impl BarSeries {
    /// Enough bars to segment and draw anything.
    pub fn is_chartable(&self) -> bool {
        self.bars.len() >= MIN_BARS
    }

    /// First and last bar time.
    pub fn span(&self) -> Option<(i64, i64)> {
        Some((self.bars.first()?.time, self.bars.last()?.time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(times: &[i64]) -> BarSeries {
        BarSeries {
            symbol: "XAU/USD".into(),
            timeframe: ChartTimeframe::Hour1,
            bars: times.iter().map(|&t| Bar::new(t, 1.0, 2.0, 0.5, 1.5)).collect(),
        }
    }

    #[test]
    fn span_and_chartability() {
        assert_eq!(series(&[]).span(), None);
        assert!(!series(&[60]).is_chartable());
        let s = series(&[60, 120, 180]);
        assert!(s.is_chartable());
        assert_eq!(s.span(), Some((60, 180)));
    }
}
