use std::{fmt, str::FromStr};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeFrameError {
    #[error("Invalid timeframe: {}", input)]
    Unknown { input: String },
}

/// Chart intervals offered to the learner.
///
/// `Year` is not served natively by any provider; it is fetched as monthly bars
/// and resampled (see [`crate::resample::resample_to_yearly`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartTimeframe {
    Minute1,
    Minute5,
    Minute15,
    Hour1,
    Hour4,
    Day1,
    Week1,
    Month1,
    Year1,
}

/// How a timeframe is derived when the upstream cannot serve it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resample {
    /// Fetch the base interval, then bucket by UTC calendar year.
    Yearly { base: ChartTimeframe },
}

impl ChartTimeframe {
    pub const ALL: [ChartTimeframe; 9] = [
        ChartTimeframe::Minute1,
        ChartTimeframe::Minute5,
        ChartTimeframe::Minute15,
        ChartTimeframe::Hour1,
        ChartTimeframe::Hour4,
        ChartTimeframe::Day1,
        ChartTimeframe::Week1,
        ChartTimeframe::Month1,
        ChartTimeframe::Year1,
    ];

    pub const fn id(&self) -> &'static str {
        match self {
            ChartTimeframe::Minute1 => "1m",
            ChartTimeframe::Minute5 => "5m",
            ChartTimeframe::Minute15 => "15m",
            ChartTimeframe::Hour1 => "1h",
            ChartTimeframe::Hour4 => "4h",
            ChartTimeframe::Day1 => "1d",
            ChartTimeframe::Week1 => "1w",
            ChartTimeframe::Month1 => "1M",
            ChartTimeframe::Year1 => "1Y",
        }
    }

    /// Default number of bars requested for this interval.
    pub const fn default_limit(&self) -> usize {
        match self {
            ChartTimeframe::Minute1
            | ChartTimeframe::Minute5
            | ChartTimeframe::Minute15
            | ChartTimeframe::Hour1
            | ChartTimeframe::Hour4 => 1500,
            ChartTimeframe::Day1 => 2000,
            ChartTimeframe::Week1 => 520,
            ChartTimeframe::Month1 => 240,
            ChartTimeframe::Year1 => 120,
        }
    }

    pub const fn resample(&self) -> Option<Resample> {
        match self {
            ChartTimeframe::Year1 => Some(Resample::Yearly {
                base: ChartTimeframe::Month1,
            }),
            _ => None,
        }
    }
}

/// Display/parse for CLI ergonomics (`"5m"`, `"1d"`, `"1Y"`)
impl fmt::Display for ChartTimeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ChartTimeframe {
    type Err = TimeFrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // `M` (month) and `m` (minute) differ only by case, so match exactly first.
        if let Some(tf) = Self::ALL.iter().find(|tf| tf.id() == s) {
            return Ok(*tf);
        }
        match s.to_lowercase().as_str() {
            "1min" => Ok(ChartTimeframe::Minute1),
            "5min" => Ok(ChartTimeframe::Minute5),
            "15min" => Ok(ChartTimeframe::Minute15),
            "1day" => Ok(ChartTimeframe::Day1),
            "1week" => Ok(ChartTimeframe::Week1),
            "1mo" | "1month" => Ok(ChartTimeframe::Month1),
            "1y" | "1year" => Ok(ChartTimeframe::Year1),
            _ => Err(TimeFrameError::Unknown {
                input: s.to_string(),
            }),
        }
    }
}
