use std::path::PathBuf;

use tracing::info;

use crate::{
    errors::{BarError, SourceError},
    io::csv_reader::read_bars_csv_path,
    models::{bar_series::BarSeries, timeframe::ChartTimeframe},
    normalize::{MIN_BARS, normalize},
    providers::BarSource,
    resample::resample_to_yearly,
};

/// Reads a local CSV export and normalizes it.
///
/// When `timeframe` is [`ChartTimeframe::Year1`] the file is assumed to hold
/// the base interval and is resampled by calendar year.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    pub path: PathBuf,
    pub symbol: String,
    pub timeframe: ChartTimeframe,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>, symbol: impl Into<String>, timeframe: ChartTimeframe) -> Self {
        Self {
            path: path.into(),
            symbol: symbol.into(),
            timeframe,
        }
    }
}

impl BarSource for CsvFileSource {
    fn id(&self) -> &str {
        "csv"
    }

    fn fetch_series(&self) -> Result<BarSeries, SourceError> {
        let read = read_bars_csv_path(&self.path)?;
        let mut bars = normalize(read.rows).into_result()?;
        if self.timeframe.resample().is_some() {
            bars = resample_to_yearly(&bars);
            if bars.len() < MIN_BARS {
                return Err(BarError::NotEnoughBars.into());
            }
        }
        let series = BarSeries {
            symbol: self.symbol.clone(),
            timeframe: self.timeframe,
            bars,
        };
        info!(
            source = self.id(),
            path = %self.path.display(),
            bars = series.bars.len(),
            span = ?series.span(),
            skipped = read.skipped,
            "loaded bar series"
        );
        Ok(series)
    }
}
