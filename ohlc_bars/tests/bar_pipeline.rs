use std::io::Write;

use ohlc_bars::{
    BarError,
    models::timeframe::ChartTimeframe,
    normalize_value,
    providers::{BarSource, csv::CsvFileSource},
};
use serde_json::json;
use tempfile::NamedTempFile;

fn write_csv(body: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(body.as_bytes()).unwrap();
    f
}

#[test]
fn provider_payload_with_string_prices_normalizes() {
    let payload = json!([
        {"time": 1_704_153_600_000_i64, "open": "1.5", "high": 2, "low": 1, "close": "1.75"},
        {"time": 1_704_157_200, "open": 1.75, "high": 2.5, "low": 1.5, "close": 2.25},
        {"time": 1_704_157_200, "open": 1.75, "high": 2.5, "low": 1.5, "close": 2.0},
    ]);
    let bars = normalize_value(&payload).into_result().unwrap();
    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0].time, 1_704_153_600);
    assert_eq!(bars[0].open, 1.5);
    assert_eq!(bars[1].close, 2.0);
}

#[test]
fn record_with_string_time_is_rejected() {
    let payload = json!([
        {"time": "1704153600", "open": 1, "high": 2, "low": 0.5, "close": 1.5},
        {"time": 1_704_157_200, "open": 1, "high": 2, "low": 0.5, "close": 1.5},
    ]);
    let out = normalize_value(&payload);
    assert_eq!(out.error, Some(BarError::NotEnoughBars));
}

#[test]
fn monthly_csv_resamples_to_yearly() {
    let f = write_csv(
        "timestamp,open,high,low,close\n\
         1704067200,10,12,9,11\n\
         1706745600,11,15,10,14\n\
         1735689600,14,16,13,15\n\
         1738368000,15,18,12,17\n",
    );
    let series = CsvFileSource::new(f.path(), "BTCUSDT", ChartTimeframe::Year1)
        .fetch_series()
        .unwrap();
    assert_eq!(series.timeframe, ChartTimeframe::Year1);
    assert_eq!(series.bars.len(), 2);
    let y2024 = series.bars[0];
    assert_eq!((y2024.open, y2024.high, y2024.low, y2024.close), (10.0, 15.0, 9.0, 14.0));
    let y2025 = series.bars[1];
    assert_eq!((y2025.open, y2025.high, y2025.low, y2025.close), (14.0, 18.0, 12.0, 17.0));
}
