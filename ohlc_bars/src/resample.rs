//! Calendar resampling for intervals providers cannot serve directly.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, TimeZone, Utc};

use crate::models::bar::Bar;

/// Bucket bars by UTC calendar year.
///
/// Each output bar starts at Jan 1 00:00:00Z of its year and aggregates
/// open (first), high (max), low (min), close (last). Input order does not
/// matter; output is ascending.
pub fn resample_to_yearly(bars: &[Bar]) -> Vec<Bar> {
    let mut buckets: BTreeMap<i32, Vec<Bar>> = BTreeMap::new();
    for bar in bars {
        let Some(ts) = DateTime::<Utc>::from_timestamp(bar.time, 0) else {
            continue;
        };
        buckets.entry(ts.year()).or_default().push(*bar);
    }

    buckets
        .into_iter()
        .filter_map(|(year, mut items)| {
            items.sort_by_key(|b| b.time);
            let first = items.first()?;
            let last = items.last()?;
            let high = items.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
            let low = items.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
            let start = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()?;
            Some(Bar::new(start.timestamp(), first.open, high, low, last.close))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(y: i32, m: u32, d: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap().timestamp()
    }

    #[test]
    fn aggregates_per_calendar_year() {
        let bars = vec![
            Bar::new(ts(2024, 6, 1), 20.0, 25.0, 18.0, 22.0),
            Bar::new(ts(2023, 1, 1), 10.0, 12.0, 9.0, 11.0),
            Bar::new(ts(2023, 12, 1), 11.0, 15.0, 8.0, 14.0),
            Bar::new(ts(2024, 1, 1), 14.0, 21.0, 13.0, 20.0),
        ];
        let yearly = resample_to_yearly(&bars);
        assert_eq!(
            yearly,
            vec![
                Bar::new(ts(2023, 1, 1), 10.0, 15.0, 8.0, 14.0),
                Bar::new(ts(2024, 1, 1), 14.0, 25.0, 13.0, 22.0),
            ]
        );
    }

    #[test]
    fn empty_in_empty_out() {
        assert!(resample_to_yearly(&[]).is_empty());
    }
}
