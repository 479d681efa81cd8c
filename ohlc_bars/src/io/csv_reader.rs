//! Lenient OHLC CSV reader.
//!
//! Headers are matched after lowercasing and stripping everything that is not
//! a letter or digit, against English and Arabic aliases. Time may come from a
//! `datetime`/`timestamp` column, a `date` + `time` pair, a bare `date`, or an
//! epoch number (seconds or milliseconds). Rows that cannot be parsed are
//! skipped; the caller runs the result through [`crate::normalize`].

use std::{collections::HashMap, io::Read};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::{errors::CsvSourceError, models::bar::RawBar};

const DATE_KEYS: &[&str] = &["date", "day", "التاريخ", "تاريخ"];
const TIME_KEYS: &[&str] = &["time", "hour", "الوقت", "ساعة", "الزمن"];
const DATETIME_KEYS: &[&str] = &[
    "datetime",
    "date_time",
    "timestamp",
    "time stamp",
    "date_time_utc",
    "datetimeutc",
];
const OPEN_KEYS: &[&str] = &["open", "o", "openprice", "open_price", "افتتاح", "فتح"];
const HIGH_KEYS: &[&str] = &["high", "h", "highprice", "high_price", "اعلى", "أعلى", "مرتفع"];
const LOW_KEYS: &[&str] = &["low", "l", "lowprice", "low_price", "منخفض", "ادنى", "أدنى"];
const CLOSE_KEYS: &[&str] = &[
    "close",
    "c",
    "closeprice",
    "close_price",
    "last",
    "lastprice",
    "اغلاق",
    "إغلاق",
    "آخر",
];

/// Summary of one read: parsed rows plus how many were skipped.
#[derive(Debug, Clone, Default)]
pub struct CsvBars {
    pub rows: Vec<RawBar>,
    pub skipped: usize,
}

/// Read OHLC rows from any reader with a header line.
pub fn read_bars_csv<R: Read>(reader: R) -> Result<CsvBars, CsvSourceError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::from_headers(rdr.headers()?);
    let mut out = CsvBars::default();

    for record in rdr.records() {
        let record = record?;
        match columns.parse_row(&record) {
            Some(raw) => out.rows.push(raw),
            None => out.skipped += 1,
        }
    }

    if out.skipped > 0 {
        debug!(skipped = out.skipped, kept = out.rows.len(), "skipped unparsable CSV rows");
    }
    Ok(out)
}

/// Read OHLC rows from a file on disk.
pub fn read_bars_csv_path(path: impl AsRef<std::path::Path>) -> Result<CsvBars, CsvSourceError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| CsvSourceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_bars_csv(file)
}

/// Lowercase and keep only letters/digits, so `Date_Time (UTC)` ~ `datetimeutc`.
pub fn normalize_key(value: &str) -> String {
    value
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        let mut index = HashMap::new();
        for (i, h) in headers.iter().enumerate() {
            // duplicate headers: first column wins
            index.entry(normalize_key(h)).or_insert(i);
        }
        Self { index }
    }

    fn field<'r>(&self, row: &'r StringRecord, names: &[&str]) -> Option<&'r str> {
        names.iter().find_map(|name| {
            let i = *self.index.get(&normalize_key(name))?;
            row.get(i).filter(|v| !v.is_empty())
        })
    }

    fn parse_row(&self, row: &StringRecord) -> Option<RawBar> {
        let time = self.parse_time(row)?;
        let open = parse_number(self.field(row, OPEN_KEYS)?)?;
        let high = parse_number(self.field(row, HIGH_KEYS)?)?;
        let low = parse_number(self.field(row, LOW_KEYS)?)?;
        let close = parse_number(self.field(row, CLOSE_KEYS)?)?;
        Some(RawBar::new(time as f64, open, high, low, close))
    }

    fn parse_time(&self, row: &StringRecord) -> Option<i64> {
        let date = self.field(row, DATE_KEYS);
        let time = self.field(row, TIME_KEYS);

        if let Some(dt) = self.field(row, DATETIME_KEYS) {
            if let Ok(n) = dt.parse::<f64>() {
                return epoch_seconds(n);
            }
            return parse_datetime(&normalize_datetime(dt));
        }

        // `20240103` is a compact date, not an epoch
        if let Some(n) = date
            .filter(|d| parse_compact_date(d).is_none())
            .and_then(|d| d.parse::<f64>().ok())
        {
            return epoch_seconds(n);
        }

        match (date, time) {
            (Some(d), Some(t)) => {
                let date = parse_date(&reorder_date(&normalize_datetime(d)))?;
                let time = parse_clock(t)?;
                Some(NaiveDateTime::new(date, time).and_utc().timestamp())
            }
            (Some(d), None) => {
                let date = parse_date(&reorder_date(&normalize_datetime(d)))?;
                Some(date.and_time(NaiveTime::MIN).and_utc().timestamp())
            }
            (None, Some(t)) => epoch_seconds(t.parse::<f64>().ok()?),
            (None, None) => None,
        }
    }
}

/// Epoch number in seconds or milliseconds → whole seconds.
fn epoch_seconds(n: f64) -> Option<i64> {
    if !n.is_finite() {
        return None;
    }
    let ms = if n > 1e12 { n } else { n * 1000.0 };
    Some((ms / 1000.0).floor() as i64)
}

/// `2024.01.02 10:00` → `2024-01-02T10:00`
fn normalize_datetime(value: &str) -> String {
    let s = value.trim().replace('.', "-");
    if s.contains(' ') && !s.contains('T') {
        s.replacen(' ', "T", 1)
    } else {
        s
    }
}

/// `DD-MM-YYYY` → `YYYY-MM-DD`; anything else passes through.
fn reorder_date(value: &str) -> String {
    let parts: Vec<&str> = value.split('-').collect();
    match parts.as_slice() {
        [d, m, y] if y.len() == 4 && d.len() != 4 => format!("{y}-{m}-{d}"),
        _ => value.to_string(),
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_compact_date(value))
}

/// `YYYYMMDD`, exactly eight digits.
fn parse_compact_date(value: &str) -> Option<NaiveDate> {
    let v = value.trim();
    if v.len() != 8 || !v.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(v, "%Y%m%d").ok()
}

fn parse_clock(value: &str) -> Option<NaiveTime> {
    let v = value.trim();
    NaiveTime::parse_from_str(v, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(v, "%H:%M"))
        .ok()
}

fn parse_datetime(value: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(ndt.and_utc().timestamp());
        }
    }
    parse_date(&reorder_date(value)).map(|d| d.and_time(NaiveTime::MIN).and_utc().timestamp())
}

/// `1,234.5` → 1234.5, `1,5` → 1.5, `2.25` → 2.25
fn parse_number(value: &str) -> Option<f64> {
    let v = value.trim();
    if v.is_empty() {
        return None;
    }
    let cleaned = match (v.contains(','), v.contains('.')) {
        (true, true) => v.replace(',', ""),
        (true, false) => v.replace(',', "."),
        _ => v.to_string(),
    };
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}
