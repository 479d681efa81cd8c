use thiserror::Error;

/// Data errors surfaced by the bar normalizer.
///
/// These are values handed back to the caller, never panics. Downstream stages
/// treat them as "render nothing" rather than as fatal conditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BarError {
    /// Fewer than two bars survived validation and de-duplication.
    #[error("Not enough valid bars")]
    NotEnoughBars,

    /// The provider payload was not a JSON array.
    #[error("Bars not array")]
    NotArray,
}

/// Errors raised while reading bars from a CSV file.
#[derive(Debug, Error)]
pub enum CsvSourceError {
    /// The file could not be opened or read.
    #[error("I/O error reading {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The CSV payload was malformed (bad quoting, unreadable header, ...).
    #[error("CSV parse error")]
    Csv(#[from] csv::Error),
}

/// Errors surfaced by a [`BarSource`](crate::providers::BarSource).
#[derive(Debug, Error)]
pub enum SourceError {
    /// Reading the underlying CSV failed.
    #[error(transparent)]
    Csv(#[from] CsvSourceError),

    /// The payload was read but did not yield a usable series.
    #[error("{0}")]
    Bars(#[from] BarError),
}
