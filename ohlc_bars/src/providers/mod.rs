//! Bar source abstraction.
//!
//! Network providers (REST polling, websockets, retry/backoff) live outside
//! this workspace. Whatever fetches the data hands the overlay pipeline a
//! plain, already-resolved series through [`BarSource`].
//!
//! # Example
//!
//! ```rust
//! use ohlc_bars::errors::SourceError;
//! use ohlc_bars::models::{bar::Bar, bar_series::BarSeries, timeframe::ChartTimeframe};
//! use ohlc_bars::providers::BarSource;
//!
//! struct Fixed(Vec<Bar>);
//!
//! impl BarSource for Fixed {
//!     fn id(&self) -> &str {
//!         "fixed"
//!     }
//!     fn fetch_series(&self) -> Result<BarSeries, SourceError> {
//!         Ok(BarSeries {
//!             symbol: "TEST".into(),
//!             timeframe: ChartTimeframe::Hour1,
//!             bars: self.0.clone(),
//!         })
//!     }
//! }
//! ```

pub mod csv;

use crate::{errors::SourceError, models::bar_series::BarSeries};

/// Anything that can produce a normalized [`BarSeries`].
///
/// Implementations must return bars that already went through
/// [`crate::normalize::normalize`]; callers do not re-validate.
pub trait BarSource {
    /// Short identifier used in logs (e.g. `"csv"`).
    fn id(&self) -> &str;

    /// Produce the current series.
    fn fetch_series(&self) -> Result<BarSeries, SourceError>;
}
