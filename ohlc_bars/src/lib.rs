//! OHLC bar model, normalization and local bar sources.
//!
//! Everything downstream (unit segmentation, ratio levels, law overlays)
//! consumes the canonical series produced by [`normalize::normalize`].

pub mod errors;
pub mod io;
pub mod models;
pub mod normalize;
pub mod providers;
pub mod resample;

pub use errors::BarError;
pub use models::bar::{Bar, RawBar};
pub use normalize::{Normalized, normalize, normalize_value};
