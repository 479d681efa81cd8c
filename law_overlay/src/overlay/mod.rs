//! Merging per-law plans into one drawable set and tracking what was drawn.

pub mod merge;
pub mod registry;
pub mod signature;

pub use merge::{MergedOverlay, merge_plans};
pub use registry::{OverlayRegistry, OverlayRemover, OverlayRenderer, RenderCycle};
