//! Law overlay derivation: from normalized bars and a law catalog to
//! deduplicated chart geometry.
//!
//! Pipeline: [`indicator`] (units, levels, highlights) → [`mapping`] (law →
//! feature families) → [`plan`] (per-law draw plans) → [`overlay`] (merge and
//! registry). [`validation`] checks that every law yields something drawable.

pub mod config;
pub mod indicator;
pub mod law;
pub mod mapping;
pub mod overlay;
pub mod plan;
pub mod report;
pub mod session;
pub mod validation;

pub use config::OverlayConfig;
pub use law::{Law, LawCatalog};
pub use mapping::{MappingEntry, MappingMode, MappingTable};
pub use plan::{DrawPlan, build_draw_plan};
pub use session::{ChartSession, SessionError};
