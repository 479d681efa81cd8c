//! Per-law draw plans.
//!
//! A [`DrawPlan`] is rebuilt from scratch for every bar set: shared baseline
//! scaffolding, the law-specific geometry selected by its mapping entry, and
//! any explicit recipe overlays. Too few bars produce an empty plan with zero
//! counts, never an error.

pub mod baseline;
pub mod fallback;
pub mod recipe;
pub mod specific;

use ohlc_bars::Bar;
use serde::Serialize;

use crate::{
    config::OverlayConfig,
    indicator::levels::LineStyle,
    law::Law,
    mapping::{Feature, MappingEntry, MappingMode, MappingTable},
};

pub use baseline::BaselinePlan;

pub const HL_COLOR: &str = "#334155";
pub const FIB_COLOR: &str = "#60a5fa";
pub const FIB_236_COLOR: &str = "#f97316";
pub const GOLDEN_ZONE_COLOR: &str = "#22c55e";
pub const HTF_COLOR: &str = "#64748b";
pub const FALLBACK_LINE_COLOR: &str = "#64748b";
pub const MAPPED_COLOR: &str = "#14b8a6";
pub const UNKNOWN_COLOR: &str = "#a78bfa";
pub const RECIPE_COLOR: &str = "#f59e0b";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceLine {
    pub key: String,
    pub price: f64,
    pub label: String,
    pub color: String,
    pub line_style: LineStyle,
    pub line_width: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Band {
    pub key: String,
    pub from: f64,
    pub to: f64,
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerShape {
    Circle,
    Square,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub key: String,
    pub time: i64,
    pub price: f64,
    pub text: String,
    pub color: String,
    pub shape: MarkerShape,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Label {
    pub key: String,
    pub text: String,
}

/// Unit boundary; informational only, never counted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Separator {
    pub key: String,
    pub time: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Geometry {
    pub lines: Vec<PriceLine>,
    pub bands: Vec<Band>,
    pub markers: Vec<Marker>,
    pub labels: Vec<Label>,
}

impl Geometry {
    pub fn primitive_count(&self) -> usize {
        self.lines.len() + self.bands.len() + self.markers.len() + self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitive_count() == 0
    }
}

/// Shape counts consumed by the validation gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanCounts {
    pub lines_count: usize,
    pub boxes_count: usize,
    pub labels_count: usize,
    pub markers_count: usize,
    pub baseline_count: usize,
    pub law_specific_count: usize,
}

impl PlanCounts {
    fn tally(baseline: &Geometry, law_specific: &Geometry, recipe: &Geometry) -> Self {
        let parts = [baseline, law_specific, recipe];
        Self {
            lines_count: parts.iter().map(|g| g.lines.len()).sum(),
            boxes_count: parts.iter().map(|g| g.bands.len()).sum(),
            labels_count: parts.iter().map(|g| g.labels.len()).sum(),
            markers_count: parts.iter().map(|g| g.markers.len()).sum(),
            baseline_count: baseline.primitive_count(),
            law_specific_count: law_specific.primitive_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawPlan {
    pub law_id: String,
    pub mapping_mode: MappingMode,
    pub mapping_attempt: u8,
    pub features: Vec<Feature>,
    pub unknown_mapping: bool,
    /// Empty unless `unknown_mapping`.
    pub unknown_reason: String,
    /// Anchors the caller must collect before the recipe can be drawn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guided_input: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_ratio: Option<f64>,
    pub baseline: BaselinePlan,
    pub law_specific: Geometry,
    pub recipe: Geometry,
    pub counts: PlanCounts,
}

impl DrawPlan {
    /// Plan with no geometry for `law_id`, using the missing-entry mapping.
    pub fn empty(law_id: impl Into<String>) -> Self {
        let entry = MappingEntry::missing();
        Self {
            law_id: law_id.into(),
            mapping_mode: entry.mode,
            mapping_attempt: entry.attempts,
            unknown_mapping: true,
            unknown_reason: entry.reason,
            features: entry.features,
            guided_input: None,
            target_ratio: None,
            baseline: BaselinePlan::default(),
            law_specific: Geometry::default(),
            recipe: Geometry::default(),
            counts: PlanCounts::default(),
        }
    }

    /// Every primitive this plan would draw on its own.
    pub fn primitive_count(&self) -> usize {
        self.baseline.geometry.primitive_count()
            + self.law_specific.primitive_count()
            + self.recipe.primitive_count()
    }
}

/// Build a plan for `law` against `bars`, looking its entry up in `mapping`.
pub fn build_draw_plan(law: &Law, bars: &[Bar], mapping: &MappingTable, cfg: &OverlayConfig) -> DrawPlan {
    let baseline = BaselinePlan::build(bars, cfg);
    let missing;
    let entry = match mapping.get(&law.id) {
        Some(e) => e,
        None => {
            missing = MappingEntry::missing();
            &missing
        }
    };
    build_draw_plan_with_baseline(law, &baseline, entry)
}

/// Build a plan reusing an already computed baseline.
pub fn build_draw_plan_with_baseline(law: &Law, baseline: &BaselinePlan, entry: &MappingEntry) -> DrawPlan {
    let last = baseline.model.last_unit.as_ref();

    let (law_specific, recipe, target_ratio, guided_input) = match law.guided_inputs() {
        Some(inputs) => (
            fallback::unknown_fallback_geometry(&law.id, last, &baseline.model.fib),
            Geometry::default(),
            None,
            Some(inputs.to_vec()),
        ),
        None => {
            let (geometry, ratio) = specific::law_specific_geometry(law, last, entry);
            let recipe = last
                .map(|u| recipe::recipe_geometry(&law.id, law.recipe_overlays(), u))
                .unwrap_or_default();
            (geometry, recipe, ratio, None)
        }
    };

    let unknown_mapping = entry.is_unknown() || guided_input.is_some();
    let unknown_reason = match &guided_input {
        Some(inputs) => format!("guided input required: {}", inputs.join(", ")),
        None if unknown_mapping => entry.reason.clone(),
        None => String::new(),
    };

    let counts = PlanCounts::tally(&baseline.geometry, &law_specific, &recipe);
    DrawPlan {
        law_id: law.id.clone(),
        mapping_mode: entry.mode,
        mapping_attempt: entry.attempts,
        features: entry.features.clone(),
        unknown_mapping,
        unknown_reason,
        guided_input,
        target_ratio,
        baseline: baseline.clone(),
        law_specific,
        recipe,
        counts,
    }
}
