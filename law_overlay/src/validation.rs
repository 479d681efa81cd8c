//! Acceptance gate: every law must produce a drawable plan.

use std::fmt;

use ohlc_bars::Bar;
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    config::OverlayConfig,
    law::LawCatalog,
    mapping::{MappingEntry, MappingMode, MappingTable},
    plan::{BaselinePlan, DrawPlan, PlanCounts, build_draw_plan_with_baseline},
};

/// One reason a plan fails the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GateFailure {
    NoBox,
    TooFewLines,
    NoLabelOrMarker,
    NoLawSpecific,
    MissingUnknownReason,
}

impl fmt::Display for GateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GateFailure::NoBox => "boxesCount < 1",
            GateFailure::TooFewLines => "linesCount < 2",
            GateFailure::NoLabelOrMarker => "labelsCount + markersCount < 1",
            GateFailure::NoLawSpecific => "lawSpecificCount < 1",
            GateFailure::MissingUnknownReason => "unknown mapping without reason",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LawCheck {
    pub law_id: String,
    pub mode: MappingMode,
    pub unknown_mapping: bool,
    pub unknown_reason: String,
    #[serde(flatten)]
    pub counts: PlanCounts,
    pub failures: Vec<GateFailure>,
    pub passed: bool,
}

/// Apply the gate thresholds to one plan.
pub fn check_plan(plan: &DrawPlan) -> LawCheck {
    let c = &plan.counts;
    let mut failures = Vec::new();
    if c.boxes_count < 1 {
        failures.push(GateFailure::NoBox);
    }
    if c.lines_count < 2 {
        failures.push(GateFailure::TooFewLines);
    }
    if c.labels_count + c.markers_count < 1 {
        failures.push(GateFailure::NoLabelOrMarker);
    }
    if c.law_specific_count < 1 {
        failures.push(GateFailure::NoLawSpecific);
    }
    if plan.unknown_mapping && plan.unknown_reason.trim().is_empty() {
        failures.push(GateFailure::MissingUnknownReason);
    }
    LawCheck {
        law_id: plan.law_id.clone(),
        mode: plan.mapping_mode,
        unknown_mapping: plan.unknown_mapping,
        unknown_reason: plan.unknown_reason.clone(),
        counts: *c,
        passed: failures.is_empty(),
        failures,
    }
}

/// Build and check a plan for every law in `catalog`, in catalog order.
pub fn run_gate(catalog: &LawCatalog, bars: &[Bar], mapping: &MappingTable, cfg: &OverlayConfig) -> Vec<LawCheck> {
    let baseline = BaselinePlan::build(bars, cfg);
    let missing = MappingEntry::missing();
    let checks: Vec<LawCheck> = catalog
        .iter()
        .map(|law| {
            let entry = mapping.get(&law.id).unwrap_or(&missing);
            let check = check_plan(&build_draw_plan_with_baseline(law, &baseline, entry));
            if !check.passed {
                warn!(law = %check.law_id, failures = ?check.failures, "law failed validation");
            }
            check
        })
        .collect();
    let failed = checks.iter().filter(|c| !c.passed).count();
    info!(laws = checks.len(), failed, "validation gate finished");
    checks
}

/// What a renderer reports after drawing one law.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedCounts {
    pub lines: usize,
    pub boxes: usize,
    pub labels: usize,
    pub markers: usize,
    pub law_specific: usize,
    /// The SAFE_UNKNOWN fallback layer is on screen.
    pub fallback_visible: bool,
}

impl From<&PlanCounts> for RenderedCounts {
    fn from(c: &PlanCounts) -> Self {
        Self {
            lines: c.lines_count,
            boxes: c.boxes_count,
            labels: c.labels_count,
            markers: c.markers_count,
            law_specific: c.law_specific_count,
            fallback_visible: false,
        }
    }
}

impl From<&DrawPlan> for RenderedCounts {
    fn from(plan: &DrawPlan) -> Self {
        Self {
            fallback_visible: plan.guided_input.is_some() && !plan.law_specific.is_empty(),
            ..Self::from(&plan.counts)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStatus {
    Ok,
    /// Something drawn, but fewer than two lines or no box.
    MissingStructure,
    MissingMarker,
    MissingLawSpecific,
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Renderability {
    pub has_output: bool,
    pub has_non_marker_visual: bool,
    pub has_law_specific: bool,
    pub status: RenderStatus,
}

impl Renderability {
    pub fn passed(&self) -> bool {
        self.status == RenderStatus::Ok
    }
}

/// A law renders when it shows at least two lines, a box, a marker and some
/// law-specific output.
pub fn validate_law_renderable(counts: RenderedCounts) -> Renderability {
    let has_output = counts.lines > 0 || counts.boxes > 0 || counts.markers > 0 || counts.fallback_visible;
    let has_non_marker_visual = counts.lines >= 2 && counts.boxes >= 1;
    let has_law_specific = counts.law_specific >= 1;
    let status = if !has_output {
        RenderStatus::Empty
    } else if !has_non_marker_visual {
        RenderStatus::MissingStructure
    } else if counts.markers < 1 {
        RenderStatus::MissingMarker
    } else if !has_law_specific {
        RenderStatus::MissingLawSpecific
    } else {
        RenderStatus::Ok
    };
    Renderability {
        has_output,
        has_non_marker_visual,
        has_law_specific,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::law::Law;

    fn counts(lines: usize, boxes: usize, labels: usize, markers: usize, law_specific: usize) -> PlanCounts {
        PlanCounts {
            lines_count: lines,
            boxes_count: boxes,
            labels_count: labels,
            markers_count: markers,
            baseline_count: 0,
            law_specific_count: law_specific,
        }
    }

    #[test]
    fn empty_plan_fails_every_threshold() {
        let check = check_plan(&DrawPlan::empty("law_1"));
        assert!(!check.passed);
        assert_eq!(
            check.failures,
            vec![
                GateFailure::NoBox,
                GateFailure::TooFewLines,
                GateFailure::NoLabelOrMarker,
                GateFailure::NoLawSpecific
            ]
        );
    }

    #[test]
    fn unknown_mapping_requires_reason() {
        let mut plan = DrawPlan::empty("law_1");
        plan.counts = counts(2, 1, 1, 0, 1);
        assert!(check_plan(&plan).passed);
        plan.unknown_reason = "  ".into();
        assert_eq!(check_plan(&plan).failures, vec![GateFailure::MissingUnknownReason]);
    }

    #[test]
    fn too_few_bars_fail_the_gate_without_panicking() {
        let (catalog, _) = LawCatalog::from_laws(vec![Law::new("law_1", "Anything")]).unwrap();
        let checks = run_gate(&catalog, &[], &MappingTable::default(), &OverlayConfig::default());
        assert_eq!(checks.len(), 1);
        assert!(!checks[0].passed);
        assert_eq!(checks[0].mode, MappingMode::Unknown);
    }

    #[test]
    fn renderability_status() {
        let ok = validate_law_renderable((&counts(3, 1, 1, 1, 2)).into());
        assert_eq!(ok.status, RenderStatus::Ok);
        assert!(ok.passed());
        assert!(ok.has_output && ok.has_non_marker_visual && ok.has_law_specific);

        let markers = validate_law_renderable(RenderedCounts {
            markers: 2,
            ..Default::default()
        });
        assert_eq!(markers.status, RenderStatus::MissingStructure);
        assert!(markers.has_output);

        let no_specific = validate_law_renderable(RenderedCounts {
            lines: 2,
            boxes: 1,
            markers: 1,
            ..Default::default()
        });
        assert_eq!(no_specific.status, RenderStatus::MissingLawSpecific);

        assert_eq!(validate_law_renderable(RenderedCounts::default()).status, RenderStatus::Empty);
    }

    #[test]
    fn single_line_is_not_renderable() {
        let r = validate_law_renderable(RenderedCounts {
            lines: 1,
            law_specific: 1,
            ..Default::default()
        });
        assert!(r.has_output);
        assert!(!r.has_non_marker_visual);
        assert_eq!(r.status, RenderStatus::MissingStructure);
        assert!(!r.passed());
    }

    #[test]
    fn lines_and_box_without_marker_fail() {
        let r = validate_law_renderable((&counts(4, 2, 3, 0, 2)).into());
        assert!(r.has_non_marker_visual);
        assert_eq!(r.status, RenderStatus::MissingMarker);
    }

    #[test]
    fn visible_fallback_counts_as_output() {
        let r = validate_law_renderable(RenderedCounts {
            fallback_visible: true,
            ..Default::default()
        });
        assert!(r.has_output);
        assert_eq!(r.status, RenderStatus::MissingStructure);
    }
}
