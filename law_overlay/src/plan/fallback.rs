//! Fallback geometry for laws that cannot be drawn deterministically yet.
//!
//! Used when a recipe needs learner-supplied anchors: the unit boundaries, a
//! dotted fib grid and the golden zone are drawn in the fallback palette so
//! the chart never pretends the law is fully mapped.

use crate::{
    indicator::{
        levels::{Level, LineStyle},
        units::Unit,
    },
    plan::{
        Band, FALLBACK_LINE_COLOR, Geometry, Label, Marker, MarkerShape, PriceLine, UNKNOWN_COLOR,
        baseline::GOLDEN_ZONE,
    },
};

/// `fib` are the levels already computed on `last`.
pub fn unknown_fallback_geometry(law_id: &str, last: Option<&Unit>, fib: &[Level]) -> Geometry {
    let Some(last) = last.filter(|u| u.has_range()) else {
        return Geometry::default();
    };

    let line = |suffix: &str, price: f64, tag: &str| PriceLine {
        key: format!("{law_id}-safe-{suffix}"),
        price,
        label: format!("{law_id} SAFE_UNKNOWN {tag}"),
        color: FALLBACK_LINE_COLOR.to_string(),
        line_style: LineStyle::Dashed,
        line_width: 1,
    };

    let mut lines = vec![line("low", last.low, "LOW"), line("high", last.high, "HIGH")];
    lines.extend(fib.iter().map(|lvl| PriceLine {
        key: format!("{law_id}-safe-fib-{}", lvl.ratio),
        price: lvl.price,
        label: format!("{law_id} SAFE_UNKNOWN {}", lvl.ratio),
        color: UNKNOWN_COLOR.to_string(),
        line_style: LineStyle::Dotted,
        line_width: 1,
    }));

    Geometry {
        lines,
        bands: vec![Band {
            key: format!("{law_id}-safe-band"),
            from: last.low + last.range * GOLDEN_ZONE.0,
            to: last.low + last.range * GOLDEN_ZONE.1,
            label: format!("SAFE_UNKNOWN {law_id}"),
            color: UNKNOWN_COLOR.to_string(),
        }],
        markers: vec![Marker {
            key: format!("{law_id}-safe-marker"),
            time: last.end_time,
            price: last.close,
            text: format!("{law_id} SAFE_UNKNOWN"),
            color: UNKNOWN_COLOR.to_string(),
            shape: MarkerShape::Square,
        }],
        labels: vec![Label {
            key: format!("{law_id}-safe-label"),
            text: format!("{law_id} · SAFE_UNKNOWN"),
        }],
    }
}
