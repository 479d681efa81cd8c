//! Geometry that differentiates one law from another.
//!
//! A single target ratio is picked from the mapped features, first match wins:
//!
//! | feature       | ratio                                   |
//! |---------------|-----------------------------------------|
//! | `Weak123`     | 0.236                                   |
//! | `InsideHL`    | 0.5                                     |
//! | `PrevBreakHL` | 1 if close ≥ mid, else 0                |
//! | `fibGrid`     | 0.382 for odd law numbers, else 0.618   |
//! | `unitHL`      | 0.786 if close ≥ open, else 0.236       |
//! | otherwise     | 0.5                                     |
//!
//! A line, a narrow band and a marker are drawn at that ratio of the last
//! unit, plus one label naming the mapping mode.

use crate::{
    indicator::{highlights::HighlightKey, levels::LineStyle, units::Unit},
    law::Law,
    mapping::{Feature, MappingEntry},
    plan::{Band, Geometry, Label, MAPPED_COLOR, Marker, MarkerShape, PriceLine, UNKNOWN_COLOR},
};

/// Band half-width as a fraction of range.
pub const INSIDE_HALF_WIDTH: f64 = 0.05;
pub const DEFAULT_HALF_WIDTH: f64 = 0.025;

pub fn target_ratio(entry: &MappingEntry, law_number: u32, last: &Unit) -> f64 {
    if entry.has_highlight(HighlightKey::Weak123) {
        0.236
    } else if entry.has_highlight(HighlightKey::InsideHL) {
        0.5
    } else if entry.has_highlight(HighlightKey::PrevBreakHL) {
        if last.close >= last.mid() { 1.0 } else { 0.0 }
    } else if entry.has(&Feature::FibGrid) {
        if law_number % 2 == 1 { 0.382 } else { 0.618 }
    } else if entry.has(&Feature::UnitHL) {
        if last.close >= last.open { 0.786 } else { 0.236 }
    } else {
        0.5
    }
}

/// Law-specific primitives and the ratio they sit at. Empty without a unit
/// with positive range.
pub fn law_specific_geometry(law: &Law, last: Option<&Unit>, entry: &MappingEntry) -> (Geometry, Option<f64>) {
    let Some(last) = last.filter(|u| u.has_range()) else {
        return (Geometry::default(), None);
    };

    let ratio = target_ratio(entry, law.number(), last);
    let inside = entry.has_highlight(HighlightKey::InsideHL);
    let weak = entry.has_highlight(HighlightKey::Weak123);
    let prev_break = entry.has_highlight(HighlightKey::PrevBreakHL);

    let center = last.low + last.range * ratio;
    let half = last.range * if inside { INSIDE_HALF_WIDTH } else { DEFAULT_HALF_WIDTH };
    let color = if entry.is_unknown() { UNKNOWN_COLOR } else { MAPPED_COLOR };
    let id = &law.id;

    let geometry = Geometry {
        lines: vec![PriceLine {
            key: format!("{id}-specific-line"),
            price: center,
            label: format!("{id} {ratio:.3}"),
            color: color.to_string(),
            line_style: if weak { LineStyle::Dashed } else { LineStyle::Solid },
            line_width: 2,
        }],
        bands: vec![Band {
            key: format!("{id}-specific-band"),
            from: center - half,
            to: center + half,
            label: if inside {
                format!("{id} inside-zone")
            } else {
                format!("{id} law-zone")
            },
            color: color.to_string(),
        }],
        markers: vec![Marker {
            key: format!("{id}-specific-marker"),
            time: last.end_time,
            price: center,
            text: if prev_break {
                format!("{id} break-ref")
            } else {
                id.clone()
            },
            color: color.to_string(),
            shape: MarkerShape::Square,
        }],
        labels: vec![Label {
            key: format!("{id}-specific-label"),
            text: format!("{id} · {}", entry.mode),
        }],
    };
    (geometry, Some(ratio))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::MappingMode;

    fn unit(open: f64, close: f64) -> Unit {
        Unit {
            id: "U1".into(),
            start_time: 0,
            end_time: 3600,
            open,
            close,
            high: 200.0,
            low: 100.0,
            range: 100.0,
        }
    }

    fn entry(mode: MappingMode, features: Vec<Feature>) -> MappingEntry {
        MappingEntry {
            mode,
            features,
            reason: "r".into(),
            attempts: mode.attempts(),
            source_refs: vec![],
        }
    }

    fn hl(k: HighlightKey) -> Feature {
        Feature::Highlight(k)
    }

    #[test]
    fn ratio_priority_order() {
        let u = unit(120.0, 180.0);
        let m = MappingMode::KeywordInferred;
        let all = entry(
            m,
            vec![
                hl(HighlightKey::PrevBreakHL),
                hl(HighlightKey::InsideHL),
                hl(HighlightKey::Weak123),
                Feature::FibGrid,
            ],
        );
        assert_eq!(target_ratio(&all, 1, &u), 0.236);

        let inside_break = entry(m, vec![hl(HighlightKey::PrevBreakHL), hl(HighlightKey::InsideHL)]);
        assert_eq!(target_ratio(&inside_break, 1, &u), 0.5);

        let brk = entry(m, vec![hl(HighlightKey::PrevBreakHL), Feature::FibGrid]);
        assert_eq!(target_ratio(&brk, 1, &u), 1.0);
        assert_eq!(target_ratio(&brk, 1, &unit(180.0, 120.0)), 0.0);
        assert_eq!(target_ratio(&brk, 1, &unit(180.0, 150.0)), 1.0);
    }

    #[test]
    fn fib_grid_parity_and_unit_direction() {
        let u = unit(120.0, 180.0);
        let fib = entry(MappingMode::KeywordInferred, vec![Feature::FibGrid]);
        assert_eq!(target_ratio(&fib, 7, &u), 0.382);
        assert_eq!(target_ratio(&fib, 8, &u), 0.618);

        let unit_hl = entry(MappingMode::CategoryHeuristic, vec![Feature::UnitHL]);
        assert_eq!(target_ratio(&unit_hl, 1, &u), 0.786);
        assert_eq!(target_ratio(&unit_hl, 1, &unit(180.0, 120.0)), 0.236);

        let other = entry(MappingMode::CategoryHeuristic, vec![hl(HighlightKey::InsideShortHL)]);
        assert_eq!(target_ratio(&other, 1, &u), 0.5);
    }

    #[test]
    fn inside_band_is_wider() {
        let law = Law::new("law_3", "t");
        let u = unit(120.0, 180.0);
        let (g, ratio) = law_specific_geometry(
            &law,
            Some(&u),
            &entry(MappingMode::KeywordInferred, vec![hl(HighlightKey::InsideHL)]),
        );
        assert_eq!(ratio, Some(0.5));
        assert_eq!((g.bands[0].from, g.bands[0].to), (145.0, 155.0));
        assert_eq!(g.bands[0].label, "law_3 inside-zone");
        assert_eq!(g.lines[0].label, "law_3 0.500");
        assert_eq!(g.lines[0].color, MAPPED_COLOR);
        assert_eq!(g.labels[0].text, "law_3 · keyword_inferred");
    }

    #[test]
    fn weak_and_break_styling() {
        let law = Law::new("law_28", "t");
        let u = unit(150.0, 152.0);
        let (g, _) = law_specific_geometry(
            &law,
            Some(&u),
            &entry(
                MappingMode::KeywordInferred,
                vec![hl(HighlightKey::PrevBreakHL), hl(HighlightKey::Weak123)],
            ),
        );
        assert_eq!(g.lines[0].line_style, LineStyle::Dashed);
        assert!((g.lines[0].price - 123.6).abs() < 1e-9);
        assert_eq!(g.markers[0].text, "law_28 break-ref");
        assert!((g.bands[0].from - 121.1).abs() < 1e-9);
        assert!((g.bands[0].to - 126.1).abs() < 1e-9);
    }

    #[test]
    fn unknown_modes_are_purple() {
        let law = Law::new("law_16", "t");
        let (g, _) = law_specific_geometry(
            &law,
            Some(&unit(120.0, 180.0)),
            &entry(MappingMode::CategoryHeuristic, vec![Feature::Equilibrium]),
        );
        assert!(g.lines.iter().all(|l| l.color == UNKNOWN_COLOR));
        assert!(g.bands.iter().all(|b| b.color == UNKNOWN_COLOR));
        assert!(g.markers.iter().all(|m| m.color == UNKNOWN_COLOR));
    }

    #[test]
    fn degenerate_range_draws_nothing() {
        let law = Law::new("law_1", "t");
        let mut u = unit(100.0, 100.0);
        u.high = 100.0;
        u.range = 0.0;
        let (g, ratio) = law_specific_geometry(&law, Some(&u), &MappingEntry::missing());
        assert!(g.is_empty());
        assert!(ratio.is_none());
        assert!(law_specific_geometry(&law, None, &MappingEntry::missing()).0.is_empty());
    }
}
