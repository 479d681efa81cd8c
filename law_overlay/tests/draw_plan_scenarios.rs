mod common;

use common::{bars, config, single_mapping};
use law_overlay::{
    Law, MappingMode, OverlayConfig, build_draw_plan,
    indicator::{IndicatorModel, levels::LineStyle},
    law::{
        default_catalog,
        recipe::{ChartRecipe, RecipeOverlay, RecipeValue},
    },
    mapping::Feature,
    plan::{HL_COLOR, RECIPE_COLOR, UNKNOWN_COLOR},
};
use ohlc_bars::Bar;
use proptest::prelude::*;

#[test]
fn direct_recipe_ratio_line_lands_on_the_midpoint() {
    let mut law = Law::new("law_7", "Recipe law");
    law.chart_recipe = Some(ChartRecipe {
        inputs: vec![],
        overlays: vec![RecipeOverlay::PriceLine {
            value: RecipeValue::Expr("ratio(0.5)".into()),
            color: None,
            line_style: None,
            label: None,
        }],
    });
    let series = bars(48);
    let plan = build_draw_plan(&law, &series, &single_mapping(&law), &config());

    assert_eq!(plan.mapping_mode, MappingMode::Direct);
    assert!(!plan.unknown_mapping);
    assert!(plan.features.contains(&Feature::RecipeOverlay));

    assert_eq!(plan.recipe.lines.len(), 1);
    let line = &plan.recipe.lines[0];
    assert_eq!(line.price, 150.0);
    assert_eq!(line.color, RECIPE_COLOR);

    // standard baseline still present
    let hl: Vec<f64> = plan
        .baseline
        .geometry
        .lines
        .iter()
        .filter(|l| l.color == HL_COLOR)
        .map(|l| l.price)
        .collect();
    assert_eq!(hl, vec![200.0, 100.0]);
    assert_eq!(plan.baseline.geometry.bands.len(), 1);
    assert_eq!(plan.counts.lines_count, plan.baseline.geometry.lines.len() + 2);
}

#[test]
fn unknown_law_falls_back_to_category_heuristic_at_half_range() {
    let mut law = Law::new("law_40", "قانون بلا وصف");
    law.category = "غير معروف".into();
    let series = bars(96);
    let plan = build_draw_plan(&law, &series, &single_mapping(&law), &config());

    assert_eq!(plan.baseline.model.units.len(), 2);
    assert_eq!(plan.mapping_mode, MappingMode::CategoryHeuristic);
    assert!(plan.unknown_mapping);
    assert!(!plan.unknown_reason.trim().is_empty());
    assert_eq!(plan.target_ratio, Some(0.5));

    let last = plan.baseline.model.last_unit.as_ref().unwrap();
    let expected = last.low + last.range * 0.5;
    let line = &plan.law_specific.lines[0];
    assert_eq!(line.price, expected);
    assert_eq!(line.color, UNKNOWN_COLOR);
    assert!(plan.law_specific.bands.iter().all(|b| b.color == UNKNOWN_COLOR));
    assert!(plan.law_specific.markers.iter().all(|m| m.color == UNKNOWN_COLOR));
    assert!(plan.counts.law_specific_count >= 1);
}

#[test]
fn highlight_detection_on_adjacent_units() {
    let series = vec![
        Bar::new(0, 100.0, 110.0, 90.0, 105.0),
        Bar::new(60, 105.0, 108.0, 92.0, 100.0),
        Bar::new(120, 100.0, 115.0, 95.0, 110.0),
        Bar::new(180, 110.0, 112.0, 96.0, 111.0),
    ];
    let cfg = OverlayConfig {
        unit_size: 2,
        ..OverlayConfig::default()
    };
    let model = IndicatorModel::build(&series, &cfg);
    let c = model.comparison.expect("two units");
    assert!(c.break_high);
    assert!(!c.break_low);
    assert!(!c.inside);
    assert!(!c.both_sides_break);
}

#[test]
fn guided_law_from_bundled_catalog_uses_fallback() {
    let catalog = default_catalog().unwrap();
    let law = catalog.get("law_8").unwrap();
    let plan = build_draw_plan(law, &bars(48), &single_mapping(law), &config());
    assert!(plan.guided_input.is_some());
    assert!(plan.unknown_mapping);
    assert!(plan.unknown_reason.starts_with("guided input required"));
    assert!(plan.recipe.is_empty());

    // boundaries, dotted purple grid, zone, marker, label
    let fib = config().levels.len();
    assert_eq!(plan.law_specific.lines.len(), 2 + fib);
    assert_eq!(plan.law_specific.bands.len(), 1);
    assert_eq!(plan.law_specific.markers.len(), 1);
    assert_eq!(plan.counts.law_specific_count, 5 + fib);
    let grid: Vec<f64> = plan
        .law_specific
        .lines
        .iter()
        .filter(|l| l.color == UNKNOWN_COLOR && l.line_style == LineStyle::Dotted)
        .map(|l| l.price)
        .collect();
    assert_eq!(grid.len(), fib);
    assert!(grid.contains(&150.0));
}

fn arb_bars() -> impl Strategy<Value = Vec<Bar>> {
    prop::collection::vec((1.0f64..500.0, 0.0f64..50.0, 0.0f64..1.0), 0..150).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (low, span, pos))| {
                let high = low + span;
                let close = low + span * pos;
                Bar::new(i as i64 * 60, low, high, low, close)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn plans_are_idempotent(series in arb_bars(), pick in 0usize..30) {
        let catalog = default_catalog().unwrap();
        let law = catalog.iter().nth(pick % catalog.len()).unwrap();
        let mapping = single_mapping(law);
        let a = build_draw_plan(law, &series, &mapping, &config());
        let b = build_draw_plan(law, &series, &mapping, &config());
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }
}
