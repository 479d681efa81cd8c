//! Explicit recipe overlays resolved against the last unit.

use tracing::warn;

use crate::{
    indicator::{levels::LineStyle, units::Unit},
    law::recipe::RecipeOverlay,
    plan::{Band, Geometry, Marker, MarkerShape, PriceLine, RECIPE_COLOR},
};

/// Overlays whose values cannot be resolved are skipped.
pub fn recipe_geometry(law_id: &str, overlays: &[RecipeOverlay], last: &Unit) -> Geometry {
    let mut g = Geometry::default();
    let color_or = |c: &Option<String>| c.clone().unwrap_or_else(|| RECIPE_COLOR.to_string());

    for (i, overlay) in overlays.iter().enumerate() {
        match overlay {
            RecipeOverlay::PriceLine {
                value,
                color,
                line_style,
                label,
            } => match value.resolve(last.low, last.high) {
                Some(price) => g.lines.push(PriceLine {
                    key: format!("{law_id}-recipe-line-{i}"),
                    price,
                    label: label.clone().unwrap_or_else(|| format!("{law_id} recipe")),
                    color: color_or(color),
                    line_style: line_style.unwrap_or(LineStyle::Solid),
                    line_width: 2,
                }),
                None => warn!(law = law_id, index = i, ?value, "skipping unresolved recipe price line"),
            },
            RecipeOverlay::Marker { price, color, text } => match price.resolve(last.low, last.high) {
                Some(p) => g.markers.push(Marker {
                    key: format!("{law_id}-recipe-marker-{i}"),
                    time: last.end_time,
                    price: p,
                    text: text.clone().unwrap_or_else(|| law_id.to_string()),
                    color: color_or(color),
                    shape: MarkerShape::Circle,
                }),
                None => warn!(law = law_id, index = i, ?price, "skipping unresolved recipe marker"),
            },
            RecipeOverlay::Zone {
                from,
                to,
                color,
                label,
            } => match (from.resolve(last.low, last.high), to.resolve(last.low, last.high)) {
                (Some(a), Some(b)) => g.bands.push(Band {
                    key: format!("{law_id}-recipe-zone-{i}"),
                    from: a.min(b),
                    to: a.max(b),
                    label: label.clone().unwrap_or_else(|| format!("{law_id} recipe zone")),
                    color: color_or(color),
                }),
                _ => warn!(law = law_id, index = i, ?from, ?to, "skipping unresolved recipe zone"),
            },
        }
    }
    g
}
