//! Law-independent scaffolding drawn once per bar set.

use ohlc_bars::Bar;
use serde::Serialize;

use crate::{
    config::OverlayConfig,
    indicator::{IndicatorModel, levels::LineStyle},
    plan::{
        Band, FIB_236_COLOR, FIB_COLOR, GOLDEN_ZONE_COLOR, Geometry, HL_COLOR, HTF_COLOR, Label,
        Marker, MarkerShape, PriceLine, Separator,
    },
};

/// Golden zone bounds as fractions of the last unit's range.
pub const GOLDEN_ZONE: (f64, f64) = (0.236, 0.382);

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BaselinePlan {
    #[serde(skip)]
    pub model: IndicatorModel,
    pub separators: Vec<Separator>,
    pub geometry: Geometry,
}

impl BaselinePlan {
    pub fn build(bars: &[Bar], cfg: &OverlayConfig) -> Self {
        Self::from_model(IndicatorModel::build(bars, cfg), cfg)
    }

    pub fn from_model(model: IndicatorModel, cfg: &OverlayConfig) -> Self {
        let Some(last) = model.last_unit.clone() else {
            return Self {
                model,
                ..Self::default()
            };
        };

        let separators = model
            .units
            .iter()
            .map(|u| Separator {
                key: format!("sep-{}", u.id),
                time: u.start_time,
            })
            .collect();

        let mut lines = vec![
            boundary_line("baseline-hl-high", last.high, "HL High"),
            boundary_line("baseline-hl-low", last.low, "HL Low"),
        ];
        lines.extend(model.fib.iter().map(|f| PriceLine {
            key: format!("baseline-fib-{}", f.ratio),
            price: f.price,
            label: format!("Fib {}", f.ratio),
            color: if f.ratio.abs() == 0.236 { FIB_236_COLOR } else { FIB_COLOR }.to_string(),
            line_style: f.line_style,
            line_width: f.line_width,
        }));
        if cfg.include_htf {
            lines.extend(model.htf_fib.iter().map(|f| PriceLine {
                key: format!("baseline-htf-{}", f.ratio),
                price: f.price,
                label: format!("HTF {}", f.ratio),
                color: HTF_COLOR.to_string(),
                line_style: LineStyle::Dotted,
                line_width: 1,
            }));
        }

        let bands = if last.has_range() {
            vec![Band {
                key: "baseline-band-0236-0382".to_string(),
                from: last.low + last.range * GOLDEN_ZONE.0,
                to: last.low + last.range * GOLDEN_ZONE.1,
                label: "المنطقة الذهبية".to_string(),
                color: GOLDEN_ZONE_COLOR.to_string(),
            }]
        } else {
            Vec::new()
        };

        let markers = vec![Marker {
            key: "baseline-marker".to_string(),
            time: last.end_time,
            price: last.close,
            text: "BASELINE".to_string(),
            color: GOLDEN_ZONE_COLOR.to_string(),
            shape: MarkerShape::Circle,
        }];

        let labels = model
            .enabled_highlights()
            .map(|h| Label {
                key: format!("baseline-hlx-{}", h.key),
                text: h.key.to_string(),
            })
            .collect();

        Self {
            separators,
            geometry: Geometry {
                lines,
                bands,
                markers,
                labels,
            },
            model,
        }
    }
}

fn boundary_line(key: &str, price: f64, label: &str) -> PriceLine {
    PriceLine {
        key: key.to_string(),
        price,
        label: label.to_string(),
        color: HL_COLOR.to_string(),
        line_style: LineStyle::Dashed,
        line_width: 1,
    }
}
