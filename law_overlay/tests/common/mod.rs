#![allow(dead_code)]

use std::path::PathBuf;

use law_overlay::{
    Law, LawCatalog, MappingTable, OverlayConfig,
    mapping::{map_law, rules::default_rules},
};
use ohlc_bars::Bar;

pub fn sample_csv() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join("sample-data.csv")
}

/// `n` hourly bars oscillating between 100 and 200.
pub fn bars(n: usize) -> Vec<Bar> {
    (0..n)
        .map(|i| {
            let step = (i % 10) as f64;
            let low = 100.0 + step * 5.0;
            let high = if i % 10 == 9 { 200.0 } else { low + 20.0 };
            Bar::new(1_704_153_600 + i as i64 * 3600, low + 5.0, high, low, low + 10.0)
        })
        .collect()
}

pub fn catalog_of(laws: Vec<Law>) -> LawCatalog {
    LawCatalog::from_laws(laws).expect("valid test catalog").0
}

pub fn mapping_for(catalog: &LawCatalog) -> MappingTable {
    MappingTable::build(catalog, default_rules().expect("bundled rules"))
}

pub fn single_mapping(law: &Law) -> MappingTable {
    let mut t = MappingTable::default();
    t.insert(law.id.clone(), map_law(law, default_rules().expect("bundled rules")));
    t
}

pub fn config() -> OverlayConfig {
    OverlayConfig::default()
}
