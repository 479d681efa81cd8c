//! Explicit chart state: bars, applied laws, catalog and mapping.
//!
//! All pipeline entry points take their inputs from a [`ChartSession`]; nothing
//! is read from process-wide state.

use indexmap::IndexSet;
use ohlc_bars::Bar;
use once_cell::unsync::OnceCell;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    config::OverlayConfig,
    law::LawCatalog,
    mapping::{MappingEntry, MappingTable},
    overlay::merge::{MergedOverlay, merge_plans},
    plan::{BaselinePlan, DrawPlan, build_draw_plan_with_baseline},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("law {0:?} is not in the catalog")]
    UnknownLaw(String),
}

#[derive(Debug)]
pub struct ChartSession {
    bars: Vec<Bar>,
    applied: IndexSet<String>,
    catalog: LawCatalog,
    mapping: MappingTable,
    config: OverlayConfig,
    baseline: OnceCell<BaselinePlan>,
}

impl ChartSession {
    pub fn new(catalog: LawCatalog, mapping: MappingTable, config: OverlayConfig) -> Self {
        Self {
            bars: Vec::new(),
            applied: IndexSet::new(),
            catalog,
            mapping,
            config,
            baseline: OnceCell::new(),
        }
    }

    /// Replace the bar set. The cached baseline is dropped.
    pub fn set_bars(&mut self, bars: Vec<Bar>) {
        debug!(bars = bars.len(), "session bars replaced");
        self.bars = bars;
        self.baseline = OnceCell::new();
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn catalog(&self) -> &LawCatalog {
        &self.catalog
    }

    pub fn mapping(&self) -> &MappingTable {
        &self.mapping
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Applied law ids in application order.
    pub fn applied(&self) -> impl Iterator<Item = &str> {
        self.applied.iter().map(String::as_str)
    }

    /// Returns `false` if the law was already applied.
    pub fn apply_law(&mut self, law_id: &str) -> Result<bool, SessionError> {
        if !self.catalog.contains(law_id) {
            return Err(SessionError::UnknownLaw(law_id.to_string()));
        }
        Ok(self.applied.insert(law_id.to_string()))
    }

    pub fn remove_law(&mut self, law_id: &str) -> bool {
        self.applied.shift_remove(law_id)
    }

    pub fn clear_laws(&mut self) {
        self.applied.clear();
    }

    /// Shared baseline for the current bars, computed on first use.
    pub fn baseline(&self) -> &BaselinePlan {
        self.baseline
            .get_or_init(|| BaselinePlan::build(&self.bars, &self.config))
    }

    pub fn plan_for(&self, law_id: &str) -> Result<DrawPlan, SessionError> {
        let law = self
            .catalog
            .get(law_id)
            .ok_or_else(|| SessionError::UnknownLaw(law_id.to_string()))?;
        let missing;
        let entry = match self.mapping.get(law_id) {
            Some(e) => e,
            None => {
                missing = MappingEntry::missing();
                &missing
            }
        };
        Ok(build_draw_plan_with_baseline(law, self.baseline(), entry))
    }

    /// Like [`Self::plan_for`], but an unknown id yields an empty plan.
    pub fn plan_for_or_empty(&self, law_id: &str) -> DrawPlan {
        self.plan_for(law_id).unwrap_or_else(|err| {
            warn!(%err, "drawing empty plan");
            DrawPlan::empty(law_id)
        })
    }

    /// Plans for every applied law, in application order.
    pub fn plans(&self) -> Vec<DrawPlan> {
        self.applied.iter().map(|id| self.plan_for_or_empty(id)).collect()
    }

    pub fn merged(&self) -> MergedOverlay {
        merge_plans(self.baseline(), &self.plans(), self.config.signature_precision)
    }
}
