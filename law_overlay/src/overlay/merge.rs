use std::{collections::HashSet, fmt};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::{
    overlay::signature::{BASELINE_SCOPE, RECIPE_SCOPE, Signature},
    plan::{BaselinePlan, DrawPlan, Geometry, Separator},
};

/// Everything to draw for the applied laws, with duplicates removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergedOverlay {
    /// Drawn once, shared by every applied law.
    pub baseline: Geometry,
    pub separators: Vec<Separator>,
    /// Law id → law-specific and recipe primitives first emitted by that law.
    pub laws: IndexMap<String, Geometry>,
    pub suppressed: Vec<Suppressed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suppressed {
    pub law_id: String,
    pub signature: String,
}

impl MergedOverlay {
    pub fn primitive_count(&self) -> usize {
        self.baseline.primitive_count() + self.laws.values().map(Geometry::primitive_count).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.primitive_count() == 0
    }
}

struct Dedup {
    seen: HashSet<String>,
    precision: u32,
    suppressed: Vec<Suppressed>,
}

impl Dedup {
    fn admit<T: Signature>(&mut self, owner: &str, scope: &str, item: &T) -> bool {
        let sig = item.signature(scope, self.precision);
        if self.seen.contains(&sig) {
            debug!(law = owner, signature = %sig, "suppressed duplicate primitive");
            self.suppressed.push(Suppressed {
                law_id: owner.to_string(),
                signature: sig,
            });
            false
        } else {
            self.seen.insert(sig);
            true
        }
    }

    fn absorb(&mut self, owner: &str, scope: &str, src: &Geometry, dst: &mut Geometry) {
        for l in &src.lines {
            if self.admit(owner, scope, l) {
                dst.lines.push(l.clone());
            }
        }
        for b in &src.bands {
            if self.admit(owner, scope, b) {
                dst.bands.push(b.clone());
            }
        }
        for m in &src.markers {
            if self.admit(owner, scope, m) {
                dst.markers.push(m.clone());
            }
        }
        for l in &src.labels {
            if self.admit(owner, scope, l) {
                dst.labels.push(l.clone());
            }
        }
    }
}

/// Merge per-law plans over one shared baseline.
///
/// The baseline is emitted once when at least one plan is present. Law-specific
/// primitives are scoped by law id; recipe primitives share one scope so that
/// identical recipe overlays from different laws collapse. The first emitter
/// owns a primitive.
pub fn merge_plans(baseline: &BaselinePlan, plans: &[DrawPlan], precision: u32) -> MergedOverlay {
    if plans.is_empty() {
        return MergedOverlay::default();
    }

    let mut dedup = Dedup {
        seen: HashSet::new(),
        precision,
        suppressed: Vec::new(),
    };

    let mut shared = Geometry::default();
    dedup.absorb(BASELINE_SCOPE, BASELINE_SCOPE, &baseline.geometry, &mut shared);

    let mut laws: IndexMap<String, Geometry> = IndexMap::with_capacity(plans.len());
    for plan in plans {
        let own = laws.entry(plan.law_id.clone()).or_default();
        dedup.absorb(&plan.law_id, &plan.law_id, &plan.law_specific, own);
        dedup.absorb(&plan.law_id, RECIPE_SCOPE, &plan.recipe, own);
    }

    MergedOverlay {
        baseline: shared,
        separators: baseline.separators.clone(),
        laws,
        suppressed: dedup.suppressed,
    }
}

impl fmt::Display for MergedOverlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote_any = false;
        let mut section = |title: &str, g: &Geometry| -> fmt::Result {
            if g.is_empty() {
                return Ok(());
            }
            if wrote_any {
                writeln!(f)?;
            }
            writeln!(f, "{title}")?;
            writeln!(f, "{}", "-".repeat(title.chars().count()))?;
            for l in &g.lines {
                writeln!(f, "+ line   {:>14.6}  {}", l.price, l.label)?;
            }
            for b in &g.bands {
                writeln!(f, "+ band   {:>14.6} .. {:.6}  {}", b.from, b.to, b.label)?;
            }
            for m in &g.markers {
                writeln!(f, "+ marker {:>14.6}  {}", m.price, m.text)?;
            }
            for l in &g.labels {
                writeln!(f, "+ label  {}", l.text)?;
            }
            wrote_any = true;
            Ok(())
        };

        section("Baseline", &self.baseline)?;
        for (id, g) in &self.laws {
            section(id, g)?;
        }

        if !wrote_any {
            return write!(f, "Nothing to draw");
        }
        if !self.suppressed.is_empty() {
            writeln!(f)?;
            writeln!(f, "Suppressed duplicates: {}", self.suppressed.len())?;
        }
        Ok(())
    }
}
