//! Bookkeeping for primitives handed to a chart renderer.
//!
//! The registry never touches a chart itself. It stores whatever opaque handle
//! the renderer returned, grouped by owning law id, and hands them back through
//! [`OverlayRemover`] when that law (or everything) is cleared.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::{
    overlay::{merge::MergedOverlay, signature::BASELINE_SCOPE},
    plan::{Band, Geometry, Marker, PriceLine},
};

/// Removal callbacks supplied by the renderer.
pub trait OverlayRemover<H> {
    fn remove_price_line(&mut self, handle: &H);
    fn hide_band(&mut self, handle: &H);
    /// Replace the full marker set; markers are not individually removable.
    fn set_markers(&mut self, markers: &[Marker]);
}

/// Drawing side of a renderer adapter.
pub trait OverlayRenderer<H>: OverlayRemover<H> {
    fn add_price_line(&mut self, line: &PriceLine) -> H;
    fn add_band(&mut self, band: &Band) -> H;
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegistryEntry<H> {
    pub price_lines: Vec<H>,
    pub markers: Vec<Marker>,
    pub bands: Vec<H>,
}

impl<H> Default for RegistryEntry<H> {
    fn default() -> Self {
        Self {
            price_lines: Vec::new(),
            markers: Vec::new(),
            bands: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LawStats {
    pub law_id: String,
    pub price_lines: usize,
    pub markers: usize,
    pub bands: usize,
}

#[derive(Debug)]
pub struct OverlayRegistry<H> {
    entries: IndexMap<String, RegistryEntry<H>>,
}

impl<H> Default for OverlayRegistry<H> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<H> OverlayRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure(&mut self, law_id: &str) -> &mut RegistryEntry<H> {
        self.entries.entry(law_id.to_string()).or_default()
    }

    pub fn add_price_line(&mut self, law_id: &str, handle: H) {
        self.ensure(law_id).price_lines.push(handle);
    }

    pub fn add_marker(&mut self, law_id: &str, marker: Marker) {
        self.ensure(law_id).markers.push(marker);
    }

    pub fn add_band(&mut self, law_id: &str, handle: H) {
        self.ensure(law_id).bands.push(handle);
    }

    /// All tracked markers, in registration order.
    pub fn markers(&self) -> Vec<Marker> {
        self.entries.values().flat_map(|e| e.markers.iter().cloned()).collect()
    }

    pub fn stats(&self) -> Vec<LawStats> {
        self.entries
            .iter()
            .map(|(law_id, e)| LawStats {
                law_id: law_id.clone(),
                price_lines: e.price_lines.len(),
                markers: e.markers.len(),
                bands: e.bands.len(),
            })
            .collect()
    }

    /// Remove one law's primitives. Unknown ids are a no-op. The renderer's
    /// marker set is reset to the markers still tracked.
    pub fn clear_law<R: OverlayRemover<H> + ?Sized>(&mut self, law_id: &str, remover: &mut R) {
        if let Some(entry) = self.entries.shift_remove(law_id) {
            release(&entry, &mut *remover);
            if !entry.markers.is_empty() {
                remover.set_markers(&self.markers());
            }
        }
    }

    /// Remove everything. Safe to call on an empty registry.
    pub fn clear_all<R: OverlayRemover<H> + ?Sized>(&mut self, remover: &mut R) {
        for (_, entry) in self.entries.drain(..) {
            release(&entry, &mut *remover);
        }
        remover.set_markers(&[]);
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn has(&self, law_id: &str) -> bool {
        self.entries.contains_key(law_id)
    }

    /// Clear, then draw `merged` through `renderer`. Baseline primitives are
    /// owned by the `baseline` entry.
    pub fn rebuild<R: OverlayRenderer<H> + ?Sized>(&mut self, merged: &MergedOverlay, renderer: &mut R) {
        self.clear_all(&mut *renderer);
        self.draw(BASELINE_SCOPE, &merged.baseline, &mut *renderer);
        for (law_id, g) in &merged.laws {
            self.draw(law_id, g, &mut *renderer);
        }
        renderer.set_markers(&self.markers());
        debug!(owners = self.size(), "registry rebuilt");
    }

    fn draw<R: OverlayRenderer<H> + ?Sized>(&mut self, owner: &str, g: &Geometry, renderer: &mut R) {
        for l in &g.lines {
            let h = renderer.add_price_line(l);
            self.add_price_line(owner, h);
        }
        for b in &g.bands {
            let h = renderer.add_band(b);
            self.add_band(owner, h);
        }
        for m in &g.markers {
            self.add_marker(owner, m.clone());
        }
    }
}

fn release<H, R: OverlayRemover<H> + ?Sized>(entry: &RegistryEntry<H>, remover: &mut R) {
    for h in &entry.price_lines {
        remover.remove_price_line(h);
    }
    for h in &entry.bands {
        remover.hide_band(h);
    }
}

/// Token for one render attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleToken(u64);

/// Last-writer-wins guard between plan computation and registry commit.
///
/// Each recomputation takes a token with [`RenderCycle::begin`]; only the most
/// recent token can commit. Older results are dropped without touching the
/// registry, so a renderer never sees an interleaved merge.
#[derive(Debug, Default)]
pub struct RenderCycle {
    latest: u64,
}

impl RenderCycle {
    pub fn begin(&mut self) -> CycleToken {
        self.latest += 1;
        CycleToken(self.latest)
    }

    pub fn is_current(&self, token: CycleToken) -> bool {
        token.0 == self.latest
    }

    /// Rebuild `registry` from `merged` if `token` is still current.
    pub fn commit<H, R: OverlayRenderer<H> + ?Sized>(
        &self,
        token: CycleToken,
        registry: &mut OverlayRegistry<H>,
        merged: &MergedOverlay,
        renderer: &mut R,
    ) -> bool {
        if !self.is_current(token) {
            debug!(token = token.0, latest = self.latest, "discarding stale render cycle");
            return false;
        }
        registry.rebuild(merged, renderer);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        next: u32,
        live_lines: Vec<u32>,
        live_bands: Vec<u32>,
        markers: usize,
    }

    impl OverlayRemover<u32> for Recorder {
        fn remove_price_line(&mut self, handle: &u32) {
            self.live_lines.retain(|h| h != handle);
        }
        fn hide_band(&mut self, handle: &u32) {
            self.live_bands.retain(|h| h != handle);
        }
        fn set_markers(&mut self, markers: &[Marker]) {
            self.markers = markers.len();
        }
    }

    impl OverlayRenderer<u32> for Recorder {
        fn add_price_line(&mut self, _line: &PriceLine) -> u32 {
            self.next += 1;
            self.live_lines.push(self.next);
            self.next
        }
        fn add_band(&mut self, _band: &Band) -> u32 {
            self.next += 1;
            self.live_bands.push(self.next);
            self.next
        }
    }

    #[test]
    fn clear_all_on_empty_registry_is_a_no_op() {
        let mut reg: OverlayRegistry<u32> = OverlayRegistry::new();
        let mut r = Recorder::default();
        reg.clear_all(&mut r);
        reg.clear_all(&mut r);
        assert_eq!(reg.size(), 0);
    }

    #[test]
    fn clear_law_releases_only_that_law() {
        let mut reg = OverlayRegistry::new();
        let mut r = Recorder::default();
        let a = r.add_price_line(&dummy_line());
        let b = r.add_price_line(&dummy_line());
        let c = r.add_band(&dummy_band());
        reg.add_price_line("law_1", a);
        reg.add_price_line("law_2", b);
        reg.add_band("law_2", c);

        reg.clear_law("law_2", &mut r);
        assert!(reg.has("law_1"));
        assert!(!reg.has("law_2"));
        assert_eq!(r.live_lines, vec![a]);
        assert!(r.live_bands.is_empty());

        reg.clear_law("law_404", &mut r);
        assert_eq!(reg.size(), 1);
    }

    #[test]
    fn clearing_resets_the_renderer_marker_set() {
        let mut reg: OverlayRegistry<u32> = OverlayRegistry::new();
        let mut r = Recorder::default();
        reg.add_marker("law_1", dummy_marker());
        reg.add_marker("law_2", dummy_marker());
        reg.add_marker("law_2", dummy_marker());
        r.set_markers(&reg.markers());
        assert_eq!(r.markers, 3);

        reg.clear_law("law_2", &mut r);
        assert_eq!(r.markers, 1);

        reg.clear_all(&mut r);
        assert_eq!(r.markers, 0);
        reg.clear_all(&mut r);
        assert_eq!(r.markers, 0);
    }

    #[test]
    fn stats_per_law() {
        let mut reg = OverlayRegistry::new();
        reg.add_price_line("law_1", 1u32);
        reg.add_price_line("law_1", 2u32);
        reg.add_band("law_1", 3u32);
        reg.add_marker("law_3", dummy_marker());
        let stats = reg.stats();
        assert_eq!(
            stats,
            vec![
                LawStats {
                    law_id: "law_1".into(),
                    price_lines: 2,
                    markers: 0,
                    bands: 1
                },
                LawStats {
                    law_id: "law_3".into(),
                    price_lines: 0,
                    markers: 1,
                    bands: 0
                },
            ]
        );
        assert_eq!(reg.markers().len(), 1);
    }

    #[test]
    fn stale_cycle_does_not_commit() {
        let mut cycle = RenderCycle::default();
        let mut reg = OverlayRegistry::new();
        let mut r = Recorder::default();
        let mut merged = MergedOverlay::default();
        merged.baseline.lines.push(dummy_line());

        let old = cycle.begin();
        let new = cycle.begin();
        assert!(!cycle.commit(old, &mut reg, &merged, &mut r));
        assert_eq!(reg.size(), 0);
        assert!(cycle.commit(new, &mut reg, &merged, &mut r));
        assert_eq!(r.live_lines.len(), 1);

        // committing again rebuilds from scratch instead of stacking
        assert!(cycle.commit(new, &mut reg, &merged, &mut r));
        assert_eq!(r.live_lines.len(), 1);
        assert_eq!(reg.stats()[0].price_lines, 1);
    }

    fn dummy_line() -> PriceLine {
        PriceLine {
            key: "l".into(),
            price: 1.0,
            label: "l".into(),
            color: "#000".into(),
            line_style: crate::indicator::levels::LineStyle::Solid,
            line_width: 1,
        }
    }

    fn dummy_band() -> Band {
        Band {
            key: "b".into(),
            from: 1.0,
            to: 2.0,
            label: "b".into(),
            color: "#000".into(),
        }
    }

    fn dummy_marker() -> Marker {
        Marker {
            key: "m".into(),
            time: 0,
            price: 1.0,
            text: "m".into(),
            color: "#000".into(),
            shape: crate::plan::MarkerShape::Circle,
        }
    }
}
