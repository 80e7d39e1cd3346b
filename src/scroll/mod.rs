//! Dual-pane scroll synchronization
//!
//! Keeps the source pane and the preview pane visually aligned by mapping
//! the scrolled fraction of one pane onto the other. The DOM stays on the
//! host side; the engine receives measured metrics per event and returns
//! the target scrollTop to apply, so proportions are always computed
//! against current content heights, never cached ones.
//!
//! Re-entrancy guard: the host marks which pane the pointer is over as
//! the active pane. Scroll events from the passive pane — including the
//! echo produced by programmatically setting its scrollTop — are ignored,
//! so synchronization can never feed back on itself.

use serde::{Deserialize, Serialize};

/// The two synchronized panes
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Pane {
    Source,
    Preview,
}

impl Pane {
    pub fn other(self) -> Pane {
        match self {
            Pane::Source => Pane::Preview,
            Pane::Preview => Pane::Source,
        }
    }
}

/// Host-measured geometry of one pane at event time
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    /// Scrollable range below the viewport; zero for degenerate panes.
    fn range(&self) -> f64 {
        (self.scroll_height - self.client_height).max(0.0)
    }

    /// Scrolled fraction in [0, 1]. Content shorter than the viewport
    /// maps to 0.
    pub fn fraction(&self) -> f64 {
        let range = self.range();
        if range <= 0.0 {
            0.0
        } else {
            (self.scroll_top / range).clamp(0.0, 1.0)
        }
    }

    /// scrollTop that puts this pane at the given fraction.
    pub fn top_for_fraction(&self, fraction: f64) -> f64 {
        self.range() * fraction.clamp(0.0, 1.0)
    }
}

/// Per-instance synchronizer state
#[derive(Debug, Default)]
pub struct ScrollSync {
    active: Option<Pane>,
}

impl ScrollSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the pane the user is interacting with (pointer enter).
    pub fn set_active(&mut self, pane: Pane) {
        self.active = Some(pane);
    }

    pub fn active(&self) -> Option<Pane> {
        self.active
    }

    /// Handle a scroll event on `pane`. Returns the scrollTop to apply to
    /// the other pane, or None when the event came from the passive pane
    /// (synchronization echo) and must not propagate.
    pub fn on_scroll(
        &mut self,
        pane: Pane,
        own: ScrollMetrics,
        other: ScrollMetrics,
    ) -> Option<f64> {
        if self.active != Some(pane) {
            return None;
        }
        Some(other.top_for_fraction(own.fraction()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(scroll_top: f64, scroll_height: f64, client_height: f64) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    #[test]
    fn test_fraction_is_bounded() {
        assert_eq!(metrics(0.0, 1000.0, 200.0).fraction(), 0.0);
        assert_eq!(metrics(800.0, 1000.0, 200.0).fraction(), 1.0);
        // Overscroll clamps rather than exceeding 1
        assert_eq!(metrics(900.0, 1000.0, 200.0).fraction(), 1.0);
        assert_eq!(metrics(-5.0, 1000.0, 200.0).fraction(), 0.0);
    }

    #[test]
    fn test_degenerate_pane_maps_to_zero() {
        assert_eq!(metrics(0.0, 100.0, 200.0).fraction(), 0.0);
        assert_eq!(metrics(0.0, 100.0, 200.0).top_for_fraction(0.7), 0.0);
    }

    #[test]
    fn test_mapping_round_trips_within_tolerance() {
        let source = metrics(300.0, 2000.0, 500.0);
        let preview = metrics(0.0, 5000.0, 500.0);

        let fraction = source.fraction();
        let target = preview.top_for_fraction(fraction);
        let echoed = metrics(target, 5000.0, 500.0).fraction();

        assert!((fraction - echoed).abs() < 1e-9);
    }

    #[test]
    fn test_active_pane_drives_sync() {
        let mut sync = ScrollSync::new();
        sync.set_active(Pane::Source);

        let own = metrics(750.0, 2000.0, 500.0); // halfway
        let other = metrics(0.0, 3000.0, 600.0);

        let target = sync.on_scroll(Pane::Source, own, other).unwrap();
        assert!((target - 1200.0).abs() < 1e-9);
    }

    #[test]
    fn test_echo_from_passive_pane_is_suppressed() {
        let mut sync = ScrollSync::new();
        sync.set_active(Pane::Source);

        // The programmatic set on the preview pane fires a scroll event;
        // it must not re-trigger synchronization
        let own = metrics(1200.0, 3000.0, 600.0);
        let other = metrics(750.0, 2000.0, 500.0);
        assert!(sync.on_scroll(Pane::Preview, own, other).is_none());
    }

    #[test]
    fn test_handoff_when_active_pane_changes() {
        let mut sync = ScrollSync::new();
        sync.set_active(Pane::Source);
        sync.set_active(Pane::Preview);

        let own = metrics(0.0, 3000.0, 600.0);
        let other = metrics(0.0, 2000.0, 500.0);

        assert!(sync.on_scroll(Pane::Preview, own, other).is_some());
        assert!(sync.on_scroll(Pane::Source, other, own).is_none());
    }

    #[test]
    fn test_mapping_is_monotonic() {
        let other = metrics(0.0, 4000.0, 400.0);
        let mut last = -1.0;
        for step in 0..=10 {
            let top = f64::from(step) * 160.0;
            let own = metrics(top, 2000.0, 400.0);
            let target = other.top_for_fraction(own.fraction());
            assert!(target >= last);
            last = target;
        }
    }
}
