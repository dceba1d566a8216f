//! Property-based invariant tests for the split view engine.
//!
//! 1. Sash count is always one less than the view count.
//! 2. Sizes sum to the layout size whenever that size is feasible.
//! 3. Laying out twice at the same size is idempotent.
//! 4. Every size stays within its view's bounds after any resize.
//! 5. A completed drag conserves the total.

use dockkit_core::{Emitter, Event, Orientation};
use dockkit_layout::{SplitView, Sizing, View, ViewChange};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

struct Bounded {
    min: u32,
    max: u32,
    changes: Emitter<ViewChange>,
}

impl View for Bounded {
    fn minimum_size(&self) -> u32 {
        self.min
    }
    fn maximum_size(&self) -> u32 {
        self.max
    }
    fn on_did_change(&self) -> Event<ViewChange> {
        self.changes.event()
    }
    fn layout(&mut self, _size: u32, _orthogonal_size: u32) {}
}

fn bounds_strategy() -> impl Strategy<Value = Vec<(u32, u32)>> {
    prop::collection::vec((0u32..80, 0u32..400), 1..8)
}

fn engine(bounds: &[(u32, u32)], proportional: bool) -> SplitView<Bounded> {
    let mut splitview = SplitView::with_proportional_layout(Orientation::Horizontal, proportional);
    for &(min, extra) in bounds {
        splitview
            .push_view(
                Bounded {
                    min,
                    max: min + extra,
                    changes: Emitter::new(),
                },
                Sizing::Distribute,
            )
            .expect("append");
    }
    splitview
}

fn feasible(bounds: &[(u32, u32)], total: u32) -> bool {
    let min: u32 = bounds.iter().map(|&(min, _)| min).sum();
    let max: u32 = bounds.iter().map(|&(min, extra)| min + extra).sum();
    (min..=max).contains(&total)
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Sash count
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn sash_count_follows_structure(
        bounds in bounds_strategy(),
        removals in prop::collection::vec(any::<prop::sample::Index>(), 0..6),
    ) {
        let mut splitview = engine(&bounds, true);
        splitview.layout(600, 40);
        prop_assert_eq!(splitview.sash_count(), splitview.len() - 1);

        for removal in removals {
            if splitview.is_empty() {
                break;
            }
            let index = removal.index(splitview.len());
            splitview.remove_view(index, None).expect("in range");
            prop_assert_eq!(splitview.sash_count(), splitview.len().saturating_sub(1));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2-3. Layout sum and idempotence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn feasible_layout_fills_exactly(
        bounds in bounds_strategy(),
        proportional in any::<bool>(),
        first in 0u32..3000,
        second in 0u32..3000,
    ) {
        let mut splitview = engine(&bounds, proportional);
        splitview.layout(first, 40);
        if feasible(&bounds, first) {
            prop_assert_eq!(splitview.sizes().iter().sum::<u32>(), first);
        }
        splitview.layout(second, 40);
        if feasible(&bounds, second) {
            prop_assert_eq!(splitview.sizes().iter().sum::<u32>(), second);
        }
    }

    #[test]
    fn repeated_layout_is_idempotent(
        bounds in bounds_strategy(),
        proportional in any::<bool>(),
        total in 0u32..3000,
    ) {
        let mut splitview = engine(&bounds, proportional);
        splitview.layout(total, 40);
        let once = splitview.sizes();
        splitview.layout(total, 40);
        prop_assert_eq!(splitview.sizes(), once);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4-5. Resizes and drags
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn resize_keeps_bounds_and_total(
        bounds in bounds_strategy(),
        target in any::<prop::sample::Index>(),
        requested in 0u32..1000,
    ) {
        let mut splitview = engine(&bounds, true);
        let total: u32 = bounds.iter().map(|&(min, extra)| min + extra / 2).sum();
        splitview.layout(total, 40);

        let index = target.index(bounds.len());
        splitview.resize_view(index, requested).expect("in range");

        for (size, &(min, extra)) in splitview.sizes().iter().zip(&bounds) {
            prop_assert!(*size >= min && *size <= min + extra);
        }
        prop_assert_eq!(splitview.sizes().iter().sum::<u32>(), total);
    }

    #[test]
    fn drag_conserves_total(
        bounds in prop::collection::vec((0u32..80, 0u32..400), 2..8),
        sash in any::<prop::sample::Index>(),
        moves in prop::collection::vec(-500i32..500, 1..5),
    ) {
        let mut splitview = engine(&bounds, true);
        let total: u32 = bounds.iter().map(|&(min, extra)| min + extra / 2).sum();
        splitview.layout(total, 40);

        let sash_index = sash.index(splitview.sash_count());
        let origin = f64::from(splitview.sash_position(sash_index).expect("sash"));
        splitview.begin_sash_drag(sash_index, origin).expect("begin");
        for offset in moves {
            splitview.drag_sash_to(origin + f64::from(offset)).expect("drag");
            prop_assert_eq!(splitview.sizes().iter().sum::<u32>(), total);
        }
        splitview.end_sash_drag().expect("end");
        prop_assert_eq!(splitview.sizes().iter().sum::<u32>(), total);
    }
}
