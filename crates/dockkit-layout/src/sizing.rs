//! Sizing policy: clamping, snapping, and priority ordering.
//!
//! # Invariants
//!
//! 1. [`clamp`] always returns a value inside `[min, max]` when `min <= max`;
//!    for inverted bounds the minimum wins.
//! 2. [`clamp_view`] never settles a snapping view strictly between `0` and
//!    its minimum.
//! 3. [`prioritize`] is a stable permutation of its input: it never adds,
//!    drops, or duplicates indexes.

use serde::{Deserialize, Serialize};

/// Maximum size meaning "no upper bound".
pub const UNBOUNDED: u32 = u32::MAX;

/// How eagerly a view absorbs size changes.
///
/// High-priority views are adjusted first, low-priority views last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutPriority {
    Low,
    #[default]
    Normal,
    High,
}

/// Initial size policy for a view being added (or freed space on removal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sizing {
    /// Explicit size in pixels.
    Size(u32),
    /// Split the space evenly across every flexible view after insertion.
    Distribute,
    /// Take half of the current size of the view at this index.
    Split(usize),
    /// Add hidden; `cached_visible_size` is restored when shown.
    Invisible { cached_visible_size: u32 },
}

impl From<u32> for Sizing {
    fn from(size: u32) -> Self {
        Self::Size(size)
    }
}

/// A size constraint that is either a constant or computed on each read.
pub enum SizeSource {
    Fixed(u32),
    Computed(Box<dyn Fn() -> u32>),
}

impl SizeSource {
    #[must_use]
    pub fn resolve(&self) -> u32 {
        match self {
            Self::Fixed(value) => *value,
            Self::Computed(compute) => compute(),
        }
    }
}

impl From<u32> for SizeSource {
    fn from(value: u32) -> Self {
        Self::Fixed(value)
    }
}

impl std::fmt::Debug for SizeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

#[inline]
pub(crate) fn saturate_u32(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}

/// Clamp `value` into `[min, max]`.
#[inline]
#[must_use]
pub fn clamp(value: i64, min: u32, max: u32) -> u32 {
    saturate_u32(value.min(i64::from(max)).max(i64::from(min)))
}

/// Smallest size a view may be driven to: `0` for snapping views.
#[inline]
#[must_use]
pub fn lower_bound(minimum: u32, snap: Option<u32>) -> u32 {
    if snap.is_some() { 0 } else { minimum }
}

/// Clamp with bistable snap behavior.
///
/// A snapping view asked for less than its minimum collapses to `0` when the
/// request is below `min(snap, minimum)` and pins at `minimum` otherwise.
#[must_use]
pub fn clamp_view(requested: i64, minimum: u32, maximum: u32, snap: Option<u32>) -> u32 {
    if let Some(snap) = snap
        && requested < i64::from(minimum)
    {
        let threshold = i64::from(snap.min(minimum));
        return if requested < threshold { 0 } else { minimum };
    }
    clamp(requested, minimum, maximum)
}

/// Move `value` to the front of `indexes`, keeping the rest in order.
///
/// Returns the input unchanged (as a new vector) when `value` is absent.
#[must_use]
pub fn push_to_start(indexes: &[usize], value: usize) -> Vec<usize> {
    if !indexes.contains(&value) {
        return indexes.to_vec();
    }
    std::iter::once(value)
        .chain(indexes.iter().copied().filter(|&i| i != value))
        .collect()
}

/// Move `value` to the back of `indexes`, keeping the rest in order.
#[must_use]
pub fn push_to_end(indexes: &[usize], value: usize) -> Vec<usize> {
    if !indexes.contains(&value) {
        return indexes.to_vec();
    }
    indexes
        .iter()
        .copied()
        .filter(|&i| i != value)
        .chain(std::iter::once(value))
        .collect()
}

/// Reorder `indexes` so every `high` index comes first and every `low`
/// index comes last. Each group keeps its order from `indexes`.
#[must_use]
pub fn prioritize(indexes: &[usize], high: &[usize], low: &[usize]) -> Vec<usize> {
    let in_order = |group: &[usize]| -> Vec<usize> {
        indexes
            .iter()
            .copied()
            .filter(|i| group.contains(i))
            .collect()
    };
    let ordered = in_order(high)
        .into_iter()
        .rev()
        .fold(indexes.to_vec(), |acc, i| push_to_start(&acc, i));
    in_order(low)
        .into_iter()
        .fold(ordered, |acc, i| push_to_end(&acc, i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn clamp_respects_bounds() {
        assert_eq!(clamp(-5, 10, 20), 10);
        assert_eq!(clamp(15, 10, 20), 15);
        assert_eq!(clamp(99, 10, 20), 20);
        assert_eq!(clamp(15, 30, 20), 30);
    }

    #[test]
    fn snap_collapses_below_threshold_and_pins_above() {
        assert_eq!(clamp_view(20, 50, UNBOUNDED, Some(30)), 0);
        assert_eq!(clamp_view(29, 50, UNBOUNDED, Some(30)), 0);
        assert_eq!(clamp_view(30, 50, UNBOUNDED, Some(30)), 50);
        assert_eq!(clamp_view(40, 50, UNBOUNDED, Some(30)), 50);
        assert_eq!(clamp_view(70, 50, UNBOUNDED, Some(30)), 70);
        assert_eq!(clamp_view(20, 50, UNBOUNDED, None), 50);
    }

    #[test]
    fn snap_threshold_is_capped_by_minimum() {
        assert_eq!(clamp_view(45, 40, 100, Some(80)), 40);
        assert_eq!(clamp_view(39, 40, 100, Some(80)), 0);
    }

    #[test]
    fn lower_bound_ignores_minimum_for_snapping_views() {
        assert_eq!(lower_bound(50, Some(30)), 0);
        assert_eq!(lower_bound(50, None), 50);
    }

    #[test]
    fn push_helpers_are_pure() {
        let base = vec![3, 2, 1, 0];
        assert_eq!(push_to_start(&base, 1), vec![1, 3, 2, 0]);
        assert_eq!(push_to_end(&base, 2), vec![3, 1, 0, 2]);
        assert_eq!(push_to_end(&base, 9), base);
        assert_eq!(base, vec![3, 2, 1, 0]);
    }

    #[test]
    fn prioritize_moves_high_first_and_low_last() {
        let order = prioritize(&[0, 1, 2, 3, 4], &[3], &[0, 2]);
        assert_eq!(order, vec![3, 1, 4, 0, 2]);
        assert_eq!(prioritize(&[0, 1, 2, 3], &[1, 3], &[]), vec![1, 3, 0, 2]);
        assert_eq!(prioritize(&[0, 1, 2, 3], &[3, 1], &[]), vec![1, 3, 0, 2]);
        assert_eq!(
            prioritize(&[3, 2, 1, 0], &[1, 3], &[0, 2]),
            vec![3, 1, 2, 0]
        );
    }

    #[test]
    fn size_source_resolves_each_read() {
        let counter = std::rc::Rc::new(std::cell::Cell::new(10));
        let source = {
            let counter = counter.clone();
            SizeSource::Computed(Box::new(move || counter.get()))
        };
        assert_eq!(source.resolve(), 10);
        counter.set(25);
        assert_eq!(source.resolve(), 25);
        assert_eq!(SizeSource::from(7).resolve(), 7);
    }

    proptest! {
        #[test]
        fn prioritize_is_a_permutation(
            len in 0usize..12,
            high in proptest::collection::vec(0usize..12, 0..4),
            low in proptest::collection::vec(0usize..12, 0..4),
        ) {
            let base: Vec<usize> = (0..len).rev().collect();
            let mut ordered = prioritize(&base, &high, &low);
            ordered.sort_unstable();
            let mut expected = base.clone();
            expected.sort_unstable();
            prop_assert_eq!(ordered, expected);
        }

        #[test]
        fn clamp_view_never_rests_between_zero_and_min(
            requested in -100i64..400,
            minimum in 1u32..200,
            snap in 1u32..200,
        ) {
            let size = clamp_view(requested, minimum, UNBOUNDED, Some(snap));
            prop_assert!(size == 0 || size >= minimum);
        }
    }
}
