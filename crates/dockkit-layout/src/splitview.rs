//! Linear layout engine.
//!
//! A [`SplitView`] arranges an ordered list of views along one axis, keeps a
//! sash (divider) between every adjacent pair, and redistributes space under
//! each view's minimum, maximum, and snap constraints.
//!
//! # Design
//!
//! Every size change funnels through one resize pass pivoting at an index:
//!
//! ```text
//!   up   = [pivot, pivot-1, .., 0]     grows by the requested delta
//!   down = [pivot+1, .., last]         shrinks by what `up` realized
//! ```
//!
//! Both partitions are reordered by priority (high first, low last) before
//! the greedy walks, and the requested delta is clamped against the
//! aggregate slack of both sides so content size is conserved.
//!
//! # Invariants
//!
//! 1. `sash_count() == len() - 1` for every non-empty engine.
//! 2. After `layout`, `resize_view`, or a completed drag, the sum of sizes
//!    equals the layout size whenever that size lies inside the aggregate
//!    minimum and maximum.
//! 3. `layout(s, o)` twice in a row yields identical sizes.
//! 4. A hidden item reports minimum = maximum = 0 and keeps its last visible
//!    size as the cached visible size.
//!
//! # Failure Modes
//!
//! - Index arguments out of range raise [`LayoutError::IndexOutOfRange`];
//!   [`SplitView::view_size`] alone answers `None`.
//! - Constraints that cannot be met are clamped, never reported.
//! - Structural changes during a sash drag cancel the drag.

use std::cell::RefCell;
use std::rc::Rc;

use dockkit_core::{DisposeReport, Emitter, Event, Orientation, Subscription};
use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::sizing::{
    LayoutPriority, Sizing, UNBOUNDED, clamp, clamp_view, lower_bound, prioritize, saturate_u32,
};
use crate::view::{View, ViewChange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ItemId(u64);

type PendingQueue = Rc<RefCell<Vec<(ItemId, Option<u32>)>>>;

// ---------------------------------------------------------------------------
// Sashes
// ---------------------------------------------------------------------------

/// Which directions a sash can currently move in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SashState {
    /// Neither side can give or take space.
    Disabled,
    /// Already at its minimum position; can only move forward.
    Minimum,
    /// Already at its maximum position; can only move back.
    Maximum,
    #[default]
    Enabled,
}

/// Divider between two adjacent items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sash {
    pub state: SashState,
    /// Sum of the sizes of all items before this sash.
    pub position: u32,
}

/// Divider drag lifecycle.
///
/// ```text
/// Idle -> Dragging -> Idle
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SashDragState {
    #[default]
    Idle,
    Dragging {
        sash_index: usize,
        origin: f64,
        /// Item sizes when the drag started.
        sizes: Vec<u32>,
    },
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

struct ViewItem<V> {
    id: ItemId,
    view: V,
    size: u32,
    cached_visible_size: Option<u32>,
    _subscription: Subscription,
}

impl<V: View> ViewItem<V> {
    fn visible(&self) -> bool {
        self.cached_visible_size.is_none()
    }

    fn minimum_size(&self) -> u32 {
        if self.visible() {
            self.view.minimum_size()
        } else {
            0
        }
    }

    fn maximum_size(&self) -> u32 {
        if self.visible() {
            self.view.maximum_size()
        } else {
            0
        }
    }

    fn snap_size(&self) -> Option<u32> {
        if self.visible() {
            self.view.snap_size()
        } else {
            None
        }
    }

    fn lower_bound(&self) -> u32 {
        lower_bound(self.minimum_size(), self.snap_size())
    }

    fn clamp(&self, requested: i64) -> u32 {
        clamp_view(
            requested,
            self.minimum_size(),
            self.maximum_size(),
            self.snap_size(),
        )
    }

    fn set_visible(&mut self, visible: bool) {
        if visible == self.visible() {
            return;
        }
        if visible {
            let cached = self.cached_visible_size.take().unwrap_or(self.size);
            self.size = clamp(
                i64::from(cached),
                self.view.minimum_size(),
                self.view.maximum_size(),
            );
        } else {
            self.cached_visible_size = Some(self.size);
            self.size = 0;
        }
        self.view.set_visible(visible);
    }

    fn into_parts(self) -> (V, u32, Option<u32>) {
        let ViewItem {
            view,
            size,
            cached_visible_size,
            ..
        } = self;
        (view, size, cached_visible_size)
    }
}

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

/// One view of a [`SplitViewDescriptor`].
#[derive(Debug)]
pub struct ViewDescriptor<V> {
    pub view: V,
    pub size: u32,
    pub visible: bool,
}

/// Bulk construction input: views are added in order without intermediate
/// layouts.
#[derive(Debug)]
pub struct SplitViewDescriptor<V> {
    /// Total size along the split axis the `views` sizes were taken at.
    pub size: u32,
    pub views: Vec<ViewDescriptor<V>>,
}

// ---------------------------------------------------------------------------
// SplitView
// ---------------------------------------------------------------------------

/// Single-axis resizable item manager.
pub struct SplitView<V: View> {
    orientation: Orientation,
    items: Vec<ViewItem<V>>,
    sashes: Vec<Sash>,
    size: u32,
    orthogonal_size: u32,
    content_size: u32,
    proportional_layout: bool,
    proportions: Option<Vec<Option<f64>>>,
    laid_out: bool,
    drag: SashDragState,
    next_item_id: u64,
    pending: PendingQueue,
    on_did_sash_end: Emitter<()>,
    on_did_add_view: Emitter<usize>,
    on_did_remove_view: Emitter<usize>,
}

impl<V: View> SplitView<V> {
    /// Empty engine with proportional layout enabled.
    #[must_use]
    pub fn new(orientation: Orientation) -> Self {
        Self::with_proportional_layout(orientation, true)
    }

    #[must_use]
    pub fn with_config(orientation: Orientation, config: &LayoutConfig) -> Self {
        Self::with_proportional_layout(orientation, config.proportional_layout)
    }

    #[must_use]
    pub fn with_proportional_layout(orientation: Orientation, proportional_layout: bool) -> Self {
        Self {
            orientation,
            items: Vec::new(),
            sashes: Vec::new(),
            size: 0,
            orthogonal_size: 0,
            content_size: 0,
            proportional_layout,
            proportions: None,
            laid_out: false,
            drag: SashDragState::Idle,
            next_item_id: 1,
            pending: Rc::new(RefCell::new(Vec::new())),
            on_did_sash_end: Emitter::new(),
            on_did_add_view: Emitter::new(),
            on_did_remove_view: Emitter::new(),
        }
    }

    /// Build from a descriptor without laying anything out.
    ///
    /// The descriptor's sizes become the proportions snapshot, so the first
    /// [`layout`](Self::layout) rescales them to the real size.
    #[must_use]
    pub fn from_descriptor(
        orientation: Orientation,
        proportional_layout: bool,
        descriptor: SplitViewDescriptor<V>,
    ) -> Self {
        let mut splitview = Self::with_proportional_layout(orientation, proportional_layout);
        splitview.size = descriptor.size;
        for entry in descriptor.views {
            let cached = (!entry.visible).then_some(entry.size);
            let size = if entry.visible { entry.size } else { 0 };
            let index = splitview.items.len();
            splitview.insert_item(entry.view, size, cached, index);
        }
        splitview.save_proportions();
        splitview
    }

    // --- accessors ---------------------------------------------------------

    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Change the axis label; sizes are kept as they are.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total size along the split axis from the last layout.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[must_use]
    pub fn orthogonal_size(&self) -> u32 {
        self.orthogonal_size
    }

    /// Sum of item sizes as of the last physical layout.
    #[must_use]
    pub fn content_size(&self) -> u32 {
        self.content_size
    }

    #[must_use]
    pub fn proportional_layout(&self) -> bool {
        self.proportional_layout
    }

    #[must_use]
    pub fn proportions(&self) -> Option<&[Option<f64>]> {
        self.proportions.as_deref()
    }

    /// Sum of the items' minimum sizes.
    #[must_use]
    pub fn minimum_size(&self) -> u32 {
        saturating_sum(self.items.iter().map(ViewItem::minimum_size))
    }

    /// Sum of the items' maximum sizes, saturating at [`UNBOUNDED`].
    #[must_use]
    pub fn maximum_size(&self) -> u32 {
        saturating_sum(self.items.iter().map(ViewItem::maximum_size))
    }

    /// Current size of the view at `index`, or `None` when out of range.
    #[must_use]
    pub fn view_size(&self, index: usize) -> Option<u32> {
        self.items.get(index).map(|item| item.size)
    }

    #[must_use]
    pub fn sizes(&self) -> Vec<u32> {
        self.items.iter().map(|item| item.size).collect()
    }

    #[must_use]
    pub fn view(&self, index: usize) -> Option<&V> {
        self.items.get(index).map(|item| &item.view)
    }

    pub fn view_mut(&mut self, index: usize) -> Option<&mut V> {
        self.items.get_mut(index).map(|item| &mut item.view)
    }

    pub fn views(&self) -> impl Iterator<Item = &V> {
        self.items.iter().map(|item| &item.view)
    }

    pub fn is_view_visible(&self, index: usize) -> Result<bool, LayoutError> {
        self.item(index, "is_view_visible").map(ViewItem::visible)
    }

    /// Size a hidden view returns to when shown again.
    pub fn view_cached_visible_size(&self, index: usize) -> Result<Option<u32>, LayoutError> {
        self.item(index, "view_cached_visible_size")
            .map(|item| item.cached_visible_size)
    }

    #[must_use]
    pub fn sash_count(&self) -> usize {
        self.sashes.len()
    }

    #[must_use]
    pub fn sash(&self, index: usize) -> Option<Sash> {
        self.sashes.get(index).copied()
    }

    #[must_use]
    pub fn sash_state(&self, index: usize) -> Option<SashState> {
        self.sashes.get(index).map(|sash| sash.state)
    }

    #[must_use]
    pub fn sash_position(&self, index: usize) -> Option<u32> {
        self.sashes.get(index).map(|sash| sash.position)
    }

    #[must_use]
    pub fn drag_state(&self) -> &SashDragState {
        &self.drag
    }

    /// Fires once a divider drag completes.
    #[must_use]
    pub fn on_did_sash_end(&self) -> Event<()> {
        self.on_did_sash_end.event()
    }

    /// Fires with the insertion index of every added view.
    #[must_use]
    pub fn on_did_add_view(&self) -> Event<usize> {
        self.on_did_add_view.event()
    }

    /// Fires with the former index of every removed view.
    #[must_use]
    pub fn on_did_remove_view(&self) -> Event<usize> {
        self.on_did_remove_view.event()
    }

    #[must_use]
    pub fn has_pending_changes(&self) -> bool {
        !self.pending.borrow().is_empty()
    }

    // --- structure ---------------------------------------------------------

    /// Append `view`.
    pub fn push_view(&mut self, view: V, sizing: Sizing) -> Result<(), LayoutError> {
        let index = self.items.len();
        self.add_view(view, sizing, index)
    }

    /// Insert `view` at `index` (`0..=len`).
    pub fn add_view(&mut self, view: V, sizing: Sizing, index: usize) -> Result<(), LayoutError> {
        self.add_view_inner(view, sizing, index, false)
    }

    pub(crate) fn add_view_inner(
        &mut self,
        view: V,
        sizing: Sizing,
        index: usize,
        skip_layout: bool,
    ) -> Result<(), LayoutError> {
        if index > self.items.len() {
            return Err(LayoutError::out_of_range("add_view", index, self.items.len()));
        }
        let (size, cached) = match sizing {
            Sizing::Size(size) => (size, None),
            Sizing::Distribute => (view.minimum_size(), None),
            Sizing::Split(other) => {
                let Some(other_size) = self.view_size(other) else {
                    return Err(LayoutError::out_of_range(
                        "add_view split",
                        other,
                        self.items.len(),
                    ));
                };
                (other_size / 2, None)
            }
            Sizing::Invisible {
                cached_visible_size,
            } => (0, Some(cached_visible_size)),
        };
        self.cancel_drag();
        self.insert_item(view, size, cached, index);
        dockkit_core::debug!(index, size, views = self.items.len(), "splitview add_view");

        if !skip_layout {
            self.relayout(&[index], &[]);
            if sizing == Sizing::Distribute {
                self.distribute_view_sizes();
            }
        }
        self.on_did_add_view.fire(&index);
        Ok(())
    }

    fn insert_item(&mut self, mut view: V, size: u32, cached: Option<u32>, index: usize) {
        let id = ItemId(self.next_item_id);
        self.next_item_id += 1;
        let pending = Rc::clone(&self.pending);
        let subscription = view.on_did_change().subscribe(move |change: &ViewChange| {
            pending.borrow_mut().push((id, change.size));
        });
        if cached.is_some() {
            view.set_visible(false);
        }
        self.items.insert(
            index,
            ViewItem {
                id,
                view,
                size,
                cached_visible_size: cached,
                _subscription: subscription,
            },
        );
        if self.items.len() > 1 {
            self.sashes.push(Sash::default());
        }
    }

    /// Remove and return the view at `index`.
    ///
    /// With `Some(Sizing::Distribute)` the freed space is spread evenly over
    /// the remaining flexible views.
    pub fn remove_view(&mut self, index: usize, sizing: Option<Sizing>) -> Result<V, LayoutError> {
        self.remove_view_inner(index, sizing, false)
            .map(|(view, _, _)| view)
    }

    /// Remove the view at `index`, returning it with its size and cached
    /// visible size.
    pub(crate) fn remove_view_inner(
        &mut self,
        index: usize,
        sizing: Option<Sizing>,
        skip_layout: bool,
    ) -> Result<(V, u32, Option<u32>), LayoutError> {
        if index >= self.items.len() {
            return Err(LayoutError::out_of_range(
                "remove_view",
                index,
                self.items.len(),
            ));
        }
        self.cancel_drag();
        let item = self.items.remove(index);
        if !self.sashes.is_empty() {
            let sash = index.saturating_sub(1).min(self.sashes.len() - 1);
            self.sashes.remove(sash);
        }
        self.pending
            .borrow_mut()
            .retain(|(id, _)| *id != item.id);
        dockkit_core::debug!(index, views = self.items.len(), "splitview remove_view");

        if !skip_layout {
            self.relayout(&[], &[]);
            if sizing == Some(Sizing::Distribute) {
                self.distribute_view_sizes();
            }
        }
        self.on_did_remove_view.fire(&index);
        Ok(item.into_parts())
    }

    /// Move the view at `from` to `to`, keeping its size (or hidden state).
    pub fn move_view(&mut self, from: usize, to: usize) -> Result<(), LayoutError> {
        let len = self.items.len();
        if from >= len {
            return Err(LayoutError::out_of_range("move_view", from, len));
        }
        if to >= len {
            return Err(LayoutError::out_of_range("move_view", to, len));
        }
        let (view, size, cached) = self.remove_view_inner(from, None, true)?;
        let sizing = match cached {
            Some(cached_visible_size) => Sizing::Invisible {
                cached_visible_size,
            },
            None => Sizing::Size(size),
        };
        self.add_view_inner(view, sizing, to, false)
    }

    /// Set the view at `index` to `size`, absorbing the difference in every
    /// other view.
    pub fn resize_view(&mut self, index: usize, size: u32) -> Result<(), LayoutError> {
        if index >= self.items.len() {
            return Err(LayoutError::out_of_range(
                "resize_view",
                index,
                self.items.len(),
            ));
        }
        let (mut low, high) = self.priority_indexes_except(index);
        low.push(index);

        let laid_out = self.laid_out;
        let total = self.size;
        let item = &mut self.items[index];
        let maximum = if laid_out {
            item.maximum_size().min(total)
        } else {
            item.maximum_size()
        };
        item.size = clamp_view(
            i64::from(size),
            item.minimum_size(),
            maximum,
            item.snap_size(),
        );
        dockkit_core::debug!(index, requested = size, size = item.size, "splitview resize_view");
        self.relayout(&low, &high);
        Ok(())
    }

    /// Spread the flexible views' combined size evenly across them.
    pub fn distribute_view_sizes(&mut self) {
        let flexible: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.maximum_size() > item.minimum_size())
            .map(|(index, _)| index)
            .collect();
        if !flexible.is_empty() {
            let total: u64 = flexible
                .iter()
                .map(|&index| u64::from(self.items[index].size))
                .sum();
            let share = i64::try_from(total / flexible.len() as u64).unwrap_or(i64::MAX);
            for &index in &flexible {
                let item = &mut self.items[index];
                item.size = clamp(share, item.minimum_size(), item.maximum_size());
            }
        }
        let (low, high) = self.priority_indexes();
        self.relayout(&low, &high);
    }

    /// Show or hide the view at `index`.
    ///
    /// Hiding caches the current size and frees it for the other views;
    /// showing restores the cached size clamped into the view's bounds.
    pub fn set_view_visible(&mut self, index: usize, visible: bool) -> Result<(), LayoutError> {
        if index >= self.items.len() {
            return Err(LayoutError::out_of_range(
                "set_view_visible",
                index,
                self.items.len(),
            ));
        }
        if self.items[index].visible() == visible {
            return Ok(());
        }
        self.items[index].set_visible(visible);
        if self.laid_out {
            self.distribute_empty_space(Some(index));
        }
        self.layout_views();
        self.save_proportions();
        Ok(())
    }

    // --- layout ------------------------------------------------------------

    /// Lay the views out in `size` pixels along the axis and
    /// `orthogonal_size` across it.
    pub fn layout(&mut self, size: u32, orthogonal_size: u32) {
        let _span = dockkit_core::debug_span!(
            "splitview_layout",
            size,
            orthogonal_size,
            views = self.items.len()
        )
        .entered();

        self.apply_own_pending();
        let previous = self.size.max(self.content_size);
        self.size = size;
        self.orthogonal_size = orthogonal_size;
        self.laid_out = true;

        let proportions = self
            .proportions
            .clone()
            .filter(|proportions| proportions.len() == self.items.len());
        match proportions {
            Some(proportions) => self.apply_proportions(&proportions),
            None => {
                if let Some(last) = self.items.len().checked_sub(1) {
                    let (low, high) = self.priority_indexes();
                    let delta = i64::from(size) - i64::from(previous);
                    self.resize(last, delta, None, &low, &high);
                }
            }
        }
        self.distribute_empty_space(None);
        self.layout_views();
        if self.proportions.is_none() {
            self.save_proportions();
        }
    }

    fn apply_proportions(&mut self, proportions: &[Option<f64>]) {
        let mut available = i64::from(self.size);
        let mut total = 0.0;
        for (item, proportion) in self.items.iter().zip(proportions) {
            match proportion {
                Some(proportion) => total += proportion,
                None => available -= i64::from(item.size),
            }
        }
        if total <= 0.0 {
            return;
        }
        let available = available.max(0) as f64;
        for (item, proportion) in self.items.iter_mut().zip(proportions) {
            if let Some(proportion) = proportion {
                let requested = (proportion * available / total).round() as i64;
                item.size = item.clamp(requested);
            }
        }
    }

    /// Apply queued view size requests, nested layouts first.
    pub fn apply_pending_changes(&mut self) {
        for item in &mut self.items {
            item.view.flush_pending();
        }
        self.apply_own_pending();
    }

    fn apply_own_pending(&mut self) {
        let queued = std::mem::take(&mut *self.pending.borrow_mut());
        for (id, requested) in queued {
            let Some(index) = self.items.iter().position(|item| item.id == id) else {
                continue;
            };
            let item = &mut self.items[index];
            let requested = requested.unwrap_or(item.size);
            item.size = clamp(
                i64::from(requested),
                item.minimum_size(),
                item.maximum_size(),
            );
            dockkit_core::trace!(index, size = item.size, "applying pending view change");
            self.relayout(&[index], &[]);
        }
    }

    // --- sash drag ---------------------------------------------------------

    /// Start dragging sash `sash_index` from pointer `coordinate` (along the
    /// split axis).
    pub fn begin_sash_drag(&mut self, sash_index: usize, coordinate: f64) -> Result<(), LayoutError> {
        if let SashDragState::Dragging { sash_index, .. } = self.drag {
            return Err(LayoutError::DragInProgress { sash_index });
        }
        if sash_index >= self.sashes.len() {
            return Err(LayoutError::out_of_range(
                "begin_sash_drag",
                sash_index,
                self.sashes.len(),
            ));
        }
        self.drag = SashDragState::Dragging {
            sash_index,
            origin: coordinate,
            sizes: self.sizes(),
        };
        dockkit_core::debug!(sash_index, coordinate, "sash drag started");
        Ok(())
    }

    /// Move the dragged sash to pointer `coordinate`.
    pub fn drag_sash_to(&mut self, coordinate: f64) -> Result<(), LayoutError> {
        let SashDragState::Dragging {
            sash_index,
            origin,
            sizes,
        } = &self.drag
        else {
            return Err(LayoutError::NoActiveDrag);
        };
        let (sash_index, sizes) = (*sash_index, sizes.clone());
        let delta = (coordinate - origin).round() as i64;
        self.resize(sash_index, delta, Some(&sizes), &[], &[]);
        if self.laid_out {
            self.distribute_empty_space(None);
        }
        self.layout_views();
        Ok(())
    }

    /// Finish the drag: snapshot proportions and fire `on_did_sash_end`.
    pub fn end_sash_drag(&mut self) -> Result<(), LayoutError> {
        if std::mem::take(&mut self.drag) == SashDragState::Idle {
            return Err(LayoutError::NoActiveDrag);
        }
        self.save_proportions();
        dockkit_core::debug!(sizes = ?self.sizes(), "sash drag ended");
        self.on_did_sash_end.fire(&());
        Ok(())
    }

    fn cancel_drag(&mut self) {
        if matches!(self.drag, SashDragState::Dragging { .. }) {
            dockkit_core::warn!("structural change cancelled an active sash drag");
            self.drag = SashDragState::Idle;
        }
    }

    // --- teardown ----------------------------------------------------------

    /// Dispose every view, continuing past failures.
    pub fn dispose(&mut self) -> DisposeReport {
        let mut report = DisposeReport::default();
        for (index, mut item) in std::mem::take(&mut self.items).into_iter().enumerate() {
            let mut nested = DisposeReport::default();
            report.run(format!("splitview item {index}"), || {
                nested = item.view.dispose();
            });
            report.merge(nested);
        }
        self.sashes.clear();
        self.pending.borrow_mut().clear();
        self.proportions = None;
        self.content_size = 0;
        self.drag = SashDragState::Idle;
        self.on_did_sash_end.clear();
        self.on_did_add_view.clear();
        self.on_did_remove_view.clear();
        report
    }

    // --- algorithm ---------------------------------------------------------

    /// Grow `up` (pivot toward the start) by `delta` and shrink `down`
    /// (after the pivot) by what was realized.
    ///
    /// `sizes` is the baseline (the drag snapshot); defaults to the current
    /// sizes.
    fn resize(
        &mut self,
        pivot: usize,
        delta: i64,
        sizes: Option<&[u32]>,
        low: &[usize],
        high: &[usize],
    ) {
        debug_assert!(pivot < self.items.len(), "resize pivot out of range");
        if pivot >= self.items.len() {
            return;
        }
        let _span = dockkit_core::trace_span!("splitview_resize", pivot, delta).entered();

        let sizes: Vec<u32> = match sizes {
            Some(sizes) if sizes.len() == self.items.len() => sizes.to_vec(),
            _ => self.sizes(),
        };
        let up_natural: Vec<usize> = (0..=pivot).rev().collect();
        let down_natural: Vec<usize> = (pivot + 1..self.items.len()).collect();
        let up = prioritize(&up_natural, high, low);
        let down = prioritize(&down_natural, high, low);

        let size_of = |index: usize| i64::from(sizes[index]);
        let min_delta_up: i64 = up
            .iter()
            .map(|&i| i64::from(self.items[i].lower_bound()) - size_of(i))
            .sum();
        let max_delta_up: i64 = up
            .iter()
            .map(|&i| i64::from(self.items[i].maximum_size()) - size_of(i))
            .sum();
        let (min_delta_down, max_delta_down) = if down.is_empty() {
            (i64::MIN, i64::MAX)
        } else {
            (
                down.iter()
                    .map(|&i| size_of(i) - i64::from(self.items[i].maximum_size()))
                    .sum(),
                down.iter()
                    .map(|&i| size_of(i) - i64::from(self.items[i].lower_bound()))
                    .sum(),
            )
        };
        let min_delta = min_delta_up.max(min_delta_down);
        let max_delta = max_delta_up.min(max_delta_down);
        let tentative = delta.max(min_delta).min(max_delta);

        let mut actual = 0i64;
        let mut remaining = tentative;
        for &index in &up {
            let before = size_of(index);
            let item = &mut self.items[index];
            let after = item.clamp(before + remaining);
            let change = i64::from(after) - before;
            actual += change;
            remaining -= change;
            item.size = after;
        }

        let mut remaining = actual;
        for &index in &down {
            let before = size_of(index);
            let item = &mut self.items[index];
            let after = item.clamp(before - remaining);
            remaining += i64::from(after) - before;
            item.size = after;
        }
    }

    /// Push the gap between layout size and content size into the views,
    /// last to first, with `low_priority_index` touched last.
    fn distribute_empty_space(&mut self, low_priority_index: Option<usize>) {
        let mut empty = i64::from(self.size) - self.content_total();
        if empty == 0 {
            return;
        }
        let natural: Vec<usize> = (0..self.items.len()).rev().collect();
        let (mut low, high) = self.priority_indexes();
        if let Some(index) = low_priority_index {
            low.push(index);
        }
        let order = prioritize(&natural, &high, &low);
        for index in order {
            if empty == 0 {
                break;
            }
            let item = &mut self.items[index];
            let before = i64::from(item.size);
            let after = item.clamp(before + empty);
            empty -= i64::from(after) - before;
            item.size = after;
        }
    }

    fn relayout(&mut self, low: &[usize], high: &[usize]) {
        if self.laid_out
            && let Some(last) = self.items.len().checked_sub(1)
        {
            let delta = i64::from(self.size) - self.content_total();
            self.resize(last, delta, None, low, high);
            self.distribute_empty_space(None);
        }
        self.layout_views();
        self.save_proportions();
    }

    fn layout_views(&mut self) {
        self.content_size = self.content_total_u32();
        self.update_sashes();
        let orthogonal_size = self.orthogonal_size;
        for item in &mut self.items {
            item.view.layout(item.size, orthogonal_size);
        }
    }

    fn update_sashes(&mut self) {
        let shrinkable: Vec<bool> = self
            .items
            .iter()
            .map(|item| item.size > item.lower_bound())
            .collect();
        let growable: Vec<bool> = self
            .items
            .iter()
            .map(|item| item.size < item.maximum_size())
            .collect();
        let collapses_down = prefix_any(&shrinkable);
        let expands_down = prefix_any(&growable);
        let collapses_up = suffix_any(&shrinkable);
        let expands_up = suffix_any(&growable);

        let mut position = 0u32;
        for (index, sash) in self.sashes.iter_mut().enumerate() {
            position = position.saturating_add(self.items[index].size);
            let pinned_min = !(collapses_down[index] && expands_up[index + 1]);
            let pinned_max = !(expands_down[index] && collapses_up[index + 1]);
            sash.state = match (pinned_min, pinned_max) {
                (true, true) => SashState::Disabled,
                (true, false) => SashState::Minimum,
                (false, true) => SashState::Maximum,
                (false, false) => SashState::Enabled,
            };
            sash.position = position;
        }
    }

    fn save_proportions(&mut self) {
        self.content_size = self.content_total_u32();
        if self.proportional_layout && self.content_size > 0 {
            let content = f64::from(self.content_size);
            self.proportions = Some(
                self.items
                    .iter()
                    .map(|item| item.visible().then(|| f64::from(item.size) / content))
                    .collect(),
            );
        } else {
            self.proportions = None;
        }
    }

    // --- helpers -----------------------------------------------------------

    fn item(&self, index: usize, operation: &'static str) -> Result<&ViewItem<V>, LayoutError> {
        self.items
            .get(index)
            .ok_or_else(|| LayoutError::out_of_range(operation, index, self.items.len()))
    }

    fn content_total(&self) -> i64 {
        self.items.iter().map(|item| i64::from(item.size)).sum()
    }

    fn content_total_u32(&self) -> u32 {
        saturate_u32(self.content_total())
    }

    fn priority_indexes(&self) -> (Vec<usize>, Vec<usize>) {
        self.priority_indexes_except(usize::MAX)
    }

    /// Low and high priority indexes, leaving out `skip`.
    fn priority_indexes_except(&self, skip: usize) -> (Vec<usize>, Vec<usize>) {
        let mut low = Vec::new();
        let mut high = Vec::new();
        for (index, item) in self.items.iter().enumerate() {
            if index == skip {
                continue;
            }
            match item.view.priority() {
                LayoutPriority::Low => low.push(index),
                LayoutPriority::High => high.push(index),
                LayoutPriority::Normal => {}
            }
        }
        (low, high)
    }
}

impl<V: View> std::fmt::Debug for SplitView<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplitView")
            .field("orientation", &self.orientation)
            .field("size", &self.size)
            .field("orthogonal_size", &self.orthogonal_size)
            .field("sizes", &self.sizes())
            .field("sashes", &self.sashes)
            .field("proportions", &self.proportions)
            .finish()
    }
}

fn saturating_sum(values: impl Iterator<Item = u32>) -> u32 {
    let total: u64 = values.map(u64::from).sum();
    u32::try_from(total).unwrap_or(UNBOUNDED)
}

fn prefix_any(flags: &[bool]) -> Vec<bool> {
    flags
        .iter()
        .scan(false, |seen, &flag| {
            *seen |= flag;
            Some(*seen)
        })
        .collect()
}

fn suffix_any(flags: &[bool]) -> Vec<bool> {
    let mut out: Vec<bool> = flags
        .iter()
        .rev()
        .scan(false, |seen, &flag| {
            *seen |= flag;
            Some(*seen)
        })
        .collect();
    out.reverse();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dockkit_core::Emitter;
    use proptest::prelude::*;
    use std::cell::Cell;

    struct TestView {
        min: u32,
        max: u32,
        snap: Option<u32>,
        priority: LayoutPriority,
        changes: Emitter<ViewChange>,
        laid_out: Rc<Cell<(u32, u32)>>,
        visible: Rc<Cell<bool>>,
    }

    impl TestView {
        fn new(min: u32, max: u32) -> Self {
            Self {
                min,
                max,
                snap: None,
                priority: LayoutPriority::Normal,
                changes: Emitter::new(),
                laid_out: Rc::new(Cell::new((0, 0))),
                visible: Rc::new(Cell::new(true)),
            }
        }

        fn snapping(min: u32, snap: u32) -> Self {
            Self {
                snap: Some(snap),
                ..Self::new(min, UNBOUNDED)
            }
        }

        fn with_priority(mut self, priority: LayoutPriority) -> Self {
            self.priority = priority;
            self
        }
    }

    impl View for TestView {
        fn minimum_size(&self) -> u32 {
            self.min
        }
        fn maximum_size(&self) -> u32 {
            self.max
        }
        fn snap_size(&self) -> Option<u32> {
            self.snap
        }
        fn priority(&self) -> LayoutPriority {
            self.priority
        }
        fn on_did_change(&self) -> Event<ViewChange> {
            self.changes.event()
        }
        fn layout(&mut self, size: u32, orthogonal_size: u32) {
            self.laid_out.set((size, orthogonal_size));
        }
        fn set_visible(&mut self, visible: bool) {
            self.visible.set(visible);
        }
    }

    fn engine_with(views: Vec<TestView>, sizing: Sizing) -> SplitView<TestView> {
        let mut splitview = SplitView::new(Orientation::Horizontal);
        for view in views {
            splitview.push_view(view, sizing).expect("push view");
        }
        splitview
    }

    #[test]
    fn bounded_views_rescale_then_resize() {
        let mut splitview = engine_with(
            vec![
                TestView::new(50, 200),
                TestView::new(50, 200),
                TestView::new(50, 200),
            ],
            Sizing::Size(50),
        );
        splitview.layout(200, 500);
        assert_eq!(splitview.sizes(), vec![67, 67, 66]);

        splitview.resize_view(1, 100).expect("resize");
        assert_eq!(splitview.sizes(), vec![50, 100, 50]);

        splitview.resize_view(2, 60).expect("resize");
        assert_eq!(splitview.sizes(), vec![50, 90, 60]);
    }

    #[test]
    fn two_views_rescale_proportionally() {
        let first = TestView::new(50, UNBOUNDED);
        let second = TestView::new(50, UNBOUNDED);
        let first_layout = Rc::clone(&first.laid_out);
        let second_layout = Rc::clone(&second.laid_out);

        let mut splitview = SplitView::new(Orientation::Horizontal);
        splitview.layout(600, 400);
        splitview.push_view(first, Sizing::Distribute).expect("push");
        splitview.push_view(second, Sizing::Distribute).expect("push");
        assert_eq!(first_layout.get(), (300, 400));
        assert_eq!(second_layout.get(), (300, 400));

        splitview.resize_view(0, 200).expect("resize");
        assert_eq!(first_layout.get(), (200, 400));
        assert_eq!(second_layout.get(), (400, 400));

        splitview.layout(200, 600);
        assert_eq!(first_layout.get(), (67, 600));
        assert_eq!(second_layout.get(), (133, 600));
    }

    #[test]
    fn snap_view_collapses_or_pins() {
        let mut splitview = engine_with(
            vec![TestView::snapping(50, 30), TestView::new(0, UNBOUNDED)],
            Sizing::Size(150),
        );
        splitview.layout(300, 100);

        splitview.resize_view(0, 20).expect("resize");
        assert_eq!(splitview.sizes(), vec![0, 300]);

        splitview.resize_view(0, 40).expect("resize");
        assert_eq!(splitview.sizes(), vec![50, 250]);
    }

    #[test]
    fn shrinking_below_minimums_keeps_every_minimum() {
        let mut splitview = engine_with(
            vec![
                TestView::new(50, UNBOUNDED),
                TestView::new(50, UNBOUNDED),
                TestView::new(50, UNBOUNDED),
            ],
            Sizing::Distribute,
        );
        splitview.layout(500, 100);
        splitview.layout(60, 100);
        assert!(splitview.sizes().iter().all(|&size| size >= 50));
    }

    #[test]
    fn out_of_range_indexes_are_rejected() {
        let mut splitview = engine_with(vec![TestView::new(0, UNBOUNDED)], Sizing::Size(10));
        assert_eq!(
            splitview.add_view(TestView::new(0, 10), Sizing::Size(5), 3),
            Err(LayoutError::out_of_range("add_view", 3, 1))
        );
        assert_eq!(
            splitview.resize_view(1, 10),
            Err(LayoutError::out_of_range("resize_view", 1, 1))
        );
        assert!(matches!(
            splitview.remove_view(4, None),
            Err(LayoutError::IndexOutOfRange { index: 4, .. })
        ));
        assert!(splitview.move_view(0, 2).is_err());
        assert!(splitview.set_view_visible(9, false).is_err());
        assert_eq!(splitview.view_size(7), None);
        assert!(matches!(
            splitview.add_view(TestView::new(0, 10), Sizing::Split(5), 0),
            Err(LayoutError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn sash_count_tracks_views() {
        let mut splitview = SplitView::new(Orientation::Vertical);
        splitview.layout(400, 100);
        assert_eq!(splitview.sash_count(), 0);
        for expected in 1..=4 {
            splitview
                .push_view(TestView::new(10, UNBOUNDED), Sizing::Distribute)
                .expect("push");
            assert_eq!(splitview.sash_count(), expected - 1);
        }
        splitview.remove_view(0, None).expect("remove");
        assert_eq!(splitview.sash_count(), 2);
        splitview.remove_view(2, Some(Sizing::Distribute)).expect("remove");
        assert_eq!(splitview.sash_count(), 1);
        assert_eq!(splitview.sizes().iter().sum::<u32>(), 400);
    }

    #[test]
    fn split_sizing_takes_half_of_target() {
        let mut splitview = SplitView::new(Orientation::Horizontal);
        splitview.layout(400, 100);
        splitview
            .push_view(TestView::new(0, UNBOUNDED), Sizing::Distribute)
            .expect("push");
        splitview
            .push_view(TestView::new(0, UNBOUNDED), Sizing::Split(0))
            .expect("push");
        assert_eq!(splitview.sizes(), vec![200, 200]);
    }

    #[test]
    fn high_priority_views_absorb_first() {
        let mut splitview = engine_with(
            vec![
                TestView::new(0, UNBOUNDED).with_priority(LayoutPriority::High),
                TestView::new(0, UNBOUNDED),
            ],
            Sizing::Size(100),
        );
        splitview.layout(200, 10);
        splitview.layout(300, 10);
        assert_eq!(splitview.sizes(), vec![150, 150]);

        let mut splitview = SplitView::with_proportional_layout(Orientation::Horizontal, false);
        splitview
            .push_view(
                TestView::new(0, UNBOUNDED).with_priority(LayoutPriority::High),
                Sizing::Size(100),
            )
            .expect("push");
        splitview
            .push_view(TestView::new(0, UNBOUNDED), Sizing::Size(100))
            .expect("push");
        splitview.layout(200, 10);
        splitview.layout(300, 10);
        assert_eq!(splitview.sizes(), vec![200, 100]);
    }

    #[test]
    fn sash_state_reflects_slack() {
        let mut splitview = engine_with(
            vec![TestView::new(100, 100), TestView::new(100, 100)],
            Sizing::Size(100),
        );
        splitview.layout(200, 10);
        assert_eq!(splitview.sash_state(0), Some(SashState::Disabled));

        let mut splitview = engine_with(
            vec![TestView::new(50, 150), TestView::new(50, 150)],
            Sizing::Size(100),
        );
        splitview.layout(200, 10);
        assert_eq!(splitview.sash_state(0), Some(SashState::Enabled));
        assert_eq!(splitview.sash_position(0), Some(100));

        splitview.resize_view(0, 50).expect("resize");
        assert_eq!(splitview.sizes(), vec![50, 150]);
        assert_eq!(splitview.sash_state(0), Some(SashState::Minimum));

        splitview.resize_view(0, 150).expect("resize");
        assert_eq!(splitview.sash_state(0), Some(SashState::Maximum));
    }

    #[test]
    fn sash_drag_pushes_every_view_and_fires_end() {
        let mut splitview = engine_with(
            vec![
                TestView::new(20, UNBOUNDED),
                TestView::new(20, UNBOUNDED),
                TestView::new(20, UNBOUNDED),
            ],
            Sizing::Size(100),
        );
        splitview.layout(300, 10);
        let ended = Rc::new(Cell::new(0));
        let _sub = {
            let ended = Rc::clone(&ended);
            splitview
                .on_did_sash_end()
                .subscribe(move |()| ended.set(ended.get() + 1))
        };

        splitview.begin_sash_drag(0, 100.0).expect("begin");
        assert_eq!(
            splitview.begin_sash_drag(1, 0.0),
            Err(LayoutError::DragInProgress { sash_index: 0 })
        );
        splitview.drag_sash_to(250.0).expect("drag");
        assert_eq!(splitview.sizes(), vec![250, 20, 30]);
        splitview.drag_sash_to(130.0).expect("drag");
        assert_eq!(splitview.sizes(), vec![130, 70, 100]);
        splitview.end_sash_drag().expect("end");

        assert_eq!(ended.get(), 1);
        assert_eq!(splitview.sizes().iter().sum::<u32>(), 300);
        assert_eq!(splitview.drag_sash_to(10.0), Err(LayoutError::NoActiveDrag));
        assert_eq!(splitview.end_sash_drag(), Err(LayoutError::NoActiveDrag));
    }

    #[test]
    fn drag_before_first_layout_keeps_total() {
        let mut splitview = engine_with(
            vec![TestView::new(20, UNBOUNDED), TestView::new(20, UNBOUNDED)],
            Sizing::Size(100),
        );
        assert_eq!(splitview.sizes(), vec![100, 100]);

        splitview.begin_sash_drag(0, 0.0).expect("begin");
        splitview.drag_sash_to(10.0).expect("drag");
        assert_eq!(splitview.sizes(), vec![110, 90]);
        splitview.end_sash_drag().expect("end");
        assert_eq!(splitview.sizes().iter().sum::<u32>(), 200);
    }

    #[test]
    fn hidden_views_cache_and_restore_size() {
        let views = vec![TestView::new(20, UNBOUNDED), TestView::new(20, UNBOUNDED)];
        let visible = Rc::clone(&views[1].visible);
        let mut splitview = engine_with(views, Sizing::Size(100));
        splitview.layout(300, 10);
        assert_eq!(splitview.sizes(), vec![150, 150]);

        splitview.set_view_visible(1, false).expect("hide");
        assert!(!visible.get());
        assert_eq!(splitview.sizes(), vec![300, 0]);
        assert_eq!(splitview.view_cached_visible_size(1), Ok(Some(150)));
        assert_eq!(splitview.is_view_visible(1), Ok(false));

        splitview.set_view_visible(1, true).expect("show");
        assert!(visible.get());
        assert_eq!(splitview.sizes(), vec![150, 150]);
        assert_eq!(splitview.view_cached_visible_size(1), Ok(None));
    }

    #[test]
    fn move_view_keeps_size() {
        let mut splitview = engine_with(
            vec![
                TestView::new(0, UNBOUNDED),
                TestView::new(0, UNBOUNDED),
                TestView::new(0, UNBOUNDED),
            ],
            Sizing::Size(100),
        );
        splitview.layout(300, 10);
        splitview.resize_view(0, 50).expect("resize");
        let before = splitview.sizes();
        splitview.move_view(0, 2).expect("move");
        let after = splitview.sizes();
        assert_eq!(after[2], before[0]);
        assert_eq!(after.iter().sum::<u32>(), 300);
        assert_eq!(splitview.sash_count(), 2);
    }

    #[test]
    fn pending_changes_apply_on_layout() {
        let views = vec![TestView::new(0, UNBOUNDED), TestView::new(0, UNBOUNDED)];
        let changes = views[0].changes.clone();
        let mut splitview = engine_with(views, Sizing::Size(100));
        splitview.layout(200, 10);

        changes.fire(&ViewChange::size(40));
        assert!(splitview.has_pending_changes());
        splitview.layout(200, 10);
        assert!(!splitview.has_pending_changes());
        assert_eq!(splitview.sizes(), vec![40, 160]);
    }

    #[test]
    fn descriptor_defers_layout_until_first_layout() {
        let descriptor = SplitViewDescriptor {
            size: 300,
            views: vec![
                ViewDescriptor {
                    view: TestView::new(0, UNBOUNDED),
                    size: 100,
                    visible: true,
                },
                ViewDescriptor {
                    view: TestView::new(0, UNBOUNDED),
                    size: 80,
                    visible: false,
                },
                ViewDescriptor {
                    view: TestView::new(0, UNBOUNDED),
                    size: 200,
                    visible: true,
                },
            ],
        };
        let mut splitview = SplitView::from_descriptor(Orientation::Horizontal, true, descriptor);
        assert_eq!(splitview.sizes(), vec![100, 0, 200]);
        assert_eq!(splitview.sash_count(), 2);
        splitview.layout(600, 10);
        assert_eq!(splitview.sizes(), vec![200, 0, 400]);
        assert_eq!(splitview.view_cached_visible_size(1), Ok(Some(80)));
    }

    #[test]
    fn dispose_continues_past_panicking_view() {
        struct Exploding(Emitter<ViewChange>);
        impl View for Exploding {
            fn minimum_size(&self) -> u32 {
                0
            }
            fn on_did_change(&self) -> Event<ViewChange> {
                self.0.event()
            }
            fn layout(&mut self, _size: u32, _orthogonal_size: u32) {}
            fn dispose(&mut self) -> DisposeReport {
                panic!("view refused to dispose");
            }
        }

        let mut splitview = SplitView::new(Orientation::Horizontal);
        for _ in 0..3 {
            splitview
                .push_view(Exploding(Emitter::new()), Sizing::Size(10))
                .expect("push");
        }
        let report = splitview.dispose();
        assert_eq!(report.attempted, 3);
        assert_eq!(report.failures.len(), 3);
        assert!(splitview.is_empty());
        assert_eq!(splitview.sash_count(), 0);
    }

    #[test]
    fn add_and_remove_notifications_carry_index() {
        let mut splitview = SplitView::new(Orientation::Horizontal);
        let log = Rc::new(RefCell::new(Vec::new()));
        let _added = {
            let log = Rc::clone(&log);
            splitview
                .on_did_add_view()
                .subscribe(move |index| log.borrow_mut().push(("add", *index)))
        };
        let _removed = {
            let log = Rc::clone(&log);
            splitview
                .on_did_remove_view()
                .subscribe(move |index| log.borrow_mut().push(("remove", *index)))
        };
        splitview
            .push_view(TestView::new(0, 10), Sizing::Size(5))
            .expect("push");
        splitview
            .add_view(TestView::new(0, 10), Sizing::Size(5), 0)
            .expect("add");
        splitview.remove_view(1, None).expect("remove");
        assert_eq!(*log.borrow(), vec![("add", 0), ("add", 0), ("remove", 1)]);
    }

    proptest! {
        #[test]
        fn layout_fills_feasible_size(
            bounds in proptest::collection::vec((0u32..60, 0u32..300), 1..6),
            total in 0u32..1200,
        ) {
            let views: Vec<TestView> = bounds
                .iter()
                .map(|&(min, extra)| TestView::new(min, min + extra))
                .collect();
            let min_sum: u32 = bounds.iter().map(|&(min, _)| min).sum();
            let max_sum: u32 = bounds.iter().map(|&(min, extra)| min + extra).sum();
            prop_assume!(total >= min_sum && total <= max_sum);

            let mut splitview = engine_with(views, Sizing::Distribute);
            splitview.layout(total, 50);
            prop_assert_eq!(splitview.sizes().iter().sum::<u32>(), total);
            let first = splitview.sizes();
            splitview.layout(total, 50);
            prop_assert_eq!(splitview.sizes(), first);
        }
    }
}
