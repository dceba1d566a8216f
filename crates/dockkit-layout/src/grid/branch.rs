//! Branch node: a nested split view whose items are grid nodes.
//!
//! # Invariants
//!
//! 1. The nested engine owns the children; there is no second child list to
//!    fall out of step with the sashes.
//! 2. After every structural change the branch re-subscribes to the union
//!    of its children's change events, so a leaf request reaches the root.
//! 3. Across its own split axis a branch is as constrained as its most
//!    restrictive visible child; along it, as the sum of its children.

use dockkit_core::{DisposeReport, Emitter, Event, Orientation, Subscription};

use super::node::Node;
use crate::error::LayoutError;
use crate::sizing::{LayoutPriority, Sizing, UNBOUNDED};
use crate::splitview::{SplitView, SplitViewDescriptor, ViewDescriptor};
use crate::view::{View, ViewChange};

#[derive(Debug)]
pub struct BranchNode {
    orientation: Orientation,
    splitview: SplitView<Node>,
    size: u32,
    orthogonal_size: u32,
    changes: Emitter<ViewChange>,
    children_subscription: Subscription,
}

impl BranchNode {
    /// Empty branch that has not been laid out yet.
    #[must_use]
    pub fn new(orientation: Orientation, proportional_layout: bool) -> Self {
        Self {
            orientation,
            splitview: SplitView::with_proportional_layout(orientation, proportional_layout),
            size: 0,
            orthogonal_size: 0,
            changes: Emitter::new(),
            children_subscription: Subscription::empty(),
        }
    }

    /// Empty branch already laid out at `size` across and
    /// `orthogonal_size` along its split axis.
    #[must_use]
    pub fn with_size(
        orientation: Orientation,
        proportional_layout: bool,
        size: u32,
        orthogonal_size: u32,
    ) -> Self {
        let mut branch = Self::new(orientation, proportional_layout);
        branch.layout(size, orthogonal_size);
        branch
    }

    /// Build from children in bulk; nothing is laid out until the first
    /// [`layout`](Self::layout).
    #[must_use]
    pub fn from_children(
        orientation: Orientation,
        proportional_layout: bool,
        size: u32,
        orthogonal_size: u32,
        children: Vec<ViewDescriptor<Node>>,
    ) -> Self {
        let splitview = SplitView::from_descriptor(
            orientation,
            proportional_layout,
            SplitViewDescriptor {
                size: orthogonal_size,
                views: children,
            },
        );
        let mut branch = Self {
            orientation,
            splitview,
            size,
            orthogonal_size,
            changes: Emitter::new(),
            children_subscription: Subscription::empty(),
        };
        branch.rebind();
        branch
    }

    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Extent across this branch's split axis.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Extent along this branch's split axis.
    #[must_use]
    pub fn orthogonal_size(&self) -> u32 {
        self.orthogonal_size
    }

    /// The nested engine, for sash and proportion queries.
    #[must_use]
    pub fn splitview(&self) -> &SplitView<Node> {
        &self.splitview
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.splitview.len()
    }

    #[must_use]
    pub fn child(&self, index: usize) -> Option<&Node> {
        self.splitview.view(index)
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.splitview.view_mut(index)
    }

    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.splitview.views()
    }

    /// Size of child `index` along this branch's axis, `None` when out of
    /// range.
    #[must_use]
    pub fn child_size(&self, index: usize) -> Option<u32> {
        self.splitview.view_size(index)
    }

    pub fn is_child_visible(&self, index: usize) -> Result<bool, LayoutError> {
        self.splitview.is_view_visible(index)
    }

    pub fn child_cached_visible_size(&self, index: usize) -> Result<Option<u32>, LayoutError> {
        self.splitview.view_cached_visible_size(index)
    }

    // --- constraints -------------------------------------------------------

    pub(crate) fn minimum_size(&self) -> u32 {
        self.visible_children()
            .map(Node::minimum_orthogonal_size)
            .max()
            .unwrap_or(0)
    }

    pub(crate) fn maximum_size(&self) -> u32 {
        self.visible_children()
            .map(Node::maximum_orthogonal_size)
            .min()
            .unwrap_or(UNBOUNDED)
    }

    pub(crate) fn minimum_orthogonal_size(&self) -> u32 {
        self.splitview.minimum_size()
    }

    pub(crate) fn maximum_orthogonal_size(&self) -> u32 {
        self.splitview.maximum_size()
    }

    pub(crate) fn priority(&self) -> LayoutPriority {
        let mut low = false;
        for child in self.splitview.views() {
            match child.priority() {
                LayoutPriority::High => return LayoutPriority::High,
                LayoutPriority::Low => low = true,
                LayoutPriority::Normal => {}
            }
        }
        if low {
            LayoutPriority::Low
        } else {
            LayoutPriority::Normal
        }
    }

    fn visible_children(&self) -> impl Iterator<Item = &Node> {
        self.splitview
            .views()
            .enumerate()
            .filter(|(index, _)| self.splitview.is_view_visible(*index).unwrap_or(false))
            .map(|(_, child)| child)
    }

    // --- structure ---------------------------------------------------------

    pub fn add_child(
        &mut self,
        node: Node,
        sizing: Sizing,
        index: usize,
    ) -> Result<(), LayoutError> {
        self.splitview.add_view(node, sizing, index)?;
        self.rebind();
        Ok(())
    }

    pub fn remove_child(
        &mut self,
        index: usize,
        sizing: Option<Sizing>,
    ) -> Result<Node, LayoutError> {
        let node = self.splitview.remove_view(index, sizing)?;
        self.rebind();
        Ok(node)
    }

    /// Detach child `index` without re-laying out the remaining children.
    ///
    /// Returns the node, its size, and its cached visible size when hidden.
    pub(crate) fn remove_child_without_layout(
        &mut self,
        index: usize,
    ) -> Result<(Node, u32, Option<u32>), LayoutError> {
        let removed = self.splitview.remove_view_inner(index, None, true)?;
        self.rebind();
        Ok(removed)
    }

    /// Detach every child in order, keeping sizes and visibility.
    pub(crate) fn take_children(&mut self) -> Vec<(Node, u32, Option<u32>)> {
        let mut children = Vec::with_capacity(self.splitview.len());
        while let Ok(child) = self.splitview.remove_view_inner(0, None, true) {
            children.push(child);
        }
        self.rebind();
        children
    }

    pub fn move_child(&mut self, from: usize, to: usize) -> Result<(), LayoutError> {
        self.splitview.move_view(from, to)?;
        self.rebind();
        Ok(())
    }

    pub fn resize_child(&mut self, index: usize, size: u32) -> Result<(), LayoutError> {
        self.splitview.resize_view(index, size)
    }

    pub fn set_child_visible(&mut self, index: usize, visible: bool) -> Result<(), LayoutError> {
        self.splitview.set_view_visible(index, visible)
    }

    // --- layout ------------------------------------------------------------

    /// `size` runs across this branch's axis, `orthogonal_size` along it.
    pub fn layout(&mut self, size: u32, orthogonal_size: u32) {
        self.size = size;
        self.orthogonal_size = orthogonal_size;
        self.splitview.layout(orthogonal_size, size);
    }

    pub fn apply_pending_changes(&mut self) {
        self.splitview.apply_pending_changes();
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        for index in 0..self.splitview.len() {
            if !self.splitview.is_view_visible(index).unwrap_or(false) {
                continue;
            }
            if let Some(child) = self.splitview.view_mut(index) {
                child.set_visible(visible);
            }
        }
    }

    pub(crate) fn on_did_change(&self) -> Event<ViewChange> {
        self.changes.event()
    }

    /// Swap this branch's orientation and every descendant's, keeping sizes.
    pub(crate) fn flip(&mut self) {
        self.orientation = self.orientation.orthogonal();
        self.splitview.set_orientation(self.orientation);
        for index in 0..self.splitview.len() {
            if let Some(child) = self.splitview.view_mut(index) {
                child.flip();
            }
        }
    }

    /// Dispose every descendant, continuing past failures.
    pub fn dispose(&mut self) -> DisposeReport {
        self.children_subscription.dispose();
        let report = self.splitview.dispose();
        self.changes.clear();
        report
    }

    fn rebind(&mut self) {
        let changes = self.changes.clone();
        self.children_subscription = Event::any(
            self.splitview.views().map(View::on_did_change),
            move |change: &ViewChange| {
                changes.fire(&ViewChange {
                    size: change.orthogonal_size,
                    orthogonal_size: None,
                });
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use dockkit_core::Dimensions;

    use super::*;
    use crate::grid::leaf::LeafNode;
    use crate::panel::{PanelHandle, SimplePanel};

    fn leaf(panel: SimplePanel, parent: Orientation) -> (Node, PanelHandle) {
        let handle = panel.handle();
        let node = Node::Leaf(LeafNode::new(panel.boxed(), parent.orthogonal(), 0));
        (node, handle)
    }

    #[test]
    fn constraints_aggregate_over_children() {
        let mut branch = BranchNode::with_size(Orientation::Horizontal, true, 300, 600);
        let (a, _) = leaf(
            SimplePanel::new("a")
                .with_minimum_width(50)
                .with_minimum_height(80)
                .with_maximum_height(400),
            Orientation::Horizontal,
        );
        let (b, _) = leaf(
            SimplePanel::new("b")
                .with_minimum_width(70)
                .with_minimum_height(120)
                .with_maximum_height(250),
            Orientation::Horizontal,
        );
        branch.add_child(a, Sizing::Size(300), 0).expect("add a");
        branch.add_child(b, Sizing::Size(300), 1).expect("add b");

        assert_eq!(branch.minimum_size(), 120);
        assert_eq!(branch.maximum_size(), 250);
        assert_eq!(branch.minimum_orthogonal_size(), 120);
        assert_eq!(branch.maximum_orthogonal_size(), UNBOUNDED);
    }

    #[test]
    fn empty_branch_is_unconstrained_across() {
        let branch = BranchNode::new(Orientation::Vertical, true);
        assert_eq!(branch.minimum_size(), 0);
        assert_eq!(branch.maximum_size(), UNBOUNDED);
        assert_eq!(branch.priority(), LayoutPriority::Normal);
    }

    #[test]
    fn priority_prefers_high_then_low() {
        let mut branch = BranchNode::with_size(Orientation::Horizontal, true, 100, 300);
        let (low, _) = leaf(
            SimplePanel::new("low").with_priority(LayoutPriority::Low),
            Orientation::Horizontal,
        );
        branch.add_child(low, Sizing::Size(100), 0).expect("add");
        assert_eq!(branch.priority(), LayoutPriority::Low);

        let (high, _) = leaf(
            SimplePanel::new("high").with_priority(LayoutPriority::High),
            Orientation::Horizontal,
        );
        branch.add_child(high, Sizing::Size(100), 1).expect("add");
        assert_eq!(branch.priority(), LayoutPriority::High);
    }

    #[test]
    fn leaf_layout_follows_branch_axis() {
        let mut branch = BranchNode::with_size(Orientation::Vertical, true, 400, 300);
        let (a, a_handle) = leaf(SimplePanel::new("a"), Orientation::Vertical);
        let (b, b_handle) = leaf(SimplePanel::new("b"), Orientation::Vertical);
        branch.add_child(a, Sizing::Size(100), 0).expect("add a");
        branch.add_child(b, Sizing::Size(200), 1).expect("add b");

        assert_eq!(a_handle.dimensions(), Dimensions::new(400, 100));
        assert_eq!(b_handle.dimensions(), Dimensions::new(400, 200));
        assert_eq!(branch.child_size(1), Some(200));
        assert_eq!(branch.child_size(2), None);
    }

    #[test]
    fn child_requests_bubble_across_axis() {
        let mut branch = BranchNode::with_size(Orientation::Horizontal, true, 200, 300);
        let (a, handle) = leaf(SimplePanel::new("a"), Orientation::Horizontal);
        branch.add_child(a, Sizing::Size(300), 0).expect("add");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _sub = {
            let seen = Rc::clone(&seen);
            branch
                .on_did_change()
                .subscribe(move |change| seen.borrow_mut().push(*change))
        };

        handle.request_size(Dimensions::new(120, 90));
        assert_eq!(*seen.borrow(), vec![ViewChange::size(90)]);
        assert!(branch.splitview().has_pending_changes());

        let (b, b_handle) = leaf(SimplePanel::new("b"), Orientation::Horizontal);
        branch.add_child(b, Sizing::Size(100), 1).expect("add");
        b_handle.invalidate();
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(seen.borrow()[1], ViewChange::default());
    }

    #[test]
    fn flip_swaps_every_descendant() {
        let mut branch = BranchNode::with_size(Orientation::Horizontal, true, 200, 300);
        let (a, _) = leaf(SimplePanel::new("a"), Orientation::Horizontal);
        let mut inner = BranchNode::with_size(Orientation::Vertical, true, 150, 200);
        let (b, _) = leaf(SimplePanel::new("b"), Orientation::Vertical);
        inner.add_child(b, Sizing::Size(200), 0).expect("add b");
        branch.add_child(a, Sizing::Size(150), 0).expect("add a");
        branch.add_child(Node::Branch(inner), Sizing::Size(150), 1).expect("add inner");

        branch.flip();
        assert_eq!(branch.orientation(), Orientation::Vertical);
        assert_eq!(branch.splitview().orientation(), Orientation::Vertical);
        let children: Vec<Orientation> = branch.children().map(Node::orientation).collect();
        assert_eq!(children, vec![Orientation::Horizontal, Orientation::Horizontal]);
        let nested = branch
            .child(1)
            .and_then(Node::as_branch)
            .and_then(|inner| inner.child(0))
            .map(Node::orientation);
        assert_eq!(nested, Some(Orientation::Vertical));
    }

    #[test]
    fn dispose_cascades_through_nested_branches() {
        let mut branch = BranchNode::with_size(Orientation::Horizontal, true, 100, 200);
        let (a, a_handle) = leaf(SimplePanel::new("a"), Orientation::Horizontal);
        let mut inner = BranchNode::with_size(Orientation::Vertical, true, 100, 100);
        let (b, b_handle) = leaf(SimplePanel::new("b"), Orientation::Vertical);
        inner.add_child(b, Sizing::Size(100), 0).expect("add b");
        branch.add_child(a, Sizing::Size(100), 0).expect("add a");
        branch.add_child(Node::Branch(inner), Sizing::Size(100), 1).expect("add inner");

        let report = branch.dispose();
        assert!(report.is_clean());
        assert!(a_handle.state().disposed);
        assert!(b_handle.state().disposed);
        assert_eq!(branch.child_count(), 0);
    }

    #[test]
    fn out_of_range_child_operations_fail() {
        let mut branch = BranchNode::new(Orientation::Horizontal, true);
        assert!(matches!(
            branch.remove_child(0, None),
            Err(LayoutError::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            branch.resize_child(3, 10),
            Err(LayoutError::IndexOutOfRange { .. })
        ));
    }
}
