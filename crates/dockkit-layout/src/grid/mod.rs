//! Two-dimensional grid of panels built from nested split views.
//!
//! A [`Gridview`] owns a root [`BranchNode`]. Every branch splits along its
//! own orientation and its branch children split along the other one, so
//! the tree alternates axes by construction. Callers address nodes by
//! *location*: the path of child indexes from the root.
//!
//! ```text
//!   root (HORIZONTAL)            location
//!   +--------+---------------+
//!   |        |    [1, 0]     |   [0]     leaf
//!   |  [0]   +---------------+   [1]     branch (VERTICAL)
//!   |        |    [1, 1]     |   [1, 0]  leaf
//!   +--------+---------------+   [1, 1]  leaf
//! ```
//!
//! # Invariants
//!
//! 1. The root is always a branch; leaves only ever sit inside branches.
//! 2. No branch other than the root is left holding a single child after
//!    [`Gridview::remove_view`]: it is collapsed into its parent.
//! 3. A leaf's orientation is orthogonal to the branch holding it.
//!
//! # Failure Modes
//!
//! - A location that does not address a node of the required kind raises
//!   [`LayoutError::InvalidLocation`].
//! - Index errors inside an addressed branch raise
//!   [`LayoutError::IndexOutOfRange`] before anything is changed.

pub mod branch;
pub mod leaf;
pub mod node;

use dockkit_core::{
    Dimensions, DisposeReport, Emitter, Event, Orientation, Rect, Subscription,
};

pub use branch::BranchNode;
pub use leaf::LeafNode;
pub use node::Node;

use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::panel::PanelView;
use crate::serialization::InitMode;
use crate::sizing::Sizing;
use crate::view::ViewChange;

/// Location-addressed grid of panels.
#[derive(Debug)]
pub struct Gridview {
    root: BranchNode,
    proportional_layout: bool,
    init_mode: InitMode,
    width: u32,
    height: u32,
    laid_out: bool,
    active_view: Option<String>,
    changes: Emitter<ViewChange>,
    root_subscription: Subscription,
}

impl Gridview {
    #[must_use]
    pub fn new(orientation: Orientation) -> Self {
        Self::with_config(orientation, &LayoutConfig::default())
    }

    #[must_use]
    pub fn with_config(orientation: Orientation, config: &LayoutConfig) -> Self {
        let mut grid = Self {
            root: BranchNode::new(orientation, config.proportional_layout),
            proportional_layout: config.proportional_layout,
            init_mode: config.init_mode,
            width: 0,
            height: 0,
            laid_out: false,
            active_view: None,
            changes: Emitter::new(),
            root_subscription: Subscription::empty(),
        };
        grid.bind_root();
        grid
    }

    // --- accessors ---------------------------------------------------------

    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.root.orientation()
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn root(&self) -> &BranchNode {
        &self.root
    }

    #[must_use]
    pub fn proportional_layout(&self) -> bool {
        self.proportional_layout
    }

    /// Initialization mode configured for hosts rebuilding this grid.
    #[must_use]
    pub fn init_mode(&self) -> InitMode {
        self.init_mode
    }

    #[must_use]
    pub fn active_view(&self) -> Option<&str> {
        self.active_view.as_deref()
    }

    pub fn set_active_view(&mut self, id: Option<String>) {
        self.active_view = id;
    }

    #[must_use]
    pub fn minimum_width(&self) -> u32 {
        self.root_bounds(Orientation::Horizontal).0
    }

    #[must_use]
    pub fn maximum_width(&self) -> u32 {
        self.root_bounds(Orientation::Horizontal).1
    }

    #[must_use]
    pub fn minimum_height(&self) -> u32 {
        self.root_bounds(Orientation::Vertical).0
    }

    #[must_use]
    pub fn maximum_height(&self) -> u32 {
        self.root_bounds(Orientation::Vertical).1
    }

    /// Root bounds along the `axis` of the screen.
    fn root_bounds(&self, axis: Orientation) -> (u32, u32) {
        if axis == self.root.orientation() {
            (
                self.root.minimum_orthogonal_size(),
                self.root.maximum_orthogonal_size(),
            )
        } else {
            (self.root.minimum_size(), self.root.maximum_size())
        }
    }

    /// Fires when a change request bubbles out of the root.
    #[must_use]
    pub fn on_did_change(&self) -> Event<ViewChange> {
        self.changes.event()
    }

    // --- lookup ------------------------------------------------------------

    /// Node at `location`; the empty location is not a node.
    pub fn node(&self, location: &[usize]) -> Result<&Node, LayoutError> {
        let (&index, path) = location
            .split_last()
            .ok_or_else(|| LayoutError::invalid_location(location))?;
        branch_at(&self.root, path, location)?
            .child(index)
            .ok_or_else(|| LayoutError::invalid_location(location))
    }

    pub fn view(&self, location: &[usize]) -> Result<&dyn PanelView, LayoutError> {
        self.node(location)?
            .as_leaf()
            .map(LeafNode::view)
            .ok_or_else(|| LayoutError::invalid_location(location))
    }

    pub fn view_mut(&mut self, location: &[usize]) -> Result<&mut dyn PanelView, LayoutError> {
        let (&index, path) = location
            .split_last()
            .ok_or_else(|| LayoutError::invalid_location(location))?;
        branch_at_mut(&mut self.root, path, location)?
            .child_mut(index)
            .and_then(Node::as_leaf_mut)
            .map(LeafNode::view_mut)
            .ok_or_else(|| LayoutError::invalid_location(location))
    }

    /// Every panel with its location, in tree order.
    #[must_use]
    pub fn views(&self) -> Vec<(Vec<usize>, &dyn PanelView)> {
        let mut found = Vec::new();
        collect_views(&self.root, &mut Vec::new(), &mut found);
        found
    }

    /// Location of the first panel whose id is `id`.
    #[must_use]
    pub fn find_view(&self, id: &str) -> Option<Vec<usize>> {
        self.views()
            .into_iter()
            .find(|(_, view)| view.id() == id)
            .map(|(location, _)| location)
    }

    /// Screen rectangle of the node at `location` as of the last layout.
    pub fn view_rect(&self, location: &[usize]) -> Result<Rect, LayoutError> {
        let mut rect = Rect::new(0, 0, self.width, self.height);
        let mut branch = &self.root;
        for (depth, &index) in location.iter().enumerate() {
            let child = branch
                .child(index)
                .ok_or_else(|| LayoutError::invalid_location(location))?;
            let orientation = branch.orientation();
            let offset = (0..index)
                .filter_map(|i| branch.child_size(i))
                .fold(0u32, u32::saturating_add);
            let (_, rest) = rect.split_along(orientation, offset);
            let (slot, _) = rest.split_along(orientation, branch.child_size(index).unwrap_or(0));
            rect = slot;
            if depth + 1 < location.len() {
                branch = child
                    .as_branch()
                    .ok_or_else(|| LayoutError::invalid_location(location))?;
            }
        }
        Ok(rect)
    }

    pub fn is_view_visible(&self, location: &[usize]) -> Result<bool, LayoutError> {
        let (&index, path) = location
            .split_last()
            .ok_or_else(|| LayoutError::invalid_location(location))?;
        branch_at(&self.root, path, location)?.is_child_visible(index)
    }

    // --- structure ---------------------------------------------------------

    /// Add `view` at `location`.
    ///
    /// When the location's parent is a leaf, that leaf is replaced by a new
    /// branch holding the old leaf at index 0 and the new view at the last
    /// index of `location` (0 or 1). Split sizing then refers to the old
    /// leaf.
    pub fn add_view(
        &mut self,
        view: Box<dyn PanelView>,
        sizing: Sizing,
        location: &[usize],
    ) -> Result<(), LayoutError> {
        let (&index, parent_path) = location
            .split_last()
            .ok_or_else(|| LayoutError::invalid_location(location))?;

        let parent_is_leaf = match parent_path.split_last() {
            None => false,
            Some((&parent_index, grand_path)) => {
                match branch_at(&self.root, grand_path, location)?.child(parent_index) {
                    Some(Node::Leaf(_)) => true,
                    Some(Node::Branch(_)) => false,
                    None => return Err(LayoutError::invalid_location(location)),
                }
            }
        };

        if parent_is_leaf {
            self.split_leaf(view, sizing, parent_path, index, location)?;
        } else {
            let parent = branch_at_mut(&mut self.root, parent_path, location)?;
            let leaf = node::leaf_for_parent(view, parent.orientation(), parent.size());
            parent.add_child(leaf, sizing, index)?;
        }
        dockkit_core::debug!(location = ?location, "gridview add_view");
        Ok(())
    }

    fn split_leaf(
        &mut self,
        view: Box<dyn PanelView>,
        sizing: Sizing,
        leaf_path: &[usize],
        index: usize,
        location: &[usize],
    ) -> Result<(), LayoutError> {
        if index > 1 {
            return Err(LayoutError::out_of_range("add_view", index, 1));
        }
        let Some((&leaf_index, grand_path)) = leaf_path.split_last() else {
            return Err(LayoutError::invalid_location(location));
        };
        let proportional_layout = self.proportional_layout;
        let grand = branch_at_mut(&mut self.root, grand_path, location)?;
        let (node, size, cached) = grand.remove_child_without_layout(leaf_index)?;
        let Node::Leaf(mut sibling) = node else {
            return Err(LayoutError::invalid_location(location));
        };

        let grand_orientation = grand.orientation();
        let mut branch = BranchNode::with_size(
            grand_orientation.orthogonal(),
            proportional_layout,
            size,
            sibling.orthogonal_size(),
        );
        sibling.set_orientation(grand_orientation);
        let sibling_sizing = match cached {
            Some(cached_visible_size) => Sizing::Invisible {
                cached_visible_size,
            },
            None => Sizing::Size(0),
        };
        branch.add_child(Node::Leaf(sibling), sibling_sizing, 0)?;

        let sizing = match sizing {
            Sizing::Split(_) => Sizing::Split(0),
            other => other,
        };
        let leaf = LeafNode::new(view, grand_orientation, size);
        branch.add_child(Node::Leaf(leaf), sizing, index)?;
        grand.add_child(Node::Branch(branch), Sizing::Size(size), leaf_index)
    }

    /// Remove the leaf at `location` and hand back its panel.
    ///
    /// A branch left with a single child is collapsed into its parent; at
    /// the root a lone branch child becomes the new root.
    pub fn remove_view(
        &mut self,
        location: &[usize],
        sizing: Option<Sizing>,
    ) -> Result<Box<dyn PanelView>, LayoutError> {
        let (&index, parent_path) = location
            .split_last()
            .ok_or_else(|| LayoutError::invalid_location(location))?;
        let parent = branch_at_mut(&mut self.root, parent_path, location)?;
        if !matches!(parent.child(index), Some(Node::Leaf(_))) {
            return Err(LayoutError::invalid_location(location));
        }
        let Node::Leaf(leaf) = parent.remove_child(index, sizing)? else {
            return Err(LayoutError::invalid_location(location));
        };
        let view = leaf.into_view();
        let remaining = parent.child_count();
        dockkit_core::debug!(location = ?location, remaining, "gridview remove_view");
        if remaining != 1 {
            return Ok(view);
        }

        match parent_path.split_last() {
            None => self.promote_lone_branch()?,
            Some((&parent_index, grand_path)) => {
                self.collapse_into_parent(grand_path, parent_index, location)?;
            }
        }
        Ok(view)
    }

    fn promote_lone_branch(&mut self) -> Result<(), LayoutError> {
        if !matches!(self.root.child(0), Some(Node::Branch(_))) {
            return Ok(());
        }
        let (node, _, _) = self.root.remove_child_without_layout(0)?;
        if let Node::Branch(branch) = node {
            self.replace_root(branch);
            self.relayout();
        }
        Ok(())
    }

    fn collapse_into_parent(
        &mut self,
        grand_path: &[usize],
        parent_index: usize,
        location: &[usize],
    ) -> Result<(), LayoutError> {
        let grand = branch_at_mut(&mut self.root, grand_path, location)?;
        let mut sizes: Vec<u32> = (0..grand.child_count())
            .filter_map(|i| grand.child_size(i))
            .collect();
        let Some(Node::Branch(parent)) = grand.child_mut(parent_index) else {
            return Err(LayoutError::invalid_location(location));
        };
        let sibling_visible = parent.is_child_visible(0)?;
        let (sibling, _, _) = parent.remove_child_without_layout(0)?;
        grand.remove_child_without_layout(parent_index)?;

        match sibling {
            Node::Branch(mut sibling) => {
                let children = sibling.take_children();
                sizes.splice(
                    parent_index..=parent_index,
                    children.iter().map(|(_, size, _)| *size),
                );
                for (offset, (child, size, cached)) in children.into_iter().enumerate() {
                    let sizing = match cached {
                        Some(cached_visible_size) => Sizing::Invisible {
                            cached_visible_size,
                        },
                        None => Sizing::Size(size),
                    };
                    grand.add_child(child, sizing, parent_index + offset)?;
                }
            }
            Node::Leaf(mut sibling) => {
                sibling.set_orientation(grand.orientation().orthogonal());
                let size = sibling.orthogonal_size();
                let sizing = if sibling_visible {
                    Sizing::Size(size)
                } else {
                    Sizing::Invisible {
                        cached_visible_size: size,
                    }
                };
                grand.add_child(Node::Leaf(sibling), sizing, parent_index)?;
            }
        }

        for (index, size) in sizes.into_iter().enumerate() {
            grand.resize_child(index, size)?;
        }
        Ok(())
    }

    /// Reorder children of the branch at `parent_location`.
    pub fn move_view(
        &mut self,
        parent_location: &[usize],
        from: usize,
        to: usize,
    ) -> Result<(), LayoutError> {
        branch_at_mut(&mut self.root, parent_location, parent_location)?.move_child(from, to)
    }

    /// Resize the node at `location` along its parent's split axis.
    pub fn resize_view(&mut self, location: &[usize], size: u32) -> Result<(), LayoutError> {
        let (&index, parent_path) = location
            .split_last()
            .ok_or_else(|| LayoutError::invalid_location(location))?;
        branch_at_mut(&mut self.root, parent_path, location)?.resize_child(index, size)
    }

    /// Resize the node at `location` toward `dimensions` on both axes: along
    /// its parent, then its parent along the grandparent.
    pub fn resize_view_to(
        &mut self,
        location: &[usize],
        dimensions: Dimensions,
    ) -> Result<(), LayoutError> {
        let (&index, parent_path) = location
            .split_last()
            .ok_or_else(|| LayoutError::invalid_location(location))?;
        let parent = branch_at_mut(&mut self.root, parent_path, location)?;
        let along = dimensions.along(parent.orientation());
        parent.resize_child(index, along)?;

        if let Some((&parent_index, grand_path)) = parent_path.split_last() {
            let grand = branch_at_mut(&mut self.root, grand_path, location)?;
            let across = dimensions.along(grand.orientation());
            grand.resize_child(parent_index, across)?;
        }
        Ok(())
    }

    pub fn set_view_visible(&mut self, location: &[usize], visible: bool) -> Result<(), LayoutError> {
        let (&index, parent_path) = location
            .split_last()
            .ok_or_else(|| LayoutError::invalid_location(location))?;
        branch_at_mut(&mut self.root, parent_path, location)?.set_child_visible(index, visible)
    }

    // --- layout ------------------------------------------------------------

    pub fn layout(&mut self, width: u32, height: u32) {
        let _span = dockkit_core::debug_span!("gridview_layout", width, height).entered();
        self.width = width;
        self.height = height;
        self.laid_out = true;
        let dimensions = Dimensions::new(width, height);
        let orientation = self.root.orientation();
        self.root
            .layout(dimensions.across(orientation), dimensions.along(orientation));
    }

    fn relayout(&mut self) {
        if self.laid_out {
            self.layout(self.width, self.height);
        }
    }

    /// Flip every node of the tree to match `orientation`, keeping sizes.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        if self.root.orientation() == orientation {
            return;
        }
        self.root.flip();
        self.relayout();
    }

    /// Apply size requests queued anywhere in the tree, deepest first.
    pub fn apply_pending_changes(&mut self) {
        self.root.apply_pending_changes();
    }

    // --- teardown ----------------------------------------------------------

    /// Dispose every panel and start over with an empty root.
    pub fn clear(&mut self) -> DisposeReport {
        let orientation = self.root.orientation();
        let report = self.root.dispose();
        self.replace_root(BranchNode::new(orientation, self.proportional_layout));
        self.active_view = None;
        self.relayout();
        report
    }

    pub fn dispose(&mut self) -> DisposeReport {
        self.root_subscription.dispose();
        let report = self.root.dispose();
        self.changes.clear();
        report
    }

    pub(crate) fn replace_root(&mut self, root: BranchNode) {
        self.root = root;
        self.bind_root();
    }

    fn bind_root(&mut self) {
        let changes = self.changes.clone();
        self.root_subscription = self
            .root
            .on_did_change()
            .subscribe(move |change: &ViewChange| {
                changes.fire(change);
            });
    }
}

fn branch_at<'a>(
    root: &'a BranchNode,
    path: &[usize],
    location: &[usize],
) -> Result<&'a BranchNode, LayoutError> {
    let mut branch = root;
    for &index in path {
        branch = branch
            .child(index)
            .and_then(Node::as_branch)
            .ok_or_else(|| LayoutError::invalid_location(location))?;
    }
    Ok(branch)
}

fn branch_at_mut<'a>(
    root: &'a mut BranchNode,
    path: &[usize],
    location: &[usize],
) -> Result<&'a mut BranchNode, LayoutError> {
    let mut branch = root;
    for &index in path {
        branch = branch
            .child_mut(index)
            .and_then(Node::as_branch_mut)
            .ok_or_else(|| LayoutError::invalid_location(location))?;
    }
    Ok(branch)
}

fn collect_views<'a>(
    branch: &'a BranchNode,
    path: &mut Vec<usize>,
    found: &mut Vec<(Vec<usize>, &'a dyn PanelView)>,
) {
    for (index, child) in branch.children().enumerate() {
        path.push(index);
        match child {
            Node::Leaf(leaf) => found.push((path.clone(), leaf.view())),
            Node::Branch(inner) => collect_views(inner, path, found),
        }
        path.pop();
    }
}
