//! Grid tree node: either a leaf wrapping a panel or a branch holding a
//! nested split view.

use dockkit_core::{DisposeReport, Event, Orientation};

use super::branch::BranchNode;
use super::leaf::LeafNode;
use crate::panel::PanelView;
use crate::sizing::LayoutPriority;
use crate::view::{View, ViewChange};

#[derive(Debug)]
pub enum Node {
    Leaf(LeafNode),
    Branch(BranchNode),
}

impl Node {
    #[must_use]
    pub fn orientation(&self) -> Orientation {
        match self {
            Self::Leaf(leaf) => leaf.orientation(),
            Self::Branch(branch) => branch.orientation(),
        }
    }

    /// Extent along the parent's split axis.
    #[must_use]
    pub fn size(&self) -> u32 {
        match self {
            Self::Leaf(leaf) => leaf.size(),
            Self::Branch(branch) => branch.size(),
        }
    }

    /// Extent across the parent's split axis.
    #[must_use]
    pub fn orthogonal_size(&self) -> u32 {
        match self {
            Self::Leaf(leaf) => leaf.orthogonal_size(),
            Self::Branch(branch) => branch.orthogonal_size(),
        }
    }

    #[must_use]
    pub fn minimum_orthogonal_size(&self) -> u32 {
        match self {
            Self::Leaf(leaf) => leaf.minimum_orthogonal_size(),
            Self::Branch(branch) => branch.minimum_orthogonal_size(),
        }
    }

    #[must_use]
    pub fn maximum_orthogonal_size(&self) -> u32 {
        match self {
            Self::Leaf(leaf) => leaf.maximum_orthogonal_size(),
            Self::Branch(branch) => branch.maximum_orthogonal_size(),
        }
    }

    #[must_use]
    pub fn as_leaf(&self) -> Option<&LeafNode> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Branch(_) => None,
        }
    }

    #[must_use]
    pub fn as_branch(&self) -> Option<&BranchNode> {
        match self {
            Self::Branch(branch) => Some(branch),
            Self::Leaf(_) => None,
        }
    }

    pub fn as_branch_mut(&mut self) -> Option<&mut BranchNode> {
        match self {
            Self::Branch(branch) => Some(branch),
            Self::Leaf(_) => None,
        }
    }

    pub fn as_leaf_mut(&mut self) -> Option<&mut LeafNode> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Branch(_) => None,
        }
    }

    /// Swap the orientation of this node and everything below it.
    pub(crate) fn flip(&mut self) {
        match self {
            Self::Leaf(leaf) => leaf.set_orientation(leaf.orientation().orthogonal()),
            Self::Branch(branch) => branch.flip(),
        }
    }
}

impl View for Node {
    fn minimum_size(&self) -> u32 {
        match self {
            Self::Leaf(leaf) => leaf.minimum_size(),
            Self::Branch(branch) => branch.minimum_size(),
        }
    }

    fn maximum_size(&self) -> u32 {
        match self {
            Self::Leaf(leaf) => leaf.maximum_size(),
            Self::Branch(branch) => branch.maximum_size(),
        }
    }

    fn snap_size(&self) -> Option<u32> {
        match self {
            Self::Leaf(leaf) => leaf.view().snap_size(),
            Self::Branch(_) => None,
        }
    }

    fn priority(&self) -> LayoutPriority {
        match self {
            Self::Leaf(leaf) => leaf.view().priority(),
            Self::Branch(branch) => branch.priority(),
        }
    }

    fn on_did_change(&self) -> Event<ViewChange> {
        match self {
            Self::Leaf(leaf) => leaf.on_did_change(),
            Self::Branch(branch) => branch.on_did_change(),
        }
    }

    fn layout(&mut self, size: u32, orthogonal_size: u32) {
        match self {
            Self::Leaf(leaf) => leaf.layout(size, orthogonal_size),
            Self::Branch(branch) => branch.layout(size, orthogonal_size),
        }
    }

    fn set_visible(&mut self, visible: bool) {
        match self {
            Self::Leaf(leaf) => leaf.view_mut().set_visible(visible),
            Self::Branch(branch) => branch.set_visible(visible),
        }
    }

    fn flush_pending(&mut self) {
        if let Self::Branch(branch) = self {
            branch.apply_pending_changes();
        }
    }

    fn dispose(&mut self) -> DisposeReport {
        match self {
            Self::Leaf(leaf) => {
                let mut report = DisposeReport::default();
                let label = format!("panel {}", leaf.view().id());
                report.run(label, || leaf.view_mut().dispose());
                report
            }
            Self::Branch(branch) => branch.dispose(),
        }
    }
}

impl From<LeafNode> for Node {
    fn from(leaf: LeafNode) -> Self {
        Self::Leaf(leaf)
    }
}

impl From<BranchNode> for Node {
    fn from(branch: BranchNode) -> Self {
        Self::Branch(branch)
    }
}

/// Wrap a panel as a leaf child of a branch with `parent` orientation.
pub(crate) fn leaf_for_parent(
    view: Box<dyn PanelView>,
    parent: Orientation,
    orthogonal_size: u32,
) -> Node {
    Node::Leaf(LeafNode::new(view, parent.orthogonal(), orthogonal_size))
}
