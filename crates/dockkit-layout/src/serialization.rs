//! Persisted layout format.
//!
//! A grid serializes to a recursive record tree:
//!
//! ```text
//! { "root": { "type": "branch", "data": [ ... ], "size": 600 },
//!   "width": 800, "height": 600, "orientation": "HORIZONTAL",
//!   "activeView": "editor" }
//! ```
//!
//! A node's `size` is its extent along the parent's split axis; the root
//! branch's `size` is its extent across its own axis. Hidden nodes carry
//! their cached visible size and `"visible": false`.
//!
//! [`Gridview::from_json`] is destructive: it clears the grid before
//! rebuilding, every location obtained earlier is invalid afterwards, and a
//! failed rebuild leaves the grid empty.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use dockkit_core::{Dimensions, Orientation};

use crate::error::LayoutError;
use crate::grid::{BranchNode, Gridview, LeafNode, Node};
use crate::panel::PanelView;
use crate::splitview::{SplitView, SplitViewDescriptor, ViewDescriptor};
use crate::view::View;

/// One node of a serialized grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SerializedNode {
    Branch {
        data: Vec<SerializedNode>,
        size: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        visible: Option<bool>,
    },
    Leaf {
        data: Value,
        size: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        visible: Option<bool>,
    },
}

impl SerializedNode {
    #[must_use]
    pub fn size(&self) -> u32 {
        match self {
            Self::Branch { size, .. } | Self::Leaf { size, .. } => *size,
        }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        match self {
            Self::Branch { visible, .. } | Self::Leaf { visible, .. } => visible.unwrap_or(true),
        }
    }
}

/// Root record of a serialized grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedGridview {
    pub root: SerializedNode,
    pub width: u32,
    pub height: u32,
    pub orientation: Orientation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_view: Option<String>,
}

/// One view of a serialized standalone split view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedSplitViewItem {
    pub size: u32,
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
}

/// Root record of a serialized standalone split view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedSplitView {
    pub views: Vec<SerializedSplitViewItem>,
    pub size: u32,
    pub orientation: Orientation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_view: Option<String>,
}

// ---------------------------------------------------------------------------
// Host hooks
// ---------------------------------------------------------------------------

/// Turns a leaf's `data` back into a panel.
pub trait PanelDeserializer {
    fn deserialize(&self, data: &Value) -> Result<Box<dyn PanelView>, LayoutError>;
}

impl<F> PanelDeserializer for F
where
    F: Fn(&Value) -> Result<Box<dyn PanelView>, LayoutError>,
{
    fn deserialize(&self, data: &Value) -> Result<Box<dyn PanelView>, LayoutError> {
        self(data)
    }
}

/// A split view item that can persist its own state.
pub trait SerializableView: View {
    fn to_json(&self) -> Value;
}

/// When panels of a rebuilt grid get their `init` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitMode {
    /// Inside [`Gridview::from_json`].
    #[default]
    Immediate,
    /// Handed back as a [`PendingInit`] for the host's next tick.
    Deferred,
}

/// Panels still waiting for `init` after a deferred rebuild.
///
/// Locations are valid until the next structural change of the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use = "deferred panels are only initialized by `PendingInit::run`"]
pub struct PendingInit {
    locations: Vec<Vec<usize>>,
}

impl PendingInit {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    #[must_use]
    pub fn locations(&self) -> &[Vec<usize>] {
        &self.locations
    }

    /// Initialize every queued panel still present; returns how many ran.
    pub fn run(self, grid: &mut Gridview) -> usize {
        let mut initialized = 0;
        for location in self.locations {
            match grid.view_mut(&location) {
                Ok(view) => {
                    view.init();
                    initialized += 1;
                }
                Err(_err) => {
                    dockkit_core::warn!(error = %_err, "skipping init of a panel that moved");
                }
            }
        }
        initialized
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

impl Gridview {
    #[must_use]
    pub fn to_json(&self) -> SerializedGridview {
        SerializedGridview {
            root: serialize_branch(self.root(), self.root().size(), None),
            width: self.width(),
            height: self.height(),
            orientation: self.orientation(),
            active_view: self.active_view().map(str::to_owned),
        }
    }

    /// Replace the whole tree with `data`, initializing panels per the
    /// grid's configured [`InitMode`].
    pub fn from_json(
        &mut self,
        data: &SerializedGridview,
        deserializer: &impl PanelDeserializer,
    ) -> Result<PendingInit, LayoutError> {
        self.from_json_with_mode(data, deserializer, self.init_mode())
    }

    /// Replace the whole tree with `data`.
    ///
    /// The grid is cleared (and its panels disposed) first. With
    /// [`InitMode::Deferred`] the returned [`PendingInit`] must be run by the
    /// caller; with [`InitMode::Immediate`] it comes back empty.
    pub fn from_json_with_mode(
        &mut self,
        data: &SerializedGridview,
        deserializer: &impl PanelDeserializer,
        mode: InitMode,
    ) -> Result<PendingInit, LayoutError> {
        let _span = dockkit_core::debug_span!(
            "gridview_from_json",
            width = data.width,
            height = data.height
        )
        .entered();

        let report = self.clear();
        if !report.is_clean() {
            dockkit_core::warn!(
                failures = report.failures.len(),
                "panels failed to dispose while clearing the grid"
            );
        }

        let orthogonal_size = Dimensions::new(data.width, data.height).along(data.orientation);
        let root = match deserialize_node(
            &data.root,
            data.orientation,
            orthogonal_size,
            deserializer,
            self.proportional_layout(),
        )? {
            Node::Branch(root) => root,
            Node::Leaf(_) => {
                return Err(LayoutError::Deserialize("root node must be a branch".into()));
            }
        };
        self.replace_root(root);
        self.set_active_view(data.active_view.clone());
        self.layout(data.width, data.height);

        let pending = PendingInit {
            locations: self
                .views()
                .into_iter()
                .map(|(location, _)| location)
                .collect(),
        };
        dockkit_core::debug!(panels = pending.len(), ?mode, "gridview rebuilt");
        match mode {
            InitMode::Immediate => {
                pending.run(self);
                Ok(PendingInit::default())
            }
            InitMode::Deferred => Ok(pending),
        }
    }
}

fn serialize_branch(branch: &BranchNode, size: u32, visible: Option<bool>) -> SerializedNode {
    let data = branch
        .children()
        .enumerate()
        .map(|(index, child)| {
            let cached = branch.child_cached_visible_size(index).ok().flatten();
            let size = cached.unwrap_or_else(|| branch.child_size(index).unwrap_or(0));
            let visible = cached.map(|_| false);
            match child {
                Node::Branch(inner) => serialize_branch(inner, size, visible),
                Node::Leaf(leaf) => SerializedNode::Leaf {
                    data: leaf.view().to_json(),
                    size,
                    visible,
                },
            }
        })
        .collect();
    SerializedNode::Branch {
        data,
        size,
        visible,
    }
}

/// Rebuild `node` as a child of a branch orthogonal to `orientation`.
fn deserialize_node(
    node: &SerializedNode,
    orientation: Orientation,
    orthogonal_size: u32,
    deserializer: &impl PanelDeserializer,
    proportional_layout: bool,
) -> Result<Node, LayoutError> {
    match node {
        SerializedNode::Branch { data, size, .. } => {
            let children = data
                .iter()
                .map(|child| {
                    Ok(ViewDescriptor {
                        view: deserialize_node(
                            child,
                            orientation.orthogonal(),
                            *size,
                            deserializer,
                            proportional_layout,
                        )?,
                        size: child.size(),
                        visible: child.is_visible(),
                    })
                })
                .collect::<Result<Vec<_>, LayoutError>>()?;
            Ok(Node::Branch(BranchNode::from_children(
                orientation,
                proportional_layout,
                *size,
                orthogonal_size,
                children,
            )))
        }
        SerializedNode::Leaf { data, size, .. } => {
            let view = deserializer.deserialize(data)?;
            Ok(Node::Leaf(LeafNode::with_size(
                view,
                orientation,
                orthogonal_size,
                *size,
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// Standalone split view
// ---------------------------------------------------------------------------

impl<V: SerializableView> SplitView<V> {
    #[must_use]
    pub fn to_json(&self) -> SerializedSplitView {
        let views = self
            .views()
            .enumerate()
            .map(|(index, view)| {
                let cached = self.view_cached_visible_size(index).ok().flatten();
                SerializedSplitViewItem {
                    size: cached.unwrap_or_else(|| self.view_size(index).unwrap_or(0)),
                    data: view.to_json(),
                    visible: cached.map(|_| false),
                }
            })
            .collect();
        SerializedSplitView {
            views,
            size: self.size(),
            orientation: self.orientation(),
            active_view: None,
        }
    }

    /// Rebuild from `data` without laying out; the first
    /// [`layout`](Self::layout) rescales the stored sizes.
    pub fn from_json(
        data: &SerializedSplitView,
        proportional_layout: bool,
        deserialize: impl Fn(&Value) -> Result<V, LayoutError>,
    ) -> Result<Self, LayoutError> {
        let views = data
            .views
            .iter()
            .map(|item| {
                Ok(ViewDescriptor {
                    view: deserialize(&item.data)?,
                    size: item.size,
                    visible: item.visible.unwrap_or(true),
                })
            })
            .collect::<Result<Vec<_>, LayoutError>>()?;
        Ok(Self::from_descriptor(
            data.orientation,
            proportional_layout,
            SplitViewDescriptor {
                size: data.size,
                views,
            },
        ))
    }
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

pub fn to_json_string(grid: &Gridview) -> Result<String, LayoutError> {
    serde_json::to_string(&grid.to_json()).map_err(|err| LayoutError::Serialize(err.to_string()))
}

pub fn from_json_str(text: &str) -> Result<SerializedGridview, LayoutError> {
    serde_json::from_str(text).map_err(|err| LayoutError::Deserialize(err.to_string()))
}
