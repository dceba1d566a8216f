#![forbid(unsafe_code)]

//! Docking layout primitives.
//!
//! This crate provides the layout engine behind resizable, dockable panels:
//!
//! - [`SplitView`] - 1D layout of views separated by draggable sashes
//! - [`Gridview`] - 2D grid built from nested split views
//! - [`sizing`] - clamping, snapping, and priority helpers
//! - [`serialization`] - persisted layout format
//! - [`droptarget`] - drop-zone classification for drag-and-drop
//!
//! # Example
//!
//! ```
//! use dockkit_core::Orientation;
//! use dockkit_layout::{Gridview, SimplePanel, Sizing};
//!
//! let mut grid = Gridview::new(Orientation::Horizontal);
//! grid.layout(800, 600);
//! grid.add_view(SimplePanel::new("files").boxed(), Sizing::Size(200), &[0])?;
//! grid.add_view(SimplePanel::new("editor").boxed(), Sizing::Distribute, &[1])?;
//! grid.add_view(SimplePanel::new("terminal").boxed(), Sizing::Split(0), &[1, 1])?;
//!
//! assert_eq!(grid.views().len(), 3);
//! # Ok::<(), dockkit_layout::LayoutError>(())
//! ```

pub mod config;
pub mod droptarget;
pub mod error;
pub mod grid;
pub mod panel;
pub mod serialization;
pub mod sizing;
pub mod splitview;
pub mod view;

pub use config::LayoutConfig;
pub use droptarget::{
    ActivationSize, DragSession, DropTarget, DropZones, Position, calculate_quadrant,
    drop_preview_rect,
};
pub use error::LayoutError;
pub use grid::{BranchNode, Gridview, LeafNode, Node};
pub use panel::{PanelBound, PanelHandle, PanelState, PanelView, SimplePanel};
pub use serialization::{
    InitMode, PanelDeserializer, PendingInit, SerializableView, SerializedGridview,
    SerializedNode, SerializedSplitView, SerializedSplitViewItem, from_json_str, to_json_string,
};
pub use sizing::{LayoutPriority, SizeSource, Sizing, UNBOUNDED};
pub use splitview::{
    Sash, SashDragState, SashState, SplitView, SplitViewDescriptor, ViewDescriptor,
};
pub use view::{View, ViewChange};
