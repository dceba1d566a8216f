//! Leaf-level views of a grid.
//!
//! A [`PanelView`] is what a host puts into a grid cell: it has independent
//! width and height bounds and is laid out in two dimensions. The grid's
//! leaf nodes translate those into the one-dimensional [`View`] contract of
//! the split view that holds them.
//!
//! [`View`]: crate::View

use std::cell::RefCell;
use std::rc::Rc;

use dockkit_core::{Dimensions, Emitter, Event};
use serde_json::{Value, json};

use crate::error::LayoutError;
use crate::sizing::{LayoutPriority, SizeSource, UNBOUNDED};

/// A host-supplied view placed in a grid leaf.
pub trait PanelView {
    /// Stable identifier, used for `activeView` and by deserializers.
    fn id(&self) -> &str;

    fn minimum_width(&self) -> u32;

    fn maximum_width(&self) -> u32 {
        UNBOUNDED
    }

    fn minimum_height(&self) -> u32;

    fn maximum_height(&self) -> u32 {
        UNBOUNDED
    }

    fn snap_size(&self) -> Option<u32> {
        None
    }

    fn priority(&self) -> LayoutPriority {
        LayoutPriority::Normal
    }

    /// Fires with the dimensions the panel would like, or `None` to only
    /// re-validate its constraints.
    fn on_did_change(&self) -> Event<Option<Dimensions>>;

    fn layout(&mut self, width: u32, height: u32);

    fn set_visible(&mut self, _visible: bool) {}

    /// Panel state stored in the `data` field of a serialized leaf.
    fn to_json(&self) -> Value;

    /// Deferred initialization after a grid has been rebuilt.
    fn init(&mut self) {}

    fn dispose(&mut self) {}
}

/// Observable state of a [`SimplePanel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanelState {
    /// Dimensions from the last layout.
    pub dimensions: Dimensions,
    pub visible: bool,
    pub init_count: u32,
    pub disposed: bool,
}

/// Shared handle to a [`SimplePanel`] that stays usable after the panel has
/// been moved into a grid.
#[derive(Debug, Clone)]
pub struct PanelHandle {
    state: Rc<RefCell<PanelState>>,
    changes: Emitter<Option<Dimensions>>,
}

impl PanelHandle {
    #[must_use]
    pub fn state(&self) -> PanelState {
        *self.state.borrow()
    }

    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        self.state.borrow().dimensions
    }

    /// Ask the containing layout for new dimensions; applied on the next
    /// pending-change flush.
    pub fn request_size(&self, dimensions: Dimensions) {
        self.changes.fire(&Some(dimensions));
    }

    /// Ask the containing layout to re-validate the panel's constraints.
    pub fn invalidate(&self) {
        self.changes.fire(&None);
    }
}

/// One of the four size bounds of a [`SimplePanel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelBound {
    MinimumWidth,
    MaximumWidth,
    MinimumHeight,
    MaximumHeight,
}

/// A [`PanelView`] built from constraints, for hosts whose panels need no
/// behavior beyond sizing.
#[derive(Debug)]
pub struct SimplePanel {
    id: String,
    minimum_width: SizeSource,
    maximum_width: SizeSource,
    minimum_height: SizeSource,
    maximum_height: SizeSource,
    snap_size: Option<u32>,
    priority: LayoutPriority,
    params: Value,
    handle: PanelHandle,
}

impl SimplePanel {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            minimum_width: SizeSource::Fixed(0),
            maximum_width: SizeSource::Fixed(UNBOUNDED),
            minimum_height: SizeSource::Fixed(0),
            maximum_height: SizeSource::Fixed(UNBOUNDED),
            snap_size: None,
            priority: LayoutPriority::Normal,
            params: Value::Null,
            handle: PanelHandle {
                state: Rc::new(RefCell::new(PanelState {
                    visible: true,
                    ..PanelState::default()
                })),
                changes: Emitter::new(),
            },
        }
    }

    /// Rebuild a panel from the `data` written by [`PanelView::to_json`].
    pub fn from_json(data: &Value) -> Result<Self, LayoutError> {
        let id = data
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| LayoutError::Deserialize("panel data has no string `id`".into()))?;
        let mut panel = Self::new(id);
        if let Some(params) = data.get("params") {
            panel.params = params.clone();
        }
        Ok(panel)
    }

    #[must_use]
    pub fn with_minimum_width(self, size: u32) -> Self {
        self.with_size_source(PanelBound::MinimumWidth, SizeSource::Fixed(size))
    }

    #[must_use]
    pub fn with_maximum_width(self, size: u32) -> Self {
        self.with_size_source(PanelBound::MaximumWidth, SizeSource::Fixed(size))
    }

    #[must_use]
    pub fn with_minimum_height(self, size: u32) -> Self {
        self.with_size_source(PanelBound::MinimumHeight, SizeSource::Fixed(size))
    }

    #[must_use]
    pub fn with_maximum_height(self, size: u32) -> Self {
        self.with_size_source(PanelBound::MaximumHeight, SizeSource::Fixed(size))
    }

    /// Replace one bound with a fixed or computed source.
    #[must_use]
    pub fn with_size_source(mut self, bound: PanelBound, source: SizeSource) -> Self {
        match bound {
            PanelBound::MinimumWidth => self.minimum_width = source,
            PanelBound::MaximumWidth => self.maximum_width = source,
            PanelBound::MinimumHeight => self.minimum_height = source,
            PanelBound::MaximumHeight => self.maximum_height = source,
        }
        self
    }

    #[must_use]
    pub fn with_snap_size(mut self, snap: u32) -> Self {
        self.snap_size = Some(snap);
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: LayoutPriority) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn handle(&self) -> PanelHandle {
        self.handle.clone()
    }

    /// Box the panel for insertion into a grid.
    #[must_use]
    pub fn boxed(self) -> Box<dyn PanelView> {
        Box::new(self)
    }
}

impl PanelView for SimplePanel {
    fn id(&self) -> &str {
        &self.id
    }

    fn minimum_width(&self) -> u32 {
        self.minimum_width.resolve()
    }

    fn maximum_width(&self) -> u32 {
        self.maximum_width.resolve()
    }

    fn minimum_height(&self) -> u32 {
        self.minimum_height.resolve()
    }

    fn maximum_height(&self) -> u32 {
        self.maximum_height.resolve()
    }

    fn snap_size(&self) -> Option<u32> {
        self.snap_size
    }

    fn priority(&self) -> LayoutPriority {
        self.priority
    }

    fn on_did_change(&self) -> Event<Option<Dimensions>> {
        self.handle.changes.event()
    }

    fn layout(&mut self, width: u32, height: u32) {
        self.handle.state.borrow_mut().dimensions = Dimensions::new(width, height);
    }

    fn set_visible(&mut self, visible: bool) {
        self.handle.state.borrow_mut().visible = visible;
    }

    fn to_json(&self) -> Value {
        if self.params.is_null() {
            json!({ "id": self.id })
        } else {
            json!({ "id": self.id, "params": self.params })
        }
    }

    fn init(&mut self) {
        self.handle.state.borrow_mut().init_count += 1;
    }

    fn dispose(&mut self) {
        self.handle.state.borrow_mut().disposed = true;
    }
}
