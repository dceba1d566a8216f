//! Leaf node: adapts a two-dimensional panel to its parent's split axis.
//!
//! A leaf's orientation is always orthogonal to its parent branch. Its
//! `size` runs along the parent's split axis and its `orthogonal_size`
//! across it.

use std::cell::Cell;
use std::rc::Rc;

use dockkit_core::{Dimensions, Emitter, Event, Orientation, Subscription};

use crate::panel::PanelView;
use crate::view::ViewChange;

pub struct LeafNode {
    view: Box<dyn PanelView>,
    orientation: Rc<Cell<Orientation>>,
    size: u32,
    orthogonal_size: u32,
    changes: Emitter<ViewChange>,
    _subscription: Subscription,
}

impl LeafNode {
    #[must_use]
    pub fn new(view: Box<dyn PanelView>, orientation: Orientation, orthogonal_size: u32) -> Self {
        Self::with_size(view, orientation, orthogonal_size, 0)
    }

    #[must_use]
    pub fn with_size(
        view: Box<dyn PanelView>,
        orientation: Orientation,
        orthogonal_size: u32,
        size: u32,
    ) -> Self {
        let orientation = Rc::new(Cell::new(orientation));
        let changes = Emitter::new();
        let subscription = {
            let orientation = Rc::clone(&orientation);
            let changes = changes.clone();
            view.on_did_change()
                .subscribe(move |requested: &Option<Dimensions>| {
                    let parent_axis = orientation.get().orthogonal();
                    let change = match requested {
                        Some(dimensions) => ViewChange {
                            size: Some(dimensions.along(parent_axis)),
                            orthogonal_size: Some(dimensions.across(parent_axis)),
                        },
                        None => ViewChange::default(),
                    };
                    changes.fire(&change);
                })
        };
        Self {
            view,
            orientation,
            size,
            orthogonal_size,
            changes,
            _subscription: subscription,
        }
    }

    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation.get()
    }

    pub(crate) fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation.set(orientation);
    }

    /// Extent along the parent's split axis.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Extent across the parent's split axis.
    #[must_use]
    pub fn orthogonal_size(&self) -> u32 {
        self.orthogonal_size
    }

    #[must_use]
    pub fn view(&self) -> &dyn PanelView {
        self.view.as_ref()
    }

    pub fn view_mut(&mut self) -> &mut dyn PanelView {
        self.view.as_mut()
    }

    /// Detach from the panel and hand it back.
    #[must_use]
    pub fn into_view(self) -> Box<dyn PanelView> {
        self.view
    }

    fn bounds(&self, axis: Orientation) -> (u32, u32) {
        match axis {
            Orientation::Horizontal => (self.view.minimum_width(), self.view.maximum_width()),
            Orientation::Vertical => (self.view.minimum_height(), self.view.maximum_height()),
        }
    }

    pub(crate) fn minimum_size(&self) -> u32 {
        self.bounds(self.orientation().orthogonal()).0
    }

    pub(crate) fn maximum_size(&self) -> u32 {
        self.bounds(self.orientation().orthogonal()).1
    }

    pub(crate) fn minimum_orthogonal_size(&self) -> u32 {
        self.bounds(self.orientation()).0
    }

    pub(crate) fn maximum_orthogonal_size(&self) -> u32 {
        self.bounds(self.orientation()).1
    }

    pub(crate) fn on_did_change(&self) -> Event<ViewChange> {
        self.changes.event()
    }

    pub(crate) fn layout(&mut self, size: u32, orthogonal_size: u32) {
        self.size = size;
        self.orthogonal_size = orthogonal_size;
        let dimensions =
            Dimensions::from_axes(self.orientation().orthogonal(), size, orthogonal_size);
        self.view.layout(dimensions.width, dimensions.height);
    }
}

impl std::fmt::Debug for LeafNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeafNode")
            .field("id", &self.view.id())
            .field("orientation", &self.orientation())
            .field("size", &self.size)
            .field("orthogonal_size", &self.orthogonal_size)
            .finish()
    }
}
