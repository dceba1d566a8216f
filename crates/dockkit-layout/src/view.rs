//! The contract between a split view and the views it arranges.

use dockkit_core::{DisposeReport, Event};

use crate::sizing::{LayoutPriority, UNBOUNDED};

/// A view's request to be resized.
///
/// `size` is along the containing split axis, `orthogonal_size` across it.
/// `None` means "no preference, just re-validate my constraints".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewChange {
    pub size: Option<u32>,
    pub orthogonal_size: Option<u32>,
}

impl ViewChange {
    #[must_use]
    pub const fn size(size: u32) -> Self {
        Self {
            size: Some(size),
            orthogonal_size: None,
        }
    }
}

/// Something a [`SplitView`](crate::SplitView) can size and lay out.
///
/// Sizes are along the split axis of the containing split view. The engine
/// only reads constraints and calls [`View::layout`]; it never replaces or
/// clones the view.
pub trait View {
    fn minimum_size(&self) -> u32;

    fn maximum_size(&self) -> u32 {
        UNBOUNDED
    }

    /// Below this threshold the view collapses to zero instead of resting at
    /// its minimum.
    fn snap_size(&self) -> Option<u32> {
        None
    }

    fn priority(&self) -> LayoutPriority {
        LayoutPriority::Normal
    }

    /// Fires when the view wants a new size.
    fn on_did_change(&self) -> Event<ViewChange>;

    fn layout(&mut self, size: u32, orthogonal_size: u32);

    fn set_visible(&mut self, _visible: bool) {}

    /// Apply size requests queued inside nested layouts.
    fn flush_pending(&mut self) {}

    /// Release resources. Failures of nested collaborators are reported, not
    /// propagated.
    fn dispose(&mut self) -> DisposeReport {
        DisposeReport::default()
    }
}
