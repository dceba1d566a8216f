//! Drop-zone classification for drag-and-drop docking.
//!
//! A pointer hovering over a target rectangle is classified into one of
//! five zones: a band along each edge, or the center. Bands are measured
//! either as a percentage of the rectangle or in pixels.
//!
//! ```text
//!   +------------------------+
//!   |          top           |
//!   +----+------------+------+
//!   |left|   center   |right |
//!   +----+------------+------+
//!   |         bottom         |
//!   +------------------------+
//! ```
//!
//! Edges are checked in a fixed order (left, right, top, bottom) and the
//! first accepted match wins, so a corner resolves to its horizontal edge.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use dockkit_core::{Orientation, Point, Rect};

/// Zone of a drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Left,
    Right,
    Top,
    Bottom,
    Center,
}

impl Position {
    /// Split axis a drop on this edge creates; `None` for the center.
    #[must_use]
    pub const fn orientation(self) -> Option<Orientation> {
        match self {
            Self::Left | Self::Right => Some(Orientation::Horizontal),
            Self::Top | Self::Bottom => Some(Orientation::Vertical),
            Self::Center => None,
        }
    }

    /// Whether the dropped view goes after the target along the split axis.
    #[must_use]
    pub const fn is_after(self) -> bool {
        matches!(self, Self::Right | Self::Bottom)
    }

    #[must_use]
    pub const fn zone(self) -> DropZones {
        match self {
            Self::Left => DropZones::LEFT,
            Self::Right => DropZones::RIGHT,
            Self::Top => DropZones::TOP,
            Self::Bottom => DropZones::BOTTOM,
            Self::Center => DropZones::CENTER,
        }
    }
}

bitflags! {
    /// Set of zones a drop target accepts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DropZones: u8 {
        const LEFT   = 0b0_0001;
        const RIGHT  = 0b0_0010;
        const TOP    = 0b0_0100;
        const BOTTOM = 0b0_1000;
        const CENTER = 0b1_0000;
        const EDGES  = Self::LEFT.bits() | Self::RIGHT.bits() | Self::TOP.bits() | Self::BOTTOM.bits();
        const ALL    = Self::EDGES.bits() | Self::CENTER.bits();
    }
}

impl DropZones {
    #[must_use]
    pub const fn accepts(self, position: Position) -> bool {
        self.contains(position.zone())
    }
}

impl Default for DropZones {
    fn default() -> Self {
        Self::ALL
    }
}

/// Width of the edge bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ActivationSize {
    /// Band as a percentage of the rectangle's width or height.
    Percentage(f64),
    Pixels(f64),
}

impl Default for ActivationSize {
    fn default() -> Self {
        Self::Percentage(20.0)
    }
}

impl ActivationSize {
    /// Parse `"20%"`, `"12px"`, or a bare number (a percentage).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        let (number, percentage) = if let Some(number) = value.strip_suffix('%') {
            (number, true)
        } else if let Some(number) = value.strip_suffix("px") {
            (number, false)
        } else {
            (value.as_str(), true)
        };
        let number: f64 = number.trim().parse().ok()?;
        if !number.is_finite() || number < 0.0 {
            return None;
        }
        Some(if percentage {
            Self::Percentage(number)
        } else {
            Self::Pixels(number)
        })
    }
}

/// Classify `(x, y)`, relative to a `width` x `height` rectangle, into an
/// accepted zone.
///
/// Returns `None` when no accepted zone matches or the rectangle is
/// degenerate.
#[must_use]
pub fn calculate_quadrant(
    accepted: DropZones,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    activation: ActivationSize,
) -> Option<Position> {
    if !(width > 0.0 && height > 0.0) {
        return None;
    }
    let (xp, yp, threshold, x_limit, y_limit) = match activation {
        ActivationSize::Percentage(threshold) => (
            100.0 * x / width,
            100.0 * y / height,
            threshold,
            100.0 - threshold,
            100.0 - threshold,
        ),
        ActivationSize::Pixels(threshold) => {
            (x, y, threshold, width - threshold, height - threshold)
        }
    };

    if accepted.contains(DropZones::LEFT) && xp < threshold {
        return Some(Position::Left);
    }
    if accepted.contains(DropZones::RIGHT) && xp > x_limit {
        return Some(Position::Right);
    }
    if accepted.contains(DropZones::TOP) && yp < threshold {
        return Some(Position::Top);
    }
    if accepted.contains(DropZones::BOTTOM) && yp > y_limit {
        return Some(Position::Bottom);
    }
    accepted
        .contains(DropZones::CENTER)
        .then_some(Position::Center)
}

/// Part of `rect` a host highlights while hovering `position`.
#[must_use]
pub fn drop_preview_rect(position: Position, rect: Rect) -> Rect {
    match position {
        Position::Left => rect.split_along(Orientation::Horizontal, rect.width / 2).0,
        Position::Right => rect.split_along(Orientation::Horizontal, rect.width - rect.width / 2).1,
        Position::Top => rect.split_along(Orientation::Vertical, rect.height / 2).0,
        Position::Bottom => rect.split_along(Orientation::Vertical, rect.height - rect.height / 2).1,
        Position::Center => rect,
    }
}

// ---------------------------------------------------------------------------
// Drag session
// ---------------------------------------------------------------------------

/// What is being dragged, passed explicitly to every target that may
/// receive it.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession<T> {
    payload: Option<T>,
}

impl<T> Default for DragSession<T> {
    fn default() -> Self {
        Self { payload: None }
    }
}

impl<T> DragSession<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start dragging `payload`, replacing any previous one.
    pub fn begin(&mut self, payload: T) {
        self.payload = Some(payload);
    }

    #[must_use]
    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.payload.is_some()
    }

    /// Finish the drag and take the payload back.
    pub fn end(&mut self) -> Option<T> {
        self.payload.take()
    }
}

/// A region that accepts drops.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DropTarget {
    pub accepted: DropZones,
    pub activation: ActivationSize,
}

impl DropTarget {
    #[must_use]
    pub fn new(accepted: DropZones, activation: ActivationSize) -> Self {
        Self {
            accepted,
            activation,
        }
    }

    /// Zone under `point` (absolute coordinates) over `rect`, if the drag
    /// is active and `can_display` agrees.
    pub fn on_drag_over<T>(
        &self,
        session: &DragSession<T>,
        point: Point,
        rect: Rect,
        can_display: impl Fn(&T, Position) -> bool,
    ) -> Option<Position> {
        let payload = session.payload()?;
        if !rect.contains(point) {
            return None;
        }
        let local = rect.relative(point);
        let position = calculate_quadrant(
            self.accepted,
            local.x,
            local.y,
            f64::from(rect.width),
            f64::from(rect.height),
            self.activation,
        )?;
        let allowed = can_display(payload, position);
        dockkit_core::trace!(?position, allowed, "drag over drop target");
        allowed.then_some(position)
    }
}
