#![forbid(unsafe_code)]

//! Core: geometry, change notifications, lifecycle, and logging.

pub mod event;
pub mod geometry;
pub mod lifecycle;
pub mod logging;

pub use event::{Emitter, Event, FireOutcome, Subscription};
pub use geometry::{Dimensions, Orientation, Point, Rect};
pub use lifecycle::{DisposeFailure, DisposeReport, dispose_isolated, panic_message};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, error, trace, trace_span, warn};
