//! Layout error taxonomy.
//!
//! Only programmer errors surface here. Infeasible size constraints are
//! absorbed by clamping and never reported.

use std::fmt;

/// Errors raised by split view, grid, and serialization operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// An index argument was outside the valid range for `operation`.
    IndexOutOfRange {
        operation: &'static str,
        index: usize,
        len: usize,
    },
    /// A grid location does not address a node of the required kind.
    InvalidLocation { location: Vec<usize> },
    /// A sash drag update or end arrived without a drag in progress.
    NoActiveDrag,
    /// A sash drag was started while another one is active.
    DragInProgress { sash_index: usize },
    /// Serialized layout data could not be turned into a tree.
    Deserialize(String),
    /// A layout could not be rendered to text.
    Serialize(String),
}

impl LayoutError {
    pub(crate) fn out_of_range(operation: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange {
            operation,
            index,
            len,
        }
    }

    pub(crate) fn invalid_location(location: &[usize]) -> Self {
        Self::InvalidLocation {
            location: location.to_vec(),
        }
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange {
                operation,
                index,
                len,
            } => write!(f, "{operation}: index {index} out of range (len {len})"),
            Self::InvalidLocation { location } => write!(f, "invalid grid location {location:?}"),
            Self::NoActiveDrag => write!(f, "no sash drag in progress"),
            Self::DragInProgress { sash_index } => {
                write!(f, "sash {sash_index} is already being dragged")
            }
            Self::Deserialize(reason) => write!(f, "failed to deserialize layout: {reason}"),
            Self::Serialize(reason) => write!(f, "failed to serialize layout: {reason}"),
        }
    }
}

impl std::error::Error for LayoutError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_operation_and_bounds() {
        let err = LayoutError::out_of_range("resize_view", 5, 3);
        assert_eq!(err.to_string(), "resize_view: index 5 out of range (len 3)");
        assert_eq!(
            LayoutError::invalid_location(&[0, 2]).to_string(),
            "invalid grid location [0, 2]"
        );
    }
}
