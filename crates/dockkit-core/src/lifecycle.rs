#![forbid(unsafe_code)]

//! Exception-safe teardown.
//!
//! Disposal of a layout tree cascades through many collaborator-supplied
//! views. One failing view must not stop its siblings from being torn down,
//! so every disposal step runs through [`dispose_isolated`], which catches
//! a panic, logs it, and hands it back as a [`DisposeFailure`].

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// One disposal step that panicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisposeFailure {
    /// What was being disposed (e.g. `"splitview item 2"`).
    pub label: String,
    /// Panic message.
    pub message: String,
}

impl fmt::Display for DisposeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "disposing {} failed: {}", self.label, self.message)
    }
}

impl std::error::Error for DisposeFailure {}

/// Aggregate outcome of a cascading disposal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisposeReport {
    /// Number of steps attempted.
    pub attempted: usize,
    pub failures: Vec<DisposeFailure>,
}

impl DisposeReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Run one isolated step and record its outcome.
    pub fn run(&mut self, label: impl Into<String>, step: impl FnOnce()) {
        self.attempted += 1;
        if let Err(failure) = dispose_isolated(label, step) {
            self.failures.push(failure);
        }
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: DisposeReport) {
        self.attempted += other.attempted;
        self.failures.extend(other.failures);
    }
}

/// Run `step`, converting a panic into a [`DisposeFailure`].
pub fn dispose_isolated(label: impl Into<String>, step: impl FnOnce()) -> Result<(), DisposeFailure> {
    match catch_unwind(AssertUnwindSafe(step)) {
        Ok(()) => Ok(()),
        Err(payload) => {
            let failure = DisposeFailure {
                label: label.into(),
                message: panic_message(payload.as_ref()),
            };
            crate::error!(
                label = %failure.label,
                reason = %failure.message,
                "disposal step panicked; continuing with siblings"
            );
            Err(failure)
        }
    }
}

/// Extract a readable message from a panic payload.
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
