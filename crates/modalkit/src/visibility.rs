#![forbid(unsafe_code)]

//! Edge detection over the host's level-triggered open intent.
//!
//! Hosts re-render with the current `is_open` value on every pass; lifecycle
//! callbacks must fire only when that value changes. [`VisibilityLatch`] keeps
//! the previous value (a one-slot memory) and reports an [`Edge`] only when
//! the new value differs.
//!
//! # Invariants
//!
//! 1. The latch starts `Closed`.
//! 2. `observe` returns `Some(Rising)` exactly when the previous value was
//!    `false` and the new one `true`, `Some(Falling)` for the reverse, and
//!    `None` otherwise.
//! 3. Rising and falling edges strictly alternate, starting with rising.

/// A change of the open intent between two evaluations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Closed → Open.
    Rising,
    /// Open → Closed.
    Falling,
}

/// Lifecycle state as seen by the component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    #[default]
    Closed,
    Open,
}

/// One-slot memory of the last observed intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibilityLatch {
    open: bool,
}

impl VisibilityLatch {
    /// A latch in the `Closed` state.
    pub const fn new() -> Self {
        Self { open: false }
    }

    /// Record `intent` and report the edge it forms with the previous value.
    #[must_use = "an ignored edge means a skipped lifecycle callback"]
    pub fn observe(&mut self, intent: bool) -> Option<Edge> {
        let edge = match (self.open, intent) {
            (false, true) => Some(Edge::Rising),
            (true, false) => Some(Edge::Falling),
            _ => None,
        };
        self.open = intent;
        edge
    }

    #[inline]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    pub const fn state(&self) -> LifecycleState {
        if self.open {
            LifecycleState::Open
        } else {
            LifecycleState::Closed
        }
    }
}
