//! Lifecycle state and the idempotence gate.
//!
//! Every disposal path, explicit or implicit and from any thread, funnels
//! through [`DisposeGate::try_trigger`]. The transition out of
//! [`DisposeState::Live`] is a single compare-and-swap, so exactly one
//! caller ever wins the right to run teardown.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

/// Lifecycle of a disposable instance.
///
/// States only ever move forward: `Live` → `Triggered` → `Disposed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DisposeState {
    /// No disposal path has won the gate yet.
    Live,
    /// A disposal path won the gate and teardown is running.
    Triggered,
    /// Dependents and the instance's own cleanup have completed.
    Disposed,
}

impl DisposeState {
    const fn to_u8(self) -> u8 {
        match self {
            Self::Live => 0,
            Self::Triggered => 1,
            Self::Disposed => 2,
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Live,
            1 => Self::Triggered,
            _ => Self::Disposed,
        }
    }
}

impl fmt::Display for DisposeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Live => "live",
            Self::Triggered => "triggered",
            Self::Disposed => "disposed",
        };
        f.write_str(name)
    }
}

/// Which path requested disposal.
///
/// Cleanup hooks receive this to decide how much to release: an explicit
/// disposal may touch anything, an implicit one runs from a destructor and
/// should only release state the instance owns outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisposeMode {
    /// A caller asked for deterministic release.
    Explicit,
    /// The safety net released an instance nobody disposed.
    Implicit,
}

impl DisposeMode {
    /// `true` for explicit disposal, the classic `disposing` flag.
    pub const fn is_disposing(self) -> bool {
        matches!(self, Self::Explicit)
    }
}

impl fmt::Display for DisposeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit => f.write_str("explicit"),
            Self::Implicit => f.write_str("implicit"),
        }
    }
}

/// Atomic lifecycle flags shared by all disposal paths.
#[derive(Debug)]
pub struct DisposeGate {
    state: AtomicU8,
    explicitly_invoked: AtomicBool,
    finalize_suppressed: AtomicBool,
}

impl DisposeGate {
    /// Creates a gate in the `Live` state.
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(DisposeState::Live.to_u8()),
            explicitly_invoked: AtomicBool::new(false),
            finalize_suppressed: AtomicBool::new(false),
        }
    }

    /// Attempts to win the right to run teardown.
    ///
    /// An explicit request is recorded before the race is decided, so a
    /// caller that loses to a concurrent implicit path is still reported by
    /// [`DisposeGate::is_explicitly_invoked`]. Returns `true` for exactly one
    /// caller over the lifetime of the gate.
    pub fn try_trigger(&self, mode: DisposeMode) -> bool {
        if mode.is_disposing() {
            self.explicitly_invoked.store(true, Ordering::SeqCst);
        }

        self.state
            .compare_exchange(
                DisposeState::Live.to_u8(),
                DisposeState::Triggered.to_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Records that teardown completed. Only the winner of
    /// [`DisposeGate::try_trigger`] calls this.
    pub fn mark_disposed(&self) {
        self.state
            .store(DisposeState::Disposed.to_u8(), Ordering::Release);
    }

    /// Turns the implicit safety net off for this instance.
    pub fn suppress_finalize(&self) {
        self.finalize_suppressed.store(true, Ordering::Release);
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DisposeState {
        DisposeState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Whether any caller explicitly asked for disposal.
    pub fn is_explicitly_invoked(&self) -> bool {
        self.explicitly_invoked.load(Ordering::SeqCst)
    }

    /// Whether a disposal path has won the gate, by any means.
    pub fn is_triggered(&self) -> bool {
        self.state() != DisposeState::Live
    }

    /// Whether teardown has fully completed.
    pub fn is_disposed(&self) -> bool {
        self.state() == DisposeState::Disposed
    }

    /// Whether the implicit safety net has been turned off.
    pub fn is_finalize_suppressed(&self) -> bool {
        self.finalize_suppressed.load(Ordering::Acquire)
    }
}

impl Default for DisposeGate {
    fn default() -> Self {
        Self::new()
    }
}
