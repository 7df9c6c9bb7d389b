//! Owners that receive change notifications.
//!
//! A `ParamHolder` stands for the node owning a set of parameters: value
//! changes made inside a `begin_changes`/`end_changes` bracket are coalesced
//! into one recomputation when the outermost bracket closes. A `RotoContext`
//! owns bezier shapes and is re-rendered through an explicit
//! `evaluate_change` signal instead.

use curvekit_core::EditContext;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Unique identifier for a parameter holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HolderId(pub Uuid);

/// Unique identifier for a roto context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RotoId(pub Uuid);

#[derive(Debug, Default)]
struct HolderState {
    depth: u32,
    dirty: bool,
    evaluations: u64,
}

/// A node-like holder of animated parameters.
#[derive(Debug)]
pub struct ParamHolder {
    id: HolderId,
    name: String,
    state: Mutex<HolderState>,
}

impl ParamHolder {
    /// Create a new holder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: HolderId(Uuid::new_v4()),
            name: name.into(),
            state: Mutex::new(HolderState::default()),
        }
    }

    pub fn id(&self) -> HolderId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Open a change bracket. Brackets nest.
    pub fn begin_changes(&self, _cx: &EditContext) {
        self.state.lock().depth += 1;
    }

    /// Close a change bracket.
    ///
    /// When the outermost bracket closes and a value changed inside it, one
    /// recomputation is triggered, unless `notify` is false, in which case
    /// the pending change is dropped because the caller already handled it.
    pub fn end_changes(&self, _cx: &EditContext, notify: bool) {
        let evaluate = {
            let mut state = self.state.lock();
            debug_assert!(state.depth > 0, "end_changes without begin_changes");
            state.depth = state.depth.saturating_sub(1);
            if state.depth > 0 {
                return;
            }
            let evaluate = state.dirty && notify;
            state.dirty = false;
            if evaluate {
                state.evaluations += 1;
            }
            evaluate
        };
        if evaluate {
            debug!(holder = %self.name, "recomputing after change block");
        }
    }

    /// Record that one of the holder's parameters changed.
    pub fn notify_value_changed(&self, _cx: &EditContext) {
        let mut state = self.state.lock();
        if state.depth > 0 {
            state.dirty = true;
        } else {
            state.evaluations += 1;
        }
    }

    /// Whether a change bracket is currently open.
    pub fn is_in_change_block(&self) -> bool {
        self.state.lock().depth > 0
    }

    /// Number of dependent recomputations triggered so far.
    pub fn evaluation_count(&self) -> u64 {
        self.state.lock().evaluations
    }
}

/// Container of roto shapes.
#[derive(Debug)]
pub struct RotoContext {
    id: RotoId,
    name: String,
    evaluations: Mutex<u64>,
}

impl RotoContext {
    /// Create a new roto context.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: RotoId(Uuid::new_v4()),
            name: name.into(),
            evaluations: Mutex::new(0),
        }
    }

    pub fn id(&self) -> RotoId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Request re-rendering of the shapes after an edit.
    pub fn evaluate_change(&self, _cx: &EditContext) {
        *self.evaluations.lock() += 1;
        debug!(roto = %self.name, "shape change evaluated");
    }

    /// Number of `evaluate_change` signals received.
    pub fn evaluation_count(&self) -> u64 {
        *self.evaluations.lock()
    }
}

// ── Tests ───────────────────────────────────────────────────────
