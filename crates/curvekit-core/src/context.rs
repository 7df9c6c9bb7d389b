//! Capability token for the single-threaded editing context.
//!
//! Curve mutation is confined to one thread. Rather than asking a global
//! for the current thread identity, every mutating entry point takes an
//! `&EditContext`. The token is neither `Send` nor `Sync`, so a value created
//! on the editing thread cannot leak to a worker.

use std::marker::PhantomData;
use std::rc::Rc;

/// Proof that the caller runs on the editing thread.
#[derive(Debug)]
pub struct EditContext {
    _not_send: PhantomData<Rc<()>>,
}

impl EditContext {
    /// Create the token for the current thread.
    ///
    /// The application creates exactly one of these on its interactive
    /// thread and lends it to every edit.
    pub fn new() -> Self {
        Self {
            _not_send: PhantomData,
        }
    }
}

impl Default for EditContext {
    fn default() -> Self {
        Self::new()
    }
}
