//! Change-notification batching.
//!
//! A `ChangeBatch` gathers the distinct owners touched by one command
//! application. Parameter holders get a single `begin_changes` when first
//! seen and a single `end_changes` when the batch drops, so dependents
//! recompute at most once per holder. Roto contexts and parametric
//! dimensions have no bracket; they are signalled once each on drop.

use std::sync::Arc;

use curvekit_core::EditContext;
use smallvec::SmallVec;
use tracing::warn;

use crate::binding::{ChangeTarget, CurveBinding};
use crate::holder::{ParamHolder, RotoContext};
use crate::parametric::ParametricParam;

/// Scoped change bracket over every owner touched by an edit.
pub struct ChangeBatch<'cx> {
    cx: &'cx EditContext,
    holders: SmallVec<[Arc<ParamHolder>; 4]>,
    rotos: SmallVec<[Arc<RotoContext>; 2]>,
    parametric: SmallVec<[(Arc<ParametricParam>, usize); 2]>,
    notify: bool,
}

impl<'cx> ChangeBatch<'cx> {
    pub fn new(cx: &'cx EditContext) -> Self {
        Self {
            cx,
            holders: SmallVec::new(),
            rotos: SmallVec::new(),
            parametric: SmallVec::new(),
            notify: true,
        }
    }

    /// Open a batch over the owners of `bindings`. Expired bindings are
    /// left out.
    pub fn for_bindings<'a>(
        cx: &'cx EditContext,
        bindings: impl IntoIterator<Item = &'a CurveBinding>,
    ) -> Self {
        let mut batch = Self::new(cx);
        for binding in bindings {
            batch.add_binding(binding);
        }
        batch
    }

    /// Register the owner of `binding`. Returns false when the binding has
    /// expired.
    pub fn add_binding(&mut self, binding: &CurveBinding) -> bool {
        match binding.change_target() {
            Ok(target) => {
                self.add_target(target);
                true
            }
            Err(err) => {
                warn!(curve = ?binding.curve_id(), %err, "skipping binding");
                false
            }
        }
    }

    pub fn add_target(&mut self, target: ChangeTarget) {
        match target {
            ChangeTarget::Holder(holder) => self.add_holder(holder),
            ChangeTarget::Roto(roto) => {
                if !self.rotos.iter().any(|r| r.id() == roto.id()) {
                    self.rotos.push(roto);
                }
            }
            ChangeTarget::Parametric { param, dimension } => {
                if let Some(holder) = param.holder() {
                    self.add_holder(holder.clone());
                }
                if !self
                    .parametric
                    .iter()
                    .any(|(p, d)| p.id() == param.id() && *d == dimension)
                {
                    self.parametric.push((param, dimension));
                }
            }
            ChangeTarget::Detached => {}
        }
    }

    fn add_holder(&mut self, holder: Arc<ParamHolder>) {
        if self.holders.iter().any(|h| h.id() == holder.id()) {
            return;
        }
        holder.begin_changes(self.cx);
        self.holders.push(holder);
    }

    /// Close the brackets without triggering recomputation. Used when the
    /// caller already recomputed for this change.
    pub fn suppress_notifications(&mut self) {
        self.notify = false;
    }

    pub fn holder_count(&self) -> usize {
        self.holders.len()
    }
}

impl Drop for ChangeBatch<'_> {
    fn drop(&mut self) {
        if self.notify {
            for (param, dimension) in &self.parametric {
                param.evaluate_value_change(self.cx, *dimension);
            }
        }
        for holder in &self.holders {
            holder.end_changes(self.cx, self.notify);
        }
        if self.notify {
            for roto in &self.rotos {
                roto.evaluate_change(self.cx);
            }
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────
