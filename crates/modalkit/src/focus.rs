#![forbid(unsafe_code)]

//! Focus movement on lifecycle edges.
//!
//! On open, focus moves to the host's initial-focus element when it can take
//! focus; otherwise it stays where it is. On close, the modal root is focused
//! (when `focus_after_close` and the root is still connected). With
//! `restore_trigger_focus`, focus additionally returns to the element that
//! was active at open time once the surface is gone.
//!
//! Every step is a no-op on a detached, hidden or non-focusable target.

use modalkit_core::{Document, NodeId, NodeRef};

use crate::config::FocusConfig;

/// Per-instance focus bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct ModalFocus {
    /// Element that was active at the rising edge.
    trigger: Option<NodeId>,
}

impl ModalFocus {
    pub const fn new() -> Self {
        Self { trigger: None }
    }

    /// Remember the element active at the rising edge. Must run first on
    /// that edge, before the surface mounts or `on_open` runs.
    pub fn capture_trigger(&mut self, document: &Document) -> Option<NodeId> {
        self.trigger = document.active_element();
        self.trigger
    }

    /// Rising-edge step. Focuses `target` if it resolves to a focusable node.
    ///
    /// Returns the node that received focus.
    pub fn acquire(&self, document: &Document, target: Option<&NodeRef>) -> Option<NodeId> {
        let node = target.and_then(NodeRef::get)?;
        if document.focus(node) {
            tracing::trace!(message = "modal.focus.acquired", node = %node);
            Some(node)
        } else {
            tracing::trace!(message = "modal.focus.skipped", node = %node);
            None
        }
    }

    /// Falling-edge step, run while the surface is still mounted.
    pub fn release(&self, document: &Document, root: Option<NodeId>, config: &FocusConfig) -> bool {
        if !config.focus_after_close {
            return false;
        }
        match root {
            Some(root) if document.is_connected(root) => document.focus(root),
            _ => false,
        }
    }

    /// Post-unmount step. Returns focus to the trigger when focus went down
    /// with the surface.
    pub fn restore_trigger(&mut self, document: &Document, config: &FocusConfig) -> bool {
        let trigger = self.trigger.take();
        if !config.restore_trigger_focus || document.active_element().is_some() {
            return false;
        }
        match trigger {
            Some(node) => {
                let restored = document.focus(node);
                tracing::trace!(message = "modal.focus.trigger_restored", node = %node, restored);
                restored
            }
            None => false,
        }
    }

    /// Drop the recorded trigger.
    pub fn forget(&mut self) {
        self.trigger = None;
    }

    pub fn trigger(&self) -> Option<NodeId> {
        self.trigger
    }
}
