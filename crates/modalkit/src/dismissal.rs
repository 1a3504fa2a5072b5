#![forbid(unsafe_code)]

//! Escape-key and overlay-click dismissal.
//!
//! The modal never closes itself: both paths end in a close *request*
//! (`on_close`) the host may honor or ignore.
//!
//! # Escape
//!
//! [`EscapeListener`] is a single attach slot for a document key listener.
//! [`EscapeListener::sync`] attaches when the enabling condition is true and
//! nothing is attached, and detaches when it is false, so an instance never
//! holds more than one registration.
//!
//! # Overlay clicks
//!
//! [`classify_click`] decides whether a click target lies inside the surface
//! subtree. Inside clicks are ignored entirely; outside clicks always reach
//! `on_overlay_click` and reach `on_close` only when
//! `close_on_overlay_click` is set.

use modalkit_core::{Dispatched, Document, KeyCode, KeyEvent, ListenerId, MouseEvent, NodeId};

use crate::callback::emit;
use crate::config::DismissalConfig;

/// Where a click landed relative to the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickOrigin {
    /// Target is the surface root or one of its descendants.
    Inside,
    /// Target is outside the surface (the overlay itself, typically).
    Outside,
}

/// Classify `target` against the surface `root`.
///
/// Returns `None` when there is no root to classify against.
pub fn classify_click(document: &Document, root: Option<NodeId>, target: NodeId) -> Option<ClickOrigin> {
    let root = root.filter(|r| document.exists(*r))?;
    if document.contains(root, target) {
        Some(ClickOrigin::Inside)
    } else {
        Some(ClickOrigin::Outside)
    }
}

/// Handle one key event for the escape path.
///
/// Acts only on an Escape key-down: stops propagation, prevents the default
/// action, calls `on_escape` with the event, then calls `on_close`. Returns
/// whether the event was handled.
pub fn handle_escape(modal: u64, event: &mut Dispatched<KeyEvent>, config: &DismissalConfig) -> bool {
    if event.event.code != KeyCode::Escape || !event.event.is_down() {
        return false;
    }
    event.stop_propagation();
    event.prevent_default();
    tracing::trace!(message = "modal.escape", modal);
    // Callbacks see the event only; propagation state is already final.
    let key = event.event;
    emit(config.on_escape.as_ref(), &key);
    emit(config.on_close.as_ref(), &());
    true
}

/// Handle one mouse event delivered to the overlay.
///
/// Non-click events and unclassifiable clicks return `None` without side
/// effects.
pub fn handle_overlay_click(
    document: &Document,
    modal: u64,
    root: Option<NodeId>,
    event: &Dispatched<MouseEvent>,
    config: &DismissalConfig,
) -> Option<ClickOrigin> {
    if !event.event.is_click() {
        return None;
    }
    let origin = classify_click(document, root, event.event.target)?;
    tracing::trace!(
        message = "modal.overlay_click",
        modal,
        target = %event.event.target,
        outside = origin == ClickOrigin::Outside
    );
    if origin == ClickOrigin::Outside {
        emit(config.on_overlay_click.as_ref(), &event.event);
        if config.flags.close_on_overlay_click {
            emit(config.on_close.as_ref(), &());
        }
    }
    Some(origin)
}

/// Single-slot registration of the document escape listener.
#[derive(Debug, Default)]
pub struct EscapeListener {
    attached: Option<ListenerId>,
}

impl EscapeListener {
    pub const fn new() -> Self {
        Self { attached: None }
    }

    /// Converge the registration onto `enabled`.
    ///
    /// `make_listener` is only called when a new registration is needed.
    /// Returns `true` when the registration changed.
    pub fn sync<F, L>(&mut self, document: &Document, enabled: bool, make_listener: F) -> bool
    where
        F: FnOnce() -> L,
        L: Fn(&mut Dispatched<KeyEvent>) + 'static,
    {
        match (self.attached, enabled) {
            (None, true) => {
                let id = document.add_key_listener(make_listener());
                self.attached = Some(id);
                true
            }
            (Some(_), false) => self.detach(document),
            _ => false,
        }
    }

    /// Remove the registration, if any.
    pub fn detach(&mut self, document: &Document) -> bool {
        match self.attached.take() {
            Some(id) => document.remove_key_listener(id),
            None => false,
        }
    }

    #[inline]
    pub fn is_attached(&self) -> bool {
        self.attached.is_some()
    }

    pub fn listener_id(&self) -> Option<ListenerId> {
        self.attached
    }
}
