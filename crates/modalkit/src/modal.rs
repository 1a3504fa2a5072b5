#![forbid(unsafe_code)]

//! The modal component.
//!
//! A [`Modal`] manages exactly one dialog's lifecycle inside a [`Document`].
//! The host calls [`Modal::render`] with fresh [`ModalProps`] whenever its
//! state changes; the modal turns edges of `is_open` into lifecycle callbacks
//! and focus moves, keeps the escape listener registration in line with
//! `is_open && should_close_on_esc`, and owns the surface subtree while open.
//!
//! # Edge sequences
//!
//! ```text
//! Closed -> Open : capture trigger, mount surface, on_open, acquire focus,
//!                  attach escape listener
//! Open -> Closed : on_closed, release focus, detach escape listener,
//!                  unmount surface, restore trigger focus (opt-in)
//! ```
//!
//! Re-rendering with an unchanged `is_open` fires nothing; it only refreshes
//! the dismissal config read by the handlers, the listener registration, and
//! the title / close button.
//!
//! # Failure Modes
//!
//! - A payload that fails to mount is logged at `warn` and the modal stays
//!   open without a surface. Click classification then has no root and makes
//!   no decision.
//! - Calling [`Modal::render`] from inside one of the modal's own callbacks is
//!   not supported: the modal is exclusively borrowed for the whole pass.
//! - Host callback panics are not caught.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use modalkit_core::{Dispatched, Document, KeyEvent, MouseEvent, NodeId};

use crate::callback::emit;
use crate::config::{DismissalConfig, ModalProps};
use crate::dismissal::{self, EscapeListener};
use crate::focus::ModalFocus;
use crate::view::{ModalView, Surface};
use crate::visibility::{Edge, LifecycleState, VisibilityLatch};

/// Global counter for unique modal IDs.
static MODAL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a modal instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModalId(u64);

impl ModalId {
    fn new() -> Self {
        Self(MODAL_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// State read by the document handlers at dispatch time.
struct Shared {
    id: ModalId,
    document: Document,
    dismissal: DismissalConfig,
    root: Option<NodeId>,
}

impl Shared {
    /// Clone out what a handler needs so no borrow is held during callbacks.
    fn snapshot(shared: &Weak<RefCell<Self>>) -> Option<(u64, Document, DismissalConfig, Option<NodeId>)> {
        let shared = shared.upgrade()?;
        let s = shared.borrow();
        Some((s.id.id(), s.document.clone(), s.dismissal.clone(), s.root))
    }
}

/// One modal dialog bound to a document.
pub struct Modal {
    id: ModalId,
    document: Document,
    shared: Rc<RefCell<Shared>>,
    latch: VisibilityLatch,
    focus: ModalFocus,
    escape: EscapeListener,
    surface: Option<Surface>,
    props: ModalProps,
}

impl std::fmt::Debug for Modal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Modal")
            .field("id", &self.id)
            .field("state", &self.latch.state())
            .field("root", &self.root())
            .field("escape_listener", &self.escape.listener_id())
            .finish()
    }
}

impl Modal {
    /// A closed modal rendering into `document`.
    pub fn new(document: &Document) -> Self {
        let id = ModalId::new();
        let shared = Shared {
            id,
            document: document.clone(),
            dismissal: DismissalConfig::default(),
            root: None,
        };
        Self {
            id,
            document: document.clone(),
            shared: Rc::new(RefCell::new(shared)),
            latch: VisibilityLatch::new(),
            focus: ModalFocus::new(),
            escape: EscapeListener::new(),
            surface: None,
            props: ModalProps::default(),
        }
    }

    #[inline]
    pub fn id(&self) -> ModalId {
        self.id
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Evaluate one render pass.
    ///
    /// Returns the rendering instructions while open and `None` while closed.
    pub fn render(&mut self, props: ModalProps) -> Option<ModalView> {
        self.shared.borrow_mut().dismissal = props.dismissal.clone();
        let edge = self.latch.observe(props.is_open);
        self.props = props;

        match edge {
            Some(Edge::Rising) => self.open(),
            Some(Edge::Falling) => self.close(),
            None if self.latch.is_open() => {
                self.sync_surface();
                self.sync_escape();
            }
            None => {}
        }
        self.view()
    }

    /// Rendering instructions for the current surface.
    pub fn view(&self) -> Option<ModalView> {
        self.surface
            .as_ref()
            .map(|surface| surface.view(&self.props.presentation))
    }

    #[inline]
    pub fn state(&self) -> LifecycleState {
        self.latch.state()
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.latch.is_open()
    }

    /// The surface root (the click-classification boundary), while mounted.
    pub fn root(&self) -> Option<NodeId> {
        self.surface.as_ref().map(|s| s.root)
    }

    pub fn is_escape_listener_attached(&self) -> bool {
        self.escape.is_attached()
    }

    /// Replace the mounted content with the current `content` payload.
    ///
    /// Returns `false` when closed or when the payload failed to mount.
    pub fn remount_content(&mut self) -> bool {
        let Some(surface) = &self.surface else {
            return false;
        };
        match surface.remount_content(&self.document, self.props.content.as_ref()) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(message = "modal.content.mount_failed", modal = self.id.id(), error = %err);
                false
            }
        }
    }

    fn open(&mut self) {
        tracing::debug!(message = "modal.opened", modal = self.id.id());
        self.focus.capture_trigger(&self.document);
        self.mount_surface();

        let on_open = self.props.on_open.clone();
        emit(on_open.as_ref(), &());

        let initial_focus = self.props.initial_focus.clone();
        self.focus.acquire(&self.document, initial_focus.as_ref());
        self.sync_escape();
    }

    fn close(&mut self) {
        tracing::debug!(message = "modal.closed", modal = self.id.id());
        let on_closed = self.props.on_closed.clone();
        emit(on_closed.as_ref(), &());

        let focused = self.focus.release(&self.document, self.root(), &self.props.focus);
        tracing::trace!(message = "modal.focus.released", modal = self.id.id(), focused);
        self.sync_escape();
        self.unmount_surface();
        self.focus.restore_trigger(&self.document, &self.props.focus);
    }

    fn sync_escape(&mut self) {
        let enabled = self.latch.is_open() && self.props.dismissal.flags.close_on_escape;
        let shared = Rc::downgrade(&self.shared);
        let changed = self.escape.sync(&self.document, enabled, move || {
            move |event: &mut Dispatched<KeyEvent>| {
                if let Some((id, _, config, _)) = Shared::snapshot(&shared) {
                    dismissal::handle_escape(id, event, &config);
                }
            }
        });
        if changed && enabled {
            tracing::debug!(message = "modal.escape_listener.attached", modal = self.id.id());
        } else if changed {
            tracing::debug!(message = "modal.escape_listener.detached", modal = self.id.id());
        }
    }

    fn mount_surface(&mut self) {
        let mounted = Surface::mount(
            &self.document,
            &self.props.presentation,
            self.props.content.as_ref(),
            self.props.custom_close_button.as_ref(),
        );
        match mounted {
            Ok(surface) => {
                self.install_overlay_handler(surface.overlay);
                if let Some(button) = surface.close_button {
                    self.install_close_handler(button);
                }
                self.shared.borrow_mut().root = Some(surface.root);
                self.surface = Some(surface);
            }
            Err(err) => {
                tracing::warn!(message = "modal.surface.mount_failed", modal = self.id.id(), error = %err);
            }
        }
    }

    fn sync_surface(&mut self) {
        if self.surface.is_none() {
            self.mount_surface();
            return;
        }
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let before = surface.close_button;
        let synced = surface.sync(
            &self.document,
            &self.props.presentation,
            self.props.custom_close_button.as_ref(),
        );
        let after = surface.close_button;
        if let Err(err) = synced {
            tracing::warn!(message = "modal.surface.sync_failed", modal = self.id.id(), error = %err);
        }
        if let Some(button) = after
            && before != after
        {
            self.install_close_handler(button);
        }
    }

    fn unmount_surface(&mut self) {
        self.shared.borrow_mut().root = None;
        if let Some(surface) = self.surface.take()
            && let Err(err) = surface.unmount(&self.document)
        {
            tracing::warn!(message = "modal.surface.unmount_failed", modal = self.id.id(), error = %err);
        }
    }

    fn install_overlay_handler(&self, overlay: NodeId) {
        let shared = Rc::downgrade(&self.shared);
        let installed = self.document.on_mouse(overlay, move |event: &mut Dispatched<MouseEvent>| {
            if let Some((id, document, config, root)) = Shared::snapshot(&shared) {
                dismissal::handle_overlay_click(&document, id, root, event, &config);
            }
        });
        if let Err(err) = installed {
            tracing::warn!(message = "modal.overlay.handler_failed", modal = self.id.id(), error = %err);
        }
    }

    fn install_close_handler(&self, button: NodeId) {
        let shared = Rc::downgrade(&self.shared);
        let installed = self.document.on_mouse(button, move |event: &mut Dispatched<MouseEvent>| {
            if !event.event.is_click() {
                return;
            }
            if let Some((id, _, config, _)) = Shared::snapshot(&shared) {
                tracing::trace!(message = "modal.close_button", modal = id);
                emit(config.on_close.as_ref(), &());
            }
        });
        if let Err(err) = installed {
            tracing::warn!(message = "modal.close_button.handler_failed", modal = self.id.id(), error = %err);
        }
    }
}

impl Drop for Modal {
    /// Unmounting tears everything down without firing lifecycle callbacks.
    fn drop(&mut self) {
        if self.latch.is_open() {
            tracing::debug!(message = "modal.dropped_open", modal = self.id.id());
        }
        self.escape.detach(&self.document);
        self.unmount_surface();
        self.focus.forget();
    }
}
