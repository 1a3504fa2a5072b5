#![forbid(unsafe_code)]

//! Modal dialog component: lifecycle, focus and dismissal.
//!
//! # Role in modalkit
//! `modalkit` is the component layer on top of [`modalkit_core`]. A [`Modal`]
//! turns a host-owned `is_open` flag into edge-triggered lifecycle callbacks,
//! moves focus in and out predictably, and forwards escape-key and
//! overlay-click dismissal to the host as close requests.
//!
//! # How it fits in the system
//! The host owns the open/closed intent and re-renders with [`ModalProps`].
//! The modal never closes itself: `on_close` is a request.
//!
//! ```
//! use modalkit::{Modal, ModalProps};
//! use modalkit_core::{Document, KeyCode, KeyEvent};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let doc = Document::new();
//! let mut modal = Modal::new(&doc);
//! let close_requested = Rc::new(Cell::new(false));
//! let flag = Rc::clone(&close_requested);
//!
//! let view = modal.render(
//!     ModalProps::new(true)
//!         .title("Settings")
//!         .should_close_on_esc(true)
//!         .on_close(move || flag.set(true)),
//! );
//! assert!(view.is_some());
//!
//! doc.dispatch_key(KeyEvent::new(KeyCode::Escape));
//! assert!(close_requested.get());
//!
//! // The host honors the request.
//! assert!(modal.render(ModalProps::new(false)).is_none());
//! assert_eq!(doc.key_listener_count(), 0);
//! ```

pub mod callback;
pub mod config;
pub mod dismissal;
pub mod focus;
pub mod modal;
pub mod view;
pub mod visibility;

pub use callback::Callback;
pub use config::{DismissalConfig, DismissalFlags, FocusConfig, ModalProps, Presentation, Renderable};
pub use dismissal::{ClickOrigin, EscapeListener, classify_click};
pub use focus::ModalFocus;
pub use modal::{Modal, ModalId};
pub use view::{ElementView, ModalView, Render, RenderFn, render_fn};
pub use visibility::{Edge, LifecycleState, VisibilityLatch};
