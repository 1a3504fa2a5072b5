#![forbid(unsafe_code)]

//! Core: input events and the headless document that components render into.
//!
//! # Role in modalkit
//! `modalkit-core` is the host layer. It owns the canonical event types and a
//! minimal element tree with focus tracking, a document-level key listener
//! registry, and bubbling mouse dispatch. Components in `modalkit` are
//! written against [`Document`] only, so they can be driven deterministically
//! from tests or adapted to a real UI host.
//!
//! # Primary responsibilities
//! - **Event**: canonical key and mouse events plus the [`Dispatched`]
//!   envelope carrying stop-propagation / prevent-default state.
//! - **NodeId / NodeRef**: element identifiers and host-owned element refs.
//! - **Document**: tree structure, focus, listeners, dispatch.

pub mod document;
pub mod event;
pub mod node;

pub use document::{
    DomError, Document, FOCUS_LOG_CAPACITY, FocusChange, KeyListener, ListenerId, MouseHandler,
};
pub use event::{
    DispatchFlags, Dispatched, Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton,
    MouseEvent, MouseEventKind,
};
pub use node::{NodeId, NodeRef};
