#![forbid(unsafe_code)]

//! Canonical input/event types.
//!
//! Events are plain values. When the [`Document`](crate::document::Document)
//! dispatches one it wraps it in a [`Dispatched`] envelope, which carries the
//! mutable propagation state that handlers may set (stop propagation,
//! prevent default).
//!
//! # Design Notes
//!
//! - `KeyEventKind` defaults to `Press`; a held key produces `Repeat`.
//! - Mouse events are addressed by target node, not by coordinates: the
//!   document has no layout, hit testing is the host's business.
//! - `Modifiers` use bitflags for easy combination.

use bitflags::bitflags;

use crate::node::NodeId;

/// Canonical input event.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Event {
    /// A keyboard event.
    Key(KeyEvent),

    /// A mouse event.
    Mouse(MouseEvent),
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with default modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether this is a key-down (press or auto-repeat) rather than a release.
    #[must_use]
    pub const fn is_down(&self) -> bool {
        matches!(self.kind, KeyEventKind::Press | KeyEventKind::Repeat)
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyCode {
    /// A regular character key.
    Char(char),

    /// Enter/Return key.
    Enter,

    /// Escape key.
    Escape,

    /// Backspace key.
    Backspace,

    /// Tab key.
    Tab,

    /// Shift+Tab (back-tab).
    BackTab,

    /// Space bar.
    Space,

    /// Up arrow key.
    Up,

    /// Down arrow key.
    Down,

    /// Left arrow key.
    Left,

    /// Right arrow key.
    Right,

    /// Function key (F1-F24).
    F(u8),
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,

    /// Key is being held (repeat event).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// A mouse event aimed at a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MouseEvent {
    /// The type of mouse event.
    pub kind: MouseEventKind,

    /// The innermost node under the pointer.
    pub target: NodeId,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl MouseEvent {
    /// Create a new mouse event.
    #[must_use]
    pub const fn new(kind: MouseEventKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            modifiers: Modifiers::NONE,
        }
    }

    /// Shorthand for a primary-button click on `target`.
    #[must_use]
    pub const fn click(target: NodeId) -> Self {
        Self::new(MouseEventKind::Click(MouseButton::Left), target)
    }

    /// Create a mouse event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Whether this event is a completed click of any button.
    #[must_use]
    pub const fn is_click(&self) -> bool {
        matches!(self.kind, MouseEventKind::Click(_))
    }
}

/// The type of mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MouseEventKind {
    /// Mouse button pressed down.
    Down(MouseButton),

    /// Mouse button released.
    Up(MouseButton),

    /// Button pressed and released on the same node.
    Click(MouseButton),
}

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MouseButton {
    /// Left mouse button.
    Left,

    /// Right mouse button.
    Right,

    /// Middle mouse button (scroll wheel click).
    Middle,
}

bitflags! {
    /// Propagation state accumulated while an event is dispatched.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DispatchFlags: u8 {
        /// A handler asked that the event not bubble further.
        const PROPAGATION_STOPPED = 0b01;
        /// A handler asked that the host skip its default action.
        const DEFAULT_PREVENTED   = 0b10;
    }
}

/// An event in flight, plus the propagation state handlers have set on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched<E> {
    /// The underlying event.
    pub event: E,
    flags: DispatchFlags,
}

impl<E> Dispatched<E> {
    /// Wrap an event with clean propagation state.
    #[must_use]
    pub fn new(event: E) -> Self {
        Self {
            event,
            flags: DispatchFlags::empty(),
        }
    }

    /// Stop the event from reaching handlers further up the tree.
    pub fn stop_propagation(&mut self) {
        self.flags.insert(DispatchFlags::PROPAGATION_STOPPED);
    }

    /// Ask the host to skip its default action for this event.
    pub fn prevent_default(&mut self) {
        self.flags.insert(DispatchFlags::DEFAULT_PREVENTED);
    }

    #[must_use]
    pub fn is_propagation_stopped(&self) -> bool {
        self.flags.contains(DispatchFlags::PROPAGATION_STOPPED)
    }

    #[must_use]
    pub fn is_default_prevented(&self) -> bool {
        self.flags.contains(DispatchFlags::DEFAULT_PREVENTED)
    }

    /// Raw propagation flags.
    #[must_use]
    pub fn flags(&self) -> DispatchFlags {
        self.flags
    }
}
