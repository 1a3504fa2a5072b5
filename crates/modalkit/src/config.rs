#![forbid(unsafe_code)]

//! Declarative modal configuration ("props").
//!
//! [`ModalProps`] is the full option surface a host hands to
//! [`Modal::render`](crate::Modal::render) on every pass. It is grouped into:
//!
//! - [`DismissalConfig`]: escape / overlay-click flags and their callbacks,
//! - [`FocusConfig`]: focus restoration policy,
//! - [`Presentation`]: pass-through values for the rendering concern.
//!
//! All groups are builder-style with `Default`. The plain-data groups derive
//! serde traits behind the `serde` feature.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use modalkit_core::{KeyEvent, MouseEvent, NodeRef};

use crate::callback::Callback;
use crate::view::Render;

/// Opaque renderable payload (content, custom close button).
pub type Renderable = Rc<dyn Render>;

/// Dismissal switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DismissalFlags {
    /// Attach the escape listener and request close on Escape.
    pub close_on_escape: bool,
    /// Request close on clicks outside the surface.
    pub close_on_overlay_click: bool,
}

/// Dismissal flags plus the callbacks they drive.
#[derive(Debug, Clone, Default)]
pub struct DismissalConfig {
    pub flags: DismissalFlags,
    /// Called with the key event when Escape is handled.
    pub on_escape: Option<Callback<KeyEvent>>,
    /// Called with the click event for every outside click.
    pub on_overlay_click: Option<Callback<MouseEvent>>,
    /// Close request. The host decides whether to honor it.
    pub on_close: Option<Callback>,
}

impl DismissalConfig {
    pub fn close_on_escape(mut self, close: bool) -> Self {
        self.flags.close_on_escape = close;
        self
    }

    pub fn close_on_overlay_click(mut self, close: bool) -> Self {
        self.flags.close_on_overlay_click = close;
        self
    }

    pub fn on_escape(mut self, f: impl Fn(&KeyEvent) + 'static) -> Self {
        self.on_escape = Some(Callback::new(f));
        self
    }

    pub fn on_overlay_click(mut self, f: impl Fn(&MouseEvent) + 'static) -> Self {
        self.on_overlay_click = Some(Callback::new(f));
        self
    }

    pub fn on_close(mut self, f: impl Fn() + 'static) -> Self {
        self.on_close = Some(Callback::from_fn(f));
        self
    }
}

/// Focus restoration policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FocusConfig {
    /// Focus the surface root when the modal closes.
    pub focus_after_close: bool,
    /// After the surface unmounts, return focus to the element that was
    /// active when the modal opened, if focus went down with the surface.
    pub restore_trigger_focus: bool,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            focus_after_close: true,
            restore_trigger_focus: false,
        }
    }
}

impl FocusConfig {
    pub fn focus_after_close(mut self, enabled: bool) -> Self {
        self.focus_after_close = enabled;
        self
    }

    pub fn restore_trigger_focus(mut self, enabled: bool) -> Self {
        self.restore_trigger_focus = enabled;
        self
    }
}

/// Values passed through to the rendering concern. None of them affects the
/// lifecycle or focus behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Presentation {
    pub title: Option<String>,
    pub class_name: String,
    pub style: BTreeMap<String, String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub aria_label: Option<String>,
    pub aria_labelled_by: Option<String>,
    pub aria_described_by: Option<String>,
    pub role: Option<String>,
    /// Render the dismiss control.
    pub close_button: bool,
}

impl Default for Presentation {
    fn default() -> Self {
        Self {
            title: None,
            class_name: String::new(),
            style: BTreeMap::new(),
            width: None,
            height: None,
            aria_label: None,
            aria_labelled_by: None,
            aria_described_by: None,
            role: None,
            close_button: true,
        }
    }
}

/// Complete option set for one render pass.
#[derive(Clone, Default)]
pub struct ModalProps {
    /// Host-owned visibility intent.
    pub is_open: bool,
    pub presentation: Presentation,
    pub content: Option<Renderable>,
    pub custom_close_button: Option<Renderable>,
    /// Element to focus when the modal opens.
    pub initial_focus: Option<NodeRef>,
    pub focus: FocusConfig,
    pub dismissal: DismissalConfig,
    pub on_open: Option<Callback>,
    pub on_closed: Option<Callback>,
}

impl fmt::Debug for ModalProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalProps")
            .field("is_open", &self.is_open)
            .field("presentation", &self.presentation)
            .field("content", &self.content.is_some())
            .field("custom_close_button", &self.custom_close_button.is_some())
            .field("initial_focus", &self.initial_focus)
            .field("focus", &self.focus)
            .field("dismissal", &self.dismissal)
            .field("on_open", &self.on_open.is_some())
            .field("on_closed", &self.on_closed.is_some())
            .finish()
    }
}

impl ModalProps {
    /// Props with every option at its default.
    pub fn new(is_open: bool) -> Self {
        Self {
            is_open,
            ..Self::default()
        }
    }

    pub fn open(mut self, is_open: bool) -> Self {
        self.is_open = is_open;
        self
    }

    // --- Presentation ---

    pub fn presentation(mut self, presentation: Presentation) -> Self {
        self.presentation = presentation;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.presentation.title = Some(title.into());
        self
    }

    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.presentation.class_name = class_name.into();
        self
    }

    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.presentation.style.insert(property.into(), value.into());
        self
    }

    pub fn width(mut self, width: impl Into<String>) -> Self {
        self.presentation.width = Some(width.into());
        self
    }

    pub fn height(mut self, height: impl Into<String>) -> Self {
        self.presentation.height = Some(height.into());
        self
    }

    pub fn aria_label(mut self, label: impl Into<String>) -> Self {
        self.presentation.aria_label = Some(label.into());
        self
    }

    pub fn aria_labelled_by(mut self, id: impl Into<String>) -> Self {
        self.presentation.aria_labelled_by = Some(id.into());
        self
    }

    pub fn aria_described_by(mut self, id: impl Into<String>) -> Self {
        self.presentation.aria_described_by = Some(id.into());
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.presentation.role = Some(role.into());
        self
    }

    pub fn close_button(mut self, show: bool) -> Self {
        self.presentation.close_button = show;
        self
    }

    pub fn content(mut self, content: impl Render + 'static) -> Self {
        self.content = Some(Rc::new(content));
        self
    }

    pub fn custom_close_button(mut self, content: impl Render + 'static) -> Self {
        self.custom_close_button = Some(Rc::new(content));
        self
    }

    // --- Focus ---

    pub fn initial_focus(mut self, target: NodeRef) -> Self {
        self.initial_focus = Some(target);
        self
    }

    pub fn focus_after_close(mut self, enabled: bool) -> Self {
        self.focus.focus_after_close = enabled;
        self
    }

    pub fn restore_trigger_focus(mut self, enabled: bool) -> Self {
        self.focus.restore_trigger_focus = enabled;
        self
    }

    // --- Dismissal ---

    pub fn dismissal(mut self, dismissal: DismissalConfig) -> Self {
        self.dismissal = dismissal;
        self
    }

    pub fn should_close_on_esc(mut self, close: bool) -> Self {
        self.dismissal.flags.close_on_escape = close;
        self
    }

    pub fn should_close_on_overlay_click(mut self, close: bool) -> Self {
        self.dismissal.flags.close_on_overlay_click = close;
        self
    }

    pub fn on_close(mut self, f: impl Fn() + 'static) -> Self {
        self.dismissal.on_close = Some(Callback::from_fn(f));
        self
    }

    pub fn on_escape_key_down(mut self, f: impl Fn(&KeyEvent) + 'static) -> Self {
        self.dismissal.on_escape = Some(Callback::new(f));
        self
    }

    pub fn on_overlay_click(mut self, f: impl Fn(&MouseEvent) + 'static) -> Self {
        self.dismissal.on_overlay_click = Some(Callback::new(f));
        self
    }

    // --- Lifecycle ---

    pub fn on_open(mut self, f: impl Fn() + 'static) -> Self {
        self.on_open = Some(Callback::from_fn(f));
        self
    }

    pub fn on_closed(mut self, f: impl Fn() + 'static) -> Self {
        self.on_closed = Some(Callback::from_fn(f));
        self
    }
}
