#![forbid(unsafe_code)]

//! Rendering instructions and the mounted surface subtree.
//!
//! While open, a modal owns this subtree under the document body:
//!
//! ```text
//! div.modal-overlay                  <- overlay (click classification)
//! └── div.modal [role, aria-*]       <- surface (root ref, tabindex=-1)
//!     ├── button.modal-close-button  <- optional, click => on_close
//!     ├── h2.modal-title#modal-title <- optional, non-empty title
//!     └── div.modal-content#modal-description
//! ```
//!
//! [`ModalView`] describes that subtree (node ids + attributes) for the
//! rendering concern. Payloads implementing [`Render`] are opaque: the modal
//! only tells them where to mount.

use std::collections::BTreeMap;
use std::rc::Rc;

use modalkit_core::{DomError, Document, NodeId};

use crate::config::{Presentation, Renderable};

/// Default dismiss control label.
pub const DEFAULT_CLOSE_LABEL: &str = "X";

pub const OVERLAY_CLASS: &str = "modal-overlay";
pub const SURFACE_CLASS: &str = "modal";
pub const CLOSE_BUTTON_CLASS: &str = "modal-close-button";
pub const TITLE_CLASS: &str = "modal-title";
pub const TITLE_ID: &str = "modal-title";
pub const CONTENT_CLASS: &str = "modal-content";
pub const CONTENT_ID: &str = "modal-description";

/// Something that can mount itself under a parent node.
pub trait Render {
    /// Build this payload's nodes beneath `parent`.
    fn render(&self, document: &Document, parent: NodeId) -> Result<(), DomError>;
}

impl Render for str {
    fn render(&self, document: &Document, parent: NodeId) -> Result<(), DomError> {
        document.append_text(parent, self).map(|_| ())
    }
}

impl Render for &str {
    fn render(&self, document: &Document, parent: NodeId) -> Result<(), DomError> {
        (**self).render(document, parent)
    }
}

impl Render for String {
    fn render(&self, document: &Document, parent: NodeId) -> Result<(), DomError> {
        self.as_str().render(document, parent)
    }
}

/// Adapter turning a closure into a [`Render`] payload.
pub struct RenderFn<F>(pub F);

impl<F> Render for RenderFn<F>
where
    F: Fn(&Document, NodeId) -> Result<(), DomError>,
{
    fn render(&self, document: &Document, parent: NodeId) -> Result<(), DomError> {
        (self.0)(document, parent)
    }
}

/// Wrap a closure as a [`Render`] payload.
pub fn render_fn<F>(f: F) -> RenderFn<F>
where
    F: Fn(&Document, NodeId) -> Result<(), DomError>,
{
    RenderFn(f)
}

/// Rendering instructions for one element.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementView {
    pub node: NodeId,
    pub class: String,
    pub id: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub style: BTreeMap<String, String>,
}

impl ElementView {
    fn new(node: NodeId, class: impl Into<String>) -> Self {
        Self {
            node,
            class: class.into(),
            id: None,
            attributes: BTreeMap::new(),
            style: BTreeMap::new(),
        }
    }

    fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_owned());
        self
    }

    fn attr(&mut self, name: &str, value: Option<&String>) {
        if let Some(value) = value {
            self.attributes.insert(name.to_owned(), value.clone());
        }
    }
}

/// Rendering instructions for an open modal.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModalView {
    pub overlay: ElementView,
    pub surface: ElementView,
    pub close_button: Option<ElementView>,
    pub title: Option<ElementView>,
    pub content: ElementView,
}

/// Surface class list: `modal` plus the host's classes.
pub fn surface_class(class_name: &str) -> String {
    let extra = class_name.trim();
    if extra.is_empty() {
        SURFACE_CLASS.to_owned()
    } else {
        format!("{SURFACE_CLASS} {extra}")
    }
}

/// Inline style for the surface: the host's style with `width`/`height`
/// layered on top. An unset dimension clears the same key from `style`.
pub fn surface_style(presentation: &Presentation) -> BTreeMap<String, String> {
    let mut style = presentation.style.clone();
    for (key, value) in [("width", &presentation.width), ("height", &presentation.height)] {
        match value {
            Some(v) => style.insert(key.to_owned(), v.clone()),
            None => style.remove(key),
        };
    }
    style
}

fn has_title(presentation: &Presentation) -> bool {
    presentation.title.as_deref().is_some_and(|t| !t.is_empty())
}

/// Node ids of a mounted surface.
pub(crate) struct Surface {
    pub(crate) overlay: NodeId,
    pub(crate) root: NodeId,
    pub(crate) close_button: Option<NodeId>,
    title: Option<(NodeId, NodeId)>,
    pub(crate) content: NodeId,
    close_label: Option<Renderable>,
}

impl Surface {
    /// Build the subtree under the document body. Nothing is left behind on
    /// failure.
    pub(crate) fn mount(
        document: &Document,
        presentation: &Presentation,
        content: Option<&Renderable>,
        close_label: Option<&Renderable>,
    ) -> Result<Self, DomError> {
        let overlay = document.append_element(document.body(), "div")?;
        Self::build(document, overlay, presentation, content, close_label).inspect_err(|_| {
            // The overlay was attached above, so removal cannot fail.
            let _ = document.remove(overlay);
        })
    }

    fn build(
        document: &Document,
        overlay: NodeId,
        presentation: &Presentation,
        content: Option<&Renderable>,
        close_label: Option<&Renderable>,
    ) -> Result<Self, DomError> {
        let root = document.append_element(overlay, "div")?;
        document.set_focusable(root, true)?;
        let content_node = document.append_element(root, "div")?;

        let mut surface = Self {
            overlay,
            root,
            close_button: None,
            title: None,
            content: content_node,
            close_label: None,
        };
        surface.sync(document, presentation, close_label)?;
        if let Some(content) = content {
            content.render(document, content_node)?;
        }
        Ok(surface)
    }

    /// Bring the close button and title in line with `presentation`.
    /// Content is left alone.
    pub(crate) fn sync(
        &mut self,
        document: &Document,
        presentation: &Presentation,
        close_label: Option<&Renderable>,
    ) -> Result<(), DomError> {
        // Title sits directly before the content container.
        match (self.title, presentation.title.as_deref()) {
            (Some((_, text)), Some(title)) if has_title(presentation) => {
                document.set_text(text, title)?;
            }
            (None, Some(title)) if has_title(presentation) => {
                let heading = document.create_element("h2");
                document.insert_before(self.root, heading, Some(self.content))?;
                let text = document.append_text(heading, title)?;
                self.title = Some((heading, text));
            }
            (Some((heading, _)), _) => {
                document.remove(heading)?;
                self.title = None;
            }
            (None, _) => {}
        }

        // Close button is always the first child.
        match (self.close_button, presentation.close_button) {
            (None, true) => {
                let first = document.children(self.root)?.first().copied();
                let button = document.create_element("button");
                document.insert_before(self.root, button, first)?;
                document.set_focusable(button, true)?;
                self.close_button = Some(button);
                self.close_label = None;
                self.render_close_label(document, button, close_label)?;
            }
            (Some(button), true) => {
                let same = match (&self.close_label, close_label) {
                    (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                    (None, None) => true,
                    _ => false,
                };
                if !same {
                    self.render_close_label(document, button, close_label)?;
                }
            }
            (Some(button), false) => {
                document.remove(button)?;
                self.close_button = None;
                self.close_label = None;
            }
            (None, false) => {}
        }
        Ok(())
    }

    fn render_close_label(
        &mut self,
        document: &Document,
        button: NodeId,
        close_label: Option<&Renderable>,
    ) -> Result<(), DomError> {
        document.clear_children(button)?;
        match close_label {
            Some(label) => label.render(document, button)?,
            None => DEFAULT_CLOSE_LABEL.render(document, button)?,
        }
        self.close_label = close_label.cloned();
        Ok(())
    }

    /// Replace the content container's children with `content`.
    pub(crate) fn remount_content(
        &self,
        document: &Document,
        content: Option<&Renderable>,
    ) -> Result<(), DomError> {
        document.clear_children(self.content)?;
        if let Some(content) = content {
            content.render(document, self.content)?;
        }
        Ok(())
    }

    /// Free the whole subtree.
    pub(crate) fn unmount(self, document: &Document) -> Result<(), DomError> {
        document.remove(self.overlay)
    }

    /// Rendering instructions for the current subtree.
    pub(crate) fn view(&self, presentation: &Presentation) -> ModalView {
        let mut surface = ElementView::new(self.root, surface_class(&presentation.class_name));
        surface.style = surface_style(presentation);
        surface.attr("role", presentation.role.as_ref());
        surface.attr("aria-label", presentation.aria_label.as_ref());
        surface.attr("aria-labelledby", presentation.aria_labelled_by.as_ref());
        surface.attr("aria-describedby", presentation.aria_described_by.as_ref());
        surface
            .attributes
            .insert("tabindex".to_owned(), "-1".to_owned());

        ModalView {
            overlay: ElementView::new(self.overlay, OVERLAY_CLASS),
            surface,
            close_button: self
                .close_button
                .map(|node| ElementView::new(node, CLOSE_BUTTON_CLASS)),
            title: self
                .title
                .map(|(node, _)| ElementView::new(node, TITLE_CLASS).with_id(TITLE_ID)),
            content: ElementView::new(self.content, CONTENT_CLASS).with_id(CONTENT_ID),
        }
    }
}
