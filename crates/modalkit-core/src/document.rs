#![forbid(unsafe_code)]

//! Headless document model: an element tree with focus and event dispatch.
//!
//! [`Document`] stands in for the host UI tree. It owns:
//!
//! - an arena of element and text nodes with parent/child links,
//! - the active (focused) element and a bounded log of recent focus changes,
//! - a document-level key listener registry,
//! - per-node mouse handlers, dispatched with bubbling.
//!
//! # Architecture
//!
//! `Document` is a cheap handle over `Rc<RefCell<..>>`; clones share the same
//! tree. Every method borrows the cell only for its own duration, and
//! handlers are cloned out of the cell before they run, so a handler may call
//! back into the document (focus a node, add or remove listeners, dispatch).
//!
//! # Invariants
//!
//! 1. Node ids are never reused; a removed node's id stops resolving.
//!    Ids are drawn from a `u64` counter.
//! 2. The active element, if any, is connected, visible and focusable.
//!    Detaching, removing or hiding the focused subtree blurs it.
//! 3. Key listeners run in registration order; a listener removed during a
//!    dispatch still sees that dispatch (the listener set is snapshotted).
//! 4. Mouse dispatch visits the target, then each ancestor, stopping after
//!    the handler that calls [`Dispatched::stop_propagation`].
//!
//! # Failure Modes
//!
//! Structural misuse (unknown ids, cycles, children under text nodes) is
//! reported as [`DomError`]. Focus requests for nodes that cannot take focus
//! return `false`; they never fail.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::event::{Dispatched, KeyEvent, MouseEvent};
use crate::node::NodeId;

/// Number of focus changes kept by [`Document::focus_log`].
pub const FOCUS_LOG_CAPACITY: usize = 256;

/// Document-level keyboard listener.
pub type KeyListener = Rc<dyn Fn(&mut Dispatched<KeyEvent>)>;

/// Node-level mouse handler.
pub type MouseHandler = Rc<dyn Fn(&mut Dispatched<MouseEvent>)>;

/// Handle returned by [`Document::add_key_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Get the raw id value.
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Focus change records, appended to the document's focus log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusChange {
    FocusGained { id: NodeId },
    FocusLost { id: NodeId },
    FocusMoved { from: NodeId, to: NodeId },
}

/// Structural errors from tree operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomError {
    /// The id does not name a live node.
    UnknownNode(NodeId),
    /// Appending `child` under `parent` would make a node its own ancestor.
    Cycle { parent: NodeId, child: NodeId },
    /// Text nodes cannot hold children.
    NotAnElement(NodeId),
    /// The operation needs a text node.
    NotText(NodeId),
    /// The document body cannot be detached or removed.
    BodyIsPermanent,
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode(id) => write!(f, "unknown node {id}"),
            Self::Cycle { parent, child } => {
                write!(f, "cannot append {child} under its own descendant {parent}")
            }
            Self::NotAnElement(id) => write!(f, "node {id} is a text node and cannot hold children"),
            Self::NotText(id) => write!(f, "node {id} is not a text node"),
            Self::BodyIsPermanent => write!(f, "the document body cannot be detached"),
        }
    }
}

impl std::error::Error for DomError {}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeKind {
    Element { tag: String },
    Text { text: String },
}

struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: SmallVec<[NodeId; 4]>,
    focusable: bool,
    hidden: bool,
    on_mouse: Option<MouseHandler>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: SmallVec::new(),
            focusable: false,
            hidden: false,
            on_mouse: None,
        }
    }
}

struct DocumentInner {
    nodes: AHashMap<NodeId, Node>,
    body: NodeId,
    next_node: u64,
    next_listener: u64,
    key_listeners: Vec<(ListenerId, KeyListener)>,
    active: Option<NodeId>,
    focus_log: VecDeque<FocusChange>,
}

impl DocumentInner {
    /// Append to the focus log, dropping the oldest entry when full.
    fn record_focus(&mut self, change: FocusChange) {
        if self.focus_log.len() == FOCUS_LOG_CAPACITY {
            self.focus_log.pop_front();
        }
        self.focus_log.push_back(change);
    }

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.nodes.get(&id).ok_or(DomError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.nodes.get_mut(&id).ok_or(DomError::UnknownNode(id))
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::new(self.next_node);
        self.next_node += 1;
        self.nodes.insert(id, Node::new(kind));
        id
    }

    /// Inclusive ancestor test: a node contains itself.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }

    fn is_connected(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node) && self.contains(self.body, node)
    }

    fn is_rendered(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            match self.nodes.get(&id) {
                Some(n) if !n.hidden => cursor = n.parent,
                _ => return false,
            }
        }
        true
    }

    fn can_focus(&self, node: NodeId) -> bool {
        match self.nodes.get(&node) {
            Some(n) => {
                matches!(n.kind, NodeKind::Element { .. })
                    && n.focusable
                    && self.is_connected(node)
                    && self.is_rendered(node)
            }
            None => false,
        }
    }

    fn unlink(&mut self, node: NodeId) -> Result<(), DomError> {
        if node == self.body {
            return Err(DomError::BodyIsPermanent);
        }
        let parent = self.node_mut(node)?.parent.take();
        if let Some(parent) = parent
            && let Some(p) = self.nodes.get_mut(&parent)
        {
            p.children.retain(|c| *c != node);
        }
        Ok(())
    }

    /// Blur if the active element no longer satisfies the focus invariant.
    fn revalidate_focus(&mut self) {
        if let Some(active) = self.active
            && !self.can_focus(active)
        {
            self.active = None;
            self.record_focus(FocusChange::FocusLost { id: active });
            tracing::trace!(message = "document.focus_lost", node = %active);
        }
    }

    fn collect_subtree(&self, root: NodeId, out: &mut Vec<NodeId>) {
        out.push(root);
        if let Some(n) = self.nodes.get(&root) {
            for child in &n.children {
                self.collect_subtree(*child, out);
            }
        }
    }
}

/// Shared handle to a headless document.
///
/// Cloning creates a new handle to the **same** document.
#[derive(Clone)]
pub struct Document {
    inner: Rc<RefCell<DocumentInner>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Document")
            .field("nodes", &inner.nodes.len())
            .field("active", &inner.active)
            .field("key_listeners", &inner.key_listeners.len())
            .finish()
    }
}

impl Document {
    /// Create a document containing only its `body` element.
    #[must_use]
    pub fn new() -> Self {
        let body = NodeId::new(0);
        let mut nodes = AHashMap::new();
        nodes.insert(
            body,
            Node::new(NodeKind::Element {
                tag: "body".to_owned(),
            }),
        );
        Self {
            inner: Rc::new(RefCell::new(DocumentInner {
                nodes,
                body,
                next_node: 1,
                next_listener: 1,
                key_listeners: Vec::new(),
                active: None,
                focus_log: VecDeque::with_capacity(FOCUS_LOG_CAPACITY),
            })),
        }
    }

    /// The root element every connected node descends from.
    #[must_use]
    pub fn body(&self) -> NodeId {
        self.inner.borrow().body
    }

    /// Whether two handles refer to the same document.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // --- Tree ---

    /// Create a detached element.
    pub fn create_element(&self, tag: impl Into<String>) -> NodeId {
        self.inner
            .borrow_mut()
            .alloc(NodeKind::Element { tag: tag.into() })
    }

    /// Create a detached text node.
    pub fn create_text(&self, text: impl Into<String>) -> NodeId {
        self.inner
            .borrow_mut()
            .alloc(NodeKind::Text { text: text.into() })
    }

    /// Append `child` as the last child of `parent`, moving it if it is
    /// already attached elsewhere.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` under `parent` just before `reference`, or last when
    /// `reference` is `None` or not a child of `parent`.
    pub fn insert_before(
        &self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        let mut inner = self.inner.borrow_mut();
        if !matches!(inner.node(parent)?.kind, NodeKind::Element { .. }) {
            return Err(DomError::NotAnElement(parent));
        }
        inner.node(child)?;
        if inner.contains(child, parent) {
            return Err(DomError::Cycle { parent, child });
        }
        inner.unlink(child)?;
        inner.node_mut(child)?.parent = Some(parent);
        let siblings = &mut inner.node_mut(parent)?.children;
        match reference.and_then(|r| siblings.iter().position(|c| *c == r)) {
            Some(idx) => siblings.insert(idx, child),
            None => siblings.push(child),
        }
        inner.revalidate_focus();
        Ok(())
    }

    /// Create an element and append it under `parent` in one step.
    pub fn append_element(&self, parent: NodeId, tag: impl Into<String>) -> Result<NodeId, DomError> {
        let id = self.create_element(tag);
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Create a text node and append it under `parent` in one step.
    pub fn append_text(&self, parent: NodeId, text: impl Into<String>) -> Result<NodeId, DomError> {
        let id = self.create_text(text);
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Detach `node` (and its subtree) from its parent. The nodes stay alive
    /// and can be re-attached.
    pub fn detach(&self, node: NodeId) -> Result<(), DomError> {
        let mut inner = self.inner.borrow_mut();
        inner.unlink(node)?;
        inner.revalidate_focus();
        Ok(())
    }

    /// Detach `node` and free it together with its whole subtree.
    ///
    /// Handlers registered on the freed nodes are dropped.
    pub fn remove(&self, node: NodeId) -> Result<(), DomError> {
        // Dropped outside the borrow: a handler's captures may own handles
        // that touch the document when they drop.
        let freed: Vec<Node> = {
            let mut inner = self.inner.borrow_mut();
            inner.unlink(node)?;
            let mut ids = Vec::new();
            inner.collect_subtree(node, &mut ids);
            let freed: Vec<Node> = ids
                .iter()
                .filter_map(|id| inner.nodes.remove(id))
                .collect();
            inner.revalidate_focus();
            freed
        };
        tracing::trace!(message = "document.remove", node = %node, freed = freed.len());
        drop(freed);
        Ok(())
    }

    /// Remove every child of `node`.
    pub fn clear_children(&self, node: NodeId) -> Result<(), DomError> {
        let children = self.children(node)?;
        for child in children {
            self.remove(child)?;
        }
        Ok(())
    }

    /// Whether `node` names a live (not removed) node.
    #[must_use]
    pub fn exists(&self, node: NodeId) -> bool {
        self.inner.borrow().nodes.contains_key(&node)
    }

    /// Whether `node` is live and attached beneath the body.
    #[must_use]
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.inner.borrow().is_connected(node)
    }

    /// Inclusive containment: `contains(a, a)` is `true`. Unknown ids are
    /// never contained.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let inner = self.inner.borrow();
        inner.nodes.contains_key(&ancestor)
            && inner.nodes.contains_key(&node)
            && inner.contains(ancestor, node)
    }

    pub fn parent(&self, node: NodeId) -> Result<Option<NodeId>, DomError> {
        Ok(self.inner.borrow().node(node)?.parent)
    }

    pub fn children(&self, node: NodeId) -> Result<Vec<NodeId>, DomError> {
        Ok(self.inner.borrow().node(node)?.children.to_vec())
    }

    /// Tag name for elements, `None` for text nodes.
    pub fn tag(&self, node: NodeId) -> Result<Option<String>, DomError> {
        Ok(match &self.inner.borrow().node(node)?.kind {
            NodeKind::Element { tag } => Some(tag.clone()),
            NodeKind::Text { .. } => None,
        })
    }

    /// Concatenated text of `node` and its descendants, in tree order.
    pub fn text_content(&self, node: NodeId) -> Result<String, DomError> {
        let inner = self.inner.borrow();
        inner.node(node)?;
        let mut ids = Vec::new();
        inner.collect_subtree(node, &mut ids);
        let mut out = String::new();
        for id in ids {
            if let Some(Node {
                kind: NodeKind::Text { text },
                ..
            }) = inner.nodes.get(&id)
            {
                out.push_str(text);
            }
        }
        Ok(out)
    }

    /// Replace the text of a text node.
    pub fn set_text(&self, node: NodeId, text: impl Into<String>) -> Result<(), DomError> {
        let mut inner = self.inner.borrow_mut();
        match &mut inner.node_mut(node)?.kind {
            NodeKind::Text { text: slot } => {
                *slot = text.into();
                Ok(())
            }
            NodeKind::Element { .. } => Err(DomError::NotText(node)),
        }
    }

    /// Total number of live nodes, including the body.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.inner.borrow().nodes.len()
    }

    // --- Focus ---

    /// Mark an element as able (or unable) to take focus.
    pub fn set_focusable(&self, node: NodeId, focusable: bool) -> Result<(), DomError> {
        let mut inner = self.inner.borrow_mut();
        inner.node_mut(node)?.focusable = focusable;
        inner.revalidate_focus();
        Ok(())
    }

    /// Hide or show a node. Hidden subtrees cannot hold focus.
    pub fn set_hidden(&self, node: NodeId, hidden: bool) -> Result<(), DomError> {
        let mut inner = self.inner.borrow_mut();
        inner.node_mut(node)?.hidden = hidden;
        inner.revalidate_focus();
        Ok(())
    }

    /// Whether `node` could receive focus right now: a live, connected,
    /// visible element marked focusable.
    #[must_use]
    pub fn can_focus(&self, node: NodeId) -> bool {
        self.inner.borrow().can_focus(node)
    }

    /// Move focus to `node`. Returns `false` (and changes nothing) when the
    /// node cannot take focus.
    pub fn focus(&self, node: NodeId) -> bool {
        let mut inner = self.inner.borrow_mut();
        if !inner.can_focus(node) {
            tracing::trace!(message = "document.focus_rejected", node = %node);
            return false;
        }
        let change = match inner.active {
            Some(prev) if prev == node => return true,
            Some(prev) => FocusChange::FocusMoved {
                from: prev,
                to: node,
            },
            None => FocusChange::FocusGained { id: node },
        };
        inner.active = Some(node);
        inner.record_focus(change);
        tracing::trace!(message = "document.focus", node = %node);
        true
    }

    /// Remove focus from the active element, returning it.
    pub fn blur(&self) -> Option<NodeId> {
        let mut inner = self.inner.borrow_mut();
        let prev = inner.active.take();
        if let Some(id) = prev {
            inner.record_focus(FocusChange::FocusLost { id });
        }
        prev
    }

    /// The focused element, or `None` when focus rests on the body.
    #[inline]
    #[must_use]
    pub fn active_element(&self) -> Option<NodeId> {
        self.inner.borrow().active
    }

    /// The most recent focus changes, oldest first, capped at
    /// [`FOCUS_LOG_CAPACITY`].
    #[must_use]
    pub fn focus_log(&self) -> Vec<FocusChange> {
        self.inner.borrow().focus_log.iter().copied().collect()
    }

    /// Drain the focus log.
    pub fn take_focus_log(&self) -> Vec<FocusChange> {
        self.inner.borrow_mut().focus_log.drain(..).collect()
    }

    // --- Keyboard ---

    /// Register a document-level key listener.
    pub fn add_key_listener(&self, listener: impl Fn(&mut Dispatched<KeyEvent>) + 'static) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.next_listener);
        inner.next_listener += 1;
        inner.key_listeners.push((id, Rc::new(listener)));
        tracing::trace!(message = "document.key_listener.add", listener = id.0);
        id
    }

    /// Unregister a key listener. Returns `false` if it was not registered.
    pub fn remove_key_listener(&self, id: ListenerId) -> bool {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            let idx = inner.key_listeners.iter().position(|(lid, _)| *lid == id);
            idx.map(|idx| inner.key_listeners.remove(idx))
        };
        tracing::trace!(message = "document.key_listener.remove", listener = id.0, found = removed.is_some());
        removed.is_some()
    }

    /// Number of registered key listeners.
    #[must_use]
    pub fn key_listener_count(&self) -> usize {
        self.inner.borrow().key_listeners.len()
    }

    /// Whether `id` is currently registered.
    #[must_use]
    pub fn has_key_listener(&self, id: ListenerId) -> bool {
        self.inner
            .borrow()
            .key_listeners
            .iter()
            .any(|(lid, _)| *lid == id)
    }

    /// Deliver a key event to every document listener in registration order.
    ///
    /// Returns the event with whatever propagation state the listeners set.
    pub fn dispatch_key(&self, event: KeyEvent) -> Dispatched<KeyEvent> {
        // Collect listeners first (to avoid holding the borrow during calls).
        let listeners: Vec<KeyListener> = self
            .inner
            .borrow()
            .key_listeners
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        let mut dispatched = Dispatched::new(event);
        for listener in listeners {
            listener(&mut dispatched);
        }
        dispatched
    }

    // --- Mouse ---

    /// Install (or clear, with `None`) the mouse handler on `node`.
    pub fn set_mouse_handler(&self, node: NodeId, handler: Option<MouseHandler>) -> Result<(), DomError> {
        self.inner.borrow_mut().node_mut(node)?.on_mouse = handler;
        Ok(())
    }

    /// Convenience over [`Document::set_mouse_handler`] taking a closure.
    pub fn on_mouse(
        &self,
        node: NodeId,
        handler: impl Fn(&mut Dispatched<MouseEvent>) + 'static,
    ) -> Result<(), DomError> {
        self.set_mouse_handler(node, Some(Rc::new(handler)))
    }

    /// Deliver a mouse event to its target, bubbling through ancestors.
    ///
    /// An unknown target delivers to nobody.
    pub fn dispatch_mouse(&self, event: MouseEvent) -> Dispatched<MouseEvent> {
        let path: Vec<MouseHandler> = {
            let inner = self.inner.borrow();
            let mut path = Vec::new();
            let mut cursor = Some(event.target);
            while let Some(id) = cursor {
                let Some(node) = inner.nodes.get(&id) else {
                    break;
                };
                if let Some(h) = &node.on_mouse {
                    path.push(Rc::clone(h));
                }
                cursor = node.parent;
            }
            path
        };
        let mut dispatched = Dispatched::new(event);
        for handler in path {
            handler(&mut dispatched);
            if dispatched.is_propagation_stopped() {
                break;
            }
        }
        dispatched
    }

    /// Dispatch a primary-button click on `target`.
    pub fn click(&self, target: NodeId) -> Dispatched<MouseEvent> {
        self.dispatch_mouse(MouseEvent::click(target))
    }
}
