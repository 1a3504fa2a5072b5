#![forbid(unsafe_code)]

//! Node identifiers and host-owned element references.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Identifier of an element in a [`Document`](crate::document::Document).
///
/// Ids are never reused within one document, so a stale id held after its
/// node was removed simply fails to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw id value.
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A shared, mutable slot pointing at an element.
///
/// The host creates the ref, points it at an element once that element
/// exists, and hands clones to components that need to read it later.
/// Components only ever call [`NodeRef::get`]; they never set it.
///
/// Cloning shares the slot: every clone observes the same current value.
#[derive(Clone, Default)]
pub struct NodeRef {
    slot: Rc<Cell<Option<NodeId>>>,
}

impl NodeRef {
    /// Create an empty ref.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ref already pointing at `node`.
    #[must_use]
    pub fn to(node: NodeId) -> Self {
        let r = Self::new();
        r.set(Some(node));
        r
    }

    /// Current target, if any.
    #[inline]
    #[must_use]
    pub fn get(&self) -> Option<NodeId> {
        self.slot.get()
    }

    /// Point the ref at `node` (or clear it with `None`).
    pub fn set(&self, node: Option<NodeId>) {
        self.slot.set(node);
    }

    /// Whether two refs share the same slot.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeRef").field(&self.get()).finish()
    }
}
