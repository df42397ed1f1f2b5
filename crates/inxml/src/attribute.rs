//! Attribute records.

use std::cell::Cell;
use std::fmt;

use inxml_mem::MemoryPool;

use crate::node::{NodeKind, XmlNode};
use crate::tables;

/// An attribute of an element or declaration node.
///
/// Name and value are byte slices into the parsed buffer (or into the pool,
/// for strings copied there explicitly); the buffer must outlive the
/// attribute. Attributes of one node form a doubly-linked list in document
/// order.
pub struct XmlAttribute<'a> {
    pub(crate) name: Cell<&'a [u8]>,
    pub(crate) value: Cell<&'a [u8]>,
    pub(crate) parent: Cell<Option<&'a XmlNode<'a>>>,
    pub(crate) prev_attribute: Cell<Option<&'a XmlAttribute<'a>>>,
    pub(crate) next_attribute: Cell<Option<&'a XmlAttribute<'a>>>,
}

impl<'a> XmlAttribute<'a> {
    pub(crate) fn new() -> Self {
        XmlAttribute {
            name: Cell::new(b""),
            value: Cell::new(b""),
            parent: Cell::new(None),
            prev_attribute: Cell::new(None),
            next_attribute: Cell::new(None),
        }
    }

    /// Allocates a detached attribute in the pool.
    #[must_use]
    pub fn alloc_in(pool: &'a MemoryPool) -> &'a XmlAttribute<'a> {
        pool.alloc(XmlAttribute::new())
    }

    /// Returns the attribute name, or an empty slice if unset.
    #[must_use]
    pub fn name(&self) -> &'a [u8] {
        self.name.get()
    }

    /// Returns the attribute value, or an empty slice if unset.
    #[must_use]
    pub fn value(&self) -> &'a [u8] {
        self.value.get()
    }

    /// Sets the attribute name. The slice must outlive the pool borrow; the
    /// attribute stores it without copying.
    pub fn set_name(&self, name: &'a [u8]) {
        self.name.set(name);
    }

    /// Sets the attribute value without copying.
    pub fn set_value(&self, value: &'a [u8]) {
        self.value.set(value);
    }

    /// Returns the node this attribute is attached to, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&'a XmlNode<'a>> {
        self.parent.get()
    }

    /// Walks to the root of the tree and returns it if it is a document
    /// node.
    #[must_use]
    pub fn document(&self) -> Option<&'a XmlNode<'a>> {
        let mut node = self.parent.get()?;
        while let Some(parent) = node.parent() {
            node = parent;
        }
        (node.kind() == NodeKind::Document).then_some(node)
    }

    /// Returns the previous attribute of the parent node.
    #[must_use]
    pub fn previous_attribute(&self) -> Option<&'a XmlAttribute<'a>> {
        self.prev_attribute.get()
    }

    /// Returns the closest preceding attribute with the given name.
    #[must_use]
    pub fn previous_attribute_named(
        &self,
        name: &[u8],
        case_sensitive: bool,
    ) -> Option<&'a XmlAttribute<'a>> {
        let mut attribute = self.prev_attribute.get();
        while let Some(a) = attribute {
            if tables::compare(a.name(), name, case_sensitive) {
                return Some(a);
            }
            attribute = a.prev_attribute.get();
        }
        None
    }

    /// Returns the next attribute of the parent node.
    #[must_use]
    pub fn next_attribute(&self) -> Option<&'a XmlAttribute<'a>> {
        self.next_attribute.get()
    }

    /// Returns the closest following attribute with the given name.
    #[must_use]
    pub fn next_attribute_named(
        &self,
        name: &[u8],
        case_sensitive: bool,
    ) -> Option<&'a XmlAttribute<'a>> {
        let mut attribute = self.next_attribute.get();
        while let Some(a) = attribute {
            if tables::compare(a.name(), name, case_sensitive) {
                return Some(a);
            }
            attribute = a.next_attribute.get();
        }
        None
    }
}

impl fmt::Debug for XmlAttribute<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlAttribute")
            .field("name", &String::from_utf8_lossy(self.name()))
            .field("value", &String::from_utf8_lossy(self.value()))
            .finish_non_exhaustive()
    }
}
