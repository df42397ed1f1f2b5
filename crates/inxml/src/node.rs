//! DOM nodes: kinds, traversal and in-place mutation.
//!
//! Nodes are allocated from a [`MemoryPool`] and linked through
//! `Cell<Option<&_>>` fields, so the whole tree is navigable and mutable
//! behind shared references while staying tied to the pool's lifetime.
//! Mutators only relink; they never allocate and never free. Detaching a
//! record clears its parent *and* sibling links, so every accessor is total
//! and there are no "valid only if" fields to misread.

use std::cell::Cell;
use std::fmt;
use std::ptr;

use inxml_mem::MemoryPool;

use crate::attribute::XmlAttribute;
use crate::tables;

/// The kind of a node. Determines how name and value are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Root of the DOM hierarchy. Name and value are empty.
    Document,
    /// An element. Name is the tag name; value mirrors the text of the
    /// first data child unless suppressed.
    Element,
    /// A text run. Name is empty; value is the (entity-decoded) text.
    Data,
    /// A CDATA section. Name is empty; value is the verbatim content.
    Cdata,
    /// A comment. Name is empty; value is the comment body.
    Comment,
    /// An XML declaration. Name and value are empty; version/encoding/
    /// standalone live as attributes.
    Declaration,
    /// A DOCTYPE. Name is empty; value is the verbatim doctype body.
    Doctype,
    /// A processing instruction. Name is the target; value is the body.
    Pi,
}

/// A node of an XML document.
///
/// Name and value are byte slices into the parsed buffer (or the pool);
/// their interpretation depends on [`NodeKind`]. Children and attributes
/// form doubly-linked lists in document order whose head and tail the node
/// caches.
///
/// Mutators take `&'a self`, the same lifetime that ties the node to its
/// pool, so links always point at pool-backed records.
pub struct XmlNode<'a> {
    kind: Cell<NodeKind>,
    name: Cell<&'a [u8]>,
    value: Cell<&'a [u8]>,
    parent: Cell<Option<&'a XmlNode<'a>>>,
    first_child: Cell<Option<&'a XmlNode<'a>>>,
    last_child: Cell<Option<&'a XmlNode<'a>>>,
    first_attribute: Cell<Option<&'a XmlAttribute<'a>>>,
    last_attribute: Cell<Option<&'a XmlAttribute<'a>>>,
    prev_sibling: Cell<Option<&'a XmlNode<'a>>>,
    next_sibling: Cell<Option<&'a XmlNode<'a>>>,
}

impl<'a> XmlNode<'a> {
    pub(crate) fn new(kind: NodeKind) -> Self {
        XmlNode {
            kind: Cell::new(kind),
            name: Cell::new(b""),
            value: Cell::new(b""),
            parent: Cell::new(None),
            first_child: Cell::new(None),
            last_child: Cell::new(None),
            first_attribute: Cell::new(None),
            last_attribute: Cell::new(None),
            prev_sibling: Cell::new(None),
            next_sibling: Cell::new(None),
        }
    }

    /// Allocates a detached node of the given kind in the pool.
    #[must_use]
    pub fn alloc_in(pool: &'a MemoryPool, kind: NodeKind) -> &'a XmlNode<'a> {
        pool.alloc(XmlNode::new(kind))
    }

    /// Deep-clones `source` into `pool`: children and attributes are
    /// allocated anew, while name and value slices are shared with the
    /// source (the source's backing memory must outlive the clone).
    ///
    /// When `result` is given, it is reused in place: its children and
    /// attributes are detached and it is retyped to the source's kind.
    pub fn clone_in(
        pool: &'a MemoryPool,
        source: &XmlNode<'a>,
        result: Option<&'a XmlNode<'a>>,
    ) -> &'a XmlNode<'a> {
        let result = match result {
            Some(node) => {
                node.remove_all_children();
                node.remove_all_attributes();
                node.set_kind(source.kind());
                node
            }
            None => XmlNode::alloc_in(pool, source.kind()),
        };
        result.set_name(source.name());
        result.set_value(source.value());

        let mut child = source.first_child();
        while let Some(c) = child {
            result.append_child(XmlNode::clone_in(pool, c, None));
            child = c.next_sibling.get();
        }
        let mut attribute = source.first_attribute();
        while let Some(a) = attribute {
            let clone = XmlAttribute::alloc_in(pool);
            clone.set_name(a.name());
            clone.set_value(a.value());
            result.append_attribute(clone);
            attribute = a.next_attribute();
        }
        result
    }

    ///////////////////////////////////////////////////////////////////////
    // Data access

    /// Returns the kind of this node.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind.get()
    }

    /// Retypes this node. Reserved for reusing an existing record as a new
    /// document or element root (see [`XmlNode::clone_in`]); kinds are
    /// otherwise fixed at allocation.
    pub fn set_kind(&self, kind: NodeKind) {
        self.kind.set(kind);
    }

    /// Returns the node name, or an empty slice if unset.
    #[must_use]
    pub fn name(&self) -> &'a [u8] {
        self.name.get()
    }

    /// Returns the node value, or an empty slice if unset.
    #[must_use]
    pub fn value(&self) -> &'a [u8] {
        self.value.get()
    }

    /// Sets the node name. The node stores the slice without copying; use
    /// [`MemoryPool::alloc_slice_copy`] for strings that must outlive their
    /// source.
    pub fn set_name(&self, name: &'a [u8]) {
        self.name.set(name);
    }

    /// Sets the node value without copying.
    pub fn set_value(&self, value: &'a [u8]) {
        self.value.set(value);
    }

    ///////////////////////////////////////////////////////////////////////
    // Related nodes

    /// Returns the parent node, or `None` for a detached node or the
    /// document root.
    #[must_use]
    pub fn parent(&self) -> Option<&'a XmlNode<'a>> {
        self.parent.get()
    }

    /// Walks to the root of the tree and returns it if it is a document
    /// node.
    #[must_use]
    pub fn document(&'a self) -> Option<&'a XmlNode<'a>> {
        let mut node: &'a XmlNode<'a> = self;
        while let Some(parent) = node.parent.get() {
            node = parent;
        }
        (node.kind() == NodeKind::Document).then_some(node)
    }

    /// Returns the first child, or `None` if the node has no children.
    #[must_use]
    pub fn first_child(&self) -> Option<&'a XmlNode<'a>> {
        self.first_child.get()
    }

    /// Returns the first child with the given name.
    #[must_use]
    pub fn first_child_named(&self, name: &[u8], case_sensitive: bool) -> Option<&'a XmlNode<'a>> {
        let mut child = self.first_child.get();
        while let Some(c) = child {
            if tables::compare(c.name(), name, case_sensitive) {
                return Some(c);
            }
            child = c.next_sibling.get();
        }
        None
    }

    /// Returns the last child, or `None` if the node has no children.
    #[must_use]
    pub fn last_child(&self) -> Option<&'a XmlNode<'a>> {
        self.last_child.get()
    }

    /// Returns the last child with the given name.
    #[must_use]
    pub fn last_child_named(&self, name: &[u8], case_sensitive: bool) -> Option<&'a XmlNode<'a>> {
        let mut child = self.last_child.get();
        while let Some(c) = child {
            if tables::compare(c.name(), name, case_sensitive) {
                return Some(c);
            }
            child = c.prev_sibling.get();
        }
        None
    }

    /// Returns the previous sibling, or `None` for a first child or a
    /// detached node.
    #[must_use]
    pub fn previous_sibling(&self) -> Option<&'a XmlNode<'a>> {
        self.prev_sibling.get()
    }

    /// Returns the closest preceding sibling with the given name.
    #[must_use]
    pub fn previous_sibling_named(
        &self,
        name: &[u8],
        case_sensitive: bool,
    ) -> Option<&'a XmlNode<'a>> {
        let mut sibling = self.prev_sibling.get();
        while let Some(s) = sibling {
            if tables::compare(s.name(), name, case_sensitive) {
                return Some(s);
            }
            sibling = s.prev_sibling.get();
        }
        None
    }

    /// Returns the next sibling, or `None` for a last child or a detached
    /// node.
    #[must_use]
    pub fn next_sibling(&self) -> Option<&'a XmlNode<'a>> {
        self.next_sibling.get()
    }

    /// Returns the closest following sibling with the given name.
    #[must_use]
    pub fn next_sibling_named(&self, name: &[u8], case_sensitive: bool) -> Option<&'a XmlNode<'a>> {
        let mut sibling = self.next_sibling.get();
        while let Some(s) = sibling {
            if tables::compare(s.name(), name, case_sensitive) {
                return Some(s);
            }
            sibling = s.next_sibling.get();
        }
        None
    }

    /// Returns the first attribute, or `None` if the node has none.
    #[must_use]
    pub fn first_attribute(&self) -> Option<&'a XmlAttribute<'a>> {
        self.first_attribute.get()
    }

    /// Returns the first attribute with the given name.
    #[must_use]
    pub fn first_attribute_named(
        &self,
        name: &[u8],
        case_sensitive: bool,
    ) -> Option<&'a XmlAttribute<'a>> {
        let mut attribute = self.first_attribute.get();
        while let Some(a) = attribute {
            if tables::compare(a.name(), name, case_sensitive) {
                return Some(a);
            }
            attribute = a.next_attribute.get();
        }
        None
    }

    /// Returns the last attribute, or `None` if the node has none.
    #[must_use]
    pub fn last_attribute(&self) -> Option<&'a XmlAttribute<'a>> {
        self.last_attribute.get()
    }

    /// Returns the last attribute with the given name.
    #[must_use]
    pub fn last_attribute_named(
        &self,
        name: &[u8],
        case_sensitive: bool,
    ) -> Option<&'a XmlAttribute<'a>> {
        let mut attribute = self.last_attribute.get();
        while let Some(a) = attribute {
            if tables::compare(a.name(), name, case_sensitive) {
                return Some(a);
            }
            attribute = a.prev_attribute.get();
        }
        None
    }

    ///////////////////////////////////////////////////////////////////////
    // Child mutation

    /// Prepends a child node.
    ///
    /// # Panics
    ///
    /// Panics if `child` is attached somewhere or is a document node.
    pub fn prepend_child(&'a self, child: &'a XmlNode<'a>) {
        Self::assert_insertable(child);
        if let Some(first) = self.first_child.get() {
            child.next_sibling.set(Some(first));
            first.prev_sibling.set(Some(child));
        } else {
            child.next_sibling.set(None);
            self.last_child.set(Some(child));
        }
        self.first_child.set(Some(child));
        child.parent.set(Some(self));
        child.prev_sibling.set(None);
    }

    /// Appends a child node.
    ///
    /// # Panics
    ///
    /// Panics if `child` is attached somewhere or is a document node.
    pub fn append_child(&'a self, child: &'a XmlNode<'a>) {
        Self::assert_insertable(child);
        if let Some(last) = self.last_child.get() {
            child.prev_sibling.set(Some(last));
            last.next_sibling.set(Some(child));
        } else {
            child.prev_sibling.set(None);
            self.first_child.set(Some(child));
        }
        self.last_child.set(Some(child));
        child.parent.set(Some(self));
        child.next_sibling.set(None);
    }

    /// Inserts a child before `anchor`; `None` appends.
    ///
    /// # Panics
    ///
    /// Panics if `child` is attached or is a document node, or if `anchor`
    /// is not a child of this node.
    pub fn insert_child_before(&'a self, anchor: Option<&'a XmlNode<'a>>, child: &'a XmlNode<'a>) {
        let Some(anchor) = anchor else {
            self.append_child(child);
            return;
        };
        Self::assert_insertable(child);
        assert!(
            anchor.parent.get().is_some_and(|p| ptr::eq(p, self)),
            "insert anchor is not a child of this node"
        );

        child.prev_sibling.set(anchor.prev_sibling.get());
        child.next_sibling.set(Some(anchor));
        match anchor.prev_sibling.get() {
            Some(prev) => prev.next_sibling.set(Some(child)),
            None => self.first_child.set(Some(child)),
        }
        anchor.prev_sibling.set(Some(child));
        child.parent.set(Some(self));
    }

    /// Detaches the first child. The child stays alive in the pool and may
    /// be re-attached.
    ///
    /// # Panics
    ///
    /// Panics if the node has no children.
    pub fn remove_first_child(&self) {
        let child = self.first_child.get().expect("node has no children");
        match child.next_sibling.get() {
            Some(next) => {
                next.prev_sibling.set(None);
                self.first_child.set(Some(next));
            }
            None => {
                self.first_child.set(None);
                self.last_child.set(None);
            }
        }
        Self::scrub_node(child);
    }

    /// Detaches the last child.
    ///
    /// # Panics
    ///
    /// Panics if the node has no children.
    pub fn remove_last_child(&self) {
        let child = self.last_child.get().expect("node has no children");
        match child.prev_sibling.get() {
            Some(prev) => {
                prev.next_sibling.set(None);
                self.last_child.set(Some(prev));
            }
            None => {
                self.first_child.set(None);
                self.last_child.set(None);
            }
        }
        Self::scrub_node(child);
    }

    /// Detaches the given child.
    ///
    /// # Panics
    ///
    /// Panics if `child` is not a child of this node.
    pub fn remove_child(&self, child: &'a XmlNode<'a>) {
        assert!(
            child.parent.get().is_some_and(|p| ptr::eq(p, self)),
            "node is not a child of this node"
        );
        match child.prev_sibling.get() {
            Some(prev) => prev.next_sibling.set(child.next_sibling.get()),
            None => self.first_child.set(child.next_sibling.get()),
        }
        match child.next_sibling.get() {
            Some(next) => next.prev_sibling.set(child.prev_sibling.get()),
            None => self.last_child.set(child.prev_sibling.get()),
        }
        Self::scrub_node(child);
    }

    /// Detaches every child.
    pub fn remove_all_children(&self) {
        let mut child = self.first_child.get();
        while let Some(c) = child {
            child = c.next_sibling.get();
            Self::scrub_node(c);
        }
        self.first_child.set(None);
        self.last_child.set(None);
    }

    ///////////////////////////////////////////////////////////////////////
    // Attribute mutation

    /// Prepends an attribute.
    ///
    /// # Panics
    ///
    /// Panics if `attribute` is already attached to a node.
    pub fn prepend_attribute(&'a self, attribute: &'a XmlAttribute<'a>) {
        assert!(attribute.parent.get().is_none(), "attribute is already attached");
        if let Some(first) = self.first_attribute.get() {
            attribute.next_attribute.set(Some(first));
            first.prev_attribute.set(Some(attribute));
        } else {
            attribute.next_attribute.set(None);
            self.last_attribute.set(Some(attribute));
        }
        self.first_attribute.set(Some(attribute));
        attribute.parent.set(Some(self));
        attribute.prev_attribute.set(None);
    }

    /// Appends an attribute.
    ///
    /// # Panics
    ///
    /// Panics if `attribute` is already attached to a node.
    pub fn append_attribute(&'a self, attribute: &'a XmlAttribute<'a>) {
        assert!(attribute.parent.get().is_none(), "attribute is already attached");
        if let Some(last) = self.last_attribute.get() {
            attribute.prev_attribute.set(Some(last));
            last.next_attribute.set(Some(attribute));
        } else {
            attribute.prev_attribute.set(None);
            self.first_attribute.set(Some(attribute));
        }
        self.last_attribute.set(Some(attribute));
        attribute.parent.set(Some(self));
        attribute.next_attribute.set(None);
    }

    /// Inserts an attribute before `anchor`; `None` appends.
    ///
    /// # Panics
    ///
    /// Panics if `attribute` is attached, or if `anchor` does not belong to
    /// this node.
    pub fn insert_attribute_before(
        &'a self,
        anchor: Option<&'a XmlAttribute<'a>>,
        attribute: &'a XmlAttribute<'a>,
    ) {
        let Some(anchor) = anchor else {
            self.append_attribute(attribute);
            return;
        };
        assert!(attribute.parent.get().is_none(), "attribute is already attached");
        assert!(
            anchor.parent.get().is_some_and(|p| ptr::eq(p, self)),
            "insert anchor does not belong to this node"
        );

        attribute.prev_attribute.set(anchor.prev_attribute.get());
        attribute.next_attribute.set(Some(anchor));
        match anchor.prev_attribute.get() {
            Some(prev) => prev.next_attribute.set(Some(attribute)),
            None => self.first_attribute.set(Some(attribute)),
        }
        anchor.prev_attribute.set(Some(attribute));
        attribute.parent.set(Some(self));
    }

    /// Detaches the first attribute.
    ///
    /// # Panics
    ///
    /// Panics if the node has no attributes.
    pub fn remove_first_attribute(&self) {
        let attribute = self.first_attribute.get().expect("node has no attributes");
        match attribute.next_attribute.get() {
            Some(next) => {
                next.prev_attribute.set(None);
                self.first_attribute.set(Some(next));
            }
            None => {
                self.first_attribute.set(None);
                self.last_attribute.set(None);
            }
        }
        Self::scrub_attribute(attribute);
    }

    /// Detaches the last attribute.
    ///
    /// # Panics
    ///
    /// Panics if the node has no attributes.
    pub fn remove_last_attribute(&self) {
        let attribute = self.last_attribute.get().expect("node has no attributes");
        match attribute.prev_attribute.get() {
            Some(prev) => {
                prev.next_attribute.set(None);
                self.last_attribute.set(Some(prev));
            }
            None => {
                self.first_attribute.set(None);
                self.last_attribute.set(None);
            }
        }
        Self::scrub_attribute(attribute);
    }

    /// Detaches the given attribute.
    ///
    /// # Panics
    ///
    /// Panics if `attribute` does not belong to this node.
    pub fn remove_attribute(&self, attribute: &'a XmlAttribute<'a>) {
        assert!(
            attribute.parent.get().is_some_and(|p| ptr::eq(p, self)),
            "attribute does not belong to this node"
        );
        match attribute.prev_attribute.get() {
            Some(prev) => prev.next_attribute.set(attribute.next_attribute.get()),
            None => self.first_attribute.set(attribute.next_attribute.get()),
        }
        match attribute.next_attribute.get() {
            Some(next) => next.prev_attribute.set(attribute.prev_attribute.get()),
            None => self.last_attribute.set(attribute.prev_attribute.get()),
        }
        Self::scrub_attribute(attribute);
    }

    /// Detaches every attribute.
    pub fn remove_all_attributes(&self) {
        let mut attribute = self.first_attribute.get();
        while let Some(a) = attribute {
            attribute = a.next_attribute.get();
            Self::scrub_attribute(a);
        }
        self.first_attribute.set(None);
        self.last_attribute.set(None);
    }

    fn assert_insertable(child: &XmlNode<'a>) {
        assert!(child.parent.get().is_none(), "node is already attached");
        assert!(
            child.kind() != NodeKind::Document,
            "a document node cannot be attached as a child"
        );
    }

    fn scrub_node(node: &XmlNode<'a>) {
        node.parent.set(None);
        node.prev_sibling.set(None);
        node.next_sibling.set(None);
    }

    fn scrub_attribute(attribute: &XmlAttribute<'a>) {
        attribute.parent.set(None);
        attribute.prev_attribute.set(None);
        attribute.next_attribute.set(None);
    }
}

impl fmt::Debug for XmlNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlNode")
            .field("kind", &self.kind.get())
            .field("name", &String::from_utf8_lossy(self.name()))
            .field("value", &String::from_utf8_lossy(self.value()))
            .finish_non_exhaustive()
    }
}
