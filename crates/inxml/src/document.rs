//! Document handle and parse entry point.

use std::fmt;
use std::ops::Deref;

use inxml_mem::MemoryPool;

use crate::error::ParseResult;
use crate::flags::ParseFlags;
use crate::node::{NodeKind, XmlNode};
use crate::parser::Parser;

/// A parsed XML document.
///
/// The document derefs to its root [`XmlNode`] (of kind
/// [`NodeKind::Document`]), so the tree is navigated directly:
///
/// ```
/// use inxml::{MemoryPool, ParseFlags, XmlDocument};
///
/// let pool = MemoryPool::new();
/// let mut buffer = *b"<greeting lang=\"en\">hello</greeting>\0";
/// let doc = XmlDocument::parse(&pool, buffer.as_mut_slice(), ParseFlags::default()).unwrap();
///
/// let greeting = doc.first_child().unwrap();
/// assert_eq!(greeting.name(), b"greeting");
/// assert_eq!(greeting.value(), b"hello");
/// assert_eq!(greeting.first_attribute().unwrap().value(), b"en");
/// ```
pub struct XmlDocument<'a> {
    node: &'a XmlNode<'a>,
}

impl<'a> XmlDocument<'a> {
    /// Parses an XML document in place.
    ///
    /// `text` must contain the whole document and end in a NUL byte; it is
    /// rewritten by the parser (entity decoding, whitespace condensing, NUL
    /// terminators) unless the flags forbid it, and it must outlive the
    /// document. Every node and attribute is carved from `pool`; parsing
    /// again with the same pool leaves previous trees allocated but
    /// untouched, exactly like re-parsing into a cleared-but-not-freed
    /// document.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::ParseError`] carrying the byte offset of the
    /// offending input. On error the pool may hold a partial tree; treat the
    /// document as corrupt and clear or drop the pool.
    pub fn parse(
        pool: &'a MemoryPool,
        text: &'a mut [u8],
        flags: ParseFlags,
    ) -> ParseResult<XmlDocument<'a>> {
        inxml_log::trace!("parsing {} byte buffer, flags {:#05x}", text.len(), flags.bits());

        let node = XmlNode::alloc_in(pool, NodeKind::Document);
        // A fresh receiver starts empty; re-parsing semantics keep the
        // detach step explicit all the same.
        node.remove_all_children();
        node.remove_all_attributes();

        let mut parser = Parser::new(pool, text, flags);
        match parser.parse_document(node) {
            Ok(()) => Ok(XmlDocument { node }),
            Err(error) => {
                inxml_log::debug!("parse failed at offset {}: {}", error.offset(), error);
                Err(error)
            }
        }
    }

    /// Returns the document node with the full pool lifetime, for mutation
    /// calls that need `&'a XmlNode<'a>` rather than a reborrow.
    #[must_use]
    pub fn as_node(&self) -> &'a XmlNode<'a> {
        self.node
    }
}

impl<'a> Deref for XmlDocument<'a> {
    type Target = XmlNode<'a>;

    fn deref(&self) -> &XmlNode<'a> {
        self.node
    }
}

impl fmt::Debug for XmlDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("XmlDocument").field(self.node).finish()
    }
}
