//! `inxml`: an in-place, arena-backed XML 1.0 reader.
//!
//! The parser transforms a single writable, NUL-terminated byte buffer into
//! a lightweight DOM without copying character data: every name and value in
//! the tree is a slice into the buffer. Entities are decoded and whitespace
//! condensed by rewriting the buffer in place, and all nodes and attributes
//! are carved from a [`MemoryPool`], so teardown is a single pool release.
//!
//! The trade-off is explicit: the caller surrenders the buffer for the
//! lifetime of the tree and gets zero per-string allocation and
//! deterministic teardown in return: the profile wanted by configuration
//! loaders, message decoders and embedded pipelines.
//!
//! # Modules
//!
//! - [`document`]: the parse entry point and document handle
//! - [`node`] / [`attribute`]: the DOM records, traversal and mutation
//! - [`flags`]: the [`ParseFlags`] bit set and presets
//! - [`error`]: [`ParseError`] with exact byte offsets
//!
//! # Example
//!
//! ```
//! use inxml::{MemoryPool, ParseFlags, XmlDocument};
//!
//! let pool = MemoryPool::new();
//! let mut buffer = *b"<config><port>8080</port></config>\0";
//! let doc = XmlDocument::parse(&pool, buffer.as_mut_slice(), ParseFlags::default()).unwrap();
//!
//! let config = doc.first_child().unwrap();
//! let port = config.first_child_named(b"port", true).unwrap();
//! assert_eq!(port.value(), b"8080");
//! ```
//!
//! # Out of scope
//!
//! Namespaces, schema validation, XPath, XInclude, serialization and
//! external entities are deliberately not implemented; DOCTYPE internal
//! subsets are skipped, not interpreted.

#![warn(missing_docs)]

pub mod attribute;
pub mod document;
pub mod error;
pub mod flags;
pub mod node;

mod parser;
mod tables;

pub use attribute::XmlAttribute;
pub use document::XmlDocument;
pub use error::{ParseError, ParseResult};
pub use flags::ParseFlags;
pub use node::{NodeKind, XmlNode};

// The pool is half of the public contract; re-export it so callers need a
// single dependency.
pub use inxml_mem::MemoryPool;
