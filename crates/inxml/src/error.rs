//! Parse error type.
//!
//! Every failure carries a short ASCII message and the byte offset into the
//! input buffer where the problem was detected. Errors are fatal for the
//! current parse: nothing is recovered internally and a partial tree may be
//! left in the pool; callers should treat the document as corrupt and either
//! clear the pool or discard it.

use std::fmt;

/// Errors produced by [`crate::XmlDocument::parse`].
///
/// The `offset` of each variant is the byte position of the offending input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The document contains non-whitespace content outside a tag.
    ExpectedOpenAngle {
        /// Location in the input buffer.
        offset: usize,
    },

    /// An element name scan matched zero bytes.
    ExpectedElementName {
        /// Location in the input buffer.
        offset: usize,
    },

    /// An attribute name scan matched zero bytes.
    ExpectedAttributeName {
        /// Location in the input buffer.
        offset: usize,
    },

    /// A processing-instruction target scan matched zero bytes.
    ExpectedPiTarget {
        /// Location in the input buffer.
        offset: usize,
    },

    /// An attribute name is not followed by `=`.
    ExpectedEquals {
        /// Location in the input buffer.
        offset: usize,
    },

    /// An attribute value is not delimited by `'` or `"`.
    ExpectedQuote {
        /// Location in the input buffer.
        offset: usize,
    },

    /// An XML declaration is not closed by `?>`.
    ExpectedDeclarationEnd {
        /// Location in the input buffer.
        offset: usize,
    },

    /// A tag is not closed by `>`.
    ExpectedTagEnd {
        /// Location in the input buffer.
        offset: usize,
    },

    /// A numeric character reference is not terminated by `;`.
    ExpectedSemicolon {
        /// Location in the input buffer.
        offset: usize,
    },

    /// Closing-tag validation is enabled and `</name>` does not match the
    /// open element.
    InvalidClosingTagName {
        /// Location in the input buffer.
        offset: usize,
    },

    /// The input ended while scanning for a terminator.
    UnexpectedEndOfData {
        /// Location in the input buffer.
        offset: usize,
    },

    /// A numeric character reference decodes to a code point above the
    /// Unicode range.
    InvalidNumericEntity {
        /// Location in the input buffer.
        offset: usize,
    },
}

impl ParseError {
    /// Returns the byte offset into the input buffer at which the error was
    /// detected.
    #[must_use]
    pub const fn offset(&self) -> usize {
        match *self {
            ParseError::ExpectedOpenAngle { offset }
            | ParseError::ExpectedElementName { offset }
            | ParseError::ExpectedAttributeName { offset }
            | ParseError::ExpectedPiTarget { offset }
            | ParseError::ExpectedEquals { offset }
            | ParseError::ExpectedQuote { offset }
            | ParseError::ExpectedDeclarationEnd { offset }
            | ParseError::ExpectedTagEnd { offset }
            | ParseError::ExpectedSemicolon { offset }
            | ParseError::InvalidClosingTagName { offset }
            | ParseError::UnexpectedEndOfData { offset }
            | ParseError::InvalidNumericEntity { offset } => offset,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ParseError::ExpectedOpenAngle { .. } => "expected <",
            ParseError::ExpectedElementName { .. } => "expected element name",
            ParseError::ExpectedAttributeName { .. } => "expected attribute name",
            ParseError::ExpectedPiTarget { .. } => "expected PI target",
            ParseError::ExpectedEquals { .. } => "expected =",
            ParseError::ExpectedQuote { .. } => "expected ' or \"",
            ParseError::ExpectedDeclarationEnd { .. } => "expected ?>",
            ParseError::ExpectedTagEnd { .. } => "expected >",
            ParseError::ExpectedSemicolon { .. } => "expected ;",
            ParseError::InvalidClosingTagName { .. } => "invalid closing tag name",
            ParseError::UnexpectedEndOfData { .. } => "unexpected end of data",
            ParseError::InvalidNumericEntity { .. } => "invalid numeric character entity",
        };
        f.write_str(message)
    }
}

impl std::error::Error for ParseError {}

/// Result type for parse operations.
pub type ParseResult<T> = Result<T, ParseError>;
