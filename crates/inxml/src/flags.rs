//! Parse flags controlling what the parser emits and rewrites.
//!
//! All flags default to cleared, so the meaning of each flag is a negation of
//! the default behavior; flags compose with `|`. The derived presets cover
//! the common profiles: untouched input ([`ParseFlags::NON_DESTRUCTIVE`]),
//! maximum speed ([`ParseFlags::FASTEST`]) and maximum extracted data
//! ([`ParseFlags::FULL`]).

use bitflags::bitflags;

bitflags! {
    /// Flag set accepted by [`crate::XmlDocument::parse`].
    ///
    /// ```
    /// use inxml::ParseFlags;
    ///
    /// let flags = ParseFlags::COMMENT_NODES | ParseFlags::TRIM_WHITESPACE;
    /// assert!(flags.contains(ParseFlags::COMMENT_NODES));
    /// assert!(ParseFlags::default().is_empty());
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ParseFlags: u32 {
        /// Do not create data/CDATA nodes. Text of the first data run still
        /// populates the enclosing element's value unless
        /// [`Self::NO_ELEMENT_VALUES`] is also set.
        const NO_DATA_NODES = 0x1;

        /// Do not mirror the first text run into the enclosing element's
        /// value.
        const NO_ELEMENT_VALUES = 0x2;

        /// Do not write NUL terminators after names and values; the input
        /// buffer is left byte-identical outside entity rewrites.
        const NO_STRING_TERMINATORS = 0x4;

        /// Leave `&name;` and `&#N;` sequences verbatim in text and
        /// attribute values.
        const NO_ENTITY_TRANSLATION = 0x8;

        /// Emit numeric character references as a single truncated 8-bit
        /// byte instead of a UTF-8 sequence.
        const NO_UTF8 = 0x10;

        /// Emit the `<?xml ... ?>` declaration as a node carrying its
        /// pseudo-attributes.
        const DECLARATION_NODE = 0x20;

        /// Emit `<!-- ... -->` comments as nodes instead of skipping them.
        const COMMENT_NODES = 0x40;

        /// Emit `<!DOCTYPE ...>` as a node instead of skipping it.
        const DOCTYPE_NODE = 0x80;

        /// Emit processing instructions as nodes instead of skipping them.
        const PI_NODES = 0x100;

        /// Check that each `</name>` matches its element's name.
        const VALIDATE_CLOSING_TAGS = 0x200;

        /// Strip leading and trailing whitespace of text runs.
        const TRIM_WHITESPACE = 0x400;

        /// Collapse whitespace runs in text (but never in attribute values)
        /// to a single space.
        const NORMALIZE_WHITESPACE = 0x800;

        /// Forbids any modification of the input buffer. Names and values
        /// will not be NUL-terminated and entities stay untranslated.
        const NON_DESTRUCTIVE =
            Self::NO_STRING_TERMINATORS.bits() | Self::NO_ENTITY_TRANSLATION.bits();

        /// Fastest possible parse without sacrificing structure.
        const FASTEST = Self::NON_DESTRUCTIVE.bits() | Self::NO_DATA_NODES.bits();

        /// Largest amount of extracted data, usually the slowest parse.
        const FULL = Self::DECLARATION_NODE.bits()
            | Self::COMMENT_NODES.bits()
            | Self::DOCTYPE_NODE.bits()
            | Self::PI_NODES.bits()
            | Self::VALIDATE_CLOSING_TAGS.bits();
    }
}
