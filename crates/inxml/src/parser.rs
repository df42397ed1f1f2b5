//! The destructive, single-pass parser.
//!
//! The parser consumes a writable, NUL-terminated byte buffer exactly once,
//! carving nodes and attributes from the pool and rewriting the buffer in
//! place: entities are decoded, whitespace optionally condensed, and NUL
//! terminators inserted after names and values. All string slices handed to
//! the DOM alias the buffer.
//!
//! Scanning is table-driven (see [`crate::tables`]) over index cursors.
//! Reading at or past the end of the slice yields the NUL sentinel, so a
//! buffer that is missing its trailing NUL fails with "unexpected end of
//! data" instead of running off the end.

use std::marker::PhantomData;

use inxml_mem::MemoryPool;

use crate::attribute::XmlAttribute;
use crate::error::{ParseError, ParseResult};
use crate::flags::ParseFlags;
use crate::node::{NodeKind, XmlNode};
use crate::tables::{
    self, ATTRIBUTE_DATA_DOUBLE, ATTRIBUTE_DATA_DOUBLE_PURE, ATTRIBUTE_DATA_SINGLE,
    ATTRIBUTE_DATA_SINGLE_PURE, ATTRIBUTE_NAME, ByteTable, DIGITS, NODE_NAME, TEXT,
    TEXT_PURE_NO_WS, TEXT_PURE_WITH_WS, WHITESPACE,
};

/// Parser state: the pool receiving nodes, the flag set, and a cursor over
/// the raw buffer.
pub(crate) struct Parser<'a> {
    pool: &'a MemoryPool,
    flags: ParseFlags,
    base: *mut u8,
    len: usize,
    pos: usize,
    /// Holds the exclusive borrow of the buffer for `'a`; slices handed to
    /// the DOM are re-derived from `base` and stay disjoint from every
    /// later write.
    _buffer: PhantomData<&'a mut [u8]>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(pool: &'a MemoryPool, text: &'a mut [u8], flags: ParseFlags) -> Parser<'a> {
        Parser {
            pool,
            flags,
            base: text.as_mut_ptr(),
            len: text.len(),
            pos: 0,
            _buffer: PhantomData,
        }
    }

    ///////////////////////////////////////////////////////////////////////
    // Cursor primitives

    /// Reads the byte at `index`, or the NUL sentinel past the end.
    #[inline]
    fn at(&self, index: usize) -> u8 {
        if index < self.len {
            // SAFETY: index < len, inside the borrowed buffer.
            unsafe { self.base.add(index).read() }
        } else {
            0
        }
    }

    /// Reads the byte at the cursor.
    #[inline]
    fn cur(&self) -> u8 {
        self.at(self.pos)
    }

    /// Writes a byte into the buffer.
    #[inline]
    fn write(&mut self, index: usize, byte: u8) {
        debug_assert!(index < self.len);
        // SAFETY: index < len; rewrites are non-expanding and terminators
        // land on already-scanned bytes, so the write is in bounds and
        // outside every slice already handed to the DOM.
        unsafe { self.base.add(index).write(byte) }
    }

    /// Writes a NUL terminator unless the flags suppress it. A terminator
    /// position at the very end of the slice is skipped: such input is
    /// malformed and about to fail anyway.
    fn terminate(&mut self, index: usize) {
        if !self.flags.contains(ParseFlags::NO_STRING_TERMINATORS) && index < self.len {
            self.write(index, 0);
        }
    }

    /// Advances the cursor while the table keeps accepting bytes.
    #[inline]
    fn skip(&mut self, table: &ByteTable) {
        while table[self.cur() as usize] != 0 {
            self.pos += 1;
        }
    }

    /// Returns the buffer range as a slice tied to the buffer lifetime.
    fn slice(&self, start: usize, end: usize) -> &'a [u8] {
        debug_assert!(start <= end && end <= self.len);
        // SAFETY: the range is inside the buffer, which is borrowed for 'a;
        // every later buffer write lands outside ranges handed out here.
        unsafe { std::slice::from_raw_parts(self.base.add(start), end - start) }
    }

    /// Tests whether `pattern` occurs verbatim at `index`.
    fn matches_at(&self, index: usize, pattern: &[u8]) -> bool {
        pattern.iter().enumerate().all(|(i, &b)| self.at(index + i) == b)
    }

    ///////////////////////////////////////////////////////////////////////
    // Text scanning with in-place rewriting

    /// Scans until `stop` rejects a byte, decoding entities and condensing
    /// whitespace in place per `flags`. The source cursor reads ahead while
    /// a destination cursor writes behind; rewrites are never longer than
    /// their source. Returns the end of the (possibly shortened) run; the
    /// cursor is left at the stop byte.
    fn skip_and_expand(
        &mut self,
        stop: &ByteTable,
        stop_pure: &ByteTable,
        flags: ParseFlags,
    ) -> ParseResult<usize> {
        // With no rewriting requested the plain skip suffices.
        if flags.contains(ParseFlags::NO_ENTITY_TRANSLATION)
            && !flags.contains(ParseFlags::NORMALIZE_WHITESPACE)
            && !flags.contains(ParseFlags::TRIM_WHITESPACE)
        {
            self.skip(stop);
            return Ok(self.pos);
        }

        // Plain skip until the first byte that needs a rewrite.
        self.skip(stop_pure);

        let mut src = self.pos;
        let mut dst = src;
        while stop[self.at(src) as usize] != 0 {
            if !flags.contains(ParseFlags::NO_ENTITY_TRANSLATION)
                && self.at(src) == b'&'
                && let Some((next_src, next_dst)) = self.expand_entity(src, dst, flags)?
            {
                src = next_src;
                dst = next_dst;
                continue;
            }

            if flags.contains(ParseFlags::NORMALIZE_WHITESPACE)
                && WHITESPACE[self.at(src) as usize] != 0
            {
                self.write(dst, b' ');
                dst += 1;
                src += 1;
                while WHITESPACE[self.at(src) as usize] != 0 {
                    src += 1;
                }
                continue;
            }

            let byte = self.at(src);
            self.write(dst, byte);
            dst += 1;
            src += 1;
        }

        self.pos = src;
        Ok(dst)
    }

    /// Decodes one entity reference at `src`, writing the replacement at
    /// `dst`. Returns the new cursors, or `None` when the `&` does not open
    /// a recognized reference and must be copied verbatim.
    fn expand_entity(
        &mut self,
        src: usize,
        dst: usize,
        flags: ParseFlags,
    ) -> ParseResult<Option<(usize, usize)>> {
        match self.at(src + 1) {
            // &amp; &apos;
            b'a' => {
                if self.matches_at(src + 2, b"mp;") {
                    self.write(dst, b'&');
                    return Ok(Some((src + 5, dst + 1)));
                }
                if self.matches_at(src + 2, b"pos;") {
                    self.write(dst, b'\'');
                    return Ok(Some((src + 6, dst + 1)));
                }
                Ok(None)
            }

            // &quot;
            b'q' => {
                if self.matches_at(src + 2, b"uot;") {
                    self.write(dst, b'"');
                    return Ok(Some((src + 6, dst + 1)));
                }
                Ok(None)
            }

            // &gt;
            b'g' => {
                if self.matches_at(src + 2, b"t;") {
                    self.write(dst, b'>');
                    return Ok(Some((src + 4, dst + 1)));
                }
                Ok(None)
            }

            // &lt;
            b'l' => {
                if self.matches_at(src + 2, b"t;") {
                    self.write(dst, b'<');
                    return Ok(Some((src + 4, dst + 1)));
                }
                Ok(None)
            }

            // &#...; decimal or hex code point
            b'#' => {
                let mut code: u32 = 0;
                let mut cursor;
                if self.at(src + 2) == b'x' {
                    cursor = src + 3;
                    loop {
                        let digit = DIGITS[self.at(cursor) as usize];
                        if digit == 0xFF {
                            break;
                        }
                        code = code.saturating_mul(16).saturating_add(u32::from(digit));
                        cursor += 1;
                    }
                } else {
                    cursor = src + 2;
                    loop {
                        let digit = DIGITS[self.at(cursor) as usize];
                        if digit == 0xFF {
                            break;
                        }
                        code = code.saturating_mul(10).saturating_add(u32::from(digit));
                        cursor += 1;
                    }
                }
                let next_dst = self.insert_coded_character(dst, code, flags, src)?;
                if self.at(cursor) != b';' {
                    return Err(ParseError::ExpectedSemicolon { offset: cursor });
                }
                Ok(Some((cursor + 1, next_dst)))
            }

            // Something else: copy the '&' verbatim.
            _ => Ok(None),
        }
    }

    /// Writes `code` at `dst` as UTF-8 (or a single truncated byte under
    /// `NO_UTF8`) and returns the new destination cursor.
    fn insert_coded_character(
        &mut self,
        dst: usize,
        code: u32,
        flags: ParseFlags,
        entity_start: usize,
    ) -> ParseResult<usize> {
        if flags.contains(ParseFlags::NO_UTF8) {
            // Plain 8-bit output: the low byte of the code point.
            self.write(dst, code as u8);
            return Ok(dst + 1);
        }
        if code < 0x80 {
            self.write(dst, code as u8);
            Ok(dst + 1)
        } else if code < 0x800 {
            self.write(dst, (0xC0 | (code >> 6)) as u8);
            self.write(dst + 1, (0x80 | (code & 0x3F)) as u8);
            Ok(dst + 2)
        } else if code < 0x10000 {
            self.write(dst, (0xE0 | (code >> 12)) as u8);
            self.write(dst + 1, (0x80 | ((code >> 6) & 0x3F)) as u8);
            self.write(dst + 2, (0x80 | (code & 0x3F)) as u8);
            Ok(dst + 3)
        } else if code < 0x11_0000 {
            self.write(dst, (0xF0 | (code >> 18)) as u8);
            self.write(dst + 1, (0x80 | ((code >> 12) & 0x3F)) as u8);
            self.write(dst + 2, (0x80 | ((code >> 6) & 0x3F)) as u8);
            self.write(dst + 3, (0x80 | (code & 0x3F)) as u8);
            Ok(dst + 4)
        } else {
            Err(ParseError::InvalidNumericEntity { offset: entity_start })
        }
    }

    ///////////////////////////////////////////////////////////////////////
    // Parsing routines

    /// Parses the whole document into `document`'s child list.
    pub(crate) fn parse_document(&mut self, document: &'a XmlNode<'a>) -> ParseResult<()> {
        self.parse_bom();
        loop {
            self.skip(&WHITESPACE);
            if self.cur() == 0 {
                return Ok(());
            }
            if self.cur() != b'<' {
                return Err(ParseError::ExpectedOpenAngle { offset: self.pos });
            }
            self.pos += 1;
            if let Some(node) = self.parse_node()? {
                document.append_child(node);
            }
        }
    }

    /// Skips a UTF-8 byte-order mark, if present.
    fn parse_bom(&mut self) {
        if self.matches_at(self.pos, b"\xEF\xBB\xBF") {
            self.pos += 3;
        }
    }

    /// Dispatches on the byte after `<` and parses one node. Returns `None`
    /// for recognized constructs the flags exclude.
    fn parse_node(&mut self) -> ParseResult<Option<&'a XmlNode<'a>>> {
        match self.cur() {
            // <?...
            b'?' => {
                self.pos += 1;
                if matches!(self.cur(), b'x' | b'X')
                    && matches!(self.at(self.pos + 1), b'm' | b'M')
                    && matches!(self.at(self.pos + 2), b'l' | b'L')
                    && WHITESPACE[self.at(self.pos + 3) as usize] != 0
                {
                    // '<?xml ' is the declaration
                    self.pos += 4;
                    self.parse_xml_declaration()
                } else {
                    self.parse_pi()
                }
            }

            // <!...
            b'!' => {
                match self.at(self.pos + 1) {
                    // <!--
                    b'-' if self.at(self.pos + 2) == b'-' => {
                        self.pos += 3;
                        return self.parse_comment();
                    }
                    // <![CDATA[
                    b'[' if self.matches_at(self.pos + 2, b"CDATA[") => {
                        self.pos += 8;
                        return self.parse_cdata();
                    }
                    // <!DOCTYPE followed by whitespace
                    b'D' if self.matches_at(self.pos + 2, b"OCTYPE")
                        && WHITESPACE[self.at(self.pos + 8) as usize] != 0 =>
                    {
                        self.pos += 9;
                        return self.parse_doctype();
                    }
                    _ => {}
                }
                // Unrecognized <! content: skip to the closing '>'.
                self.pos += 1;
                while self.cur() != b'>' {
                    if self.cur() == 0 {
                        return Err(ParseError::UnexpectedEndOfData { offset: self.pos });
                    }
                    self.pos += 1;
                }
                self.pos += 1;
                Ok(None)
            }

            // Everything else is an element.
            _ => self.parse_element().map(Some),
        }
    }

    /// Parses `<?xml ...?>`; the leading `<?xml ` has been consumed.
    fn parse_xml_declaration(&mut self) -> ParseResult<Option<&'a XmlNode<'a>>> {
        if !self.flags.contains(ParseFlags::DECLARATION_NODE) {
            while !(self.cur() == b'?' && self.at(self.pos + 1) == b'>') {
                if self.cur() == 0 {
                    return Err(ParseError::UnexpectedEndOfData { offset: self.pos });
                }
                self.pos += 1;
            }
            self.pos += 2;
            return Ok(None);
        }

        let declaration = XmlNode::alloc_in(self.pool, NodeKind::Declaration);
        self.skip(&WHITESPACE);
        self.parse_node_attributes(declaration)?;
        if !(self.cur() == b'?' && self.at(self.pos + 1) == b'>') {
            return Err(ParseError::ExpectedDeclarationEnd { offset: self.pos });
        }
        self.pos += 2;
        Ok(Some(declaration))
    }

    /// Parses `<!--...-->`; the leading `<!--` has been consumed.
    fn parse_comment(&mut self) -> ParseResult<Option<&'a XmlNode<'a>>> {
        if !self.flags.contains(ParseFlags::COMMENT_NODES) {
            while !self.matches_at(self.pos, b"-->") {
                if self.cur() == 0 {
                    return Err(ParseError::UnexpectedEndOfData { offset: self.pos });
                }
                self.pos += 1;
            }
            self.pos += 3;
            return Ok(None);
        }

        let value_start = self.pos;
        while !self.matches_at(self.pos, b"-->") {
            if self.cur() == 0 {
                return Err(ParseError::UnexpectedEndOfData { offset: self.pos });
            }
            self.pos += 1;
        }

        let comment = XmlNode::alloc_in(self.pool, NodeKind::Comment);
        comment.set_value(self.slice(value_start, self.pos));
        self.terminate(self.pos);
        self.pos += 3;
        Ok(Some(comment))
    }

    /// Parses `<!DOCTYPE ...>`; the leading `<!DOCTYPE ` has been consumed.
    /// A `[ ... ]` internal subset is consumed as a unit by bracket depth
    /// and never interpreted.
    fn parse_doctype(&mut self) -> ParseResult<Option<&'a XmlNode<'a>>> {
        let value_start = self.pos;
        while self.cur() != b'>' {
            match self.cur() {
                b'[' => {
                    self.pos += 1;
                    let mut depth = 1usize;
                    while depth > 0 {
                        match self.cur() {
                            b'[' => depth += 1,
                            b']' => depth -= 1,
                            0 => {
                                return Err(ParseError::UnexpectedEndOfData { offset: self.pos });
                            }
                            _ => {}
                        }
                        self.pos += 1;
                    }
                }
                0 => return Err(ParseError::UnexpectedEndOfData { offset: self.pos }),
                _ => self.pos += 1,
            }
        }

        if self.flags.contains(ParseFlags::DOCTYPE_NODE) {
            let doctype = XmlNode::alloc_in(self.pool, NodeKind::Doctype);
            doctype.set_value(self.slice(value_start, self.pos));
            self.terminate(self.pos);
            self.pos += 1;
            Ok(Some(doctype))
        } else {
            self.pos += 1;
            Ok(None)
        }
    }

    /// Parses `<?target body?>`; the leading `<?` has been consumed.
    fn parse_pi(&mut self) -> ParseResult<Option<&'a XmlNode<'a>>> {
        if !self.flags.contains(ParseFlags::PI_NODES) {
            while !(self.cur() == b'?' && self.at(self.pos + 1) == b'>') {
                if self.cur() == 0 {
                    return Err(ParseError::UnexpectedEndOfData { offset: self.pos });
                }
                self.pos += 1;
            }
            self.pos += 2;
            return Ok(None);
        }

        let pi = XmlNode::alloc_in(self.pool, NodeKind::Pi);

        let name_start = self.pos;
        self.skip(&NODE_NAME);
        if self.pos == name_start {
            return Err(ParseError::ExpectedPiTarget { offset: self.pos });
        }
        let name_end = self.pos;
        pi.set_name(self.slice(name_start, name_end));

        self.skip(&WHITESPACE);

        // The body runs verbatim to '?>': no entity expansion, no
        // whitespace normalization.
        let value_start = self.pos;
        while !(self.cur() == b'?' && self.at(self.pos + 1) == b'>') {
            if self.cur() == 0 {
                return Err(ParseError::UnexpectedEndOfData { offset: self.pos });
            }
            self.pos += 1;
        }
        let value_end = self.pos;
        pi.set_value(self.slice(value_start, value_end));

        self.terminate(name_end);
        self.terminate(value_end);
        self.pos += 2;
        Ok(Some(pi))
    }

    /// Parses `<![CDATA[...]]>`; the leading `<![CDATA[` has been consumed.
    fn parse_cdata(&mut self) -> ParseResult<Option<&'a XmlNode<'a>>> {
        if self.flags.contains(ParseFlags::NO_DATA_NODES) {
            while !self.matches_at(self.pos, b"]]>") {
                if self.cur() == 0 {
                    return Err(ParseError::UnexpectedEndOfData { offset: self.pos });
                }
                self.pos += 1;
            }
            self.pos += 3;
            return Ok(None);
        }

        let value_start = self.pos;
        while !self.matches_at(self.pos, b"]]>") {
            if self.cur() == 0 {
                return Err(ParseError::UnexpectedEndOfData { offset: self.pos });
            }
            self.pos += 1;
        }

        let cdata = XmlNode::alloc_in(self.pool, NodeKind::Cdata);
        cdata.set_value(self.slice(value_start, self.pos));
        self.terminate(self.pos);
        self.pos += 3;
        Ok(Some(cdata))
    }

    /// Parses an element; the leading `<` has been consumed.
    fn parse_element(&mut self) -> ParseResult<&'a XmlNode<'a>> {
        let element = XmlNode::alloc_in(self.pool, NodeKind::Element);

        let name_start = self.pos;
        self.skip(&NODE_NAME);
        if self.pos == name_start {
            return Err(ParseError::ExpectedElementName { offset: self.pos });
        }
        let name_end = self.pos;
        element.set_name(self.slice(name_start, name_end));

        self.skip(&WHITESPACE);
        self.parse_node_attributes(element)?;

        match self.cur() {
            b'>' => {
                self.pos += 1;
                self.parse_node_contents(element)?;
            }
            b'/' => {
                self.pos += 1;
                if self.cur() != b'>' {
                    return Err(ParseError::ExpectedTagEnd { offset: self.pos });
                }
                self.pos += 1;
            }
            _ => return Err(ParseError::ExpectedTagEnd { offset: self.pos }),
        }

        // The byte after the name is long consumed, so the terminator goes
        // in last.
        self.terminate(name_end);
        Ok(element)
    }

    /// Parses element contents (children, text) up to and including the
    /// closing tag.
    fn parse_node_contents(&mut self, node: &'a XmlNode<'a>) -> ParseResult<()> {
        loop {
            let contents_start = self.pos;
            self.skip(&WHITESPACE);
            let mut next_char = self.cur();

            // A data run may overwrite its stop byte with a terminator, so
            // the data parser returns the byte it actually stopped on and
            // dispatch re-enters here without re-reading the buffer.
            loop {
                match next_char {
                    b'<' => {
                        if self.at(self.pos + 1) == b'/' {
                            // Closing tag.
                            self.pos += 2;
                            let closing_start = self.pos;
                            self.skip(&NODE_NAME);
                            if self.flags.contains(ParseFlags::VALIDATE_CLOSING_TAGS)
                                && !tables::compare(
                                    node.name(),
                                    self.slice(closing_start, self.pos),
                                    true,
                                )
                            {
                                return Err(ParseError::InvalidClosingTagName {
                                    offset: closing_start,
                                });
                            }
                            self.skip(&WHITESPACE);
                            if self.cur() != b'>' {
                                return Err(ParseError::ExpectedTagEnd { offset: self.pos });
                            }
                            self.pos += 1;
                            return Ok(());
                        }
                        // Child node.
                        self.pos += 1;
                        if let Some(child) = self.parse_node()? {
                            node.append_child(child);
                        }
                        break;
                    }
                    0 => return Err(ParseError::UnexpectedEndOfData { offset: self.pos }),
                    _ => {
                        next_char = self.parse_and_append_data(node, contents_start)?;
                    }
                }
            }
        }
    }

    /// Parses a text run, appending a data node and mirroring the first run
    /// into the element value as the flags dictate. Returns the byte that
    /// ended the run (it may have just been overwritten by a terminator).
    fn parse_and_append_data(
        &mut self,
        node: &'a XmlNode<'a>,
        contents_start: usize,
    ) -> ParseResult<u8> {
        // Rewind over the skipped leading whitespace unless it is being
        // trimmed anyway.
        if !self.flags.contains(ParseFlags::TRIM_WHITESPACE) {
            self.pos = contents_start;
        }

        let value_start = self.pos;
        let mut end = if self.flags.contains(ParseFlags::NORMALIZE_WHITESPACE) {
            self.skip_and_expand(&TEXT, &TEXT_PURE_WITH_WS, self.flags)?
        } else {
            self.skip_and_expand(&TEXT, &TEXT_PURE_NO_WS, self.flags)?
        };

        if self.flags.contains(ParseFlags::TRIM_WHITESPACE) {
            if self.flags.contains(ParseFlags::NORMALIZE_WHITESPACE) {
                // Runs are already single spaces; at most one trails.
                if end > value_start && self.at(end - 1) == b' ' {
                    end -= 1;
                }
            } else {
                while end > value_start && WHITESPACE[self.at(end - 1) as usize] != 0 {
                    end -= 1;
                }
            }
        }

        if !self.flags.contains(ParseFlags::NO_DATA_NODES) {
            let data = XmlNode::alloc_in(self.pool, NodeKind::Data);
            data.set_value(self.slice(value_start, end));
            node.append_child(data);
        }

        // Mirror the first run into the element value.
        if !self.flags.contains(ParseFlags::NO_ELEMENT_VALUES) && node.value().is_empty() {
            node.set_value(self.slice(value_start, end));
        }

        let next_char = self.cur();
        self.terminate(end);
        Ok(next_char)
    }

    /// Parses the attribute list of an element or declaration.
    fn parse_node_attributes(&mut self, node: &'a XmlNode<'a>) -> ParseResult<()> {
        while ATTRIBUTE_NAME[self.cur() as usize] != 0 {
            let name_start = self.pos;
            self.skip(&ATTRIBUTE_NAME);
            if self.pos == name_start {
                return Err(ParseError::ExpectedAttributeName { offset: name_start });
            }
            let name_end = self.pos;

            let attribute = XmlAttribute::alloc_in(self.pool);
            attribute.set_name(self.slice(name_start, name_end));
            node.append_attribute(attribute);

            self.skip(&WHITESPACE);
            if self.cur() != b'=' {
                return Err(ParseError::ExpectedEquals { offset: self.pos });
            }
            self.pos += 1;
            self.terminate(name_end);
            self.skip(&WHITESPACE);

            let quote = self.cur();
            if quote != b'\'' && quote != b'"' {
                return Err(ParseError::ExpectedQuote { offset: self.pos });
            }
            self.pos += 1;

            // Attribute values never get whitespace normalization.
            let attribute_flags = self.flags.difference(ParseFlags::NORMALIZE_WHITESPACE);
            let value_start = self.pos;
            let end = if quote == b'\'' {
                self.skip_and_expand(
                    &ATTRIBUTE_DATA_SINGLE,
                    &ATTRIBUTE_DATA_SINGLE_PURE,
                    attribute_flags,
                )?
            } else {
                self.skip_and_expand(
                    &ATTRIBUTE_DATA_DOUBLE,
                    &ATTRIBUTE_DATA_DOUBLE_PURE,
                    attribute_flags,
                )?
            };
            attribute.set_value(self.slice(value_start, end));

            if self.cur() != quote {
                return Err(ParseError::ExpectedQuote { offset: self.pos });
            }
            self.pos += 1;
            self.terminate(end);
            self.skip(&WHITESPACE);
        }
        Ok(())
    }
}
