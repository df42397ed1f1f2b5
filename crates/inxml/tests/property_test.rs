//! Property-based tests for the parser and DOM.
//!
//! Random well-formed documents are generated from a model tree, rendered to
//! bytes, parsed, and checked against both the model and the structural
//! invariants of the DOM (parent back-references, sibling list symmetry,
//! head/tail consistency).

use inxml::{MemoryPool, NodeKind, ParseError, ParseFlags, XmlDocument, XmlNode};
use proptest::prelude::*;

/// Model of a well-formed document subtree.
#[derive(Debug, Clone)]
enum Tree {
    Element {
        name: String,
        attributes: Vec<(String, String)>,
        children: Vec<Tree>,
    },
    Text(String),
}

/// Merges adjacent text children the way the parser merges adjacent runs.
fn merge_adjacent_text(children: Vec<Tree>) -> Vec<Tree> {
    let mut merged: Vec<Tree> = Vec::new();
    for child in children {
        match (merged.last_mut(), child) {
            (Some(Tree::Text(acc)), Tree::Text(text)) => acc.push_str(&text),
            (_, child) => merged.push(child),
        }
    }
    merged
}

fn render(tree: &Tree, out: &mut Vec<u8>) {
    match tree {
        Tree::Text(text) => out.extend_from_slice(text.as_bytes()),
        Tree::Element { name, attributes, children } => {
            out.push(b'<');
            out.extend_from_slice(name.as_bytes());
            for (key, value) in attributes {
                out.push(b' ');
                out.extend_from_slice(key.as_bytes());
                out.extend_from_slice(b"=\"");
                out.extend_from_slice(value.as_bytes());
                out.push(b'"');
            }
            if children.is_empty() {
                out.extend_from_slice(b"/>");
            } else {
                out.push(b'>');
                for child in children {
                    render(child, out);
                }
                out.extend_from_slice(b"</");
                out.extend_from_slice(name.as_bytes());
                out.push(b'>');
            }
        }
    }
}

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,7}"
}

/// Text without whitespace or markup, so parsed data must be byte-identical.
fn text_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]{1,16}"
}

fn attribute_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec((name_strategy(), "[a-zA-Z0-9 ._-]{0,12}"), 0..3)
}

fn element_strategy() -> impl Strategy<Value = Tree> {
    let leaf = prop_oneof![
        text_strategy().prop_map(Tree::Text),
        (name_strategy(), attribute_strategy()).prop_map(|(name, attributes)| Tree::Element {
            name,
            attributes,
            children: Vec::new(),
        }),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        (name_strategy(), attribute_strategy(), prop::collection::vec(inner, 0..4)).prop_map(
            |(name, attributes, children)| Tree::Element {
                name,
                attributes,
                children: merge_adjacent_text(children),
            },
        )
    })
    .prop_map(|tree| match tree {
        // The document root must be an element.
        Tree::Text(text) => Tree::Element {
            name: "root".to_string(),
            attributes: Vec::new(),
            children: vec![Tree::Text(text)],
        },
        element => element,
    })
}

/// Checks sibling/attribute list symmetry and parent back-references for the
/// whole subtree.
fn check_structure(node: &XmlNode<'_>) {
    assert_eq!(node.first_child().is_none(), node.last_child().is_none());
    assert_eq!(node.first_attribute().is_none(), node.last_attribute().is_none());

    let mut forward: Vec<*const XmlNode<'_>> = Vec::new();
    let mut child = node.first_child();
    while let Some(c) = child {
        let parent = c.parent().expect("child missing parent back-reference");
        assert!(std::ptr::eq(parent, node));
        forward.push(c as *const _);
        child = c.next_sibling();
    }

    let mut backward: Vec<*const XmlNode<'_>> = Vec::new();
    let mut child = node.last_child();
    while let Some(c) = child {
        backward.push(c as *const _);
        child = c.previous_sibling();
    }
    backward.reverse();
    assert_eq!(forward, backward);

    let mut forward_attrs: Vec<*const u8> = Vec::new();
    let mut attribute = node.first_attribute();
    while let Some(a) = attribute {
        let parent = a.parent().expect("attribute missing parent back-reference");
        assert!(std::ptr::eq(parent, node));
        forward_attrs.push(a.name().as_ptr());
        attribute = a.next_attribute();
    }
    let mut backward_attrs: Vec<*const u8> = Vec::new();
    let mut attribute = node.last_attribute();
    while let Some(a) = attribute {
        backward_attrs.push(a.name().as_ptr());
        attribute = a.previous_attribute();
    }
    backward_attrs.reverse();
    assert_eq!(forward_attrs, backward_attrs);

    let mut child = node.first_child();
    while let Some(c) = child {
        check_structure(c);
        child = c.next_sibling();
    }
}

/// Checks that every non-empty name/value slice aliases the input buffer
/// (the empty sentinel lives in static storage and is exempt).
fn check_aliasing(node: &XmlNode<'_>, buffer_start: usize, buffer_len: usize) {
    let in_buffer = |slice: &[u8]| {
        slice.is_empty() || {
            let addr = slice.as_ptr() as usize;
            addr >= buffer_start && addr + slice.len() <= buffer_start + buffer_len
        }
    };
    assert!(in_buffer(node.name()));
    assert!(in_buffer(node.value()));

    let mut attribute = node.first_attribute();
    while let Some(a) = attribute {
        assert!(in_buffer(a.name()));
        assert!(in_buffer(a.value()));
        attribute = a.next_attribute();
    }
    let mut child = node.first_child();
    while let Some(c) = child {
        check_aliasing(c, buffer_start, buffer_len);
        child = c.next_sibling();
    }
}

/// Compares a parsed element against the model subtree.
fn check_model(node: &XmlNode<'_>, model: &Tree) {
    match model {
        Tree::Text(text) => {
            assert_eq!(node.kind(), NodeKind::Data);
            assert_eq!(node.value(), text.as_bytes());
        }
        Tree::Element { name, attributes, children } => {
            assert_eq!(node.kind(), NodeKind::Element);
            assert_eq!(node.name(), name.as_bytes());

            let mut attribute = node.first_attribute();
            for (key, value) in attributes {
                let a = attribute.expect("missing attribute");
                assert_eq!(a.name(), key.as_bytes());
                assert_eq!(a.value(), value.as_bytes());
                attribute = a.next_attribute();
            }
            assert!(attribute.is_none(), "extra attribute parsed");

            let mut child = node.first_child();
            for model_child in children {
                let c = child.expect("missing child");
                check_model(c, model_child);
                child = c.next_sibling();
            }
            assert!(child.is_none(), "extra child parsed");
        }
    }
}

proptest! {
    /// Parsing a rendered model yields exactly the model back, and the tree
    /// satisfies every list invariant.
    #[test]
    fn prop_structural_consistency(tree in element_strategy()) {
        let mut buffer = Vec::new();
        render(&tree, &mut buffer);
        buffer.push(0);
        let buffer_start = buffer.as_ptr() as usize;
        let buffer_len = buffer.len();

        let pool = MemoryPool::new();
        let doc = XmlDocument::parse(&pool, &mut buffer, ParseFlags::default()).unwrap();

        check_structure(&doc);
        check_aliasing(&doc, buffer_start, buffer_len);
        let root = doc.first_child().expect("document has a root element");
        check_model(root, &tree);
        prop_assert!(root.next_sibling().is_none());
    }

    /// Text free of markup round-trips byte-identically both as data
    /// content and as an attribute value.
    #[test]
    fn prop_entity_idempotence(text in "[a-zA-Z0-9 .,;:_-]{1,32}") {
        prop_assume!(text.bytes().any(|b| b != b' '));

        let pool = MemoryPool::new();

        let mut data_buffer = format!("<t>{text}</t>\0").into_bytes();
        let doc = XmlDocument::parse(&pool, &mut data_buffer, ParseFlags::default()).unwrap();
        let data = doc.first_child().unwrap().first_child().unwrap();
        prop_assert_eq!(data.value(), text.as_bytes());

        let mut attr_buffer = format!("<t a=\"{text}\"/>\0").into_bytes();
        let doc = XmlDocument::parse(&pool, &mut attr_buffer, ParseFlags::default()).unwrap();
        let attribute = doc.first_child().unwrap().first_attribute().unwrap();
        prop_assert_eq!(attribute.value(), text.as_bytes());
    }

    /// Under trim + normalize, inputs that differ only in whitespace run
    /// lengths parse to the same data content.
    #[test]
    fn prop_whitespace_collapse_law(
        words in prop::collection::vec("[a-zA-Z0-9]{1,8}", 1..5),
        runs in prop::collection::vec((1usize..4, 1usize..4), 6),
    ) {
        let build = |pick: fn((usize, usize)) -> usize, ws: u8| -> Vec<u8> {
            let mut out = Vec::new();
            out.extend_from_slice(b"<t>");
            for (i, word) in words.iter().enumerate() {
                let run = runs[i % runs.len()];
                out.extend(std::iter::repeat_n(ws, pick(run)));
                out.extend_from_slice(word.as_bytes());
            }
            let run = runs[words.len() % runs.len()];
            out.extend(std::iter::repeat_n(ws, pick(run)));
            out.extend_from_slice(b"</t>\0");
            out
        };
        let mut first = build(|(a, _)| a, b' ');
        let mut second = build(|(_, b)| b, b'\t');

        let flags = ParseFlags::TRIM_WHITESPACE | ParseFlags::NORMALIZE_WHITESPACE;
        let pool = MemoryPool::new();
        let doc1 = XmlDocument::parse(&pool, &mut first, flags).unwrap();
        let doc2 = XmlDocument::parse(&pool, &mut second, flags).unwrap();

        let value1 = doc1.first_child().unwrap().value();
        let value2 = doc2.first_child().unwrap().value();
        prop_assert_eq!(value1, value2);
        let joined = words.join(" ");
        prop_assert_eq!(value1, joined.as_bytes());
    }

    /// Any mismatched closing tag fails under validation.
    #[test]
    fn prop_closing_tag_validation(
        open in "[a-z]{1,8}",
        close in "[a-z]{1,8}",
        text in "[a-zA-Z0-9]{0,8}",
    ) {
        prop_assume!(open != close);

        let mut buffer = format!("<{open}>{text}</{close}>\0").into_bytes();
        let pool = MemoryPool::new();
        let error = XmlDocument::parse(&pool, &mut buffer, ParseFlags::VALIDATE_CLOSING_TAGS)
            .unwrap_err();
        let is_invalid_closing_tag_name = matches!(error, ParseError::InvalidClosingTagName { .. });
        prop_assert!(is_invalid_closing_tag_name);
    }

    /// The non-destructive preset leaves every input byte untouched.
    #[test]
    fn prop_non_destructive_buffer_identity(tree in element_strategy()) {
        let mut buffer = Vec::new();
        render(&tree, &mut buffer);
        buffer.push(0);
        let original = buffer.clone();

        let pool = MemoryPool::new();
        {
            let doc = XmlDocument::parse(&pool, &mut buffer, ParseFlags::NON_DESTRUCTIVE).unwrap();
            check_structure(&doc);
        }
        prop_assert_eq!(&buffer, &original);
    }

    /// After clear() the pool reports no live allocations and is back on
    /// the inline block.
    #[test]
    fn prop_pool_release(tree in element_strategy()) {
        let mut buffer = Vec::new();
        render(&tree, &mut buffer);
        buffer.push(0);

        let mut pool = MemoryPool::new();
        {
            let doc = XmlDocument::parse(&pool, &mut buffer, ParseFlags::default()).unwrap();
            prop_assert!(doc.first_child().is_some());
        }
        prop_assert!(pool.stats().live_allocations > 0);

        pool.clear();
        let stats = pool.stats();
        prop_assert_eq!(stats.live_allocations, 0);
        prop_assert_eq!(stats.bytes_in_use, 0);
        prop_assert_eq!(stats.static_in_use, 0);
        prop_assert_eq!(stats.dynamic_blocks, 0);
    }
}
