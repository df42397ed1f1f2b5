//! End-to-end tests over realistic documents: full-profile parsing, DOM
//! mutation after parse, and cloning between trees.

use inxml::{MemoryPool, NodeKind, ParseFlags, XmlAttribute, XmlDocument, XmlNode};

const CONFIG: &[u8] = b"<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
<!DOCTYPE service>\n\
<!-- generated; do not edit by hand -->\n\
<service name=\"ingest\">\n\
  <endpoint host=\"127.0.0.1\" port=\"8080\"/>\n\
  <limits>\n\
    <max-payload>65536</max-payload>\n\
    <timeout unit=\"ms\">250</timeout>\n\
  </limits>\n\
  <motd>say &quot;hello&quot; &amp; smile</motd>\n\
</service>";

fn nul_terminated(text: &[u8]) -> Vec<u8> {
    let mut buffer = text.to_vec();
    buffer.push(0);
    buffer
}

#[test]
fn test_full_profile_configuration_document() {
    let pool = MemoryPool::new();
    let mut buffer = nul_terminated(CONFIG);
    let doc = XmlDocument::parse(&pool, &mut buffer, ParseFlags::FULL).unwrap();

    let declaration = doc.first_child().unwrap();
    assert_eq!(declaration.kind(), NodeKind::Declaration);
    assert_eq!(
        declaration.first_attribute_named(b"encoding", true).unwrap().value(),
        b"utf-8"
    );

    let doctype = declaration.next_sibling().unwrap();
    assert_eq!(doctype.kind(), NodeKind::Doctype);
    assert_eq!(doctype.value(), b"service");

    let comment = doctype.next_sibling().unwrap();
    assert_eq!(comment.kind(), NodeKind::Comment);
    assert_eq!(comment.value(), b" generated; do not edit by hand ");

    let service = doc.first_child_named(b"service", true).unwrap();
    assert_eq!(service.first_attribute().unwrap().value(), b"ingest");

    let endpoint = service.first_child_named(b"endpoint", true).unwrap();
    assert_eq!(endpoint.first_attribute_named(b"port", true).unwrap().value(), b"8080");

    let limits = service.first_child_named(b"limits", true).unwrap();
    let timeout = limits.first_child_named(b"timeout", true).unwrap();
    assert_eq!(timeout.value(), b"250");
    assert_eq!(timeout.first_attribute_named(b"unit", true).unwrap().value(), b"ms");

    let motd = service.first_child_named(b"motd", true).unwrap();
    assert_eq!(motd.value(), b"say \"hello\" & smile");
}

#[test]
fn test_case_insensitive_lookup() {
    let pool = MemoryPool::new();
    let mut buffer = nul_terminated(b"<Service><ENDPOINT Host=\"h\"/></Service>");
    let doc = XmlDocument::parse(&pool, &mut buffer, ParseFlags::default()).unwrap();

    let service = doc.first_child_named(b"service", false).unwrap();
    let endpoint = service.first_child_named(b"endpoint", false).unwrap();
    assert!(service.first_child_named(b"endpoint", true).is_none());
    assert_eq!(endpoint.first_attribute_named(b"host", false).unwrap().value(), b"h");
}

#[test]
fn test_mutate_parsed_tree() {
    let pool = MemoryPool::new();
    let mut buffer = nul_terminated(b"<list><item>a</item><item>b</item></list>");
    let doc = XmlDocument::parse(&pool, &mut buffer, ParseFlags::default()).unwrap();

    let list = doc.first_child().unwrap();

    // Append a node built by hand, with strings copied into the pool.
    let item = XmlNode::alloc_in(&pool, NodeKind::Element);
    item.set_name(pool.alloc_slice_copy(b"item"));
    item.set_value(pool.alloc_slice_copy(b"c"));
    let flag = XmlAttribute::alloc_in(&pool);
    flag.set_name(pool.alloc_slice_copy(b"new"));
    flag.set_value(pool.alloc_slice_copy(b"yes"));
    item.append_attribute(flag);
    list.append_child(item);

    let mut values = Vec::new();
    let mut child = list.first_child();
    while let Some(c) = child {
        values.push(c.value().to_vec());
        child = c.next_sibling();
    }
    assert_eq!(values, [b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);

    // Detach the middle item and re-attach it at the front.
    let b_item = list.first_child().unwrap().next_sibling().unwrap();
    list.remove_child(b_item);
    list.prepend_child(b_item);
    assert_eq!(list.first_child().unwrap().value(), b"b");
    assert_eq!(list.last_child().unwrap().value(), b"c");
}

#[test]
fn test_clone_subtree_between_documents() {
    let pool = MemoryPool::new();
    let mut source_buffer = nul_terminated(b"<src><keep id=\"1\"><leaf/></keep></src>");
    let source = XmlDocument::parse(&pool, &mut source_buffer, ParseFlags::default()).unwrap();

    let mut target_buffer = nul_terminated(b"<dst/>");
    let target = XmlDocument::parse(&pool, &mut target_buffer, ParseFlags::default()).unwrap();

    let keep = source.first_child().unwrap().first_child().unwrap();
    let clone = XmlNode::clone_in(&pool, keep, None);
    target.first_child().unwrap().append_child(clone);

    let adopted = target.first_child().unwrap().first_child().unwrap();
    assert_eq!(adopted.name(), b"keep");
    assert_eq!(adopted.first_attribute().unwrap().value(), b"1");
    assert_eq!(adopted.first_child().unwrap().name(), b"leaf");

    // The clone shares the source buffer's bytes.
    assert!(std::ptr::eq(adopted.name().as_ptr(), keep.name().as_ptr()));
    // And the original is untouched.
    assert!(std::ptr::eq(keep.parent().unwrap(), source.first_child().unwrap()));
}

#[test]
fn test_document_accessors_on_parsed_tree() {
    let pool = MemoryPool::new();
    let mut buffer = nul_terminated(b"<a><b/></a>");
    let doc = XmlDocument::parse(&pool, &mut buffer, ParseFlags::default()).unwrap();

    assert_eq!(doc.kind(), NodeKind::Document);
    assert_eq!(doc.name(), b"");
    assert_eq!(doc.value(), b"");
    assert!(doc.parent().is_none());

    let b = doc.first_child().unwrap().first_child().unwrap();
    assert!(std::ptr::eq(b.document().unwrap(), doc.as_node()));

    let attribute = doc.first_child().unwrap().first_attribute();
    assert!(attribute.is_none());
}
