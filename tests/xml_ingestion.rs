use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use data_filter::ingestion::xml::{ingest_xml_from_path, write_xml_to_path, XmlNode};

fn tmp_file(ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("data-filter-xml-{nanos}.{ext}"))
}

#[test]
fn ingest_xml_fixture() {
    let doc = ingest_xml_from_path("tests/fixtures/library.xml").unwrap();
    assert_eq!(doc.root_tag, "library");
    assert_eq!(doc.root.get("name").and_then(XmlNode::as_text), Some("City Library"));
    assert_eq!(doc.root.get("closed"), Some(&XmlNode::Text(None)));

    let Some(XmlNode::Repeated(books)) = doc.root.get("book") else {
        panic!("expected two books");
    };
    let titles: Vec<_> = books
        .iter()
        .filter_map(|b| b.get("title").and_then(XmlNode::as_text))
        .collect();
    assert_eq!(titles, vec!["Dune", "Emma"]);
}

#[test]
fn write_then_reload_preserves_tree() {
    let doc = ingest_xml_from_path("tests/fixtures/library.xml").unwrap();
    let path = tmp_file("xml");
    write_xml_to_path(&path, &doc).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("<?xml"));
    assert_eq!(text.matches("<book>").count(), 2);
    assert_eq!(ingest_xml_from_path(&path).unwrap(), doc);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn missing_file_is_io_error() {
    let err = ingest_xml_from_path("tests/fixtures/does_not_exist.xml").unwrap_err();
    assert!(err.to_string().contains("io error"));
}
