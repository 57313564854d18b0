//! XML ingestion and export.
//!
//! An XML document loads into a nested mapping rooted at its root tag:
//!
//! - an element without child elements becomes its trimmed text (or nothing when empty)
//! - an element with children becomes an ordered mapping from child tag to child node
//! - sibling elements sharing a tag collapse into one [`XmlNode::Repeated`] entry
//!
//! Attributes, comments and processing instructions are ignored.

use std::fs;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{IngestionError, IngestionResult};

/// One node of a converted XML tree.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    /// Leaf element text; `None` for `<tag/>` or whitespace-only content.
    Text(Option<String>),
    /// Child tags in first-appearance order.
    Element(Vec<(String, XmlNode)>),
    /// Every occurrence of a tag that appeared more than once under the same parent.
    Repeated(Vec<XmlNode>),
}

impl XmlNode {
    /// Child node for `tag`, if this is an element that has one.
    pub fn get(&self, tag: &str) -> Option<&XmlNode> {
        match self {
            XmlNode::Element(children) => children.iter().find(|(t, _)| t == tag).map(|(_, n)| n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            XmlNode::Text(text) => text.as_deref(),
            _ => None,
        }
    }
}

/// A parsed XML document: root tag plus the converted root element.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    pub root_tag: String,
    pub root: XmlNode,
}

fn xml_error(e: impl std::fmt::Display) -> IngestionError {
    IngestionError::Xml { message: e.to_string() }
}

struct Frame {
    tag: String,
    text: String,
    children: Vec<(String, XmlNode)>,
}

impl Frame {
    fn new(tag: String) -> Self {
        Self {
            tag,
            text: String::new(),
            children: Vec::new(),
        }
    }

    fn finish(self) -> (String, XmlNode) {
        let node = if self.children.is_empty() {
            let text = self.text.trim();
            XmlNode::Text((!text.is_empty()).then(|| text.to_owned()))
        } else {
            XmlNode::Element(self.children)
        };
        (self.tag, node)
    }
}

fn push_child(children: &mut Vec<(String, XmlNode)>, tag: String, node: XmlNode) {
    match children.iter_mut().find(|(t, _)| *t == tag) {
        Some((_, XmlNode::Repeated(items))) => items.push(node),
        Some((_, existing)) => {
            let first = std::mem::replace(existing, XmlNode::Text(None));
            *existing = XmlNode::Repeated(vec![first, node]);
        }
        None => children.push((tag, node)),
    }
}

fn tag_name(start: &BytesStart<'_>) -> IngestionResult<String> {
    String::from_utf8(start.name().as_ref().to_vec()).map_err(xml_error)
}

/// Parse an XML string into an [`XmlDocument`].
pub fn ingest_xml_from_str(input: &str) -> IngestionResult<XmlDocument> {
    let mut reader = Reader::from_str(input);
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, XmlNode)> = None;

    let mut attach = |stack: &mut Vec<Frame>, tag: String, node: XmlNode| -> IngestionResult<()> {
        match stack.last_mut() {
            Some(parent) => push_child(&mut parent.children, tag, node),
            None if root.is_none() => root = Some((tag, node)),
            None => {
                return Err(IngestionError::Xml {
                    message: format!("unexpected second root element <{tag}>"),
                });
            }
        }
        Ok(())
    };

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(start) => stack.push(Frame::new(tag_name(&start)?)),
            Event::Empty(start) => {
                let tag = tag_name(&start)?;
                attach(&mut stack, tag, XmlNode::Text(None))?;
            }
            Event::Text(text) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&text.unescape().map_err(xml_error)?);
                }
            }
            Event::CData(data) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::End(_) => {
                let Some(frame) = stack.pop() else {
                    return Err(IngestionError::Xml {
                        message: "closing tag without an open element".to_string(),
                    });
                };
                let (tag, node) = frame.finish();
                attach(&mut stack, tag, node)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(IngestionError::Xml {
            message: format!("element <{}> is never closed", open.tag),
        });
    }
    let (root_tag, root) = root.ok_or_else(|| IngestionError::Xml {
        message: "document has no root element".to_string(),
    })?;

    log::debug!("parsed xml document with root <{root_tag}>");
    Ok(XmlDocument { root_tag, root })
}

/// Parse an XML file into an [`XmlDocument`].
pub fn ingest_xml_from_path(path: impl AsRef<Path>) -> IngestionResult<XmlDocument> {
    let text = fs::read_to_string(path)?;
    ingest_xml_from_str(&text)
}

fn write_node(writer: &mut Writer<Vec<u8>>, tag: &str, node: &XmlNode) -> IngestionResult<()> {
    match node {
        XmlNode::Text(None) => {
            writer
                .write_event(Event::Empty(BytesStart::new(tag)))
                .map_err(xml_error)?;
        }
        XmlNode::Text(Some(text)) => {
            writer
                .write_event(Event::Start(BytesStart::new(tag)))
                .map_err(xml_error)?;
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(xml_error)?;
            writer
                .write_event(Event::End(BytesEnd::new(tag)))
                .map_err(xml_error)?;
        }
        XmlNode::Element(children) => {
            writer
                .write_event(Event::Start(BytesStart::new(tag)))
                .map_err(xml_error)?;
            for (child_tag, child) in children {
                write_node(writer, child_tag, child)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(tag)))
                .map_err(xml_error)?;
        }
        // Repeated entries are written as siblings sharing the tag.
        XmlNode::Repeated(items) => {
            for item in items {
                write_node(writer, tag, item)?;
            }
        }
    }
    Ok(())
}

/// Render a document as indented XML with a declaration.
pub fn write_xml_to_string(doc: &XmlDocument) -> IngestionResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;
    write_node(&mut writer, &doc.root_tag, &doc.root)?;
    let mut out = String::from_utf8_lossy(&writer.into_inner()).into_owned();
    out.push('\n');
    Ok(out)
}

/// Write a document to `path`, replacing any existing file.
pub fn write_xml_to_path(path: impl AsRef<Path>, doc: &XmlDocument) -> IngestionResult<()> {
    fs::write(path, write_xml_to_string(doc)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBRARY: &str = r#"<?xml version="1.0"?>
<library>
    <name>City</name>
    <book id="1"><title>Dune</title><year>1965</year></book>
    <book id="2"><title>Emma &amp; Co</title><year/></book>
    <note><![CDATA[a < b]]></note>
</library>
"#;

    #[test]
    fn converts_leaves_and_repeated_tags() {
        let doc = ingest_xml_from_str(LIBRARY).unwrap();
        assert_eq!(doc.root_tag, "library");
        assert_eq!(doc.root.get("name").and_then(XmlNode::as_text), Some("City"));
        assert_eq!(doc.root.get("note").and_then(XmlNode::as_text), Some("a < b"));

        let Some(XmlNode::Repeated(books)) = doc.root.get("book") else {
            panic!("expected repeated books");
        };
        assert_eq!(books.len(), 2);
        assert_eq!(books[1].get("title").and_then(XmlNode::as_text), Some("Emma & Co"));
        assert_eq!(books[1].get("year"), Some(&XmlNode::Text(None)));
    }

    #[test]
    fn written_document_parses_back_to_the_same_tree() {
        let doc = ingest_xml_from_str(LIBRARY).unwrap();
        let text = write_xml_to_string(&doc).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert_eq!(ingest_xml_from_str(&text).unwrap(), doc);
    }

    #[test]
    fn malformed_documents_are_errors() {
        assert!(matches!(ingest_xml_from_str(""), Err(IngestionError::Xml { .. })));
        assert!(matches!(ingest_xml_from_str("<a><b></a>"), Err(IngestionError::Xml { .. })));
        assert!(matches!(ingest_xml_from_str("<a>"), Err(IngestionError::Xml { .. })));
    }

    #[test]
    fn leaf_root_keeps_its_text() {
        let doc = ingest_xml_from_str("<greeting> hi </greeting>").unwrap();
        assert_eq!(doc.root, XmlNode::Text(Some("hi".to_string())));
    }
}
