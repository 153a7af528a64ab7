//! XML bytes -> [`XmlTree`]

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::{local_name, NodeId, NodeKind, XmlTree};
use crate::error::{XlsxError, XlsxResult};

/// Elements whose whitespace-only text is content, not formatting
const TEXT_ELEMENTS: &[&str] = &["t", "v", "f"];

pub(super) fn parse(bytes: &[u8]) -> XlsxResult<XmlTree> {
    let mut reader = Reader::from_reader(bytes);
    reader.trim_text(false);

    let mut buf = Vec::new();
    let mut tree: Option<XmlTree> = None;
    let mut stack: Vec<NodeId> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let node = open_element(&mut tree, &stack, &e)?;
                stack.push(node);
            }
            Event::Empty(e) => {
                open_element(&mut tree, &stack, &e)?;
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Text(e) => {
                if let (Some(tree), Some(&parent)) = (tree.as_mut(), stack.last()) {
                    let text = e.unescape()?;
                    let keep = !text.trim().is_empty()
                        || tree
                            .name(parent)
                            .map_or(false, |n| TEXT_ELEMENTS.contains(&local_name(n)));
                    if keep {
                        let node = tree.create_text(&text);
                        tree.append_child(parent, node);
                    }
                }
            }
            Event::CData(e) => {
                if let (Some(tree), Some(&parent)) = (tree.as_mut(), stack.last()) {
                    let raw = e.into_inner();
                    let text = String::from_utf8_lossy(&raw);
                    let node = tree.create_text(&text);
                    tree.append_child(parent, node);
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes
            // are not carried over
            _ => {}
        }
        buf.clear();
    }

    tree.ok_or_else(|| XlsxError::InvalidFormat("XML part has no root element".into()))
}

fn open_element(
    tree: &mut Option<XmlTree>,
    stack: &[NodeId],
    e: &BytesStart<'_>,
) -> XlsxResult<NodeId> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attrs.push((key, value));
    }

    if tree.is_none() {
        let mut new_tree = XmlTree::new(&name);
        let root = new_tree.root();
        if let NodeKind::Element { attrs: slot, .. } = &mut new_tree.node_mut(root).kind {
            *slot = attrs;
        }
        *tree = Some(new_tree);
        return Ok(root);
    }

    let (Some(tree), Some(&parent)) = (tree.as_mut(), stack.last()) else {
        return Err(XlsxError::InvalidFormat(format!(
            "second root element <{}>",
            name
        )));
    };
    let node = tree.push(NodeKind::Element { name, attrs });
    tree.append_child(parent, node);
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_worksheet_fragment() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <!-- generated -->
    <sheetData>
        <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1"><v>3.5</v></c></row>
    </sheetData>
</worksheet>"#;
        let tree = XmlTree::parse(xml).unwrap();
        let root = tree.root();
        assert_eq!(tree.name(root), Some("worksheet"));
        assert_eq!(
            tree.attr(root, "xmlns"),
            Some("http://schemas.openxmlformats.org/spreadsheetml/2006/main")
        );

        let data = tree.first_child(root, "sheetData").unwrap();
        // Formatting whitespace is dropped
        assert_eq!(tree.children(data).len(), 1);
        let row = tree.first_child(data, "row").unwrap();
        let cells: Vec<_> = tree.child_elements(row, "c").collect();
        assert_eq!(cells.len(), 2);
        assert_eq!(tree.attr(cells[0], "t"), Some("s"));
        assert_eq!(tree.inner_text(cells[1]), "3.5");
    }

    #[test]
    fn test_parse_keeps_significant_whitespace() {
        let xml = br#"<sst><si><t xml:space="preserve">  </t></si><si><t>a &amp; b</t></si></sst>"#;
        let tree = XmlTree::parse(xml).unwrap();
        let items: Vec<_> = tree.child_elements(tree.root(), "si").collect();
        assert_eq!(tree.inner_text(items[0]), "  ");
        assert_eq!(tree.inner_text(items[1]), "a & b");
    }

    #[test]
    fn test_parse_rejects_empty_input() {
        assert!(XmlTree::parse(b"").is_err());
        assert!(XmlTree::parse(b"<a></a><b/>").is_err());
    }
}
