//! [`XmlTree`] -> XML bytes

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;

use super::{NodeId, NodeKind, XmlTree};
use crate::error::XlsxResult;

pub(super) fn serialize(tree: &XmlTree) -> XlsxResult<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    write_node(&mut writer, tree, tree.root())?;
    Ok(writer.into_inner())
}

fn write_node(writer: &mut Writer<Vec<u8>>, tree: &XmlTree, id: NodeId) -> XlsxResult<()> {
    let node = tree.node(id);
    match &node.kind {
        NodeKind::Text(text) => {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        NodeKind::Element { name, attrs } => {
            let mut start = BytesStart::new(name.as_str());
            for (key, value) in attrs {
                start.push_attribute((key.as_str(), value.as_str()));
            }
            if node.children.is_empty() {
                writer.write_event(Event::Empty(start))?;
            } else {
                writer.write_event(Event::Start(start))?;
                for child in &node.children {
                    write_node(writer, tree, *child)?;
                }
                writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_serialize_escapes_and_nests() {
        let mut tree = XmlTree::new("sst");
        let root = tree.root();
        tree.set_attr(root, "count", "1");
        let si = tree.create_element("si");
        let t = tree.create_element("t");
        tree.set_text(t, "a < b & \"c\"");
        tree.append_child(si, t);
        tree.append_child(root, si);
        let empty = tree.create_element("extLst");
        tree.append_child(root, empty);

        let xml = String::from_utf8(tree.to_xml().unwrap()).unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#));
        assert!(xml.contains(r#"<sst count="1"><si><t>a &lt; b &amp; &quot;c&quot;</t></si><extLst/></sst>"#));
    }

    #[test]
    fn test_reparse_is_stable() {
        let source = br#"<worksheet xmlns="urn:x" xmlns:r="urn:r"><sheetData><row r="2"><c r="A2" t="str"><v>  x  </v></c></row></sheetData></worksheet>"#;
        let tree = XmlTree::parse(source).unwrap();
        let once = tree.to_xml().unwrap();
        let again = XmlTree::parse(&once).unwrap().to_xml().unwrap();
        assert_eq!(once, again);

        let reparsed = XmlTree::parse(&once).unwrap();
        let data = reparsed.first_child(reparsed.root(), "sheetData").unwrap();
        let row = reparsed.first_child(data, "row").unwrap();
        let cell = reparsed.first_child(row, "c").unwrap();
        assert_eq!(reparsed.inner_text(cell), "  x  ");
        assert_eq!(reparsed.attr(reparsed.root(), "xmlns:r"), Some("urn:r"));
    }
}
