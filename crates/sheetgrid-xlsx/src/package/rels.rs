//! Relationship parts (`*.rels`)

use crate::dom::XmlTree;

const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// One `<Relationship>` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship id (`rId1`, `rId2`, ...)
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target exactly as written in the part
    pub target: String,
    /// Whether the target lives outside the package
    pub external: bool,
}

/// An empty `<Relationships>` tree
pub fn empty() -> XmlTree {
    let mut tree = XmlTree::new("Relationships");
    let root = tree.root();
    tree.set_attr(root, "xmlns", RELATIONSHIPS_NS);
    tree
}

/// All relationships of a relationships part, in document order
pub fn read(tree: &XmlTree) -> Vec<Relationship> {
    tree.child_elements(tree.root(), "Relationship")
        .filter_map(|node| {
            let id = tree.attr(node, "Id")?;
            let rel_type = tree.attr(node, "Type")?;
            let target = tree.attr(node, "Target")?;
            Some(Relationship {
                id: id.to_string(),
                rel_type: rel_type.to_string(),
                target: target.to_string(),
                external: tree.attr(node, "TargetMode") == Some("External"),
            })
        })
        .collect()
}

/// First `rIdN` not in use, counting up from one past the largest
pub fn next_id(tree: &XmlTree) -> String {
    let max = read(tree)
        .iter()
        .filter_map(|rel| rel.id.strip_prefix("rId")?.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("rId{}", max + 1)
}

/// Append a relationship and return its new id
pub fn add(tree: &mut XmlTree, rel_type: &str, target: &str) -> String {
    let id = next_id(tree);
    let root = tree.root();
    let node = tree.create_element_like(root, "Relationship");
    tree.set_attr(node, "Id", &id);
    tree.set_attr(node, "Type", rel_type);
    tree.set_attr(node, "Target", target);
    tree.append_child(root, node);
    id
}
