//! Shared string pool (`xl/sharedStrings.xml`)

use sheetgrid_core::Error;

use crate::dom::{NodeId, XmlTree};
use crate::error::XlsxResult;
use crate::package::SPREADSHEET_NS;

/// Deduplicated table of text values referenced by index from cells
///
/// Entries are only ever appended, so an index handed out once stays
/// valid for the lifetime of the document. The backing `<sst>` tree is
/// kept in step with the in-memory list.
#[derive(Debug, Clone)]
pub struct SharedStringPool {
    tree: XmlTree,
    strings: Vec<String>,
}

impl Default for SharedStringPool {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedStringPool {
    /// An empty pool
    pub fn new() -> Self {
        let mut tree = XmlTree::new("sst");
        let root = tree.root();
        tree.set_attr(root, "xmlns", SPREADSHEET_NS);
        tree.set_attr(root, "count", "0");
        tree.set_attr(root, "uniqueCount", "0");
        Self {
            tree,
            strings: Vec::new(),
        }
    }

    /// Load a pool from an existing `<sst>` tree
    pub fn from_tree(tree: XmlTree) -> Self {
        let strings = tree
            .child_elements(tree.root(), "si")
            .map(|si| item_text(&tree, si))
            .collect();
        Self { tree, strings }
    }

    /// The backing `<sst>` tree
    pub fn tree(&self) -> &XmlTree {
        &self.tree
    }

    /// Number of distinct strings
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the pool is empty
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Strings in index order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(String::as_str)
    }

    /// Look up the string at `index`
    pub fn resolve(&self, index: usize) -> XlsxResult<&str> {
        self.strings.get(index).map(String::as_str).ok_or_else(|| {
            Error::OutOfRangeReference {
                table: "shared string",
                index,
                len: self.strings.len(),
            }
            .into()
        })
    }

    /// Index of `text`, appending it first if it is not in the pool
    pub fn intern(&mut self, text: &str) -> usize {
        if let Some(index) = self.strings.iter().position(|s| s == text) {
            return index;
        }

        let root = self.tree.root();
        let si = self.tree.create_element_like(root, "si");
        let t = self.tree.create_element_like(root, "t");
        if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
            self.tree.set_attr(t, "xml:space", "preserve");
        }
        self.tree.set_text(t, &encode_escapes(text));
        self.tree.append_child(si, t);
        self.tree.append_child(root, si);

        self.strings.push(text.to_string());
        let index = self.strings.len() - 1;
        self.update_counts();
        log::trace!("interned shared string #{}", index);
        index
    }

    fn update_counts(&mut self) {
        let root = self.tree.root();
        let unique = self.strings.len();
        let count = self
            .tree
            .attr(root, "count")
            .and_then(|c| c.parse::<usize>().ok())
            .unwrap_or(0)
            .max(unique);
        self.tree.set_attr(root, "count", &count.to_string());
        self.tree.set_attr(root, "uniqueCount", &unique.to_string());
    }
}

/// Text of one `<si>`: its `<t>`, or the concatenated `<t>` of its runs
///
/// Phonetic runs (`<rPh>`) are not part of the value.
fn item_text(tree: &XmlTree, si: NodeId) -> String {
    let mut text = String::new();
    for child in tree.children(si) {
        if tree.is(*child, "t") {
            text.push_str(&tree.inner_text(*child));
        } else if tree.is(*child, "r") {
            for t in tree.child_elements(*child, "t") {
                text.push_str(&tree.inner_text(t));
            }
        }
    }
    decode_escapes(&text)
}

/// Read a `_xHHHH_` escape starting at byte `at` of `s`
fn escape_at(s: &str, at: usize) -> Option<char> {
    let candidate = s.get(at..at + 7)?;
    let hex = candidate.strip_prefix("_x")?.strip_suffix('_')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

/// Decode the `_xHHHH_` escapes Excel uses for characters XML cannot carry
pub fn decode_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut pos = 0;
    while let Some(offset) = s[pos..].find('_') {
        let at = pos + offset;
        out.push_str(&s[pos..at]);
        match escape_at(s, at) {
            Some(c) => {
                out.push(c);
                pos = at + 7;
            }
            None => {
                out.push('_');
                pos = at + 1;
            }
        }
    }
    out.push_str(&s[pos..]);
    out
}

/// Inverse of [`decode_escapes`]
///
/// Control characters are written as `_xHHHH_`; an underscore that would
/// otherwise start an escape is written as `_x005F_`.
pub fn encode_escapes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (at, c) in s.char_indices() {
        match c {
            '_' if escape_at(s, at).is_some() => out.push_str("_x005F_"),
            '\t' | '\n' | '\r' => out.push(c),
            c if c.is_control() => out.push_str(&format!("_x{:04X}_", c as u32)),
            c => out.push(c),
        }
    }
    out
}
