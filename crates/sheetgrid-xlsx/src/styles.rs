//! Cell format table (`xl/styles.xml`), as far as dates need it
//!
//! Dates are stored as plain numbers; what makes Excel show them as dates
//! is the cell's `s` attribute pointing at a `cellXfs` entry with a date
//! number format. This module finds (or adds) such an entry and answers
//! whether a given `s` index is date-formatted.

use std::collections::HashMap;

use sheetgrid_core::Error;

use crate::dom::{NodeId, XmlTree};
use crate::error::XlsxResult;

/// Built-in number format "short date" (`mm-dd-yy`)
pub const DATE_NUM_FMT_ID: u32 = 14;

/// Stylesheet for new documents: the default format at 0, short date at 1
const MINIMAL_STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <fonts count="1">
    <font><sz val="11"/><name val="Calibri"/><family val="2"/></font>
  </fonts>
  <fills count="2">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
  </fills>
  <borders count="1">
    <border><left/><right/><top/><bottom/><diagonal/></border>
  </borders>
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>
  <cellXfs count="2">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="14" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>
  </cellXfs>
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>
</styleSheet>"#;

/// `styleSheet` children that must come after `cellXfs`
const AFTER_CELL_XFS: &[&str] = &[
    "cellStyles",
    "dxfs",
    "tableStyles",
    "colors",
    "extLst",
];

/// A fresh minimal stylesheet
pub fn minimal_stylesheet() -> XlsxResult<XmlTree> {
    XmlTree::parse(MINIMAL_STYLES.as_bytes())
}

/// Check whether a built-in number format id is a date or time format
pub fn is_builtin_date_format(id: u32) -> bool {
    matches!(id, 14..=22 | 45..=47)
}

/// Check whether a custom format code displays a date or time
///
/// Quoted literals, `\`-escaped characters and bracketed sections
/// (colors, conditions, locales) are skipped before looking for date
/// and time placeholders.
pub fn is_date_format_code(code: &str) -> bool {
    let mut chars = code.chars();
    let mut found = false;
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                for q in chars.by_ref() {
                    if q == '"' {
                        break;
                    }
                }
            }
            '\\' | '_' | '*' => {
                chars.next();
            }
            '[' => {
                let mut section = String::new();
                for b in chars.by_ref() {
                    if b == ']' {
                        break;
                    }
                    section.push(b);
                }
                // Elapsed time sections ([h], [mm], [ss]) are time formats
                if !section.is_empty()
                    && section
                        .chars()
                        .all(|s| matches!(s.to_ascii_lowercase(), 'h' | 'm' | 's'))
                {
                    found = true;
                }
            }
            c if matches!(c.to_ascii_lowercase(), 'y' | 'm' | 'd' | 'h' | 's') => {
                found = true;
            }
            _ => {}
        }
    }
    found
}

/// Number formats of the `cellXfs` table plus the document's date style
#[derive(Debug, Clone)]
pub struct StyleIndex {
    date_style: u32,
    xf_formats: Vec<u32>,
    custom_formats: HashMap<u32, String>,
}

impl StyleIndex {
    /// Read the format table, appending a short-date `xf` if there is none
    pub fn resolve(tree: &mut XmlTree) -> Self {
        let root = tree.root();
        let cell_xfs = match tree.first_child(root, "cellXfs") {
            Some(node) => node,
            None => insert_cell_xfs(tree, root),
        };

        let mut xf_formats: Vec<u32> = tree
            .child_elements(cell_xfs, "xf")
            .map(|xf| num_fmt_id(tree, xf))
            .collect();

        let date_style = match xf_formats.iter().position(|id| *id == DATE_NUM_FMT_ID) {
            Some(index) => {
                log::debug!("found date style at cellXfs index {}", index);
                index as u32
            }
            None => {
                if xf_formats.is_empty() {
                    append_xf(tree, cell_xfs, 0);
                    xf_formats.push(0);
                }
                append_xf(tree, cell_xfs, DATE_NUM_FMT_ID);
                xf_formats.push(DATE_NUM_FMT_ID);
                tree.set_attr(cell_xfs, "count", &xf_formats.len().to_string());
                log::debug!("added date style at cellXfs index {}", xf_formats.len() - 1);
                (xf_formats.len() - 1) as u32
            }
        };

        let custom_formats = tree
            .first_child(root, "numFmts")
            .map(|fmts| {
                tree.child_elements(fmts, "numFmt")
                    .filter_map(|f| {
                        let id = tree.attr(f, "numFmtId")?.parse().ok()?;
                        let code = tree.attr(f, "formatCode")?;
                        Some((id, code.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            date_style,
            xf_formats,
            custom_formats,
        }
    }

    /// `cellXfs` index of the short-date format
    pub fn date_style(&self) -> u32 {
        self.date_style
    }

    /// Number of `cellXfs` entries
    pub fn len(&self) -> usize {
        self.xf_formats.len()
    }

    /// Check if the table has no entries
    pub fn is_empty(&self) -> bool {
        self.xf_formats.is_empty()
    }

    /// Check whether cell format `index` displays numbers as dates
    pub fn is_date_style(&self, index: u32) -> XlsxResult<bool> {
        let id = *self
            .xf_formats
            .get(index as usize)
            .ok_or(Error::OutOfRangeReference {
                table: "cell format",
                index: index as usize,
                len: self.xf_formats.len(),
            })?;
        Ok(is_builtin_date_format(id)
            || self
                .custom_formats
                .get(&id)
                .map_or(false, |code| is_date_format_code(code)))
    }
}

fn num_fmt_id(tree: &XmlTree, xf: NodeId) -> u32 {
    tree.attr(xf, "numFmtId")
        .and_then(|id| id.parse().ok())
        .unwrap_or(0)
}

fn insert_cell_xfs(tree: &mut XmlTree, root: NodeId) -> NodeId {
    let node = tree.create_element_like(root, "cellXfs");
    let before = tree
        .children(root)
        .iter()
        .copied()
        .find(|child| AFTER_CELL_XFS.iter().any(|name| tree.is(*child, name)));
    if let Some(reference) = before {
        if tree.insert_before(root, node, reference).is_ok() {
            return node;
        }
    }
    tree.append_child(root, node);
    node
}

fn append_xf(tree: &mut XmlTree, cell_xfs: NodeId, num_fmt_id: u32) {
    let xf = tree.create_element_like(cell_xfs, "xf");
    tree.set_attr(xf, "numFmtId", &num_fmt_id.to_string());
    for key in ["fontId", "fillId", "borderId", "xfId"] {
        tree.set_attr(xf, key, "0");
    }
    if num_fmt_id != 0 {
        tree.set_attr(xf, "applyNumberFormat", "1");
    }
    tree.append_child(cell_xfs, xf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_minimal_stylesheet_has_date_at_one() {
        let mut tree = minimal_stylesheet().unwrap();
        let styles = StyleIndex::resolve(&mut tree);
        assert_eq!(styles.date_style(), 1);
        assert_eq!(styles.len(), 2);
        assert!(!styles.is_date_style(0).unwrap());
        assert!(styles.is_date_style(1).unwrap());
    }

    #[test]
    fn test_appends_date_style_when_missing() {
        let mut tree = XmlTree::parse(
            br#"<styleSheet><cellXfs count="2"><xf numFmtId="0"/><xf numFmtId="4"/></cellXfs><cellStyles count="0"/></styleSheet>"#,
        )
        .unwrap();
        let styles = StyleIndex::resolve(&mut tree);
        assert_eq!(styles.date_style(), 2);

        let root = tree.root();
        let cell_xfs = tree.first_child(root, "cellXfs").unwrap();
        assert_eq!(tree.attr(cell_xfs, "count"), Some("3"));
        assert_eq!(tree.child_elements(cell_xfs, "xf").count(), 3);

        // Resolving again finds the appended entry
        let again = StyleIndex::resolve(&mut tree);
        assert_eq!(again.date_style(), 2);
        assert_eq!(again.len(), 3);
    }

    #[test]
    fn test_creates_cell_xfs_in_schema_order() {
        let mut tree = XmlTree::parse(
            br#"<styleSheet><fonts count="0"/><cellStyles count="0"/></styleSheet>"#,
        )
        .unwrap();
        let styles = StyleIndex::resolve(&mut tree);
        assert_eq!(styles.date_style(), 1);

        let root = tree.root();
        let names: Vec<_> = tree
            .children(root)
            .iter()
            .filter_map(|c| tree.name(*c))
            .collect();
        assert_eq!(names, vec!["fonts", "cellXfs", "cellStyles"]);
    }

    #[test]
    fn test_out_of_range_style() {
        let mut tree = minimal_stylesheet().unwrap();
        let styles = StyleIndex::resolve(&mut tree);
        assert!(matches!(
            styles.is_date_style(7),
            Err(crate::XlsxError::Core(Error::OutOfRangeReference { index: 7, len: 2, .. }))
        ));
    }

    #[test]
    fn test_custom_date_formats() {
        let mut tree = XmlTree::parse(
            br#"<styleSheet><numFmts count="2"><numFmt numFmtId="164" formatCode="yyyy\-mm\-dd"/><numFmt numFmtId="165" formatCode="&quot;Day&quot; 0.00"/></numFmts><cellXfs count="3"><xf numFmtId="0"/><xf numFmtId="164"/><xf numFmtId="165"/></cellXfs></styleSheet>"#,
        )
        .unwrap();
        let styles = StyleIndex::resolve(&mut tree);
        assert!(styles.is_date_style(1).unwrap());
        assert!(!styles.is_date_style(2).unwrap());
    }

    #[test]
    fn test_format_codes() {
        assert!(is_builtin_date_format(14));
        assert!(is_builtin_date_format(22));
        assert!(is_builtin_date_format(46));
        assert!(!is_builtin_date_format(4));
        assert!(is_date_format_code("d-mmm-yy"));
        assert!(is_date_format_code("[h]:mm:ss"));
        assert!(!is_date_format_code("[Red]0.00"));
        assert!(!is_date_format_code("#,##0.00 \"days\""));
        assert!(!is_date_format_code("General"));
    }
}
