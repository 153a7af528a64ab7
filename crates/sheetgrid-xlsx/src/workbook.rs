//! The workbook part and its sheet directory

use sheetgrid_core::naming::{next_sheet_id, same_sheet_name, unique_sheet_name, validate_sheet_name};
use sheetgrid_core::{Axis, Error, SparseIndex};

use crate::dom::{local_name, NodeId, XmlTree};
use crate::error::{XlsxError, XlsxResult};
use crate::package::{content_type, rel_type, uri, Package, RELATIONSHIPS_NS};
use crate::sheet::Sheet;

/// `workbook` children that come after `sheets`
const AFTER_SHEETS: &[&str] = &[
    "functionGroups",
    "externalReferences",
    "definedNames",
    "calcPr",
    "oleSize",
    "customWorkbookViews",
    "pivotCaches",
    "smartTagPr",
    "smartTagTypes",
    "webPublishing",
    "fileRecoveryPr",
    "webPublishObjects",
    "extLst",
];

/// All worksheets of a document, ordered by sheet id
///
/// Owns the workbook tree; each `<sheet>` entry in its `<sheets>` element
/// names one worksheet part.
#[derive(Debug)]
pub struct SheetCollection {
    part: String,
    tree: XmlTree,
    sheets_node: NodeId,
    sheets: SparseIndex<Sheet>,
}

impl SheetCollection {
    /// Take the workbook and worksheet trees out of `package`
    ///
    /// Entries whose relationship does not lead to a worksheet part are
    /// left alone and skipped.
    pub(crate) fn load(package: &mut Package) -> XlsxResult<Self> {
        let part = package.main_part()?;
        let mut tree = package.take_xml(&part)?;
        let root = tree.root();
        let sheets_node = match tree.first_child(root, "sheets") {
            Some(node) => node,
            None => insert_sheets(&mut tree, root)?,
        };

        let relationships = package.relationships(&part);
        let mut sheets = SparseIndex::new(Axis::Sheet, u32::MAX);
        let entries: Vec<NodeId> = tree.child_elements(sheets_node, "sheet").collect();

        for entry in entries {
            let name = tree.attr(entry, "name").unwrap_or_default().to_string();
            let id = tree
                .attr(entry, "sheetId")
                .and_then(|id| id.trim().parse::<u32>().ok())
                .ok_or_else(|| {
                    XlsxError::InvalidFormat(format!("sheet {:?} has no valid sheetId", name))
                })?;
            let Some(rel_id) = relationship_attr(&tree, entry) else {
                log::warn!("sheet {:?} has no relationship id; skipping", name);
                continue;
            };

            let Some(rel) = relationships
                .iter()
                .find(|rel| rel.id == rel_id && !rel.external)
            else {
                log::warn!("sheet {:?} refers to missing relationship {}; skipping", name, rel_id);
                continue;
            };
            if rel.rel_type != rel_type::WORKSHEET {
                log::debug!("sheet {:?} is not a worksheet; skipping", name);
                continue;
            }

            let sheet_part = uri::resolve(&part, &rel.target);
            if package.xml(&sheet_part).is_none() {
                log::warn!("sheet {:?} part {} is missing; skipping", name, sheet_part);
                continue;
            }
            let sheet_tree = package.take_xml(&sheet_part)?;
            let sheet = Sheet::load(id, name, rel_id, sheet_part, entry, sheet_tree)?;
            if sheets.insert_loaded(id, sheet)?.is_err() {
                return Err(XlsxError::InvalidFormat(format!("duplicate sheetId {}", id)));
            }
        }

        log::debug!("loaded {} sheets from {}", sheets.len(), part);
        Ok(Self {
            part,
            tree,
            sheets_node,
            sheets,
        })
    }

    /// Part name of the workbook
    pub fn part(&self) -> &str {
        &self.part
    }

    /// The workbook tree
    pub fn tree(&self) -> &XmlTree {
        &self.tree
    }

    /// Number of sheets
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    /// Check if there are no sheets
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Sheets in id order
    pub fn iter(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.values()
    }

    /// Sheet ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.sheets.keys()
    }

    /// Sheet with the given id
    pub fn by_id(&self, id: u32) -> Option<&Sheet> {
        self.sheets.get(id)
    }

    pub(crate) fn by_id_mut(&mut self, id: u32) -> Option<&mut Sheet> {
        self.sheets.get_mut(id)
    }

    /// First sheet (in id order) whose name matches, ignoring case
    pub fn by_name(&self, name: &str) -> Option<&Sheet> {
        self.iter().find(|sheet| same_sheet_name(sheet.name(), name))
    }

    /// Id of the first sheet whose name matches, ignoring case
    pub fn id_of(&self, name: &str) -> Option<u32> {
        self.by_name(name).map(Sheet::id)
    }

    /// Names of all `<sheet>` entries, including skipped ones
    fn directory_names(&self) -> Vec<String> {
        self.tree
            .child_elements(self.sheets_node, "sheet")
            .filter_map(|entry| self.tree.attr(entry, "name"))
            .map(str::to_string)
            .collect()
    }

    /// Add an empty worksheet and return its id
    ///
    /// An empty `name` picks the first free `SheetN`; a taken name gets the
    /// first free numeric suffix.
    pub(crate) fn add_new(&mut self, package: &mut Package, name: &str) -> XlsxResult<u32> {
        let existing = self.directory_names();
        let name = unique_sheet_name(name, existing.iter().map(String::as_str));
        validate_sheet_name(&name)?;

        let id = next_sheet_id(
            self.tree
                .child_elements(self.sheets_node, "sheet")
                .filter_map(|entry| self.tree.attr(entry, "sheetId")?.parse::<u32>().ok()),
        )?;

        let dir = uri::base_dir(&self.part).to_string();
        let sheet_part = package.unused_part_name(|n| {
            if dir.is_empty() {
                format!("worksheets/sheet{}.xml", n)
            } else {
                format!("{}/worksheets/sheet{}.xml", dir, n)
            }
        });
        let rel_id = package.add_part(
            &self.part,
            rel_type::WORKSHEET,
            &sheet_part,
            content_type::WORKSHEET,
            Sheet::new_tree(),
        );
        let sheet_tree = package.take_xml(&sheet_part)?;

        let prefix = self.relationships_prefix();
        let entry = self.tree.create_element_like(self.sheets_node, "sheet");
        self.tree.set_attr(entry, "name", &name);
        self.tree.set_attr(entry, "sheetId", &id.to_string());
        self.tree.set_attr(entry, &format!("{}:id", prefix), &rel_id);
        self.tree.append_child(self.sheets_node, entry);

        log::debug!("added sheet {:?} (id {}) as {}", name, id, sheet_part);
        let sheet = Sheet::load(id, name, rel_id, sheet_part, entry, sheet_tree)?;
        if self.sheets.insert_loaded(id, sheet)?.is_err() {
            return Err(XlsxError::InvalidFormat(format!("duplicate sheetId {}", id)));
        }
        Ok(id)
    }

    /// Rename a sheet
    ///
    /// The new name must be valid and not used by another sheet (ignoring
    /// case). Renaming a sheet to its own name in another case is allowed.
    pub fn rename(&mut self, id: u32, name: &str) -> XlsxResult<()> {
        validate_sheet_name(name)?;
        let entry = self
            .sheets
            .get(id)
            .map(Sheet::entry)
            .ok_or_else(|| XlsxError::SheetNotFound(format!("id {}", id)))?;

        let clash = self
            .tree
            .child_elements(self.sheets_node, "sheet")
            .filter(|other| *other != entry)
            .filter_map(|other| self.tree.attr(other, "name"))
            .any(|other| same_sheet_name(other, name));
        if clash {
            return Err(Error::DuplicateSheetName(name.to_string()).into());
        }

        self.tree.set_attr(entry, "name", name);
        if let Some(sheet) = self.sheets.get_mut(id) {
            sheet.set_name(name.to_string());
        }
        Ok(())
    }

    /// Trees of the workbook and every worksheet, keyed by part name
    pub(crate) fn parts(&self) -> Vec<(&str, &XmlTree)> {
        let mut parts = vec![(self.part.as_str(), &self.tree)];
        parts.extend(self.iter().map(|sheet| (sheet.part(), sheet.tree())));
        parts
    }

    /// Prefix bound to the relationships namespace on the workbook root,
    /// declaring `r` if there is none
    fn relationships_prefix(&mut self) -> String {
        let root = self.tree.root();
        let declared = self
            .tree
            .attrs(root)
            .iter()
            .find(|(key, value)| key.starts_with("xmlns:") && value == RELATIONSHIPS_NS)
            .map(|(key, _)| local_name(key).to_string());
        match declared {
            Some(prefix) => prefix,
            None => {
                self.tree.set_attr(root, "xmlns:r", RELATIONSHIPS_NS);
                "r".to_string()
            }
        }
    }
}

/// The `r:id` attribute of a `<sheet>` entry, whatever its prefix
fn relationship_attr(tree: &XmlTree, entry: NodeId) -> Option<String> {
    tree.attrs(entry)
        .iter()
        .find(|(key, _)| key.contains(':') && local_name(key) == "id")
        .map(|(_, value)| value.clone())
}

fn insert_sheets(tree: &mut XmlTree, root: NodeId) -> XlsxResult<NodeId> {
    let node = tree.create_element_like(root, "sheets");
    let before = tree
        .children(root)
        .iter()
        .copied()
        .find(|child| AFTER_SHEETS.iter().any(|name| tree.is(*child, name)));
    match before {
        Some(reference) => tree.insert_before(root, node, reference)?,
        None => tree.append_child(root, node),
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(sheets: &SheetCollection) -> Vec<&str> {
        sheets.iter().map(Sheet::name).collect()
    }

    #[test]
    fn test_default_names_and_ids() {
        let mut package = Package::new_workbook();
        let mut sheets = SheetCollection::load(&mut package).unwrap();
        assert!(sheets.is_empty());

        assert_eq!(sheets.add_new(&mut package, "").unwrap(), 1);
        assert_eq!(sheets.add_new(&mut package, "").unwrap(), 2);
        assert_eq!(names(&sheets), vec!["Sheet1", "Sheet2"]);
        assert_eq!(sheets.by_id(2).unwrap().part(), "xl/worksheets/sheet2.xml");
        assert_eq!(sheets.by_id(1).unwrap().rel_id(), "rId1");
    }

    #[test]
    fn test_explicit_names_get_suffixes() {
        let mut package = Package::new_workbook();
        let mut sheets = SheetCollection::load(&mut package).unwrap();
        sheets.add_new(&mut package, "Data").unwrap();
        sheets.add_new(&mut package, "data").unwrap();
        sheets.add_new(&mut package, "DATA").unwrap();
        assert_eq!(names(&sheets), vec!["Data", "data1", "DATA2"]);
        assert_eq!(sheets.id_of("DaTa1"), Some(2));
        assert!(sheets.by_name("missing").is_none());
    }

    #[test]
    fn test_invalid_name_is_rejected() {
        let mut package = Package::new_workbook();
        let mut sheets = SheetCollection::load(&mut package).unwrap();
        assert!(matches!(
            sheets.add_new(&mut package, "a/b"),
            Err(XlsxError::Core(Error::InvalidSheetName(_)))
        ));
        assert!(sheets.is_empty());
    }

    #[test]
    fn test_rename() {
        let mut package = Package::new_workbook();
        let mut sheets = SheetCollection::load(&mut package).unwrap();
        let first = sheets.add_new(&mut package, "One").unwrap();
        sheets.add_new(&mut package, "Two").unwrap();

        assert!(matches!(
            sheets.rename(first, "two"),
            Err(XlsxError::Core(Error::DuplicateSheetName(_)))
        ));
        sheets.rename(first, "ONE").unwrap();
        sheets.rename(first, "First").unwrap();
        assert_eq!(names(&sheets), vec!["First", "Two"]);
        assert!(matches!(
            sheets.rename(9, "Nine"),
            Err(XlsxError::SheetNotFound(_))
        ));

        let entry = sheets.by_id(first).unwrap().entry();
        assert_eq!(sheets.tree().attr(entry, "name"), Some("First"));
    }

    #[test]
    fn test_sheet_entry_uses_declared_prefix() {
        let mut package = Package::new_workbook();
        let mut sheets = SheetCollection::load(&mut package).unwrap();
        let id = sheets.add_new(&mut package, "").unwrap();
        let entry = sheets.by_id(id).unwrap().entry();
        assert_eq!(sheets.tree().attr(entry, "r:id"), Some("rId1"));
        assert_eq!(relationship_attr(sheets.tree(), entry), Some("rId1".to_string()));
    }
}
