//! Worksheets and the per-sheet row index

use sheetgrid_core::{
    letters_to_column, split_address, Axis, CellValue, Placement, SparseIndex, MAX_COLS, MAX_ROWS,
};

use crate::cell::{CellMut, CellRef};
use crate::dom::{NodeId, XmlTree};
use crate::error::{XlsxError, XlsxResult};
use crate::package::{RELATIONSHIPS_NS, SPREADSHEET_NS};
use crate::row::{cell_in_row, remove_from_row, Row, RowMut, RowRef};
use crate::shared_strings::SharedStringPool;
use crate::styles::StyleIndex;

/// `worksheet` children that come before `sheetData`
const BEFORE_SHEET_DATA: &[&str] = &[
    "sheetPr",
    "dimension",
    "sheetViews",
    "sheetFormatPr",
    "cols",
];

/// Ordered map from row number to [`Row`]
#[derive(Debug, Clone)]
pub struct RowIndex {
    rows: SparseIndex<Row>,
}

impl RowIndex {
    fn new() -> Self {
        Self {
            rows: SparseIndex::new(Axis::Row, MAX_ROWS),
        }
    }

    /// Index the `<row>` children of `<sheetData>`
    ///
    /// A row without an `r` attribute is taken to follow the previous one.
    fn load(tree: &mut XmlTree, sheet_data: NodeId) -> XlsxResult<Self> {
        let mut index = Self::new();
        let nodes: Vec<NodeId> = tree.child_elements(sheet_data, "row").collect();
        for node in nodes {
            let number = match tree.attr(node, "r") {
                Some(r) => r.trim().parse::<u32>().map_err(|_| {
                    XlsxError::InvalidFormat(format!("row reference {:?}", r))
                })?,
                None => {
                    let number = index.rows.last_key().map_or(1, |last| last + 1);
                    log::warn!("row without reference; assuming row {}", number);
                    tree.set_attr(node, "r", &number.to_string());
                    number
                }
            };
            let row = Row::load(tree, number, node)?;
            if index.rows.insert_loaded(number, row)?.is_err() {
                return Err(XlsxError::InvalidFormat(format!(
                    "duplicate row {}",
                    number
                )));
            }
        }
        Ok(index)
    }

    /// Number of materialized rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the sheet has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check if row `number` exists
    pub fn contains(&self, number: u32) -> bool {
        self.rows.contains(number)
    }

    /// Row `number`, if materialized
    pub fn get(&self, number: u32) -> Option<&Row> {
        self.rows.get(number)
    }

    /// Rows in ascending order
    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.values()
    }

    /// Row `number`, creating its `<row>` in row order if needed
    fn get_or_create(
        &mut self,
        tree: &mut XmlTree,
        sheet_data: NodeId,
        number: u32,
    ) -> XlsxResult<&mut Row> {
        self.rows.get_or_materialize(
            number,
            |row| row.node(),
            |placement| -> XlsxResult<Row> {
                let node = tree.create_element_like(sheet_data, "row");
                tree.set_attr(node, "r", &number.to_string());
                match placement {
                    Placement::Before(next) => tree.insert_before(sheet_data, node, next)?,
                    Placement::Append => tree.append_child(sheet_data, node),
                }
                log::trace!("materialized row {}", number);
                Ok(Row::create(number, node))
            },
        )
    }

    fn get_mut(&mut self, number: u32) -> Option<&mut Row> {
        self.rows.get_mut(number)
    }
}

/// One worksheet: its directory entry in the workbook and its own part
#[derive(Debug)]
pub struct Sheet {
    id: u32,
    name: String,
    rel_id: String,
    part: String,
    entry: NodeId,
    tree: XmlTree,
    sheet_data: NodeId,
    rows: RowIndex,
}

impl Sheet {
    /// Tree of a new, empty worksheet part
    pub fn new_tree() -> XmlTree {
        let mut tree = XmlTree::new("worksheet");
        let root = tree.root();
        tree.set_attr(root, "xmlns", SPREADSHEET_NS);
        tree.set_attr(root, "xmlns:r", RELATIONSHIPS_NS);
        let data = tree.create_element("sheetData");
        tree.append_child(root, data);
        tree
    }

    /// Wrap a worksheet tree, indexing its rows and cells
    pub(crate) fn load(
        id: u32,
        name: String,
        rel_id: String,
        part: String,
        entry: NodeId,
        mut tree: XmlTree,
    ) -> XlsxResult<Self> {
        let root = tree.root();
        let sheet_data = match tree.first_child(root, "sheetData") {
            Some(node) => node,
            None => insert_sheet_data(&mut tree, root)?,
        };
        let rows = RowIndex::load(&mut tree, sheet_data)?;
        Ok(Self {
            id,
            name,
            rel_id,
            part,
            entry,
            tree,
            sheet_data,
            rows,
        })
    }

    /// Workbook-wide sheet id
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Relationship id of the worksheet part, from the workbook
    pub fn rel_id(&self) -> &str {
        &self.rel_id
    }

    /// Part name of the worksheet
    pub fn part(&self) -> &str {
        &self.part
    }

    pub(crate) fn entry(&self) -> NodeId {
        self.entry
    }

    /// The worksheet tree
    pub fn tree(&self) -> &XmlTree {
        &self.tree
    }

    /// The row index
    pub fn rows(&self) -> &RowIndex {
        &self.rows
    }
}

fn insert_sheet_data(tree: &mut XmlTree, root: NodeId) -> XlsxResult<NodeId> {
    let node = tree.create_element_like(root, "sheetData");
    let after = tree
        .children(root)
        .iter()
        .copied()
        .find(|child| {
            tree.name(*child).is_some() && !BEFORE_SHEET_DATA.iter().any(|n| tree.is(*child, n))
        });
    match after {
        Some(reference) => tree.insert_before(root, node, reference)?,
        None => tree.append_child(root, node),
    }
    Ok(node)
}

fn parse_address(address: &str) -> XlsxResult<(u32, u32)> {
    let (row, letters) = split_address(address)?;
    Ok((row, letters_to_column(&letters)?))
}

/// Read-only view of a sheet
#[derive(Debug, Clone, Copy)]
pub struct SheetRef<'a> {
    sheet: &'a Sheet,
    strings: &'a SharedStringPool,
    styles: &'a StyleIndex,
}

impl<'a> SheetRef<'a> {
    pub(crate) fn new(
        sheet: &'a Sheet,
        strings: &'a SharedStringPool,
        styles: &'a StyleIndex,
    ) -> Self {
        Self {
            sheet,
            strings,
            styles,
        }
    }

    /// Workbook-wide sheet id
    pub fn id(&self) -> u32 {
        self.sheet.id
    }

    /// Display name
    pub fn name(&self) -> &'a str {
        &self.sheet.name
    }

    /// Number of materialized rows
    pub fn row_count(&self) -> usize {
        self.sheet.rows.len()
    }

    /// Check if row `number` exists
    pub fn contains_row(&self, number: u32) -> bool {
        self.sheet.rows.contains(number)
    }

    /// Row `number`, if materialized
    pub fn row(&self, number: u32) -> Option<RowRef<'a>> {
        let row = self.sheet.rows.get(number)?;
        Some(RowRef::new(row, &self.sheet.tree, self.strings, self.styles))
    }

    /// Materialized rows in ascending order
    pub fn rows(&self) -> impl Iterator<Item = RowRef<'a>> + 'a {
        let Self {
            sheet,
            strings,
            styles,
        } = *self;
        sheet
            .rows
            .iter()
            .map(move |row| RowRef::new(row, &sheet.tree, strings, styles))
    }

    /// The cell at `address` (`"B7"`), if materialized
    pub fn cell(&self, address: &str) -> XlsxResult<Option<CellRef<'a>>> {
        let (row, col) = parse_address(address)?;
        Ok(self.cell_at(row, col))
    }

    /// The cell at (`row`, `col`), if materialized
    pub fn cell_at(&self, row: u32, col: u32) -> Option<CellRef<'a>> {
        self.row(row)?.cell(col)
    }

    /// Value at `address`; [`CellValue::Empty`] when there is no cell
    pub fn value(&self, address: &str) -> XlsxResult<CellValue> {
        match self.cell(address)? {
            Some(cell) => cell.read(),
            None => Ok(CellValue::Empty),
        }
    }
}

/// Read-write view of a sheet
///
/// Getting a cell materializes its row and the cell itself in the
/// worksheet, in ascending order, if they do not exist yet.
#[derive(Debug)]
pub struct SheetMut<'a> {
    sheet: &'a mut Sheet,
    strings: &'a mut SharedStringPool,
    styles: &'a StyleIndex,
}

impl<'a> SheetMut<'a> {
    pub(crate) fn new(
        sheet: &'a mut Sheet,
        strings: &'a mut SharedStringPool,
        styles: &'a StyleIndex,
    ) -> Self {
        Self {
            sheet,
            strings,
            styles,
        }
    }

    /// Read-only view of this sheet
    pub fn view(&self) -> SheetRef<'_> {
        SheetRef::new(self.sheet, self.strings, self.styles)
    }

    /// Workbook-wide sheet id
    pub fn id(&self) -> u32 {
        self.sheet.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.sheet.name
    }

    /// Number of materialized rows
    pub fn row_count(&self) -> usize {
        self.sheet.rows.len()
    }

    /// Check if row `number` exists
    pub fn contains_row(&self, number: u32) -> bool {
        self.sheet.rows.contains(number)
    }

    /// Row `number`, created in row order if needed
    pub fn row(&mut self, number: u32) -> XlsxResult<RowMut<'_>> {
        let sheet = &mut *self.sheet;
        let row = sheet
            .rows
            .get_or_create(&mut sheet.tree, sheet.sheet_data, number)?;
        Ok(RowMut::new(row, &mut sheet.tree, self.strings, self.styles))
    }

    /// The cell at `address` (`"B7"`), created if needed
    pub fn cell(&mut self, address: &str) -> XlsxResult<CellMut<'_>> {
        let (row, col) = parse_address(address)?;
        self.cell_at(row, col)
    }

    /// The cell at (`row`, `col`), created if needed
    pub fn cell_at(&mut self, row: u32, col: u32) -> XlsxResult<CellMut<'_>> {
        // Checked up front so a bad column never materializes its row
        if col == 0 || col > MAX_COLS {
            return Err(sheetgrid_core::Error::invalid_coordinate(Axis::Column, col).into());
        }
        let sheet = &mut *self.sheet;
        let row = sheet
            .rows
            .get_or_create(&mut sheet.tree, sheet.sheet_data, row)?;
        cell_in_row(row, &mut sheet.tree, self.strings, self.styles, col)
    }

    /// Detach the cell at `address`; no-op if it does not exist
    pub fn remove_cell(&mut self, address: &str) -> XlsxResult<()> {
        let (row, col) = parse_address(address)?;
        self.remove_cell_at(row, col);
        Ok(())
    }

    /// Detach the cell at (`row`, `col`); no-op if it does not exist
    pub fn remove_cell_at(&mut self, row: u32, col: u32) {
        let sheet = &mut *self.sheet;
        if let Some(row) = sheet.rows.get_mut(row) {
            remove_from_row(row, &mut sheet.tree, col);
        }
    }

    /// Write `value` at `address`; see [`CellMut::write`]
    pub fn set(&mut self, address: &str, value: impl Into<CellValue>) -> XlsxResult<()> {
        self.cell(address)?.write(value)
    }

    /// Value at `address`; [`CellValue::Empty`] when there is no cell
    pub fn value(&self, address: &str) -> XlsxResult<CellValue> {
        self.view().value(address)
    }
}
