//! Rows (`<row>`) and the per-row cell index

use sheetgrid_core::{
    column_to_letters, letters_to_column, split_address, Axis, Placement, SparseIndex, MAX_COLS,
};

use crate::cell::{CellMut, CellRef};
use crate::dom::{NodeId, XmlTree};
use crate::error::{XlsxError, XlsxResult};
use crate::shared_strings::SharedStringPool;
use crate::styles::StyleIndex;

/// Ordered map from column number to `<c>` node
#[derive(Debug, Clone)]
pub struct CellIndex {
    cells: SparseIndex<NodeId>,
}

impl CellIndex {
    fn new() -> Self {
        Self {
            cells: SparseIndex::new(Axis::Column, MAX_COLS),
        }
    }

    /// Index the `<c>` children of an existing row
    ///
    /// A cell without an `r` attribute is taken to follow the previous one
    /// and gets its `r` filled in. A reference naming another row is
    /// rewritten to this row.
    fn load(tree: &mut XmlTree, row_node: NodeId, row: u32) -> XlsxResult<Self> {
        let mut index = Self::new();
        let nodes: Vec<NodeId> = tree.child_elements(row_node, "c").collect();
        for node in nodes {
            let col = match tree.attr(node, "r").map(split_address) {
                Some(Ok((cell_row, letters))) => {
                    let col = letters_to_column(&letters)?;
                    if cell_row != row {
                        log::warn!(
                            "cell {}{} found in row {}; treating it as {}{}",
                            letters,
                            cell_row,
                            row,
                            letters,
                            row
                        );
                        tree.set_attr(node, "r", &format!("{}{}", letters, row));
                    }
                    col
                }
                Some(Err(e)) => return Err(e.into()),
                None => {
                    let col = index.cells.last_key().map_or(1, |last| last + 1);
                    let letters = column_to_letters(col)?;
                    log::warn!(
                        "cell without reference in row {}; assuming {}{}",
                        row,
                        letters,
                        row
                    );
                    tree.set_attr(node, "r", &format!("{}{}", letters, row));
                    col
                }
            };
            if index.cells.insert_loaded(col, node)?.is_err() {
                return Err(XlsxError::InvalidFormat(format!(
                    "duplicate cell {}{}",
                    column_to_letters(col)?,
                    row
                )));
            }
        }
        Ok(index)
    }

    /// Number of materialized cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the row has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Check if a cell exists for column `col`
    pub fn contains(&self, col: u32) -> bool {
        self.cells.contains(col)
    }

    /// Node of the cell at column `col`, if materialized
    pub fn get(&self, col: u32) -> Option<NodeId> {
        self.cells.get(col).copied()
    }

    /// Column numbers in ascending order
    pub fn columns(&self) -> impl Iterator<Item = u32> + '_ {
        self.cells.keys()
    }

    fn iter(&self) -> impl Iterator<Item = (u32, NodeId)> + '_ {
        self.cells.iter().map(|(col, node)| (*col, *node))
    }

    /// Node of the cell at column `col`, creating it in column order if needed
    fn get_or_create(
        &mut self,
        tree: &mut XmlTree,
        row_node: NodeId,
        row: u32,
        col: u32,
    ) -> XlsxResult<NodeId> {
        self.cells
            .get_or_materialize(
                col,
                |node| *node,
                |placement| -> XlsxResult<NodeId> {
                    let reference = format!("{}{}", column_to_letters(col)?, row);
                    let cell = tree.create_element_like(row_node, "c");
                    tree.set_attr(cell, "r", &reference);
                    match placement {
                        Placement::Before(next) => tree.insert_before(row_node, cell, next)?,
                        Placement::Append => tree.append_child(row_node, cell),
                    }
                    log::trace!("materialized cell {}", reference);
                    Ok(cell)
                },
            )
            .map(|node| *node)
    }

    /// Detach the cell at column `col`; no-op if absent
    fn remove(&mut self, tree: &mut XmlTree, col: u32) {
        if let Some(node) = self.cells.remove(col) {
            tree.remove(node);
        }
    }
}

/// A `<row>` element and its cells
#[derive(Debug, Clone)]
pub struct Row {
    index: u32,
    node: NodeId,
    cells: CellIndex,
}

impl Row {
    pub(crate) fn create(index: u32, node: NodeId) -> Self {
        Self {
            index,
            node,
            cells: CellIndex::new(),
        }
    }

    pub(crate) fn load(tree: &mut XmlTree, index: u32, node: NodeId) -> XlsxResult<Self> {
        let cells = CellIndex::load(tree, node, index)?;
        Ok(Self { index, node, cells })
    }

    /// Row number (1-based)
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The backing `<row>` node
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The row's cell index
    pub fn cells(&self) -> &CellIndex {
        &self.cells
    }
}

/// Read-only view of a row
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    row: &'a Row,
    tree: &'a XmlTree,
    strings: &'a SharedStringPool,
    styles: &'a StyleIndex,
}

impl<'a> RowRef<'a> {
    pub(crate) fn new(
        row: &'a Row,
        tree: &'a XmlTree,
        strings: &'a SharedStringPool,
        styles: &'a StyleIndex,
    ) -> Self {
        Self {
            row,
            tree,
            strings,
            styles,
        }
    }

    /// Row number (1-based)
    pub fn index(&self) -> u32 {
        self.row.index
    }

    /// Number of materialized cells
    pub fn len(&self) -> usize {
        self.row.cells.len()
    }

    /// Check if the row has no cells
    pub fn is_empty(&self) -> bool {
        self.row.cells.is_empty()
    }

    /// Check if a cell exists for column `col`
    pub fn contains(&self, col: u32) -> bool {
        self.row.cells.contains(col)
    }

    /// The cell at column `col`, if materialized
    pub fn cell(&self, col: u32) -> Option<CellRef<'a>> {
        let node = self.row.cells.get(col)?;
        Some(CellRef::new(
            self.tree,
            node,
            self.row.index,
            col,
            self.strings,
            self.styles,
        ))
    }

    /// Materialized cells in column order
    pub fn cells(&self) -> impl Iterator<Item = CellRef<'a>> + 'a {
        let Self {
            row,
            tree,
            strings,
            styles,
        } = *self;
        row.cells
            .iter()
            .map(move |(col, node)| CellRef::new(tree, node, row.index, col, strings, styles))
    }
}

/// Read-write view of a row
#[derive(Debug)]
pub struct RowMut<'a> {
    row: &'a mut Row,
    tree: &'a mut XmlTree,
    strings: &'a mut SharedStringPool,
    styles: &'a StyleIndex,
}

impl<'a> RowMut<'a> {
    pub(crate) fn new(
        row: &'a mut Row,
        tree: &'a mut XmlTree,
        strings: &'a mut SharedStringPool,
        styles: &'a StyleIndex,
    ) -> Self {
        Self {
            row,
            tree,
            strings,
            styles,
        }
    }

    /// Read-only view of this row
    pub fn view(&self) -> RowRef<'_> {
        RowRef::new(self.row, self.tree, self.strings, self.styles)
    }

    /// Row number (1-based)
    pub fn index(&self) -> u32 {
        self.row.index
    }

    /// Number of materialized cells
    pub fn len(&self) -> usize {
        self.row.cells.len()
    }

    /// Check if the row has no cells
    pub fn is_empty(&self) -> bool {
        self.row.cells.is_empty()
    }

    /// Check if a cell exists for column `col`
    pub fn contains(&self, col: u32) -> bool {
        self.row.cells.contains(col)
    }

    /// Check if a cell exists for the column letters `name`
    pub fn contains_name(&self, name: &str) -> bool {
        letters_to_column(name).map_or(false, |col| self.contains(col))
    }

    /// The cell at column `col`, created in column order if needed
    pub fn cell(&mut self, col: u32) -> XlsxResult<CellMut<'_>> {
        cell_in_row(self.row, self.tree, self.strings, self.styles, col)
    }

    /// The cell at column letters `name` (`"B"`), created if needed
    pub fn cell_by_name(&mut self, name: &str) -> XlsxResult<CellMut<'_>> {
        let col = letters_to_column(name)?;
        self.cell(col)
    }

    /// Detach the cell at column `col`; no-op if absent
    pub fn remove(&mut self, col: u32) {
        self.row.cells.remove(self.tree, col);
    }

    /// Detach the cell at column letters `name`; no-op if absent
    pub fn remove_by_name(&mut self, name: &str) -> XlsxResult<()> {
        let col = letters_to_column(name)?;
        self.remove(col);
        Ok(())
    }
}

/// Cell `col` of `row`, materialized on first access
pub(crate) fn cell_in_row<'a>(
    row: &mut Row,
    tree: &'a mut XmlTree,
    strings: &'a mut SharedStringPool,
    styles: &'a StyleIndex,
    col: u32,
) -> XlsxResult<CellMut<'a>> {
    let node = row.cells.get_or_create(tree, row.node, row.index, col)?;
    Ok(CellMut::new(tree, node, row.index, col, strings, styles))
}

/// Detach cell `col` of `row`; no-op if absent
pub(crate) fn remove_from_row(row: &mut Row, tree: &mut XmlTree, col: u32) {
    row.cells.remove(tree, col);
}
