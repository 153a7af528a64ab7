//! Typed access to one `<c>` element
//!
//! On disk a cell carries its value as text in `<v>` (or in `<is><t>` for
//! inline strings), and a `t` attribute saying how to read that text:
//!
//! | `t`                 | `<v>` holds                        |
//! |---------------------|------------------------------------|
//! | absent, `n`         | a number                           |
//! | `s`                 | an index into the shared strings   |
//! | `b`                 | `0` or `1`                         |
//! | `str`, `inlineStr`  | text                               |
//! | `e`                 | an error literal such as `#N/A`    |
//! | `d`                 | an ISO-8601 date                   |
//!
//! Dates written by this crate are serial numbers with the document's date
//! style in `s`; a generic [`CellRef::read`] returns them as numbers.

use sheetgrid_core::{
    column_to_letters, date, format_number, parse_number, CellAddress, CellValue, Error, ValueKind,
};

use crate::dom::{NodeId, XmlTree};
use crate::error::{XlsxError, XlsxResult};
use crate::shared_strings::{decode_escapes, encode_escapes, SharedStringPool};
use crate::styles::StyleIndex;

/// Children that hold a cell's value; all are replaced on write
const VALUE_ELEMENTS: &[&str] = &["f", "v", "is"];

/// Read-only view of a cell
#[derive(Debug, Clone, Copy)]
pub struct CellRef<'a> {
    tree: &'a XmlTree,
    node: NodeId,
    row: u32,
    col: u32,
    strings: &'a SharedStringPool,
    styles: &'a StyleIndex,
}

/// Read-write view of a cell
#[derive(Debug)]
pub struct CellMut<'a> {
    tree: &'a mut XmlTree,
    node: NodeId,
    row: u32,
    col: u32,
    strings: &'a mut SharedStringPool,
    styles: &'a StyleIndex,
}

impl<'a> CellRef<'a> {
    pub(crate) fn new(
        tree: &'a XmlTree,
        node: NodeId,
        row: u32,
        col: u32,
        strings: &'a SharedStringPool,
        styles: &'a StyleIndex,
    ) -> Self {
        Self {
            tree,
            node,
            row,
            col,
            strings,
            styles,
        }
    }

    /// Row number (1-based)
    pub fn row(&self) -> u32 {
        self.row
    }

    /// Column number (1-based)
    pub fn column(&self) -> u32 {
        self.col
    }

    /// Column letters (`"B"` for column 2)
    pub fn column_name(&self) -> String {
        column_to_letters(self.col).unwrap_or_default()
    }

    /// Cell address
    pub fn address(&self) -> CellAddress {
        CellAddress {
            row: self.row,
            col: self.col,
        }
    }

    /// The raw `t` attribute
    pub fn type_tag(&self) -> Option<&'a str> {
        self.tree.attr(self.node, "t")
    }

    /// The raw `s` attribute, parsed
    pub fn style_index(&self) -> Option<u32> {
        self.tree.attr(self.node, "s").and_then(|s| s.parse().ok())
    }

    /// Value text as stored, before interpreting the type tag
    ///
    /// `_xHHHH_` escapes are decoded for `str` and `inlineStr` cells.
    /// `None` when the cell holds no value.
    pub fn raw(&self) -> Option<String> {
        if let Some(v) = self.tree.first_child(self.node, "v") {
            let text = self.tree.inner_text(v);
            return Some(match self.type_tag() {
                Some("str") | Some("inlineStr") => decode_escapes(&text),
                _ => text,
            });
        }
        let is = self.tree.first_child(self.node, "is")?;
        let mut text = String::new();
        for child in self.tree.children(is) {
            if self.tree.is(*child, "t") {
                text.push_str(&self.tree.inner_text(*child));
            } else if self.tree.is(*child, "r") {
                for t in self.tree.child_elements(*child, "t") {
                    text.push_str(&self.tree.inner_text(t));
                }
            }
        }
        Some(decode_escapes(&text))
    }

    /// Decode the cell value according to its type tag
    ///
    /// An untagged cell whose text parses as a number reads as a number.
    /// Blank value text in an untagged or `t="n"` cell reads as empty.
    pub fn read(&self) -> XlsxResult<CellValue> {
        let Some(raw) = self.raw() else {
            return Ok(CellValue::Empty);
        };

        let value = match self.type_tag() {
            None | Some("n") if raw.trim().is_empty() => CellValue::Empty,
            None => match parse_number(&raw) {
                Ok(n) => CellValue::Number(n),
                Err(_) => CellValue::Text(raw),
            },
            Some("n") => CellValue::Number(parse_number(&raw)?),
            Some("s") => {
                let index = raw
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| Error::InvalidNumber(raw.clone()))?;
                CellValue::Text(self.strings.resolve(index)?.to_string())
            }
            Some("b") => CellValue::Boolean(raw.trim() != "0"),
            Some("d") => CellValue::Date(date::parse_iso(&raw)?),
            // str, inlineStr, e and anything unknown
            Some(_) => CellValue::Text(raw),
        };
        Ok(value)
    }

    /// Read the value as text
    ///
    /// Shared strings are resolved and booleans read as `TRUE`/`FALSE`;
    /// everything else is returned as stored. An empty cell reads as `""`.
    pub fn read_as_text(&self) -> XlsxResult<String> {
        match self.type_tag() {
            Some("s") | Some("b") => Ok(self.read()?.to_string()),
            _ => Ok(self.raw().unwrap_or_default()),
        }
    }

    /// Read the value as a number
    ///
    /// Textual values accept `,` as the decimal separator.
    pub fn read_as_number(&self) -> XlsxResult<f64> {
        let value = self.read()?;
        if value.is_blank() {
            return Err(Error::InvalidNumber(String::new()).into());
        }
        match value.coerce(ValueKind::Number)? {
            CellValue::Number(n) => Ok(n),
            other => Err(Error::InvalidNumber(other.to_string()).into()),
        }
    }

    /// Read the value as a boolean
    pub fn read_as_boolean(&self) -> XlsxResult<bool> {
        let value = self.read()?;
        if value.is_blank() {
            return Err(Error::InvalidValueType {
                expected: "boolean",
                actual: String::new(),
            }
            .into());
        }
        match value.coerce(ValueKind::Boolean)? {
            CellValue::Boolean(b) => Ok(b),
            other => Err(Error::InvalidValueType {
                expected: "boolean",
                actual: other.to_string(),
            }
            .into()),
        }
    }

    /// Read the value as a date
    ///
    /// The stored text is taken as a serial number whatever the type tag
    /// says, except for `t="d"` cells, which hold ISO-8601 text.
    pub fn read_as_date(&self) -> XlsxResult<chrono::NaiveDateTime> {
        let raw = self.raw().unwrap_or_default();
        if self.type_tag() == Some("d") {
            return Ok(date::parse_iso(&raw)?);
        }
        let serial = parse_number(&raw).map_err(|_| Error::InvalidDate(raw.clone()))?;
        Ok(date::from_serial(serial)?)
    }

    /// Check whether the cell's format displays its number as a date
    pub fn is_date_formatted(&self) -> XlsxResult<bool> {
        match self.tree.attr(self.node, "s") {
            None => Ok(false),
            Some(s) => {
                let index = s.trim().parse::<u32>().map_err(|_| {
                    XlsxError::InvalidFormat(format!("cell style index {:?}", s))
                })?;
                self.styles.is_date_style(index)
            }
        }
    }
}

impl<'a> CellMut<'a> {
    pub(crate) fn new(
        tree: &'a mut XmlTree,
        node: NodeId,
        row: u32,
        col: u32,
        strings: &'a mut SharedStringPool,
        styles: &'a StyleIndex,
    ) -> Self {
        Self {
            tree,
            node,
            row,
            col,
            strings,
            styles,
        }
    }

    /// Read-only view of this cell
    pub fn view(&self) -> CellRef<'_> {
        CellRef::new(
            self.tree,
            self.node,
            self.row,
            self.col,
            self.strings,
            self.styles,
        )
    }

    /// Row number (1-based)
    pub fn row(&self) -> u32 {
        self.row
    }

    /// Column number (1-based)
    pub fn column(&self) -> u32 {
        self.col
    }

    /// Column letters (`"B"` for column 2)
    pub fn column_name(&self) -> String {
        self.view().column_name()
    }

    /// Cell address
    pub fn address(&self) -> CellAddress {
        self.view().address()
    }

    /// See [`CellRef::read`]
    pub fn read(&self) -> XlsxResult<CellValue> {
        self.view().read()
    }

    /// See [`CellRef::read_as_text`]
    pub fn read_as_text(&self) -> XlsxResult<String> {
        self.view().read_as_text()
    }

    /// See [`CellRef::read_as_number`]
    pub fn read_as_number(&self) -> XlsxResult<f64> {
        self.view().read_as_number()
    }

    /// See [`CellRef::read_as_boolean`]
    pub fn read_as_boolean(&self) -> XlsxResult<bool> {
        self.view().read_as_boolean()
    }

    /// See [`CellRef::read_as_date`]
    pub fn read_as_date(&self) -> XlsxResult<chrono::NaiveDateTime> {
        self.view().read_as_date()
    }

    /// See [`CellRef::is_date_formatted`]
    pub fn is_date_formatted(&self) -> XlsxResult<bool> {
        self.view().is_date_formatted()
    }

    /// Write a value, picking the representation from its variant
    ///
    /// Text goes to the shared string table. `Empty` and empty text leave
    /// the cell untouched.
    pub fn write(&mut self, value: impl Into<CellValue>) -> XlsxResult<()> {
        let value = value.into();
        match value.inferred_kind() {
            Some(kind) if !value.is_blank() => self.store(value, kind),
            _ => Ok(()),
        }
    }

    /// Write a value as the given kind, converting it first
    ///
    /// `Empty` and empty text leave the cell untouched.
    pub fn write_as(&mut self, value: impl Into<CellValue>, kind: ValueKind) -> XlsxResult<()> {
        let value = value.into();
        if value.is_blank() {
            return Ok(());
        }
        let value = value.coerce(kind)?;
        self.store(value, kind)
    }

    /// Store an already converted value
    ///
    /// Non-finite numbers are rejected before the tree is touched.
    fn store(&mut self, value: CellValue, kind: ValueKind) -> XlsxResult<()> {
        let (tag, text) = match (kind, &value) {
            (ValueKind::Text, CellValue::Text(s)) => ("str", encode_escapes(s)),
            (ValueKind::SharedText, CellValue::Text(s)) => {
                ("s", self.strings.intern(s).to_string())
            }
            (ValueKind::Number, CellValue::Number(n)) => ("n", finite_number(*n)?),
            (ValueKind::Boolean, CellValue::Boolean(b)) => {
                ("b", (if *b { "1" } else { "0" }).to_string())
            }
            (ValueKind::Date, CellValue::Date(d)) => ("n", finite_number(date::to_serial(*d))?),
            (kind, other) => {
                return Err(Error::InvalidValueType {
                    expected: kind.as_str(),
                    actual: other.to_string(),
                }
                .into())
            }
        };

        for child in self.tree.children(self.node).to_vec() {
            if VALUE_ELEMENTS.iter().any(|name| self.tree.is(child, name)) {
                self.tree.remove(child);
            }
        }

        let v = self.tree.create_element_like(self.node, "v");
        self.tree.set_text(v, &text);
        match self.tree.first_child(self.node, "extLst") {
            Some(ext) => self.tree.insert_before(self.node, v, ext)?,
            None => self.tree.append_child(self.node, v),
        }
        self.tree.set_attr(self.node, "t", tag);

        let date_style = self.styles.date_style().to_string();
        if kind == ValueKind::Date {
            self.tree.set_attr(self.node, "s", &date_style);
        } else if self.tree.attr(self.node, "s") == Some(date_style.as_str()) {
            self.tree.remove_attr(self.node, "s");
        }
        Ok(())
    }
}

/// Format a number for `<v>`, rejecting NaN and infinities
fn finite_number(n: f64) -> XlsxResult<String> {
    if n.is_finite() {
        Ok(format_number(n))
    } else {
        Err(Error::InvalidNumber(n.to_string()).into())
    }
}
