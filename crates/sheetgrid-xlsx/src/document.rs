//! Spreadsheet document: package, sheets, shared strings and date style

use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};

use crate::error::{XlsxError, XlsxResult};
use crate::package::{content_type, rel_type, uri, Package};
use crate::shared_strings::SharedStringPool;
use crate::sheet::{SheetMut, SheetRef};
use crate::styles::{minimal_stylesheet, StyleIndex};
use crate::workbook::SheetCollection;

/// Options for [`Document::open_with`]
#[derive(Debug, Clone)]
pub struct OpenOptions {
    /// Create an empty document when the file does not exist (default: true)
    pub create_if_missing: bool,
    /// Save to the file on [`Document::close`] and on drop (default: true)
    pub save_on_close: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            save_on_close: true,
        }
    }
}

/// An open spreadsheet document
///
/// Worksheets, the shared string pool and the workbook are edited in
/// memory and written back by [`save`](Self::save), [`save_as`](Self::save_as)
/// or [`close`](Self::close). A document with a path is saved when dropped
/// unless it was closed already or `save_on_close` is off.
///
/// # Example
///
/// ```rust
/// use sheetgrid_xlsx::Document;
///
/// let mut doc = Document::new().unwrap();
/// let mut sheet = doc.add_sheet("").unwrap();
/// sheet.set("B2", "hello").unwrap();
/// sheet.set("A1", 42.0).unwrap();
///
/// let sheet = doc.sheet_by_name("sheet1").unwrap();
/// assert_eq!(sheet.value("B2").unwrap().to_string(), "hello");
/// ```
#[derive(Debug)]
pub struct Document {
    package: Package,
    sheets: SheetCollection,
    strings: SharedStringPool,
    strings_part: Option<String>,
    styles: StyleIndex,
    path: Option<PathBuf>,
    options: OpenOptions,
    closed: bool,
}

impl Document {
    /// An empty in-memory document with no sheets
    pub fn new() -> XlsxResult<Self> {
        log::debug!("creating new document");
        Self::from_package(Package::new_workbook(), None, OpenOptions::default())
    }

    /// An empty document that will be saved to `path`
    ///
    /// Nothing is written until the document is saved or closed.
    pub fn create<P: AsRef<Path>>(path: P) -> XlsxResult<Self> {
        let path = path.as_ref();
        log::debug!("creating document {}", path.display());
        Self::from_package(
            Package::new_workbook(),
            Some(path.to_path_buf()),
            OpenOptions::default(),
        )
    }

    /// Open an existing file
    pub fn open<P: AsRef<Path>>(path: P) -> XlsxResult<Self> {
        Self::open_with(
            path,
            OpenOptions {
                create_if_missing: false,
                ..OpenOptions::default()
            },
        )
    }

    /// Open `path` if it exists, otherwise create a new document there
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> XlsxResult<Self> {
        Self::open_with(path, OpenOptions::default())
    }

    /// Open or create `path` as directed by `options`
    pub fn open_with<P: AsRef<Path>>(path: P, options: OpenOptions) -> XlsxResult<Self> {
        let path = path.as_ref();
        let package = if path.exists() {
            log::debug!("opening document {}", path.display());
            Package::open(path)?
        } else if options.create_if_missing {
            log::debug!("creating document {}", path.display());
            Package::new_workbook()
        } else {
            return Err(XlsxError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )));
        };
        Self::from_package(package, Some(path.to_path_buf()), options)
    }

    /// Load a document from any seekable reader
    ///
    /// The result has no path; write it with [`write`](Self::write) or
    /// [`save_as`](Self::save_as).
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Self> {
        Self::from_package(Package::read(reader)?, None, OpenOptions::default())
    }

    fn from_package(
        mut package: Package,
        path: Option<PathBuf>,
        options: OpenOptions,
    ) -> XlsxResult<Self> {
        let workbook = package.main_part()?;
        let dir = uri::base_dir(&workbook).to_string();
        let part_path = |name: &str| {
            if dir.is_empty() {
                name.to_string()
            } else {
                format!("{}/{}", dir, name)
            }
        };

        let fallback = minimal_stylesheet()?;
        let styles_part = package.get_or_create_part_by_type(
            &workbook,
            rel_type::STYLES,
            &part_path("styles.xml"),
            content_type::STYLES,
            move || fallback,
        );
        let styles = match package.xml_mut(&styles_part) {
            Some(tree) => StyleIndex::resolve(tree),
            None => return Err(XlsxError::MissingPart(styles_part)),
        };

        let strings_part = package
            .parts_of_type(&workbook, rel_type::SHARED_STRINGS)
            .into_iter()
            .find(|part| package.xml(part).is_some());
        let strings = match &strings_part {
            Some(part) => SharedStringPool::from_tree(package.take_xml(part)?),
            None => SharedStringPool::new(),
        };

        let sheets = SheetCollection::load(&mut package)?;
        log::debug!(
            "document ready: {} sheets, {} shared strings, date style {}",
            sheets.len(),
            strings.len(),
            styles.date_style()
        );

        Ok(Self {
            package,
            sheets,
            strings,
            strings_part,
            styles,
            path,
            options,
            closed: false,
        })
    }

    /// File the document is saved to, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Check whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The sheet collection
    pub fn sheets(&self) -> &SheetCollection {
        &self.sheets
    }

    /// Number of sheets
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Read-only views of all sheets, in id order
    pub fn iter_sheets(&self) -> impl Iterator<Item = SheetRef<'_>> {
        let strings = &self.strings;
        let styles = &self.styles;
        self.sheets
            .iter()
            .map(move |sheet| SheetRef::new(sheet, strings, styles))
    }

    /// Sheet with id `id`
    pub fn sheet(&self, id: u32) -> Option<SheetRef<'_>> {
        let sheet = self.sheets.by_id(id)?;
        Some(SheetRef::new(sheet, &self.strings, &self.styles))
    }

    /// First sheet whose name matches `name`, ignoring case
    pub fn sheet_by_name(&self, name: &str) -> Option<SheetRef<'_>> {
        let sheet = self.sheets.by_name(name)?;
        Some(SheetRef::new(sheet, &self.strings, &self.styles))
    }

    /// Mutable view of the sheet with id `id`
    pub fn sheet_mut(&mut self, id: u32) -> Option<SheetMut<'_>> {
        let sheet = self.sheets.by_id_mut(id)?;
        Some(SheetMut::new(sheet, &mut self.strings, &self.styles))
    }

    /// Mutable view of the first sheet whose name matches `name`
    pub fn sheet_by_name_mut(&mut self, name: &str) -> Option<SheetMut<'_>> {
        let id = self.sheets.id_of(name)?;
        self.sheet_mut(id)
    }

    /// Add an empty sheet
    ///
    /// An empty `name` gives the first free `SheetN`; a name already in
    /// use (ignoring case) gets the first free numeric suffix.
    pub fn add_sheet(&mut self, name: &str) -> XlsxResult<SheetMut<'_>> {
        if self.closed {
            return Err(XlsxError::Closed);
        }
        let id = self.sheets.add_new(&mut self.package, name)?;
        self.sheet_mut(id)
            .ok_or_else(|| XlsxError::SheetNotFound(format!("id {}", id)))
    }

    /// Rename the sheet with id `id`
    pub fn rename_sheet(&mut self, id: u32, name: &str) -> XlsxResult<()> {
        self.sheets.rename(id, name)
    }

    /// The shared string pool
    pub fn shared_strings(&self) -> &SharedStringPool {
        &self.strings
    }

    /// Index of `text` in the shared string pool, appending it if new
    pub fn intern_shared_string(&mut self, text: &str) -> usize {
        self.strings.intern(text)
    }

    /// `cellXfs` index used for date cells
    pub fn date_style(&self) -> u32 {
        self.styles.date_style()
    }

    /// Write the document as an xlsx archive
    pub fn write<W: Write + Seek>(&mut self, writer: W) -> XlsxResult<()> {
        self.attach_shared_strings()?;
        let mut detached = self.sheets.parts();
        if let Some(part) = &self.strings_part {
            detached.push((part.as_str(), self.strings.tree()));
        }
        self.package.write(writer, &detached)
    }

    /// Save to the document's path
    pub fn save(&mut self) -> XlsxResult<()> {
        let path = self.path.clone().ok_or(XlsxError::NoPath)?;
        self.save_to(&path)
    }

    /// Save to `path`, which becomes the document's path
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> XlsxResult<()> {
        let path = path.as_ref().to_path_buf();
        self.save_to(&path)?;
        self.path = Some(path);
        Ok(())
    }

    fn save_to(&mut self, path: &Path) -> XlsxResult<()> {
        if self.closed {
            return Err(XlsxError::Closed);
        }
        log::debug!("saving document to {}", path.display());
        let file = std::fs::File::create(path)?;
        self.write(std::io::BufWriter::new(file))
    }

    /// Close the document, saving it first if it has a path and
    /// `save_on_close` is set
    ///
    /// Closing twice is a no-op.
    pub fn close(&mut self) -> XlsxResult<()> {
        if self.closed {
            return Ok(());
        }
        let result = match &self.path {
            Some(_) if self.options.save_on_close => self.save(),
            _ => Ok(()),
        };
        self.closed = true;
        result
    }

    /// Register the shared strings part once there is something to store
    fn attach_shared_strings(&mut self) -> XlsxResult<()> {
        if self.strings_part.is_some() || self.strings.is_empty() {
            return Ok(());
        }
        let workbook = self.sheets.part().to_string();
        let dir = uri::base_dir(&workbook);
        let name = if dir.is_empty() {
            "sharedStrings.xml".to_string()
        } else {
            format!("{}/sharedStrings.xml", dir)
        };
        self.package.add_part(
            &workbook,
            rel_type::SHARED_STRINGS,
            &name,
            content_type::SHARED_STRINGS,
            self.strings.tree().clone(),
        );
        // The pool keeps its own tree; the package copy is only a placeholder
        self.package.take_xml(&name)?;
        log::debug!("added shared strings part {}", name);
        self.strings_part = Some(name);
        Ok(())
    }
}

impl Drop for Document {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("failed to save document on drop: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::SPREADSHEET_NS;
    use pretty_assertions::assert_eq;
    use sheetgrid_core::CellValue;
    use std::io::Cursor;

    fn reopen(doc: &mut Document) -> Document {
        let mut buffer = Cursor::new(Vec::new());
        doc.write(&mut buffer).unwrap();
        buffer.set_position(0);
        Document::read(buffer).unwrap()
    }

    #[test]
    fn test_new_document() {
        let doc = Document::new().unwrap();
        assert_eq!(doc.sheet_count(), 0);
        assert_eq!(doc.date_style(), 1);
        assert!(doc.path().is_none());
        assert!(doc.shared_strings().is_empty());
    }

    #[test]
    fn test_round_trip_in_memory() {
        let mut doc = Document::new().unwrap();
        {
            let mut sheet = doc.add_sheet("").unwrap();
            sheet.set("A1", "text").unwrap();
            sheet.set("B1", 1.5).unwrap();
            sheet.set("C1", true).unwrap();
        }
        doc.add_sheet("Other").unwrap();

        let reopened = reopen(&mut doc);
        assert_eq!(reopened.sheet_count(), 2);
        let sheet = reopened.sheet_by_name("Sheet1").unwrap();
        assert_eq!(sheet.value("A1").unwrap(), CellValue::text("text"));
        assert_eq!(sheet.value("B1").unwrap(), CellValue::Number(1.5));
        assert_eq!(sheet.value("C1").unwrap(), CellValue::Boolean(true));
        assert_eq!(sheet.value("D1").unwrap(), CellValue::Empty);
        assert_eq!(reopened.sheet(2).unwrap().name(), "Other");
    }

    #[test]
    fn test_shared_strings_part_added_on_demand() {
        let mut doc = Document::new().unwrap();
        doc.add_sheet("").unwrap();
        let mut empty = reopen(&mut doc);
        assert!(empty.strings_part.is_none());

        assert_eq!(empty.intern_shared_string("x"), 0);
        assert_eq!(empty.intern_shared_string("y"), 1);
        assert_eq!(empty.intern_shared_string("x"), 0);
        let reopened = reopen(&mut empty);
        assert_eq!(reopened.strings_part.as_deref(), Some("xl/sharedStrings.xml"));
        let strings: Vec<_> = reopened.shared_strings().iter().collect();
        assert_eq!(strings, vec!["x", "y"]);
        assert_eq!(
            reopened.shared_strings().tree().attr(reopened.shared_strings().tree().root(), "xmlns"),
            Some(SPREADSHEET_NS)
        );
    }

    #[test]
    fn test_save_without_path() {
        let mut doc = Document::new().unwrap();
        assert!(matches!(doc.save(), Err(XlsxError::NoPath)));
    }

    #[test]
    fn test_close_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        let mut doc = Document::create(&path).unwrap();
        doc.add_sheet("Data").unwrap();
        doc.close().unwrap();
        assert!(path.exists());
        doc.close().unwrap();
        assert!(doc.is_closed());
        assert!(matches!(doc.add_sheet(""), Err(XlsxError::Closed)));
        assert!(matches!(doc.save(), Err(XlsxError::Closed)));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.xlsx");
        assert!(matches!(Document::open(&path), Err(XlsxError::Io(_))));

        let options = OpenOptions {
            save_on_close: false,
            ..OpenOptions::default()
        };
        let mut doc = Document::open_with(&path, options).unwrap();
        doc.add_sheet("").unwrap();
        doc.close().unwrap();
        assert!(!path.exists());
    }
}
