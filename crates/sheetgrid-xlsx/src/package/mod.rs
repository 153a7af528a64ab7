//! OPC package
//!
//! A zip archive of parts tied together by relationship parts and a
//! `[Content_Types].xml` manifest. XML parts are parsed into [`XmlTree`]s
//! on load; anything else is carried through unchanged.
//!
//! Components that edit a part for the whole lifetime of a document take
//! its tree out with [`Package::take_xml`] and hand it back at save time
//! through the `detached` argument of [`Package::write`].

pub mod rels;
pub mod uri;

use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

use crate::dom::XmlTree;
use crate::error::{XlsxError, XlsxResult};

pub use rels::Relationship;

/// Zip member holding the content type manifest
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Relationship type URIs
pub mod rel_type {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const WORKSHEET: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
    pub const SHARED_STRINGS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";
    pub const STYLES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
}

/// Content types of the parts this crate creates
pub mod content_type {
    pub const RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
    pub const XML: &str = "application/xml";
    pub const WORKBOOK: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
    pub const WORKSHEET: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
    pub const SHARED_STRINGS: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml";
    pub const STYLES: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";
}

/// SpreadsheetML main namespace
pub const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Office document relationships namespace (`r:` prefix)
pub const RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

const WORKBOOK_PART: &str = "xl/workbook.xml";

#[derive(Debug)]
enum PartData {
    Xml(XmlTree),
    Binary(Vec<u8>),
    /// Tree currently owned elsewhere
    Detached,
}

#[derive(Debug)]
struct Part {
    name: String,
    data: PartData,
}

/// An in-memory OPC package
#[derive(Debug)]
pub struct Package {
    parts: Vec<Part>,
}

fn is_xml_part(name: &str) -> bool {
    name.ends_with(".xml") || name.ends_with(".rels")
}

impl Package {
    /// A package holding an empty workbook with no sheets
    pub fn new_workbook() -> Self {
        let mut types = XmlTree::new("Types");
        let root = types.root();
        types.set_attr(root, "xmlns", CONTENT_TYPES_NS);
        for (extension, ct) in [
            ("rels", content_type::RELATIONSHIPS),
            ("xml", content_type::XML),
        ] {
            let node = types.create_element("Default");
            types.set_attr(node, "Extension", extension);
            types.set_attr(node, "ContentType", ct);
            types.append_child(root, node);
        }

        let mut package = Self {
            parts: vec![Part {
                name: CONTENT_TYPES_PART.to_string(),
                data: PartData::Xml(types),
            }],
        };

        let mut workbook = XmlTree::new("workbook");
        let root = workbook.root();
        workbook.set_attr(root, "xmlns", SPREADSHEET_NS);
        workbook.set_attr(root, "xmlns:r", RELATIONSHIPS_NS);
        let sheets = workbook.create_element("sheets");
        workbook.append_child(root, sheets);

        package.add_part(
            "",
            rel_type::OFFICE_DOCUMENT,
            WORKBOOK_PART,
            content_type::WORKBOOK,
            workbook,
        );
        package.insert(uri::rels_part(WORKBOOK_PART), PartData::Xml(rels::empty()));
        package
    }

    /// Read a package from a zip stream
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;
        let mut parts = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;

            let data = if is_xml_part(&name) {
                PartData::Xml(XmlTree::parse(&bytes)?)
            } else {
                PartData::Binary(bytes)
            };
            parts.push(Part { name, data });
        }

        let package = Self { parts };
        if !package.contains(CONTENT_TYPES_PART) {
            return Err(XlsxError::InvalidFormat(format!(
                "Missing {}",
                CONTENT_TYPES_PART
            )));
        }
        log::debug!("read package with {} parts", package.parts.len());
        Ok(package)
    }

    /// Read a package from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> XlsxResult<Self> {
        let file = File::open(path)?;
        Self::read(file)
    }

    /// Write the package as a zip stream
    ///
    /// `detached` supplies the trees of parts taken out with
    /// [`take_xml`](Self::take_xml).
    pub fn write<W: Write + Seek>(&self, writer: W, detached: &[(&str, &XmlTree)]) -> XlsxResult<()> {
        let mut zip = zip::ZipWriter::new(writer);
        let options = zip::write::SimpleFileOptions::default();

        // The manifest goes first
        let ordered = self
            .parts
            .iter()
            .filter(|p| p.name == CONTENT_TYPES_PART)
            .chain(self.parts.iter().filter(|p| p.name != CONTENT_TYPES_PART));

        for part in ordered {
            let bytes = match &part.data {
                PartData::Xml(tree) => tree.to_xml()?,
                PartData::Binary(bytes) => bytes.clone(),
                PartData::Detached => detached
                    .iter()
                    .find(|(name, _)| *name == part.name)
                    .ok_or_else(|| XlsxError::MissingPart(part.name.clone()))?
                    .1
                    .to_xml()?,
            };
            zip.start_file(part.name.as_str(), options)?;
            zip.write_all(&bytes)?;
        }

        zip.finish()?;
        Ok(())
    }

    /// Write the package to a file path
    pub fn save<P: AsRef<Path>>(&self, path: P, detached: &[(&str, &XmlTree)]) -> XlsxResult<()> {
        let file = File::create(path)?;
        self.write(file, detached)
    }

    fn part(&self, name: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.name == name)
    }

    fn part_mut(&mut self, name: &str) -> Option<&mut Part> {
        self.parts.iter_mut().find(|p| p.name == name)
    }

    fn insert(&mut self, name: String, data: PartData) {
        match self.part_mut(&name) {
            Some(part) => part.data = data,
            None => self.parts.push(Part { name, data }),
        }
    }

    /// Check whether a part exists
    pub fn contains(&self, name: &str) -> bool {
        self.part(name).is_some()
    }

    /// Names of all parts, in archive order
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }

    /// Tree of an XML part that has not been taken out
    pub fn xml(&self, name: &str) -> Option<&XmlTree> {
        match &self.part(name)?.data {
            PartData::Xml(tree) => Some(tree),
            _ => None,
        }
    }

    /// Mutable tree of an XML part that has not been taken out
    pub fn xml_mut(&mut self, name: &str) -> Option<&mut XmlTree> {
        match &mut self.part_mut(name)?.data {
            PartData::Xml(tree) => Some(tree),
            _ => None,
        }
    }

    /// Take the tree of an XML part out of the package
    pub fn take_xml(&mut self, name: &str) -> XlsxResult<XmlTree> {
        let part = self
            .part_mut(name)
            .ok_or_else(|| XlsxError::MissingPart(name.to_string()))?;
        match std::mem::replace(&mut part.data, PartData::Detached) {
            PartData::Xml(tree) => Ok(tree),
            other => {
                part.data = other;
                Err(XlsxError::InvalidFormat(format!(
                    "{} is not an XML part held by the package",
                    name
                )))
            }
        }
    }

    /// Relationships whose source is `source` (`""` for the package)
    pub fn relationships(&self, source: &str) -> Vec<Relationship> {
        self.xml(&uri::rels_part(source))
            .map(rels::read)
            .unwrap_or_default()
    }

    /// Part targeted by relationship `r_id` of `source`
    pub fn part_for_relationship(&self, source: &str, r_id: &str) -> Option<String> {
        self.relationships(source)
            .into_iter()
            .find(|rel| rel.id == r_id && !rel.external)
            .map(|rel| uri::resolve(source, &rel.target))
    }

    /// Parts targeted from `source` by relationships of type `rel_type`
    pub fn parts_of_type(&self, source: &str, rel_type: &str) -> Vec<String> {
        self.relationships(source)
            .into_iter()
            .filter(|rel| rel.rel_type == rel_type && !rel.external)
            .map(|rel| uri::resolve(source, &rel.target))
            .collect()
    }

    /// Part name of the workbook, via the package's officeDocument relationship
    pub fn main_part(&self) -> XlsxResult<String> {
        self.parts_of_type("", rel_type::OFFICE_DOCUMENT)
            .into_iter()
            .next()
            .ok_or_else(|| XlsxError::MissingPart("officeDocument relationship".into()))
    }

    /// First part name of the form `format(n)` not yet in the package
    pub fn unused_part_name(&self, format: impl Fn(u32) -> String) -> String {
        (1..)
            .map(&format)
            .find(|name| !self.contains(name))
            .unwrap_or_else(|| format(0))
    }

    /// Add a part related from `source`, returning the new relationship id
    ///
    /// Registers a content type override for the part and creates the
    /// source's relationships part if needed.
    pub fn add_part(
        &mut self,
        source: &str,
        rel_type: &str,
        name: &str,
        content_type: &str,
        tree: XmlTree,
    ) -> String {
        self.insert(name.to_string(), PartData::Xml(tree));
        self.set_override(name, content_type);

        let rels_name = uri::rels_part(source);
        if self.xml(&rels_name).is_none() {
            self.insert(rels_name.clone(), PartData::Xml(rels::empty()));
        }
        let target = uri::relative(source, name);
        match self.xml_mut(&rels_name) {
            Some(tree) => rels::add(tree, rel_type, &target),
            None => String::new(),
        }
    }

    /// Part related from `source` by `rel_type`, created if missing
    ///
    /// `make` builds the initial tree of a new part stored as `name`.
    pub fn get_or_create_part_by_type(
        &mut self,
        source: &str,
        rel_type: &str,
        name: &str,
        content_type: &str,
        make: impl FnOnce() -> XmlTree,
    ) -> String {
        if let Some(existing) = self
            .parts_of_type(source, rel_type)
            .into_iter()
            .find(|part| self.contains(part))
        {
            return existing;
        }
        log::debug!("creating part {}", name);
        self.add_part(source, rel_type, name, content_type, make());
        name.to_string()
    }

    fn set_override(&mut self, name: &str, content_type: &str) {
        let part_name = format!("/{}", name);
        let Some(types) = self.xml_mut(CONTENT_TYPES_PART) else {
            return;
        };
        let root = types.root();
        let existing = types
            .child_elements(root, "Override")
            .find(|node| types.attr(*node, "PartName") == Some(part_name.as_str()));
        let node = match existing {
            Some(node) => node,
            None => {
                let node = types.create_element_like(root, "Override");
                types.append_child(root, node);
                node
            }
        };
        types.set_attr(node, "PartName", &part_name);
        types.set_attr(node, "ContentType", content_type);
    }
}
