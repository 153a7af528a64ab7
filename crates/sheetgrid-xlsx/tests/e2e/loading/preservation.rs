//! Edits keep the rest of the package as it was.

use pretty_assertions::assert_eq;
use sheetgrid_core::CellValue;
use sheetgrid_xlsx::Document;

use super::foreign_workbook;
use crate::{archive_names, archive_text, write_to_vec};

#[test]
fn test_unrelated_parts_are_kept() {
    let mut doc = Document::read(foreign_workbook()).unwrap();
    doc.sheet_mut(1).unwrap().set("A2", "new").unwrap();
    let bytes = write_to_vec(&mut doc);

    let names = archive_names(&bytes);
    assert_eq!(names[0], "[Content_Types].xml");
    for part in [
        "docProps/core.xml",
        "xl/chartsheets/sheet1.xml",
        "xl/styles.xml",
        "xl/sharedStrings.xml",
    ] {
        assert!(names.iter().any(|n| n == part), "{} missing", part);
    }
    assert!(archive_text(&bytes, "docProps/core.xml").contains("someone"));
    assert!(archive_text(&bytes, "xl/workbook.xml").contains(r#"calcId="191029""#));
}

#[test]
fn test_rows_inserted_between_existing_rows() {
    let mut doc = Document::read(foreign_workbook()).unwrap();
    {
        let mut summary = doc.sheet_mut(1).unwrap();
        summary.set("A3", 3.0).unwrap();
        summary.set("A2", 2.0).unwrap();
        summary.set("B1", "between").unwrap();
        summary.set("A9", 9.0).unwrap();
    }
    let bytes = write_to_vec(&mut doc);
    let xml = archive_text(&bytes, "xl/worksheets/sheet1.xml");

    let order: Vec<_> = ["r=\"1\"", "r=\"2\"", "r=\"3\"", "r=\"4\"", "r=\"9\""]
        .iter()
        .map(|r| xml.find(&format!("<row {}", r)).unwrap())
        .collect();
    let mut sorted = order.clone();
    sorted.sort();
    assert_eq!(order, sorted);

    let a1 = xml.find("r=\"A1\"").unwrap();
    let b1 = xml.find("r=\"B1\"").unwrap();
    let c1 = xml.find("r=\"C1\"").unwrap();
    assert!(a1 < b1 && b1 < c1);

    let reopened = Document::read(std::io::Cursor::new(bytes)).unwrap();
    let summary = reopened.sheet(1).unwrap();
    assert_eq!(summary.value("B1").unwrap(), CellValue::text("between"));
    assert_eq!(summary.value("A2").unwrap(), CellValue::Number(2.0));
}

#[test]
fn test_shared_strings_are_appended() {
    let mut doc = Document::read(foreign_workbook()).unwrap();
    doc.sheet_mut(3).unwrap().set("D1", "Region").unwrap();
    doc.sheet_mut(3).unwrap().set("E1", "West").unwrap();

    assert_eq!(doc.shared_strings().len(), 3);
    let data = doc.sheet(3).unwrap();
    assert_eq!(data.cell("D1").unwrap().unwrap().raw().as_deref(), Some("0"));
    assert_eq!(data.cell("E1").unwrap().unwrap().raw().as_deref(), Some("2"));

    let bytes = write_to_vec(&mut doc);
    let sst = archive_text(&bytes, "xl/sharedStrings.xml");
    assert!(sst.contains(r#"uniqueCount="3""#));
    // Existing rich text is not rewritten
    assert!(sst.contains("<rPr><b/></rPr>"));
}
