//! Sheet discovery and the sheet directory.

use pretty_assertions::assert_eq;
use sheetgrid_xlsx::{Document, XlsxError};

use super::{foreign_workbook, foreign_workbook_with, WORKBOOK};
use crate::{archive_names, reopen, write_to_vec};

#[test]
fn test_worksheets_in_id_order() {
    let doc = Document::read(foreign_workbook()).unwrap();

    // The chartsheet entry is not a worksheet and is skipped
    assert_eq!(doc.sheet_count(), 2);
    let names: Vec<_> = doc.iter_sheets().map(|s| (s.id(), s.name())).collect();
    assert_eq!(names, vec![(1, "Summary"), (3, "Data")]);

    let data = doc.sheets().by_id(3).unwrap();
    assert_eq!(data.part(), "xl/worksheets/sheet2.xml");
    assert_eq!(data.rel_id(), "rId3");
    assert!(doc.sheet(2).is_none());
}

#[test]
fn test_lookup_by_name_ignores_case() {
    let doc = Document::read(foreign_workbook()).unwrap();
    assert_eq!(doc.sheet_by_name("summary").unwrap().id(), 1);
    assert_eq!(doc.sheet_by_name("DATA").unwrap().id(), 3);
    assert!(doc.sheet_by_name("Chart1").is_none());
}

#[test]
fn test_new_sheet_avoids_existing_ids_and_names() {
    let mut doc = Document::read(foreign_workbook()).unwrap();

    // The skipped chartsheet still owns its id and name
    let sheet = doc.add_sheet("chart1").unwrap();
    assert_eq!(sheet.id(), 4);
    assert_eq!(sheet.name(), "chart11");

    let sheet = doc.add_sheet("").unwrap();
    assert_eq!(sheet.id(), 5);
    assert_eq!(sheet.name(), "Sheet1");

    let reopened = reopen(&mut doc);
    let names: Vec<_> = reopened.iter_sheets().map(|s| s.name().to_string()).collect();
    assert_eq!(names, vec!["Summary", "Data", "chart11", "Sheet1"]);
    assert_eq!(
        reopened.sheets().by_id(4).unwrap().part(),
        "xl/worksheets/sheet3.xml"
    );
}

#[test]
fn test_rename_survives_save() {
    let mut doc = Document::read(foreign_workbook()).unwrap();
    assert!(matches!(
        doc.rename_sheet(1, "chart1"),
        Err(XlsxError::Core(sheetgrid_core::Error::DuplicateSheetName(_)))
    ));
    doc.rename_sheet(1, "Overview").unwrap();

    let reopened = reopen(&mut doc);
    assert_eq!(reopened.sheet(1).unwrap().name(), "Overview");
    assert!(reopened.sheet_by_name("Summary").is_none());
}

#[test]
fn test_new_sheet_id_exhausted() {
    let workbook = WORKBOOK.replace(r#"sheetId="1""#, r#"sheetId="4294967295""#);
    let mut doc = Document::read(foreign_workbook_with(&workbook)).unwrap();
    assert_eq!(doc.sheet_by_name("Summary").unwrap().id(), u32::MAX);

    assert!(matches!(
        doc.add_sheet(""),
        Err(XlsxError::Core(sheetgrid_core::Error::InvalidCoordinate {
            axis: sheetgrid_core::Axis::Sheet,
            ..
        }))
    ));
    // Nothing was added
    assert_eq!(doc.sheet_count(), 2);
    let names = archive_names(&write_to_vec(&mut doc));
    assert!(!names.iter().any(|n| n == "xl/worksheets/sheet3.xml"));
}

#[test]
fn test_suffixed_name_fits_length_limit() {
    let mut doc = Document::read(foreign_workbook()).unwrap();
    let long = "x".repeat(31);
    doc.add_sheet(&long).unwrap();
    let sheet = doc.add_sheet(&long).unwrap();
    assert_eq!(sheet.name(), format!("{}1", "x".repeat(30)));
}
