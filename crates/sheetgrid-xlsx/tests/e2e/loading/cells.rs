//! Reading cell values of every stored kind.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use sheetgrid_core::{CellValue, ValueKind};
use sheetgrid_xlsx::Document;

use super::foreign_workbook;
use crate::{archive_text, reopen, write_to_vec};

fn new_year() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

#[test]
fn test_text_cells() {
    let doc = Document::read(foreign_workbook()).unwrap();
    let summary = doc.sheet_by_name("Summary").unwrap();

    assert_eq!(summary.value("A1").unwrap(), CellValue::text("Region"));
    assert_eq!(summary.value("C1").unwrap(), CellValue::text("inline"));
    // _xHHHH_ escapes in inline strings are decoded
    assert_eq!(summary.value("D1").unwrap(), CellValue::text("first\rsecond"));

    let data = doc.sheet_by_name("Data").unwrap();
    // Rich text runs are joined
    assert_eq!(data.value("A1").unwrap(), CellValue::text("North East"));
    // Explicit str cells stay text even when they look numeric
    assert_eq!(data.value("B2").unwrap(), CellValue::text("7"));
    assert_eq!(data.cell("B2").unwrap().unwrap().read_as_number().unwrap(), 7.0);
}

#[test]
fn test_boolean_and_number_cells() {
    let doc = Document::read(foreign_workbook()).unwrap();
    let summary = doc.sheet(1).unwrap();
    assert_eq!(summary.value("B4").unwrap(), CellValue::Boolean(true));
    assert_eq!(summary.cell("B4").unwrap().unwrap().read_as_text().unwrap(), "TRUE");

    let data = doc.sheet(3).unwrap();
    assert_eq!(data.value("A2").unwrap(), CellValue::Number(12.5));
}

#[test]
fn test_date_cells() {
    let doc = Document::read(foreign_workbook()).unwrap();
    let data = doc.sheet_by_name("Data").unwrap();

    let serial = data.cell("B1").unwrap().unwrap();
    assert_eq!(serial.read().unwrap(), CellValue::Number(45292.0));
    assert!(serial.is_date_formatted().unwrap());
    assert_eq!(serial.read_as_date().unwrap(), new_year());

    let iso = data.cell("C1").unwrap().unwrap();
    assert_eq!(iso.read().unwrap(), CellValue::Date(new_year()));
    assert!(!iso.is_date_formatted().unwrap());
}

#[test]
fn test_date_style_added_to_foreign_styles() {
    let mut doc = Document::read(foreign_workbook()).unwrap();
    // cellXfs had no short-date entry; one is appended after the three
    assert_eq!(doc.date_style(), 3);

    let mut sheet = doc.sheet_mut(1).unwrap();
    sheet.set("D6", new_year()).unwrap();
    let cell = sheet.cell("D6").unwrap();
    assert!(cell.is_date_formatted().unwrap());
    assert_eq!(cell.view().style_index(), Some(3));
    assert_eq!(cell.read_as_date().unwrap(), new_year());
}

#[test]
fn test_missing_references_are_inferred() {
    let doc = Document::read(foreign_workbook()).unwrap();
    let data = doc.sheet(3).unwrap();
    let rows: Vec<_> = data.rows().map(|r| r.index()).collect();
    assert_eq!(rows, vec![1, 2]);

    let addresses: Vec<_> = data
        .row(2)
        .unwrap()
        .cells()
        .map(|c| c.address().to_string())
        .collect();
    assert_eq!(addresses, vec!["A2", "B2"]);
}

#[test]
fn test_control_characters_in_text_cells() {
    let mut doc = Document::read(foreign_workbook()).unwrap();
    doc.sheet_mut(1)
        .unwrap()
        .cell("E1")
        .unwrap()
        .write_as("a\u{1}b", ValueKind::Text)
        .unwrap();

    let bytes = write_to_vec(&mut doc);
    let xml = archive_text(&bytes, "xl/worksheets/sheet1.xml");
    assert!(!xml.contains('\u{1}'));
    assert!(xml.contains("a_x0001_b"));

    let reopened = reopen(&mut doc);
    let summary = reopened.sheet(1).unwrap();
    assert_eq!(summary.value("E1").unwrap(), CellValue::text("a\u{1}b"));
    assert_eq!(summary.value("D1").unwrap(), CellValue::text("first\rsecond"));
}
