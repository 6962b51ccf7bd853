//! Runs the real pdftotext backend over generated PDFs.
//!
//! Tests return early when poppler-utils is not installed.

mod common;

use common::{at, create_positioned_pdf};
use pretty_assertions::assert_eq;
use tabella_core::convert_to_xlsx;
use tabella_core::extraction::geometry::first_page_size;
use tabella_core::extraction::pdftotext::PdftotextExtractor;
use tabella_core::extraction::{PageScope, RegionExtractor};
use tabella_core::registry::parse_registry_str;
use tabella_core::registry::schema::Rectangle;

const REGISTRY: &str = r#"{
    "name": "Generated invoices",
    "version": "1",
    "probes": [
        { "label": "HEADER", "region": [90, 0, 110, 200] },
        { "label": "TAX NUMBER", "region": [40, 400, 80, 520] }
    ],
    "suppliers": [
        {
            "supplier_id": "094384144",
            "region": [280, 0, 600, 595],
            "columns": [1, 0, 2, 3],
            "names": { "0": "CODE", "1": "DESC", "2": "QTY", "3": "PRICE" },
            "quantity_column": 2,
            "code_column": 0
        }
    ]
}"#;

fn line(top: i64, cells: [&'static str; 4]) -> Vec<common::Placed<'static>> {
    vec![
        at(40, top, cells[0]),
        at(120, top, cells[1]),
        at(300, top, cells[2]),
        at(400, top, cells[3]),
    ]
}

fn write_invoice(path: &std::path::Path) {
    let mut first = vec![at(420, 60, "094384144"), at(40, 100, "INVOICE")];
    first.extend(line(320, ["1001", "Bolt", "5pcs", "1.50"]));
    first.extend(line(340, ["1002", "Nut", "12pcs", "0.20"]));
    first.extend(line(360, ["1003", "Washer", "7pcs", "0.05"]));

    let mut second = vec![at(40, 100, "INVOICE")];
    second.extend(line(320, ["2001", "Screw", "3pcs", "2.10"]));
    second.extend(line(340, ["2002", "Rivet", "40pcs", "0.15"]));

    create_positioned_pdf(path, &[first, second]).unwrap();
}

#[test]
fn generated_page_size_is_a4() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("invoice.pdf");
    write_invoice(&pdf);

    let size = first_page_size(&pdf).unwrap();
    assert_eq!((size.width, size.height), (595.0, 842.0));
}

#[test]
fn region_grid_keeps_only_words_inside() {
    if !PdftotextExtractor::is_available() {
        eprintln!("pdftotext not installed, skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("invoice.pdf");
    write_invoice(&pdf);

    let extractor = PdftotextExtractor::new();
    let region = Rectangle::new(280.0, 0.0, 600.0, 595.0);

    let grids = extractor.extract_region(&pdf, &region, PageScope::All).unwrap();
    assert_eq!(grids.len(), 2);
    assert_eq!(grids[0].page_number, 1);
    assert_eq!(
        grids[0].rows,
        vec![
            vec!["1001", "Bolt", "5pcs", "1.50"],
            vec!["1002", "Nut", "12pcs", "0.20"],
            vec!["1003", "Washer", "7pcs", "0.05"],
        ]
    );

    let only_second = extractor
        .extract_region(&pdf, &region, PageScope::Only(2))
        .unwrap();
    assert_eq!(only_second.len(), 1);
    assert_eq!(only_second[0].page_number, 2);
    assert_eq!(only_second[0].first_cell(), Some("2001"));
}

#[test]
fn generated_invoice_converts_end_to_end() {
    if !PdftotextExtractor::is_available() {
        eprintln!("pdftotext not installed, skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("invoice.pdf");
    let output = dir.path().join("output.xlsx");
    write_invoice(&pdf);

    let registry = parse_registry_str(REGISTRY).unwrap();
    let extractor = PdftotextExtractor::new();
    let invoice = convert_to_xlsx(&pdf, &output, &extractor, &registry).unwrap();

    assert_eq!(invoice.resolution.probe_label, "TAX NUMBER");
    let table = invoice.table;
    assert_eq!(table.headers, vec!["DESC", "CODE", "QTY", "PRICE"]);
    assert_eq!(table.row_count(), 5);

    let rendered: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect();
    assert_eq!(rendered[0], vec!["Bolt", "1001", "5", "1.50"]);
    assert_eq!(rendered[4], vec!["Rivet", "2002", "40", "0.15"]);
    assert!(output.exists());
}

#[test]
fn column_blank_on_one_page_keeps_its_index() {
    if !PdftotextExtractor::is_available() {
        eprintln!("pdftotext not installed, skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("invoice.pdf");
    let first = line(320, ["1001", "Bolt", "5pcs", "1.50"]);
    let second = vec![at(40, 320, "2001"), at(120, 320, "Screw"), at(400, 320, "2.10")];
    create_positioned_pdf(&pdf, &[first, second]).unwrap();

    let region = Rectangle::new(280.0, 0.0, 600.0, 595.0);
    let grids = PdftotextExtractor::new()
        .extract_region(&pdf, &region, PageScope::All)
        .unwrap();
    assert_eq!(grids[1].rows, vec![vec!["2001", "Screw", "", "2.10"]]);
}
