#![cfg(feature = "batch")]

use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use superfacturas::batch::{self, CancellationToken};
use superfacturas::core::*;

fn invoice(number: &str, iva: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Invoice xmlns="urn:oasis:names:specification:ubl:schema:xsd:Invoice-2"
    xmlns:cac="{cac}" xmlns:cbc="{cbc}">
  <cbc:ID>{number}</cbc:ID>
  <cac:TaxTotal><cac:TaxSubtotal>
    <cbc:TaxAmount>{iva}</cbc:TaxAmount>
    <cac:TaxCategory><cbc:Percent>19.00</cbc:Percent>
      <cac:TaxScheme><cbc:ID>01</cbc:ID><cbc:Name>IVA</cbc:Name></cac:TaxScheme>
    </cac:TaxCategory>
  </cac:TaxSubtotal></cac:TaxTotal>
</Invoice>"#,
        cac = dian_ns::CAC,
        cbc = dian_ns::CBC,
    )
}

/// Five files, the fourth of which is not XML at all.
fn write_batch(dir: &Path) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for i in 1..=5 {
        let path = dir.join(format!("fv-{i:03}.xml"));
        let content = if i == 4 {
            "%PDF-1.4 definitely not xml".to_string()
        } else {
            invoice(&format!("FV-{i}"), &format!("{i}0.00"))
        };
        fs::write(&path, content).unwrap();
        paths.push(path);
    }
    paths
}

#[test]
fn one_bad_file_does_not_abort_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_batch(dir.path());

    let report = batch::parse_batch(&paths, &ParserConfig::default(), &CancellationToken::new())
        .unwrap();

    assert_eq!(report.records.len(), 4);
    assert_eq!(report.failures.len(), 1);
    assert!(report.skipped.is_empty());
    assert!(!report.was_cancelled());
    assert_eq!(report.failures[0].path, paths[3]);

    let numbers: Vec<_> = report.records.iter().map(|r| r.header.number.as_str()).collect();
    assert_eq!(numbers, ["FV-1", "FV-2", "FV-3", "FV-5"]);
    assert_eq!(report.records[2].total_taxes(), dec!(30.00));
}

#[test]
fn overflowing_file_does_not_disturb_siblings() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("fv-good.xml");
    let huge = dir.path().join("fv-huge.xml");
    fs::write(&good, invoice("FV-OK", "19.00")).unwrap();
    // Two IVA 19% subtotals at the decimal maximum under one TaxTotal.
    let max = Decimal::MAX.to_string();
    let subtotal = invoice("", &max);
    let (_, rest) = subtotal.split_once("<cac:TaxSubtotal>").unwrap();
    let (subtotal_body, _) = rest.split_once("</cac:TaxSubtotal>").unwrap();
    let doubled = invoice("FV-MAX", &max).replace(
        "</cac:TaxSubtotal>",
        &format!("</cac:TaxSubtotal><cac:TaxSubtotal>{subtotal_body}</cac:TaxSubtotal>"),
    );
    fs::write(&huge, doubled).unwrap();

    let paths = vec![good, huge];
    let report = batch::parse_batch(&paths, &ParserConfig::default(), &CancellationToken::new())
        .unwrap();

    assert!(report.failures.is_empty());
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.records[0].total_taxes(), dec!(19.00));
    assert_eq!(report.records[1].header.number, "FV-MAX");
    assert_eq!(report.records[1].taxes.len(), 1);
    assert_eq!(report.records[1].total_taxes(), Decimal::MAX);
}

#[test]
fn cancelled_batch_skips_everything_not_started() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_batch(dir.path());

    let token = CancellationToken::new();
    token.cancel();
    let report = batch::parse_batch(&paths, &ParserConfig::default(), &token).unwrap();

    assert!(report.records.is_empty());
    assert!(report.failures.is_empty());
    assert_eq!(report.skipped, paths);
    assert!(report.was_cancelled());
}

#[test]
fn single_worker_gives_same_result() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_batch(dir.path());

    let mut config = ParserConfig::default();
    let parallel = batch::parse_batch(&paths, &config, &CancellationToken::new()).unwrap();
    config.batch.workers = 1;
    let serial = batch::parse_batch(&paths, &config, &CancellationToken::new()).unwrap();

    assert_eq!(parallel.records, serial.records);
    assert_eq!(parallel.failures, serial.failures);
}

#[test]
fn spawned_batch_reports_back() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_batch(dir.path());

    let handle = batch::spawn_batch(paths, ParserConfig::default());
    let report = handle.join().unwrap();
    assert_eq!(report.records.len(), 4);
    assert_eq!(report.failures.len(), 1);
}

#[test]
fn folder_scan_filters_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    write_batch(dir.path());
    fs::write(dir.path().join("FV-UPPER.XML"), invoice("FV-U", "1")).unwrap();
    fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();
    fs::create_dir(dir.path().join("nested.xml")).unwrap();

    let files = batch::collect_input_files(dir.path(), &ParserConfig::default()).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        ["FV-UPPER.XML", "fv-001.xml", "fv-002.xml", "fv-003.xml", "fv-004.xml", "fv-005.xml"]
    );
}

#[test]
fn folder_scan_of_missing_dir_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let err = batch::collect_input_files(&missing, &ParserConfig::default()).unwrap_err();
    assert!(matches!(err, DianError::Io(_)));
}

#[test]
fn batch_columns_are_discoverable() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_batch(dir.path());
    let report = batch::parse_batch(&paths, &ParserConfig::default(), &CancellationToken::new())
        .unwrap();

    assert_eq!(distinct_tax_names(&report.records), ["IVA"]);
    assert!(distinct_sector_keys(&report.records).is_empty());
}
