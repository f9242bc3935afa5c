use std::path::PathBuf;

use superfacturas::batch::{self, CancellationToken};
use superfacturas::core::*;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("tests/fixtures/dian"));
    let config = match args.next() {
        Some(path) => ParserConfig::from_file(&PathBuf::from(path)).unwrap(),
        None => ParserConfig::default(),
    };

    let files = batch::collect_input_files(&dir, &config).unwrap();
    println!("{} archivos XML en {}", files.len(), dir.display());

    let report = batch::parse_batch(&files, &config, &CancellationToken::new()).unwrap();

    let tax_columns = distinct_tax_names(&report.records);
    let line_tax_columns = distinct_line_tax_names(&report.records);
    let sector_columns = distinct_sector_keys(&report.records);
    println!("Impuestos: {}", tax_columns.join(", "));
    println!("Impuestos de línea: {}", line_tax_columns.join(", "));
    println!("Campos sectoriales: {}", sector_columns.join(", "));

    for record in &report.records {
        let taxes: Vec<String> = tax_columns
            .iter()
            .map(|name| record.taxes.total_for(name).to_string())
            .collect();
        println!(
            "{:<12} {:<20} {:<12} {:>14} | {}",
            record.header.label,
            record.header.number,
            record.issuer.tax_id,
            record.totals.payable,
            taxes.join(" | ")
        );
    }

    for failure in &report.failures {
        eprintln!("FALLÓ {failure}");
    }

    if let Some(first) = report.records.first() {
        println!("{}", serde_json::to_string_pretty(first).unwrap());
    }
}
