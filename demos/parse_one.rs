use std::path::PathBuf;

use superfacturas::core::*;
use superfacturas::dian;

fn main() {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/dian/fv_invoice.xml"));

    match dian::parse_document(&path, &ParserConfig::default()) {
        Ok(record) => {
            println!("{} {} ({})", record.header.label, record.header.number, record.header.file_name);
            println!("  Emisor:   {} {}", record.issuer.tax_id, record.issuer.name);
            println!("  Receptor: {} {}", record.recipient.tax_id, record.recipient.name);
            println!("  Fecha:    {}", record.header.issue_date);
            for entry in record.taxes.entries() {
                println!("  {} {}%: {}", entry.name, entry.rate, entry.amount);
            }
            println!("  Total impuestos: {}", record.total_taxes());
            println!("  Total a pagar:   {}", record.totals.payable);
            for (key, value) in record.sector_fields.iter() {
                println!("  {key}: {value}");
            }
            for item in &record.items {
                println!(
                    "  #{} {} x{} {} @ {} = {} (+{} imp.)",
                    item.id,
                    item.description,
                    item.quantity,
                    item.unit_code,
                    item.unit_price,
                    item.line_extension,
                    item.tax_amount()
                );
            }
        }
        Err(failure) => {
            eprintln!("Error: {failure}");
            std::process::exit(1);
        }
    }
}
