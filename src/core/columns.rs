//! Key discovery across a batch of records.
//!
//! Presenters build their dynamic columns (one per tax name, one per sector
//! field) from these sets; the record itself has no fixed column schema.

use std::collections::BTreeSet;

use super::types::DocumentRecord;

/// Distinct document-level tax names across `records`, sorted.
pub fn distinct_tax_names<'a>(records: impl IntoIterator<Item = &'a DocumentRecord>) -> Vec<String> {
    collect(
        records
            .into_iter()
            .flat_map(|r| r.taxes.names().map(str::to_string)),
    )
}

/// Distinct line-level tax names across every line of `records`, sorted.
pub fn distinct_line_tax_names<'a>(
    records: impl IntoIterator<Item = &'a DocumentRecord>,
) -> Vec<String> {
    collect(records.into_iter().flat_map(|r| {
        r.items
            .iter()
            .flat_map(|item| item.taxes.names().map(str::to_string))
    }))
}

/// Distinct sector field keys across `records`, sorted.
pub fn distinct_sector_keys<'a>(
    records: impl IntoIterator<Item = &'a DocumentRecord>,
) -> Vec<String> {
    collect(
        records
            .into_iter()
            .flat_map(|r| r.sector_fields.keys().map(str::to_string)),
    )
}

fn collect(names: impl Iterator<Item = String>) -> Vec<String> {
    names.collect::<BTreeSet<_>>().into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LineItem;
    use rust_decimal_macros::dec;

    #[test]
    fn discovers_keys_across_records() {
        let mut a = DocumentRecord::default();
        a.taxes.add("IVA", "19.00", dec!(19));
        a.sector_fields.insert("Transporte_Remesa", "R1");
        let mut line = LineItem::default();
        line.taxes.add("INC", "8.00", dec!(8));
        a.items.push(line);

        let mut b = DocumentRecord::default();
        b.taxes.add("IVA", "5.00", dec!(5));
        b.taxes.add("ICA", "0.966", dec!(1));
        b.sector_fields.insert("Salud_Campo_23", "ABC");

        let records = [a, b];
        assert_eq!(distinct_tax_names(&records), vec!["ICA", "IVA"]);
        assert_eq!(distinct_line_tax_names(&records), vec!["INC"]);
        assert_eq!(
            distinct_sector_keys(&records),
            vec!["Salud_Campo_23", "Transporte_Remesa"]
        );
    }

    #[test]
    fn empty_batch_has_no_columns() {
        let records: Vec<DocumentRecord> = Vec::new();
        assert!(distinct_tax_names(&records).is_empty());
        assert!(distinct_sector_keys(&records).is_empty());
    }
}
