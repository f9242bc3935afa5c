use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::kind::DocumentKind;

/// One normalized record per parsed DIAN document.
///
/// Built by a single parse call and never mutated afterwards. Consumers may
/// clone and derive from it, but nothing writes back into a parsed record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub header: Header,
    /// Supplier (or employer, for payroll).
    pub issuer: Party,
    /// Customer (or employee, for payroll).
    pub recipient: Party,
    pub payment: PaymentInfo,
    pub totals: Totals,
    /// Document-level taxes. Line-scoped tax totals are never included.
    pub taxes: TaxBreakdown,
    /// Document-level withholdings (`WithholdingTaxTotal`). Not part of [`Self::total_taxes`].
    pub withholdings: TaxBreakdown,
    pub sector_fields: SectorFields,
    pub items: Vec<LineItem>,
}

impl DocumentRecord {
    /// Sum of all document-level tax entries.
    pub fn total_taxes(&self) -> Decimal {
        self.taxes.total()
    }

    /// Classified document kind, derived from the raw root tag.
    pub fn kind(&self) -> DocumentKind {
        DocumentKind::from_root_tag(&self.header.document_type)
    }

    /// Issue date as a calendar date, if it is a valid `YYYY-MM-DD` string.
    pub fn issue_date_parsed(&self) -> Option<NaiveDate> {
        parse_date(&self.header.issue_date)
    }

    /// Due date as a calendar date, if it is a valid `YYYY-MM-DD` string.
    pub fn due_date_parsed(&self) -> Option<NaiveDate> {
        parse_date(&self.header.due_date)
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Document header. Every field is the raw source text, empty when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Local name of the root element, e.g. `Invoice`.
    pub document_type: String,
    /// Human label from the classifier, e.g. `Factura`.
    pub label: String,
    pub ubl_version: String,
    pub customization_id: String,
    pub profile_id: String,
    pub profile_execution_id: String,
    /// Document number (prefix + consecutive).
    pub number: String,
    /// CUFE / CUDE / CUNE.
    pub cufe: String,
    pub issue_date: String,
    pub issue_time: String,
    pub due_date: String,
    /// `InvoiceTypeCode`.
    pub type_code: String,
    pub currency: String,
    pub note: String,
    /// Declared `LineCountNumeric`, as written in the source.
    pub line_count: String,
    /// Base name of the source file.
    pub file_name: String,
}

/// Issuer or recipient identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// NIT or other tax identifier.
    pub tax_id: String,
    pub name: String,
    /// Fiscal regime / responsibilities (`TaxLevelCode`).
    pub tax_level_code: String,
    pub city: String,
    pub region: String,
    pub address: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInfo {
    /// `PaymentMeansCode`.
    pub means_code: String,
    /// `PaymentMeans/ID` (1 = cash, 2 = credit).
    pub channel_id: String,
    pub due_date: String,
}

/// Monetary totals at source precision. Missing or unparsable amounts are zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub line_extension: Decimal,
    pub tax_exclusive: Decimal,
    pub tax_inclusive: Decimal,
    pub allowance_total: Decimal,
    pub charge_total: Decimal,
    pub prepaid: Decimal,
    pub payable: Decimal,
}

/// Composite key of a tax breakdown entry.
///
/// This is the only place a (name, rate) pair becomes a key, so document and
/// line aggregation cannot drift apart.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaxKey {
    pub name: String,
    pub rate: String,
}

impl TaxKey {
    pub fn new(name: impl Into<String>, rate: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rate: rate.into(),
        }
    }
}

/// One tax scheme at one rate, with the accumulated amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxEntry {
    pub name: String,
    /// Rate exactly as written in the source (e.g. `19.00`).
    pub rate: String,
    pub amount: Decimal,
}

/// Tax amounts keyed by (name, rate); repeated keys accumulate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<TaxEntry>", into = "Vec<TaxEntry>")]
pub struct TaxBreakdown(BTreeMap<TaxKey, TaxEntry>);

impl TaxBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` under (`name`, `rate`), creating the entry if needed.
    ///
    /// Sums saturate at [`Decimal::MAX`] / [`Decimal::MIN`]. Returns `false`
    /// when this addition overflowed and the entry was clamped.
    pub fn add(&mut self, name: &str, rate: &str, amount: Decimal) -> bool {
        match self.0.entry(TaxKey::new(name, rate)) {
            Entry::Occupied(mut slot) => {
                let entry = slot.get_mut();
                match entry.amount.checked_add(amount) {
                    Some(sum) => {
                        entry.amount = sum;
                        true
                    }
                    None => {
                        entry.amount = entry.amount.saturating_add(amount);
                        false
                    }
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(TaxEntry {
                    name: name.to_string(),
                    rate: rate.to_string(),
                    amount,
                });
                true
            }
        }
    }

    /// Sum of all entry amounts, saturating on overflow.
    pub fn total(&self) -> Decimal {
        saturating_sum(self.0.values().map(|e| e.amount))
    }

    pub fn get(&self, name: &str, rate: &str) -> Option<&TaxEntry> {
        self.0.get(&TaxKey::new(name, rate))
    }

    /// Entries ordered by (name, rate).
    pub fn entries(&self) -> impl Iterator<Item = &TaxEntry> {
        self.0.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &TaxKey> {
        self.0.keys()
    }

    /// Distinct tax names, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        let mut last: Option<&str> = None;
        self.0.keys().filter_map(move |k| {
            if last == Some(k.name.as_str()) {
                None
            } else {
                last = Some(k.name.as_str());
                last
            }
        })
    }

    /// Sum of the entries for one tax name across all its rates.
    pub fn total_for(&self, name: &str) -> Decimal {
        saturating_sum(self.0.values().filter(|e| e.name == name).map(|e| e.amount))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn saturating_sum(amounts: impl Iterator<Item = Decimal>) -> Decimal {
    amounts.fold(Decimal::ZERO, Decimal::saturating_add)
}

impl From<Vec<TaxEntry>> for TaxBreakdown {
    fn from(entries: Vec<TaxEntry>) -> Self {
        let mut breakdown = Self::new();
        for e in entries {
            breakdown.add(&e.name, &e.rate, e.amount);
        }
        breakdown
    }
}

impl From<TaxBreakdown> for Vec<TaxEntry> {
    fn from(breakdown: TaxBreakdown) -> Self {
        breakdown.0.into_values().collect()
    }
}

/// Open-schema sector annex fields (`Salud_Campo_*`, `Transporte_*`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectorFields(BTreeMap<String, String>);

impl SectorFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field; a later reference with the same key replaces the value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A document line (`InvoiceLine`, `CreditNoteLine`, `DebitNoteLine`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub description: String,
    pub quantity: Decimal,
    /// `unitCode` attribute of the quantity element.
    pub unit_code: String,
    pub unit_price: Decimal,
    /// Line net base (`LineExtensionAmount`).
    pub line_extension: Decimal,
    /// Taxes declared inside this line only.
    pub taxes: TaxBreakdown,
    pub standard_item_code: String,
    pub brand: String,
    pub model: String,
}

impl LineItem {
    /// Sum of this line's own tax entries.
    pub fn tax_amount(&self) -> Decimal {
        self.taxes.total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn breakdown_accumulates_same_key() {
        let mut b = TaxBreakdown::new();
        b.add("IVA", "19", dec!(30));
        b.add("IVA", "19", dec!(20));
        assert_eq!(b.len(), 1);
        assert_eq!(b.get("IVA", "19").unwrap().amount, dec!(50));
        assert_eq!(b.total(), dec!(50));
    }

    #[test]
    fn breakdown_keeps_rate_formatting_distinct() {
        let mut b = TaxBreakdown::new();
        b.add("IVA", "19", dec!(1));
        b.add("IVA", "19.00", dec!(2));
        b.add("INC", "8.00", dec!(4));
        assert_eq!(b.len(), 3);
        assert_eq!(b.names().collect::<Vec<_>>(), vec!["INC", "IVA"]);
        assert_eq!(b.total_for("IVA"), dec!(3));
        assert_eq!(b.total(), dec!(7));
    }

    #[test]
    fn breakdown_saturates_instead_of_overflowing() {
        let mut b = TaxBreakdown::new();
        assert!(b.add("IVA", "19", Decimal::MAX));
        assert!(!b.add("IVA", "19", Decimal::MAX));
        assert_eq!(b.get("IVA", "19").unwrap().amount, Decimal::MAX);

        assert!(b.add("INC", "8", Decimal::MAX));
        assert_eq!(b.total(), Decimal::MAX);
        assert_eq!(b.total_for("INC"), Decimal::MAX);

        assert!(b.add("ICA", "1", Decimal::MIN));
        assert!(!b.add("ICA", "1", Decimal::MIN));
        assert_eq!(b.total_for("ICA"), Decimal::MIN);
    }

    #[test]
    fn breakdown_serializes_as_entry_list() {
        let mut b = TaxBreakdown::new();
        b.add("IVA", "19.00", dec!(190));
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, r#"[{"name":"IVA","rate":"19.00","amount":"190"}]"#);
        let back: TaxBreakdown = serde_json::from_str(&json).unwrap();
        assert_eq!(back, b);
    }

    #[test]
    fn dates_parse_leniently() {
        let mut r = DocumentRecord::default();
        r.header.issue_date = "2024-03-15".into();
        r.header.due_date = "15/04/2024".into();
        assert_eq!(r.issue_date_parsed(), NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(r.due_date_parsed(), None);
    }
}
