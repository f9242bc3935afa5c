//! Property-based tests for tax aggregation and parse determinism.
//!
//! Run with: `cargo test --test proptest_tests`

#![cfg(feature = "parser")]

use std::collections::BTreeMap;

use proptest::prelude::*;
use rust_decimal::Decimal;
use superfacturas::core::*;
use superfacturas::dian;

// ── XML assembly ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Sub {
    name: &'static str,
    rate: &'static str,
    amount: Decimal,
}

fn subtotal_xml(s: &Sub) -> String {
    format!(
        "<cac:TaxSubtotal><cbc:TaxAmount>{}</cbc:TaxAmount><cac:TaxCategory>\
         <cbc:Percent>{}</cbc:Percent><cac:TaxScheme><cbc:Name>{}</cbc:Name>\
         </cac:TaxScheme></cac:TaxCategory></cac:TaxSubtotal>",
        s.amount, s.rate, s.name
    )
}

fn tax_totals_xml(groups: &[Vec<Sub>]) -> String {
    groups
        .iter()
        .map(|g| {
            format!(
                "<cac:TaxTotal>{}</cac:TaxTotal>",
                g.iter().map(subtotal_xml).collect::<String>()
            )
        })
        .collect()
}

fn invoice_xml(doc_taxes: &[Vec<Sub>], lines: &[Vec<Vec<Sub>>]) -> String {
    let lines_xml: String = lines
        .iter()
        .enumerate()
        .map(|(i, taxes)| {
            format!(
                "<cac:InvoiceLine><cbc:ID>{}</cbc:ID>{}</cac:InvoiceLine>",
                i + 1,
                tax_totals_xml(taxes)
            )
        })
        .collect();
    format!(
        r#"<Invoice xmlns="urn:oasis:names:specification:ubl:schema:xsd:Invoice-2" xmlns:cac="{}" xmlns:cbc="{}"><cbc:ID>FV-P</cbc:ID>{}{}</Invoice>"#,
        dian_ns::CAC,
        dian_ns::CBC,
        tax_totals_xml(doc_taxes),
        lines_xml
    )
}

/// Expected (name, rate) → amount sums.
fn expected(groups: &[Vec<Sub>]) -> BTreeMap<(String, String), Decimal> {
    let mut map = BTreeMap::new();
    for s in groups.iter().flatten() {
        *map.entry((s.name.to_string(), s.rate.to_string()))
            .or_insert(Decimal::ZERO) += s.amount;
    }
    map
}

// ── Strategies ──────────────────────────────────────────────────────────────

fn arb_sub() -> impl Strategy<Value = Sub> {
    (
        prop_oneof![Just("IVA"), Just("INC"), Just("ICA")],
        prop_oneof![Just("19.00"), Just("5.00"), Just("19"), Just("8.00")],
        (0i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2)),
    )
        .prop_map(|(name, rate, amount)| Sub { name, rate, amount })
}

/// Amounts at or just below the decimal maximum, so sums overflow.
fn arb_huge_sub() -> impl Strategy<Value = Sub> {
    (
        prop_oneof![Just("IVA"), Just("INC")],
        prop_oneof![Just("19.00"), Just("8.00")],
        (0u32..1_000u32).prop_map(|gap| Decimal::MAX - Decimal::from(gap)),
    )
        .prop_map(|(name, rate, amount)| Sub { name, rate, amount })
}

/// Clamped sums, which is what the breakdown stores once the range is exceeded.
fn saturated(groups: &[Vec<Sub>]) -> BTreeMap<(String, String), Decimal> {
    let mut map = BTreeMap::new();
    for s in groups.iter().flatten() {
        let slot = map
            .entry((s.name.to_string(), s.rate.to_string()))
            .or_insert(Decimal::ZERO);
        *slot = Decimal::saturating_add(*slot, s.amount);
    }
    map
}

fn arb_groups() -> impl Strategy<Value = Vec<Vec<Sub>>> {
    prop::collection::vec(prop::collection::vec(arb_sub(), 0..4), 0..3)
}

fn arb_lines() -> impl Strategy<Value = Vec<Vec<Vec<Sub>>>> {
    prop::collection::vec(arb_groups(), 0..4)
}

fn parse(xml: &str) -> DocumentRecord {
    dian::parse_str(xml, "prop.xml", &ParserConfig::default()).unwrap()
}

// ── Properties ──────────────────────────────────────────────────────────────

proptest! {
    /// Document total taxes always equal the sum of the breakdown entries.
    #[test]
    fn total_taxes_is_sum_of_entries(doc in arb_groups(), lines in arb_lines()) {
        let r = parse(&invoice_xml(&doc, &lines));
        let sum: Decimal = r.taxes.entries().map(|e| e.amount).sum();
        prop_assert_eq!(r.total_taxes(), sum);
        for item in &r.items {
            let line_sum: Decimal = item.taxes.entries().map(|e| e.amount).sum();
            prop_assert_eq!(item.tax_amount(), line_sum);
        }
    }

    /// One entry per distinct (name, rate), holding the summed amount.
    #[test]
    fn breakdown_matches_grouped_sums(doc in arb_groups()) {
        let r = parse(&invoice_xml(&doc, &[]));
        let want = expected(&doc);
        prop_assert_eq!(r.taxes.len(), want.len());
        for ((name, rate), amount) in &want {
            let entry = r.taxes.get(name, rate);
            prop_assert!(entry.is_some());
            prop_assert_eq!(entry.unwrap().amount, *amount);
        }
    }

    /// Line taxes never leak into the document breakdown and vice versa.
    #[test]
    fn document_and_line_scopes_are_isolated(doc in arb_groups(), lines in arb_lines()) {
        let r = parse(&invoice_xml(&doc, &lines));
        prop_assert_eq!(r.total_taxes(), expected(&doc).values().copied().sum::<Decimal>());
        prop_assert_eq!(r.items.len(), lines.len());
        for (item, taxes) in r.items.iter().zip(&lines) {
            prop_assert_eq!(item.tax_amount(), expected(taxes).values().copied().sum::<Decimal>());
        }
    }

    /// Amounts near the decimal maximum clamp instead of panicking, at
    /// document and line level alike.
    #[test]
    fn extreme_amounts_saturate(
        doc in prop::collection::vec(
            prop::collection::vec(prop_oneof![arb_huge_sub(), arb_sub()], 1..4),
            1..3,
        ),
        line in prop::collection::vec(prop::collection::vec(arb_huge_sub(), 1..4), 1..3),
    ) {
        let r = parse(&invoice_xml(&doc, std::slice::from_ref(&line)));
        let want = saturated(&doc);
        prop_assert_eq!(r.taxes.len(), want.len());
        for ((name, rate), amount) in &want {
            prop_assert_eq!(r.taxes.get(name, rate).map(|e| e.amount), Some(*amount));
        }
        let total = want.values().fold(Decimal::ZERO, |acc, a| acc.saturating_add(*a));
        prop_assert_eq!(r.total_taxes(), total);
        let line_total = saturated(&line)
            .values()
            .fold(Decimal::ZERO, |acc, a| acc.saturating_add(*a));
        prop_assert_eq!(r.items[0].tax_amount(), line_total);
    }

    /// Parsing the same text twice yields identical records.
    #[test]
    fn parsing_is_deterministic(doc in arb_groups(), lines in arb_lines()) {
        let xml = invoice_xml(&doc, &lines);
        prop_assert_eq!(parse(&xml), parse(&xml));
    }

    /// Arbitrary input never panics; it either parses or fails cleanly.
    #[test]
    fn arbitrary_text_never_panics(s in "\\PC{0,200}") {
        let _ = dian::parse_str(&s, "fuzz.xml", &ParserConfig::default());
    }
}
