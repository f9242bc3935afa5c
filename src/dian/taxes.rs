use tracing::warn;

use super::accessor::FieldAccessor;
use super::fallback::FallbackChain;
use crate::core::TaxBreakdown;
use crate::xml::NodeId;

/// Fold the `TaxSubtotal` children of every node in `totals` into one breakdown.
///
/// Shared by document-level and line-level aggregation; the caller decides
/// which `TaxTotal` (or `WithholdingTaxTotal`) nodes are in scope. Sums that
/// exceed the decimal range are clamped rather than failing the document.
pub fn aggregate_subtotals(acc: &FieldAccessor<'_>, totals: &[NodeId]) -> TaxBreakdown {
    let mut breakdown = TaxBreakdown::new();
    for &total in totals {
        for sub in acc.nodes(total, "cac:TaxSubtotal") {
            let name = FallbackChain::new()
                .or(|| acc.text(sub, "cac:TaxCategory/cac:TaxScheme/cbc:Name"))
                .or(|| acc.text(sub, "cac:TaxCategory/cac:TaxScheme/cbc:ID"))
                .resolve();
            let rate = FallbackChain::new()
                .or(|| acc.text(sub, "cac:TaxCategory/cbc:Percent"))
                .or(|| "0".to_string())
                .resolve();
            let amount = acc.decimal(sub, "cbc:TaxAmount");
            if !breakdown.add(&name, &rate, amount) {
                warn!(tax = %name, rate = %rate, "tax amount overflowed, clamped");
            }
        }
    }
    breakdown
}

/// Document-level `tag` nodes, skipping those whose parent is a line element.
pub fn document_scope(acc: &FieldAccessor<'_>, tag: &str) -> Vec<NodeId> {
    let doc = acc.document();
    acc.nodes(acc.root(), &format!("//cac:{tag}"))
        .into_iter()
        .filter(|&n| {
            doc.parent(n)
                .is_none_or(|p| !doc.local_name(p).ends_with("Line"))
        })
        .collect()
}

/// Document-level tax breakdown.
pub fn document_taxes(acc: &FieldAccessor<'_>) -> TaxBreakdown {
    aggregate_subtotals(acc, &document_scope(acc, "TaxTotal"))
}

/// Document-level withholdings (ReteIVA, ReteICA, ReteFuente).
pub fn document_withholdings(acc: &FieldAccessor<'_>) -> TaxBreakdown {
    aggregate_subtotals(acc, &document_scope(acc, "WithholdingTaxTotal"))
}

/// Taxes declared directly on one line.
pub fn line_taxes(acc: &FieldAccessor<'_>, line: NodeId) -> TaxBreakdown {
    aggregate_subtotals(acc, &acc.nodes(line, "cac:TaxTotal"))
}
