use super::accessor::FieldAccessor;
use crate::core::{DocumentLayout, PaymentInfo, Totals};

/// Read the seven monetary totals under the layout's totals container.
pub fn resolve_totals(acc: &FieldAccessor<'_>, layout: &DocumentLayout) -> Totals {
    let root = acc.root();
    let amount = |tag: &str| acc.decimal(root, &format!("{}/cbc:{tag}", layout.totals_root));

    Totals {
        line_extension: amount("LineExtensionAmount"),
        tax_exclusive: amount("TaxExclusiveAmount"),
        tax_inclusive: amount("TaxInclusiveAmount"),
        allowance_total: amount("AllowanceTotalAmount"),
        charge_total: amount("ChargeTotalAmount"),
        prepaid: amount("PrepaidAmount"),
        payable: amount("PayableAmount"),
    }
}

pub fn resolve_payment(acc: &FieldAccessor<'_>) -> PaymentInfo {
    let root = acc.root();
    PaymentInfo {
        means_code: acc.text(root, "//cac:PaymentMeans/cbc:PaymentMeansCode"),
        channel_id: acc.text(root, "//cac:PaymentMeans/cbc:ID"),
        due_date: acc.text(root, "//cac:PaymentMeans/cbc:PaymentDueDate"),
    }
}
