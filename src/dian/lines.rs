use super::accessor::FieldAccessor;
use super::taxes::line_taxes;
use crate::core::{DocumentLayout, LineItem};
use crate::xml::NodeId;

/// Extract every line of the document's own line type, in document order.
pub fn extract_lines(acc: &FieldAccessor<'_>, layout: &DocumentLayout) -> Vec<LineItem> {
    acc.nodes(acc.root(), &layout.line_path)
        .into_iter()
        .map(|line| extract_line(acc, layout, line))
        .collect()
}

fn extract_line(acc: &FieldAccessor<'_>, layout: &DocumentLayout, line: NodeId) -> LineItem {
    // The unit code belongs to whichever quantity element actually carried the value.
    let quantity_tag = layout
        .quantity_tags
        .iter()
        .copied()
        .find(|tag| !acc.text(line, tag).is_empty())
        .unwrap_or(layout.quantity_tags[0]);

    LineItem {
        id: acc.text(line, "cbc:ID"),
        description: acc.text(line, "cac:Item/cbc:Description"),
        quantity: acc.decimal(line, quantity_tag),
        unit_code: acc.text(line, &format!("{quantity_tag}/@unitCode")),
        unit_price: acc.decimal(line, "cac:Price/cbc:PriceAmount"),
        line_extension: acc.decimal(line, "cbc:LineExtensionAmount"),
        taxes: line_taxes(acc, line),
        standard_item_code: acc.text(line, "cac:Item/cac:StandardItemIdentification/cbc:ID"),
        brand: acc.text(line, "cac:Item/cbc:BrandName"),
        model: acc.text(line, "cac:Item/cbc:ModelName"),
    }
}
