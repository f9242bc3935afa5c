//! Sector annex fields carried in `AdditionalDocumentReference`.

use super::accessor::FieldAccessor;
use crate::core::SectorFields;

/// Document type code of a health-sector (Resolución 2275) reference.
pub const HEALTH_TYPE_CODE: &str = "050";
pub const HEALTH_PREFIX: &str = "Salud_Campo_";
pub const TRANSPORT_PREFIX: &str = "Transporte_";

/// Transport document type codes and their labels.
pub const TRANSPORT_LABELS: &[(&str, &str)] = &[
    ("06", "Manifiesto"),
    ("07", "Remesa"),
    ("08", "DTA"),
    ("09", "OTM"),
];

pub fn transport_label(code: &str) -> &str {
    TRANSPORT_LABELS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
        .unwrap_or(code)
}

pub fn extract_sector_fields(acc: &FieldAccessor<'_>) -> SectorFields {
    let mut fields = SectorFields::new();
    let root = acc.root();

    let health = format!(
        "//cac:AdditionalDocumentReference[cbc:DocumentTypeCode='{HEALTH_TYPE_CODE}']"
    );
    for reference in acc.nodes(root, &health) {
        let code = acc.text(
            reference,
            "cac:IssuerParty/cac:PartyIdentification/cbc:ID",
        );
        if !code.is_empty() {
            fields.insert(format!("{HEALTH_PREFIX}{code}"), acc.text(reference, "cbc:ID"));
        }
    }

    let filter = TRANSPORT_LABELS
        .iter()
        .map(|(code, _)| format!("cbc:DocumentTypeCode='{code}'"))
        .collect::<Vec<_>>()
        .join(" or ");
    let transport = format!("//cac:AdditionalDocumentReference[{filter}]");
    for reference in acc.nodes(root, &transport) {
        let code = acc.text(reference, "cbc:DocumentTypeCode");
        let label = transport_label(&code);
        fields.insert(
            format!("{TRANSPORT_PREFIX}{label}"),
            acc.text(reference, "cbc:ID"),
        );
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_labels() {
        assert_eq!(transport_label("06"), "Manifiesto");
        assert_eq!(transport_label("07"), "Remesa");
        assert_eq!(transport_label("08"), "DTA");
        assert_eq!(transport_label("09"), "OTM");
        assert_eq!(transport_label("10"), "10");
    }
}
