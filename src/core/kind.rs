//! Document classification and the path variants each kind uses.

use serde::{Deserialize, Serialize};

/// Document subtype, decided from the root element's local name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    /// `Invoice` — factura electrónica de venta.
    Invoice,
    /// `CreditNote`.
    CreditNote,
    /// `DebitNote`.
    DebitNote,
    /// `NominaElectronica` — electronic payroll.
    Payroll,
    /// Any other root element. Still parsed on a best-effort basis.
    Unknown,
}

impl DocumentKind {
    /// Classify a namespace-stripped root tag.
    pub fn from_root_tag(tag: &str) -> Self {
        match tag {
            "Invoice" => Self::Invoice,
            "CreditNote" => Self::CreditNote,
            "DebitNote" => Self::DebitNote,
            "NominaElectronica" => Self::Payroll,
            _ => Self::Unknown,
        }
    }

    /// Human label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Invoice => "Factura",
            Self::CreditNote => "Nota Crédito",
            Self::DebitNote => "Nota Débito",
            Self::Payroll => "Nómina",
            Self::Unknown => "Desconocido",
        }
    }

    pub fn is_payroll(self) -> bool {
        self == Self::Payroll
    }
}

/// Where a given document kind keeps its parties, totals and lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLayout {
    pub kind: DocumentKind,
    /// Absolute path to the issuer party element.
    pub issuer_root: &'static str,
    /// Absolute path to the recipient party element.
    pub recipient_root: &'static str,
    /// Absolute path to the monetary totals container.
    pub totals_root: &'static str,
    /// Absolute path to the document's own line elements, e.g. `//cac:InvoiceLine`.
    pub line_path: String,
    /// Candidate quantity elements on a line, tried in order.
    pub quantity_tags: &'static [&'static str],
}

impl DocumentLayout {
    pub fn for_root_tag(tag: &str) -> Self {
        let kind = DocumentKind::from_root_tag(tag);
        let (issuer_root, recipient_root, totals_root) = if kind.is_payroll() {
            (
                "//cac:EmployerParty",
                "//cac:EmployeeParty",
                "//cac:RequestedMonetaryTotal",
            )
        } else {
            (
                "//cac:AccountingSupplierParty/cac:Party",
                "//cac:AccountingCustomerParty/cac:Party",
                "//cac:LegalMonetaryTotal",
            )
        };
        let quantity_tags: &'static [&'static str] = match kind {
            DocumentKind::CreditNote => &["cbc:CreditedQuantity", "cbc:InvoicedQuantity"],
            DocumentKind::DebitNote => &["cbc:DebitedQuantity", "cbc:InvoicedQuantity"],
            _ => &["cbc:InvoicedQuantity"],
        };
        Self {
            kind,
            issuer_root,
            recipient_root,
            totals_root,
            line_path: format!("//cac:{tag}Line"),
            quantity_tags,
        }
    }
}
