//! # superfacturas
//!
//! Extracts a normalized, report-ready record from Colombian DIAN
//! electronic-invoicing XML: facturas, notas crédito, notas débito and
//! nómina electrónica.
//!
//! All monetary values use [`rust_decimal::Decimal`] — never floating point.
//! Missing or malformed fields never fail a document: text defaults to `""`
//! and amounts to zero. Only a file that cannot be read or has no usable XML
//! produces a [`ParseFailure`](crate::core::ParseFailure).
//!
//! ## Quick Start
//!
//! ```rust
//! use superfacturas::core::ParserConfig;
//! use superfacturas::dian;
//!
//! let xml = r#"<Invoice xmlns="urn:oasis:names:specification:ubl:schema:xsd:Invoice-2"
//!     xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2"
//!     xmlns:cac="urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2">
//!   <cbc:ID>SETP990000001</cbc:ID>
//!   <cac:TaxTotal>
//!     <cac:TaxSubtotal>
//!       <cbc:TaxAmount currencyID="COP">190.00</cbc:TaxAmount>
//!       <cac:TaxCategory><cbc:Percent>19.00</cbc:Percent>
//!         <cac:TaxScheme><cbc:ID>01</cbc:ID><cbc:Name>IVA</cbc:Name></cac:TaxScheme>
//!       </cac:TaxCategory>
//!     </cac:TaxSubtotal>
//!   </cac:TaxTotal>
//! </Invoice>"#;
//!
//! let record = dian::parse_str(xml, "fv.xml", &ParserConfig::default()).unwrap();
//! assert_eq!(record.header.label, "Factura");
//! assert_eq!(record.header.number, "SETP990000001");
//! assert_eq!(record.total_taxes().to_string(), "190.00");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` | Record types, classification, configuration, column discovery |
//! | `parser` | Lenient XML tree, path queries, DIAN extraction |
//! | `batch` | Parallel multi-file parsing with cancellation |
//! | `all` (default) | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "parser")]
pub mod xml;

#[cfg(feature = "parser")]
pub mod dian;

#[cfg(feature = "batch")]
pub mod batch;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
