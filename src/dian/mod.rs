//! DIAN electronic-invoicing extraction (Anexo Técnico 1.9).
//!
//! Turns a UBL 2.1 document as issued in Colombia (factura, nota crédito,
//! nota débito, nómina) into a [`DocumentRecord`](crate::core::DocumentRecord).
//!
//! # Pipeline
//!
//! 1. Build a lenient element tree ([`crate::xml::XmlDocument`])
//! 2. Classify the root element and pick the path layout
//! 3. Resolve parties, payment and totals
//! 4. Aggregate document-level taxes (line-scoped tax totals excluded)
//! 5. Collect sector annex fields (health, transport)
//! 6. Extract lines, each with its own tax breakdown
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use superfacturas::core::ParserConfig;
//! use superfacturas::dian;
//!
//! let config = ParserConfig::default();
//! match dian::parse_document(Path::new("FV-0001.xml"), &config) {
//!     Ok(record) => println!("{} {}", record.header.label, record.total_taxes()),
//!     Err(failure) => eprintln!("skipped {failure}"),
//! }
//! ```

mod accessor;
mod fallback;
mod lines;
mod parser;
mod party;
mod sector;
mod taxes;
mod totals;

pub use accessor::{FieldAccessor, parse_decimal};
pub use fallback::FallbackChain;
pub use parser::{extract_record, parse_document, parse_str};
pub use sector::{HEALTH_PREFIX, HEALTH_TYPE_CODE, TRANSPORT_LABELS, TRANSPORT_PREFIX, transport_label};
