//! Lenient, namespace-aware XML reading.
//!
//! [`XmlDocument`] is an owned element tree built with `quick-xml`;
//! [`Query`] evaluates small XPath-style paths over it.

mod query;
mod tree;

pub use query::{Item, Query, QueryError};
pub use tree::{Attribute, DOCUMENT_NODE, Name, NodeId, XmlDocument};
