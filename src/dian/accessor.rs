use std::cell::RefCell;
use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::core::Namespaces;
use crate::xml::{NodeId, Query, XmlDocument};

/// Total, read-only field lookups over one parsed document.
///
/// Every lookup folds "no match", "malformed path" and "unparsable number"
/// into an empty string or zero. Nothing here returns an error.
///
/// Each distinct path is compiled once and reused for the lifetime of the
/// accessor; malformed paths are remembered as such.
pub struct FieldAccessor<'d> {
    doc: &'d XmlDocument,
    namespaces: &'d Namespaces,
    compiled: RefCell<HashMap<String, Option<Query>>>,
}

impl<'d> FieldAccessor<'d> {
    pub fn new(doc: &'d XmlDocument, namespaces: &'d Namespaces) -> Self {
        Self {
            doc,
            namespaces,
            compiled: RefCell::new(HashMap::new()),
        }
    }

    pub fn document(&self) -> &'d XmlDocument {
        self.doc
    }

    pub fn root(&self) -> NodeId {
        self.doc.root()
    }

    /// Text of the first node matching `path` from `context`, or `""`.
    pub fn text(&self, context: NodeId, path: &str) -> String {
        self.with_query(path, |q| {
            q.select(self.doc, context)
                .first()
                .map(|item| item.text(self.doc).to_string())
        })
        .flatten()
        .unwrap_or_default()
    }

    /// First match parsed as a decimal, or zero.
    pub fn decimal(&self, context: NodeId, path: &str) -> Decimal {
        parse_decimal(&self.text(context, path))
    }

    /// All elements matching `path` from `context`, in document order.
    pub fn nodes(&self, context: NodeId, path: &str) -> Vec<NodeId> {
        self.with_query(path, |q| {
            q.select(self.doc, context)
                .iter()
                .filter_map(|item| item.element())
                .collect()
        })
        .unwrap_or_default()
    }

    fn with_query<T>(&self, path: &str, run: impl FnOnce(&Query) -> T) -> Option<T> {
        let mut compiled = self.compiled.borrow_mut();
        if !compiled.contains_key(path) {
            compiled.insert(path.to_string(), Query::compile(path, self.namespaces).ok());
        }
        compiled.get(path).and_then(Option::as_ref).map(run)
    }
}

/// Parse an amount the way source documents write it; anything else is zero.
pub fn parse_decimal(text: &str) -> Decimal {
    let t = text.trim();
    if t.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(t)
        .or_else(|_| Decimal::from_scientific(t))
        .unwrap_or(Decimal::ZERO)
}
