//! A small XPath 1.0 subset over [`XmlDocument`].
//!
//! Supported: absolute (`/`, `//`) and relative location paths, the steps
//! `.`, `..`, `*`, `prefix:name` and a trailing `@name`, and predicates of the
//! form `[path]` or `[path='literal']`, optionally joined with `or`.

use std::collections::BTreeSet;

use thiserror::Error;

use super::tree::{DOCUMENT_NODE, NodeId, XmlDocument};
use crate::core::Namespaces;

/// Why a query string could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("empty path")]
    Empty,
    #[error("unexpected end of path")]
    UnexpectedEnd,
    #[error("unexpected `{found}` at offset {offset}")]
    Unexpected { found: char, offset: usize },
    #[error("namespace prefix `{0}` is not bound")]
    UnboundPrefix(String),
    #[error("attribute step must be the last step")]
    AttributeNotLast,
    #[error("unterminated string literal")]
    UnterminatedLiteral,
}

/// A compiled path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    absolute: bool,
    steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    /// Preceded by `//`: expand the context to descendant-or-self first.
    descend: bool,
    kind: StepKind,
    predicates: Vec<Predicate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum StepKind {
    SelfNode,
    Parent,
    Element(NameTest),
    Attribute(NameTest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NameTest {
    Any,
    Named {
        namespace: Option<String>,
        local: String,
    },
}

impl NameTest {
    fn matches(&self, name: &super::tree::Name) -> bool {
        match self {
            NameTest::Any => true,
            NameTest::Named { namespace, local } => name.matches(namespace.as_deref(), local),
        }
    }
}

/// Conditions joined by `or`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Predicate(Vec<Condition>);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Condition {
    path: Query,
    equals: Option<String>,
}

/// One selected item: an element, or the n-th attribute of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Item {
    Element(NodeId),
    Attribute(NodeId, usize),
}

impl Item {
    /// Element text (before the first child) or attribute value.
    pub fn text<'d>(&self, doc: &'d XmlDocument) -> &'d str {
        match *self {
            Item::Element(id) => doc.text(id),
            Item::Attribute(id, idx) => &doc.attributes(id)[idx].value,
        }
    }

    pub fn element(&self) -> Option<NodeId> {
        match *self {
            Item::Element(id) => Some(id),
            Item::Attribute(..) => None,
        }
    }
}

impl Query {
    /// Compile `path`, resolving prefixes against `namespaces`.
    pub fn compile(path: &str, namespaces: &Namespaces) -> Result<Self, QueryError> {
        let mut p = QueryParser {
            chars: path.chars().collect(),
            pos: 0,
            namespaces,
        };
        p.skip_ws();
        let query = p.path()?;
        p.skip_ws();
        match p.peek() {
            None => Ok(query),
            Some(found) => Err(QueryError::Unexpected {
                found,
                offset: p.pos,
            }),
        }
    }

    /// Evaluate against `context`; items come back in document order, deduplicated.
    pub fn select(&self, doc: &XmlDocument, context: NodeId) -> Vec<Item> {
        let start = if self.absolute { DOCUMENT_NODE } else { context };
        let mut current: Vec<Item> = vec![Item::Element(start)];

        for step in &self.steps {
            let mut next: BTreeSet<Item> = BTreeSet::new();
            for item in &current {
                let Some(node) = item.element() else { continue };
                if step.descend {
                    for n in doc.descendants_or_self(node) {
                        apply_step(doc, n, step, &mut next);
                    }
                } else {
                    apply_step(doc, node, step, &mut next);
                }
            }
            current = next.into_iter().collect();
            if current.is_empty() {
                break;
            }
        }
        current
    }
}

fn apply_step(doc: &XmlDocument, node: NodeId, step: &Step, out: &mut BTreeSet<Item>) {
    let keep = |item: &Item| step.predicates.iter().all(|p| p.holds(doc, *item));
    match &step.kind {
        StepKind::SelfNode => {
            let item = Item::Element(node);
            if keep(&item) {
                out.insert(item);
            }
        }
        StepKind::Parent => {
            if let Some(parent) = doc.parent(node) {
                let item = Item::Element(parent);
                if keep(&item) {
                    out.insert(item);
                }
            }
        }
        StepKind::Element(test) => {
            for &child in doc.children(node) {
                let item = Item::Element(child);
                if test.matches(doc.name(child)) && keep(&item) {
                    out.insert(item);
                }
            }
        }
        StepKind::Attribute(test) => {
            for (idx, attr) in doc.attributes(node).iter().enumerate() {
                let item = Item::Attribute(node, idx);
                if test.matches(&attr.name) && keep(&item) {
                    out.insert(item);
                }
            }
        }
    }
}

impl Predicate {
    fn holds(&self, doc: &XmlDocument, item: Item) -> bool {
        let Some(node) = item.element() else {
            return false;
        };
        self.0.iter().any(|cond| {
            let found = cond.path.select(doc, node);
            match &cond.equals {
                None => !found.is_empty(),
                Some(lit) => found.iter().any(|i| i.text(doc) == lit),
            }
        })
    }
}

struct QueryParser<'a> {
    chars: Vec<char>,
    pos: usize,
    namespaces: &'a Namespaces,
}

impl QueryParser<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn unexpected(&self) -> QueryError {
        match self.peek() {
            Some(found) => QueryError::Unexpected {
                found,
                offset: self.pos,
            },
            None => QueryError::UnexpectedEnd,
        }
    }

    /// Consume `/` or `//`; returns `Some(descend)` if a separator was read.
    fn separator(&mut self) -> Option<bool> {
        if self.peek() != Some('/') {
            return None;
        }
        self.pos += 1;
        if self.peek() == Some('/') {
            self.pos += 1;
            Some(true)
        } else {
            Some(false)
        }
    }

    fn path(&mut self) -> Result<Query, QueryError> {
        if self.peek().is_none() {
            return Err(QueryError::Empty);
        }
        let leading = self.separator();
        let absolute = leading.is_some();
        let mut descend = leading.unwrap_or(false);
        let mut steps = Vec::new();

        loop {
            let step = self.step(descend)?;
            let is_attribute = matches!(step.kind, StepKind::Attribute(_));
            steps.push(step);
            match self.separator() {
                Some(_) if is_attribute => return Err(QueryError::AttributeNotLast),
                Some(d) => descend = d,
                None => break,
            }
        }
        Ok(Query { absolute, steps })
    }

    fn step(&mut self, descend: bool) -> Result<Step, QueryError> {
        let kind = match self.peek() {
            Some('.') if self.peek_at(1) == Some('.') => {
                self.pos += 2;
                StepKind::Parent
            }
            Some('.') => {
                self.pos += 1;
                StepKind::SelfNode
            }
            Some('@') => {
                self.pos += 1;
                StepKind::Attribute(self.name_test()?)
            }
            _ => StepKind::Element(self.name_test()?),
        };
        let mut predicates = Vec::new();
        while self.peek() == Some('[') {
            self.pos += 1;
            predicates.push(self.predicate()?);
        }
        Ok(Step {
            descend,
            kind,
            predicates,
        })
    }

    fn name_test(&mut self) -> Result<NameTest, QueryError> {
        if self.peek() == Some('*') {
            self.pos += 1;
            return Ok(NameTest::Any);
        }
        let first = self.ncname()?;
        if self.peek() == Some(':') {
            self.pos += 1;
            let local = self.ncname()?;
            let uri = self
                .namespaces
                .resolve(&first)
                .ok_or_else(|| QueryError::UnboundPrefix(first.clone()))?;
            Ok(NameTest::Named {
                namespace: Some(uri.to_string()),
                local,
            })
        } else {
            Ok(NameTest::Named {
                namespace: None,
                local: first,
            })
        }
    }

    fn ncname(&mut self) -> Result<String, QueryError> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' => self.pos += 1,
            _ => return Err(self.unexpected()),
        }
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            self.pos += 1;
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn predicate(&mut self) -> Result<Predicate, QueryError> {
        let mut conditions = Vec::new();
        loop {
            self.skip_ws();
            let path = self.path()?;
            self.skip_ws();
            let equals = if self.peek() == Some('=') {
                self.pos += 1;
                self.skip_ws();
                Some(self.literal()?)
            } else {
                None
            };
            conditions.push(Condition { path, equals });
            self.skip_ws();
            if self.keyword("or") {
                continue;
            }
            if self.peek() == Some(']') {
                self.pos += 1;
                return Ok(Predicate(conditions));
            }
            return Err(self.unexpected());
        }
    }

    /// Consume `word` if it appears here followed by whitespace.
    fn keyword(&mut self, word: &str) -> bool {
        let n = word.chars().count();
        let matches = word.chars().enumerate().all(|(i, c)| self.peek_at(i) == Some(c))
            && self.peek_at(n).is_some_and(char::is_whitespace);
        if matches {
            self.pos += n;
        }
        matches
    }

    fn literal(&mut self) -> Result<String, QueryError> {
        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.unexpected()),
        };
        self.pos += 1;
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == quote {
                let lit = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                return Ok(lit);
            }
            self.pos += 1;
        }
        Err(QueryError::UnterminatedLiteral)
    }
}
