use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use tracing::warn;

use crate::core::DianError;

/// Index of a node in an [`XmlDocument`].
pub type NodeId = usize;

/// Namespace-resolved element or attribute name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub namespace: Option<String>,
    pub local: String,
}

impl Name {
    pub fn matches(&self, namespace: Option<&str>, local: &str) -> bool {
        self.local == local && self.namespace.as_deref() == namespace
    }
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: Name,
    pub value: String,
}

#[derive(Debug, Clone)]
struct Element {
    name: Name,
    attributes: Vec<Attribute>,
    /// Text before the first child element.
    text: String,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    /// One past the last node of this subtree.
    end: NodeId,
}

/// Read-only element tree.
///
/// Nodes are stored in document order, so the descendants of a node are the
/// contiguous range following it. Node `0` is a synthetic document node whose
/// only child is the root element.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    nodes: Vec<Element>,
}

pub const DOCUMENT_NODE: NodeId = 0;

impl XmlDocument {
    /// Parse `xml` into a tree.
    ///
    /// With `recover` set, mismatched or stray end tags are tolerated and a
    /// syntax error after the root element has opened truncates the tree
    /// instead of failing. Comments and processing instructions are dropped;
    /// text split around them is joined and then trimmed once per element.
    pub fn parse(xml: &str, recover: bool) -> Result<Self, DianError> {
        let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
        let mut reader = NsReader::from_str(xml);
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = !recover;
        config.allow_unmatched_ends = recover;

        let mut builder = TreeBuilder::new();
        loop {
            let step = reader
                .read_resolved_event()
                .map(|(ns, event)| (namespace_uri(&ns), event));
            let (ns, event) = match step {
                Ok(ok) => ok,
                Err(e) if recover && builder.has_root() => {
                    warn!(
                        position = reader.buffer_position(),
                        "recovered from malformed XML: {e}"
                    );
                    break;
                }
                Err(e) => {
                    return Err(DianError::Xml(format!(
                        "{e} (at byte {})",
                        reader.buffer_position()
                    )));
                }
            };

            match event {
                Event::Start(e) => {
                    let name = element_name(ns, &e);
                    let attributes = read_attributes(&reader, &e);
                    builder.open(name, attributes);
                }
                Event::Empty(e) => {
                    let name = element_name(ns, &e);
                    let attributes = read_attributes(&reader, &e);
                    let id = builder.open(name, attributes);
                    builder.close_node(id);
                }
                Event::End(e) => {
                    let local = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    builder.close(ns.as_deref(), &local);
                }
                Event::Text(t) => {
                    let text = match t.unescape() {
                        Ok(s) => s.into_owned(),
                        Err(_) => String::from_utf8_lossy(&t).into_owned(),
                    };
                    builder.text(&text);
                }
                Event::CData(c) => builder.text(&String::from_utf8_lossy(&c)),
                Event::Eof => break,
                _ => {}
            }

            if builder.root_closed() {
                break;
            }
        }

        if !recover && builder.open_count() > 0 {
            return Err(DianError::Xml("unexpected end of document".into()));
        }
        builder.finish()
    }

    pub fn root(&self) -> NodeId {
        // finish() guarantees a root element exists
        self.nodes[DOCUMENT_NODE].children[0]
    }

    pub fn name(&self, id: NodeId) -> &Name {
        &self.nodes[id].name
    }

    pub fn local_name(&self, id: NodeId) -> &str {
        &self.nodes[id].name.local
    }

    /// Text content before the node's first child element.
    pub fn text(&self, id: NodeId) -> &str {
        &self.nodes[id].text
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        &self.nodes[id].attributes
    }

    /// The node itself followed by all of its descendants, in document order.
    pub fn descendants_or_self(&self, id: NodeId) -> std::ops::Range<NodeId> {
        id..self.nodes[id].end
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }
}

fn namespace_uri(ns: &ResolveResult) -> Option<String> {
    match ns {
        ResolveResult::Bound(Namespace(uri)) => Some(String::from_utf8_lossy(uri).into_owned()),
        _ => None,
    }
}

fn element_name(namespace: Option<String>, start: &BytesStart) -> Name {
    Name {
        namespace,
        local: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
    }
}

fn read_attributes(reader: &NsReader<&[u8]>, start: &BytesStart) -> Vec<Attribute> {
    let mut out = Vec::new();
    for attr in start.attributes().with_checks(false).flatten() {
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let (ns, local) = reader.resolve_attribute(attr.key);
        let value = match attr.decode_and_unescape_value(reader.decoder()) {
            Ok(v) => v.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        };
        out.push(Attribute {
            name: Name {
                namespace: namespace_uri(&ns),
                local: String::from_utf8_lossy(local.as_ref()).into_owned(),
            },
            value,
        });
    }
    out
}

struct TreeBuilder {
    nodes: Vec<Element>,
    stack: Vec<NodeId>,
}

impl TreeBuilder {
    fn new() -> Self {
        let document = Element {
            name: Name {
                namespace: None,
                local: String::new(),
            },
            attributes: Vec::new(),
            text: String::new(),
            children: Vec::new(),
            parent: None,
            end: 1,
        };
        Self {
            nodes: vec![document],
            stack: Vec::new(),
        }
    }

    fn has_root(&self) -> bool {
        !self.nodes[DOCUMENT_NODE].children.is_empty()
    }

    fn root_closed(&self) -> bool {
        self.has_root() && self.stack.is_empty()
    }

    fn open_count(&self) -> usize {
        self.stack.len()
    }

    fn open(&mut self, name: Name, attributes: Vec<Attribute>) -> NodeId {
        let parent = self.stack.last().copied().unwrap_or(DOCUMENT_NODE);
        let id = self.nodes.len();
        self.nodes.push(Element {
            name,
            attributes,
            text: String::new(),
            children: Vec::new(),
            parent: Some(parent),
            end: id + 1,
        });
        self.nodes[parent].children.push(id);
        self.stack.push(id);
        id
    }

    fn close_node(&mut self, id: NodeId) {
        if let Some(pos) = self.stack.iter().rposition(|&n| n == id) {
            let end = self.nodes.len();
            for n in self.stack.drain(pos..) {
                seal(&mut self.nodes[n], end);
            }
        }
    }

    /// Close the innermost open element with this name. Stray end tags are ignored.
    fn close(&mut self, namespace: Option<&str>, local: &str) {
        let found = self
            .stack
            .iter()
            .rposition(|&n| self.nodes[n].name.matches(namespace, local));
        if let Some(pos) = found {
            let id = self.stack[pos];
            self.close_node(id);
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(&top) = self.stack.last() {
            let node = &mut self.nodes[top];
            if node.children.is_empty() {
                node.text.push_str(text);
            }
        }
    }

    fn finish(mut self) -> Result<XmlDocument, DianError> {
        if !self.has_root() {
            return Err(DianError::Xml("no root element".into()));
        }
        let end = self.nodes.len();
        for n in self.stack.drain(..) {
            seal(&mut self.nodes[n], end);
        }
        self.nodes[DOCUMENT_NODE].end = end;
        Ok(XmlDocument { nodes: self.nodes })
    }
}

/// Record the subtree end and trim the text gathered from all chunks.
fn seal(node: &mut Element, end: NodeId) {
    node.end = end;
    let trimmed = node.text.trim();
    if trimmed.len() != node.text.len() {
        node.text = trimmed.to_string();
    }
}
