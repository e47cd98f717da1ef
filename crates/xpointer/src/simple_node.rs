//! Simple in-memory tree implementing `DomNode` and `DomMut`, used by tests,
//! benches and callers that do not bring their own DOM.
//!
//! Focus:
//! - Ergonomic builder for quick tree creation
//! - Mutation (insert, remove, split) so decoration can be applied after addressing
//! - Shared ownership (Arc + RwLock); parents are held weakly
//!
//! Example:
//! ```
//! use xpointer::simple_node::{doc, elem, text, attr};
//! use xpointer::DomNode;
//!
//! // <div id="d1"><p>Hello <b>world</b></p></div>
//! let document = doc()
//!     .child(
//!         elem("div")
//!             .attr(attr("id", "d1"))
//!             .child(elem("p").child(text("Hello ")).child(elem("b").child(text("world")))),
//!     )
//!     .build();
//! let div = document.children()[0].clone();
//! assert_eq!(div.attribute(None, "id").as_deref(), Some("d1"));
//! assert_eq!(div.string_value(), "Hello world");
//! ```
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use crate::error::{Error, Result};
use crate::model::{DomMut, DomNode, NodeKind, QName};

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Attribute stored on an element; not a node of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleAttr {
    pub name: QName,
    pub value: String,
}

#[derive(Debug)]
pub(crate) struct Inner {
    kind: NodeKind,
    name: Option<QName>,
    value: RwLock<Option<String>>, // text / comment / PI content
    parent: RwLock<Option<Weak<Inner>>>,
    attributes: RwLock<Vec<SimpleAttr>>,
    children: RwLock<Vec<SimpleNode>>,
}

/// A simple Arc-backed node implementation.
#[derive(Clone)]
pub struct SimpleNode(pub(crate) Arc<Inner>);

impl PartialEq for SimpleNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for SimpleNode {}
impl std::hash::Hash for SimpleNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Debug for SimpleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleNode")
            .field("kind", &self.0.kind)
            .field("name", &self.0.name.as_ref().map(QName::qualified))
            .field("value", &*read(&self.0.value))
            .finish_non_exhaustive()
    }
}

impl SimpleNode {
    fn new(kind: NodeKind, name: Option<QName>, value: Option<String>) -> Self {
        SimpleNode(Arc::new(Inner {
            kind,
            name,
            value: RwLock::new(value),
            parent: RwLock::new(None),
            attributes: RwLock::new(Vec::new()),
            children: RwLock::new(Vec::new()),
        }))
    }

    pub fn document() -> SimpleNodeBuilder {
        SimpleNodeBuilder::new(NodeKind::Document, None, None)
    }
    pub fn element(name: &str) -> SimpleNodeBuilder {
        SimpleNodeBuilder::new(NodeKind::Element, Some(parse_qname(name, None)), None)
    }
    pub fn element_ns(ns_uri: &str, name: &str) -> SimpleNodeBuilder {
        SimpleNodeBuilder::new(NodeKind::Element, Some(parse_qname(name, Some(ns_uri))), None)
    }
    pub fn text(value: &str) -> SimpleNode {
        SimpleNode::new(NodeKind::Text, None, Some(value.to_string()))
    }
    pub fn comment(value: &str) -> SimpleNode {
        SimpleNode::new(NodeKind::Comment, None, Some(value.to_string()))
    }
    pub fn pi(target: &str, data: &str) -> SimpleNode {
        SimpleNode::new(NodeKind::ProcessingInstruction, Some(QName::local(target)), Some(data.to_string()))
    }

    pub fn attributes(&self) -> Vec<SimpleAttr> {
        read(&self.0.attributes).clone()
    }

    /// Replace the character data of a text-like node.
    pub fn set_value(&self, value: &str) {
        if !matches!(self.0.kind, NodeKind::Element | NodeKind::Document) {
            *write(&self.0.value) = Some(value.to_string());
        }
    }

    fn set_parent(&self, parent: Option<&SimpleNode>) {
        *write(&self.0.parent) = parent.map(|p| Arc::downgrade(&p.0));
    }

    fn detach(&self) {
        if let Some(parent) = self.parent() {
            write(&parent.0.children).retain(|c| c != self);
            self.set_parent(None);
        }
    }
}

fn parse_qname(name: &str, ns_uri: Option<&str>) -> QName {
    let (prefix, local) = match name.split_once(':') {
        Some((p, l)) => (Some(p.to_string()), l.to_string()),
        None => (None, name.to_string()),
    };
    QName { prefix, local, ns_uri: ns_uri.map(str::to_string) }
}

pub struct SimpleNodeBuilder {
    node: SimpleNode,
    pending_children: Vec<SimpleNode>,
    pending_attrs: Vec<SimpleAttr>,
}

impl SimpleNodeBuilder {
    fn new(kind: NodeKind, name: Option<QName>, value: Option<String>) -> Self {
        Self { node: SimpleNode::new(kind, name, value), pending_children: Vec::new(), pending_attrs: Vec::new() }
    }

    pub fn child(mut self, child: impl Into<SimpleNodeOrBuilder>) -> Self {
        match child.into() {
            SimpleNodeOrBuilder::Built(n) => self.pending_children.push(n),
            SimpleNodeOrBuilder::Builder(b) => self.pending_children.push(b.build()),
        }
        self
    }
    pub fn children<I: IntoIterator<Item = SimpleNodeOrBuilder>>(mut self, it: I) -> Self {
        for c in it {
            self = self.child(c);
        }
        self
    }
    pub fn attr(mut self, attr: SimpleAttr) -> Self {
        self.pending_attrs.push(attr);
        self
    }
    pub fn build(self) -> SimpleNode {
        write(&self.node.0.attributes).extend(self.pending_attrs);
        for c in &self.pending_children {
            c.set_parent(Some(&self.node));
        }
        write(&self.node.0.children).extend(self.pending_children);
        self.node
    }
}

pub enum SimpleNodeOrBuilder {
    Built(SimpleNode),
    Builder(SimpleNodeBuilder),
}
impl From<SimpleNode> for SimpleNodeOrBuilder {
    fn from(n: SimpleNode) -> Self {
        SimpleNodeOrBuilder::Built(n)
    }
}
impl From<SimpleNodeBuilder> for SimpleNodeOrBuilder {
    fn from(b: SimpleNodeBuilder) -> Self {
        SimpleNodeOrBuilder::Builder(b)
    }
}

// Convenience helpers for concise test code
pub fn doc() -> SimpleNodeBuilder {
    SimpleNode::document()
}
pub fn elem(name: &str) -> SimpleNodeBuilder {
    SimpleNode::element(name)
}
pub fn elem_ns(ns_uri: &str, name: &str) -> SimpleNodeBuilder {
    SimpleNode::element_ns(ns_uri, name)
}
pub fn text(v: &str) -> SimpleNode {
    SimpleNode::text(v)
}
pub fn comment(v: &str) -> SimpleNode {
    SimpleNode::comment(v)
}
pub fn attr(name: &str, v: &str) -> SimpleAttr {
    SimpleAttr { name: parse_qname(name, None), value: v.to_string() }
}
pub fn ns_attr(ns_uri: &str, name: &str, v: &str) -> SimpleAttr {
    SimpleAttr { name: parse_qname(name, Some(ns_uri)), value: v.to_string() }
}

impl DomNode for SimpleNode {
    fn kind(&self) -> NodeKind {
        self.0.kind
    }
    fn name(&self) -> Option<QName> {
        self.0.name.clone()
    }
    fn value(&self) -> Option<String> {
        read(&self.0.value).clone()
    }
    fn attribute(&self, ns_uri: Option<&str>, local: &str) -> Option<String> {
        read(&self.0.attributes)
            .iter()
            .find(|a| a.name.local == local && a.name.ns_uri.as_deref() == ns_uri)
            .map(|a| a.value.clone())
    }
    fn parent(&self) -> Option<Self> {
        read(&self.0.parent).as_ref().and_then(Weak::upgrade).map(SimpleNode)
    }
    fn children(&self) -> Vec<Self> {
        read(&self.0.children).clone()
    }
}

impl DomMut for SimpleNode {
    fn create_element(name: &str) -> Self {
        SimpleNode::element(name).build()
    }

    fn set_attribute(&self, ns_uri: Option<&str>, local: &str, value: &str) {
        let mut attrs = write(&self.0.attributes);
        if let Some(a) = attrs.iter_mut().find(|a| a.name.local == local && a.name.ns_uri.as_deref() == ns_uri) {
            a.value = value.to_string();
        } else {
            attrs.push(SimpleAttr {
                name: QName { prefix: None, local: local.to_string(), ns_uri: ns_uri.map(str::to_string) },
                value: value.to_string(),
            });
        }
    }

    fn insert_before(&self, child: &Self, reference: Option<&Self>) -> Result<()> {
        if !matches!(self.0.kind, NodeKind::Element | NodeKind::Document) {
            return Err(Error::invalid_argument("only elements and documents have children"));
        }
        if child == self || child.is_ancestor_of(self) {
            return Err(Error::invalid_argument("a node cannot be inserted into its own subtree"));
        }
        if reference == Some(child) {
            return Ok(());
        }
        child.detach();
        let mut children = write(&self.0.children);
        let index = match reference {
            Some(r) => children
                .iter()
                .position(|c| c == r)
                .ok_or_else(|| Error::invalid_argument("reference node is not a child of this node"))?,
            None => children.len(),
        };
        children.insert(index, child.clone());
        drop(children);
        child.set_parent(Some(self));
        Ok(())
    }

    fn remove_child(&self, child: &Self) -> Result<()> {
        if child.parent().as_ref() != Some(self) {
            return Err(Error::invalid_argument("node is not a child of this node"));
        }
        child.detach();
        Ok(())
    }

    fn split_text(&self, offset: usize) -> Result<Self> {
        if self.0.kind != NodeKind::Text {
            return Err(Error::invalid_argument("only text nodes can be split"));
        }
        let data = self.value().unwrap_or_default();
        let byte = match data.char_indices().nth(offset) {
            Some((b, _)) => b,
            None if offset == data.chars().count() => data.len(),
            None => return Err(Error::invalid_argument(format!("split offset {offset} beyond text length"))),
        };
        let (head, tail) = data.split_at(byte);
        let rest = SimpleNode::text(tail);
        self.set_value(head);
        if let Some(parent) = self.parent() {
            let next = self.next_sibling();
            parent.insert_before(&rest, next.as_ref())?;
        }
        Ok(rest)
    }
}
