use core::cmp::Ordering;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Element,
    Text,
    Comment,
    ProcessingInstruction,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
    pub ns_uri: Option<String>,
}

impl QName {
    pub fn local(local: &str) -> Self {
        Self { prefix: None, local: local.to_string(), ns_uri: None }
    }

    /// Name as written in markup, `prefix:local` when a prefix is present.
    pub fn qualified(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{p}:{}", self.local),
            None => self.local.clone(),
        }
    }
}

/// Compare two nodes by ancestry and sibling order (fallback algorithm).
///
/// Properties:
/// - If one node is an ancestor of the other, the ancestor precedes the descendant.
/// - Siblings keep the order provided by the adapter's `children()`.
/// - Nodes from different roots cannot be ordered and yield `InvalidArgument`.
///   Adapters spanning several trees must override `DomNode::compare_document_order`.
pub fn try_compare_by_ancestry<N: DomNode>(a: &N, b: &N) -> Result<Ordering> {
    if a == b {
        return Ok(Ordering::Equal);
    }
    let pa = a.ancestors_and_self();
    let pb = b.ancestors_and_self();
    let len = core::cmp::min(pa.len(), pb.len());
    let mut i = 0usize;
    while i < len && pa[i] == pb[i] {
        i += 1;
    }
    if i == len {
        // shorter path is the ancestor
        return Ok(if pa.len() < pb.len() { Ordering::Less } else { Ordering::Greater });
    }
    if i == 0 {
        return Err(Error::invalid_argument("document order requires nodes from the same tree"));
    }
    let siblings = pa[i - 1].children();
    let posa = siblings.iter().position(|n| n == &pa[i]);
    let posb = siblings.iter().position(|n| n == &pb[i]);
    match (posa, posb) {
        (Some(x), Some(y)) => Ok(x.cmp(&y)),
        _ => Err(Error::internal("node is missing from its parent's child list")),
    }
}

/// Read access to a DOM-like tree.
///
/// Attributes are not nodes in this model; they are looked up by name on elements.
/// Offsets handed out through `char_len` count Unicode scalar values.
pub trait DomNode: Clone + Eq + core::fmt::Debug {
    fn kind(&self) -> NodeKind;
    fn name(&self) -> Option<QName>;
    /// Character data of text, comment and processing-instruction nodes.
    fn value(&self) -> Option<String>;
    fn attribute(&self, ns_uri: Option<&str>, local: &str) -> Option<String>;
    fn parent(&self) -> Option<Self>;
    fn children(&self) -> Vec<Self>;

    fn is_element(&self) -> bool {
        self.kind() == NodeKind::Element
    }

    fn is_text(&self) -> bool {
        self.kind() == NodeKind::Text
    }

    /// Concatenated text of all descendant text nodes.
    fn string_value(&self) -> String {
        fn dfs<N: DomNode>(n: &N, out: &mut String) {
            if n.is_text() {
                if let Some(v) = n.value() {
                    out.push_str(&v);
                }
                return;
            }
            for c in n.children() {
                dfs(&c, out);
            }
        }
        match self.kind() {
            NodeKind::Element | NodeKind::Document => {
                let mut out = String::new();
                dfs(self, &mut out);
                out
            }
            _ => self.value().unwrap_or_default(),
        }
    }

    fn tag_name(&self) -> Option<String> {
        if self.is_element() { self.name().map(|q| q.qualified()) } else { None }
    }

    /// The DOM "length": characters for character data, children otherwise.
    fn char_len(&self) -> usize {
        match self.kind() {
            NodeKind::Text | NodeKind::Comment | NodeKind::ProcessingInstruction => {
                self.value().map_or(0, |v| v.chars().count())
            }
            NodeKind::Element | NodeKind::Document => self.children().len(),
        }
    }

    fn child_at(&self, index: usize) -> Option<Self> {
        self.children().into_iter().nth(index)
    }

    /// Position of this node in its parent's child list.
    fn child_index(&self) -> Option<usize> {
        let parent = self.parent()?;
        parent.children().iter().position(|c| c == self)
    }

    fn previous_sibling(&self) -> Option<Self> {
        let idx = self.child_index()?;
        if idx == 0 { None } else { self.parent()?.child_at(idx - 1) }
    }

    fn next_sibling(&self) -> Option<Self> {
        let idx = self.child_index()?;
        self.parent()?.child_at(idx + 1)
    }

    /// Path from the root down to this node, inclusive.
    fn ancestors_and_self(&self) -> Vec<Self> {
        let mut path = vec![self.clone()];
        let mut n = self.clone();
        while let Some(p) = n.parent() {
            path.push(p.clone());
            n = p;
        }
        path.reverse();
        path
    }

    fn is_ancestor_of(&self, other: &Self) -> bool {
        let mut cur = other.parent();
        while let Some(p) = cur {
            if &p == self {
                return true;
            }
            cur = p.parent();
        }
        false
    }

    /// Default document order comparison uses ancestry and sibling order.
    fn compare_document_order(&self, other: &Self) -> Result<Ordering> {
        try_compare_by_ancestry(self, other)
    }
}

/// Tree mutation needed by the marking helpers.
pub trait DomMut: DomNode {
    fn create_element(name: &str) -> Self;
    fn set_attribute(&self, ns_uri: Option<&str>, local: &str, value: &str);
    /// Insert `child` before `reference`, or append when `reference` is `None`.
    /// A child that already has a parent is detached first.
    fn insert_before(&self, child: &Self, reference: Option<&Self>) -> Result<()>;
    fn remove_child(&self, child: &Self) -> Result<()>;
    /// Split a text node at a character offset; returns the new following node.
    fn split_text(&self, offset: usize) -> Result<Self>;

    fn append_child(&self, child: &Self) -> Result<()> {
        self.insert_before(child, None)
    }
}
