use crate::error::{Error, Result};
use crate::model::{DomNode, NodeKind};

/// Decides how tag names compare: plain HTML is case-insensitive, XHTML/XML is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFlavor {
    Html,
    Xml,
}

/// A document root together with the flavor that governs tag-name comparison.
#[derive(Debug, Clone)]
pub struct Document<N: DomNode> {
    root: N,
    flavor: DocumentFlavor,
}

impl<N: DomNode> Document<N> {
    /// Wrap a document node, detecting the flavor from its document element:
    /// an `html` element without namespace means plain HTML.
    pub fn new(root: N) -> Self {
        let flavor = match first_element_child(&root).and_then(|e| e.name()) {
            Some(q) if q.ns_uri.is_none() && q.local.eq_ignore_ascii_case("html") => DocumentFlavor::Html,
            _ => DocumentFlavor::Xml,
        };
        Self { root, flavor }
    }

    pub fn html(root: N) -> Self {
        Self { root, flavor: DocumentFlavor::Html }
    }

    pub fn xml(root: N) -> Self {
        Self { root, flavor: DocumentFlavor::Xml }
    }

    pub fn root(&self) -> &N {
        &self.root
    }

    pub fn flavor(&self) -> DocumentFlavor {
        self.flavor
    }

    pub fn document_element(&self) -> Result<N> {
        first_element_child(&self.root).ok_or_else(|| Error::invalid_argument("document has no document element"))
    }

    /// Tag names are compared after this normalization everywhere.
    pub fn normalize_tag(&self, tag: &str) -> String {
        match self.flavor {
            DocumentFlavor::Html => tag.to_ascii_lowercase(),
            DocumentFlavor::Xml => tag.to_string(),
        }
    }

    pub fn tag_of(&self, node: &N) -> Option<String> {
        node.tag_name().map(|t| self.normalize_tag(&t))
    }

    /// First element in document order whose `id` attribute equals `id`.
    pub fn element_by_id(&self, id: &str) -> Option<N> {
        if id.is_empty() {
            return None;
        }
        let mut stack = vec![self.root.clone()];
        while let Some(n) = stack.pop() {
            if n.is_element() && n.attribute(None, "id").as_deref() == Some(id) {
                return Some(n);
            }
            let mut children = n.children();
            children.reverse();
            stack.extend(children.into_iter().filter(|c| matches!(c.kind(), NodeKind::Element | NodeKind::Document)));
        }
        None
    }

    pub fn contains(&self, node: &N) -> bool {
        node == &self.root || self.root.is_ancestor_of(node)
    }
}

fn first_element_child<N: DomNode>(node: &N) -> Option<N> {
    node.children().into_iter().find(N::is_element)
}
