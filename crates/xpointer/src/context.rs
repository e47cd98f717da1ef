use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::model::DomNode;
use crate::range::Range;

/// One located result flowing through evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Location<N: DomNode> {
    Node(N),
    Range(Range<N>),
    Literal(String),
    Number(f64),
    Boolean(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationKind {
    Node,
    Range,
    Literal,
    Number,
    Boolean,
}

impl<N: DomNode> Location<N> {
    pub fn kind(&self) -> LocationKind {
        match self {
            Location::Node(_) => LocationKind::Node,
            Location::Range(_) => LocationKind::Range,
            Location::Literal(_) => LocationKind::Literal,
            Location::Number(_) => LocationKind::Number,
            Location::Boolean(_) => LocationKind::Boolean,
        }
    }

    /// Whether this entry designates a place in the document.
    pub fn is_location(&self) -> bool {
        matches!(self, Location::Node(_) | Location::Range(_))
    }

    /// Range covering this entry. The document node maps to its document element.
    pub fn to_range(&self) -> Result<Range<N>> {
        match self {
            Location::Node(n) => range_around(n),
            Location::Range(r) => Ok(r.clone()),
            other => Err(Error::unsupported(format!("{:?} is not a location", other.kind()))),
        }
    }
}

/// `select_node` with the document root replaced by its document element,
/// which has a parent to anchor the boundaries in.
pub(crate) fn range_around<N: DomNode>(node: &N) -> Result<Range<N>> {
    if node.parent().is_some() {
        return Range::select_node(node);
    }
    let element = node
        .children()
        .into_iter()
        .find(N::is_element)
        .ok_or_else(|| Error::resolution("document has no document element"))?;
    Range::select_node(&element)
}

/// Ordered results of one evaluation step; usually a single entry.
pub type Context<N> = SmallVec<[Location<N>; 1]>;
