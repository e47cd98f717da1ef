//! XPointer addresses for text selections and elements.
//!
//! [`XPointerService::create_address`] turns a selection or range into a
//! compact address string; [`XPointerService::resolve_address`] turns such a
//! string back into a [`Range`] in a document that may since have been
//! decorated with nodes created through [`marks::create_marked_element`].
//!
//! ```
//! use xpointer::simple_node::{doc, elem, text, attr};
//! use xpointer::{Document, DomNode, Selection, XPointerService};
//!
//! let root = doc()
//!     .child(
//!         elem("div")
//!             .attr(attr("id", "d1"))
//!             .child(elem("p").child(text("Hello ")).child(elem("b").child(text("world")))),
//!     )
//!     .build();
//! let document = Document::new(root.clone());
//! let world = root.children()[0].children()[0].children()[1].children()[0].clone();
//!
//! let service = XPointerService::new();
//! let address = service.create_address(&Selection::anchor_focus(world.clone(), 0, world, 5), &document).unwrap();
//! assert_eq!(address, r#"xpointer(string-range(id("d1")/p[1]/b[1], "", 1, 5))"#);
//!
//! let range = service.resolve_address(&address, &document).unwrap();
//! assert_eq!(range.text().unwrap(), "world");
//! ```
pub mod chars;
pub mod context;
pub mod creator;
pub mod document;
pub mod error;
pub mod lexer;
pub mod marks;
pub mod model;
pub mod options;
pub mod range;
pub mod resolver;
pub mod simple_node;
pub mod traverse;

pub use context::{Context, Location, LocationKind};
pub use creator::{Creator, Selection};
pub use document::{Document, DocumentFlavor};
pub use error::{EndOfStream, Error, ErrorKind, Result};
pub use lexer::{Lexer, LexerSnapshot, Token, TokenTag};
pub use model::{DomMut, DomNode, NodeKind, QName};
pub use options::XPointerOptions;
pub use range::{Boundary, Range};
pub use resolver::Resolver;
pub use simple_node::{SimpleNode, SimpleNodeBuilder};

/// Entry point for the decoration layer: creates and resolves addresses with
/// one set of options.
#[derive(Debug, Clone, Default)]
pub struct XPointerService {
    options: XPointerOptions,
}

impl XPointerService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: XPointerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &XPointerOptions {
        &self.options
    }

    pub fn create_address<N: DomNode>(&self, selection: &Selection<N>, doc: &Document<N>) -> Result<String> {
        Creator::new(doc, &self.options).create(selection)
    }

    pub fn create_address_from_range<N: DomNode>(&self, range: &Range<N>, doc: &Document<N>) -> Result<String> {
        self.create_address(&Selection::StartEnd(range.clone()), doc)
    }

    pub fn resolve_address<N: DomNode>(&self, address: &str, doc: &Document<N>) -> Result<Range<N>> {
        Resolver::new(address, doc, &self.options).resolve()
    }

    /// Element containing the start of the addressed range.
    pub fn resolve_element<N: DomNode>(&self, address: &str, doc: &Document<N>) -> Result<N> {
        Resolver::new(address, doc, &self.options).resolve_element()
    }
}

pub fn create_address<N: DomNode>(selection: &Selection<N>, doc: &Document<N>) -> Result<String> {
    XPointerService::new().create_address(selection, doc)
}

pub fn create_address_from_range<N: DomNode>(range: &Range<N>, doc: &Document<N>) -> Result<String> {
    XPointerService::new().create_address_from_range(range, doc)
}

pub fn resolve_address<N: DomNode>(address: &str, doc: &Document<N>) -> Result<Range<N>> {
    XPointerService::new().resolve_address(address, doc)
}

pub fn resolve_element<N: DomNode>(address: &str, doc: &Document<N>) -> Result<N> {
    XPointerService::new().resolve_element(address, doc)
}
