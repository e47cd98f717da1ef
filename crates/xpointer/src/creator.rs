//! Builds the address of a selection or range.
//!
//! Positions are encoded the cheapest way that survives decoration: an element
//! with an id becomes `id("X")`, other elements a child path counted through
//! [`spliced_children`](crate::traverse::spliced_children), and text positions a
//! `string-range` counted with [`CollapsedCounter`].
use core::cmp::Ordering;

use itertools::Itertools;
use tracing::{debug, trace};

use crate::chars::{CharStream, CollapsedCounter};
use crate::document::Document;
use crate::error::{EndOfStream, Error, Result};
use crate::marks::is_marked_ignore;
use crate::model::{DomNode, NodeKind};
use crate::options::XPointerOptions;
use crate::range::{Boundary, Range, compare_boundary_points};
use crate::traverse::{
    effective_parent, following_node, next_unmarked, next_visible_text, position_among, preceding_node,
    previous_visible_text,
};

/// What a caller hands in: a browser-style selection or a plain range.
#[derive(Debug, Clone)]
pub enum Selection<N: DomNode> {
    /// Anchor and focus in user order; the focus may precede the anchor.
    AnchorFocus { anchor: N, anchor_offset: usize, focus: N, focus_offset: usize },
    StartEnd(Range<N>),
}

impl<N: DomNode> Selection<N> {
    pub fn anchor_focus(anchor: N, anchor_offset: usize, focus: N, focus_offset: usize) -> Self {
        Self::AnchorFocus { anchor, anchor_offset, focus, focus_offset }
    }

    /// Boundaries in forward order.
    pub fn normalized(&self) -> Result<(Boundary<N>, Boundary<N>)> {
        match self {
            Self::StartEnd(range) => Ok((range.start().clone(), range.end().clone())),
            Self::AnchorFocus { anchor, anchor_offset, focus, focus_offset } => {
                let a = Boundary::new(anchor.clone(), *anchor_offset);
                let f = Boundary::new(focus.clone(), *focus_offset);
                a.check()?;
                f.check()?;
                if compare_boundary_points(&a, &f)? == Ordering::Greater { Ok((f, a)) } else { Ok((a, f)) }
            }
        }
    }
}

impl<N: DomNode> From<Range<N>> for Selection<N> {
    fn from(range: Range<N>) -> Self {
        Self::StartEnd(range)
    }
}

pub struct Creator<'a, N: DomNode> {
    doc: &'a Document<N>,
    options: &'a XPointerOptions,
}

impl<'a, N: DomNode> Creator<'a, N> {
    pub fn new(doc: &'a Document<N>, options: &'a XPointerOptions) -> Self {
        Self { doc, options }
    }

    pub fn create(&self, selection: &Selection<N>) -> Result<String> {
        let (start, end) = selection.normalized()?;
        for b in [&start, &end] {
            if !self.doc.contains(&b.container) {
                return Err(Error::invalid_argument("selection lies outside the document"));
            }
        }
        let body = if start == end {
            let root = self.doc.document_element()?;
            let tag = self.tag(&root)?;
            debug!("collapsed selection, addressing the whole document");
            format!("/{tag}[1]")
        } else {
            self.range_body(start, end)?
        };
        debug!(address = body.as_str(), "address created");
        Ok(if self.options.wrap_scheme() { format!("xpointer({body})") } else { body })
    }

    fn tag(&self, node: &N) -> Result<String> {
        self.doc.tag_of(node).ok_or_else(|| Error::internal(format!("{:?} node has no tag name", node.kind())))
    }

    fn range_body(&self, start: Boundary<N>, end: Boundary<N>) -> Result<String> {
        let end = Self::skip_marked_end(end)?;
        let start = Self::skip_marked_start(start)?;
        let start = Self::descend_start(start)?;
        let end = Self::descend_end(end)?;
        trace!(start = ?start, end = ?end, "adjusted boundaries");

        match (start.container.is_text(), end.container.is_text()) {
            (true, true) => self.text_to_text(start, end),
            (true, false) => {
                let from = self.text_start(start)?;
                let to = self.child_path(&end_element(&end)?)?;
                Ok(format!("{from}/range-to({to})"))
            }
            (false, true) => {
                let from = self.child_path(&start_element(&start)?)?;
                let (node, offset) = Self::text_end_point(end);
                let to = self.end_point(&node, offset)?;
                Ok(format!("{from}/range-to({to})"))
            }
            (false, false) => {
                let first = start_element(&start)?;
                let last = end_element(&end)?;
                if first == last {
                    return self.child_path(&first);
                }
                Ok(format!("{}/range-to({})", self.child_path(&first)?, self.child_path(&last)?))
            }
        }
    }

    /// An element end boundary after (or inside) ignore-marked nodes moves
    /// before the next unmarked node.
    fn skip_marked_end(end: Boundary<N>) -> Result<Boundary<N>> {
        if !end.container.is_element() {
            return Ok(end);
        }
        let marked = if is_marked_ignore(&end.container) {
            Some(end.container.clone())
        } else {
            end.offset.checked_sub(1).and_then(|i| end.container.child_at(i)).filter(|c| is_marked_ignore(c))
        };
        let Some(marked) = marked else { return Ok(end) };
        match next_unmarked(&marked) {
            Some(n) if n.is_text() => Ok(Boundary::new(n, 0)),
            Some(n) => Boundary::before(&n),
            None => Ok(end),
        }
    }

    /// An element start boundary on (or inside) an ignore-marked node moves to
    /// the next unmarked node.
    fn skip_marked_start(start: Boundary<N>) -> Result<Boundary<N>> {
        if !start.container.is_element() {
            return Ok(start);
        }
        let marked = if is_marked_ignore(&start.container) {
            Some(start.container.clone())
        } else {
            start.container.child_at(start.offset).filter(|c| is_marked_ignore(c))
        };
        let Some(marked) = marked else { return Ok(start) };
        match next_unmarked(&marked) {
            Some(n) if n.is_text() => Ok(Boundary::new(n, 0)),
            Some(n) => Boundary::before(&n),
            None => Ok(start),
        }
    }

    /// Element start boundaries pointing at text become text boundaries;
    /// boundaries past the last child move to the following node.
    fn descend_start(start: Boundary<N>) -> Result<Boundary<N>> {
        if start.container.is_text() {
            return Ok(start);
        }
        let children = start.container.children();
        for child in children.iter().skip(start.offset) {
            match child.kind() {
                NodeKind::Text => return Ok(Boundary::new(child.clone(), 0)),
                NodeKind::Element => return Ok(start),
                _ => {}
            }
        }
        match following_node(&start.container) {
            Some(n) if n.is_text() => Ok(Boundary::new(n, 0)),
            Some(n) => Boundary::before(&n),
            None => Ok(start),
        }
    }

    fn descend_end(end: Boundary<N>) -> Result<Boundary<N>> {
        if end.container.is_text() {
            return Ok(end);
        }
        let children = end.container.children();
        for child in children.iter().take(end.offset).rev() {
            match child.kind() {
                NodeKind::Text => return Ok(Boundary::new(child.clone(), child.char_len())),
                NodeKind::Element => return Ok(end),
                _ => {}
            }
        }
        match preceding_node(&end.container) {
            Some(n) if n.is_text() => {
                let len = n.char_len();
                Ok(Boundary::new(n, len))
            }
            Some(n) => Boundary::after(&n),
            None => Ok(end),
        }
    }

    fn text_to_text(&self, start: Boundary<N>, end: Boundary<N>) -> Result<String> {
        let (anchor, anchor_offset) = Self::text_start_point(start);
        let (focus, focus_offset) = Self::text_end_point(end);
        if compare_boundary_points(&Boundary::new(anchor.clone(), anchor_offset), &Boundary::new(focus.clone(), focus_offset))?
            == Ordering::Greater
        {
            // only invisible text between the points: address the start position
            return self.string_range(&anchor, anchor_offset, &anchor, anchor_offset);
        }
        let above_anchor = self.element_above(&anchor)?;
        let above_focus = self.element_above(&focus)?;
        if anchor == focus || above_anchor == above_focus {
            return self.string_range(&anchor, anchor_offset, &focus, focus_offset);
        }
        let from = self.start_point(&anchor, anchor_offset)?;
        let to = self.end_point(&focus, focus_offset)?;
        Ok(format!("{from}/range-to({to})"))
    }

    /// A start at the very end of its text moves to the next visible text.
    fn text_start_point(start: Boundary<N>) -> (N, usize) {
        if start.offset == start.container.char_len() {
            if let Some(next) = next_visible_text(&start.container) {
                return (next, 0);
            }
        }
        (start.container, start.offset)
    }

    /// An end at offset 0 moves to the end of the previous visible text.
    fn text_end_point(end: Boundary<N>) -> (N, usize) {
        if end.offset == 0 {
            if let Some(prev) = previous_visible_text(&end.container) {
                let len = prev.char_len();
                return (prev, len);
            }
        }
        (end.container, end.offset)
    }

    fn text_start(&self, start: Boundary<N>) -> Result<String> {
        let (node, offset) = Self::text_start_point(start);
        self.start_point(&node, offset)
    }

    fn start_point(&self, node: &N, offset: usize) -> Result<String> {
        let above = self.element_above(node)?;
        let before = self.counted_before(&above, node, offset)?;
        Ok(format!("start-point({})", self.format_string_range(&above, before + 1, 0)?))
    }

    fn end_point(&self, node: &N, offset: usize) -> Result<String> {
        let above = self.element_above(node)?;
        let before = self.counted_before(&above, node, offset)?;
        let inner = if before == 0 {
            self.format_string_range(&above, 1, 0)?
        } else {
            self.format_string_range(&above, before, 1)?
        };
        Ok(format!("end-point({inner})"))
    }

    /// `string-range` over the nearest common addressable element.
    fn string_range(&self, begin: &N, begin_offset: usize, end: &N, end_offset: usize) -> Result<String> {
        let above = self.element_above(begin)?;
        let before = self.counted_before(&above, begin, begin_offset)?;
        let through = self.counted_before(&above, end, end_offset)?;
        self.format_string_range(&above, before + 1, through.saturating_sub(before))
    }

    fn format_string_range(&self, element: &N, start: usize, length: usize) -> Result<String> {
        Ok(format!("string-range({}, \"\", {start}, {length})", self.child_path(element)?))
    }

    /// Nearest ancestor element that is not ignore-marked.
    fn element_above(&self, node: &N) -> Result<N> {
        match effective_parent(node) {
            Some(p) if p.is_element() => Ok(p),
            Some(p) if p.kind() == NodeKind::Document => self.doc.document_element(),
            _ => Err(Error::internal("text node has no addressable element above it")),
        }
    }

    /// Counted characters of `element`'s string-value before `(node, offset)`.
    fn counted_before(&self, element: &N, node: &N, offset: usize) -> Result<usize> {
        let mut stream = CharStream::new(element);
        let mut counter = CollapsedCounter::default();
        let mut current: Option<N> = None;
        let mut seen_target = false;
        loop {
            let c = match stream.next_char() {
                Ok(c) => c,
                Err(EndOfStream) if seen_target => return Ok(counter.count()),
                Err(EndOfStream) => {
                    return if element.is_ancestor_of(node) {
                        Ok(counter.count())
                    } else {
                        Err(Error::internal("boundary lies outside the addressed element"))
                    };
                }
            };
            let text = stream.current_text_node().cloned();
            if text != current {
                if let Some(t) = &text {
                    if seen_target || (t != node && node.compare_document_order(t)? == Ordering::Less) {
                        return Ok(counter.count());
                    }
                }
                current = text;
            }
            if current.as_ref() == Some(node) {
                seen_target = true;
                if stream.last_char_index() == Some(offset) {
                    return Ok(counter.count());
                }
            }
            counter.push(c);
        }
    }

    /// `id("X")`, `/tag[n]/...` from the root, or `id("Y")/tag[n]/...` from an
    /// identified ancestor.
    pub fn child_path(&self, node: &N) -> Result<String> {
        if node.kind() == NodeKind::Document {
            let root = self.doc.document_element()?;
            return Ok(format!("/{}[1]", self.tag(&root)?));
        }
        if self.options.prefer_ids() {
            if let Some(id) = self.id_reference(node) {
                return Ok(id);
            }
        }
        let mut steps = Vec::new();
        let mut prefix = String::new();
        let mut current = node.clone();
        while let Some(parent) = effective_parent(&current) {
            let tag = self.tag(&current)?;
            let doc = self.doc;
            let index = position_among(&parent, &current, |c: &N| c.is_element() && doc.tag_of(c).as_deref() == Some(tag.as_str()))
                .ok_or_else(|| Error::internal(format!("<{tag}> not found among its parent's children")))?;
            steps.push(format!("{tag}[{index}]"));
            if self.options.ancestor_ids() && parent.is_element() {
                if let Some(id) = self.id_reference(&parent) {
                    prefix = id;
                    break;
                }
            }
            current = parent;
        }
        if steps.is_empty() {
            return Err(Error::internal("cannot build a path to a detached node"));
        }
        Ok(format!("{prefix}/{}", steps.iter().rev().join("/")))
    }

    fn id_reference(&self, node: &N) -> Option<String> {
        if !node.is_element() || is_marked_ignore(node) {
            return None;
        }
        let id = node.attribute(None, "id").filter(|id| !id.is_empty())?;
        // the address must find this very element again
        if self.doc.element_by_id(&id).as_ref() != Some(node) {
            return None;
        }
        match (id.contains('"'), id.contains('\'')) {
            (false, _) => Some(format!("id(\"{id}\")")),
            (true, false) => Some(format!("id('{id}')")),
            (true, true) => None,
        }
    }
}

fn start_element<N: DomNode>(start: &Boundary<N>) -> Result<N> {
    start
        .container
        .children()
        .into_iter()
        .skip(start.offset)
        .find(N::is_element)
        .ok_or_else(|| Error::internal("start boundary does not precede an element"))
}

fn end_element<N: DomNode>(end: &Boundary<N>) -> Result<N> {
    end.container
        .children()
        .into_iter()
        .take(end.offset)
        .rev()
        .find(N::is_element)
        .ok_or_else(|| Error::internal("end boundary does not follow an element"))
}
