//! DOM Range semantics over [`DomNode`] trees.
//!
//! A boundary point is a `(container, offset)` pair. In text-like containers the
//! offset counts characters; in elements and documents it counts children.
use core::cmp::Ordering;

use crate::error::{Error, Result};
use crate::model::{DomNode, NodeKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary<N: DomNode> {
    pub container: N,
    pub offset: usize,
}

impl<N: DomNode> Boundary<N> {
    pub fn new(container: N, offset: usize) -> Self {
        Self { container, offset }
    }

    /// The point immediately before `node` in its parent.
    pub fn before(node: &N) -> Result<Self> {
        let (parent, index) = parent_and_index(node)?;
        Ok(Self::new(parent, index))
    }

    /// The point immediately after `node` in its parent.
    pub fn after(node: &N) -> Result<Self> {
        let (parent, index) = parent_and_index(node)?;
        Ok(Self::new(parent, index + 1))
    }

    pub fn check(&self) -> Result<()> {
        let len = self.container.char_len();
        if self.offset > len {
            return Err(Error::invalid_argument(format!("offset {} exceeds node length {len}", self.offset)));
        }
        Ok(())
    }
}

fn parent_and_index<N: DomNode>(node: &N) -> Result<(N, usize)> {
    let parent = node.parent().ok_or_else(|| Error::invalid_argument("node has no parent"))?;
    let index = node.child_index().ok_or_else(|| Error::internal("node is missing from its parent's child list"))?;
    Ok((parent, index))
}

/// Position of boundary `a` relative to boundary `b`.
pub fn compare_boundary_points<N: DomNode>(a: &Boundary<N>, b: &Boundary<N>) -> Result<Ordering> {
    if a.container == b.container {
        return Ok(a.offset.cmp(&b.offset));
    }
    if a.container.compare_document_order(&b.container)? == Ordering::Greater {
        return compare_boundary_points(b, a).map(Ordering::reverse);
    }
    if a.container.is_ancestor_of(&b.container) {
        let mut child = b.container.clone();
        while child.parent().as_ref() != Some(&a.container) {
            child = child.parent().ok_or_else(|| Error::internal("ancestor chain ended early"))?;
        }
        let index = child.child_index().ok_or_else(|| Error::internal("node is missing from its parent"))?;
        if index < a.offset {
            return Ok(Ordering::Greater);
        }
    }
    Ok(Ordering::Less)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range<N: DomNode> {
    start: Boundary<N>,
    end: Boundary<N>,
}

impl<N: DomNode> Range<N> {
    /// Build a range; an end before the start collapses the range to the start.
    pub fn new(start: Boundary<N>, end: Boundary<N>) -> Result<Self> {
        start.check()?;
        end.check()?;
        if compare_boundary_points(&start, &end)? == Ordering::Greater {
            return Ok(Self::collapsed(start));
        }
        Ok(Self { start, end })
    }

    pub fn collapsed(point: Boundary<N>) -> Self {
        Self { start: point.clone(), end: point }
    }

    /// Range around `node`, bounded by its parent.
    pub fn select_node(node: &N) -> Result<Self> {
        Ok(Self { start: Boundary::before(node)?, end: Boundary::after(node)? })
    }

    pub fn select_node_contents(node: &N) -> Self {
        Self { start: Boundary::new(node.clone(), 0), end: Boundary::new(node.clone(), node.char_len()) }
    }

    pub fn start(&self) -> &Boundary<N> {
        &self.start
    }

    pub fn end(&self) -> &Boundary<N> {
        &self.end
    }

    pub fn into_bounds(self) -> (Boundary<N>, Boundary<N>) {
        (self.start, self.end)
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    pub fn collapse(&mut self, to_start: bool) {
        if to_start {
            self.end = self.start.clone();
        } else {
            self.start = self.end.clone();
        }
    }

    /// Move the end; a point before the start collapses the range there instead.
    pub fn set_end(&mut self, end: Boundary<N>) -> Result<()> {
        end.check()?;
        if compare_boundary_points(&end, &self.start)? == Ordering::Less {
            self.start = end.clone();
        }
        self.end = end;
        Ok(())
    }

    /// Move the start; a point after the end collapses the range there instead.
    pub fn set_start(&mut self, start: Boundary<N>) -> Result<()> {
        start.check()?;
        if compare_boundary_points(&start, &self.end)? == Ordering::Greater {
            self.end = start.clone();
        }
        self.start = start;
        Ok(())
    }

    /// Text of all text nodes between the boundaries (`Range.toString()`).
    pub fn text(&self) -> Result<String> {
        let root = self.start.container.ancestors_and_self().swap_remove(0);
        let mut out = String::new();
        let mut stack = vec![root];
        while let Some(n) = stack.pop() {
            match n.kind() {
                NodeKind::Text => {
                    let len = n.char_len();
                    let begin = if n == self.start.container {
                        self.start.offset
                    } else if compare_boundary_points(&Boundary::new(n.clone(), 0), &self.start)? != Ordering::Less {
                        0
                    } else {
                        continue;
                    };
                    let finish = if n == self.end.container {
                        self.end.offset
                    } else if compare_boundary_points(&Boundary::new(n.clone(), len), &self.end)? != Ordering::Greater {
                        len
                    } else {
                        continue;
                    };
                    if begin < finish {
                        let data = n.value().unwrap_or_default();
                        out.extend(data.chars().skip(begin).take(finish - begin));
                    }
                }
                NodeKind::Element | NodeKind::Document => {
                    let mut children = n.children();
                    children.reverse();
                    stack.extend(children);
                }
                _ => {}
            }
        }
        Ok(out)
    }
}
