//! Tree walks shared by the creator and the resolver.
//!
//! Both sides count children through [`SplicedChildren`]; any change to how
//! marked wrappers are skipped must happen here so addresses keep round-tripping.
use crate::chars::is_xpath_whitespace;
use crate::marks::{is_marked, is_marked_ignore};
use crate::model::DomNode;

/// Children of a node with every `transparent` child replaced by its own
/// (recursively spliced) children.
pub struct SplicedChildren<N, F> {
    stack: Vec<std::vec::IntoIter<N>>,
    transparent: F,
}

impl<N: DomNode, F: Fn(&N) -> bool> SplicedChildren<N, F> {
    pub fn new(parent: &N, transparent: F) -> Self {
        Self { stack: vec![parent.children().into_iter()], transparent }
    }
}

impl<N: DomNode, F: Fn(&N) -> bool> Iterator for SplicedChildren<N, F> {
    type Item = N;

    fn next(&mut self) -> Option<N> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(n) if (self.transparent)(&n) => self.stack.push(n.children().into_iter()),
                Some(n) => return Some(n),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Children as seen by address arithmetic: ignore-marked elements are spliced away.
pub fn spliced_children<N: DomNode>(parent: &N) -> SplicedChildren<N, fn(&N) -> bool> {
    SplicedChildren::new(parent, is_marked_ignore::<N> as fn(&N) -> bool)
}

/// Outcome of an nth-child search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildSearch<N> {
    Found(N),
    /// Not enough matches; carries how many were seen.
    Count(usize),
}

/// The `n`-th (1-based) spliced child of `parent` accepted by `matches`.
pub fn nth_matching_child<N, P>(parent: &N, n: usize, mut matches: P) -> ChildSearch<N>
where
    N: DomNode,
    P: FnMut(&N) -> bool,
{
    let mut seen = 0usize;
    for child in spliced_children(parent) {
        if matches(&child) {
            seen += 1;
            if seen == n {
                return ChildSearch::Found(child);
            }
        }
    }
    ChildSearch::Count(seen)
}

/// 1-based position of `node` among the spliced children of `parent` accepted by `matches`.
pub fn position_among<N, P>(parent: &N, node: &N, mut matches: P) -> Option<usize>
where
    N: DomNode,
    P: FnMut(&N) -> bool,
{
    let mut seen = 0usize;
    for child in spliced_children(parent) {
        if matches(&child) {
            seen += 1;
        }
        if &child == node {
            return (seen > 0).then_some(seen);
        }
    }
    None
}

/// Nearest ancestor that is not ignore-marked.
pub fn effective_parent<N: DomNode>(node: &N) -> Option<N> {
    let mut p = node.parent()?;
    while is_marked_ignore(&p) {
        p = p.parent()?;
    }
    Some(p)
}

/// Next sibling of `node` or of its nearest ancestor that has one.
pub fn following_node<N: DomNode>(node: &N) -> Option<N> {
    let mut n = node.clone();
    loop {
        if let Some(s) = n.next_sibling() {
            return Some(s);
        }
        n = n.parent()?;
    }
}

/// Previous sibling of `node` or of its nearest ancestor that has one.
pub fn preceding_node<N: DomNode>(node: &N) -> Option<N> {
    let mut n = node.clone();
    loop {
        if let Some(s) = n.previous_sibling() {
            return Some(s);
        }
        n = n.parent()?;
    }
}

fn next_in_order<N: DomNode>(node: &N) -> Option<N> {
    node.child_at(0).or_else(|| following_node(node))
}

fn previous_in_order<N: DomNode>(node: &N) -> Option<N> {
    match node.previous_sibling() {
        Some(mut n) => {
            while let Some(last) = n.children().pop() {
                n = last;
            }
            Some(n)
        }
        None => node.parent(),
    }
}

fn is_visible_text<N: DomNode>(node: &N) -> bool {
    node.is_text() && node.char_len() > 0 && !node.parent().is_some_and(|p| is_marked(&p))
}

/// Next non-empty text node after `node` whose parent carries no mark.
pub fn next_visible_text<N: DomNode>(node: &N) -> Option<N> {
    let mut n = following_or_descendant(node)?;
    loop {
        if is_visible_text(&n) {
            return Some(n);
        }
        n = next_in_order(&n)?;
    }
}

fn following_or_descendant<N: DomNode>(node: &N) -> Option<N> {
    if node.is_text() { following_node(node) } else { next_in_order(node) }
}

/// Previous non-empty text node before `node` whose parent carries no mark.
pub fn previous_visible_text<N: DomNode>(node: &N) -> Option<N> {
    let mut n = previous_in_order(node)?;
    loop {
        if is_visible_text(&n) {
            return Some(n);
        }
        n = previous_in_order(&n)?;
    }
}

pub fn is_blank_text<N: DomNode>(node: &N) -> bool {
    node.is_text() && node.value().unwrap_or_default().chars().all(is_xpath_whitespace)
}

/// First node at or after `node` that is neither ignore-marked nor blank text,
/// descending into the first children of whatever follows.
pub fn next_unmarked<N: DomNode>(node: &N) -> Option<N> {
    let mut n = node.clone();
    while is_marked_ignore(&n) || is_blank_text(&n) {
        n = following_node(&n)?;
        while let Some(first) = n.child_at(0) {
            n = first;
        }
    }
    Some(n)
}
