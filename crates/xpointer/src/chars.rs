//! Character-level view of a subtree's string-value.
use crate::error::EndOfStream;
use crate::marks::is_marked;
use crate::model::{DomNode, NodeKind};

/// XML/XPath whitespace: space, tab, carriage return, line feed.
pub fn is_xpath_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Counts characters the way `string-range` offsets are measured: leading
/// whitespace is not counted and each whitespace run counts as one character.
///
/// The creator and the resolver must both count through this type.
#[derive(Debug, Clone, Copy)]
pub struct CollapsedCounter {
    in_whitespace: bool,
    count: usize,
}

impl Default for CollapsedCounter {
    fn default() -> Self {
        Self { in_whitespace: true, count: 0 }
    }
}

impl CollapsedCounter {
    /// Feed the next character; returns whether it was counted.
    pub fn push(&mut self, c: char) -> bool {
        let ws = is_xpath_whitespace(c);
        let counted = !(ws && self.in_whitespace);
        self.in_whitespace = ws;
        if counted {
            self.count += 1;
        }
        counted
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

/// Streams the characters of a subtree's text nodes in document order,
/// skipping text whose parent element is marked.
///
/// After each [`next_char`](Self::next_char) the stream knows which text node
/// and which character index the returned character came from.
#[derive(Debug)]
pub struct CharStream<N: DomNode> {
    pending: Vec<N>,
    current: Option<N>,
    chars: Vec<char>,
    next: usize,
    last_index: Option<usize>,
    begin: Option<N>,
}

impl<N: DomNode> CharStream<N> {
    pub fn new(root: &N) -> Self {
        Self { pending: vec![root.clone()], current: None, chars: Vec::new(), next: 0, last_index: None, begin: None }
    }

    pub fn next_char(&mut self) -> Result<char, EndOfStream> {
        loop {
            if let Some(&c) = self.chars.get(self.next) {
                self.last_index = Some(self.next);
                self.next += 1;
                return Ok(c);
            }
            self.advance()?;
        }
    }

    fn advance(&mut self) -> Result<(), EndOfStream> {
        while let Some(n) = self.pending.pop() {
            match n.kind() {
                NodeKind::Text if !n.parent().is_some_and(|p| is_marked(&p)) => {
                    self.chars = n.value().unwrap_or_default().chars().collect();
                    self.next = 0;
                    self.last_index = None;
                    if self.begin.is_none() {
                        self.begin = Some(n.clone());
                    }
                    self.current = Some(n);
                    return Ok(());
                }
                NodeKind::Element | NodeKind::Document => {
                    let mut children = n.children();
                    children.reverse();
                    self.pending.extend(children);
                }
                _ => {}
            }
        }
        Err(EndOfStream)
    }

    /// Text node the last character came from, or the most recently entered one.
    pub fn current_text_node(&self) -> Option<&N> {
        self.current.as_ref()
    }

    /// Index of the last returned character within [`current_text_node`](Self::current_text_node).
    pub fn last_char_index(&self) -> Option<usize> {
        self.last_index
    }

    /// First text node the stream entered.
    pub fn begin_text_node(&self) -> Option<&N> {
        self.begin.as_ref()
    }
}
