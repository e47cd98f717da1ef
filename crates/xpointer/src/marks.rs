//! Out-of-band flags shared with the decoration layer.
//!
//! An element marked *ignore* is transparent to address arithmetic: it is never
//! counted or named, but its children are spliced into its parent's child list.
//! An element marked *hide* contributes no characters to string-values.
//! Every node the decoration layer inserts must go through [`create_marked_element`].
use crate::error::{Error, Result};
use crate::model::{DomMut, DomNode};

pub const MARK_NAMESPACE: &str = "http://xpointerlib.mozdev.org/xptr-ns#";
pub const IGNORE_ATTRIBUTE: &str = "_dom_ignore_element_";
pub const HIDE_ATTRIBUTE: &str = "_dom_hide_element_";
const MARK_VALUE: &str = "true";

fn has_mark<N: DomNode>(node: &N, attribute: &str) -> bool {
    node.is_element() && node.attribute(Some(MARK_NAMESPACE), attribute).as_deref() == Some(MARK_VALUE)
}

pub fn is_marked_ignore<N: DomNode>(node: &N) -> bool {
    has_mark(node, IGNORE_ATTRIBUTE)
}

pub fn is_marked_hide<N: DomNode>(node: &N) -> bool {
    has_mark(node, HIDE_ATTRIBUTE)
}

/// Either mark; such an element's own text is not part of any string-value.
pub fn is_marked<N: DomNode>(node: &N) -> bool {
    is_marked_ignore(node) || is_marked_hide(node)
}

pub fn mark_ignore<N: DomMut>(node: &N) {
    node.set_attribute(Some(MARK_NAMESPACE), IGNORE_ATTRIBUTE, MARK_VALUE);
}

pub fn mark_hide<N: DomMut>(node: &N) {
    node.set_attribute(Some(MARK_NAMESPACE), HIDE_ATTRIBUTE, MARK_VALUE);
}

/// The single creation path for decoration: a new element carrying both marks.
pub fn create_marked_element<N: DomMut>(tag: &str) -> N {
    let node = N::create_element(tag);
    mark_ignore(&node);
    mark_hide(&node);
    node
}

/// Put `node` inside a new marked `tag` element that takes its place in the tree.
pub fn wrap_with_marked<N: DomMut>(node: &N, tag: &str) -> Result<N> {
    let parent = node.parent().ok_or_else(|| Error::invalid_argument("cannot wrap a node without parent"))?;
    let wrapper: N = create_marked_element(tag);
    parent.insert_before(&wrapper, Some(node))?;
    wrapper.append_child(node)?;
    Ok(wrapper)
}

/// Split `text` at `offset` and insert a new marked `tag` element at the split point.
pub fn insert_marked_at<N: DomMut>(text: &N, offset: usize, tag: &str) -> Result<N> {
    if !text.is_text() {
        return Err(Error::invalid_argument("marker insertion needs a text node"));
    }
    let parent = text.parent().ok_or_else(|| Error::invalid_argument("text node has no parent"))?;
    let tail = text.split_text(offset)?;
    let marker: N = create_marked_element(tag);
    parent.insert_before(&marker, Some(&tail))?;
    Ok(marker)
}
