use core::cmp::Ordering;

use rstest::{fixture, rstest};
use xpointer::range::{Boundary, Range, compare_boundary_points};
use xpointer::simple_node::{SimpleNode, attr, comment, doc, elem, ns_attr, text};
use xpointer::{DomMut, DomNode, ErrorKind, NodeKind};

fn at(root: &SimpleNode, path: &[usize]) -> SimpleNode {
    path.iter().fold(root.clone(), |n, &i| n.children()[i].clone())
}

// <r><a>one<c/></a><!--x--><b id="b">two</b></r>
#[fixture]
fn root() -> SimpleNode {
    doc()
        .child(
            elem("r")
                .child(elem("a").child(text("one")).child(elem("c")))
                .child(comment("x"))
                .child(elem("b").attr(attr("id", "b")).child(text("two"))),
        )
        .build()
}

#[rstest]
fn builder_links_parents(root: SimpleNode) {
    let a = at(&root, &[0, 0]);
    assert_eq!(a.parent(), Some(at(&root, &[0])));
    assert_eq!(a.kind(), NodeKind::Element);
    assert_eq!(a.tag_name().as_deref(), Some("a"));
    assert_eq!(at(&root, &[0, 1]).kind(), NodeKind::Comment);
    assert_eq!(at(&root, &[0]).string_value(), "onetwo");
    assert_eq!(at(&root, &[0, 2]).child_index(), Some(2));
}

#[rstest]
fn attributes_are_namespace_aware() {
    let e = elem("e").attr(attr("id", "x")).attr(ns_attr("urn:n", "id", "y")).build();
    assert_eq!(e.attribute(None, "id").as_deref(), Some("x"));
    assert_eq!(e.attribute(Some("urn:n"), "id").as_deref(), Some("y"));
    assert_eq!(e.attribute(Some("urn:other"), "id"), None);
    e.set_attribute(Some("urn:n"), "id", "z");
    assert_eq!(e.attribute(Some("urn:n"), "id").as_deref(), Some("z"));
}

#[rstest]
fn document_order_by_ancestry(root: SimpleNode) {
    let one = at(&root, &[0, 0, 0]);
    let c = at(&root, &[0, 0, 1]);
    let b = at(&root, &[0, 2]);
    assert_eq!(one.compare_document_order(&c).unwrap(), Ordering::Less);
    assert_eq!(b.compare_document_order(&one).unwrap(), Ordering::Greater);
    assert_eq!(at(&root, &[0]).compare_document_order(&c).unwrap(), Ordering::Less);
    assert_eq!(c.compare_document_order(&c).unwrap(), Ordering::Equal);
}

#[rstest]
fn document_order_across_trees_fails(root: SimpleNode) {
    let other = elem("x").build();
    let err = at(&root, &[0]).compare_document_order(&other).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[rstest]
fn insert_before_moves_nodes(root: SimpleNode) {
    let r = at(&root, &[0]);
    let a = at(&root, &[0, 0]);
    let b = at(&root, &[0, 2]);
    r.insert_before(&b, Some(&a)).unwrap();
    assert_eq!(r.children()[0], b);
    assert_eq!(r.children()[1], a);
    assert_eq!(r.children().len(), 3);

    let fresh = SimpleNode::create_element("n");
    r.append_child(&fresh).unwrap();
    assert_eq!(r.children().last(), Some(&fresh));
    assert_eq!(fresh.parent(), Some(r.clone()));

    r.remove_child(&fresh).unwrap();
    assert_eq!(fresh.parent(), None);
    assert_eq!(r.remove_child(&fresh).unwrap_err().kind(), ErrorKind::InvalidArgument);
}

#[rstest]
fn cannot_insert_into_own_subtree(root: SimpleNode) {
    let r = at(&root, &[0]);
    let a = at(&root, &[0, 0]);
    assert_eq!(a.insert_before(&r, None).unwrap_err().kind(), ErrorKind::InvalidArgument);
}

#[rstest]
fn split_text_inserts_the_tail(root: SimpleNode) {
    let one = at(&root, &[0, 0, 0]);
    let tail = one.split_text(1).unwrap();
    assert_eq!(one.value().as_deref(), Some("o"));
    assert_eq!(tail.value().as_deref(), Some("ne"));
    assert_eq!(at(&root, &[0, 0, 1]), tail);
    assert_eq!(at(&root, &[0, 0]).string_value(), "one");
    assert_eq!(one.split_text(5).unwrap_err().kind(), ErrorKind::InvalidArgument);
}

#[rstest]
fn boundary_point_comparison(root: SimpleNode) {
    let r = at(&root, &[0]);
    let a = at(&root, &[0, 0]);
    let one = at(&root, &[0, 0, 0]);
    let two = at(&root, &[0, 2, 0]);
    let cmp = |x: Boundary<SimpleNode>, y: Boundary<SimpleNode>| compare_boundary_points(&x, &y).unwrap();

    assert_eq!(cmp(Boundary::new(one.clone(), 1), Boundary::new(one.clone(), 2)), Ordering::Less);
    assert_eq!(cmp(Boundary::new(one.clone(), 3), Boundary::new(two.clone(), 0)), Ordering::Less);
    // (r, 1) lies after everything inside <a>
    assert_eq!(cmp(Boundary::new(r.clone(), 1), Boundary::new(one.clone(), 3)), Ordering::Greater);
    assert_eq!(cmp(Boundary::new(r.clone(), 0), Boundary::new(one.clone(), 0)), Ordering::Less);
    assert_eq!(cmp(Boundary::new(a, 0), Boundary::new(one, 0)), Ordering::Less);
    assert_eq!(cmp(Boundary::new(two, 0), Boundary::new(r, 2)), Ordering::Greater);
}

#[rstest]
fn range_text_and_collapse(root: SimpleNode) {
    let one = at(&root, &[0, 0, 0]);
    let two = at(&root, &[0, 2, 0]);
    let mut range = Range::new(Boundary::new(one.clone(), 1), Boundary::new(two.clone(), 2)).unwrap();
    assert_eq!(range.text().unwrap(), "netw");

    range.set_end(Boundary::new(one.clone(), 0)).unwrap();
    assert!(range.is_collapsed());
    assert_eq!(range.start(), &Boundary::new(one.clone(), 0));

    let reversed = Range::new(Boundary::new(two, 1), Boundary::new(one.clone(), 1)).unwrap();
    assert!(reversed.is_collapsed());

    assert_eq!(Range::new(Boundary::new(one, 4), Boundary::new(at(&root, &[0]), 0)).unwrap_err().kind(), ErrorKind::InvalidArgument);
}

#[rstest]
fn select_node_and_contents(root: SimpleNode) {
    let b = at(&root, &[0, 2]);
    let range = Range::select_node(&b).unwrap();
    assert_eq!(range.start(), &Boundary::new(at(&root, &[0]), 2));
    assert_eq!(range.end(), &Boundary::new(at(&root, &[0]), 3));
    assert_eq!(range.text().unwrap(), "two");

    let inner = Range::select_node_contents(&at(&root, &[0, 0]));
    assert_eq!(inner.text().unwrap(), "one");
    assert_eq!(Range::select_node(&root).unwrap_err().kind(), ErrorKind::InvalidArgument);
}
