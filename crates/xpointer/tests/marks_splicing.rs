use rstest::{fixture, rstest};
use xpointer::marks::{
    HIDE_ATTRIBUTE, MARK_NAMESPACE, create_marked_element, insert_marked_at, is_marked, is_marked_hide,
    is_marked_ignore, mark_hide, wrap_with_marked,
};
use xpointer::range::Boundary;
use xpointer::simple_node::{SimpleNode, attr, doc, elem, text};
use xpointer::traverse::{ChildSearch, nth_matching_child, spliced_children};
use xpointer::{Document, DomMut, DomNode, ErrorKind, Selection, create_address, resolve_address};

fn at(root: &SimpleNode, path: &[usize]) -> SimpleNode {
    path.iter().fold(root.clone(), |n, &i| n.children()[i].clone())
}

// <html><body><div id="d1"><p>Hello <b>world</b></p></div><p>tail</p></body></html>
#[fixture]
fn sample() -> SimpleNode {
    doc()
        .child(
            elem("html").child(
                elem("body")
                    .child(
                        elem("div")
                            .attr(attr("id", "d1"))
                            .child(elem("p").child(text("Hello ")).child(elem("b").child(text("world")))),
                    )
                    .child(elem("p").child(text("tail"))),
            ),
        )
        .build()
}

#[rstest]
fn marked_elements_carry_both_flags() {
    let span: SimpleNode = create_marked_element("span");
    assert!(is_marked_ignore(&span));
    assert!(is_marked_hide(&span));
    assert_eq!(span.attribute(Some(MARK_NAMESPACE), HIDE_ATTRIBUTE).as_deref(), Some("true"));

    let plain = elem("span").build();
    assert!(!is_marked(&plain));
    mark_hide(&plain);
    assert!(is_marked(&plain));
    assert!(!is_marked_ignore(&plain));
}

#[rstest]
fn marks_need_the_mark_namespace() {
    let fake = elem("span").attr(attr(HIDE_ATTRIBUTE, "true")).build();
    assert!(!is_marked(&fake));
}

#[rstest]
fn wrapping_keeps_the_node_in_place(sample: SimpleNode) {
    let p = at(&sample, &[0, 0, 0, 0]);
    let b = at(&p, &[1]);
    let wrapper = wrap_with_marked(&b, "span").unwrap();
    assert_eq!(p.children().len(), 2);
    assert_eq!(p.children()[1], wrapper);
    assert_eq!(b.parent(), Some(wrapper));
    assert_eq!(spliced_children(&p).collect::<Vec<_>>(), vec![at(&p, &[0]), b.clone()]);
    assert_eq!(nth_matching_child(&p, 1, SimpleNode::is_element), ChildSearch::Found(b));
}

#[rstest]
fn wrapping_a_root_fails(sample: SimpleNode) {
    assert_eq!(wrap_with_marked(&sample, "span").unwrap_err().kind(), ErrorKind::InvalidArgument);
}

#[rstest]
fn marker_insertion_needs_text(sample: SimpleNode) {
    let p = at(&sample, &[0, 0, 0, 0]);
    assert_eq!(insert_marked_at(&p, 0, "span").unwrap_err().kind(), ErrorKind::InvalidArgument);
}

#[rstest]
fn marker_insertion_splits_the_text(sample: SimpleNode) {
    let p = at(&sample, &[0, 0, 0, 0]);
    let hello = at(&p, &[0]);
    let marker = insert_marked_at(&hello, 3, "span").unwrap();
    assert_eq!(hello.value().as_deref(), Some("Hel"));
    assert_eq!(p.children()[1], marker);
    assert_eq!(p.children()[2].value().as_deref(), Some("lo "));
    assert_eq!(p.string_value(), "Hello world");
}

#[rstest]
fn address_survives_wrapping(sample: SimpleNode) {
    let document = Document::new(sample.clone());
    let world = at(&sample, &[0, 0, 0, 0, 1, 0]);
    let address = create_address(&Selection::anchor_focus(world.clone(), 0, world.clone(), 5), &document).unwrap();

    let b = at(&sample, &[0, 0, 0, 0, 1]);
    wrap_with_marked(&b, "b").unwrap();
    wrap_with_marked(&at(&sample, &[0, 0, 0, 0, 0]), "b").unwrap();

    let range = resolve_address(&address, &document).unwrap();
    assert_eq!(range.text().unwrap(), "world");
    assert_eq!(range.start(), &Boundary::new(world, 0));

    // the decorated tree produces the same address again
    let again = create_address(&Selection::from(range), &document).unwrap();
    assert_eq!(again, address);
}

#[rstest]
fn address_survives_marker_insertion(sample: SimpleNode) {
    let document = Document::new(sample.clone());
    let hello = at(&sample, &[0, 0, 0, 0, 0]);
    let world = at(&sample, &[0, 0, 0, 0, 1, 0]);
    let address = create_address(&Selection::anchor_focus(hello.clone(), 1, world.clone(), 3), &document).unwrap();

    let marker = insert_marked_at(&hello, 3, "span").unwrap();
    marker.append_child(&text("[1]")).unwrap();
    let sup = insert_marked_at(&world, 2, "sup").unwrap();
    sup.append_child(&text("*")).unwrap();

    let range = resolve_address(&address, &document).unwrap();
    assert_eq!(range.start(), &Boundary::new(hello, 1));
    let rld = at(&sample, &[0, 0, 0, 0, 3, 2]);
    assert_eq!(rld.value().as_deref(), Some("rld"));
    assert_eq!(range.end(), &Boundary::new(rld, 1));
}

#[rstest]
fn decorated_text_yields_undecorated_offsets(sample: SimpleNode) {
    let document = Document::new(sample.clone());
    let world = at(&sample, &[0, 0, 0, 0, 1, 0]);
    let sup = insert_marked_at(&world, 2, "sup").unwrap();
    sup.append_child(&text("12")).unwrap();

    let rld = at(&sample, &[0, 0, 0, 0, 1, 2]);
    let address = create_address(&Selection::anchor_focus(rld.clone(), 0, rld, 3), &document).unwrap();
    assert_eq!(address, r#"xpointer(string-range(id("d1")/p[1]/b[1], "", 3, 3))"#);
}

#[rstest]
fn selection_ending_after_a_marker_skips_it(sample: SimpleNode) {
    let document = Document::new(sample.clone());
    let body = at(&sample, &[0, 0]);
    let marker: SimpleNode = create_marked_element("span");
    body.insert_before(&marker, Some(&at(&body, &[1]))).unwrap();

    let div = at(&body, &[0]);
    let range = xpointer::Range::new(Boundary::new(body.clone(), 0), Boundary::new(body, 2)).unwrap();
    let address = xpointer::create_address_from_range(&range, &document).unwrap();
    assert!(address.starts_with(r#"xpointer(id("d1")"#), "{address}");
    let resolved = resolve_address(&address, &document).unwrap();
    assert_eq!(resolved.start(), &Boundary::before(&div).unwrap());
}
