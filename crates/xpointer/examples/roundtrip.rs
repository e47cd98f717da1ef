use xpointer::marks::{insert_marked_at, wrap_with_marked};
use xpointer::simple_node::{attr, doc, elem, text};
use xpointer::{Document, DomNode, Selection, XPointerService};

fn main() -> Result<(), xpointer::Error> {
    let root = doc()
        .child(
            elem("html").child(
                elem("body")
                    .child(
                        elem("div")
                            .attr(attr("id", "intro"))
                            .child(elem("p").child(text("Hello ")).child(elem("b").child(text("world")))),
                    )
                    .child(elem("p").child(text("Another   paragraph with spacing."))),
            ),
        )
        .build();
    let document = Document::new(root.clone());
    let service = XPointerService::new();

    let body = root.children()[0].children()[0].clone();
    let hello = body.children()[0].children()[0].children()[0].clone();
    let another = body.children()[1].children()[0].clone();

    let selection = Selection::anchor_focus(hello.clone(), 2, another, 12);
    let address = service.create_address(&selection, &document)?;
    println!("address:  {address}");
    println!("selected: {:?}", service.resolve_address(&address, &document)?.text()?);

    // decorate the document the way a highlighter would
    wrap_with_marked(&body.children()[1], "span")?;
    insert_marked_at(&hello, 3, "sup")?;

    let range = service.resolve_address(&address, &document)?;
    println!("after decoration: {:?}", range.text()?);
    println!("start element: {:?}", service.resolve_element(&address, &document)?.tag_name());
    Ok(())
}
