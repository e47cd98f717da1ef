use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use xpointer::lexer::Lexer;
use xpointer::simple_node::{attr, doc as simple_doc, elem, text};
use xpointer::{Document, DomNode, Selection, SimpleNode, XPointerService};

fn build_sample_document() -> SimpleNode {
    let mut body = elem("body");
    for i in 0..50 {
        let mut section = elem("section");
        if i % 5 == 0 {
            section = section.attr(attr("id", &format!("section-{i}")));
        }
        for j in 0..20 {
            section = section.child(
                elem("p")
                    .child(text(&format!("Paragraph {j} of section {i}, with  some   spacing ")))
                    .child(elem("b").child(text("bold")))
                    .child(text(" and a tail.")),
            );
        }
        body = body.child(section);
    }
    simple_doc().child(elem("html").child(body)).build()
}

fn sample_addresses() -> Vec<&'static str> {
    vec![
        r#"xpointer(string-range(id("section-10")/p[3]/b[1], "", 1, 4))"#,
        r#"xpointer(string-range(/html[1]/body[1]/section[48]/p[20], "", 12, 30))"#,
        r#"xpointer(start-point(string-range(/html[1]/body[1]/section[2]/p[1], "", 3, 0))/range-to(end-point(string-range(/html[1]/body[1]/section[7]/p[19], "", 20, 1))))"#,
        "section-25/10/1",
        r#"foo(skip^)me)xpointer(id("section-45"))"#,
    ]
}

fn benchmark_lexer(c: &mut Criterion) {
    let addresses = sample_addresses();
    c.bench_function("lexer/tokenize", |b| {
        b.iter(|| {
            for a in &addresses {
                let count = Lexer::new(black_box(a)).take_while(Result::is_ok).count();
                black_box(count);
            }
        })
    });
}

fn benchmark_creator(c: &mut Criterion) {
    let root = build_sample_document();
    let document = Document::new(root.clone());
    let service = XPointerService::new();
    let body = root.children()[0].children()[0].clone();
    let text_at = |section: usize, p: usize| body.children()[section].children()[p].children()[0].clone();

    let selections = vec![
        ("same text", Selection::anchor_focus(text_at(10, 2), 2, text_at(10, 2), 9)),
        ("across sections", Selection::anchor_focus(text_at(3, 0), 5, text_at(41, 19), 4)),
        ("backwards", Selection::anchor_focus(text_at(30, 7), 4, text_at(29, 1), 1)),
    ];

    let mut group = c.benchmark_group("creator/create_address");
    for (name, selection) in &selections {
        group.bench_with_input(BenchmarkId::from_parameter(name), selection, |b, sel| {
            b.iter(|| {
                let address = service.create_address(black_box(sel), &document).expect("create failure");
                black_box(address);
            });
        });
    }
    group.finish();
}

fn benchmark_resolver(c: &mut Criterion) {
    let document = Document::new(build_sample_document());
    let service = XPointerService::new();

    let mut group = c.benchmark_group("resolver/resolve_address");
    for address in sample_addresses() {
        group.bench_with_input(BenchmarkId::from_parameter(address), address, |b, a| {
            b.iter(|| {
                let range = service.resolve_address(black_box(a), &document).expect("resolve failure");
                black_box(range);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_lexer, benchmark_creator, benchmark_resolver);
criterion_main!(benches);
