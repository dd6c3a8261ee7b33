// SPDX-License-Identifier: PMPL-1.0-or-later
//! Performance benchmarks for frame loading and rule matching

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Map, Value};

use termview_frame::{ClassFrame, Effects, FrameId, FrameTree, FrameType, Schema};
use termview_rules::{FrameFilter, FramePattern, FrameRule, Scope, WoqlRule};

fn person_schema() -> Schema {
    let mut schema = Schema::new();
    schema.insert(ClassFrame::new("scm:Person", "scm:name", "xsd:string", FrameType::Datatype));
    schema.insert(ClassFrame::new("scm:Person", "scm:age", "xsd:integer", FrameType::Datatype));
    schema.insert(ClassFrame::new("scm:Person", "scm:nick", "xsd:string", FrameType::Datatype));
    schema.insert(ClassFrame::new("scm:Person", "scm:friend", "scm:Person", FrameType::Document));
    schema
}

fn person(i: usize, nicks: usize) -> Value {
    json!({
        "@id": format!("doc:person-{i}"),
        "@type": "scm:Person",
        "scm:name": {"@value": format!("Person {i}"), "@type": "xsd:string"},
        "scm:age": {"@value": i % 90, "@type": "xsd:integer"},
        "scm:nick": (0..nicks).map(|n| json!({"@value": format!("nick-{n}"), "@type": "xsd:string"})).collect::<Vec<_>>(),
        "scm:friend": {"@id": format!("doc:person-{}", i + 1)}
    })
}

fn loaded(docs: usize) -> (FrameTree, Vec<FrameId>) {
    let mut tree = FrameTree::with_schema(person_schema());
    let roots = (0..docs)
        .map(|i| {
            let root = tree.new_object("scm:Person", None);
            tree.load_jsonld_document(root, &person(i, 3)).unwrap();
            root
        })
        .collect();
    (tree, roots)
}

fn frame_rules() -> Vec<FrameRule> {
    vec![
        FrameRule::new(FramePattern::new().scope(Scope::Object)).with_effects(Effects::new().collapse(false)),
        FrameRule::new(FramePattern::new().scope(Scope::Data).property(["scm:age"]))
            .with_effects(Effects::new().renderer("Number")),
        FrameRule::new(FramePattern::new().scope(Scope::Data).label(["/^nick"]))
            .with_effects(Effects::new().hidden(true)),
        FrameRule::new(FramePattern::new().scope(Scope::Data).depth(">0"))
            .with_effects(Effects::new().color([255, 0, 0])),
    ]
}

// ============================================================================
// Frame Model Benchmarks
// ============================================================================

fn bench_load_document(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");

    for nicks in [1usize, 10, 100] {
        let doc = person(1, nicks);
        group.bench_with_input(BenchmarkId::new("load_document", nicks), &doc, |b, doc| {
            b.iter(|| {
                let mut tree = FrameTree::with_schema(person_schema());
                let root = tree.new_object("scm:Person", None);
                tree.load_jsonld_document(root, black_box(doc)).unwrap();
                black_box(tree.len())
            });
        });
    }

    group.finish();
}

fn bench_extract_document(c: &mut Criterion) {
    let (tree, roots) = loaded(100);

    let mut group = c.benchmark_group("frame");
    group.throughput(Throughput::Elements(roots.len() as u64));

    group.bench_function("extract_100_documents", |b| {
        b.iter(|| {
            for root in &roots {
                black_box(tree.extract(*root));
            }
        });
    });

    group.finish();
}

// ============================================================================
// Rule Engine Benchmarks
// ============================================================================

fn bench_match_rows(c: &mut Criterion) {
    let rules = vec![
        WoqlRule::new().row().v("status").in_values(["active", "pending"]),
        WoqlRule::new().row().v("age").in_values([">40"]),
        WoqlRule::new().row().v("name").in_values(["/^Person 1"]),
        WoqlRule::new().row().rownum("<10"),
    ];
    let rows: Vec<Map<String, Value>> = (0..1000)
        .map(|i| {
            let status = if i % 2 == 0 { "active" } else { "done" };
            match json!({"status": status, "age": i % 90, "name": format!("Person {i}")}) {
                Value::Object(map) => map,
                _ => Map::new(),
            }
        })
        .collect();

    let mut group = c.benchmark_group("rules");
    group.throughput(Throughput::Elements(rows.len() as u64));

    group.bench_function("match_1000_rows", |b| {
        b.iter(|| {
            let mut matched = 0;
            for (n, row) in rows.iter().enumerate() {
                matched += WoqlRule::match_row(black_box(&rules), row, n, None).len();
            }
            black_box(matched)
        });
    });

    group.finish();
}

fn bench_apply_frame_rules(c: &mut Criterion) {
    let rules = frame_rules();
    let mut group = c.benchmark_group("rules");

    for docs in [10usize, 100] {
        let (mut tree, roots) = loaded(docs);
        group.throughput(Throughput::Elements(tree.len() as u64));
        group.bench_function(BenchmarkId::new("apply_rules", docs), |b| {
            b.iter(|| {
                let mut matches = 0;
                for root in &roots {
                    matches += tree.apply_rules(*root, black_box(&rules));
                }
                black_box(matches)
            });
        });
    }

    group.finish();
}

criterion_group!(frame_benches, bench_load_document, bench_extract_document);
criterion_group!(rule_benches, bench_match_rows, bench_apply_frame_rules);
criterion_main!(frame_benches, rule_benches);
