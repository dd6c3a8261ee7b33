// SPDX-License-Identifier: PMPL-1.0-or-later
//! Integration tests for the rule engine
//!
//! Table and graph rules against result rows, and frame rules applied over
//! a nested document loaded from wire-format class frames.

use serde_json::{json, Value};
use termview_frame::{EffectKey, Effects, FrameId, FrameKind, FrameTree, Schema};
use termview_rules::{
    FrameFilter, FramePattern, FrameRule, FrameStatus, Row, RuleSet, Scope, WoqlRule,
};

fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        other => panic!("not a row: {other}"),
    }
}

/// Route engine logs to the test output; `RUST_LOG=debug` shows rule decisions.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

fn schema() -> Schema {
    init_tracing();
    let mut schema = Schema::new();
    let errors = schema.load_class_frames(
        "scm:Person",
        &json!([
            {"type": "datatypeProperty", "property": "scm:name", "range": "xsd:string",
             "label": {"@value": "Name", "@type": "xsd:string"}},
            {"type": "objectProperty", "property": "scm:address", "range": "scm:Address",
             "frame": [
                {"type": "datatypeProperty", "property": "scm:street", "range": "xsd:string"},
                {"type": "objectProperty", "property": "scm:geo", "range": "scm:Geo",
                 "frame": [{"type": "datatypeProperty", "property": "scm:lat", "range": "xsd:decimal"}]}
             ]},
            {"type": "document", "property": "scm:friend", "range": "scm:Person"}
        ]),
    );
    assert!(errors.is_empty());
    schema
}

fn alice() -> Value {
    json!({
        "@id": "doc:alice",
        "@type": "scm:Person",
        "scm:name": {"@value": "Alice", "@type": "xsd:string"},
        "scm:address": {
            "@type": "scm:Address",
            "scm:street": {"@value": "Main St", "@type": "xsd:string"},
            "scm:geo": {
                "@type": "scm:Geo",
                "scm:lat": {"@value": 51.5, "@type": "xsd:decimal"}
            }
        },
        "scm:friend": {"@id": "doc:bob"}
    })
}

fn loaded() -> (FrameTree, FrameId) {
    let mut tree = FrameTree::with_schema(schema());
    let root = tree.new_object("scm:Person", Some("doc:alice"));
    tree.load_jsonld_document(root, &alice()).unwrap();
    (tree, root)
}

/// The only value of `prop` on object `obj`.
fn value_of(tree: &FrameTree, obj: FrameId, prop: &str) -> FrameId {
    let prop = tree.property_frame(obj, prop).unwrap();
    tree.property(prop).unwrap().values()[0]
}

// ----------------------------------------------------------------------
// Table and graph rules
// ----------------------------------------------------------------------

#[test]
fn test_row_rule_matches_listed_status() {
    let rules = vec![WoqlRule::new()
        .row()
        .v("status")
        .in_values(["active", "pending"])
        .with_effects(Effects::new().color([0, 160, 0]))];
    let rows = [row(json!({"status": "active"})), row(json!({"status": "done"}))];

    let matched: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(n, r)| !WoqlRule::match_row(&rules, r, *n, None).is_empty())
        .map(|(n, _)| n)
        .collect();
    assert_eq!(matched, vec![0]);
}

#[test]
fn test_edge_rule_is_directed() {
    let rule = WoqlRule::from_json(&json!({"pattern": {"scope": "edge", "source": "a", "target": "b"}})).unwrap();
    let rules = vec![rule];
    let r = row(json!({"a": "doc:x", "b": "doc:y"}));
    assert_eq!(WoqlRule::match_pair(&rules, &r, "a", "b", None).len(), 1);
    assert!(WoqlRule::match_pair(&rules, &r, "b", "a", None).is_empty());
}

#[test]
fn test_later_rule_wins_per_key() {
    let rules = vec![
        WoqlRule::new().row().with_effects(Effects::new().color([1, 0, 0]).hidden(false)),
        WoqlRule::new().row().with_effects(Effects::new().color([0, 0, 1])),
    ];
    let r = row(json!({"x": 1}));
    let folded = WoqlRule::fold_effects(WoqlRule::match_row(&rules, &r, 0, None));
    assert_eq!(folded.color, Some(vec![0, 0, 1]));
    assert_eq!(folded.hidden, Some(false));

    let hiding = WoqlRule::match_row(&rules, &r, 0, Some(EffectKey::Hidden));
    assert_eq!(hiding.len(), 1);
}

#[test]
fn test_cell_column_and_node_rules() {
    let adults = vec![WoqlRule::new().cell(["age"]).in_values([">30"])];
    assert_eq!(WoqlRule::match_cell(&adults, &row(json!({"age": 45})), "age", 0, None).len(), 1);
    assert!(WoqlRule::match_cell(&adults, &row(json!({"age": 20})), "age", 0, None).is_empty());

    let columns = vec![
        WoqlRule::new().column(["Name"]).with_effects(Effects::new().width(200)),
        WoqlRule::new().with_effects(Effects::new().width(10)),
    ];
    let name = WoqlRule::match_column(&columns, "Name", None);
    assert_eq!(name.len(), 1);
    assert_eq!(WoqlRule::fold_effects(name).width, Some(200));
    assert!(WoqlRule::match_column(&columns, "Age", None).is_empty());

    let people = vec![WoqlRule::new().node(["Person"]).type_(["scm:Person"])];
    let r = row(json!({
        "Person": {"@id": "doc:alice", "@type": "scm:Person"},
        "Place": {"@id": "doc:paris", "@type": "scm:City"}
    }));
    assert_eq!(WoqlRule::match_node(&people, &r, "Person", None, None).len(), 1);
    assert!(WoqlRule::match_node(&people, &r, "Place", None, None).is_empty());
}

// ----------------------------------------------------------------------
// Frame rules
// ----------------------------------------------------------------------

#[test]
fn test_nested_depths() {
    let (tree, root) = loaded();
    let address = value_of(&tree, root, "scm:address");
    let street = value_of(&tree, address, "scm:street");
    let geo = value_of(&tree, address, "scm:geo");
    let lat = value_of(&tree, geo, "scm:lat");

    assert_eq!(tree.kind(geo), Some(FrameKind::Object));
    assert_eq!(tree.depth(root), 0);
    assert_eq!(tree.depth(address), 1);
    assert_eq!(tree.depth(street), 1);
    assert_eq!(tree.depth(geo), 2);
    assert_eq!(tree.depth(lat), 2);
}

#[test]
fn test_depth_pattern_needs_depth_two() {
    let (tree, root) = loaded();
    let address = value_of(&tree, root, "scm:address");
    let geo = value_of(&tree, address, "scm:geo");

    let deep = FramePattern::new().depth(">1");
    assert!(deep.check_frame(&tree, geo));
    assert!(!deep.check_frame(&tree, address));
    assert!(!deep.check_frame(&tree, root));
}

#[test]
fn test_data_pattern_with_children_never_matches() {
    let (tree, root) = loaded();
    let pattern = FramePattern::new().scope(Scope::Data).children([FramePattern::new()]);
    for id in tree.descendants(root) {
        assert!(!pattern.check_frame(&tree, id), "matched {id}");
    }
}

#[test]
fn test_children_need_every_pattern_met() {
    let (tree, root) = loaded();
    let name = FramePattern::new().scope(Scope::Property).property(["scm:name"]);
    let address = FramePattern::new().scope(Scope::Property).property(["scm:address"]);
    let missing = FramePattern::new().scope(Scope::Property).property(["scm:email"]);

    let both = FramePattern::new().scope(Scope::Object).children([name.clone(), address]);
    assert!(both.check_frame(&tree, root));

    let any_property = FramePattern::new().scope(Scope::Property);
    let unmet = FramePattern::new().scope(Scope::Object).children([any_property, missing]);
    assert!(!unmet.check_frame(&tree, root));
}

#[test]
fn test_nested_frames_by_subject_class_and_parent() {
    let (tree, root) = loaded();
    let address = value_of(&tree, root, "scm:address");
    let street = value_of(&tree, address, "scm:street");
    let name = value_of(&tree, root, "scm:name");

    let in_address = FramePattern::new()
        .scope(Scope::Data)
        .subject_class(["Address"])
        .parent(FramePattern::new().scope(Scope::Property).property(["scm:street"]));
    assert!(in_address.check_frame(&tree, street));
    assert!(!in_address.check_frame(&tree, name));

    let documents = FramePattern::new().frame_type(["document"]);
    let friend = value_of(&tree, root, "scm:friend");
    assert!(documents.check_frame(&tree, root));
    assert!(documents.check_frame(&tree, friend));
    assert!(!documents.check_frame(&tree, address));
}

#[test]
fn test_ruleset_applied_over_document() {
    let set = RuleSet::from_json_str(
        r#"{
            "frame": [
                {"pattern": {"scope": "object", "depth": ">1"}, "rule": {"collapse": true}},
                {"pattern": {"scope": "data", "label": "/^Name"}, "rule": {"renderer": "String"}},
                {"pattern": {"scope": "data", "value": ["<60"], "type": "xsd:decimal"}, "rule": {"header": "Latitude"}}
            ]
        }"#,
    )
    .unwrap();
    let (mut tree, root) = loaded();
    assert_eq!(tree.apply_rules(root, &set.frame), 3);

    let address = value_of(&tree, root, "scm:address");
    let geo = value_of(&tree, address, "scm:geo");
    let lat = value_of(&tree, geo, "scm:lat");
    let name = value_of(&tree, root, "scm:name");
    assert_eq!(tree.display_options(geo).unwrap().collapse, Some(true));
    assert_eq!(tree.display_options(address).unwrap().collapse, None);
    assert_eq!(tree.display_options(name).unwrap().renderer.as_deref(), Some("String"));
    assert_eq!(tree.display_options(lat).unwrap().header.as_deref(), Some("Latitude"));
}

#[test]
fn test_edits_change_status_matches() {
    let (mut tree, root) = loaded();
    let updated = vec![FrameRule::new(FramePattern::new().scope(Scope::Data).status(FrameStatus::Updated))
        .with_effects(Effects::new().style("edited"))];
    assert_eq!(tree.apply_rules(root, &updated), 0);

    let name = value_of(&tree, root, "scm:name");
    tree.data_mut(name).unwrap().set("Alicia");
    assert_eq!(tree.apply_rules(root, &updated), 1);
    assert_eq!(tree.display_options(name).unwrap().style.as_deref(), Some("edited"));
}

#[test]
fn test_mfilter_callback_sees_every_match() {
    let (mut tree, root) = loaded();
    let rules = vec![
        FrameRule::new(FramePattern::new().scope(Scope::Object)),
        FrameRule::new(FramePattern::new().scope(Scope::Any).literal(true)),
    ];
    let mut objects = 0;
    let mut literals = 0;
    tree.mfilter(root, &rules, |tree, id, _| match tree.kind(id) {
        Some(FrameKind::Object) => objects += 1,
        Some(FrameKind::Data) => literals += 1,
        _ => {}
    });
    assert_eq!(objects, 3);
    // name, street, lat; the friend reference is not a literal.
    assert_eq!(literals, 3);
}
