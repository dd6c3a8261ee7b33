// SPDX-License-Identifier: PMPL-1.0-or-later
// Fuzz target for loading arbitrary JSON-LD documents into a frame tree

#![no_main]

use libfuzzer_sys::fuzz_target;
use serde_json::Value;
use termview_frame::{ClassFrame, FrameTree, FrameType, Schema};
use termview_rules::{FrameFilter, FramePattern, FrameRule, Scope};

fuzz_target!(|data: &[u8]| {
    let Ok(doc) = serde_json::from_slice::<Value>(data) else {
        return;
    };
    let mut schema = Schema::new();
    schema.insert(ClassFrame::new("scm:Person", "scm:name", "xsd:string", FrameType::Datatype));
    schema.insert(ClassFrame::new("scm:Person", "scm:friend", "scm:Person", FrameType::Document));

    let mut tree = FrameTree::with_schema(schema);
    let root = tree.new_object("scm:Person", None);
    if tree.load_jsonld_document(root, &doc).is_err() {
        return;
    }
    let _ = tree.extract(root);
    let rules = vec![FrameRule::new(FramePattern::new().scope(Scope::Data).depth(">=0"))];
    tree.apply_rules(root, &rules);
});
