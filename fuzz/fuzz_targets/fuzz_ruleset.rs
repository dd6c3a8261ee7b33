// SPDX-License-Identifier: PMPL-1.0-or-later
// Fuzz target for rule set parsing and validation

#![no_main]

use libfuzzer_sys::fuzz_target;
use termview_rules::RuleSet;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(set) = RuleSet::from_json_str(s) {
            let text = set.to_json_string().expect("valid rule sets serialize");
            let again = RuleSet::from_json_str(&text).expect("serialized rule sets reload");
            assert_eq!(again.len(), set.len());
        }
    }
});
