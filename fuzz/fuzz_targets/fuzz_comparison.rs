// SPDX-License-Identifier: PMPL-1.0-or-later
// Fuzz target for comparison expressions ("<=4", ">45", "!=0")

#![no_main]

use libfuzzer_sys::fuzz_target;
use termview_rules::{Comparison, NumberTest};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(cmp) = s.parse::<Comparison>() {
            // Parsed operands are finite, so the printed form parses back.
            let again: Comparison = cmp.to_string().parse().expect("display output parses");
            assert_eq!(again.op, cmp.op);
        }
        // Unparseable expressions never match.
        let _ = NumberTest::Expr(s.to_string()).matches(1.0);
    }
});
