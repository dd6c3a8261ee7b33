// SPDX-License-Identifier: PMPL-1.0-or-later
//! Rule traversal over frame trees.
//!
//! The same rule list is tested independently at every node of a
//! depth-first pre-order walk, so one rule can reach many frames by pattern.

use termview_frame::{Effects, FrameId, FrameTree};
use tracing::debug;

use crate::frame_rule::FrameRule;

/// Rule traversal for frame containers.
pub trait FrameFilter {
    /// Walk `start` and everything below it, calling `onmatch` for each
    /// matching rule at each frame, in rule-list order.
    fn mfilter<F>(&mut self, start: FrameId, rules: &[FrameRule], onmatch: F)
    where
        F: FnMut(&mut FrameTree, FrameId, &FrameRule);

    /// Recompute `display_options` below `start` from `rules`.
    ///
    /// Each frame's options are cleared, then matched effects are merged in
    /// rule order. Returns the number of (frame, rule) matches.
    fn apply_rules(&mut self, start: FrameId, rules: &[FrameRule]) -> usize;
}

impl FrameFilter for FrameTree {
    fn mfilter<F>(&mut self, start: FrameId, rules: &[FrameRule], mut onmatch: F)
    where
        F: FnMut(&mut FrameTree, FrameId, &FrameRule),
    {
        self.walk(start, &mut |tree: &mut FrameTree, id: FrameId| {
            for rule in FrameRule::test_rules(rules, tree, id) {
                onmatch(tree, id, rule);
            }
        });
    }

    fn apply_rules(&mut self, start: FrameId, rules: &[FrameRule]) -> usize {
        for id in self.descendants(start) {
            if let Some(options) = self.display_options_mut(id) {
                *options = Effects::default();
            }
        }
        let mut matches = 0;
        self.mfilter(start, rules, |tree, id, rule| {
            if let Some(options) = tree.display_options_mut(id) {
                options.merge(&rule.rule);
            }
            matches += 1;
        });
        debug!(start = %start, rules = rules.len(), matches, "Applied frame rules");
        matches
    }
}
