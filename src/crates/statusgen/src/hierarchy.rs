//! Completed-work hierarchy
//!
//! Roots are Done items whose parent is absent or not itself Done. The text
//! rendering walks subtask links depth-first; the tracker does not guarantee
//! those links are acyclic, so every walk carries a visited set.

use crate::issue::{AchievedSubset, IssueSet, NOT_AVAILABLE};
use std::collections::HashSet;

/// Topmost completed items, in achieved order.
pub fn root_set(achieved: &AchievedSubset<'_>) -> Vec<String> {
    achieved
        .iter()
        .filter(|record| match &record.parent {
            None => true,
            Some(parent) => !achieved.contains(parent),
        })
        .map(|record| record.key.clone())
        .collect()
}

/// Indented `KEY: summary` lines, two spaces per level, one trailing newline each.
///
/// Subtasks missing from `issues` print with an `N/A` summary and are not
/// expanded. A key already printed during this walk is printed again as a
/// leaf instead of being expanded a second time.
pub fn render(issues: &IssueSet, roots: &[String]) -> String {
    let mut out = String::new();
    let mut visited = HashSet::new();
    for key in roots {
        render_node(issues, key, 0, &mut visited, &mut out);
    }
    out
}

fn render_node<'a>(
    issues: &'a IssueSet,
    key: &'a str,
    depth: usize,
    visited: &mut HashSet<&'a str>,
    out: &mut String,
) {
    let record = issues.get(key);
    let summary = record.map_or(NOT_AVAILABLE, |r| r.summary.as_str());

    out.push_str(&"  ".repeat(depth));
    out.push_str(key);
    out.push_str(": ");
    out.push_str(summary);
    out.push('\n');

    let Some(record) = record else {
        return;
    };
    if !visited.insert(key) {
        return;
    }
    for child in &record.subtasks {
        render_node(issues, child, depth + 1, visited, out);
    }
}
