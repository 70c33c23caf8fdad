// SPDX-License-Identifier: GPL-3.0-or-later

//! Folds extracted issues into groups of repeated diagnostics.
//!
//! The same warning often shows up dozens of times in one build: a header
//! included from many translation units, a template instantiated all over
//! the tree. Grouping identity is the triple (kind, normalized message,
//! category); compiler-specific noise inside the message (quoted names,
//! type spellings, suggestions) is normalized away first, and locations are
//! deduplicated through a relative view of the path.

use std::collections::{HashMap, HashSet};

use crate::model::{GroupedIssue, Issue, Location};

static QUOTED_SPANS: std::sync::LazyLock<regex_lite::Regex> = std::sync::LazyLock::new(|| {
    regex_lite::Regex::new(r#"'[^']*'|"[^"]*"|‘[^’]*’"#).unwrap()
});

/// Directory names that carry no identity: generated-code and output trees.
const NOISE_DIRS: [&str; 4] = ["moc", "build", "obj", "out"];

/// Number of trailing path components that identify a source file.
const SIGNIFICANT_COMPONENTS: usize = 3;

/// Reduces a diagnostic message to its stable core so that repeated
/// occurrences compare equal.
///
/// Quoted spans (the variable parts: identifiers, type names, literals) are
/// removed outright. Sign-comparison diagnostics spell out both integer
/// types after `signs:`, which differ per occurrence and are collapsed.
/// Suggestion tails (`; did you mean …`, question-mark phrasings) are cut.
pub fn normalize_message(message: &str, category: &str) -> String {
    let mut text = QUOTED_SPANS.replace_all(message, "").into_owned();

    // "comparison of integers of different signs: 'X' and 'Y'" carries the
    // type pair in the tail; fold it so the pair does not split the group.
    if category == "-Wsign-compare" || text.to_lowercase().contains("comparison") {
        if let Some(index) = text.find("signs:") {
            text.truncate(index);
            text.push_str("signs: and");
        }
    }

    let mut text = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if let Some(index) = text.find("; did you mean") {
        text.truncate(index);
    }

    if let Some(index) = text.find('?') {
        text.truncate(index);
    }

    text.truncate(text.trim_end().len());
    text
}

/// Reduces a path to the view used for location deduplication.
///
/// Separators are unified, relative hops and generated-code directories are
/// dropped, and only the last [`SIGNIFICANT_COMPONENTS`] components are
/// kept, so `../../src/window/main.cpp` and `/home/user/project/src/window/main.cpp`
/// land on the same key.
pub fn normalize_path_for_dedup(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let components: Vec<&str> = unified
        .split('/')
        .filter(|part| !part.is_empty() && *part != "." && *part != "..")
        .filter(|part| !NOISE_DIRS.contains(part))
        .collect();
    let keep = components.len().saturating_sub(SIGNIFICANT_COMPONENTS);
    components[keep..].join("/")
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct GroupKey {
    kind: crate::model::IssueKind,
    message: String,
    category: String,
}

/// Groups issues by identity and orders the groups by occurrence count,
/// descending. Ties keep first-seen order.
///
/// Locations within a group are deduplicated by (normalized path, line,
/// column), except for linker issues where every occurrence is kept: two
/// undefined references to the same symbol from different objects are both
/// worth seeing. Stored locations keep the original path spelling and
/// message text.
pub fn group_issues(issues: &[Issue]) -> Vec<GroupedIssue> {
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<GroupedIssue> = Vec::new();
    let mut seen_locations: Vec<HashSet<(String, u32, u32)>> = Vec::new();

    for issue in issues {
        let normalized = normalize_message(&issue.message, &issue.category);
        let key = GroupKey {
            kind: issue.kind,
            message: normalized.clone(),
            category: issue.category.clone(),
        };

        let slot = match index.get(&key) {
            Some(slot) => *slot,
            None => {
                let mut representative = issue.clone();
                representative.file = String::new();
                representative.line = 0;
                representative.column = 0;
                representative.message = normalized;
                groups.push(GroupedIssue {
                    issue: representative,
                    locations: Vec::new(),
                });
                seen_locations.push(HashSet::new());
                index.insert(key, groups.len() - 1);
                groups.len() - 1
            }
        };

        let location = Location {
            file: issue.file.clone(),
            line: issue.line,
            column: issue.column,
            message: issue.message.clone(),
        };

        if issue.kind.is_linker() {
            groups[slot].locations.push(location);
        } else {
            let dedup_key = (normalize_path_for_dedup(&issue.file), issue.line, issue.column);
            if seen_locations[slot].insert(dedup_key) {
                groups[slot].locations.push(location);
            }
        }
    }

    groups.sort_by(|a, b| b.count().cmp(&a.count()));
    groups
}
