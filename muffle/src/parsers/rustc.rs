// SPDX-License-Identifier: GPL-3.0-or-later

//! Parser for rustc and cargo output.
//!
//! Rust diagnostics are split across lines: a header
//! (`warning: unused variable`) carries kind and message, the following
//! `--> file:line:col` line carries the location, and an optional
//! `= note: `#[warn(lint)]` …` line names the lint. The header is held as a
//! pending diagnostic until its location arrives; headers that never get a
//! location (summary lines like `warning: 3 warnings emitted`) still count
//! toward the totals but produce no issue.

use regex_lite::Regex;

use crate::model::{BuildStats, Issue, IssueKind};
use crate::parsers::{parse_number, Parser};

// e.g. warning: unused variable: `actions`   /   error[E0308]: mismatched types
static ISSUE_HEADER: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"^\s*(warning|error)(?:\[([^\]]+)\])?\s*:\s*(.+)$").unwrap()
});

// e.g.    --> helix-core/src/machine.rs:341:13
static LOCATION: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"^\s*-->\s+(.+?):(\d+):(\d+)$").unwrap());

// e.g.    = note: `#[warn(unused_variables)]` on by default
static LINT_ANNOTATION: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"^\s*=\s*(?:note|help|warning):\s*`#\[warn\(([^)]+)\)\]`").unwrap()
});

static COMPILING: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"^\s*Compiling\s+(\S+)").unwrap());

static FINISHED: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"^\s*Finished\s+.*target\(s\)").unwrap());

/// Diagnostic header waiting for its `-->` location line.
#[derive(Debug)]
struct PendingDiagnostic {
    kind: IssueKind,
    code: Option<String>,
    message: String,
}

#[derive(Debug)]
pub struct RustcParser {
    issues: Vec<Issue>,
    current: Option<Issue>,
    pending: Option<PendingDiagnostic>,
    stats: BuildStats,
}

impl RustcParser {
    pub fn new() -> Self {
        RustcParser {
            issues: Vec::new(),
            current: None,
            pending: None,
            stats: BuildStats::default(),
        }
    }

    fn flush_current(&mut self) {
        if let Some(issue) = self.current.take() {
            self.issues.push(issue);
        }
    }
}

impl Default for RustcParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for RustcParser {
    fn parse_line(&mut self, line: &str) -> Option<String> {
        if let Some(captures) = COMPILING.captures(line) {
            self.stats.files_compiled += 1;
            return Some(format!("Compiling {}...", &captures[1]));
        }

        if let Some(captures) = ISSUE_HEADER.captures(line) {
            let kind = if &captures[1] == "warning" {
                self.stats.warnings += 1;
                IssueKind::Warning
            } else {
                self.stats.errors += 1;
                IssueKind::Error
            };
            self.pending = Some(PendingDiagnostic {
                kind,
                code: captures.get(2).map(|code| code.as_str().to_string()),
                message: captures[3].to_string(),
            });
            return None;
        }

        if let Some(captures) = LOCATION.captures(line) {
            if let Some(pending) = self.pending.take() {
                self.flush_current();
                self.current = Some(Issue::new(
                    pending.kind,
                    &captures[1],
                    parse_number(&captures[2]),
                    parse_number(&captures[3]),
                    pending.message,
                    pending.code.unwrap_or_default(),
                ));
                return None;
            }
        }

        if let Some(captures) = LINT_ANNOTATION.captures(line) {
            if let Some(current) = &mut self.current {
                if current.category.is_empty() {
                    current.category = captures[1].to_string();
                }
                return None;
            }
        }

        if FINISHED.is_match(line) {
            self.flush_current();
            return None;
        }

        None
    }

    fn finalize(&mut self) {
        self.flush_current();
        self.pending = None;
    }

    fn stats(&self) -> &BuildStats {
        &self.stats
    }

    fn issues(&self) -> &[Issue] {
        &self.issues
    }
}
