// SPDX-License-Identifier: GPL-3.0-or-later

//! Parser for .NET / MSBuild output.
//!
//! Covers Roslyn compiler diagnostics (`CS####`), system library
//! obsoletions (`SYSLIB####`), code analysis (`CA####`, `IDE####`) and
//! third-party analyzers. Diagnostic codes are carried as `-W<CODE>`
//! categories so severity lookup and grouping treat all toolchains alike.
//!
//! MSBuild prints each diagnostic on a single self-contained line, so this
//! parser keeps no current-issue register and notes never attach.

use regex_lite::Regex;

use crate::model::{BuildStats, Issue, IssueKind};
use crate::parsers::{parse_number, Parser};

// e.g. /src/Ape/Client.cs(76,34): warning CS0168: The variable 'ex' is declared but never used
static ISSUE: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(.+?)\((\d+),(\d+)\):\s+(warning|error)\s+([A-Z][A-Z\d]+):\s+(.+?)(?:\s+\(https?://[^)]+\))?$",
    )
    .unwrap()
});

// e.g. Ape.Core net9.0 succeeded with 3 warning(s) (1.7s)
static PROJECT_SUCCEEDED: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(.+?)\s+net\d+\.\d+\s+succeeded(?:\s+with\s+(\d+)\s+warning)?").unwrap()
});

// e.g. Build succeeded with 6 warning(s) in 6.0s
static BUILD_SUMMARY: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"(?i)^\s*Build\s+succeeded(?:\s+with\s+(\d+)\s+warning)?").unwrap()
});

static RESTORE: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"(?i)^\s*Restore\s+complete").unwrap());

#[derive(Debug)]
pub struct DotNetParser {
    issues: Vec<Issue>,
    stats: BuildStats,
}

impl DotNetParser {
    pub fn new() -> Self {
        DotNetParser {
            issues: Vec::new(),
            stats: BuildStats::default(),
        }
    }
}

impl Default for DotNetParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for DotNetParser {
    fn parse_line(&mut self, line: &str) -> Option<String> {
        if let Some(captures) = ISSUE.captures(line) {
            let kind = if captures[4].eq_ignore_ascii_case("warning") {
                self.stats.warnings += 1;
                IssueKind::Warning
            } else {
                self.stats.errors += 1;
                IssueKind::Error
            };
            self.issues.push(Issue::new(
                kind,
                captures[1].trim(),
                parse_number(&captures[2]),
                parse_number(&captures[3]),
                captures[6].trim(),
                format!("-W{}", &captures[5]),
            ));
            return None;
        }

        if PROJECT_SUCCEEDED.is_match(line) {
            self.stats.files_compiled += 1;
            return None;
        }

        if BUILD_SUMMARY.is_match(line) || RESTORE.is_match(line) {
            return None;
        }

        None
    }

    fn finalize(&mut self) {}

    fn stats(&self) -> &BuildStats {
        &self.stats
    }

    fn issues(&self) -> &[Issue] {
        &self.issues
    }
}
