// SPDX-License-Identifier: GPL-3.0-or-later

//! Data types shared by the parsers, the grouping stage and the reporter.
//!
//! An [`Issue`] is one diagnostic extracted from the build output. Parsers
//! accumulate issues and [`BuildStats`] counters while the build runs; the
//! grouping stage folds issues into [`GroupedIssue`] records for display.

use std::time::Duration;

/// Classification of an extracted diagnostic.
///
/// Linker diagnostics are kept apart from compiler diagnostics because they
/// carry no real source position and their occurrences are never
/// deduplicated (every unresolved symbol matters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    Warning,
    Error,
    LinkerWarning,
    LinkerError,
}

impl IssueKind {
    /// True for the kinds that fail a build.
    pub fn counts_as_error(self) -> bool {
        matches!(self, IssueKind::Error | IssueKind::LinkerError)
    }

    /// True for diagnostics produced by the link step.
    pub fn is_linker(self) -> bool {
        matches!(self, IssueKind::LinkerWarning | IssueKind::LinkerError)
    }

    /// Stable lowercase label used by the reporter.
    pub fn label(self) -> &'static str {
        match self {
            IssueKind::Warning => "warning",
            IssueKind::Error => "error",
            IssueKind::LinkerWarning => "linker-warning",
            IssueKind::LinkerError => "linker-error",
        }
    }
}

/// One diagnostic extracted from the build output.
///
/// `category` holds the toolchain's own code for the diagnostic: a `-W` flag
/// for the GCC family, a `-W`-prefixed MSBuild code like `-WCS8618`, or a
/// raw rustc error code (`E0308`) or lint name. Empty when the toolchain
/// printed none. `detail` carries the first attached `note:` line, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub kind: IssueKind,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub message: String,
    pub category: String,
    pub detail: Option<String>,
}

impl Issue {
    pub fn new(
        kind: IssueKind,
        file: impl Into<String>,
        line: u32,
        column: u32,
        message: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Issue {
            kind,
            file: file.into(),
            line,
            column,
            message: message.into(),
            category: category.into(),
            detail: None,
        }
    }
}

/// One occurrence of a grouped diagnostic, with the original (un-normalized)
/// file spelling and message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

/// A set of issues that share the same identity (kind, normalized message,
/// category), with every distinct place they occurred.
#[derive(Debug, Clone)]
pub struct GroupedIssue {
    /// Representative issue. Its message is the normalized form and its
    /// file/line/column are cleared; the detail comes from the first member.
    pub issue: Issue,
    pub locations: Vec<Location>,
}

impl GroupedIssue {
    /// Number of distinct occurrences.
    pub fn count(&self) -> usize {
        self.locations.len()
    }
}

/// Counters accumulated while a build runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub files_compiled: u32,
    pub moc_generated: u32,
    pub warnings: u32,
    pub errors: u32,
    pub duration: Duration,
}

impl BuildStats {
    pub fn success(&self) -> bool {
        self.errors == 0
    }
}
