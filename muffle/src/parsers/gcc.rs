// SPDX-License-Identifier: GPL-3.0-or-later

//! Parser for GCC and G++ output. Clang's diagnostic format is compatible,
//! so the `clang` registry key shares this implementation.
//!
//! Diagnostics arrive as a header line (`file:line:col: warning: …`)
//! followed by optional `note:` and source-context lines; the header is held
//! in the current-issue register until the next diagnostic or end of input.
//! Link-step diagnostics come in two shapes: the classic
//! `file.c:211:(.text+0x4): undefined reference …` location form, and
//! `ld:`-prefixed lines whose link target is recovered from recently seen
//! output.

use std::collections::VecDeque;

use console::style;
use regex_lite::Regex;

use crate::model::{BuildStats, Issue, IssueKind};
use crate::parsers::{format_compilation, format_moc, parse_number, Parser};

static COMPILE: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"^\s*(?:.*?/)?(g\+\+|gcc|clang\+\+|clang|avr-gcc|avr-g\+\+).*?-o\s+(\S+)\s+(\S+)$")
        .unwrap()
});

// Make-style progress, e.g. "• Compiling src/main.c"
static MAKE_COMPILE: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"^\s*[•▪◦-]\s+(?:Compiling|Building)\s+(.+)$").unwrap()
});

static MOC: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"^\s*(?:.*?/)?moc\s+.*?-o\s+(\S+)\s+(\S+)$").unwrap()
});

static ISSUE: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"^(.*?):(\d+):(\d+):\s+(warning|error):\s+(.+?)(?:\s+\[([-\w=]+)\])?$").unwrap()
});

// Classic linker location, e.g. "file.c:211:(.text+0x4): undefined reference to `sym'"
static LINKER_LOCATION: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"^(.*?):(\d+):\([^)]+\):\s+(.+)$").unwrap()
});

static LD_DIAGNOSTIC: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"^.*?\bld:\s+(.+)$").unwrap()
});

// collect2 repeats the linker failure as its own exit status line.
static COLLECT2: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"^collect2:\s+error:\s+.+$").unwrap()
});

static NOTE: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"^(.*?):(\d+):(\d+):\s+note:\s+(.+)$").unwrap()
});

// Source context under a diagnostic, e.g. "  341 |     int unused;"
static CONTEXT: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"^\s+\d+\s+\|").unwrap()
});

static QUOTED_LIBRARY: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"'([^']*)'").unwrap());

/// Raw lines kept for recovering the link target of `ld:` diagnostics.
const LINK_CONTEXT_LINES: usize = 5;

#[derive(Debug)]
pub struct GccParser {
    issues: Vec<Issue>,
    current: Option<Issue>,
    stats: BuildStats,
    recent: VecDeque<String>,
}

impl GccParser {
    pub fn new() -> Self {
        GccParser {
            issues: Vec::new(),
            current: None,
            stats: BuildStats::default(),
            recent: VecDeque::with_capacity(LINK_CONTEXT_LINES),
        }
    }

    fn remember(&mut self, line: &str) {
        if self.recent.len() == LINK_CONTEXT_LINES {
            self.recent.pop_front();
        }
        self.recent.push_back(line.to_string());
    }

    fn flush_current(&mut self) {
        if let Some(issue) = self.current.take() {
            self.issues.push(issue);
        }
    }

    /// Most recent `Linking …` line names the artifact being linked; its
    /// last token is the link target.
    fn link_target(&self) -> Option<String> {
        self.recent
            .iter()
            .rev()
            .find(|line| line.contains("Linking"))
            .and_then(|line| line.split_whitespace().last())
            .map(|token| super::basename(token).to_string())
    }

    fn linker_diagnostic(&mut self, body: &str) -> Option<String> {
        let (kind, message) = if let Some(rest) = body.strip_prefix("warning:") {
            (IssueKind::LinkerWarning, rest.trim_start())
        } else if let Some(rest) = body.strip_prefix("error:") {
            (IssueKind::LinkerError, rest.trim_start())
        } else {
            (IssueKind::LinkerError, body)
        };

        let library = QUOTED_LIBRARY
            .captures(message)
            .map(|captures| captures[1].to_string());
        let target = self.link_target();
        let file = match (&library, &target) {
            (Some(library), Some(target)) => format!("{library}|{target}"),
            (Some(library), None) => library.clone(),
            (None, Some(target)) => format!("|{target}"),
            (None, None) => String::new(),
        };

        self.flush_current();
        self.current = Some(Issue::new(kind, file, 0, 0, message, ""));

        if kind == IssueKind::LinkerWarning {
            self.stats.warnings += 1;
        } else {
            self.stats.errors += 1;
        }
        None
    }

    fn passthrough(&self, line: &str) -> Option<String> {
        if line.trim().is_empty() {
            return None;
        }
        if line.starts_with("make") {
            return Some(style(line).bold().to_string());
        }
        let lower = line.to_lowercase();
        if lower.contains("error") && lower.contains("make:") {
            return Some(style(line).red().bold().to_string());
        }
        None
    }
}

impl Default for GccParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for GccParser {
    fn parse_line(&mut self, line: &str) -> Option<String> {
        self.remember(line);

        if let Some(captures) = COMPILE.captures(line) {
            self.stats.files_compiled += 1;
            let output_file = &captures[2];
            let source_file = &captures[3];
            return Some(format_compilation(source_file, output_file));
        }

        if let Some(captures) = MAKE_COMPILE.captures(line) {
            self.stats.files_compiled += 1;
            return Some(format!("{} {}", style("[CC]").cyan(), &captures[1]));
        }

        if let Some(captures) = MOC.captures(line) {
            self.stats.moc_generated += 1;
            let output_file = &captures[1];
            let source_file = &captures[2];
            return Some(format_moc(source_file, output_file));
        }

        if let Some(captures) = ISSUE.captures(line) {
            self.flush_current();

            let kind = if &captures[4] == "warning" {
                self.stats.warnings += 1;
                IssueKind::Warning
            } else {
                self.stats.errors += 1;
                IssueKind::Error
            };
            self.current = Some(Issue::new(
                kind,
                &captures[1],
                parse_number(&captures[2]),
                parse_number(&captures[3]),
                &captures[5],
                captures.get(6).map_or("", |category| category.as_str()),
            ));
            return None;
        }

        if let Some(captures) = LINKER_LOCATION.captures(line) {
            self.flush_current();
            self.current = Some(Issue::new(
                IssueKind::Error,
                &captures[1],
                parse_number(&captures[2]),
                0,
                &captures[3],
                "",
            ));
            self.stats.errors += 1;
            return None;
        }

        if let Some(captures) = LD_DIAGNOSTIC.captures(line) {
            let body = captures[1].to_string();
            return self.linker_diagnostic(&body);
        }

        if COLLECT2.is_match(line) {
            // The linker issue itself was already captured above.
            return None;
        }

        if let Some(captures) = NOTE.captures(line) {
            if let Some(current) = &mut self.current {
                if current.detail.is_none() {
                    current.detail = Some(captures[4].to_string());
                }
                return None;
            }
        }

        if CONTEXT.is_match(line) {
            return None;
        }

        self.passthrough(line)
    }

    fn finalize(&mut self) {
        self.flush_current();
    }

    fn stats(&self) -> &BuildStats {
        &self.stats
    }

    fn issues(&self) -> &[Issue] {
        &self.issues
    }
}
