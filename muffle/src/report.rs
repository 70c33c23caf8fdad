// SPDX-License-Identifier: GPL-3.0-or-later

//! Terminal rendering of the grouped issue summary and build statistics.
//!
//! Everything writes through an injected [`io::Write`] so the output is
//! testable; color and emphasis come from `console`, which disables itself
//! when the target is not a terminal.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use console::style;
use regex_lite::Regex;

use crate::model::{BuildStats, GroupedIssue, Issue, IssueKind};
use crate::severity::{self, Severity};

const DEPRECATED_CATEGORY: &str = "-Wdeprecated-declarations";

static DEPRECATED_SUGGESTION: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"(?i)is deprecated:\s*(.*)$").unwrap());

pub struct ReportSettings {
    pub max_locations: usize,
    pub show_severity: bool,
    pub terminal_width: usize,
    pub current_directory: PathBuf,
}

impl ReportSettings {
    /// Settings bound to the attached terminal, 80 columns when there is none.
    pub fn detect(max_locations: usize, show_severity: bool, current_directory: PathBuf) -> Self {
        let terminal_width = console::Term::stdout()
            .size_checked()
            .map_or(80, |(_, columns)| columns as usize);
        ReportSettings {
            max_locations,
            show_severity,
            terminal_width,
            current_directory,
        }
    }
}

fn severity_style(severity: Severity) -> console::Style {
    match severity {
        Severity::Critical => console::Style::new().red().bold(),
        Severity::High => console::Style::new().red(),
        Severity::Medium => console::Style::new().yellow(),
        Severity::Low => console::Style::new().yellow().dim(),
        Severity::Info => console::Style::new().cyan(),
    }
}

/// Deprecation warnings are rephrased around the compiler's suggestion:
/// `… is deprecated: Use x() instead` becomes
/// `found deprecated declaration: use x() instead`.
fn display_message(issue: &Issue) -> String {
    if issue.category == DEPRECATED_CATEGORY {
        if let Some(captures) = DEPRECATED_SUGGESTION.captures(&issue.message) {
            let suggestion = &captures[1];
            let mut characters = suggestion.chars();
            let suggestion = match characters.next() {
                Some(first) => format!("{}{}", first.to_lowercase(), characters.as_str()),
                None => String::new(),
            };
            return format!("found deprecated declaration: {suggestion}");
        }
    }
    issue.message.clone()
}

/// Shorten a location for display: relative to the working directory when
/// possible, otherwise the last two path components.
fn format_location(file: &str, line: u32, column: u32, current_directory: &Path) -> String {
    let path = Path::new(file);
    let display = match path.strip_prefix(current_directory) {
        Ok(relative) => relative.display().to_string(),
        Err(_) => {
            let components: Vec<_> = path.components().collect();
            if components.len() > 1 {
                let parent = components[components.len() - 2].as_os_str().to_string_lossy();
                let name = components[components.len() - 1].as_os_str().to_string_lossy();
                format!("{parent}/{name}")
            } else {
                file.to_string()
            }
        }
    };
    format!("{display}:{line}:{column}")
}

fn truncate_location(location: String, terminal_width: usize) -> String {
    let characters: Vec<char> = location.chars().collect();
    if terminal_width > 9 && characters.len() > terminal_width - 6 {
        let keep = terminal_width - 9;
        let tail: String = characters[characters.len() - keep..].iter().collect();
        return format!("...{tail}");
    }
    location
}

pub fn write_summary_banner(writer: &mut impl Write) -> io::Result<()> {
    let rule = "=".repeat(60);
    writeln!(writer)?;
    writeln!(writer, "{}", style(&rule).bold())?;
    writeln!(writer, "{}", style("Issue Summary").bold())?;
    writeln!(writer, "{}", style(&rule).bold())?;
    Ok(())
}

pub fn write_issue_summary(
    writer: &mut impl Write,
    groups: &[GroupedIssue],
    settings: &ReportSettings,
) -> io::Result<()> {
    for group in groups {
        let issue = &group.issue;

        let severity = if issue.kind == IssueKind::Warning
            && !issue.category.is_empty()
            && settings.show_severity
        {
            Some(severity::classify(&issue.category))
        } else {
            None
        };

        let (header_style, icon, badge) = if issue.kind.counts_as_error() {
            (console::Style::new().red(), "✗", String::new())
        } else {
            match severity {
                Some(severity) => (severity_style(severity), "⚠", format!(" [{severity}]")),
                None => (console::Style::new().yellow(), "⚠", String::new()),
            }
        };

        let header = format!("{icon} {}{badge}", issue.kind.label().to_uppercase());
        writeln!(writer)?;
        writeln!(
            writer,
            "{}: {}",
            header_style.bold().apply_to(header),
            display_message(issue)
        )?;

        if !issue.category.is_empty() {
            writeln!(writer, "  {}", style(format!("Category: {}", issue.category)).dim())?;
        }
        if let Some(detail) = &issue.detail {
            writeln!(writer, "  {}", style(detail).dim())?;
        }

        writeln!(writer, "  {}", style(format!("Occurrences ({}):", group.count())).bold())?;
        for location in group.locations.iter().take(settings.max_locations) {
            let formatted = format_location(
                &location.file,
                location.line,
                location.column,
                &settings.current_directory,
            );
            let formatted = truncate_location(formatted, settings.terminal_width);
            writeln!(writer, "    {}", style(formatted).cyan())?;
        }
        if group.count() > settings.max_locations {
            let remaining = group.count() - settings.max_locations;
            writeln!(writer, "    {}", style(format!("... and {remaining} more")).dim())?;
        }
    }
    Ok(())
}

pub fn write_build_stats(
    writer: &mut impl Write,
    stats: &BuildStats,
    success: bool,
) -> io::Result<()> {
    let rule = "─".repeat(60);
    writeln!(writer)?;
    writeln!(writer, "{}", style(&rule).bold())?;
    writeln!(writer, "{}", style("Build Statistics").bold())?;
    writeln!(writer, "{}", style(&rule).bold())?;

    if success {
        writeln!(writer, "{}", style("✓ Build SUCCESS").green().bold())?;
    } else {
        writeln!(writer, "{}", style("✗ Build FAILED").red().bold())?;
    }
    writeln!(writer, "  Files compiled: {}", style(stats.files_compiled).cyan())?;
    writeln!(writer, "  MOC generated:  {}", style(stats.moc_generated).magenta())?;
    writeln!(writer, "  Warnings:       {}", style(stats.warnings).yellow())?;
    writeln!(writer, "  Errors:         {}", style(stats.errors).red())?;
    if !stats.duration.is_zero() {
        let seconds = stats.duration.as_secs_f64();
        writeln!(writer, "  Duration:       {}", style(format!("{seconds:.2}s")).cyan())?;
    }
    writeln!(writer, "{}", style(&rule).bold())?;
    Ok(())
}
