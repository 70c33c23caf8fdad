// SPDX-License-Identifier: GPL-3.0-or-later

//! Incremental parsers for compiler and build-tool output.
//!
//! Each parser is a small state machine consuming one line at a time. A line
//! can produce an echo string for live display (compile progress, make
//! banners), mutate the accumulated [`Issue`] list and [`BuildStats`]
//! counters, or do nothing at all. Lines a parser does not recognize are
//! inert by contract: consumed without echo and without state change.
//!
//! Multi-line diagnostics are carried in a single "current issue" register:
//! recognizing a new diagnostic flushes the previous one, and [`Parser::finalize`]
//! flushes whatever is still live at end of input.

pub mod avr;
pub mod detect;
pub mod dotnet;
pub mod gcc;
pub mod registry;
pub mod rustc;

use console::style;

use crate::model::{BuildStats, Issue};

/// One compiler family's line parser.
pub trait Parser: std::fmt::Debug {
    /// Consumes one line of build output.
    ///
    /// Returns a formatted echo when the line is worth showing while the
    /// build runs (compile steps, make banners); `None` hides it.
    fn parse_line(&mut self, line: &str) -> Option<String>;

    /// Flushes any diagnostic still held in the current-issue register.
    /// Safe to call more than once.
    fn finalize(&mut self);

    /// Counters accumulated so far.
    fn stats(&self) -> &BuildStats;

    /// Issues extracted so far. Complete only after [`Parser::finalize`].
    fn issues(&self) -> &[Issue];
}

/// Last path component, for compact progress echoes.
pub(crate) fn basename(path: &str) -> &str {
    std::path::Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
}

pub(crate) fn format_compilation(source_file: &str, output_file: &str) -> String {
    format!(
        "{} {} → {}",
        style("[CC]").cyan(),
        basename(source_file),
        basename(output_file)
    )
}

pub(crate) fn format_moc(source_file: &str, output_file: &str) -> String {
    format!(
        "{} {} → {}",
        style("[MOC]").magenta(),
        basename(source_file),
        basename(output_file)
    )
}

/// Digit capture to a number; captures are guaranteed numeric by the regex,
/// out-of-range values collapse to zero.
pub(crate) fn parse_number(text: &str) -> u32 {
    text.parse().unwrap_or(0)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn basename_extraction() {
        assert_eq!(basename("src/window/main.cpp"), "main.cpp");
        assert_eq!(basename("main.o"), "main.o");
        assert_eq!(basename("/abs/path/app"), "app");
    }

    #[test]
    fn compilation_echo_uses_basenames() {
        let echo = format_compilation("src/window/main.cpp", "build/main.o");
        assert!(echo.contains("[CC]"));
        assert!(echo.contains("main.cpp → main.o"));
        assert!(!echo.contains("src/window"));
    }

    #[test]
    fn number_parsing_is_total() {
        assert_eq!(parse_number("42"), 42);
        assert_eq!(parse_number("99999999999999999999"), 0);
    }
}
