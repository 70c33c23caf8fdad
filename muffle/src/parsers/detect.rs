// SPDX-License-Identifier: GPL-3.0-or-later

//! Compiler auto-detection.
//!
//! [`AutoDetectParser`] buffers output until it can tell which compiler
//! produced it, then instantiates the matching parser and replays the
//! buffered lines through it, so diagnostics arriving before the decision
//! are not lost. Detection runs in escalating passes:
//!
//! 1. every line: command spellings and keywords from the registry, plus
//!    the MSBuild `file(line,col): warning CODE:` shape
//! 2. after 10 lines: project files in the build directory
//! 3. after 30 lines: diagnostic format analysis over the buffer
//! 4. after 50 lines: give up and assume gcc
//!
//! Matching is substring-based on the lowercased line, so table order
//! settles ties (an `avr-gcc` command line matches the `gcc` entry first).

use std::path::{Path, PathBuf};

use console::style;
use regex_lite::Regex;

use crate::model::{BuildStats, Issue};
use crate::parsers::registry::{self, COMPILERS};
use crate::parsers::Parser;

// MSBuild diagnostic shape, e.g. "Client.cs(76,34): warning CS0168:"
static MSBUILD_SHAPE: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"\(\d+,\d+\):\s+(warning|error)\s+[A-Z]{2}\d{4}:").unwrap()
});

// Bracketed diagnostic flag, e.g. "[-Wunused-variable]"
static FLAG_TAG: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"\[-W[\w-]+\]").unwrap());

const MAX_BUFFER: usize = 100;
const PROJECT_FILE_PASS: u32 = 10;
const FORMAT_PASS: u32 = 30;
const FALLBACK_PASS: u32 = 50;

/// Match a single output line against the registry.
pub fn detect_line(line: &str) -> Option<&'static str> {
    let line_lower = line.to_lowercase();

    for metadata in &COMPILERS {
        let needles = metadata
            .command_patterns
            .iter()
            .chain(metadata.detection_keywords);
        if needles.into_iter().any(|needle| line_lower.contains(needle)) {
            return Some(metadata.key);
        }
    }

    if MSBUILD_SHAPE.is_match(line) {
        return Some(registry::DOTNET);
    }
    None
}

/// Identify a compiler from the shape of buffered diagnostics.
pub fn detect_from_format(lines: &[String]) -> Option<&'static str> {
    let joined_lower = lines.join(" ").to_lowercase();

    for line in lines {
        if MSBUILD_SHAPE.is_match(line) {
            return Some(registry::DOTNET);
        }

        let line_lower = line.to_lowercase();
        if line_lower.contains("avr")
            && (line_lower.contains("warning") || line_lower.contains("error"))
        {
            return Some(registry::AVR_GCC);
        }

        if FLAG_TAG.is_match(line) && joined_lower.contains("clang") {
            return Some(registry::CLANG);
        }
    }
    None
}

/// Identify a compiler from project files in `directory`.
pub fn detect_from_project_files(directory: &Path) -> Option<&'static str> {
    for metadata in &COMPILERS {
        for pattern in metadata.project_files {
            let found = match pattern.strip_prefix('*') {
                Some(suffix) => directory_has_suffix(directory, suffix),
                None => directory.join(pattern).exists(),
            };
            if found {
                return Some(metadata.key);
            }
        }
    }

    // Fall back to scanning makefile content for compiler names.
    for name in ["Makefile", "makefile", "GNUmakefile"] {
        let Ok(content) = std::fs::read_to_string(directory.join(name)) else {
            continue;
        };
        let content_lower = content.to_lowercase();
        for metadata in &COMPILERS {
            for keyword in metadata.detection_keywords {
                if content_lower.contains(keyword) {
                    return Some(metadata.key);
                }
            }
        }
    }
    None
}

fn directory_has_suffix(directory: &Path, suffix: &str) -> bool {
    let Ok(entries) = std::fs::read_dir(directory) else {
        return false;
    };
    entries
        .flatten()
        .any(|entry| entry.file_name().to_string_lossy().ends_with(suffix))
}

#[derive(Debug)]
pub struct AutoDetectParser {
    directory: PathBuf,
    delegate: Option<Box<dyn Parser>>,
    detected: Option<&'static str>,
    lines_checked: u32,
    buffer: Vec<String>,
    stats: BuildStats,
    issues: Vec<Issue>,
}

impl AutoDetectParser {
    /// `directory` is the build directory inspected for project files.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        AutoDetectParser {
            directory: directory.into(),
            delegate: None,
            detected: None,
            lines_checked: 0,
            buffer: Vec::new(),
            stats: BuildStats::default(),
            issues: Vec::new(),
        }
    }

    /// Registry key of the compiler chosen so far.
    pub fn detected(&self) -> Option<&'static str> {
        self.detected
    }

    /// Switch to the chosen parser and replay the buffer through it. The
    /// triggering line sits at the end of the buffer, so its echo is the
    /// one returned; echoes of earlier replayed lines were already shown
    /// or suppressed when they first arrived.
    fn activate(&mut self, key: &'static str) -> Option<String> {
        let Some(metadata) = registry::find(key) else {
            return None;
        };
        let mut delegate = metadata.instantiate();
        let mut last_echo = None;
        for line in self.buffer.drain(..) {
            last_echo = delegate.parse_line(&line);
        }
        self.detected = Some(metadata.key);
        self.delegate = Some(delegate);
        last_echo
    }
}

impl Parser for AutoDetectParser {
    fn parse_line(&mut self, line: &str) -> Option<String> {
        if let Some(delegate) = &mut self.delegate {
            return delegate.parse_line(line);
        }

        self.lines_checked += 1;
        if self.buffer.len() < MAX_BUFFER {
            self.buffer.push(line.to_string());
        }

        if let Some(key) = detect_line(line) {
            return self.activate(key);
        }
        if self.lines_checked == PROJECT_FILE_PASS {
            if let Some(key) = detect_from_project_files(&self.directory) {
                return self.activate(key);
            }
        } else if self.lines_checked == FORMAT_PASS {
            if let Some(key) = detect_from_format(&self.buffer) {
                return self.activate(key);
            }
        } else if self.lines_checked >= FALLBACK_PASS {
            return self.activate(registry::GCC);
        }

        if !line.trim().is_empty() && line.starts_with("make") {
            return Some(style(line).bold().to_string());
        }
        None
    }

    fn finalize(&mut self) {
        if let Some(delegate) = &mut self.delegate {
            delegate.finalize();
        }
    }

    fn stats(&self) -> &BuildStats {
        match &self.delegate {
            Some(delegate) => delegate.stats(),
            None => &self.stats,
        }
    }

    fn issues(&self) -> &[Issue] {
        match &self.delegate {
            Some(delegate) => delegate.issues(),
            None => &self.issues,
        }
    }
}
