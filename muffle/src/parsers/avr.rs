// SPDX-License-Identifier: GPL-3.0-or-later

//! Parser for avr-gcc output.
//!
//! The AVR cross compilers emit the same diagnostic format as host GCC, so
//! this delegates to [`GccParser`]. The separate type keeps the registry key
//! and leaves room for AVR-only handling (memory usage summaries) later.

use crate::model::{BuildStats, Issue};
use crate::parsers::gcc::GccParser;
use crate::parsers::Parser;

#[derive(Debug)]
pub struct AvrGccParser {
    inner: GccParser,
}

impl AvrGccParser {
    pub fn new() -> Self {
        AvrGccParser {
            inner: GccParser::new(),
        }
    }
}

impl Default for AvrGccParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for AvrGccParser {
    fn parse_line(&mut self, line: &str) -> Option<String> {
        self.inner.parse_line(line)
    }

    fn finalize(&mut self) {
        self.inner.finalize()
    }

    fn stats(&self) -> &BuildStats {
        self.inner.stats()
    }

    fn issues(&self) -> &[Issue] {
        self.inner.issues()
    }
}
