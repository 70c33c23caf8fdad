// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::{Context as AnyhowContext, Result};
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Runtime environment captured once at startup.
///
/// Holding it in a value keeps configuration loading, compiler detection and
/// the build runner free of ambient `env::current_dir` calls, so tests can
/// substitute temporary directories.
#[derive(Debug, Clone)]
pub struct Context {
    /// Current working directory when the program was invoked
    pub current_directory: PathBuf,
}

impl Context {
    /// Capture the current application context.
    pub fn capture() -> Result<Self> {
        let current_directory =
            env::current_dir().with_context(|| "Failed to get current working directory")?;

        Ok(Context { current_directory })
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Application Context:")?;
        writeln!(f, "Current Directory: {}", self.current_directory.display())
    }
}
