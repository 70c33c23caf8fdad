// SPDX-License-Identifier: GPL-3.0-or-later

mod execution;

use std::process::ExitCode;

use crate::context::Context;
use crate::parsers::registry;
use crate::{args, config};

pub use execution::{BuildSession, ReplaySession};
use execution::{ParserChoice, ReportOptions};

/// Represent the modes the application can run in.
///
/// To the user the modes are:
/// - build: run the configured build command and filter its output live.
/// - replay: parse a previously saved build log.
///
/// Both modes feed the same parser pipeline and end in the same reporting
/// tail, so the distinction is only about where the lines come from.
pub enum Mode {
    Build(BuildSession),
    Replay(ReplaySession),
}

impl Mode {
    /// Configure the application mode based on the command line arguments
    /// and the configuration.
    ///
    /// Command line flags win over configuration file values. The parser
    /// selection is resolved here; a key the registry does not know is
    /// replaced by the gcc family with a warning.
    pub fn configure(
        context: Context,
        arguments: args::Arguments,
        config: config::Main,
    ) -> Result<Self, ConfigurationError> {
        let parser_key = arguments.parser.as_deref().unwrap_or(&config.parser);
        let parser = if parser_key == args::AUTO_PARSER {
            ParserChoice::Auto
        } else {
            match registry::find(parser_key) {
                Some(metadata) => ParserChoice::Fixed(metadata),
                None => {
                    let fallback = registry::fallback();
                    log::warn!(
                        "Parser '{parser_key}' is not registered. Available: {}. Using '{}' instead.",
                        registry::keys().collect::<Vec<_>>().join(", "),
                        fallback.key
                    );
                    ParserChoice::Fixed(fallback)
                }
            }
        };

        let report = ReportOptions {
            max_locations: arguments
                .max_locations
                .unwrap_or(config.report.max_locations),
            show_severity: !arguments.no_severity && config.report.severity,
        };
        let verbose = arguments.verbose > 0;

        match arguments.mode {
            args::Mode::Replay { file } => {
                log::debug!("Mode: replay a saved build log");

                let session = ReplaySession {
                    directory: context.current_directory,
                    file,
                    parser,
                    report,
                    verbose,
                };
                Ok(Self::Replay(session))
            }
            args::Mode::Build { clean, target } => {
                log::debug!("Mode: run the build and filter its output");

                let mut command = shell_words::split(&config.build.command)?;
                if command.is_empty() {
                    return Err(ConfigurationError::EmptyCommand);
                }
                let clean_command = clean.then(|| {
                    let mut clean_command = command.clone();
                    clean_command.push("clean".to_string());
                    clean_command
                });
                let jobs = arguments.jobs.unwrap_or(config.build.jobs);
                command.push(format!("-j{jobs}"));
                if let Some(target) = target {
                    command.push(target);
                }

                let session = BuildSession {
                    directory: context.current_directory,
                    command,
                    clean_command,
                    parser,
                    report,
                    verbose,
                };
                Ok(Self::Build(session))
            }
        }
    }

    /// It actually runs the application mode.
    ///
    /// Run-time failures are logged and collapse into a failure exit code;
    /// at this point the user already got valid arguments accepted.
    pub fn run(self) -> ExitCode {
        let status = match self {
            Self::Build(session) => session.run(),
            Self::Replay(session) => session.run(),
        };
        status.unwrap_or_else(|error| {
            log::error!("muffle: {error}");
            ExitCode::FAILURE
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("The build command is empty")]
    EmptyCommand,
    #[error("Failed to parse the build command: {0}")]
    BrokenCommand(#[from] shell_words::ParseError),
}
