// SPDX-License-Identifier: GPL-3.0-or-later

//! This module contains the command line interface of the application.
//!
//! The command line parsing is implemented using the `clap` library.
//! The module defines types to represent a structured form of the
//! program invocation. The `Arguments` type is used to represent all
//! possible invocations of the program.

use clap::builder::PossibleValuesParser;
use clap::{arg, command, value_parser, ArgAction, ArgMatches, Command};

use crate::parsers::registry;

/// The parser key that requests auto-detection instead of a fixed parser.
pub const AUTO_PARSER: &str = "auto";

/// Represents the command line arguments of the application.
///
/// Report and build tuning flags are optional; a `None` means the flag was
/// not given, so the configuration file (or its default) stays in effect.
#[derive(Debug, PartialEq)]
pub struct Arguments {
    // The path of the configuration file.
    pub config: Option<String>,
    // The verbosity level requested with repeated `-v` flags.
    pub verbose: u8,
    // The parser key, `auto` or one of the registered compilers.
    pub parser: Option<String>,
    // The number of parallel build jobs.
    pub jobs: Option<u32>,
    // The number of locations to show per issue group.
    pub max_locations: Option<usize>,
    // Hide the severity level of warnings in the summary.
    pub no_severity: bool,
    // The mode of the application.
    pub mode: Mode,
}

/// Represents the mode of the application.
#[derive(Debug, PartialEq)]
pub enum Mode {
    /// Run the configured build command and filter its output.
    Build {
        clean: bool,
        target: Option<String>,
    },
    /// Parse a previously saved build log instead of running a build.
    Replay { file: String },
}

impl TryFrom<ArgMatches> for Arguments {
    type Error = anyhow::Error;

    fn try_from(matches: ArgMatches) -> Result<Self, Self::Error> {
        let config = matches.get_one::<String>("config").map(String::to_string);
        let verbose = matches.get_count("verbose");
        let parser = matches.get_one::<String>("parser").map(String::to_string);
        let jobs = matches.get_one::<u32>("jobs").copied();
        let max_locations = matches.get_one::<usize>("max-locations").copied();
        let no_severity = matches.get_flag("no-severity");

        // A saved log makes this a replay; the build-only flags are dropped.
        let mode = match matches.get_one::<String>("file") {
            Some(file) => Mode::Replay { file: file.clone() },
            None => Mode::Build {
                clean: matches.get_flag("clean"),
                target: matches.get_one::<String>("TARGET").map(String::to_string),
            },
        };

        let arguments = Arguments {
            config,
            verbose,
            parser,
            jobs,
            max_locations,
            no_severity,
            mode,
        };
        Ok(arguments)
    }
}

/// Represents the command line interface of the application.
///
/// This describes how the user can interact with the application.
/// Without a `--file` argument the program runs the configured build
/// command; with one it replays a saved transcript through the parser.
pub fn cli() -> Command {
    command!()
        .args(&[
            arg!(-v --verbose ... "Sets the level of verbosity").action(ArgAction::Count),
            arg!(-c --config <FILE> "Path of the config file"),
            arg!(-f --file <FILE> "Parse compiler output from a file instead of running the build"),
            arg!(-p --parser <KEY> "Parser to use instead of auto-detection")
                .value_parser(parser_keys()),
            arg!(-j --jobs <N> "Number of parallel build jobs").value_parser(value_parser!(u32)),
            arg!(--clean "Run the clean target before building"),
            arg!(-m --"max-locations" <N> "Maximum locations to show per issue group")
                .value_parser(value_parser!(usize)),
            arg!(--"no-severity" "Disable severity levels for warnings"),
            arg!([TARGET] "Build target passed to the build command"),
        ])
}

fn parser_keys() -> PossibleValuesParser {
    PossibleValuesParser::new(std::iter::once(AUTO_PARSER).chain(registry::keys()))
}
