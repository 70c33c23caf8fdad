// SPDX-License-Identifier: GPL-3.0-or-later

//! Session machinery shared by the build and replay modes.
//!
//! A session drives one parser over a stream of build output lines and
//! writes the live echoes while the lines arrive. Every session ends in the
//! same tail: finalize the parser, group the issues, and print the summary
//! and the statistics block. The build session additionally owns the child
//! process and the reader threads that drain its pipes.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use console::style;
use crossbeam_channel::{unbounded, RecvTimeoutError, Sender};
use thiserror::Error;

use crate::grouping;
use crate::model::{BuildStats, Issue};
use crate::parsers::detect::AutoDetectParser;
use crate::parsers::registry::CompilerMetadata;
use crate::parsers::Parser;
use crate::report::{self, ReportSettings};

/// How long the receive loop waits for a line before rechecking the
/// interrupt flag.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// The parser selection made at configuration time.
///
/// Instantiation is deferred until the working directory is settled,
/// because auto-detection probes that directory for project files.
pub(super) enum ParserChoice {
    Auto,
    Fixed(&'static CompilerMetadata),
}

impl ParserChoice {
    fn instantiate(&self, directory: &Path) -> ActiveParser {
        match self {
            ParserChoice::Auto => ActiveParser::Auto(AutoDetectParser::new(directory)),
            ParserChoice::Fixed(metadata) => ActiveParser::Fixed(metadata.instantiate()),
        }
    }
}

/// A running parser, either committed up front or wrapped in auto-detection.
enum ActiveParser {
    Auto(AutoDetectParser),
    Fixed(Box<dyn Parser>),
}

impl ActiveParser {
    fn parse_line(&mut self, line: &str) -> Option<String> {
        match self {
            ActiveParser::Auto(parser) => parser.parse_line(line),
            ActiveParser::Fixed(parser) => parser.parse_line(line),
        }
    }

    fn finalize(&mut self) {
        match self {
            ActiveParser::Auto(parser) => parser.finalize(),
            ActiveParser::Fixed(parser) => parser.finalize(),
        }
    }

    fn stats(&self) -> &BuildStats {
        match self {
            ActiveParser::Auto(parser) => parser.stats(),
            ActiveParser::Fixed(parser) => parser.stats(),
        }
    }

    fn issues(&self) -> &[Issue] {
        match self {
            ActiveParser::Auto(parser) => parser.issues(),
            ActiveParser::Fixed(parser) => parser.issues(),
        }
    }

    /// The compiler key committed by auto-detection, when that is how the
    /// session ran.
    fn detected(&self) -> Option<&'static str> {
        match self {
            ActiveParser::Auto(parser) => parser.detected(),
            ActiveParser::Fixed(_) => None,
        }
    }
}

/// Report tuning resolved from the command line and the configuration.
pub(super) struct ReportOptions {
    pub(super) max_locations: usize,
    pub(super) show_severity: bool,
}

/// What a session run produced, carried into the reporting tail.
struct Outcome {
    issues: Vec<Issue>,
    stats: BuildStats,
    success: bool,
    exit_code: ExitCode,
}

/// Runs the configured build command and filters its output.
pub struct BuildSession {
    pub(super) directory: PathBuf,
    pub(super) command: Vec<String>,
    pub(super) clean_command: Option<Vec<String>>,
    pub(super) parser: ParserChoice,
    pub(super) report: ReportOptions,
    pub(super) verbose: bool,
}

impl BuildSession {
    pub fn run(self) -> Result<ExitCode, RuntimeError> {
        let mut writer = io::stdout().lock();
        self.execute(&mut writer)
    }

    fn execute(mut self, writer: &mut impl Write) -> Result<ExitCode, RuntimeError> {
        // Out-of-tree layouts keep the makefile under build/.
        if !self.directory.join("Makefile").exists() {
            let fallback = self.directory.join("build");
            if fallback.join("Makefile").exists() {
                writeln!(writer, "{}", style("Changed to build directory").cyan())?;
                writeln!(writer)?;
                self.directory = fallback;
            } else {
                writeln!(
                    writer,
                    "{}",
                    style("Error: No Makefile found. Run qmake first.").red()
                )?;
                return Ok(ExitCode::from(1));
            }
        }

        if let Some(clean_command) = &self.clean_command {
            writeln!(writer, "{}", style("Cleaning...").yellow())?;
            // The clean output is thrown away and its exit code is ignored.
            let _ = Command::new(&clean_command[0])
                .args(&clean_command[1..])
                .current_dir(&self.directory)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status();
            writeln!(writer)?;
        }

        let interrupted = Arc::new(AtomicBool::new(false));
        for signal in signal_hook::consts::TERM_SIGNALS {
            signal_hook::flag::register(*signal, Arc::clone(&interrupted))?;
        }

        let mut parser = self.parser.instantiate(&self.directory);
        let started = Instant::now();

        writeln!(
            writer,
            "{} {}",
            style("Running:").bold(),
            self.command.join(" ")
        )?;
        writeln!(writer)?;

        let mut child = match Command::new(&self.command[0])
            .args(&self.command[1..])
            .current_dir(&self.directory)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                writeln!(
                    writer,
                    "{}",
                    style(format!("Error: Command not found: {}", self.command[0])).red()
                )?;
                let outcome = Outcome {
                    issues: Vec::new(),
                    stats: parser.stats().clone(),
                    success: false,
                    exit_code: ExitCode::from(1),
                };
                return conclude(writer, &parser, outcome, &self.report, &self.directory);
            }
            Err(error) => return Err(RuntimeError::Io(error)),
        };

        let (sender, receiver) = unbounded::<String>();
        let mut readers = Vec::new();
        if let Some(stream) = child.stdout.take() {
            readers.push(spawn_reader(stream, sender.clone()));
        }
        if let Some(stream) = child.stderr.take() {
            readers.push(spawn_reader(stream, sender.clone()));
        }
        drop(sender);

        loop {
            if interrupted.load(Ordering::SeqCst) {
                let _ = child.kill();
                let _ = child.wait();
                writeln!(writer)?;
                writeln!(writer, "{}", style("Build interrupted").yellow())?;
                let outcome = Outcome {
                    issues: Vec::new(),
                    stats: parser.stats().clone(),
                    success: false,
                    exit_code: ExitCode::from(130),
                };
                return conclude(writer, &parser, outcome, &self.report, &self.directory);
            }
            match receiver.recv_timeout(POLL_INTERVAL) {
                Ok(line) => forward_line(writer, &mut parser, self.verbose, &line)?,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        for reader in readers {
            reader
                .join()
                .map_err(|_| RuntimeError::Thread("Reader thread panicked"))?;
        }
        let exit_status = child.wait()?;

        parser.finalize();
        let mut stats = parser.stats().clone();
        stats.duration = started.elapsed();

        // The exit code is not always available. When the process is killed
        // by a signal, the exit code is not available. In this case, we
        // return the `FAILURE` exit code.
        let exit_code = exit_status
            .code()
            .map(|code| ExitCode::from(code as u8))
            .unwrap_or(ExitCode::FAILURE);

        let outcome = Outcome {
            issues: parser.issues().to_vec(),
            stats,
            success: exit_status.success(),
            exit_code,
        };
        conclude(writer, &parser, outcome, &self.report, &self.directory)
    }
}

/// Parses a previously saved build log.
pub struct ReplaySession {
    pub(super) directory: PathBuf,
    pub(super) file: String,
    pub(super) parser: ParserChoice,
    pub(super) report: ReportOptions,
    pub(super) verbose: bool,
}

impl ReplaySession {
    pub fn run(self) -> Result<ExitCode, RuntimeError> {
        let mut writer = io::stdout().lock();
        self.execute(&mut writer)
    }

    fn execute(self, writer: &mut impl Write) -> Result<ExitCode, RuntimeError> {
        let mut parser = self.parser.instantiate(&self.directory);
        let started = Instant::now();

        writeln!(writer, "{} {}", style("Parsing file:").bold(), self.file)?;
        writeln!(writer)?;

        let file = match fs::File::open(&self.file) {
            Ok(file) => file,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                writeln!(
                    writer,
                    "{}",
                    style(format!("Error: File not found: {}", self.file)).red()
                )?;
                let outcome = Outcome {
                    issues: Vec::new(),
                    stats: parser.stats().clone(),
                    success: false,
                    exit_code: ExitCode::from(1),
                };
                return conclude(writer, &parser, outcome, &self.report, &self.directory);
            }
            Err(error) => return Err(RuntimeError::Io(error)),
        };

        for line in io::BufReader::new(file).lines() {
            let line = line?;
            forward_line(writer, &mut parser, self.verbose, &line)?;
        }

        parser.finalize();
        let mut stats = parser.stats().clone();
        stats.duration = started.elapsed();

        let success = stats.errors == 0;
        let exit_code = if success {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(1)
        };
        let outcome = Outcome {
            issues: parser.issues().to_vec(),
            stats,
            success,
            exit_code,
        };
        conclude(writer, &parser, outcome, &self.report, &self.directory)
    }
}

/// Errors that can occur while streaming build output through a session.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Input/output error: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Thread(&'static str),
}

fn spawn_reader(
    stream: impl io::Read + Send + 'static,
    sender: Sender<String>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for line in io::BufReader::new(stream).lines() {
            let Ok(line) = line else { break };
            if sender.send(line).is_err() {
                break;
            }
        }
    })
}

/// Feeds one line to the parser and writes what the user should see: the
/// raw line when verbose, otherwise only the parser's echo.
fn forward_line(
    writer: &mut impl Write,
    parser: &mut ActiveParser,
    verbose: bool,
    line: &str,
) -> io::Result<()> {
    let line = line.trim_end();
    let echo = parser.parse_line(line);
    if verbose {
        writeln!(writer, "{line}")?;
    } else if let Some(echo) = echo {
        writeln!(writer, "{echo}")?;
    }
    writer.flush()
}

/// The common reporting tail: issue summary when there is anything to show,
/// the statistics block always, and the auto-detection footer when a
/// compiler was identified on the fly.
fn conclude(
    writer: &mut impl Write,
    parser: &ActiveParser,
    outcome: Outcome,
    options: &ReportOptions,
    directory: &Path,
) -> Result<ExitCode, RuntimeError> {
    let settings = ReportSettings::detect(
        options.max_locations,
        options.show_severity,
        directory.to_path_buf(),
    );

    if !outcome.issues.is_empty() {
        report::write_summary_banner(writer)?;
        let grouped = grouping::group_issues(&outcome.issues);
        report::write_issue_summary(writer, &grouped, &settings)?;
    }

    report::write_build_stats(writer, &outcome.stats, outcome.success)?;

    if let Some(key) = parser.detected() {
        writeln!(writer)?;
        writeln!(
            writer,
            "{}",
            style(format!("Auto-detected compiler: {key}")).dim()
        )?;
    }

    Ok(outcome.exit_code)
}
