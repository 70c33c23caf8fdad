// SPDX-License-Identifier: GPL-3.0-or-later

//! End-to-end runs of the replay mode over recorded build transcripts.
//!
//! The transcripts under `tests/fixtures/` are condensed captures of real
//! qmake/make, AVR firmware, cargo and MSBuild sessions.

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn muffle() -> Result<Command> {
    Ok(Command::cargo_bin("muffle")?)
}

/// Absolute path of a recorded transcript.
fn transcript(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
        .display()
        .to_string()
}

#[test]
fn qt_transcript_is_condensed_and_grouped() -> Result<()> {
    // The same header warning reported from two include spellings collapses
    // to one location, compile and moc commands shrink to progress echoes,
    // and a build without errors exits zero.
    let workdir = assert_fs::TempDir::new()?;

    muffle()?
        .current_dir(&workdir)
        .args(["-f", &transcript("qt-build.log")])
        .assert()
        .success()
        .stdout(predicate::str::contains("[CC] main.cpp → main.o"))
        .stdout(predicate::str::contains("[MOC] widget.h → moc_widget.cpp"))
        .stdout(predicate::str::contains(
            "⚠ WARNING [LOW]: overrides a member function but is not marked",
        ))
        .stdout(predicate::str::contains("include/utils.h:23:10").count(1))
        .stdout(predicate::str::contains("⚠ WARNING [MEDIUM]: unused variable"))
        .stdout(predicate::str::contains(
            "found deprecated declaration: use setContentsMargins(int, int, int, int) instead.",
        ))
        .stdout(predicate::str::contains(
            "'setMargin' has been explicitly marked deprecated here",
        ))
        .stdout(predicate::str::contains("Files compiled: 2"))
        .stdout(predicate::str::contains("MOC generated:  1"))
        .stdout(predicate::str::contains("Warnings:       4"))
        .stdout(predicate::str::contains("Errors:         0"))
        .stdout(predicate::str::contains("✓ Build SUCCESS"))
        .stdout(predicate::str::contains("Auto-detected compiler: gcc"));
    Ok(())
}

#[test]
fn avr_transcript_with_a_fixed_parser() -> Result<()> {
    // A firmware link failure: the undefined reference keeps its location,
    // collect2's repetition of the failure is dropped, and the parse error
    // count drives a non-zero exit.
    let workdir = assert_fs::TempDir::new()?;

    muffle()?
        .current_dir(&workdir)
        .args(["-p", "avr-gcc", "-f", &transcript("avr-firmware.log")])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("[CC] comm_port.c → comm_port.o"))
        .stdout(predicate::str::contains(
            "⚠ WARNING [HIGH]: this statement may fall through",
        ))
        .stdout(predicate::str::contains(
            "✗ ERROR: undefined reference to `engine_update'",
        ))
        .stdout(predicate::str::contains("control_module.c:211:0"))
        .stdout(predicate::str::contains(
            "make: *** [Makefile:87: firmware.elf] Error 1",
        ))
        .stdout(predicate::str::contains("collect2").not())
        .stdout(predicate::str::contains("Warnings:       1"))
        .stdout(predicate::str::contains("Errors:         1"))
        .stdout(predicate::str::contains("✗ Build FAILED"))
        .stdout(predicate::str::contains("Auto-detected").not());
    Ok(())
}

#[test]
fn avr_commands_auto_detect_as_host_gcc() -> Result<()> {
    // "avr-gcc" contains "gcc" and the gcc registry entry is checked first,
    // so without an explicit parser the footer names the host compiler.
    let workdir = assert_fs::TempDir::new()?;

    muffle()?
        .current_dir(&workdir)
        .args(["-f", &transcript("avr-firmware.log")])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Auto-detected compiler: gcc"));
    Ok(())
}

#[test]
fn cargo_transcript_is_summarized() -> Result<()> {
    // Multi-line rustc diagnostics are stitched together: the header gives
    // kind and message, the `-->` line the location, and the lint annotation
    // the category. The "aborting due to" trailer still counts as an error.
    let workdir = assert_fs::TempDir::new()?;

    muffle()?
        .current_dir(&workdir)
        .args(["-f", &transcript("rust-build.log")])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Compiling libc..."))
        .stdout(predicate::str::contains(
            "⚠ WARNING [MEDIUM]: unused variable: `retries`",
        ))
        .stdout(predicate::str::contains("Category: unused_variables"))
        .stdout(predicate::str::contains("network/client.rs:341:13"))
        .stdout(predicate::str::contains("✗ ERROR: mismatched types"))
        .stdout(predicate::str::contains("Category: E0308"))
        .stdout(predicate::str::contains("network/client.rs:402:20"))
        .stdout(predicate::str::contains("Files compiled: 2"))
        .stdout(predicate::str::contains("Warnings:       1"))
        .stdout(predicate::str::contains("Errors:         2"))
        .stdout(predicate::str::contains("Auto-detected compiler: rust"));
    Ok(())
}

#[test]
fn dotnet_transcript_orders_repeated_diagnostics_first() -> Result<()> {
    // The twice-reported CS0168 leads the summary, its two distinct
    // locations both survive deduplication, and the documentation URL is
    // stripped from the obsoletion warning.
    let workdir = assert_fs::TempDir::new()?;

    let assert = muffle()?
        .current_dir(&workdir)
        .args(["-f", &transcript("dotnet-build.log")])
        .assert()
        .failure()
        .code(1);

    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
    assert!(stdout.contains("⚠ WARNING [MEDIUM]: The variable is declared but never used"));
    assert!(stdout.contains("Occurrences (2):"));
    assert!(stdout.contains("Ape/Client.cs:76:34"));
    assert!(stdout.contains("Ape/Client.cs:94:21"));
    assert!(stdout.contains("⚠ WARNING [CRITICAL]: Dereference of a possibly null reference."));
    assert!(stdout.contains("⚠ WARNING [LOW]: is obsolete"));
    assert!(!stdout.contains("aka.ms"));
    assert!(stdout.contains("✗ ERROR: The name does not exist in the current context"));
    assert!(stdout.contains("Files compiled: 1"));
    assert!(stdout.contains("Warnings:       4"));
    assert!(stdout.contains("Errors:         1"));
    assert!(stdout.contains("Auto-detected compiler: dotnet"));

    let repeated = stdout.find("The variable is declared but never used").unwrap();
    let single = stdout.find("Dereference of a possibly null reference").unwrap();
    assert!(repeated < single);
    Ok(())
}

#[test]
fn missing_transcript_reports_and_fails() -> Result<()> {
    // A nonexistent file is reported on stdout, the statistics block is
    // still printed, and the exit code is one.
    let workdir = assert_fs::TempDir::new()?;

    muffle()?
        .current_dir(&workdir)
        .args(["-f", "absent.log"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Error: File not found: absent.log"))
        .stdout(predicate::str::contains("Build Statistics"))
        .stdout(predicate::str::contains("✗ Build FAILED"))
        .stdout(predicate::str::contains("Issue Summary").not());
    Ok(())
}

#[test]
fn verbose_replay_streams_the_raw_transcript() -> Result<()> {
    // With -v the raw lines are shown instead of the condensed echoes; the
    // summary at the end stays.
    let workdir = assert_fs::TempDir::new()?;

    muffle()?
        .current_dir(&workdir)
        .args(["-v", "-f", &transcript("qt-build.log")])
        .assert()
        .success()
        .stdout(predicate::str::contains("g++ -c -pipe -O2"))
        .stdout(predicate::str::contains("[-Wunused-variable]"))
        .stdout(predicate::str::contains("[CC]").not())
        .stdout(predicate::str::contains("Issue Summary"));
    Ok(())
}

#[test]
fn severity_badges_can_be_switched_off() -> Result<()> {
    let workdir = assert_fs::TempDir::new()?;

    muffle()?
        .current_dir(&workdir)
        .args(["--no-severity", "-f", &transcript("qt-build.log")])
        .assert()
        .success()
        .stdout(predicate::str::contains("⚠ WARNING: unused variable"))
        .stdout(predicate::str::contains("[MEDIUM]").not())
        .stdout(predicate::str::contains("[LOW]").not());
    Ok(())
}

#[test]
fn location_lists_are_capped_with_an_overflow_line() -> Result<()> {
    let workdir = assert_fs::TempDir::new()?;

    muffle()?
        .current_dir(&workdir)
        .args(["-m", "1", "-f", &transcript("dotnet-build.log")])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Occurrences (2):"))
        .stdout(predicate::str::contains("Ape/Client.cs:76:34"))
        .stdout(predicate::str::contains("Ape/Client.cs:94:21").not())
        .stdout(predicate::str::contains("... and 1 more"));
    Ok(())
}
