// SPDX-License-Identifier: GPL-3.0-or-later

//! Command line surface, configuration discovery and build mode runs.

use anyhow::Result;
use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

fn muffle() -> Result<Command> {
    Ok(Command::cargo_bin("muffle")?)
}

fn transcript(name: &str) -> String {
    std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
        .display()
        .to_string()
}

#[test]
fn help_prints_usage() -> Result<()> {
    muffle()?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: muffle"))
        .stdout(predicate::str::contains("--parser"))
        .stdout(predicate::str::contains("--max-locations"))
        .stdout(predicate::str::contains("--no-severity"));
    Ok(())
}

#[test]
fn version_names_the_package() -> Result<()> {
    muffle()?
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("muffle"));
    Ok(())
}

#[test]
fn unknown_flags_are_rejected() -> Result<()> {
    muffle()?
        .arg("--frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unexpected argument"));
    Ok(())
}

#[test]
fn unknown_parser_keys_are_rejected_with_the_alternatives() -> Result<()> {
    // The parser flag is restricted to "auto" and the registered keys.
    muffle()?
        .args(["-p", "fortran", "-f", "whatever.log"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'fortran'"))
        .stderr(predicate::str::contains("possible values"));
    Ok(())
}

#[test]
fn discovered_config_file_controls_the_run() -> Result<()> {
    // A muffle.yml in the working directory fixes the parser (no detection
    // footer) and caps the location list.
    let workdir = assert_fs::TempDir::new()?;
    workdir.child("muffle.yml").write_str(concat!(
        "schema: \"1.0\"\n",
        "parser: dotnet\n",
        "report:\n",
        "  max_locations: 1\n",
    ))?;

    muffle()?
        .current_dir(&workdir)
        .args(["-f", &transcript("dotnet-build.log")])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("... and 1 more"))
        .stdout(predicate::str::contains("Auto-detected").not());
    Ok(())
}

#[test]
fn command_line_flags_override_the_config_file() -> Result<()> {
    let workdir = assert_fs::TempDir::new()?;
    workdir.child("muffle.yml").write_str(concat!(
        "schema: \"1.0\"\n",
        "parser: dotnet\n",
        "report:\n",
        "  max_locations: 1\n",
    ))?;

    muffle()?
        .current_dir(&workdir)
        .args(["-p", "auto", "-m", "5", "-f", &transcript("dotnet-build.log")])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Auto-detected compiler: dotnet"))
        .stdout(predicate::str::contains("... and 1 more").not());
    Ok(())
}

#[test]
fn explicit_config_path_wins_over_discovery() -> Result<()> {
    // The working directory file would keep severity badges on; the file
    // named with -c turns them off.
    let workdir = assert_fs::TempDir::new()?;
    workdir.child("muffle.yml").write_str("schema: \"1.0\"\n")?;
    workdir.child("quiet.yml").write_str(concat!(
        "schema: \"1.0\"\n",
        "report:\n",
        "  severity: false\n",
    ))?;

    muffle()?
        .current_dir(&workdir)
        .args(["-c", "quiet.yml", "-f", &transcript("qt-build.log")])
        .assert()
        .success()
        .stdout(predicate::str::contains("⚠ WARNING: unused variable"))
        .stdout(predicate::str::contains("[MEDIUM]").not());
    Ok(())
}

#[test]
fn invalid_config_values_abort_the_run() -> Result<()> {
    let workdir = assert_fs::TempDir::new()?;
    workdir
        .child("muffle.yml")
        .write_str("schema: \"1.0\"\nbuild:\n  jobs: 0\n")?;

    muffle()?
        .current_dir(&workdir)
        .args(["-f", &transcript("qt-build.log")])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("build.jobs"));
    Ok(())
}

#[test]
fn unsupported_config_schema_aborts_the_run() -> Result<()> {
    let workdir = assert_fs::TempDir::new()?;
    workdir.child("muffle.yml").write_str("schema: \"7.0\"\n")?;

    muffle()?
        .current_dir(&workdir)
        .args(["-f", &transcript("qt-build.log")])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Unsupported schema version"));
    Ok(())
}

#[test]
fn transcript_without_issues_skips_the_summary() -> Result<()> {
    let workdir = assert_fs::TempDir::new()?;
    workdir
        .child("quiet.log")
        .write_str("gcc -c -o main.o main.c\n")?;

    muffle()?
        .current_dir(&workdir)
        .args(["-f", "quiet.log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Issue Summary").not())
        .stdout(predicate::str::contains("Files compiled: 1"))
        .stdout(predicate::str::contains("✓ Build SUCCESS"));
    Ok(())
}

#[test]
fn build_without_a_makefile_fails_immediately() -> Result<()> {
    // No Makefile in the working directory and none under build/: the run
    // stops before any command is spawned, without a statistics block.
    let workdir = assert_fs::TempDir::new()?;

    muffle()?
        .current_dir(&workdir)
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains(
            "Error: No Makefile found. Run qmake first.",
        ))
        .stdout(predicate::str::contains("Build Statistics").not());
    Ok(())
}

#[test]
fn unknown_build_command_is_reported_with_statistics() -> Result<()> {
    let workdir = assert_fs::TempDir::new()?;
    workdir.child("Makefile").write_str("all:\n")?;
    workdir
        .child("muffle.yml")
        .write_str("schema: \"1.0\"\nbuild:\n  command: muffle-no-such-build-tool\n")?;

    muffle()?
        .current_dir(&workdir)
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains(
            "Error: Command not found: muffle-no-such-build-tool",
        ))
        .stdout(predicate::str::contains("Build Statistics"))
        .stdout(predicate::str::contains("✗ Build FAILED"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn build_runs_the_configured_command_and_condenses_its_output() -> Result<()> {
    // The configured command runs with the default job count appended; its
    // stdout and stderr are both parsed.
    let workdir = assert_fs::TempDir::new()?;
    workdir.child("Makefile").write_str("all:\n")?;
    workdir.child("muffle.yml").write_str(concat!(
        "schema: \"1.0\"\n",
        "parser: gcc\n",
        "build:\n",
        "  command: sh build.sh\n",
    ))?;
    workdir.child("build.sh").write_str(concat!(
        "echo \"g++ -c -O2 -o main.o src/main.cpp\"\n",
        "echo \"src/main.cpp:42:10: warning: unused variable 'count' [-Wunused-variable]\" >&2\n",
    ))?;

    muffle()?
        .current_dir(&workdir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Running: sh build.sh -j8"))
        .stdout(predicate::str::contains("[CC] main.cpp → main.o"))
        .stdout(predicate::str::contains("⚠ WARNING [MEDIUM]: unused variable"))
        .stdout(predicate::str::contains("src/main.cpp:42:10"))
        .stdout(predicate::str::contains("Warnings:       1"))
        .stdout(predicate::str::contains("✓ Build SUCCESS"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn clean_flag_runs_the_clean_command_quietly() -> Result<()> {
    // `<command> clean` runs first with its output suppressed; only the
    // notice is shown before the real build starts.
    let workdir = assert_fs::TempDir::new()?;
    workdir.child("Makefile").write_str("all:\n")?;
    workdir.child("muffle.yml").write_str(concat!(
        "schema: \"1.0\"\n",
        "parser: gcc\n",
        "build:\n",
        "  command: sh build.sh\n",
    ))?;
    workdir.child("build.sh").write_str(concat!(
        "if [ \"$1\" = \"clean\" ]; then echo \"CLEAN MARKER\"; exit 0; fi\n",
        "echo \"g++ -c -O2 -o main.o src/main.cpp\"\n",
    ))?;

    muffle()?
        .current_dir(&workdir)
        .arg("--clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleaning..."))
        .stdout(predicate::str::contains("CLEAN MARKER").not())
        .stdout(predicate::str::contains("[CC] main.cpp → main.o"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn jobs_flag_and_target_reach_the_command_line() -> Result<()> {
    let workdir = assert_fs::TempDir::new()?;
    workdir.child("Makefile").write_str("all:\n")?;
    workdir
        .child("muffle.yml")
        .write_str("schema: \"1.0\"\nbuild:\n  command: sh build.sh\n")?;
    workdir.child("build.sh").write_str("exit 0\n")?;

    muffle()?
        .current_dir(&workdir)
        .args(["-j", "2", "install"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Running: sh build.sh -j2 install"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn build_falls_back_to_the_build_subdirectory() -> Result<()> {
    // qmake shadow builds keep the Makefile under build/; the session
    // switches there before running the command.
    let workdir = assert_fs::TempDir::new()?;
    workdir.child("build/Makefile").write_str("all:\n")?;
    workdir
        .child("muffle.yml")
        .write_str("schema: \"1.0\"\nbuild:\n  command: sh -c true\n")?;

    muffle()?
        .current_dir(&workdir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Changed to build directory"))
        .stdout(predicate::str::contains("✓ Build SUCCESS"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn child_exit_code_is_propagated() -> Result<()> {
    let workdir = assert_fs::TempDir::new()?;
    workdir.child("Makefile").write_str("all:\n")?;
    workdir
        .child("muffle.yml")
        .write_str("schema: \"1.0\"\nbuild:\n  command: sh -c 'exit 3'\n")?;

    muffle()?
        .current_dir(&workdir)
        .assert()
        .failure()
        .code(3)
        .stdout(predicate::str::contains("✗ Build FAILED"));
    Ok(())
}
