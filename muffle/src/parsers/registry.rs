// SPDX-License-Identifier: GPL-3.0-or-later

//! Central table of supported compilers.
//!
//! Each entry carries the metadata auto-detection needs: file extensions,
//! project files, keywords seen in build output and command spellings.
//! Adding a compiler means implementing [`Parser`] and appending one entry
//! here; detection and the CLI pick it up from the table.

use crate::parsers::avr::AvrGccParser;
use crate::parsers::dotnet::DotNetParser;
use crate::parsers::gcc::GccParser;
use crate::parsers::rustc::RustcParser;
use crate::parsers::Parser;

pub const GCC: &str = "gcc";
pub const CLANG: &str = "clang";
pub const AVR_GCC: &str = "avr-gcc";
pub const DOTNET: &str = "dotnet";
pub const RUST: &str = "rust";

pub struct CompilerMetadata {
    pub key: &'static str,
    pub name: &'static str,
    pub extensions: &'static [&'static str],
    pub project_files: &'static [&'static str],
    pub detection_keywords: &'static [&'static str],
    pub command_patterns: &'static [&'static str],
    make: fn() -> Box<dyn Parser>,
}

impl CompilerMetadata {
    pub fn instantiate(&self) -> Box<dyn Parser> {
        (self.make)()
    }
}

/// Registered compilers, in detection priority order.
#[rustfmt::skip]
pub static COMPILERS: [CompilerMetadata; 5] = [
    CompilerMetadata {
        key: GCC,
        name: "GNU C/C++ Compiler",
        extensions: &[".c", ".cpp", ".cc", ".cxx", ".h", ".hpp"],
        project_files: &["Makefile", "GNUmakefile", "makefile", "CMakeLists.txt"],
        detection_keywords: &["gcc", "g++", "gnu", "Building CXX object"],
        command_patterns: &["gcc", "g++", "/usr/bin/gcc", "/usr/bin/g++"],
        make: || Box::new(GccParser::new()),
    },
    CompilerMetadata {
        key: CLANG,
        name: "Clang/LLVM C/C++ Compiler",
        extensions: &[".c", ".cpp", ".cc", ".cxx", ".h", ".hpp"],
        project_files: &["CMakeLists.txt", "Makefile"],
        detection_keywords: &["clang", "clang++", "llvm", "Building CXX object"],
        command_patterns: &["clang", "clang++", "/usr/bin/clang", "/usr/bin/clang++"],
        make: || Box::new(GccParser::new()),
    },
    CompilerMetadata {
        key: AVR_GCC,
        name: "AVR-GCC Microcontroller Compiler",
        extensions: &[".c", ".cpp", ".h", ".hpp"],
        project_files: &["Makefile", "avr-makefile"],
        detection_keywords: &["avr-gcc", "avr-g++", "avr"],
        command_patterns: &["avr-gcc", "avr-g++"],
        make: || Box::new(AvrGccParser::new()),
    },
    CompilerMetadata {
        key: DOTNET,
        name: ".NET/MSBuild C# Compiler",
        extensions: &[".cs", ".csproj", ".sln"],
        project_files: &["*.csproj", "*.sln", "Directory.Build.props"],
        detection_keywords: &["dotnet", "msbuild", "csc", "net9.0", "net8.0", "net7.0"],
        command_patterns: &["dotnet", "msbuild", "csc"],
        make: || Box::new(DotNetParser::new()),
    },
    CompilerMetadata {
        key: RUST,
        name: "Rust Compiler",
        extensions: &[".rs"],
        project_files: &["Cargo.toml", "Cargo.lock"],
        detection_keywords: &["rustc", "cargo", "rust"],
        command_patterns: &["rustc", "cargo"],
        make: || Box::new(RustcParser::new()),
    },
];

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Compiler '{key}' is not registered. Available: {available}")]
    UnknownCompiler { key: String, available: String },
}

pub fn find(key: &str) -> Option<&'static CompilerMetadata> {
    COMPILERS.iter().find(|metadata| metadata.key == key)
}

/// Parser family substituted when a requested key is not registered.
pub fn fallback() -> &'static CompilerMetadata {
    &COMPILERS[0]
}

pub fn create(key: &str) -> Result<Box<dyn Parser>, RegistryError> {
    find(key)
        .map(CompilerMetadata::instantiate)
        .ok_or_else(|| RegistryError::UnknownCompiler {
            key: key.to_string(),
            available: keys().collect::<Vec<_>>().join(", "),
        })
}

pub fn keys() -> impl Iterator<Item = &'static str> {
    COMPILERS.iter().map(|metadata| metadata.key)
}
