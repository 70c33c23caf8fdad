// SPDX-License-Identifier: GPL-3.0-or-later

//! This module defines the configuration of the application.
//!
//! The configuration is either loaded from a file or used with default
//! values, which are defined in the code. Command line flags override
//! whatever the file provides.
//!
//! The configuration file syntax is based on the YAML format.
//! The default configuration file name is `muffle.yml`.
//!
//! The configuration file location is searched in the following order:
//! 1. The current working directory
//! 2. The local configuration directory of the user
//! 3. The configuration directory of the user
//! 4. The local configuration directory of the application
//! 5. The configuration directory of the application
//!
//! ```yaml
//! schema: "1.0"
//!
//! parser: auto
//!
//! build:
//!   command: make
//!   jobs: 8
//!
//! report:
//!   max_locations: 5
//!   severity: true
//! ```

// Re-Export the types and the loader module content.
pub use loader::{ConfigError, Loader};
pub use types::*;
pub use validation::Validator;

mod types {
    use serde::Deserialize;
    use std::fmt;

    /// Represents the application configuration.
    #[derive(Debug, PartialEq, serde::Deserialize, serde::Serialize)]
    pub struct Main {
        #[serde(deserialize_with = "validate_schema_version")]
        pub schema: String,
        #[serde(default = "default_parser")]
        pub parser: String,
        #[serde(default)]
        pub build: Build,
        #[serde(default)]
        pub report: Report,
    }

    impl Default for Main {
        fn default() -> Self {
            Self {
                schema: String::from(SUPPORTED_SCHEMA_VERSION),
                parser: default_parser(),
                build: Build::default(),
                report: Report::default(),
            }
        }
    }

    impl fmt::Display for Main {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            writeln!(f, "Configuration:")?;
            match serde_yml::to_string(self) {
                Ok(yaml_string) => {
                    for line in yaml_string.lines() {
                        writeln!(f, "{}", line)?;
                    }
                    Ok(())
                }
                Err(_) => {
                    panic!("configuration can't be serialized")
                }
            }
        }
    }

    /// How the build command is composed.
    #[derive(Debug, PartialEq, serde::Deserialize, serde::Serialize)]
    pub struct Build {
        #[serde(default = "default_build_command")]
        pub command: String,
        #[serde(default = "default_jobs")]
        pub jobs: u32,
    }

    impl Default for Build {
        fn default() -> Self {
            Self {
                command: default_build_command(),
                jobs: default_jobs(),
            }
        }
    }

    /// How the issue summary is rendered.
    #[derive(Debug, PartialEq, serde::Deserialize, serde::Serialize)]
    pub struct Report {
        #[serde(default = "default_max_locations")]
        pub max_locations: usize,
        #[serde(default = "default_enabled")]
        pub severity: bool,
    }

    impl Default for Report {
        fn default() -> Self {
            Self {
                max_locations: default_max_locations(),
                severity: true,
            }
        }
    }

    const SUPPORTED_SCHEMA_VERSION: &str = "1.0";

    fn default_parser() -> String {
        String::from("auto")
    }

    fn default_build_command() -> String {
        String::from("make")
    }

    fn default_jobs() -> u32 {
        8
    }

    fn default_max_locations() -> usize {
        5
    }

    fn default_enabled() -> bool {
        true
    }

    // Custom deserialization function to validate the schema version
    fn validate_schema_version<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let schema: String = Deserialize::deserialize(deserializer)?;
        if schema != SUPPORTED_SCHEMA_VERSION {
            use serde::de::Error;
            Err(Error::custom(format!(
                "Unsupported schema version: {schema}. Expected: {SUPPORTED_SCHEMA_VERSION}"
            )))
        } else {
            Ok(schema)
        }
    }
}

pub mod validation {

    use super::types::*;
    use crate::parsers::registry;
    use thiserror::Error;

    /// Trait for validating configuration objects
    pub trait Validator<T> {
        type Error: std::error::Error;

        fn validate(config: &T) -> Result<(), Self::Error>;
    }

    /// Validation errors for configuration
    #[derive(Debug, Error)]
    pub enum ValidationError {
        #[error("Empty string value for field '{field}'")]
        EmptyString { field: &'static str },
        #[error("Value for '{field}' must be at least {minimum}")]
        BelowMinimum { field: &'static str, minimum: u32 },
        #[error("Unknown parser '{key}'. Available: auto, {available}")]
        UnknownParser { key: String, available: String },
        #[error("Multiple validation errors: {errors:?}")]
        Multiple { errors: Vec<ValidationError> },
    }

    /// Combinator for collecting and handling validation errors
    #[derive(Default)]
    struct ValidationCollector {
        errors: Vec<ValidationError>,
    }

    impl ValidationCollector {
        fn new() -> Self {
            Self { errors: Vec::new() }
        }

        fn add(&mut self, error: ValidationError) {
            self.errors.push(error);
        }

        fn add_result(&mut self, result: Result<(), ValidationError>) {
            if let Err(error) = result {
                match error {
                    ValidationError::Multiple { errors } => {
                        self.errors.extend(errors);
                    }
                    single_error => self.errors.push(single_error),
                }
            }
        }

        fn finish(self) -> Result<(), ValidationError> {
            if self.errors.is_empty() {
                Ok(())
            } else if self.errors.len() == 1 {
                Err(self.errors.into_iter().next().unwrap())
            } else {
                Err(ValidationError::Multiple { errors: self.errors })
            }
        }
    }

    impl Validator<Main> for Main {
        type Error = ValidationError;

        fn validate(config: &Main) -> Result<(), Self::Error> {
            let mut collector = ValidationCollector::new();

            if config.parser != "auto" && registry::find(&config.parser).is_none() {
                collector.add(ValidationError::UnknownParser {
                    key: config.parser.clone(),
                    available: registry::keys().collect::<Vec<_>>().join(", "),
                });
            }

            collector.add_result(Build::validate(&config.build));
            collector.add_result(Report::validate(&config.report));

            collector.finish()
        }
    }

    impl Validator<Build> for Build {
        type Error = ValidationError;

        fn validate(config: &Build) -> Result<(), Self::Error> {
            let mut collector = ValidationCollector::new();

            if config.command.trim().is_empty() {
                collector.add(ValidationError::EmptyString { field: "build.command" });
            }
            if config.jobs < 1 {
                collector.add(ValidationError::BelowMinimum { field: "build.jobs", minimum: 1 });
            }

            collector.finish()
        }
    }

    impl Validator<Report> for Report {
        type Error = ValidationError;

        fn validate(config: &Report) -> Result<(), Self::Error> {
            if config.max_locations < 1 {
                return Err(ValidationError::BelowMinimum {
                    field: "report.max_locations",
                    minimum: 1,
                });
            }
            Ok(())
        }
    }

    #[cfg(test)]
    mod test {
        use super::*;

        #[test]
        fn default_configuration_is_valid() {
            assert!(Main::validate(&Main::default()).is_ok());
        }

        #[test]
        fn every_registry_key_is_a_valid_parser() {
            for key in registry::keys() {
                let config = Main {
                    parser: key.to_string(),
                    ..Main::default()
                };
                assert!(Main::validate(&config).is_ok());
            }
        }

        #[test]
        fn unknown_parser_is_rejected() {
            let config = Main {
                parser: String::from("fortran"),
                ..Main::default()
            };
            let error = Main::validate(&config).unwrap_err();
            assert!(error.to_string().contains("'fortran'"));
            assert!(error.to_string().contains("gcc"));
        }

        #[test]
        fn zero_jobs_is_rejected() {
            let config = Build {
                jobs: 0,
                ..Build::default()
            };
            let error = Build::validate(&config).unwrap_err();
            assert!(error.to_string().contains("build.jobs"));
        }

        #[test]
        fn empty_build_command_is_rejected() {
            let config = Build {
                command: String::from("  "),
                ..Build::default()
            };
            assert!(Build::validate(&config).is_err());
        }

        #[test]
        fn zero_max_locations_is_rejected() {
            let config = Report {
                max_locations: 0,
                ..Report::default()
            };
            assert!(Report::validate(&config).is_err());
        }

        #[test]
        fn multiple_problems_are_collected() {
            let config = Main {
                parser: String::from("nope"),
                build: Build {
                    command: String::new(),
                    jobs: 0,
                },
                ..Main::default()
            };
            let error = Main::validate(&config).unwrap_err();
            match error {
                ValidationError::Multiple { errors } => assert_eq!(errors.len(), 3),
                other => panic!("expected multiple errors, got: {other}"),
            }
        }
    }
}

pub mod loader {
    use super::{Main, Validator};
    use directories::{BaseDirs, ProjectDirs};
    use log::{debug, info};
    use std::fs::OpenOptions;
    use std::path::{Path, PathBuf};
    use thiserror::Error;

    pub struct Loader {}

    impl Loader {
        /// Loads the configuration from the specified file or the default locations.
        ///
        /// If the configuration file is specified, it will be used. Otherwise, the default locations
        /// will be searched for the configuration file. If the configuration file is not found, the
        /// default configuration will be returned.
        pub fn load(
            context: &crate::context::Context,
            filename: &Option<String>,
        ) -> Result<Main, ConfigError> {
            if let Some(path) = filename {
                // If the configuration file is specified, use it.
                Self::from_file(Path::new(path))
            } else {
                // Otherwise, try to find the configuration file in the default locations.
                let locations = Self::file_locations(context);
                for location in locations {
                    debug!("Checking configuration file: {}", location.display());
                    if location.exists() {
                        return Self::from_file(location.as_path());
                    }
                }
                // If the configuration file is not found, return the default configuration.
                debug!("Configuration file not found. Using the default configuration.");
                Ok(Main::default())
            }
        }

        /// The default locations where the configuration file can be found.
        fn file_locations(context: &crate::context::Context) -> Vec<PathBuf> {
            let mut locations = Vec::new();

            locations.push(context.current_directory.clone());
            if let Some(base_dirs) = BaseDirs::new() {
                locations.push(base_dirs.config_local_dir().to_path_buf());
                locations.push(base_dirs.config_dir().to_path_buf());
            }

            if let Some(proj_dirs) = ProjectDirs::from("com.github", "aklen", "muffle") {
                locations.push(proj_dirs.config_local_dir().to_path_buf());
                locations.push(proj_dirs.config_dir().to_path_buf());
            }
            // filter out duplicate elements from the list
            locations.dedup();
            // append the default configuration file name to the locations
            locations.iter().map(|p| p.join("muffle.yml")).collect()
        }

        /// Loads the configuration from the specified file.
        pub fn from_file(path: &Path) -> Result<Main, ConfigError> {
            info!("Loading configuration file: {}", path.display());

            let reader = OpenOptions::new()
                .read(true)
                .open(path)
                .map_err(|source| ConfigError::FileAccess { path: path.to_path_buf(), source })?;

            let content: Main = Self::from_reader(reader)
                .map_err(|source| ConfigError::ParseError { path: path.to_path_buf(), source })?;

            // Validate the loaded configuration
            Main::validate(&content)
                .map_err(|source| ConfigError::ValidationError { path: path.to_path_buf(), source })?;

            Ok(content)
        }

        /// Define the deserialization format of the config file.
        fn from_reader<R, T>(rdr: R) -> serde_yml::Result<T>
        where
            R: std::io::Read,
            T: serde::de::DeserializeOwned,
        {
            serde_yml::from_reader(rdr)
        }
    }

    /// Represents all possible configuration-related errors.
    #[derive(Debug, Error)]
    pub enum ConfigError {
        /// Error when opening or reading a configuration file.
        #[error("Failed to access configuration file '{path}': {source}")]
        FileAccess {
            path: PathBuf,
            #[source]
            source: std::io::Error,
        },
        /// Error when parsing the configuration file format.
        #[error("Failed to parse configuration from file '{path}': {source}")]
        ParseError {
            path: PathBuf,
            #[source]
            source: serde_yml::Error,
        },
        /// Error when the configuration content is invalid.
        #[error("Invalid configuration in file '{path}': {source}")]
        ValidationError {
            path: PathBuf,
            #[source]
            source: super::validation::ValidationError,
        },
    }

}
