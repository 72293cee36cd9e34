#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the issue summary crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.
//!
//! Every variant is fatal for the run. A missing remote file is not an error:
//! the lookup reports it as `Ok(None)` and publishing falls back to creating
//! the file.

use std::path::{Path, PathBuf};

/// Unified error type returned by the summary pipeline and CLI.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Widget configuration is malformed or violates an invariant.
    #[error("invalid widget configuration: {message}")]
    Config {
        /// Human readable message describing the validation problem.
        message: String
    },
    /// Wraps I/O errors that occur while reading a widget configuration file.
    #[error("failed to read widget configuration from {path:?}: {source}")]
    ConfigIo {
        /// Location of the configuration file.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Required run environment is missing or malformed.
    #[error("invalid environment: {message}")]
    Environment {
        /// Human readable message naming the offending input.
        message: String
    },
    /// The issue listing collaborator failed.
    #[error("failed to fetch issues: {message}")]
    Fetch {
        /// Description of the upstream failure.
        message: String
    },
    /// The remote create-or-update call failed.
    #[error("failed to publish summary: {message}")]
    PublishWrite {
        /// Description of the upstream failure.
        message: String
    },
    /// Wraps I/O errors that occur while writing the local report file.
    #[error("failed to write summary to {path:?}: {source}")]
    LocalWrite {
        /// Location of the report file.
        path:   PathBuf,
        /// Underlying I/O error reported by the operating system.
        source: std::io::Error
    },
    /// Wraps I/O errors that occur while echoing the summary to stdout.
    #[error("failed to write summary to stdout: {source}")]
    Output {
        /// Underlying I/O error, for example a closed pipe.
        source: std::io::Error
    },
    /// Wraps serialization errors when echoing the aggregation as JSON.
    #[error("failed to serialize summary: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error
    }
}

impl Error {
    /// Constructs a configuration error from the provided message.
    pub fn config<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Config {
            message: message.into()
        }
    }

    /// Constructs an environment error from the provided message.
    pub fn environment<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Environment {
            message: message.into()
        }
    }

    /// Constructs a fetch error from the provided message.
    pub fn fetch<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Fetch {
            message: message.into()
        }
    }

    /// Constructs a publish error from the provided message.
    pub fn publish_write<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::PublishWrite {
            message: message.into()
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// The returned string matches the [`std::fmt::Display`] implementation and
    /// is what the CLI prints before exiting.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

/// Creates an [`Error::ConfigIo`] variant capturing the failing path and source.
pub fn config_io_error(path: &Path, source: std::io::Error) -> Error {
    Error::ConfigIo {
        path: path.to_path_buf(),
        source
    }
}

/// Creates an [`Error::Output`] variant from a failed stdout write.
///
/// Serialization errors that are really I/O errors are reported as output
/// failures as well.
pub fn output_error(source: std::io::Error) -> Error {
    Error::Output {
        source
    }
}

/// Creates an [`Error::LocalWrite`] variant capturing the failing path and
/// source.
///
/// # Parameters
///
/// * `path` - Location of the report file that could not be written.
/// * `source` - I/O error reported by the operating system.
pub fn local_write_error(path: &Path, source: std::io::Error) -> Error {
    Error::LocalWrite {
        path: path.to_path_buf(),
        source
    }
}
