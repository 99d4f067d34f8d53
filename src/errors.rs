/*!
 * Error types for the epiparse application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop an episode file from being parsed.
///
/// Content problems never show up here; they are collected as warnings in the
/// validation report instead.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The input file does not exist
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The input path exists but is a directory or special file
    #[error("Input path is not a file: {}", .0.display())]
    NotAFile(PathBuf),

    /// The input is not a markdown script
    #[error("Invalid input format: {0}")]
    InvalidFormat(String),

    /// The file could not be decoded as UTF-8
    #[error("Failed to read {} with UTF-8 encoding: {message}", path.display())]
    BadEncoding {
        /// Offending file
        path: PathBuf,
        /// Decoder message
        message: String,
    },

    /// Any other I/O failure while reading the script
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Offending file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A grammar pattern failed to compile
    #[error("Invalid grammar pattern: {0}")]
    Grammar(#[from] regex::Error),
}

/// Errors raised while loading configuration.
///
/// Callers normally fall back to the default configuration on any of these.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for the expected shape
    #[error("Invalid JSON in config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Config file could not be written
    #[error("Failed to write config file {}: {message}", path.display())]
    Write { path: PathBuf, message: String },

    /// Values parsed but are out of range
    #[error("Invalid configuration value: {0}")]
    Invalid(String),
}

/// Errors raised while loading an output schema
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to read schema {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema {} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Schema {} has an unusable root: {message}", path.display())]
    Unsupported { path: PathBuf, message: String },
}
