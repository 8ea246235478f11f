//! Error types for the sssom2neo core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them all for callers that want a
//! single error type.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Header(#[from] HeaderError),

    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

// ---------------------------------------------------------------------------
// SSSOM header errors
// ---------------------------------------------------------------------------

/// Errors from reading the YAML comment block at the top of an SSSOM file.
#[derive(Debug, Error)]
pub enum HeaderError {
    /// A key the conversion depends on is absent from the header.
    #[error("SSSOM header of '{path}' is missing required key '{key}'")]
    MissingKey { path: String, key: String },

    /// The comment block is not valid YAML (or has the wrong shape).
    #[error("SSSOM header of '{path}' is not valid YAML: {detail}")]
    Yaml { path: String, detail: String },

    /// The file could not be read.
    #[error("failed to read SSSOM header of '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Conversion errors
// ---------------------------------------------------------------------------

/// Errors from the mapping-to-graph conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The file header is unusable; aborts the whole run.
    #[error(transparent)]
    Header(#[from] HeaderError),

    /// A column the edge or node output depends on is absent from the TSV.
    #[error("'{path}' has no '{column}' column")]
    MissingColumn { path: String, column: String },

    /// The TSV body could not be parsed.
    #[error("failed to parse mappings in '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// An input path could not be read or listed.
    #[error("input I/O error at '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A directory input contained nothing matching the file pattern.
    #[error("no input files matching '{pattern}' in '{path}'")]
    NoInputs { path: String, pattern: String },

    /// Writing a node or edge row failed.
    #[error(transparent)]
    Output(#[from] OutputError),
}

// ---------------------------------------------------------------------------
// Registry errors
// ---------------------------------------------------------------------------

/// Errors from fetching datasource metadata from the ontology registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// HTTP-level transport error (network, TLS, timeout).
    #[error("registry HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The registry answered with something that is not an ontology page.
    #[error("registry response parse error: {0}")]
    Parse(String),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Output errors
// ---------------------------------------------------------------------------

/// Errors from writing node, edge or datasource CSV rows.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The CSV writer failed.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// Could not create or flush an output file.
    #[error("output I/O error at '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A datasource descriptor could not be serialized to JSON.
    #[error("failed to serialize datasource: {0}")]
    Json(#[from] serde_json::Error),
}

// CoreError is for library callers that handle every subsystem through one
// type; the CLI keeps the specific errors and adds anyhow context instead.
