//! TOML-based configuration for a conversion run.
//!
//! Every section is optional; a missing file behaves like an empty one.
//! Command-line flags are applied on top by the CLI before
//! [`ConvertConfig::validate`] is called.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ConfigError;
use crate::output::OutputProfile;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Where the SSSOM files come from.
    #[serde(default)]
    pub input: InputConfig,

    /// Where the node, edge and datasource CSVs go.
    #[serde(default)]
    pub output: OutputConfig,

    /// Ontology registry used to enrich edges.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Log verbosity.
    #[serde(default)]
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Input file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// An SSSOM/TSV file, or a directory of them.
    #[serde(default)]
    pub path: PathBuf,

    /// File-name glob applied when `path` is a directory.
    #[serde(default = "default_pattern")]
    pub pattern: String,
}

fn default_pattern() -> String {
    "*.tsv".into()
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            pattern: default_pattern(),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Output file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Node CSV path.
    #[serde(default = "default_nodes")]
    pub nodes: PathBuf,

    /// Edge CSV path.
    #[serde(default = "default_edges")]
    pub edges: PathBuf,

    /// Optional datasource catalog CSV path.
    #[serde(default)]
    pub datasources: Option<PathBuf>,

    /// Column layout of the node and edge files.
    #[serde(default)]
    pub profile: OutputProfile,
}

fn default_nodes() -> PathBuf {
    PathBuf::from("nodes.csv")
}
fn default_edges() -> PathBuf {
    PathBuf::from("edges.csv")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            nodes: default_nodes(),
            edges: default_edges(),
            datasources: None,
            profile: OutputProfile::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Ontology Lookup Service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// OLS base URL (e.g. `https://www.ebi.ac.uk/ols4/`). Without it every
    /// edge gets a stub datasource.
    #[serde(default)]
    pub ols_url: Option<String>,

    /// Ontologies requested per page (default 1000).
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Per-request timeout in seconds (default 60).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_page_size() -> u32 {
    1000
}
fn default_timeout() -> u64 {
    60
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            ols_url: None,
            page_size: default_page_size(),
            timeout_secs: default_timeout(),
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum tracing level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading & validation
// ---------------------------------------------------------------------------

impl ConvertConfig {
    /// Default location: `<config dir>/sssom2neo/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sssom2neo").join("config.toml"))
    }

    /// Load a [`ConvertConfig`] from a TOML file at the given path.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: ConvertConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Load from `path` if given (it must exist), else from
    /// [`default_path`](Self::default_path) if that exists, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::load_from_file(default),
                _ => {
                    debug!("no configuration file; using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Validate that all required fields are present and sane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "input.path".into(),
                detail: "input path must not be empty".into(),
            });
        }
        if self.input.pattern.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "input.pattern".into(),
                detail: "file pattern must not be empty".into(),
            });
        }
        if self.output.nodes.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "output.nodes".into(),
                detail: "node output path must not be empty".into(),
            });
        }
        if self.output.edges.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "output.edges".into(),
                detail: "edge output path must not be empty".into(),
            });
        }
        if self.output.nodes == self.output.edges {
            return Err(ConfigError::InvalidValue {
                field: "output.edges".into(),
                detail: "node and edge outputs must be different files".into(),
            });
        }
        if let Some(datasources) = &self.output.datasources {
            if *datasources == self.output.nodes || *datasources == self.output.edges {
                return Err(ConfigError::InvalidValue {
                    field: "output.datasources".into(),
                    detail: "datasource output must not overwrite the node or edge file".into(),
                });
            }
        }
        self.validate_registry()
    }

    /// Validate only the `[registry]` section.
    pub fn validate_registry(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.registry.ols_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidValue {
                    field: "registry.ols_url".into(),
                    detail: "OLS URL must start with http:// or https://".into(),
                });
            }
        }
        if self.registry.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "registry.page_size".into(),
                detail: "page size must be > 0".into(),
            });
        }
        if self.registry.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "registry.timeout_secs".into(),
                detail: "timeout must be > 0".into(),
            });
        }

        Ok(())
    }

    /// Convenience: load and validate in one call.
    pub fn load_and_validate<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }
}
