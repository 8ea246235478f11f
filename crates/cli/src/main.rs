//! sssom2neo command-line tool.
//!
//! Converts SSSOM mapping files into node and edge CSVs for graph database
//! bulk import, optionally enriching edges with datasource metadata from an
//! Ontology Lookup Service instance.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use sssom2neo_core::config::ConvertConfig;
use sssom2neo_core::output::OutputProfile;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// Convert SSSOM mappings into graph database CSVs.
#[derive(Parser, Debug)]
#[command(name = "sssom2neo", version, about)]
struct Cli {
    /// Path to a TOML configuration file. Defaults to
    /// `<config dir>/sssom2neo/config.toml` when that exists.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level regardless of configuration.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert SSSOM files into node and edge CSVs.
    Convert(ConvertArgs),

    /// Fetch the datasource catalog from OLS.
    Datasources {
        /// URL of the OLS instance to use.
        #[arg(long)]
        ols_url: Option<String>,

        /// Write the catalog CSV here instead of printing a table.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a default configuration file.
    Init {
        /// Output path for the generated config file.
        #[arg(short, long, default_value = "./sssom2neo.toml")]
        output: PathBuf,
    },

    /// Validate the configuration file.
    Validate,
}

#[derive(clap::Args, Debug, Default)]
struct ConvertArgs {
    /// SSSOM TSV file or directory containing TSV files.
    #[arg(long)]
    input: Option<PathBuf>,

    /// File-name glob used when the input is a directory.
    #[arg(long)]
    pattern: Option<String>,

    /// Output path for the nodes CSV file.
    #[arg(long)]
    output_nodes: Option<PathBuf>,

    /// Output path for the edges CSV file.
    #[arg(long)]
    output_edges: Option<PathBuf>,

    /// Output path for the datasources CSV file.
    #[arg(long)]
    output_datasources: Option<PathBuf>,

    /// URL of the OLS instance used to enrich edges.
    #[arg(long)]
    ols_url: Option<String>,

    /// Column layout of the output files.
    #[arg(long, value_enum)]
    profile: Option<ProfileArg>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ProfileArg {
    /// Enriched mapping edges with datasource metadata.
    Oxo,
    /// neo4j-admin import layout.
    Neo4jImport,
}

impl From<ProfileArg> for OutputProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Oxo => OutputProfile::Oxo,
            ProfileArg::Neo4jImport => OutputProfile::Neo4jImport,
        }
    }
}

impl ConvertArgs {
    /// Apply the flags that were given on top of the file configuration.
    fn apply(self, config: &mut ConvertConfig) {
        if let Some(input) = self.input {
            config.input.path = input;
        }
        if let Some(pattern) = self.pattern {
            config.input.pattern = pattern;
        }
        if let Some(nodes) = self.output_nodes {
            config.output.nodes = nodes;
        }
        if let Some(edges) = self.output_edges {
            config.output.edges = edges;
        }
        if let Some(datasources) = self.output_datasources {
            config.output.datasources = Some(datasources);
        }
        if let Some(url) = self.ols_url {
            config.registry.ols_url = Some(url);
        }
        if let Some(profile) = self.profile {
            config.output.profile = profile.into();
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logging needs the configured level, so a config that fails to load is
    // reported after a default subscriber is installed.
    let config = ConvertConfig::load_or_default(cli.config.as_deref());
    let level = match (&config, cli.verbose) {
        (_, true) => "debug".to_string(),
        (Ok(config), false) => config.logging.level.clone(),
        (Err(_), false) => "info".to_string(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level)),
        )
        .with_target(false)
        .init();

    let result = match config.context("failed to load configuration file") {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, mut config: ConvertConfig) -> Result<()> {
    match cli.command {
        Commands::Convert(args) => {
            args.apply(&mut config);
            commands::cmd_convert(&config).await
        }
        Commands::Datasources { ols_url, output } => {
            if let Some(url) = ols_url {
                config.registry.ols_url = Some(url);
            }
            commands::cmd_datasources(&config, output.as_deref()).await
        }
        Commands::Init { output } => commands::cmd_init(&output),
        Commands::Validate => commands::cmd_validate(&config),
    }
}
