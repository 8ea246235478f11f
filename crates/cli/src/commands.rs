//! Subcommand implementations.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use tracing::{info, warn};

use sssom2neo_core::config::ConvertConfig;
use sssom2neo_core::datasource::ols::OlsClient;
use sssom2neo_core::datasource::DatasourceTable;
use sssom2neo_core::output;
use sssom2neo_core::sssom::discover_inputs;
use sssom2neo_core::transformer::MappingTransformer;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch the catalog from the configured OLS instance, or an empty one when
/// no registry is configured.
async fn load_catalog(config: &ConvertConfig) -> Result<DatasourceTable> {
    let Some(url) = &config.registry.ols_url else {
        warn!("no OLS URL configured; every edge will carry a stub datasource");
        return Ok(DatasourceTable::new());
    };

    let client = OlsClient::new(
        url.as_str(),
        config.registry.page_size,
        Duration::from_secs(config.registry.timeout_secs),
    )
    .context("failed to create OLS client")?;
    let catalog = client
        .fetch_catalog()
        .await
        .with_context(|| format!("failed to fetch ontologies from {url}"))?;
    Ok(catalog)
}

// ---------------------------------------------------------------------------
// convert
// ---------------------------------------------------------------------------

pub async fn cmd_convert(config: &ConvertConfig) -> Result<()> {
    config.validate().context("invalid configuration")?;

    let catalog = load_catalog(config).await?;
    if let Some(path) = &config.output.datasources {
        catalog
            .write_csv(path)
            .with_context(|| format!("failed to write datasources to {}", path.display()))?;
    }

    let files = discover_inputs(&config.input.path, &config.input.pattern)
        .context("failed to collect input files")?;
    info!(count = files.len(), "converting SSSOM files");

    let mut nodes = output::create_csv_writer(&config.output.nodes)
        .context("failed to create nodes file")?;
    let mut edges = output::create_csv_writer(&config.output.edges)
        .context("failed to create edges file")?;

    let transformer = MappingTransformer::new(config.output.profile, &catalog);
    let summary = transformer
        .convert(&files, &mut nodes, &mut edges)
        .context("conversion failed")?;

    nodes
        .flush()
        .with_context(|| format!("failed to flush {}", config.output.nodes.display()))?;
    edges
        .flush()
        .with_context(|| format!("failed to flush {}", config.output.edges.display()))?;

    println!("Converted {} file(s)", summary.files);
    println!(
        "  Nodes   : {} ({} without label, {} without URI) -> {}",
        summary.nodes(),
        summary.nodes_unlabelled,
        summary.nodes_unresolved,
        config.output.nodes.display()
    );
    println!(
        "  Edges   : {} -> {}",
        summary.edges,
        config.output.edges.display()
    );
    if summary.stub_datasource_files > 0 {
        println!(
            "  Warning : {} file(s) had no datasource in the catalog",
            summary.stub_datasource_files
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// datasources
// ---------------------------------------------------------------------------

pub async fn cmd_datasources(config: &ConvertConfig, output: Option<&Path>) -> Result<()> {
    if config.registry.ols_url.is_none() {
        anyhow::bail!("no OLS URL given; pass --ols-url or set registry.ols_url");
    }
    config.validate_registry().context("invalid configuration")?;

    let catalog = load_catalog(config).await?;

    if let Some(path) = output {
        let written = catalog
            .write_csv(path)
            .with_context(|| format!("failed to write datasources to {}", path.display()))?;
        if written {
            println!("Wrote {} datasource(s) to {}", catalog.len(), path.display());
        } else {
            println!("Catalog is empty; nothing written");
        }
        return Ok(());
    }

    if catalog.is_empty() {
        println!("No datasources found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Prefix", "Title", "Version", "Base URI", "Alternative prefixes"]);
    for record in catalog.records() {
        table.add_row(vec![
            record.prefix.clone(),
            record.title.clone(),
            record.version_info.clone(),
            record.base_uri.clone(),
            record.alternative_prefixes.join(", "),
        ]);
    }
    println!("{table}");
    println!("{} datasource(s)", catalog.len());

    Ok(())
}

// ---------------------------------------------------------------------------
// init / validate
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"# sssom2neo configuration
# Every value can be overridden on the command line.

[input]
path = "mappings/"
pattern = "*.tsv"

[output]
nodes = "nodes.csv"
edges = "edges.csv"
# datasources = "datasources.csv"
profile = "oxo"          # or "neo4j_import"

[registry]
# ols_url = "https://www.ebi.ac.uk/ols4/"
page_size = 1000
timeout_secs = 60

[logging]
level = "info"
"#;

pub fn cmd_init(output: &Path) -> Result<()> {
    if output.exists() {
        anyhow::bail!(
            "file already exists: {}. Use a different path or remove the existing file.",
            output.display()
        );
    }

    std::fs::write(output, DEFAULT_CONFIG).context("failed to write config file")?;

    println!("Default configuration written to {}", output.display());
    println!();
    println!("Next steps:");
    println!("  1. Point [input] path at your SSSOM files");
    println!("  2. Set registry.ols_url to enrich edges with datasource metadata");
    println!(
        "  3. Validate with: sssom2neo validate --config {}",
        output.display()
    );
    println!(
        "  4. Convert with: sssom2neo convert --config {}",
        output.display()
    );

    Ok(())
}

pub fn cmd_validate(config: &ConvertConfig) -> Result<()> {
    match config.validate() {
        Ok(()) => println!("  [OK] All required fields are valid"),
        Err(e) => {
            println!("  [FAIL] Validation error: {}", e);
            anyhow::bail!("configuration validation failed");
        }
    }

    println!();
    println!("Configuration summary:");
    println!(
        "  Input        : {} ({})",
        config.input.path.display(),
        config.input.pattern
    );
    println!("  Nodes        : {}", config.output.nodes.display());
    println!("  Edges        : {}", config.output.edges.display());
    println!(
        "  Datasources  : {}",
        config
            .output
            .datasources
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "not written".into())
    );
    println!("  Profile      : {}", config.output.profile);
    println!(
        "  OLS          : {}",
        config.registry.ols_url.as_deref().unwrap_or("none (stub datasources)")
    );

    Ok(())
}
