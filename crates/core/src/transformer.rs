//! The mapping-to-graph conversion.
//!
//! [`MappingTransformer::convert`] walks the input files in order and, for
//! every mapping row, registers the subject and object as nodes and writes
//! one edge. Nodes that never received a label are written at the very end.
//!
//! State that only lives for one run (the merged prefix table and the node
//! registry) is created inside `convert` and dropped when it returns, so a
//! transformer can be reused for several independent runs.
//!
//! Nothing is buffered: rows are appended to the sinks as soon as they are
//! known. After a fatal error the sinks keep whatever was written before it.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

use crate::curie::CurieResolver;
use crate::datasource::{DatasourceCatalog, SOURCE_TYPE_ONTOLOGY};
use crate::errors::{ConvertError, OutputError};
use crate::nodes::{NodeOffer, NodeRecord, NodeRegistry};
use crate::output::{EdgeColumn, EdgeSchema, OutputProfile, RecordSink};
use crate::sssom::{self, MappingRecord, MappingReader, SssomHeader};

/// Value of the `scope` edge column.
pub const SCOPE_RELATED: &str = "RELATED";

/// Supplies the date stamped on edges.
pub type DateSource = fn() -> NaiveDate;

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    pub files: usize,
    pub edges: u64,
    /// Nodes written inline with a label from the mappings.
    pub nodes_labelled: u64,
    /// Nodes written at the end with their id as label.
    pub nodes_unlabelled: u64,
    /// Nodes whose prefix was not in any `curie_map`.
    pub nodes_unresolved: u64,
    /// Files whose datasource prefix the catalog did not know.
    pub stub_datasource_files: usize,
}

impl ConversionSummary {
    pub fn nodes(&self) -> u64 {
        self.nodes_labelled + self.nodes_unlabelled
    }
}

// ---------------------------------------------------------------------------
// Transformer
// ---------------------------------------------------------------------------

/// Converts SSSOM files into node and edge rows for one output profile.
pub struct MappingTransformer<'c> {
    profile: OutputProfile,
    catalog: &'c dyn DatasourceCatalog,
    today: DateSource,
}

impl<'c> MappingTransformer<'c> {
    pub fn new(profile: OutputProfile, catalog: &'c dyn DatasourceCatalog) -> Self {
        Self {
            profile,
            catalog,
            today: local_today,
        }
    }

    /// Replace the clock used for the `date` column.
    pub fn with_date_source(mut self, today: DateSource) -> Self {
        self.today = today;
        self
    }

    pub fn profile(&self) -> OutputProfile {
        self.profile
    }

    /// Convert `files`, in order, writing header rows first and then node and
    /// edge rows as they are produced.
    pub fn convert<N, E>(
        &self,
        files: &[PathBuf],
        nodes: &mut N,
        edges: &mut E,
    ) -> Result<ConversionSummary, ConvertError>
    where
        N: RecordSink + ?Sized,
        E: RecordSink + ?Sized,
    {
        let input_columns = if self.profile.needs_input_columns() {
            union_of_columns(files)?
        } else {
            Vec::new()
        };
        let schema = self.profile.edge_schema(&input_columns);
        info!(
            profile = %self.profile,
            files = files.len(),
            edge_columns = schema.len(),
            "starting conversion"
        );

        nodes.write_row(&self.profile.node_header())?;
        edges.write_row(&schema.header())?;

        let mut run = Run {
            transformer: self,
            schema,
            resolver: CurieResolver::new(),
            registry: NodeRegistry::new(),
            summary: ConversionSummary::default(),
        };

        for file in files {
            run.convert_file(file, nodes, edges)?;
        }
        run.flush_pending(nodes)?;

        let summary = run.summary;
        info!(
            files = summary.files,
            edges = summary.edges,
            nodes = summary.nodes(),
            unlabelled = summary.nodes_unlabelled,
            unresolved = summary.nodes_unresolved,
            "conversion complete"
        );
        Ok(summary)
    }
}

/// Ordered union of the TSV columns of all inputs, first occurrence wins.
fn union_of_columns(files: &[PathBuf]) -> Result<Vec<String>, ConvertError> {
    let mut columns: Vec<String> = Vec::new();
    for file in files {
        for name in sssom::read_column_names(file)? {
            if !columns.contains(&name) {
                columns.push(name);
            }
        }
    }
    debug!(count = columns.len(), "collected input columns");
    Ok(columns)
}

// ---------------------------------------------------------------------------
// Per-run state
// ---------------------------------------------------------------------------

/// Datasource columns shared by every edge of one file.
struct FileDatasource {
    prefix: String,
    json: String,
}

struct Run<'t, 'c> {
    transformer: &'t MappingTransformer<'c>,
    schema: EdgeSchema,
    resolver: CurieResolver,
    registry: NodeRegistry,
    summary: ConversionSummary,
}

impl Run<'_, '_> {
    fn convert_file<N, E>(&mut self, path: &Path, nodes: &mut N, edges: &mut E) -> Result<(), ConvertError>
    where
        N: RecordSink + ?Sized,
        E: RecordSink + ?Sized,
    {
        let display = path.display().to_string();
        let header = SssomHeader::load(path)?;
        self.resolver.merge_header(header.require_curie_map(&display)?);

        let datasource = if self.schema.needs_datasource() {
            Some(self.file_datasource(&header, &display)?)
        } else {
            None
        };

        let mut count = 0u64;
        for record in MappingReader::open(path)? {
            let record = record?;
            self.offer_node(record.subject_id(), record.subject_label(), nodes)?;
            self.offer_node(record.object_id(), record.object_label(), nodes)?;
            edges.write_row(&self.edge_row(&record, datasource.as_ref()))?;
            count += 1;
        }

        self.summary.files += 1;
        self.summary.edges += count;
        info!(
            path = %path.display(),
            edges = count,
            pending_nodes = self.registry.pending_len(),
            "converted mapping file"
        );
        Ok(())
    }

    fn file_datasource(&mut self, header: &SssomHeader, path: &str) -> Result<FileDatasource, ConvertError> {
        let prefix = header.datasource_prefix(path)?;
        let lookup = self.transformer.catalog.lookup(&prefix);
        if !lookup.is_found() {
            warn!(path, prefix = %prefix, "datasource not in catalog; using DATABASE stub");
            self.summary.stub_datasource_files += 1;
        }
        let json = serde_json::to_string(&lookup.to_descriptor(&prefix)).map_err(OutputError::from)?;
        Ok(FileDatasource { prefix, json })
    }

    fn edge_row(&self, record: &MappingRecord, datasource: Option<&FileDatasource>) -> Vec<String> {
        let today = (self.transformer.today)();
        self.schema
            .columns()
            .map(|column| match column {
                EdgeColumn::Start => record.subject_id().to_string(),
                EdgeColumn::Relation => record.predicate_id().to_string(),
                EdgeColumn::End => record.object_id().to_string(),
                EdgeColumn::DatasourcePrefix => datasource.map(|d| d.prefix.clone()).unwrap_or_default(),
                EdgeColumn::Datasource => datasource.map(|d| d.json.clone()).unwrap_or_default(),
                EdgeColumn::SourceType => SOURCE_TYPE_ONTOLOGY.to_string(),
                EdgeColumn::Scope => SCOPE_RELATED.to_string(),
                EdgeColumn::Date => today.format("%Y-%m-%d").to_string(),
                EdgeColumn::Field(name) => record.get(name).unwrap_or_default().to_string(),
            })
            .collect()
    }

    fn offer_node<N>(&mut self, id: &str, label: Option<&str>, nodes: &mut N) -> Result<(), ConvertError>
    where
        N: RecordSink + ?Sized,
    {
        match (self.registry.offer(id, label), label) {
            (NodeOffer::Emit, Some(label)) => {
                self.emit_node(id, label, nodes)?;
                self.summary.nodes_labelled += 1;
            }
            (NodeOffer::Deferred, _) => debug!(id, "node has no label yet; deferring"),
            _ => {}
        }
        Ok(())
    }

    fn emit_node<N>(&mut self, id: &str, label: &str, nodes: &mut N) -> Result<(), ConvertError>
    where
        N: RecordSink + ?Sized,
    {
        let resolved = self.resolver.resolve(id);
        if !resolved.is_resolved() {
            self.summary.nodes_unresolved += 1;
        }
        let node = NodeRecord::new(id, label, resolved);
        nodes.write_row(&self.transformer.profile.node_row(&node))?;
        Ok(())
    }

    /// Write every node that never got a label, labelled with its own id.
    fn flush_pending<N>(&mut self, nodes: &mut N) -> Result<(), ConvertError>
    where
        N: RecordSink + ?Sized,
    {
        let pending = self.registry.flush_pending();
        debug!(count = pending.len(), "flushing unlabelled nodes");
        for id in &pending {
            self.emit_node(id, id, nodes)?;
            self.summary.nodes_unlabelled += 1;
        }
        Ok(())
    }
}
