//! Node and edge output: CSV writers and the column layouts of each profile.
//!
//! Output files use the PostgreSQL CSV dialect the bulk loaders expect:
//! comma separated, every field quoted, `\n` line endings, header row first.
//!
//! # Profiles
//!
//! | Profile | Node columns | Edge columns |
//! |---------|--------------|--------------|
//! | `oxo` | `identifier, curie, label, uri, prefix` | `fromCurie, toCurie, datasourcePrefix, datasource, sourceType, scope, date` |
//! | `neo4j_import` | `id:ID, :LABEL, name, curie_prefix, curie_local_part` | `:START_ID, :TYPE, :END_ID` + every TSV column of the inputs |

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::OutputError;
use crate::nodes::NodeRecord;

/// Neo4j node label given to every mapped term in the `neo4j_import` profile.
pub const MAPPED_ENTITY_LABEL: &str = "MappedEntity";

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Append-only destination for output rows.
pub trait RecordSink {
    fn write_row(&mut self, row: &[String]) -> Result<(), OutputError>;
}

impl<W: Write> RecordSink for csv::Writer<W> {
    fn write_row(&mut self, row: &[String]) -> Result<(), OutputError> {
        self.write_record(row)?;
        Ok(())
    }
}

/// Collects rows in memory.
impl RecordSink for Vec<Vec<String>> {
    fn write_row(&mut self, row: &[String]) -> Result<(), OutputError> {
        self.push(row.to_vec());
        Ok(())
    }
}

/// Build a CSV writer in the output dialect over any `Write`.
pub fn csv_writer<W: Write>(inner: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b',')
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .has_headers(false)
        .from_writer(inner)
}

/// Create (truncating) an output file and wrap it in a CSV writer.
pub fn create_csv_writer<P: AsRef<Path>>(path: P) -> Result<csv::Writer<File>, OutputError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| OutputError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(csv_writer(file))
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// Which pair of node/edge layouts to produce.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputProfile {
    /// Enriched mapping edges with datasource metadata.
    #[default]
    Oxo,
    /// Plain `neo4j-admin import` layout.
    Neo4jImport,
}

impl OutputProfile {
    pub fn node_header(&self) -> Vec<String> {
        let columns: &[&str] = match self {
            Self::Oxo => &["identifier", "curie", "label", "uri", "prefix"],
            Self::Neo4jImport => &["id:ID", ":LABEL", "name", "curie_prefix", "curie_local_part"],
        };
        columns.iter().map(|c| c.to_string()).collect()
    }

    pub fn node_row(&self, node: &NodeRecord) -> Vec<String> {
        match self {
            Self::Oxo => vec![
                node.local_part.clone(),
                node.id.clone(),
                node.label.clone(),
                node.uri.clone(),
                node.prefix.clone(),
            ],
            Self::Neo4jImport => vec![
                node.id.clone(),
                MAPPED_ENTITY_LABEL.to_string(),
                node.label.clone(),
                node.prefix.clone(),
                node.local_part.clone(),
            ],
        }
    }

    /// Edge layout for this profile. `input_columns` is the ordered union of
    /// the inputs' TSV columns; only `neo4j_import` uses it.
    pub fn edge_schema(&self, input_columns: &[String]) -> EdgeSchema {
        match self {
            Self::Oxo => EdgeSchema::new(vec![
                ("fromCurie", EdgeColumn::Start),
                ("toCurie", EdgeColumn::End),
                ("datasourcePrefix", EdgeColumn::DatasourcePrefix),
                ("datasource", EdgeColumn::Datasource),
                ("sourceType", EdgeColumn::SourceType),
                ("scope", EdgeColumn::Scope),
                ("date", EdgeColumn::Date),
            ]),
            Self::Neo4jImport => {
                let mut schema = EdgeSchema::new(vec![
                    (":START_ID", EdgeColumn::Start),
                    (":TYPE", EdgeColumn::Relation),
                    (":END_ID", EdgeColumn::End),
                ]);
                for column in input_columns {
                    schema.push_field(column);
                }
                schema
            }
        }
    }

    /// Whether the edge layout depends on the TSV columns of the inputs.
    pub fn needs_input_columns(&self) -> bool {
        matches!(self, Self::Neo4jImport)
    }
}

impl std::fmt::Display for OutputProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Oxo => write!(f, "oxo"),
            Self::Neo4jImport => write!(f, "neo4j_import"),
        }
    }
}

// ---------------------------------------------------------------------------
// Edge schema
// ---------------------------------------------------------------------------

/// Where the value of one edge column comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeColumn {
    /// `subject_id`
    Start,
    /// `predicate_id`
    Relation,
    /// `object_id`
    End,
    /// Upper-cased `local_name` stem of the file.
    DatasourcePrefix,
    /// JSON datasource descriptor.
    Datasource,
    /// Constant `ONTOLOGY`.
    SourceType,
    /// Constant `RELATED`.
    Scope,
    /// Processing date, `YYYY-MM-DD`.
    Date,
    /// Same-named field of the source record, verbatim.
    Field(String),
}

/// Ordered edge columns with their header names. Header names are unique;
/// the first column to claim a name keeps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeSchema {
    columns: Vec<(String, EdgeColumn)>,
}

impl EdgeSchema {
    pub fn new(columns: Vec<(&str, EdgeColumn)>) -> Self {
        let mut schema = Self {
            columns: Vec::with_capacity(columns.len()),
        };
        for (name, column) in columns {
            schema.push(name, column);
        }
        schema
    }

    fn push(&mut self, name: &str, column: EdgeColumn) {
        if !self.columns.iter().any(|(n, _)| n == name) {
            self.columns.push((name.to_string(), column));
        }
    }

    /// Append a verbatim-copy column named after a record field.
    pub fn push_field(&mut self, name: &str) {
        self.push(name, EdgeColumn::Field(name.to_string()));
    }

    pub fn header(&self) -> Vec<String> {
        self.columns.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn columns(&self) -> impl Iterator<Item = &EdgeColumn> {
        self.columns.iter().map(|(_, column)| column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Whether rows need the file's datasource prefix, and therefore
    /// `local_name` in the header.
    pub fn needs_datasource(&self) -> bool {
        self.columns()
            .any(|c| matches!(c, EdgeColumn::DatasourcePrefix | EdgeColumn::Datasource))
    }
}
