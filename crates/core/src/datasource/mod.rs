//! Datasource metadata attached to every mapping edge.
//!
//! A [`DatasourceCatalog`] answers "what do we know about the source with
//! this prefix". The catalog used in production is a [`DatasourceTable`]
//! built from the ontology registry (see [`ols`]); the transformer only ever
//! calls [`DatasourceCatalog::lookup`].

pub mod ols;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::OutputError;
use crate::output::{self, RecordSink};

pub const SOURCE_TYPE_ONTOLOGY: &str = "ONTOLOGY";
pub const SOURCE_TYPE_DATABASE: &str = "DATABASE";

/// Column names of the datasource side output.
pub const DATASOURCE_COLUMNS: [&str; 9] = [
    "prefix",
    "idorgNamespace",
    "title",
    "description",
    "sourceType",
    "baseUri",
    "alternatePrefixes",
    "license",
    "versionInfo",
];

// ---------------------------------------------------------------------------
// DatasourceRecord
// ---------------------------------------------------------------------------

/// Metadata describing one ontology or database.
///
/// Serializes to the JSON object embedded in the `datasource` edge column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasourceRecord {
    /// Upper-cased, unique key of the catalog.
    pub prefix: String,
    pub idorg_namespace: String,
    pub title: String,
    pub description: String,
    pub source_type: String,
    pub base_uri: String,
    pub alternative_prefixes: Vec<String>,
    pub license: String,
    pub version_info: String,
}

impl DatasourceRecord {
    /// Stand-in for a prefix the registry does not know.
    pub fn stub(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            idorg_namespace: String::new(),
            title: String::new(),
            description: String::new(),
            source_type: SOURCE_TYPE_DATABASE.to_string(),
            base_uri: String::new(),
            alternative_prefixes: Vec::new(),
            license: String::new(),
            version_info: String::new(),
        }
    }

    /// Row for the datasource side output, in [`DATASOURCE_COLUMNS`] order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.prefix.clone(),
            self.idorg_namespace.clone(),
            self.title.clone(),
            self.description.clone(),
            self.source_type.clone(),
            self.base_uri.clone(),
            self.alternative_prefixes.join(","),
            self.license.clone(),
            self.version_info.clone(),
        ]
    }
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Result of a catalog lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasourceLookup<'a> {
    Found(&'a DatasourceRecord),
    NotFound,
}

impl DatasourceLookup<'_> {
    /// The descriptor to serialize for `prefix`: the registry's record, or a
    /// `DATABASE` stub when there is none.
    pub fn to_descriptor(&self, prefix: &str) -> DatasourceRecord {
        match self {
            Self::Found(record) => (*record).clone(),
            Self::NotFound => DatasourceRecord::stub(prefix),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Read-only source of datasource metadata keyed by upper-cased prefix.
pub trait DatasourceCatalog {
    fn lookup(&self, prefix: &str) -> DatasourceLookup<'_>;
}

// ---------------------------------------------------------------------------
// DatasourceTable
// ---------------------------------------------------------------------------

/// In-memory catalog, ordered by prefix.
#[derive(Debug, Clone, Default)]
pub struct DatasourceTable {
    records: BTreeMap<String, DatasourceRecord>,
}

impl DatasourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under its (upper-cased) prefix. A later record with
    /// the same prefix replaces the earlier one.
    pub fn insert(&mut self, mut record: DatasourceRecord) {
        record.prefix = record.prefix.to_uppercase();
        self.records.insert(record.prefix.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &DatasourceRecord> {
        self.records.values()
    }

    /// Write the header and one row per record to `sink`.
    pub fn write_rows<S: RecordSink + ?Sized>(&self, sink: &mut S) -> Result<(), OutputError> {
        sink.write_row(&DATASOURCE_COLUMNS.map(String::from))?;
        for record in self.records.values() {
            sink.write_row(&record.to_row())?;
        }
        Ok(())
    }

    /// Write the catalog as CSV. An empty catalog is not written.
    ///
    /// Returns whether a file was produced.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<bool, OutputError> {
        let path = path.as_ref();
        if self.is_empty() {
            warn!(path = %path.display(), "datasource catalog is empty; not writing it");
            return Ok(false);
        }

        let mut writer = output::create_csv_writer(path)?;
        self.write_rows(&mut writer)?;
        writer.flush().map_err(|source| OutputError::Io {
            path: path.display().to_string(),
            source,
        })?;
        info!(path = %path.display(), count = self.len(), "wrote datasource catalog");
        Ok(true)
    }
}

impl FromIterator<DatasourceRecord> for DatasourceTable {
    fn from_iter<I: IntoIterator<Item = DatasourceRecord>>(iter: I) -> Self {
        let mut table = Self::new();
        for record in iter {
            table.insert(record);
        }
        table
    }
}

impl DatasourceCatalog for DatasourceTable {
    fn lookup(&self, prefix: &str) -> DatasourceLookup<'_> {
        match self.records.get(prefix) {
            Some(record) => DatasourceLookup::Found(record),
            None => DatasourceLookup::NotFound,
        }
    }
}
