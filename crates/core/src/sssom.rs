//! Reading SSSOM/TSV mapping files.
//!
//! An SSSOM file starts with a block of `# `-prefixed comment lines holding
//! YAML metadata, followed by a tab-separated table with a header row:
//!
//! ```text
//! # curie_map:
//! #   HP: http://purl.obolibrary.org/obo/HP_
//! # local_name: hp.sssom.tsv
//! subject_id	subject_label	predicate_id	object_id	object_label
//! HP:0000001	All	skos:exactMatch	MONDO:0000001	disease
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::Deserialize;
use tracing::{debug, info};

use crate::errors::{ConvertError, HeaderError};

pub const SUBJECT_ID: &str = "subject_id";
pub const SUBJECT_LABEL: &str = "subject_label";
pub const PREDICATE_ID: &str = "predicate_id";
pub const OBJECT_ID: &str = "object_id";
pub const OBJECT_LABEL: &str = "object_label";

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Collect the leading comment block of an SSSOM file with the markers
/// stripped. A bare `#` line contributes an empty line; the first line that
/// is not `#` or `# ...` ends the block.
pub fn read_header_block<R: BufRead>(reader: R) -> std::io::Result<String> {
    let mut block = String::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        let text = if line == "#" {
            ""
        } else if let Some(text) = line.strip_prefix("# ") {
            text
        } else {
            break;
        };
        block.push_str(text);
        block.push('\n');
    }
    Ok(block)
}

/// Metadata from the YAML comment block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SssomHeader {
    #[serde(default)]
    pub curie_map: Option<BTreeMap<String, String>>,

    #[serde(default)]
    pub local_name: Option<String>,

    /// Every other key (`mapping_set_id`, `license`, ...), kept as-is.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl SssomHeader {
    /// Parse an already extracted comment block. `path` is only used in
    /// error messages.
    pub fn parse(block: &str, path: &str) -> Result<Self, HeaderError> {
        if block.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(block).map_err(|e| HeaderError::Yaml {
            path: path.to_string(),
            detail: e.to_string(),
        })
    }

    /// Read and parse the header of the file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, HeaderError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let file = File::open(path).map_err(|source| HeaderError::Io {
            path: display.clone(),
            source,
        })?;
        let block = read_header_block(BufReader::new(file)).map_err(|source| HeaderError::Io {
            path: display.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = block.len(), "read SSSOM header block");
        Self::parse(&block, &display)
    }

    /// The file's prefix map; its absence is fatal.
    pub fn require_curie_map(&self, path: &str) -> Result<&BTreeMap<String, String>, HeaderError> {
        self.curie_map.as_ref().ok_or_else(|| HeaderError::MissingKey {
            path: path.to_string(),
            key: "curie_map".into(),
        })
    }

    /// Datasource prefix of the file: `local_name` up to its first `.`,
    /// upper-cased (`hp.sssom.tsv` -> `HP`).
    pub fn datasource_prefix(&self, path: &str) -> Result<String, HeaderError> {
        let local_name = self.local_name.as_deref().ok_or_else(|| HeaderError::MissingKey {
            path: path.to_string(),
            key: "local_name".into(),
        })?;
        let stem = match local_name.split_once('.') {
            Some((stem, _)) => stem,
            None => local_name,
        };
        Ok(stem.to_uppercase())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Column positions of one file's TSV table.
#[derive(Debug)]
struct ColumnIndex {
    names: Vec<String>,
    positions: HashMap<String, usize>,
    subject_id: usize,
    predicate_id: usize,
    object_id: usize,
    subject_label: Option<usize>,
    object_label: Option<usize>,
}

impl ColumnIndex {
    fn new(names: Vec<String>, path: &str) -> Result<Self, ConvertError> {
        let mut positions = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            positions.entry(name.clone()).or_insert(i);
        }
        let require = |column: &str| {
            positions
                .get(column)
                .copied()
                .ok_or_else(|| ConvertError::MissingColumn {
                    path: path.to_string(),
                    column: column.to_string(),
                })
        };
        let subject_id = require(SUBJECT_ID)?;
        let predicate_id = require(PREDICATE_ID)?;
        let object_id = require(OBJECT_ID)?;
        let subject_label = positions.get(SUBJECT_LABEL).copied();
        let object_label = positions.get(OBJECT_LABEL).copied();
        Ok(Self {
            names,
            positions,
            subject_id,
            predicate_id,
            object_id,
            subject_label,
            object_label,
        })
    }
}

/// One mapping row. Field lookups are by column name.
#[derive(Debug, Clone)]
pub struct MappingRecord {
    columns: Rc<ColumnIndex>,
    values: csv::StringRecord,
}

impl MappingRecord {
    fn at(&self, i: usize) -> &str {
        self.values.get(i).unwrap_or("")
    }

    fn label_at(&self, i: Option<usize>) -> Option<&str> {
        i.map(|i| self.at(i)).filter(|label| !label.is_empty())
    }

    pub fn subject_id(&self) -> &str {
        self.at(self.columns.subject_id)
    }

    pub fn subject_label(&self) -> Option<&str> {
        self.label_at(self.columns.subject_label)
    }

    pub fn predicate_id(&self) -> &str {
        self.at(self.columns.predicate_id)
    }

    pub fn object_id(&self) -> &str {
        self.at(self.columns.object_id)
    }

    pub fn object_label(&self) -> Option<&str> {
        self.label_at(self.columns.object_label)
    }

    /// Value of the named column, or `None` if the file has no such column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns.positions.get(column).map(|&i| self.at(i))
    }
}

fn tsv_reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false);
    builder
}

fn open_tsv(path: &Path) -> Result<(csv::Reader<File>, Vec<String>), ConvertError> {
    let display = path.display().to_string();
    let file = File::open(path).map_err(|source| ConvertError::Io {
        path: display.clone(),
        source,
    })?;
    let mut reader = tsv_reader_builder().from_reader(file);
    let names = reader
        .headers()
        .map_err(|source| ConvertError::Parse {
            path: display,
            source,
        })?
        .iter()
        .map(String::from)
        .collect();
    Ok((reader, names))
}

/// Column names of the TSV table in `path`, in file order.
pub fn read_column_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>, ConvertError> {
    let (_, names) = open_tsv(path.as_ref())?;
    Ok(names)
}

/// Streams the mapping rows of one file, in file order.
pub struct MappingReader {
    path: String,
    columns: Rc<ColumnIndex>,
    inner: csv::Reader<File>,
}

impl MappingReader {
    /// Open `path` and check that the id columns are present.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ConvertError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let (inner, names) = open_tsv(path)?;
        let columns = ColumnIndex::new(names, &display)?;
        debug!(path = %path.display(), columns = columns.names.len(), "opened mapping table");
        Ok(Self {
            path: display,
            columns: Rc::new(columns),
            inner,
        })
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns.names
    }
}

impl Iterator for MappingReader {
    type Item = Result<MappingRecord, ConvertError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut values = csv::StringRecord::new();
        match self.inner.read_record(&mut values) {
            Ok(true) => Some(Ok(MappingRecord {
                columns: Rc::clone(&self.columns),
                values,
            })),
            Ok(false) => None,
            Err(source) => Some(Err(ConvertError::Parse {
                path: self.path.clone(),
                source,
            })),
        }
    }
}

// ---------------------------------------------------------------------------
// Input discovery
// ---------------------------------------------------------------------------

/// Resolve the input path to the list of files to convert.
///
/// A file is used as-is. A directory contributes its immediate entries whose
/// file name matches `pattern`, sorted by name.
pub fn discover_inputs<P: AsRef<Path>>(path: P, pattern: &str) -> Result<Vec<PathBuf>, ConvertError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let metadata = std::fs::metadata(path).map_err(|source| ConvertError::Io {
        path: display.clone(),
        source,
    })?;

    if !metadata.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let entries = std::fs::read_dir(path).map_err(|source| ConvertError::Io {
        path: display.clone(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ConvertError::Io {
            path: display.clone(),
            source,
        })?;
        let entry_path = entry.path();
        if !entry_path.is_file() {
            continue;
        }
        let matches = entry_path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| glob_match::glob_match(pattern, name));
        if matches {
            files.push(entry_path);
        }
    }

    if files.is_empty() {
        return Err(ConvertError::NoInputs {
            path: display,
            pattern: pattern.to_string(),
        });
    }

    files.sort();
    info!(path = %path.display(), pattern, count = files.len(), "discovered input files");
    Ok(files)
}
