//! sssom2neo core library.
//!
//! Converts SSSOM mapping files into the node and edge CSVs consumed by
//! graph database bulk loaders: configuration, SSSOM reading, CURIE
//! expansion, node deduplication, datasource enrichment from the ontology
//! registry, and the transformer that ties them together.

pub mod config;
pub mod curie;
pub mod datasource;
pub mod errors;
pub mod nodes;
pub mod output;
pub mod sssom;
pub mod transformer;

// Re-exports for convenience.
pub use config::ConvertConfig;
pub use curie::CurieResolver;
pub use datasource::{DatasourceCatalog, DatasourceLookup, DatasourceRecord, DatasourceTable};
pub use nodes::NodeRegistry;
pub use output::OutputProfile;
pub use transformer::{ConversionSummary, MappingTransformer};
