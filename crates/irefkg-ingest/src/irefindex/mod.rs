// IRefIndex MITAB Ingestion Module
//
// Turns an IRefIndex PSI-MITAB 2.6 release file into a deduplicated stream of
// protein nodes and protein-protein interaction edges for a knowledge graph.
//
// Stages:
// - Parse: fixed-column MITAB rows -> InteractionRecord (exclusion + taxon filters)
// - Aggregate: records merged per identifier pair, evidence kept as sets
// - Emit: ProteinNode / InteractionEdge streams in first-insertion order
// - Pipeline: file opening, stats, taxon sanity check
//
// Data source:
// - https://storage.googleapis.com/irefindex-data/archive/release_{version}/psi_mitab/MITAB2.6/{taxon}.mitab.{date}.txt.zip

pub mod aggregator;
pub mod config;
pub mod emitter;
pub mod fields;
pub mod identifier;
pub mod models;
pub mod parser;
pub mod pipeline;

pub use aggregator::InteractionAggregator;
pub use config::{EdgeFields, IRefIndexConfig, NodeEvidence, NodeFields, ANY_TAXON};
pub use emitter::GraphEmitter;
pub use identifier::IdentifierClassifier;
pub use models::{
    EdgeProperties, Interaction, InteractionEdge, InteractionRecord, NodeProperties, ProteinNode,
    ProteinType,
};
pub use parser::{MitabParser, MitabRecords, ParseStats, ParsedLine, SkipReason};
pub use pipeline::{IRefIndexPipeline, PipelineOutput, PipelineStats};

/// Default label for interaction edges
pub const DEFAULT_EDGE_LABEL: &str = "protein_protein_interaction";

/// Result type for IRefIndex operations
pub type Result<T> = std::result::Result<T, IRefIndexError>;

/// Error types for IRefIndex ingestion
#[derive(Debug, thiserror::Error)]
pub enum IRefIndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed MITAB record at line {line}: expected at least {expected} columns, got {columns}")]
    MalformedRecord {
        line: usize,
        columns: usize,
        expected: usize,
    },

    #[error("Unresolvable identifier at line {line}: partner {side} reference '{reference}' has no identifier")]
    UnresolvableIdentifier {
        line: usize,
        side: char,
        reference: String,
    },

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Taxon {0} does not occur in the input; check the taxon setting or the downloaded file")]
    TaxonNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Settings error: {0}")]
    Settings(#[from] irefkg_common::CommonError),

    #[error("Input error: {0}")]
    Input(String),

    #[error("Export error: {0}")]
    Export(#[from] csv::Error),
}

impl From<regex::Error> for IRefIndexError {
    fn from(err: regex::Error) -> Self {
        IRefIndexError::Config(err.to_string())
    }
}
