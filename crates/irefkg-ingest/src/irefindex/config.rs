// IRefIndex Ingestion Configuration

use super::{IRefIndexError, Result, DEFAULT_EDGE_LABEL};
use irefkg_common::settings::{env_flag, load_yaml};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Taxon filter value that keeps every organism
pub const ANY_TAXON: &str = "*";

/// Organisms IRefIndex publishes per-taxon release files for
pub const KNOWN_TAXA: &[(&str, &str)] = &[
    ("9606", "Homo sapiens"),
    ("10090", "Mus musculus"),
    ("559292", "Saccharomyces cerevisiae S288C"),
    ("562", "Escherichia coli"),
    ("10116", "Rattus norvegicus"),
    ("4932", "Saccharomyces cerevisiae"),
    ("7227", "Drosophila melanogaster"),
    ("6239", "Caenorhabditis elegans"),
];

/// Scientific name for taxa with a dedicated IRefIndex release file
pub fn organism_name(taxon: &str) -> Option<&'static str> {
    KNOWN_TAXA
        .iter()
        .find(|(id, _)| *id == taxon)
        .map(|(_, name)| *name)
}

// ============================================================================
// Node / Edge Field Selection
// ============================================================================

/// Where a node's evidence comes from when it takes part in several
/// interactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NodeEvidence {
    /// Only the interaction through which the node was first encountered
    FirstSeen,
    /// Every interaction the node takes part in
    #[default]
    Union,
}

impl std::str::FromStr for NodeEvidence {
    type Err = IRefIndexError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "first_seen" | "first" => Ok(NodeEvidence::FirstSeen),
            "union" | "all" => Ok(NodeEvidence::Union),
            other => Err(IRefIndexError::Config(format!(
                "Unknown node evidence policy '{}', expected first_seen or union",
                other
            ))),
        }
    }
}

/// Properties written on protein nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeFields {
    pub pubmed_ids: bool,
    pub taxon: bool,
    pub method: bool,
}

impl Default for NodeFields {
    fn default() -> Self {
        NodeFields {
            pubmed_ids: true,
            taxon: true,
            method: true,
        }
    }
}

/// Properties written on interaction edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeFields {
    pub pubmed_ids: bool,
    pub method: bool,
    pub taxon_a: bool,
    pub taxon_b: bool,
    pub relationship_id: bool,
}

impl Default for EdgeFields {
    fn default() -> Self {
        EdgeFields {
            pubmed_ids: true,
            method: true,
            taxon_a: true,
            taxon_b: true,
            relationship_id: true,
        }
    }
}

// ============================================================================
// Ingestion Configuration
// ============================================================================

/// Configuration for one IRefIndex ingestion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IRefIndexConfig {
    /// NCBI taxon both partners must belong to, or `*` for every organism
    pub taxon: String,

    /// Collect every PubMed ID of a pair (false keeps the first one seen)
    pub aggregate_pubmed_ids: bool,

    /// Collect every detection method of a pair (false keeps the first one seen)
    pub aggregate_methods: bool,

    /// Emit CURIEs (`uniprot:P12345`) instead of bare identifiers
    pub add_prefix: bool,

    /// Merge `(B, A)` rows into `(A, B)`
    pub merge_reciprocal: bool,

    /// Node evidence policy
    pub node_evidence: NodeEvidence,

    pub node_fields: NodeFields,

    pub edge_fields: EdgeFields,

    /// Label of interaction edges
    pub edge_label: String,

    /// Stop after this many retained records (None = whole file)
    pub parse_limit: Option<usize>,
}

impl Default for IRefIndexConfig {
    fn default() -> Self {
        IRefIndexConfig {
            taxon: ANY_TAXON.to_string(),
            aggregate_pubmed_ids: true,
            aggregate_methods: true,
            add_prefix: true,
            merge_reciprocal: false,
            node_evidence: NodeEvidence::default(),
            node_fields: NodeFields::default(),
            edge_fields: EdgeFields::default(),
            edge_label: DEFAULT_EDGE_LABEL.to_string(),
            parse_limit: None,
        }
    }
}

impl IRefIndexConfig {
    pub fn builder() -> IRefIndexConfigBuilder {
        IRefIndexConfigBuilder::default()
    }

    /// Taxon to filter on, `None` when every organism is kept
    pub fn taxon_filter(&self) -> Option<&str> {
        (self.taxon != ANY_TAXON).then_some(self.taxon.as_str())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.taxon.is_empty() {
            return Err(IRefIndexError::Config("Taxon cannot be empty, use '*' for all organisms".to_string()));
        }

        if self.taxon != ANY_TAXON && !self.taxon.chars().all(|c| c.is_ascii_digit()) {
            return Err(IRefIndexError::Config(format!(
                "Taxon must be a numeric NCBI taxonomy ID or '*', got '{}'",
                self.taxon
            )));
        }

        if self.edge_label.trim().is_empty() {
            return Err(IRefIndexError::Config("Edge label cannot be empty".to_string()));
        }

        if self.parse_limit == Some(0) {
            return Err(IRefIndexError::Config("Parse limit must be greater than 0".to_string()));
        }

        Ok(())
    }
}

/// Builder for IRefIndexConfig
#[derive(Debug, Default)]
pub struct IRefIndexConfigBuilder {
    config: IRefIndexConfig,
}

impl IRefIndexConfigBuilder {
    pub fn taxon(mut self, taxon: impl Into<String>) -> Self {
        self.config.taxon = taxon.into();
        self
    }

    pub fn aggregate_pubmed_ids(mut self, aggregate: bool) -> Self {
        self.config.aggregate_pubmed_ids = aggregate;
        self
    }

    pub fn aggregate_methods(mut self, aggregate: bool) -> Self {
        self.config.aggregate_methods = aggregate;
        self
    }

    pub fn add_prefix(mut self, add_prefix: bool) -> Self {
        self.config.add_prefix = add_prefix;
        self
    }

    pub fn merge_reciprocal(mut self, merge: bool) -> Self {
        self.config.merge_reciprocal = merge;
        self
    }

    pub fn node_evidence(mut self, policy: NodeEvidence) -> Self {
        self.config.node_evidence = policy;
        self
    }

    pub fn node_fields(mut self, fields: NodeFields) -> Self {
        self.config.node_fields = fields;
        self
    }

    pub fn edge_fields(mut self, fields: EdgeFields) -> Self {
        self.config.edge_fields = fields;
        self
    }

    pub fn edge_label(mut self, label: impl Into<String>) -> Self {
        self.config.edge_label = label.into();
        self
    }

    pub fn parse_limit(mut self, limit: usize) -> Self {
        self.config.parse_limit = Some(limit);
        self
    }

    pub fn build(self) -> IRefIndexConfig {
        self.config
    }
}

// ============================================================================
// Preset Configurations
// ============================================================================

impl IRefIndexConfig {
    /// Small sample run over every organism
    pub fn test_config() -> Self {
        IRefIndexConfig {
            parse_limit: Some(1000),
            ..Default::default()
        }
    }

    /// Single-organism run
    pub fn organism_config(taxon: &str) -> Self {
        IRefIndexConfig {
            taxon: taxon.to_string(),
            ..Default::default()
        }
    }
}

// ============================================================================
// File and Environment Support
// ============================================================================

impl IRefIndexConfig {
    /// Load a YAML settings file. Missing keys take their defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let config: IRefIndexConfig = load_yaml(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `IREFINDEX_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().merge_env()
    }

    /// Override fields with any `IREFINDEX_*` variables that are set
    ///
    /// - `IREFINDEX_TAXON`
    /// - `IREFINDEX_AGGREGATE_PUBMED_IDS`, `IREFINDEX_AGGREGATE_METHODS`
    /// - `IREFINDEX_ADD_PREFIX`, `IREFINDEX_MERGE_RECIPROCAL`
    /// - `IREFINDEX_NODE_EVIDENCE` (first_seen | union)
    /// - `IREFINDEX_EDGE_LABEL`, `IREFINDEX_PARSE_LIMIT`
    pub fn merge_env(mut self) -> Result<Self> {
        if let Ok(taxon) = std::env::var("IREFINDEX_TAXON") {
            self.taxon = taxon;
        }

        if let Some(flag) = env_flag("IREFINDEX_AGGREGATE_PUBMED_IDS")? {
            self.aggregate_pubmed_ids = flag;
        }

        if let Some(flag) = env_flag("IREFINDEX_AGGREGATE_METHODS")? {
            self.aggregate_methods = flag;
        }

        if let Some(flag) = env_flag("IREFINDEX_ADD_PREFIX")? {
            self.add_prefix = flag;
        }

        if let Some(flag) = env_flag("IREFINDEX_MERGE_RECIPROCAL")? {
            self.merge_reciprocal = flag;
        }

        if let Ok(policy) = std::env::var("IREFINDEX_NODE_EVIDENCE") {
            self.node_evidence = policy.parse()?;
        }

        if let Ok(label) = std::env::var("IREFINDEX_EDGE_LABEL") {
            self.edge_label = label;
        }

        if let Ok(limit) = std::env::var("IREFINDEX_PARSE_LIMIT") {
            let limit = limit.parse().map_err(|_| {
                IRefIndexError::Config(format!("IREFINDEX_PARSE_LIMIT must be a number, got '{}'", limit))
            })?;
            self.parse_limit = Some(limit);
        }

        self.validate()?;
        Ok(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
