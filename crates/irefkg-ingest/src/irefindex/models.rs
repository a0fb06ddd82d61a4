// IRefIndex Data Models

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ============================================================================
// Parsed Record
// ============================================================================

/// Fields extracted from one retained MITAB row
///
/// Missing values are empty strings; the aggregator never stores them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub partner_a: String,
    pub partner_b: String,
    pub pmid: String,
    pub method: String,
    pub taxon_a: String,
    pub taxon_b: String,
    pub relationship_id: String,
}

impl InteractionRecord {
    pub fn new(partner_a: impl Into<String>, partner_b: impl Into<String>) -> Self {
        Self {
            partner_a: partner_a.into(),
            partner_b: partner_b.into(),
            ..Default::default()
        }
    }

    pub fn with_pmid(mut self, pmid: impl Into<String>) -> Self {
        self.pmid = pmid.into();
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_taxa(mut self, taxon_a: impl Into<String>, taxon_b: impl Into<String>) -> Self {
        self.taxon_a = taxon_a.into();
        self.taxon_b = taxon_b.into();
        self
    }

    pub fn with_relationship_id(mut self, relationship_id: impl Into<String>) -> Self {
        self.relationship_id = relationship_id.into();
        self
    }

    /// Same interaction seen from the other partner
    pub fn reversed(self) -> Self {
        Self {
            partner_a: self.partner_b,
            partner_b: self.partner_a,
            taxon_a: self.taxon_b,
            taxon_b: self.taxon_a,
            ..self
        }
    }
}

// ============================================================================
// Aggregated Interaction
// ============================================================================

/// All evidence collected for one `(partner_a, partner_b)` key
///
/// Sets are ordered so that emitted values do not depend on row order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub partner_a: String,
    pub partner_b: String,
    pub pmid: BTreeSet<String>,
    pub method: BTreeSet<String>,
    pub taxon_a: BTreeSet<String>,
    pub taxon_b: BTreeSet<String>,
    pub relationship_id: BTreeSet<String>,
}

impl Interaction {
    pub fn new(partner_a: impl Into<String>, partner_b: impl Into<String>) -> Self {
        Self {
            partner_a: partner_a.into(),
            partner_b: partner_b.into(),
            ..Default::default()
        }
    }

    /// Taxa recorded for `node_id`'s side of the pair. A self-interaction
    /// reports both sides.
    pub fn taxa_of(&self, node_id: &str) -> BTreeSet<&str> {
        let mut taxa = BTreeSet::new();
        if node_id == self.partner_a {
            taxa.extend(self.taxon_a.iter().map(String::as_str));
        }
        if node_id == self.partner_b {
            taxa.extend(self.taxon_b.iter().map(String::as_str));
        }
        taxa
    }
}

// ============================================================================
// Protein Type
// ============================================================================

/// Identifier family of a protein node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProteinType {
    Uniprot,
    Refseq,
    Entrez,
    Unknown,
}

impl ProteinType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProteinType::Uniprot => "uniprot",
            ProteinType::Refseq => "refseq",
            ProteinType::Entrez => "entrez",
            ProteinType::Unknown => "unknown",
        }
    }

    /// Node label written to the graph, e.g. `uniprot_protein`
    pub fn label(&self) -> &'static str {
        match self {
            ProteinType::Uniprot => "uniprot_protein",
            ProteinType::Refseq => "refseq_protein",
            ProteinType::Entrez => "entrez_protein",
            ProteinType::Unknown => "unknown_protein",
        }
    }

    /// Canonical lower-case CURIE prefix. Entrez identifiers use the
    /// registry prefix `ncbigene`.
    pub fn curie_prefix(&self) -> Option<&'static str> {
        match self {
            ProteinType::Uniprot => Some("uniprot"),
            ProteinType::Refseq => Some("refseq"),
            ProteinType::Entrez => Some("ncbigene"),
            ProteinType::Unknown => None,
        }
    }
}

impl std::fmt::Display for ProteinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Graph Output
// ============================================================================

/// Node properties. Multi-valued evidence is pipe-joined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pubmed_ids: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

/// One protein node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProteinNode {
    /// Normalized identifier (CURIE when prefixing is on)
    pub id: String,
    pub protein_type: ProteinType,
    pub properties: NodeProperties,
}

impl ProteinNode {
    pub fn label(&self) -> &'static str {
        self.protein_type.label()
    }
}

/// Edge properties. Multi-valued evidence is kept as lists, unlike nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pubmed_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxon_a: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxon_b: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship_id: Option<Vec<String>>,
}

/// One protein-protein interaction edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionEdge {
    /// Always `None`; the graph writer assigns edge IDs
    pub id: Option<String>,
    pub source: String,
    pub target: String,
    pub label: String,
    pub properties: EdgeProperties,
}
