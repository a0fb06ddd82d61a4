// Protein identifier classification and CURIE normalization

use super::models::ProteinType;
use super::Result;
use regex::Regex;

/// UniProtKB accession, optionally versioned or with an isoform suffix
const UNIPROT_PATTERN: &str = r"^(?:[OPQ][0-9][A-Z0-9]{3}[0-9]|[A-NR-Z][0-9](?:[A-Z][A-Z0-9]{2}[0-9]){1,2})(?:\.\d+)?(?:-\d+)?$";

/// RefSeq accession (`NP_000001`, `XP_123.2`, `NZ_ABCD01000001`)
const REFSEQ_PATTERN: &str = r"^(?:(?:AC|AP|NC|NG|NM|NP|NR|NT|NW|WP|XM|XP|XR|YP|ZP)_\d+|NZ_[A-Z]{2,4}\d+)(?:\.\d+)?$";

/// Entrez/GenBank style accession: letters followed by digits
const ENTREZ_PATTERN: &str = r"^[A-Z]+[0-9]+(?:\.\d+)?$";

/// Classifies bare protein identifiers by their accession shape
///
/// Patterns are tried in order UniProt, RefSeq, Entrez; the first match wins.
#[derive(Debug, Clone)]
pub struct IdentifierClassifier {
    uniprot: Regex,
    refseq: Regex,
    entrez: Regex,
}

impl IdentifierClassifier {
    pub fn new() -> Result<Self> {
        Ok(Self {
            uniprot: Regex::new(UNIPROT_PATTERN)?,
            refseq: Regex::new(REFSEQ_PATTERN)?,
            entrez: Regex::new(ENTREZ_PATTERN)?,
        })
    }

    pub fn classify(&self, id: &str) -> ProteinType {
        if self.uniprot.is_match(id) {
            ProteinType::Uniprot
        } else if self.refseq.is_match(id) {
            ProteinType::Refseq
        } else if self.entrez.is_match(id) {
            ProteinType::Entrez
        } else {
            ProteinType::Unknown
        }
    }

    /// Normalized node ID for a bare identifier
    ///
    /// With `add_prefix`, recognized identifiers become `prefix:id`; unknown
    /// ones stay bare since there is no namespace to put them in.
    pub fn normalize(&self, id: &str, add_prefix: bool) -> (String, ProteinType) {
        let protein_type = self.classify(id);
        let normalized = match protein_type.curie_prefix() {
            Some(prefix) if add_prefix => format!("{}:{}", prefix, id),
            _ => id.to_string(),
        };
        (normalized, protein_type)
    }
}
