// Node and edge emission

use super::config::{IRefIndexConfig, NodeEvidence};
use super::identifier::IdentifierClassifier;
use super::models::{EdgeProperties, Interaction, InteractionEdge, NodeProperties, ProteinNode};
use super::{IRefIndexError, Result};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Evidence merged across every interaction of one node
#[derive(Debug, Default)]
struct NodeEvidenceSets<'a> {
    pmid: BTreeSet<&'a str>,
    method: BTreeSet<&'a str>,
    taxon: BTreeSet<&'a str>,
}

/// Turns aggregated interactions into protein nodes and interaction edges
///
/// Both streams are lazy and follow the order interactions were first seen.
pub struct GraphEmitter<'a> {
    interactions: &'a [Interaction],
    config: &'a IRefIndexConfig,
    classifier: IdentifierClassifier,
}

impl<'a> GraphEmitter<'a> {
    pub fn new(interactions: &'a [Interaction], config: &'a IRefIndexConfig) -> Result<Self> {
        Ok(Self {
            interactions,
            config,
            classifier: IdentifierClassifier::new()?,
        })
    }

    /// One node per distinct identifier, in order of first appearance
    pub fn nodes(&self) -> Box<dyn Iterator<Item = ProteinNode> + '_> {
        let merged = match self.config.node_evidence {
            NodeEvidence::Union => Some(self.merge_node_evidence()),
            NodeEvidence::FirstSeen => None,
        };
        let mut seen: HashSet<&str> = HashSet::new();

        let nodes = self
            .interactions
            .iter()
            .flat_map(|interaction| {
                [
                    (interaction.partner_a.as_str(), interaction),
                    (interaction.partner_b.as_str(), interaction),
                ]
            })
            .filter_map(move |(id, interaction)| {
                if !seen.insert(id) {
                    return None;
                }
                let node = match merged.as_ref().and_then(|m| m.get(id)) {
                    Some(evidence) => self.node(id, evidence),
                    None => self.node(id, &Self::first_seen_evidence(id, interaction)),
                };
                Some(node)
            });
        Box::new(nodes)
    }

    /// One edge per interaction
    ///
    /// Fails with `InvariantViolation` if a method token contains `|`, since
    /// list values are later pipe-joined.
    pub fn edges(&self) -> Box<dyn Iterator<Item = Result<InteractionEdge>> + '_> {
        Box::new(self.interactions.iter().map(move |interaction| self.edge(interaction)))
    }

    /// Check every interaction before any stream is consumed
    ///
    /// Lets callers reject a graph up front instead of failing halfway
    /// through writing it.
    pub fn validate(&self) -> Result<()> {
        self.interactions.iter().try_for_each(check_methods)
    }

    fn first_seen_evidence(id: &'a str, interaction: &'a Interaction) -> NodeEvidenceSets<'a> {
        NodeEvidenceSets {
            pmid: interaction.pmid.iter().map(String::as_str).collect(),
            method: interaction.method.iter().map(String::as_str).collect(),
            taxon: interaction.taxa_of(id),
        }
    }

    fn merge_node_evidence(&self) -> HashMap<&'a str, NodeEvidenceSets<'a>> {
        let mut merged: HashMap<&str, NodeEvidenceSets> = HashMap::new();
        for interaction in self.interactions {
            let mut ends = vec![interaction.partner_a.as_str()];
            if interaction.partner_b != interaction.partner_a {
                ends.push(interaction.partner_b.as_str());
            }
            for id in ends {
                let evidence = merged.entry(id).or_default();
                evidence.pmid.extend(interaction.pmid.iter().map(String::as_str));
                evidence.method.extend(interaction.method.iter().map(String::as_str));
                evidence.taxon.extend(interaction.taxa_of(id));
            }
        }
        debug!(nodes = merged.len(), "Merged node evidence across interactions");
        merged
    }

    fn node(&self, id: &str, evidence: &NodeEvidenceSets<'_>) -> ProteinNode {
        let fields = &self.config.node_fields;
        let joined = |enabled: bool, values: &BTreeSet<&str>| {
            (enabled && !values.is_empty()).then(|| values.iter().copied().collect::<Vec<_>>().join("|"))
        };

        let (id, protein_type) = self.classifier.normalize(id, self.config.add_prefix);
        ProteinNode {
            id,
            protein_type,
            properties: NodeProperties {
                pubmed_ids: joined(fields.pubmed_ids, &evidence.pmid),
                taxon: joined(fields.taxon, &evidence.taxon),
                method: joined(fields.method, &evidence.method),
            },
        }
    }

    fn edge(&self, interaction: &Interaction) -> Result<InteractionEdge> {
        check_methods(interaction)?;

        let fields = &self.config.edge_fields;
        let listed = |enabled: bool, values: &BTreeSet<String>| {
            (enabled && !values.is_empty())
                .then(|| values.iter().map(|v| v.replace('\'', "^")).collect::<Vec<_>>())
        };

        let (source, _) = self.classifier.normalize(&interaction.partner_a, self.config.add_prefix);
        let (target, _) = self.classifier.normalize(&interaction.partner_b, self.config.add_prefix);

        Ok(InteractionEdge {
            id: None,
            source,
            target,
            label: self.config.edge_label.clone(),
            properties: EdgeProperties {
                pubmed_ids: listed(fields.pubmed_ids, &interaction.pmid),
                method: listed(fields.method, &interaction.method),
                taxon_a: listed(fields.taxon_a, &interaction.taxon_a),
                taxon_b: listed(fields.taxon_b, &interaction.taxon_b),
                relationship_id: listed(fields.relationship_id, &interaction.relationship_id),
            },
        })
    }
}

/// List values are pipe-joined downstream, so a method may not carry `|`
fn check_methods(interaction: &Interaction) -> Result<()> {
    match interaction.method.iter().find(|m| m.contains('|')) {
        Some(method) => Err(IRefIndexError::InvariantViolation(format!(
            "method '{}' of interaction {} -> {} contains '|'",
            method, interaction.partner_a, interaction.partner_b
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::irefindex::config::{EdgeFields, NodeFields};
    use crate::irefindex::models::{InteractionRecord, ProteinType};
    use crate::irefindex::InteractionAggregator;

    fn aggregate(records: Vec<InteractionRecord>) -> Vec<Interaction> {
        let mut agg = InteractionAggregator::new();
        records.into_iter().for_each(|r| agg.insert(r));
        agg.into_interactions()
    }

    fn sample() -> Vec<Interaction> {
        aggregate(vec![
            InteractionRecord::new("P12345", "Q67890")
                .with_pmid("111")
                .with_method("two hybrid")
                .with_taxa("9606", "9606")
                .with_relationship_id("RIG1"),
            InteractionRecord::new("P12345", "Q67890")
                .with_pmid("222")
                .with_method("two hybrid")
                .with_taxa("9606", "9606")
                .with_relationship_id("RIG1"),
            InteractionRecord::new("P12345", "NP_000001")
                .with_pmid("333")
                .with_method("pull down")
                .with_taxa("9606", "9606"),
        ])
    }

    #[test]
    fn test_nodes_are_unique_and_ordered() {
        let interactions = sample();
        let config = IRefIndexConfig::default();
        let emitter = GraphEmitter::new(&interactions, &config).unwrap();

        let ids: Vec<String> = emitter.nodes().map(|n| n.id).collect();
        assert_eq!(ids, vec!["uniprot:P12345", "uniprot:Q67890", "refseq:NP_000001"]);
    }

    #[test]
    fn test_union_node_evidence() {
        let interactions = sample();
        let config = IRefIndexConfig::default();
        let emitter = GraphEmitter::new(&interactions, &config).unwrap();

        let node = emitter.nodes().next().unwrap();
        assert_eq!(node.protein_type, ProteinType::Uniprot);
        assert_eq!(node.label(), "uniprot_protein");
        assert_eq!(node.properties.pubmed_ids.as_deref(), Some("111|222|333"));
        assert_eq!(node.properties.method.as_deref(), Some("pull down|two hybrid"));
        assert_eq!(node.properties.taxon.as_deref(), Some("9606"));
    }

    #[test]
    fn test_first_seen_node_evidence() {
        let interactions = sample();
        let config = IRefIndexConfig::builder()
            .node_evidence(NodeEvidence::FirstSeen)
            .build();
        let emitter = GraphEmitter::new(&interactions, &config).unwrap();

        let node = emitter.nodes().next().unwrap();
        assert_eq!(node.properties.pubmed_ids.as_deref(), Some("111|222"));
        assert_eq!(node.properties.method.as_deref(), Some("two hybrid"));
    }

    #[test]
    fn test_node_taxon_is_side_specific() {
        let interactions = aggregate(vec![InteractionRecord::new("P12345", "Q67890").with_taxa("9606", "10090")]);
        let config = IRefIndexConfig::default();
        let emitter = GraphEmitter::new(&interactions, &config).unwrap();

        let taxa: Vec<Option<String>> = emitter.nodes().map(|n| n.properties.taxon).collect();
        assert_eq!(taxa, vec![Some("9606".to_string()), Some("10090".to_string())]);
    }

    #[test]
    fn test_self_interaction_emits_one_node() {
        let interactions = aggregate(vec![InteractionRecord::new("P12345", "P12345").with_pmid("1")]);
        let config = IRefIndexConfig::default();
        let emitter = GraphEmitter::new(&interactions, &config).unwrap();

        assert_eq!(emitter.nodes().count(), 1);
        assert_eq!(emitter.edges().count(), 1);
    }

    #[test]
    fn test_node_field_selection() {
        let interactions = sample();
        let config = IRefIndexConfig::builder()
            .node_fields(NodeFields {
                pubmed_ids: true,
                taxon: false,
                method: false,
            })
            .build();
        let emitter = GraphEmitter::new(&interactions, &config).unwrap();

        let node = emitter.nodes().next().unwrap();
        assert!(node.properties.pubmed_ids.is_some());
        assert!(node.properties.taxon.is_none());
        assert!(node.properties.method.is_none());
    }

    #[test]
    fn test_edges_carry_lists() {
        let interactions = sample();
        let config = IRefIndexConfig::default();
        let emitter = GraphEmitter::new(&interactions, &config).unwrap();

        let edges: Vec<InteractionEdge> = emitter.edges().collect::<Result<_>>().unwrap();
        assert_eq!(edges.len(), 2);

        let edge = &edges[0];
        assert_eq!(edge.id, None);
        assert_eq!(edge.source, "uniprot:P12345");
        assert_eq!(edge.target, "uniprot:Q67890");
        assert_eq!(edge.label, "protein_protein_interaction");
        assert_eq!(
            edge.properties.pubmed_ids,
            Some(vec!["111".to_string(), "222".to_string()])
        );
        assert_eq!(edge.properties.method, Some(vec!["two hybrid".to_string()]));
        assert_eq!(edge.properties.relationship_id, Some(vec!["RIG1".to_string()]));

        assert_eq!(edges[1].target, "refseq:NP_000001");
        assert!(edges[1].properties.relationship_id.is_none());
    }

    #[test]
    fn test_edge_values_replace_quotes() {
        let interactions = aggregate(vec![InteractionRecord::new("P12345", "Q67890").with_method("5' RACE")]);
        let config = IRefIndexConfig::default();
        let emitter = GraphEmitter::new(&interactions, &config).unwrap();

        let edge = emitter.edges().next().unwrap().unwrap();
        assert_eq!(edge.properties.method, Some(vec!["5^ RACE".to_string()]));
    }

    #[test]
    fn test_edge_field_selection_and_label() {
        let interactions = sample();
        let config = IRefIndexConfig::builder()
            .edge_fields(EdgeFields {
                relationship_id: false,
                ..Default::default()
            })
            .edge_label("interacts_with")
            .add_prefix(false)
            .build();
        let emitter = GraphEmitter::new(&interactions, &config).unwrap();

        let edge = emitter.edges().next().unwrap().unwrap();
        assert_eq!(edge.label, "interacts_with");
        assert_eq!(edge.source, "P12345");
        assert!(edge.properties.relationship_id.is_none());
        assert!(edge.properties.pubmed_ids.is_some());
    }

    #[test]
    fn test_method_with_pipe_is_invariant_violation() {
        let interactions = aggregate(vec![
            InteractionRecord::new("P1", "P2").with_method("ok"),
            InteractionRecord::new("P3", "P4").with_method("a|b"),
        ]);
        let config = IRefIndexConfig::default();
        let emitter = GraphEmitter::new(&interactions, &config).unwrap();

        let results: Vec<Result<InteractionEdge>> = emitter.edges().collect();
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(IRefIndexError::InvariantViolation(_))));
        assert!(matches!(emitter.validate(), Err(IRefIndexError::InvariantViolation(_))));
    }

    #[test]
    fn test_validate_accepts_clean_interactions() {
        let interactions = sample();
        let config = IRefIndexConfig::default();
        let emitter = GraphEmitter::new(&interactions, &config).unwrap();
        assert!(emitter.validate().is_ok());
    }

    #[test]
    fn test_empty_input_emits_nothing() {
        let config = IRefIndexConfig::default();
        let emitter = GraphEmitter::new(&[], &config).unwrap();
        assert_eq!(emitter.nodes().count(), 0);
        assert_eq!(emitter.edges().count(), 0);
    }
}
