// Interaction aggregation
//
// Rows describing the same partner pair are folded into one Interaction whose
// evidence fields are sets. Interactions keep first-insertion order so node
// and edge output is stable across runs of the same file.

use super::config::IRefIndexConfig;
use super::models::{Interaction, InteractionRecord};
use super::Result;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

#[derive(Debug)]
pub struct InteractionAggregator {
    aggregate_pubmed_ids: bool,
    aggregate_methods: bool,
    merge_reciprocal: bool,
    index: HashMap<(String, String), usize>,
    interactions: Vec<Interaction>,
}

impl InteractionAggregator {
    /// Aggregator collecting every PubMed ID and method, keyed on ordered pairs
    pub fn new() -> Self {
        Self::from_config(&IRefIndexConfig::default())
    }

    pub fn from_config(config: &IRefIndexConfig) -> Self {
        Self {
            aggregate_pubmed_ids: config.aggregate_pubmed_ids,
            aggregate_methods: config.aggregate_methods,
            merge_reciprocal: config.merge_reciprocal,
            index: HashMap::new(),
            interactions: Vec::new(),
        }
    }

    /// Merge one record into its interaction, creating it on first sight
    pub fn insert(&mut self, record: InteractionRecord) {
        let record = if self.merge_reciprocal && record.partner_a > record.partner_b {
            record.reversed()
        } else {
            record
        };

        let InteractionRecord {
            partner_a,
            partner_b,
            pmid,
            method,
            taxon_a,
            taxon_b,
            relationship_id,
        } = record;

        let key = (partner_a, partner_b);
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.interactions.len();
                self.interactions.push(Interaction::new(key.0.clone(), key.1.clone()));
                self.index.insert(key, slot);
                slot
            },
        };
        let interaction = &mut self.interactions[slot];

        add_value(&mut interaction.pmid, pmid, self.aggregate_pubmed_ids);
        add_value(&mut interaction.method, method, self.aggregate_methods);
        add_value(&mut interaction.taxon_a, taxon_a, true);
        add_value(&mut interaction.taxon_b, taxon_b, true);
        add_value(&mut interaction.relationship_id, relationship_id, true);
    }

    /// Drain a record stream into the aggregator, stopping at the first error
    ///
    /// Returns the number of records consumed.
    pub fn ingest<I>(&mut self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = Result<InteractionRecord>>,
    {
        let mut consumed = 0;
        for record in records {
            self.insert(record?);
            consumed += 1;
        }

        info!(
            records = consumed,
            interactions = self.interactions.len(),
            "Aggregated interaction records"
        );
        Ok(consumed)
    }

    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    pub fn get(&self, partner_a: &str, partner_b: &str) -> Option<&Interaction> {
        self.index
            .get(&(partner_a.to_string(), partner_b.to_string()))
            .map(|&slot| &self.interactions[slot])
    }

    /// Interactions in first-insertion order
    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    pub fn into_interactions(self) -> Vec<Interaction> {
        debug!(interactions = self.interactions.len(), "Releasing aggregated interactions");
        self.interactions
    }
}

impl Default for InteractionAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Empty values are never stored. Without aggregation only the first value
/// seen is kept.
fn add_value(set: &mut BTreeSet<String>, value: String, aggregate: bool) {
    if value.is_empty() {
        return;
    }
    if aggregate || set.is_empty() {
        set.insert(value);
    }
}
