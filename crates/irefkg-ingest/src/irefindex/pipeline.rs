// IRefIndex ingestion pipeline
//
// parse -> aggregate -> taxon check -> (caller) emit
//
// The input reader is owned by the parse stage and dropped as soon as the
// single pass over it finishes or fails.

use super::aggregator::InteractionAggregator;
use super::config::{organism_name, IRefIndexConfig};
use super::emitter::GraphEmitter;
use super::models::Interaction;
use super::parser::{MitabParser, ParseStats};
use super::{IRefIndexError, Result};
use crate::{input, progress};
use indicatif::ProgressBar;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::io::BufRead;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Summary of one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub taxon: String,
    pub lines_read: usize,
    pub header_lines: usize,
    pub blank_lines: usize,
    pub excluded: BTreeMap<String, usize>,
    pub taxon_filtered: usize,
    pub unresolvable: usize,
    pub records: usize,
    pub interactions: usize,
    pub nodes: usize,
    pub edges: usize,
    pub limit_reached: bool,
}

impl PipelineStats {
    pub fn log_summary(&self) {
        info!(
            taxon = %self.taxon,
            lines = self.lines_read,
            records = self.records,
            excluded = self.excluded.values().sum::<usize>(),
            taxon_filtered = self.taxon_filtered,
            unresolvable = self.unresolvable,
            interactions = self.interactions,
            nodes = self.nodes,
            edges = self.edges,
            "IRefIndex ingestion summary"
        );
        if self.unresolvable > 0 {
            warn!(rows = self.unresolvable, "Rows skipped for unresolvable identifiers");
        }
    }
}

pub struct IRefIndexPipeline {
    config: IRefIndexConfig,
    show_progress: bool,
}

impl IRefIndexPipeline {
    pub fn new(config: IRefIndexConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            show_progress: false,
        })
    }

    /// Show a terminal spinner while parsing
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn config(&self) -> &IRefIndexConfig {
        &self.config
    }

    /// Open `path` (plain, .gz or .zip) and run the pipeline over it
    pub fn run_file(&self, path: impl AsRef<Path>) -> Result<PipelineOutput> {
        let reader = input::open_mitab(path.as_ref())
            .map_err(|e| IRefIndexError::Input(format!("{:#}", e)))?;
        self.run_reader(reader)
    }

    /// Parse and aggregate a MITAB stream
    ///
    /// Fails with `TaxonNotFound` when a concrete taxon is configured, the
    /// input holds data rows, and none of them mentions that taxon.
    pub fn run_reader<R: BufRead>(&self, reader: R) -> Result<PipelineOutput> {
        let start = Instant::now();
        let taxon = self.config.taxon.as_str();
        info!(
            taxon,
            organism = organism_name(taxon).unwrap_or("unspecified"),
            "Starting IRefIndex ingestion"
        );

        let mut aggregator = InteractionAggregator::from_config(&self.config);
        let spinner = progress::create_spinner("Parsing MITAB records", self.show_progress);
        let parse = self.parse_into(reader, &mut aggregator, &spinner)?;

        if let Some(taxon) = self.config.taxon_filter() {
            if !parse.taxon_seen && parse.data_rows() > 0 {
                return Err(IRefIndexError::TaxonNotFound(taxon.to_string()));
            }
        }

        info!(
            records = parse.records,
            interactions = aggregator.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Parsed and aggregated IRefIndex input"
        );

        Ok(PipelineOutput {
            config: self.config.clone(),
            interactions: aggregator.into_interactions(),
            parse,
        })
    }

    /// Single pass over `reader`; the spinner is cleared whether or not the
    /// pass succeeds
    fn parse_into<R: BufRead>(
        &self,
        reader: R,
        aggregator: &mut InteractionAggregator,
        spinner: &ProgressBar,
    ) -> Result<ParseStats> {
        let mut records = MitabParser::from_config(&self.config).records(reader);
        let ingested = aggregator.ingest(records.by_ref().inspect(|_| spinner.inc(1)));
        spinner.finish_and_clear();

        ingested?;
        Ok(records.into_stats())
    }
}

/// Aggregated interactions of one run, ready for emission
#[derive(Debug)]
pub struct PipelineOutput {
    config: IRefIndexConfig,
    interactions: Vec<Interaction>,
    parse: ParseStats,
}

impl PipelineOutput {
    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    pub fn parse_stats(&self) -> &ParseStats {
        &self.parse
    }

    pub fn config(&self) -> &IRefIndexConfig {
        &self.config
    }

    /// Node and edge streams over the aggregated interactions
    pub fn emitter(&self) -> Result<GraphEmitter<'_>> {
        GraphEmitter::new(&self.interactions, &self.config)
    }

    /// Distinct node identifiers across all interactions
    pub fn node_count(&self) -> usize {
        self.interactions
            .iter()
            .flat_map(|i| [i.partner_a.as_str(), i.partner_b.as_str()])
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            taxon: self.config.taxon.clone(),
            lines_read: self.parse.lines_read,
            header_lines: self.parse.header_lines,
            blank_lines: self.parse.blank_lines,
            excluded: self.parse.excluded.clone(),
            taxon_filtered: self.parse.taxon_filtered,
            unresolvable: self.parse.unresolvable,
            records: self.parse.records,
            interactions: self.interactions.len(),
            nodes: self.node_count(),
            edges: self.interactions.len(),
            limit_reached: self.parse.limit_reached,
        }
    }
}
