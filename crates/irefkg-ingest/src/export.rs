//! CSV export of the node and edge streams
//!
//! List-valued properties are written as `|`-joined cells so both files load
//! with any CSV-aware graph importer.

use crate::irefindex::{InteractionEdge, PipelineOutput, PipelineStats, ProteinNode, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

pub const NODES_FILE: &str = "nodes.csv";
pub const EDGES_FILE: &str = "edges.csv";
pub const SUMMARY_FILE: &str = "summary.json";

#[derive(Serialize)]
struct NodeRow<'a> {
    id: &'a str,
    label: &'a str,
    pubmed_ids: Option<&'a str>,
    taxon: Option<&'a str>,
    method: Option<&'a str>,
}

#[derive(Serialize)]
struct EdgeRow<'a> {
    id: Option<&'a str>,
    source: &'a str,
    target: &'a str,
    label: &'a str,
    pubmed_ids: Option<String>,
    method: Option<String>,
    taxon_a: Option<String>,
    taxon_b: Option<String>,
    relationship_id: Option<String>,
}

fn join(values: &Option<Vec<String>>) -> Option<String> {
    values.as_ref().map(|v| v.join("|"))
}

/// Write nodes as CSV with a header row; returns the number of rows written
pub fn write_nodes_csv<W, I>(writer: W, nodes: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = ProteinNode>,
{
    let mut csv = csv::Writer::from_writer(writer);
    let mut written = 0;
    for node in nodes {
        csv.serialize(NodeRow {
            id: &node.id,
            label: node.label(),
            pubmed_ids: node.properties.pubmed_ids.as_deref(),
            taxon: node.properties.taxon.as_deref(),
            method: node.properties.method.as_deref(),
        })?;
        written += 1;
    }
    if written == 0 {
        csv.write_record(["id", "label", "pubmed_ids", "taxon", "method"])?;
    }
    csv.flush()?;
    Ok(written)
}

/// Write edges as CSV with a header row, stopping at the first failed edge
pub fn write_edges_csv<W, I>(writer: W, edges: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = Result<InteractionEdge>>,
{
    let mut csv = csv::Writer::from_writer(writer);
    let mut written = 0;
    for edge in edges {
        let edge = edge?;
        let props = &edge.properties;
        csv.serialize(EdgeRow {
            id: edge.id.as_deref(),
            source: &edge.source,
            target: &edge.target,
            label: &edge.label,
            pubmed_ids: join(&props.pubmed_ids),
            method: join(&props.method),
            taxon_a: join(&props.taxon_a),
            taxon_b: join(&props.taxon_b),
            relationship_id: join(&props.relationship_id),
        })?;
        written += 1;
    }
    if written == 0 {
        csv.write_record([
            "id",
            "source",
            "target",
            "label",
            "pubmed_ids",
            "method",
            "taxon_a",
            "taxon_b",
            "relationship_id",
        ])?;
    }
    csv.flush()?;
    Ok(written)
}

/// Write `nodes.csv`, `edges.csv` and `summary.json` into `dir`
///
/// Interactions are validated before any file is created, so an invalid
/// graph leaves `dir` untouched.
pub fn export_graph(output: &PipelineOutput, dir: impl AsRef<Path>) -> Result<PipelineStats> {
    let dir = dir.as_ref();
    let emitter = output.emitter()?;
    emitter.validate()?;

    fs::create_dir_all(dir)?;
    let nodes = write_nodes_csv(BufWriter::new(File::create(dir.join(NODES_FILE))?), emitter.nodes())?;
    let edges = write_edges_csv(BufWriter::new(File::create(dir.join(EDGES_FILE))?), emitter.edges())?;

    let stats = PipelineStats {
        nodes,
        edges,
        ..output.stats()
    };

    let mut summary = BufWriter::new(File::create(dir.join(SUMMARY_FILE))?);
    serde_json::to_writer_pretty(&mut summary, &stats).map_err(std::io::Error::from)?;
    summary.flush()?;

    info!(
        dir = %dir.display(),
        nodes,
        edges,
        "Exported IRefIndex graph"
    );
    Ok(stats)
}
