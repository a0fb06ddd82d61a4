//! IRefKG Ingest Library
//!
//! Turns IRefIndex PSI-MITAB 2.6 releases into knowledge-graph node and edge
//! streams.
//!
//! # Modules
//!
//! - **irefindex**: MITAB parsing, interaction aggregation, node/edge emission
//! - **input**: plain, gzip and zip input opening
//! - **export**: CSV writers for the emitted streams
//!
//! # Example
//!
//! ```no_run
//! use irefkg_ingest::irefindex::{IRefIndexConfig, IRefIndexPipeline};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = IRefIndexPipeline::new(IRefIndexConfig::organism_config("9606"))?;
//!     let output = pipeline.run_file("./data/9606.mitab.08-28-2023.txt.zip")?;
//!
//!     let emitter = output.emitter()?;
//!     for node in emitter.nodes() {
//!         println!("{} {}", node.id, node.label());
//!     }
//!     for edge in emitter.edges() {
//!         let edge = edge?;
//!         println!("{} -> {}", edge.source, edge.target);
//!     }
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod export;
pub mod input;
pub mod irefindex;
pub mod progress;
