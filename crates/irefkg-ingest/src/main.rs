//! IRefKG Ingest - IRefIndex MITAB to knowledge-graph ingestion tool

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use irefkg_common::logging::{init_logging, LogConfig, LogLevel};
use irefkg_common::settings::load_dotenv;
use irefkg_ingest::export;
use irefkg_ingest::irefindex::{IRefIndexConfig, IRefIndexPipeline, NodeEvidence};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "irefkg-ingest")]
#[command(author, version, about = "IRefIndex PPI ingestion tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest a MITAB file and write nodes.csv, edges.csv and summary.json
    Run {
        #[command(flatten)]
        source: SourceArgs,

        /// Output directory
        #[arg(short, long, default_value = "./data/irefindex")]
        output: PathBuf,

        /// Show a progress spinner while parsing
        #[arg(long)]
        progress: bool,
    },

    /// Parse a MITAB file and print row counts without writing output
    Inspect {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// MITAB 2.6 file (.txt, .gz or .zip)
    #[arg(short, long)]
    input: PathBuf,

    /// YAML settings file
    #[arg(short, long, env = "IREFINDEX_CONFIG")]
    config: Option<PathBuf>,

    /// NCBI taxon ID to keep, or '*' for all organisms
    #[arg(short, long)]
    taxon: Option<String>,

    /// Keep bare identifiers instead of CURIEs
    #[arg(long)]
    no_prefix: bool,

    /// Merge (B, A) rows into (A, B)
    #[arg(long)]
    merge_reciprocal: bool,

    /// Node evidence policy: first_seen or union
    #[arg(long)]
    node_evidence: Option<String>,

    /// Stop after this many retained records
    #[arg(short, long)]
    limit: Option<usize>,
}

impl SourceArgs {
    /// Settings file, then `IREFINDEX_*` variables, then command-line flags
    fn resolve_config(&self) -> Result<IRefIndexConfig> {
        let base = match &self.config {
            Some(path) => IRefIndexConfig::from_yaml_file(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => IRefIndexConfig::default(),
        };
        let mut config = base.merge_env()?;

        if let Some(taxon) = &self.taxon {
            config.taxon = taxon.clone();
        }
        if self.no_prefix {
            config.add_prefix = false;
        }
        if self.merge_reciprocal {
            config.merge_reciprocal = true;
        }
        if let Some(policy) = &self.node_evidence {
            config.node_evidence = policy.parse::<NodeEvidence>()?;
        }
        if let Some(limit) = self.limit {
            config.parse_limit = Some(limit);
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    load_dotenv();

    // Initialize logging based on verbose flag
    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    // Environment variables take precedence
    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("irefkg-ingest")
        .build()
        .merge_env()?;

    let _guard = init_logging(&log_config)?;

    match cli.command {
        Command::Run {
            source,
            output,
            progress,
        } => {
            let config = source.resolve_config()?;
            info!(input = %source.input.display(), output = %output.display(), "Ingesting IRefIndex data");

            let pipeline = IRefIndexPipeline::new(config)?.with_progress(progress);
            let result = pipeline.run_file(&source.input)?;
            let stats = export::export_graph(&result, &output)?;
            stats.log_summary();
        },
        Command::Inspect { source } => {
            let config = source.resolve_config()?;
            info!(input = %source.input.display(), "Inspecting IRefIndex data");

            let result = IRefIndexPipeline::new(config)?.run_file(&source.input)?;
            let stats = result.stats();
            stats.log_summary();
            println!("{}", serde_json::to_string_pretty(&stats)?);
        },
    }

    info!("Ingestion complete");
    Ok(())
}
