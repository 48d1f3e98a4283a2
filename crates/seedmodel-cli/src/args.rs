use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "seedmodel",
    about = "Fit relational generative models over multi-table datasets",
    version,
    after_help = "Examples:\n  seedmodel model --dataset shop.json --output seedmodel.snapshot.json\n  seedmodel model                          # dataset from seedmodel.toml or SEEDMODEL_DATASET\n  seedmodel graph --dataset shop.json --format dot\n  seedmodel inspect seedmodel.snapshot.json --table customers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Model every table of a dataset, children first
    Model(ModelArgs),

    /// Visualize the parent/child relationship graph
    Graph(GraphArgs),

    /// Print the parameters stored in a model snapshot
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
pub struct ModelArgs {
    /// Path to the JSON dataset file
    /// Falls back to SEEDMODEL_DATASET env var, .env file or seedmodel.toml
    #[arg(long, env = "SEEDMODEL_DATASET")]
    pub dataset: Option<PathBuf>,

    /// Marginal distribution family (overrides seedmodel.toml)
    #[arg(long)]
    pub distribution: Option<Distribution>,

    /// Write a model snapshot to this path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the per-table summary as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct GraphArgs {
    /// Path to the JSON dataset file
    #[arg(long, env = "SEEDMODEL_DATASET")]
    pub dataset: Option<PathBuf>,

    /// Output format for the relationship graph
    #[arg(long, default_value = "mermaid")]
    pub format: GraphFormat,
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Snapshot file written by `seedmodel model --output`
    pub snapshot: PathBuf,

    /// Only show this table
    #[arg(long)]
    pub table: Option<String>,

    /// Check the snapshot against this dataset's metadata
    #[arg(long)]
    pub dataset: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Distribution {
    Gaussian,
    Kde,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum GraphFormat {
    Mermaid,
    Dot,
}
