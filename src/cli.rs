use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// DeFi yield intelligence engine — risk scoring, APY stability, spread
/// detection, and protocol relationship graphs over an ingested snapshot.
#[derive(Parser)]
#[command(name = "yieldscope", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Serve the HTTP API over a snapshot source
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value = "8787")]
        port: u16,

        /// Snapshot source: a JSON file path or an http(s) URL
        #[arg(long, default_value = "snapshot.json")]
        snapshot: String,

        /// Directory for the insight cache database
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },

    /// Score a snapshot file and print a per-pool risk table
    Score {
        /// Path to the snapshot JSON file
        file: PathBuf,

        /// Sort order: tvl, apy, risk, or stability
        #[arg(long, default_value = "risk")]
        sort: String,

        /// Maximum pools to print
        #[arg(long, default_value = "25")]
        limit: usize,
    },

    /// Detect cross-protocol yield spreads in a snapshot file
    Spreads {
        /// Path to the snapshot JSON file
        file: PathBuf,

        /// Only consider pools on this chain
        #[arg(long)]
        chain: Option<String>,

        /// Minimum raw APY spread in percentage points
        #[arg(long, default_value = "0.5")]
        min_spread: f64,
    },

    /// Build the protocol relationship graph and print it as JSON
    Graph {
        /// Path to the snapshot JSON file
        file: PathBuf,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        chain: Option<String>,

        /// Drop protocols below this TVL (USD)
        #[arg(long)]
        min_tvl: Option<f64>,

        /// Maximum nodes to keep (TVL-descending)
        #[arg(long, default_value = "50")]
        limit: usize,
    },

    /// Output the JSON schema for insight payloads (for LLM consumption)
    Schema,
}
