use clap::Parser;

use yieldscope::analytics::GraphFilters;
use yieldscope::cli::{Cli, Command};
use yieldscope::ingest::SnapshotSource;
use yieldscope::{api, report, schema};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            host,
            port,
            snapshot,
            data_dir,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(api::serve(
                &host,
                port,
                SnapshotSource::parse(&snapshot),
                &data_dir,
            ))
        }
        Command::Score { file, sort, limit } => report::run_score(&file, &sort, limit),
        Command::Spreads {
            file,
            chain,
            min_spread,
        } => report::run_spreads(&file, chain.as_deref(), min_spread),
        Command::Graph {
            file,
            category,
            chain,
            min_tvl,
            limit,
        } => report::run_graph(
            &file,
            GraphFilters {
                category,
                chain,
                min_tvl,
                rel_type: None,
                limit: Some(limit),
            },
        ),
        Command::Schema => schema::run(),
    }
}
