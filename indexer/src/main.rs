use anyhow::Result;
use clap::Parser;
use indexer::{query_index, run, Cli};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let summary = run(&cli)?;
    tracing::info!(output = %summary.output.display(), num_docs = summary.num_docs, num_terms = summary.num_terms, bytes = summary.bytes, "index build complete");

    if let Some(q) = &cli.query {
        for hit in query_index(&summary.output, q, 10)? {
            println!("{}", serde_json::to_string(&hit)?);
        }
    }
    Ok(())
}
