use anyhow::Result;
use clap::{Parser, Subcommand};
use docgen::{generate_documents, generate_metadata, read_args, write_json, DocumentsArgs, MetadataArgs};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "docgen")]
#[command(about = "Extract search documents and page metadata from a generated static site", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one flat JSON document per HTML page, ready for the indexer
    Documents {
        /// Args file: {"site_root", "exclude_paths", "key_tags"}
        args: PathBuf,
        /// Output JSON array
        #[arg(long, default_value = "./documents.json")]
        output: PathBuf,
    },
    /// Write page titles keyed by root-relative url
    Metadata {
        /// Args file: {"site_root", "exclude_paths", "meta_data_output"}
        args: PathBuf,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Documents { args, output } => {
            let args: DocumentsArgs = read_args(&args)?;
            write_json(&output, &generate_documents(&args)?)
        }
        Commands::Metadata { args } => {
            let args: MetadataArgs = read_args(&args)?;
            write_json(&args.meta_data_output, &generate_metadata(&args)?)
        }
    }
}
