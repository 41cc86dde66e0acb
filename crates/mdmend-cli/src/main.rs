mod cmd;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "mdmend",
    about = "Mend AI-generated markdown — reformat files without touching code fences or YAML prologs",
    version,
    propagate_version = true
)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reformat markdown files in place
    Fix {
        /// Files to reformat
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Report files that would change without rewriting them
        #[arg(long)]
        check: bool,
    },

    /// Show how a file splits into protected and processable segments
    Segments {
        /// File to inspect
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Fix { files, check } => cmd::fix::run(&files, check, cli.json),
        Commands::Segments { file } => cmd::segments::run(&file, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
