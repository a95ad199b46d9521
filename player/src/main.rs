//! scrollstage - headless scroll player
//!
//! Replays a scroll path against a page table and an in-memory scene, then
//! prints what the page ended up showing as JSON.

mod check;
mod report;
mod run;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "scrollstage")]
#[command(about = "Headless scroll-driven page player")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scroll path and print a JSON report
    Run(run::RunArgs),

    /// Validate a page config without running it
    Check {
        /// Path to page.toml (defaults to the built-in page)
        config: Option<PathBuf>,

        /// Print the normalized page table
        #[arg(long)]
        dump: bool,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so the report can be piped
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let report = run::run(&args)?;
            report.write(args.report.as_deref())?;
        }
        Commands::Check { config, dump } => {
            let summary = check::check(config.as_deref())?;
            println!("{summary}");
            if dump {
                println!("{}", summary.page.to_toml_string()?);
            }
        }
    }

    Ok(())
}
