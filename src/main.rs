mod commands;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use kinfolk_core::{DateRange, FamilyGroup, Kinfolk};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kinfolk")]
#[command(about = "Browse your family calendar, members and relationships")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the merged calendar as a family member sees it
    Calendar {
        /// Member (or demo user) id to view as
        #[arg(long = "as")]
        viewer: String,

        /// Show events from this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Show events until this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Print the raw calendar view as JSON
        #[arg(long)]
        json: bool,
    },
    /// List family members
    Members {
        /// Only members of this group ("demo" or "real")
        #[arg(short, long)]
        group: Option<FamilyGroup>,

        #[arg(long)]
        json: bool,
    },
    /// List a member's relatives
    Relations { member: String },
    /// Suggest relationships implied by the ones already recorded
    Suggest { member: String },
    /// Export the calendar a member sees as .ics
    Export {
        #[arg(long = "as")]
        viewer: String,

        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: Option<String>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let kinfolk = Kinfolk::load()?;

    match cli.command {
        Commands::Calendar {
            viewer,
            from,
            to,
            json,
        } => {
            let range = DateRange::from_args(from.as_deref(), to.as_deref())?;
            commands::calendar::run(&kinfolk, &viewer, &range, json).await
        }
        Commands::Members { group, json } => commands::members::run(&kinfolk, group, json).await,
        Commands::Relations { member } => commands::relations::run(&kinfolk, &member).await,
        Commands::Suggest { member } => commands::suggest::run(&kinfolk, &member).await,
        Commands::Export {
            viewer,
            from,
            to,
            out,
        } => {
            let range = DateRange::from_args(from.as_deref(), to.as_deref())?;
            commands::export::run(&kinfolk, &viewer, &range, out.as_deref()).await
        }
    }
}
