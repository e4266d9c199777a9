use std::path::Path;

use anyhow::{Context, Result};
use kinfolk_core::{DateRange, Kinfolk};
use owo_colors::OwoColorize;

pub async fn run(
    kinfolk: &Kinfolk,
    viewer: &str,
    range: &DateRange,
    out: Option<&Path>,
) -> Result<()> {
    let ics = kinfolk.export_ics(viewer, range).await?;

    match out {
        Some(path) => {
            tokio::fs::write(path, &ics)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            let count = ics.matches("BEGIN:VEVENT").count();
            println!("{} {} events to {}", "Exported".green(), count, path.display());
        }
        None => print!("{ics}"),
    }
    Ok(())
}
