use anyhow::Result;
use kinfolk_core::Kinfolk;
use owo_colors::OwoColorize;

use crate::render::Render;

pub async fn run(kinfolk: &Kinfolk, member_id: &str) -> Result<()> {
    let suggestions = kinfolk.suggestions(member_id).await?;

    if suggestions.is_empty() {
        println!("{}", "No suggestions".dimmed());
        return Ok(());
    }

    println!("{}", format!("Suggested relationships for {member_id}:").bold());
    for suggestion in &suggestions {
        println!("{}", suggestion.render());
    }
    Ok(())
}
