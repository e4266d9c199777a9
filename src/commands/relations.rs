use anyhow::Result;
use kinfolk_core::Kinfolk;
use owo_colors::OwoColorize;

use crate::render::Render;

pub async fn run(kinfolk: &Kinfolk, member_id: &str) -> Result<()> {
    let member = kinfolk.member(member_id).await?;
    let relatives = kinfolk.relatives(member_id).await?;

    println!("{}", member.render());
    if relatives.is_empty() {
        println!("{}", "  No relationships recorded".dimmed());
        return Ok(());
    }

    for relative in &relatives {
        println!("{}", relative.render());
    }
    Ok(())
}
