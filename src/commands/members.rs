use anyhow::Result;
use kinfolk_core::{FamilyGroup, Kinfolk};
use owo_colors::OwoColorize;

use crate::render::Render;

pub async fn run(kinfolk: &Kinfolk, group: Option<FamilyGroup>, json: bool) -> Result<()> {
    let members = kinfolk.members(group).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&members)?);
        return Ok(());
    }

    if members.is_empty() {
        println!("{}", "No members found".dimmed());
        return Ok(());
    }

    for member in &members {
        println!("{} {}", member.family_group.render(), member.render());
    }
    Ok(())
}
