use anyhow::Result;
use kinfolk_core::{DateRange, Kinfolk};
use owo_colors::OwoColorize;

use crate::render::{Render, format_date_label, pluralize};

pub async fn run(kinfolk: &Kinfolk, viewer: &str, range: &DateRange, json: bool) -> Result<()> {
    let view = kinfolk.calendar(viewer, range).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!(
        "{} {} {}",
        format!("Calendar for {}", view.viewer).bold(),
        view.family_group.render(),
        format!("{} to {}", range.from, range.to).dimmed()
    );
    if !view.remote_available {
        println!("{}", "Event store unavailable, showing cached events".yellow());
    }

    if view.events.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    // Group events by day
    let mut current_date: Option<String> = None;
    for event in &view.events {
        let date_label = format_date_label(&event.start);
        if current_date.as_ref() != Some(&date_label) {
            println!();
            println!("{}", date_label.bold());
            current_date = Some(date_label);
        }
        println!("{}", event.render());
    }

    let count = view.events.len();
    println!();
    println!("{}", format!("{} {}", count, pluralize("event", count)).dimmed());
    Ok(())
}
