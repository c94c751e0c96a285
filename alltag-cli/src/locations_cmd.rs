use alltag_core::{LocationId, sort_for_display, validate_label};
use anyhow::Result;
use clap::Subcommand;
use tracing::info;

use crate::render::task_row;
use crate::session::Session;

#[derive(Subcommand, Debug)]
pub enum LocationCommand {
    /// Create a location
    Add { label: String },

    /// List locations by name
    List,

    /// Show the tasks at a location, most urgent first
    Show { id: u64 },

    /// Rename a location
    Rename { id: u64, label: String },

    /// Delete a location. Tasks stay, but lose this location.
    Delete { id: u64 },
}

pub fn run(cmd: LocationCommand, session: &Session) -> Result<()> {
    match cmd {
        LocationCommand::Add { label } => add(session, &label),
        LocationCommand::List => list(session),
        LocationCommand::Show { id } => show(session, LocationId(id)),
        LocationCommand::Rename { id, label } => rename(session, LocationId(id), &label),
        LocationCommand::Delete { id } => delete(session, LocationId(id)),
    }
}

fn add(session: &Session, label: &str) -> Result<()> {
    let label = validate_label(label)?;
    let id = session
        .store
        .transaction(|r| Ok(r.insert_location(&session.username, label)))?;
    info!(location = id.0, "location created");
    println!("Created location {id}.");
    Ok(())
}

fn list(session: &Session) -> Result<()> {
    let locations = session.store.load()?.locations(&session.username);
    if locations.is_empty() {
        println!("You need to create at least one location first: alltag location add <label>");
        return Ok(());
    }
    for l in &locations {
        println!("{:>5}  {}", l.id, l.label);
    }
    Ok(())
}

fn show(session: &Session, id: LocationId) -> Result<()> {
    let now = session.now();
    let records = session.store.load()?;
    let location = records.location(&session.username, id)?;
    let mut tasks = records.tasks_at(&session.username, id);

    println!("{} {}", location.id, location.label);
    if tasks.is_empty() {
        println!("  (no tasks)");
        return Ok(());
    }
    sort_for_display(&mut tasks, &now);
    for t in &tasks {
        println!("{}", task_row(t, &now));
    }
    Ok(())
}

fn rename(session: &Session, id: LocationId, label: &str) -> Result<()> {
    let label = validate_label(label)?;
    session.store.transaction(|r| {
        r.location_mut(&session.username, id)?.label = label;
        Ok(())
    })?;
    println!("Renamed location {id}.");
    Ok(())
}

fn delete(session: &Session, id: LocationId) -> Result<()> {
    let (location, orphaned) = session.store.transaction(|r| {
        let affected = r.tasks_at(&session.username, id).len();
        let location = r.delete_location(&session.username, id)?;
        Ok((location, affected))
    })?;
    info!(location = id.0, tasks = orphaned, "location deleted");
    println!("Deleted location {} ({} task(s) unlinked).", location.label, orphaned);
    Ok(())
}
