use alltag_core::{
    CalendarDate, ClassificationInput, Closure, LocationId, Priority, Task, TaskClass, TaskId,
    TaskState, classify, resolve_closure, sort_for_display, validate_label,
};
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tracing::info;

use crate::render::{task_details, task_row};
use crate::session::Session;

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Create a new, unclassified task
    Add {
        /// Smallest possible first step towards your goal
        label: String,
    },

    /// List all tasks, most urgent first
    List,

    /// Show a single task
    Show { id: u64 },

    /// Classify a task, or edit an already classified one
    Classify {
        id: u64,

        #[command(flatten)]
        args: ClassifyArgs,
    },

    /// Mark a task as done. Recurring tasks respawn instead of disappearing.
    Close {
        id: u64,

        /// Respawn this many days from today (overrides the stored interval)
        #[arg(long, conflicts_with = "no_recurrence")]
        recurrence_days: Option<u32>,

        /// Delete the task even if it was configured to recur
        #[arg(long, default_value_t = false)]
        no_recurrence: bool,
    },
}

/// Classification fields. When editing a classified task, omitted fields
/// keep their current value.
#[derive(Args, Debug, Default)]
pub struct ClassifyArgs {
    #[arg(long)]
    pub label: Option<String>,

    /// mental or physical
    #[arg(long)]
    pub class: Option<TaskClass>,

    /// 0-3 or low/normal/high/critical
    #[arg(long)]
    pub initial: Option<Priority>,

    /// 0-3 or low/normal/high/critical; must be above --initial
    #[arg(long = "final")]
    pub final_priority: Option<Priority>,

    /// Due date (yyyy-mm-dd)
    #[arg(long)]
    pub due: Option<CalendarDate>,

    /// Location id; repeat for several locations
    #[arg(long = "location")]
    pub locations: Vec<u64>,

    /// Respawn interval in days after closing (0 = one-shot)
    #[arg(long)]
    pub recurrence_days: Option<u32>,
}

pub fn run(cmd: TaskCommand, session: &Session) -> Result<()> {
    match cmd {
        TaskCommand::Add { label } => add(session, &label),
        TaskCommand::List => list(session),
        TaskCommand::Show { id } => show(session, TaskId(id)),
        TaskCommand::Classify { id, args } => classify_task(session, TaskId(id), args),
        TaskCommand::Close {
            id,
            recurrence_days,
            no_recurrence,
        } => close(session, TaskId(id), recurrence_days, no_recurrence),
    }
}

fn add(session: &Session, label: &str) -> Result<()> {
    let label = validate_label(label)?;
    let id = session
        .store
        .transaction(|r| Ok(r.insert_task(&session.username, label)))?;
    info!(task = id.0, "task created");
    println!("Created task {id}. Classify it with: alltag task classify {}", id.0);
    Ok(())
}

fn list(session: &Session) -> Result<()> {
    let now = session.now();
    let mut tasks = session.store.load()?.tasks(&session.username);
    if tasks.is_empty() {
        println!("No tasks. Add one with: alltag task add <label>");
        return Ok(());
    }
    sort_for_display(&mut tasks, &now);
    for t in &tasks {
        println!("{}", task_row(t, &now));
    }
    Ok(())
}

fn show(session: &Session, id: TaskId) -> Result<()> {
    let now = session.now();
    let records = session.store.load()?;
    let task = records.task(&session.username, id)?;

    let locations: Vec<String> = records
        .locations_of_task(id)
        .into_iter()
        .filter_map(|loc| records.location(&session.username, loc).ok())
        .map(|l| l.label.clone())
        .collect();
    print!("{}", task_details(task, &locations, &now));
    Ok(())
}

/// Merge `args` over the task's current classification.
fn classification_input(
    task: &Task,
    args: ClassifyArgs,
    current_locations: &std::collections::BTreeSet<LocationId>,
) -> Result<ClassificationInput> {
    let existing = task.classification();
    let required = |name: &str| format!("--{name} is required when classifying task {}", task.id);

    Ok(ClassificationInput {
        label: args.label.unwrap_or_else(|| task.label.clone()),
        class: args
            .class
            .or(existing.map(|c| c.class()))
            .with_context(|| required("class"))?,
        initial_priority: args
            .initial
            .or(existing.map(|c| c.initial_priority()))
            .with_context(|| required("initial"))?,
        final_priority: args
            .final_priority
            .or(existing.map(|c| c.final_priority()))
            .with_context(|| required("final"))?,
        due_at: args
            .due
            .or(existing.map(|c| c.due_at()))
            .with_context(|| required("due"))?,
        recurrence_days: args
            .recurrence_days
            .or(existing.map(|c| c.recurrence_days()))
            .unwrap_or(0),
        location_ids: if args.locations.is_empty() {
            current_locations.clone()
        } else {
            args.locations.into_iter().map(LocationId).collect()
        },
    })
}

fn classify_task(session: &Session, id: TaskId, args: ClassifyArgs) -> Result<()> {
    let now = session.now();
    let today = CalendarDate::from_datetime(&now)?;

    // task fields and associations change together or not at all
    let task = session.store.transaction(|r| {
        let task = r.task(&session.username, id)?.clone();
        let current = r.locations_of_task(id);
        let input = classification_input(&task, args, &current)?;
        let edit = classify(&task, input, &current, &r.location_ids(&session.username), today)?;

        r.update_task(edit.task.clone())?;
        for link in &edit.delete {
            r.dissociate(link);
        }
        for link in edit.insert {
            r.associate(link)?;
        }
        Ok(edit.task)
    })?;

    info!(task = id.0, "task classified");
    println!("{}", task_row(&task, &now));
    Ok(())
}

fn close(
    session: &Session,
    id: TaskId,
    recurrence_days: Option<u32>,
    no_recurrence: bool,
) -> Result<()> {
    let now = session.now();
    let recurrence_override = if no_recurrence { Some(0) } else { recurrence_days };

    let closure = session.store.transaction(|r| {
        let mut task = r.task(&session.username, id)?.clone();
        let classification = task
            .require_classified()
            .with_context(|| format!("classify it first: alltag task classify {}", id.0))?
            .clone();
        if let Some(days) = recurrence_override {
            task.state = TaskState::Classified(classification.with_recurrence_days(days));
        }

        let closure = resolve_closure(&task, &now)?;
        match &closure {
            Closure::Delete(id) => {
                r.delete_task(&session.username, *id)?;
            }
            Closure::Update(next) => r.update_task(next.clone())?,
        }
        Ok(closure)
    })?;

    match closure {
        Closure::Delete(id) => {
            info!(task = id.0, "task deleted");
            println!("Done! Task {id} is gone.");
        }
        Closure::Update(next) => {
            info!(task = next.id.0, "task respawned");
            println!(
                "Done! Task {} comes back on {} (due {}).",
                next.id,
                next.starts_at(),
                next.due_at()
            );
        }
    }
    Ok(())
}
