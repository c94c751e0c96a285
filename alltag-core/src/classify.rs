//! Classification: turning a raw task into a schedulable one, or editing it.
//!
//! The result is a task update plus an association diff. Callers must apply
//! both in one transaction, otherwise a reader could observe new priorities
//! with stale locations.

use std::collections::BTreeSet;

use crate::date::CalendarDate;
use crate::error::{EngineError, Result};
use crate::location::{LocationId, TaskLocation};
use crate::task::{Classification, Priority, Task, TaskClass, TaskState, validate_label};

/// User input for classifying or re-classifying a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationInput {
    pub label: String,
    pub class: TaskClass,
    pub initial_priority: Priority,
    pub final_priority: Priority,
    pub due_at: CalendarDate,
    pub recurrence_days: u32,
    pub location_ids: BTreeSet<LocationId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationEdit {
    pub task: Task,
    pub insert: Vec<TaskLocation>,
    pub delete: Vec<TaskLocation>,
}

/// Validate `input` against `task` and compute the resulting edit.
///
/// `current_locations` are the task's existing associations, `owned_locations`
/// every location id belonging to the task's owner, and `today` the caller's
/// current date. On first classification the window starts today; later
/// edits keep the existing start date.
pub fn classify(
    task: &Task,
    input: ClassificationInput,
    current_locations: &BTreeSet<LocationId>,
    owned_locations: &BTreeSet<LocationId>,
    today: CalendarDate,
) -> Result<ClassificationEdit> {
    let label = validate_label(&input.label)?;

    if input.initial_priority >= input.final_priority {
        return Err(EngineError::PriorityOrder);
    }

    let starts_at = match task.classification() {
        Some(c) if !c.starts_at().is_epoch() => c.starts_at(),
        _ => today,
    };
    if input.due_at.before(&today) {
        return Err(EngineError::DueInPast);
    }
    let classification = Classification::new(
        input.class,
        input.initial_priority,
        input.final_priority,
        starts_at,
        input.due_at,
        input.recurrence_days,
    )?;

    if let Some(unknown) = input
        .location_ids
        .iter()
        .find(|id| !owned_locations.contains(id))
    {
        return Err(EngineError::UnknownLocation(unknown.0));
    }
    if input.location_ids.is_empty() {
        return Err(EngineError::NoLocations);
    }

    let insert = input
        .location_ids
        .difference(current_locations)
        .map(|&loc| TaskLocation::new(task.id, loc))
        .collect();
    let delete = current_locations
        .difference(&input.location_ids)
        .map(|&loc| TaskLocation::new(task.id, loc))
        .collect();

    let mut updated = task.clone();
    updated.label = label;
    updated.state = TaskState::Classified(classification);

    Ok(ClassificationEdit {
        task: updated,
        insert,
        delete,
    })
}
