//! What happens to a task when it is marked as done.

use chrono::{DateTime, TimeZone};
use tracing::debug;

use crate::date::CalendarDate;
use crate::error::Result;
use crate::task::{Task, TaskId, TaskState};

/// The write a closure turns into. The caller must apply it atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Closure {
    /// One-shot task: remove it together with its location associations.
    Delete(TaskId),
    /// Recurring task: store this new state. Locations are unchanged.
    Update(Task),
}

/// Close `task` at `now`.
///
/// Without recurrence, closing deletes the task. With recurrence, the window
/// is moved so that it starts `recurrence_days` after today and keeps its
/// current length; the task stays classified and open.
pub fn resolve_closure<Z: TimeZone>(task: &Task, now: &DateTime<Z>) -> Result<Closure> {
    let classification = task.require_classified()?;
    let recurrence = classification.recurrence_days();
    if recurrence == 0 {
        debug!(task = task.id.0, "one-shot task closed");
        return Ok(Closure::Delete(task.id));
    }

    let window = classification.window_days();
    let starts_at = CalendarDate::from_datetime(now)?.add_days(i64::from(recurrence))?;
    let due_at = starts_at.add_days(window)?;
    debug!(
        task = task.id.0,
        %starts_at,
        %due_at,
        "recurring task respawned"
    );

    let mut respawned = task.clone();
    respawned.state = TaskState::Classified(classification.with_window(starts_at, due_at)?);
    Ok(Closure::Update(respawned))
}
