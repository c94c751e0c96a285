//! Plain-text rendering of tasks for terminal output.

use alltag_core::{Task, display_rank};
use chrono::{DateTime, TimeZone};

/// One line describing a task, as used in lists.
pub fn task_row<Z: TimeZone>(task: &Task, now: &DateTime<Z>) -> String {
    let Some(c) = task.classification() else {
        return format!("{:>5}  {}  (unclassified)", task.id, task.label);
    };
    let later = if c.has_started(now) { "" } else { "  (later)" };
    format!(
        "{:>5}  {:<8}  {:>8} -> {:<8}  {} .. {}  {:>6.2}  {}{}",
        task.id,
        c.class(),
        c.initial_priority(),
        c.final_priority(),
        c.starts_at(),
        c.due_at(),
        display_rank(task, now).max(-99.99),
        task.label,
        later,
    )
}

/// Multi-line description of a single task.
pub fn task_details<Z: TimeZone>(task: &Task, locations: &[String], now: &DateTime<Z>) -> String {
    let mut s = format!("Task {}: {}\n", task.id, task.label);
    match task.classification() {
        None => s.push_str(&format!(
            "  not classified yet: alltag task classify {}\n",
            task.id.0
        )),
        Some(c) => {
            s.push_str(&format!("  class:      {}\n", c.class()));
            s.push_str(&format!(
                "  priority:   {} -> {} (now {:.2})\n",
                c.initial_priority(),
                c.final_priority(),
                c.score(now)
            ));
            s.push_str(&format!("  window:     {} .. {}\n", c.starts_at(), c.due_at()));
            if c.recurrence_days() > 0 {
                s.push_str(&format!("  recurs:     {} days after closing\n", c.recurrence_days()));
            }
            s.push_str(&format!("  locations:  {}\n", locations.join(", ")));
        }
    }
    s
}
