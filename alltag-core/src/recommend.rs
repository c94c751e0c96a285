//! Recommendation selector: the single next task per (location, class).

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone};
use tracing::trace;

use crate::location::{LocationId, TaskLocation, locations_by_task};
use crate::priority::cmp_scores;
use crate::task::{Task, TaskClass, TaskId};

/// Recommended task per (location, class). A missing slot means there is
/// nothing to recommend there.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recommendations {
    slots: BTreeMap<(LocationId, TaskClass), Pick>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pick {
    task_id: TaskId,
    score: f64,
}

impl Pick {
    // Highest score wins. Exact ties go to the lower task id, which keeps
    // the result independent of input order.
    fn beats(&self, other: &Pick) -> bool {
        match cmp_scores(self.score, other.score) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => self.task_id < other.task_id,
        }
    }
}

impl Recommendations {
    pub fn get(&self, location: LocationId, class: TaskClass) -> Option<TaskId> {
        self.slots.get(&(location, class)).map(|p| p.task_id)
    }

    /// Score of the recommended task, for display.
    pub fn score(&self, location: LocationId, class: TaskClass) -> Option<f64> {
        self.slots.get(&(location, class)).map(|p| p.score)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn offer(&mut self, location: LocationId, class: TaskClass, pick: Pick) {
        self.slots
            .entry((location, class))
            .and_modify(|current| {
                if pick.beats(current) {
                    *current = pick;
                }
            })
            .or_insert(pick);
    }
}

/// Pick the most urgent started task for every (location, class) pair.
///
/// Unclassified tasks and tasks whose window opens after `now` are never
/// recommended, however high their score. Associations referring to tasks
/// not in `open_tasks` are ignored.
pub fn select_recommendations<Z: TimeZone>(
    open_tasks: &[Task],
    associations: &[TaskLocation],
    now: &DateTime<Z>,
) -> Recommendations {
    let locations = locations_by_task(associations);
    let mut out = Recommendations::default();

    for task in open_tasks {
        let Some(c) = task.classification() else {
            continue;
        };
        if !c.has_started(now) {
            trace!(task = task.id.0, starts_at = %c.starts_at(), "not started, skipping");
            continue;
        }
        let Some(task_locations) = locations.get(&task.id) else {
            continue;
        };

        let pick = Pick {
            task_id: task.id,
            score: c.score(now),
        };
        for &location in task_locations {
            out.offer(location, c.class(), pick);
        }
    }

    out
}

/// The oldest unclassified task (lowest id), so the user can be asked to
/// classify it.
pub fn next_unclassified(tasks: &[Task]) -> Option<TaskId> {
    tasks
        .iter()
        .filter(|t| !t.is_classified())
        .map(|t| t.id)
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::CalendarDate;
    use crate::task::{Classification, Priority};
    use chrono::Utc;

    fn d(s: &str) -> CalendarDate {
        CalendarDate::parse(s).unwrap()
    }

    fn task(id: u64, class: TaskClass, starts: &str, due: &str, to: Priority) -> Task {
        task_from(id, class, starts, due, Priority::Low, to)
    }

    fn task_from(id: u64, class: TaskClass, starts: &str, due: &str, from: Priority, to: Priority) -> Task {
        let c = Classification::new(class, from, to, d(starts), d(due), 0).unwrap();
        Task::new(TaskId(id), format!("task {id}"), "alice").with_classification(c)
    }

    fn at(id: u64, loc: u64) -> TaskLocation {
        TaskLocation::new(TaskId(id), LocationId(loc))
    }

    #[test]
    fn test_highest_score_wins_regardless_of_order() {
        let now = d("2024-01-05").first_second_in(&Utc);
        // score 2.0 vs 5.0 at the same location and class
        let low = task(1, TaskClass::Mental, "2024-01-01", "2024-01-03", Priority::Normal);
        let high = task_from(2, TaskClass::Mental, "2024-01-01", "2024-01-02", Priority::Normal, Priority::High);
        let assoc = [at(1, 10), at(2, 10)];

        assert_eq!(crate::priority::score(&low, &now), 2.0);
        assert_eq!(crate::priority::score(&high, &now), 5.0);

        for tasks in [vec![low.clone(), high.clone()], vec![high.clone(), low.clone()]] {
            let recs = select_recommendations(&tasks, &assoc, &now);
            assert_eq!(recs.get(LocationId(10), TaskClass::Mental), Some(TaskId(2)));
            assert_eq!(recs.get(LocationId(10), TaskClass::Physical), None);
        }
    }

    #[test]
    fn test_future_tasks_are_never_recommended() {
        let now = d("2024-01-05").first_second_in(&Utc);
        // outscores the started task, but does not start until tomorrow
        let future = task_from(1, TaskClass::Physical, "2024-01-06", "2024-01-16", Priority::High, Priority::Critical);
        let started = task(2, TaskClass::Physical, "2024-01-05", "2024-02-05", Priority::Normal);
        assert!(crate::priority::score(&future, &now) > crate::priority::score(&started, &now));
        let recs = select_recommendations(&[future.clone()], &[at(1, 1)], &now);
        assert!(recs.is_empty());

        let recs = select_recommendations(&[future, started], &[at(1, 1), at(2, 1)], &now);
        assert_eq!(recs.get(LocationId(1), TaskClass::Physical), Some(TaskId(2)));
    }

    #[test]
    fn test_pairs_are_independent() {
        let now = d("2024-01-03").first_second_in(&Utc);
        let tasks = [
            task(1, TaskClass::Mental, "2024-01-01", "2024-01-05", Priority::Critical),
            task(2, TaskClass::Physical, "2024-01-01", "2024-01-05", Priority::Normal),
            task(3, TaskClass::Mental, "2024-01-01", "2024-01-05", Priority::Normal),
        ];
        let assoc = [at(1, 1), at(2, 1), at(2, 2), at(3, 2)];
        let recs = select_recommendations(&tasks, &assoc, &now);

        assert_eq!(recs.get(LocationId(1), TaskClass::Mental), Some(TaskId(1)));
        assert_eq!(recs.get(LocationId(1), TaskClass::Physical), Some(TaskId(2)));
        assert_eq!(recs.get(LocationId(2), TaskClass::Mental), Some(TaskId(3)));
        assert_eq!(recs.get(LocationId(2), TaskClass::Physical), Some(TaskId(2)));
        assert_eq!(recs.len(), 4);
    }

    #[test]
    fn test_exact_ties_go_to_lowest_id() {
        let now = d("2024-01-03").first_second_in(&Utc);
        let a = task(7, TaskClass::Mental, "2024-01-01", "2024-01-05", Priority::High);
        let b = task(4, TaskClass::Mental, "2024-01-01", "2024-01-05", Priority::High);
        let recs = select_recommendations(&[a, b], &[at(7, 1), at(4, 1)], &now);
        assert_eq!(recs.get(LocationId(1), TaskClass::Mental), Some(TaskId(4)));
    }

    #[test]
    fn test_empty_input_recommends_nothing() {
        let now = Utc::now();
        assert!(select_recommendations(&[], &[], &now).is_empty());

        let unclassified = Task::new(TaskId(1), "later", "alice");
        assert!(select_recommendations(&[unclassified], &[at(1, 1)], &now).is_empty());
    }

    #[test]
    fn test_oldest_unclassified_task() {
        let tasks = [
            task(1, TaskClass::Mental, "2024-01-01", "2024-01-05", Priority::High),
            Task::new(TaskId(8), "b", "alice"),
            Task::new(TaskId(3), "a", "alice"),
        ];
        assert_eq!(next_unclassified(&tasks), Some(TaskId(3)));
        assert_eq!(next_unclassified(&tasks[..1]), None);
    }
}
