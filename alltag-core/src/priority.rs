//! Priority interpolation and display ranking.
//!
//! Both functions take `now` as an argument instead of reading the clock.
//! They are called many times while sorting a list, and a clock that moves
//! between comparisons makes the comparator inconsistent. Sample `now` once
//! per operation and pass the same value everywhere.

use std::cmp::Ordering;

use chrono::{DateTime, TimeZone};

use crate::task::{Classification, Task};
use crate::time::epoch_seconds;

impl Classification {
    /// Linear interpolation from initial to final priority across the window.
    ///
    /// Not clamped: before `starts_at` the result drops below the initial
    /// priority, and overdue tasks keep climbing past the final priority.
    pub fn score<Z: TimeZone>(&self, now: &DateTime<Z>) -> f64 {
        let tz = now.timezone();
        let start = epoch_seconds(&self.starts_at().first_second_in(&tz));
        let end = epoch_seconds(&self.due_at().first_second_in(&tz));
        let now = epoch_seconds(now);

        let start_prio = f64::from(self.initial_priority().level());
        let end_prio = f64::from(self.final_priority().level());

        start_prio + (end_prio - start_prio) * (now - start) / (end - start)
    }

    /// Whether the window has begun at `now`.
    pub fn has_started<Z: TimeZone>(&self, now: &DateTime<Z>) -> bool {
        self.starts_at().first_second_in(&now.timezone()) <= *now
    }
}

/// Urgency score of a task. Unclassified tasks score negative infinity.
pub fn score<Z: TimeZone>(task: &Task, now: &DateTime<Z>) -> f64 {
    match task.classification() {
        Some(c) => c.score(now),
        None => f64::NEG_INFINITY,
    }
}

/// Sort key for human-facing task lists.
///
/// Tasks that have not started yet rank by the negative number of seconds
/// until they start, so they sit below every started task (whose score is
/// non-negative) and the one starting soonest comes first among them.
pub fn display_rank<Z: TimeZone>(task: &Task, now: &DateTime<Z>) -> f64 {
    let Some(c) = task.classification() else {
        return f64::NEG_INFINITY;
    };
    let starts_at = c.starts_at().first_second_in(&now.timezone());
    if starts_at > *now {
        return -(starts_at - now.clone()).num_seconds() as f64;
    }
    c.score(now)
}

/// Order tasks for display: highest rank first, ties by ascending id.
pub fn sort_for_display<Z: TimeZone>(tasks: &mut [Task], now: &DateTime<Z>) {
    tasks.sort_by(|a, b| {
        display_rank(b, now)
            .total_cmp(&display_rank(a, now))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Compare two scores so that NaN never poisons a sort.
pub(crate) fn cmp_scores(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::CalendarDate;
    use crate::task::{Priority, TaskClass, TaskId};
    use chrono::Utc;
    use chrono_tz::Europe::Berlin;

    fn d(s: &str) -> CalendarDate {
        CalendarDate::parse(s).unwrap()
    }

    fn task(id: u64, starts: &str, due: &str, from: Priority, to: Priority) -> Task {
        let c = Classification::new(TaskClass::Mental, from, to, d(starts), d(due), 0).unwrap();
        Task::new(TaskId(id), format!("task {id}"), "alice").with_classification(c)
    }

    #[test]
    fn test_score_interpolates_and_keeps_climbing() {
        let t = task(1, "2024-01-01", "2024-01-05", Priority::Low, Priority::Critical);
        let at = |s: &str| d(s).first_second_in(&Berlin);

        assert_eq!(score(&t, &at("2024-01-01")), 0.0);
        assert_eq!(score(&t, &at("2024-01-03")), 1.5);
        assert_eq!(score(&t, &at("2024-01-05")), 3.0);
        assert_eq!(score(&t, &at("2024-01-09")), 6.0);
        // before the window opens the score goes negative
        assert_eq!(score(&t, &at("2023-12-28")), -3.0);
    }

    #[test]
    fn test_score_starts_at_initial_priority() {
        let t = task(1, "2024-01-01", "2024-01-03", Priority::Normal, Priority::High);
        let now = d("2024-01-02").first_second_in(&Utc);
        assert_eq!(score(&t, &now), 1.5);
    }

    #[test]
    fn test_score_uses_callers_timezone() {
        let t = task(1, "2024-01-01", "2024-01-05", Priority::Low, Priority::Critical);
        // same instant, different midnights: 2024-01-03T00:00 Berlin is 23:00 UTC the day before
        let now = d("2024-01-03").first_second_in(&Berlin);
        let as_utc = now.with_timezone(&Utc);
        assert_eq!(score(&t, &now), 1.5);
        assert!(score(&t, &as_utc) < 1.5);
    }

    #[test]
    fn test_unclassified_ranks_last() {
        let t = Task::new(TaskId(9), "unsorted", "alice");
        let instants = [
            Utc.with_ymd_and_hms(1969, 7, 20, 20, 17, 0).unwrap(),
            Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 3, 12, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap(),
        ];
        for now in instants {
            assert_eq!(score(&t, &now), f64::NEG_INFINITY, "{now}");
            assert_eq!(display_rank(&t, &now), f64::NEG_INFINITY, "{now}");
            // same instant seen from another zone
            let local = now.with_timezone(&Berlin);
            assert_eq!(score(&t, &local), f64::NEG_INFINITY, "{local}");
        }
    }

    #[test]
    fn test_display_rank_for_future_tasks() {
        let now = d("2024-01-10").first_second_in(&Utc);
        let tomorrow = task(1, "2024-01-11", "2024-01-20", Priority::Low, Priority::High);
        let next_week = task(2, "2024-01-17", "2024-01-20", Priority::Low, Priority::High);
        assert_eq!(display_rank(&tomorrow, &now), -86400.0);
        assert_eq!(display_rank(&next_week, &now), -7.0 * 86400.0);

        let started = task(3, "2024-01-10", "2024-01-20", Priority::Low, Priority::High);
        assert_eq!(display_rank(&started, &now), 0.0);
    }

    #[test]
    fn test_sort_for_display() {
        let now = d("2024-01-10").first_second_in(&Utc);
        let mut tasks = vec![
            Task::new(TaskId(1), "unclassified", "alice"),
            task(2, "2024-01-15", "2024-01-20", Priority::Low, Priority::High),
            task(3, "2024-01-01", "2024-01-11", Priority::Low, Priority::Critical),
            task(4, "2024-01-12", "2024-01-20", Priority::Low, Priority::High),
            task(5, "2024-01-09", "2024-01-19", Priority::Low, Priority::Normal),
        ];
        sort_for_display(&mut tasks, &now);
        let ids: Vec<u64> = tasks.iter().map(|t| t.id.0).collect();
        assert_eq!(ids, vec![3, 5, 4, 2, 1]);
    }
}
