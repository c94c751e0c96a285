//! The "what should I do next" overview.

use alltag_core::{
    Location, Recommendations, Task, TaskClass, TaskId, next_unclassified, select_recommendations,
};
use anyhow::Result;
use chrono::{DateTime, TimeZone};

use crate::session::Session;

pub fn run(session: &Session) -> Result<()> {
    let now = session.now();
    let records = session.store.load()?;

    let locations = records.locations(&session.username);
    if locations.is_empty() {
        println!("You need to create at least one location first: alltag location add <label>");
        return Ok(());
    }

    let tasks = records.tasks(&session.username);
    print!(
        "{}",
        render(&locations, &tasks, &records.associations(&session.username), &now)
    );
    Ok(())
}

fn render<Z: TimeZone>(
    locations: &[Location],
    tasks: &[Task],
    associations: &[alltag_core::TaskLocation],
    now: &DateTime<Z>,
) -> String {
    let recs = select_recommendations(tasks, associations, now);
    let label_of = |id: TaskId| {
        tasks
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.label.as_str())
            .unwrap_or("?")
    };
    let slot = |recs: &Recommendations, loc: &Location, class: TaskClass| match recs.get(loc.id, class) {
        Some(id) => format!(
            "{class} {id} {} ({:.2})",
            label_of(id),
            recs.score(loc.id, class).unwrap_or_default()
        ),
        None => format!("{class} -"),
    };

    let mut out = String::new();
    for loc in locations {
        out.push_str(&format!("{}:\n", loc.label));
        for class in TaskClass::ALL {
            out.push_str(&format!("  {}\n", slot(&recs, loc, class)));
        }
    }
    if let Some(id) = next_unclassified(tasks) {
        out.push_str(&format!(
            "\nClassify a task: {id} {} (alltag task classify {})\n",
            label_of(id),
            id.0
        ));
    }
    out
}
