//! alltag-core: the prioritization and recommendation engine of Alltag.
//!
//! Everything in here is a pure function of its inputs. The current time is
//! always passed in by the caller, sampled once per operation.

pub mod classify;
pub mod date;
pub mod error;
pub mod location;
pub mod priority;
pub mod recommend;
pub mod recurrence;
pub mod task;
pub mod time;

pub use classify::{ClassificationEdit, ClassificationInput, classify};
pub use date::CalendarDate;
pub use error::EngineError;
pub use location::{Location, LocationId, TaskLocation, locations_by_task};
pub use priority::{display_rank, score, sort_for_display};
pub use recommend::{Recommendations, next_unclassified, select_recommendations};
pub use recurrence::{Closure, resolve_closure};
pub use task::{Classification, Priority, Task, TaskClass, TaskId, TaskState, validate_label};
pub use time::{parse_timezone, start_of_day};
