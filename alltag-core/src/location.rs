//! Locations and the task <-> location association.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::task::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(pub u64);

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("#{}", self.0))
    }
}

/// A place where tasks can be carried out. Owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub label: String,
    pub username: String,
}

impl Location {
    pub fn new(id: LocationId, label: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            username: username.into(),
        }
    }
}

/// One entry of the N:M mapping between tasks and locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskLocation {
    pub task_id: TaskId,
    pub location_id: LocationId,
}

impl TaskLocation {
    pub fn new(task_id: TaskId, location_id: LocationId) -> Self {
        Self {
            task_id,
            location_id,
        }
    }
}

/// Group associations by task.
pub fn locations_by_task(associations: &[TaskLocation]) -> BTreeMap<TaskId, BTreeSet<LocationId>> {
    let mut out: BTreeMap<TaskId, BTreeSet<LocationId>> = BTreeMap::new();
    for a in associations {
        out.entry(a.task_id).or_default().insert(a.location_id);
    }
    out
}
