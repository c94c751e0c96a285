//! JSON record store for tasks, locations and their associations.
//!
//! The whole document is loaded, changed in memory and written back through a
//! temp file + rename, so a failed operation never leaves half of its writes
//! behind. Transactions hold an exclusive lock on `<store>.lock` from load to
//! rename, so concurrent `alltag` processes queue up instead of overwriting
//! each other.

use alltag_core::{Location, LocationId, Task, TaskId, TaskLocation};
use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Records {
    last_location_id: u64,
    last_task_id: u64,
    locations: Vec<Location>,
    tasks: Vec<Task>,
    task_locations: BTreeSet<TaskLocation>,
}

impl Records {
    pub fn insert_location(&mut self, username: &str, label: String) -> LocationId {
        self.last_location_id += 1;
        let id = LocationId(self.last_location_id);
        self.locations.push(Location::new(id, label, username));
        id
    }

    pub fn insert_task(&mut self, username: &str, label: String) -> TaskId {
        self.last_task_id += 1;
        let id = TaskId(self.last_task_id);
        self.tasks.push(Task::new(id, label, username));
        id
    }

    /// The user's locations, ordered by label.
    pub fn locations(&self, username: &str) -> Vec<Location> {
        let mut out: Vec<Location> = self
            .locations
            .iter()
            .filter(|l| l.username == username)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.id.cmp(&b.id)));
        out
    }

    pub fn location_ids(&self, username: &str) -> BTreeSet<LocationId> {
        self.locations
            .iter()
            .filter(|l| l.username == username)
            .map(|l| l.id)
            .collect()
    }

    pub fn location(&self, username: &str, id: LocationId) -> Result<&Location> {
        self.locations
            .iter()
            .find(|l| l.id == id && l.username == username)
            .ok_or_else(|| anyhow!("location {id} not found"))
    }

    pub fn location_mut(&mut self, username: &str, id: LocationId) -> Result<&mut Location> {
        self.locations
            .iter_mut()
            .find(|l| l.id == id && l.username == username)
            .ok_or_else(|| anyhow!("location {id} not found"))
    }

    /// Delete a location and every association pointing at it.
    pub fn delete_location(&mut self, username: &str, id: LocationId) -> Result<Location> {
        let idx = self
            .locations
            .iter()
            .position(|l| l.id == id && l.username == username)
            .ok_or_else(|| anyhow!("location {id} not found"))?;
        self.task_locations.retain(|a| a.location_id != id);
        Ok(self.locations.remove(idx))
    }

    /// The user's tasks in creation order.
    pub fn tasks(&self, username: &str) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| t.username == username)
            .cloned()
            .collect()
    }

    pub fn task(&self, username: &str, id: TaskId) -> Result<&Task> {
        self.tasks
            .iter()
            .find(|t| t.id == id && t.username == username)
            .ok_or_else(|| anyhow!("task {id} not found"))
    }

    /// Replace a stored task with `task` (matched by id and owner).
    pub fn update_task(&mut self, task: Task) -> Result<()> {
        let slot = self
            .tasks
            .iter_mut()
            .find(|t| t.id == task.id && t.username == task.username)
            .ok_or_else(|| anyhow!("task {} not found", task.id))?;
        *slot = task;
        Ok(())
    }

    /// Delete a task and its associations.
    pub fn delete_task(&mut self, username: &str, id: TaskId) -> Result<Task> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == id && t.username == username)
            .ok_or_else(|| anyhow!("task {id} not found"))?;
        self.task_locations.retain(|a| a.task_id != id);
        Ok(self.tasks.remove(idx))
    }

    pub fn locations_of_task(&self, id: TaskId) -> BTreeSet<LocationId> {
        self.task_locations
            .iter()
            .filter(|a| a.task_id == id)
            .map(|a| a.location_id)
            .collect()
    }

    /// Tasks associated with a location.
    pub fn tasks_at(&self, username: &str, location: LocationId) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| t.username == username)
            .filter(|t| {
                self.task_locations
                    .contains(&TaskLocation::new(t.id, location))
            })
            .cloned()
            .collect()
    }

    /// All associations of the user's tasks.
    pub fn associations(&self, username: &str) -> Vec<TaskLocation> {
        let owned: BTreeSet<TaskId> = self
            .tasks
            .iter()
            .filter(|t| t.username == username)
            .map(|t| t.id)
            .collect();
        self.task_locations
            .iter()
            .filter(|a| owned.contains(&a.task_id))
            .copied()
            .collect()
    }

    pub fn associate(&mut self, link: TaskLocation) -> Result<()> {
        if !self.tasks.iter().any(|t| t.id == link.task_id) {
            bail!("task {} not found", link.task_id);
        }
        if !self.locations.iter().any(|l| l.id == link.location_id) {
            bail!("location {} not found", link.location_id);
        }
        self.task_locations.insert(link);
        Ok(())
    }

    pub fn dissociate(&mut self, link: &TaskLocation) {
        self.task_locations.remove(link);
    }
}

/// File-backed record store.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current contents. A missing file is an empty store.
    pub fn load(&self) -> Result<Records> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "store file missing, starting empty");
            return Ok(Records::default());
        }
        let s = fs::read_to_string(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;
        serde_json::from_str(&s).with_context(|| format!("parse {}", self.path.display()))
    }

    /// Run `f` against a working copy and persist it only if `f` succeeds.
    pub fn transaction<T>(&self, f: impl FnOnce(&mut Records) -> Result<T>) -> Result<T> {
        let _lock = self.lock()?;
        let mut working = self.load()?;
        let out = f(&mut working)?;
        self.persist(&working)?;
        Ok(out)
    }

    fn dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Blocks until no other transaction holds the store. Released on drop.
    fn lock(&self) -> Result<File> {
        let dir = self.dir();
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        let path = self.lock_path();
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .with_context(|| format!("open {}", path.display()))?;
        file.lock()
            .with_context(|| format!("lock {}", path.display()))?;
        debug!(path = %path.display(), "store locked");
        Ok(file)
    }

    fn persist(&self, records: &Records) -> Result<()> {
        // unique name next to the store, so the rename stays on one filesystem
        let mut tmp = NamedTempFile::new_in(self.dir())
            .with_context(|| format!("create temp file in {}", self.dir().display()))?;
        serde_json::to_writer_pretty(&mut tmp, records).context("serialize store")?;
        tmp.as_file().sync_all().context("flush store")?;
        tmp.persist(&self.path)
            .with_context(|| format!("replace {}", self.path.display()))?;
        info!(path = %self.path.display(), "store committed");
        Ok(())
    }
}
