//! Task model: identity, classification and scheduling window.
//!
//! A task starts out unclassified. Classification attaches an effort class,
//! a priority trajectory and a date window in one go, so "unclassified" can
//! never carry stale priorities or dates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::date::CalendarDate;
use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("#{}", self.0))
    }
}

/// Effort class. Recommendations are made separately for each class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskClass {
    Mental,
    Physical,
}

impl TaskClass {
    pub const ALL: [TaskClass; 2] = [TaskClass::Mental, TaskClass::Physical];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskClass::Mental => "mental",
            TaskClass::Physical => "physical",
        }
    }
}

impl fmt::Display for TaskClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TaskClass {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mental" => Ok(TaskClass::Mental),
            "physical" => Ok(TaskClass::Physical),
            _ => Err(EngineError::InvalidTaskClass(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    Low = 0,
    Normal = 1,
    High = 2,
    Critical = 3,
}

impl Priority {
    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Normal => "Normal",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }
}

impl TryFrom<u8> for Priority {
    type Error = EngineError;

    fn try_from(level: u8) -> Result<Self> {
        match level {
            0 => Ok(Priority::Low),
            1 => Ok(Priority::Normal),
            2 => Ok(Priority::High),
            3 => Ok(Priority::Critical),
            _ => Err(EngineError::InvalidPriority(level.to_string())),
        }
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> Self {
        p.level()
    }
}

/// Accepts either the numeric level ("0".."3") or the name ("high").
impl FromStr for Priority {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(level) = s.parse::<u8>() {
            return Priority::try_from(level).map_err(|_| EngineError::InvalidPriority(s.to_string()));
        }
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "normal" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            _ => Err(EngineError::InvalidPriority(s.to_string())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Everything that classification attaches to a task.
///
/// Invariants: `initial_priority < final_priority` and `due_at` strictly
/// after `starts_at`. Both are checked on construction and on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawClassification")]
pub struct Classification {
    class: TaskClass,
    initial_priority: Priority,
    final_priority: Priority,
    starts_at: CalendarDate,
    due_at: CalendarDate,
    /// 0 means one-shot. Otherwise closing the task respawns it this many
    /// days later instead of deleting it.
    recurrence_days: u32,
}

#[derive(Deserialize)]
struct RawClassification {
    class: TaskClass,
    initial_priority: Priority,
    final_priority: Priority,
    starts_at: CalendarDate,
    due_at: CalendarDate,
    #[serde(default)]
    recurrence_days: u32,
}

impl TryFrom<RawClassification> for Classification {
    type Error = EngineError;

    fn try_from(raw: RawClassification) -> Result<Self> {
        Classification::new(
            raw.class,
            raw.initial_priority,
            raw.final_priority,
            raw.starts_at,
            raw.due_at,
            raw.recurrence_days,
        )
    }
}

impl Classification {
    pub fn new(
        class: TaskClass,
        initial_priority: Priority,
        final_priority: Priority,
        starts_at: CalendarDate,
        due_at: CalendarDate,
        recurrence_days: u32,
    ) -> Result<Self> {
        if initial_priority >= final_priority {
            return Err(EngineError::PriorityOrder);
        }
        if !due_at.after(&starts_at) {
            return Err(EngineError::DueNotAfterStart);
        }
        Ok(Self {
            class,
            initial_priority,
            final_priority,
            starts_at,
            due_at,
            recurrence_days,
        })
    }

    pub fn class(&self) -> TaskClass {
        self.class
    }

    pub fn initial_priority(&self) -> Priority {
        self.initial_priority
    }

    pub fn final_priority(&self) -> Priority {
        self.final_priority
    }

    pub fn starts_at(&self) -> CalendarDate {
        self.starts_at
    }

    pub fn due_at(&self) -> CalendarDate {
        self.due_at
    }

    pub fn recurrence_days(&self) -> u32 {
        self.recurrence_days
    }

    /// Length of the active window in days. Always positive.
    pub fn window_days(&self) -> i64 {
        self.due_at.sub(&self.starts_at)
    }

    /// Move the window, keeping everything else.
    pub fn with_window(&self, starts_at: CalendarDate, due_at: CalendarDate) -> Result<Self> {
        Classification::new(
            self.class,
            self.initial_priority,
            self.final_priority,
            starts_at,
            due_at,
            self.recurrence_days,
        )
    }

    pub fn with_recurrence_days(mut self, days: u32) -> Self {
        self.recurrence_days = days;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum TaskState {
    #[default]
    Unclassified,
    Classified(Classification),
}

/// A single task, owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub label: String,
    pub username: String,
    #[serde(flatten)]
    pub state: TaskState,
}

impl Task {
    /// A freshly created, unclassified task.
    pub fn new(id: TaskId, label: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            username: username.into(),
            state: TaskState::Unclassified,
        }
    }

    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.state = TaskState::Classified(classification);
        self
    }

    pub fn is_classified(&self) -> bool {
        matches!(self.state, TaskState::Classified(_))
    }

    pub fn classification(&self) -> Option<&Classification> {
        match &self.state {
            TaskState::Classified(c) => Some(c),
            TaskState::Unclassified => None,
        }
    }

    /// Like `classification()`, but for operations that cannot proceed without one.
    pub fn require_classified(&self) -> Result<&Classification> {
        self.classification().ok_or_else(|| {
            EngineError::PreconditionViolated(format!("task {} is not classified yet", self.id))
        })
    }

    pub fn class(&self) -> Option<TaskClass> {
        self.classification().map(Classification::class)
    }

    /// Start of the window, or the epoch placeholder if unclassified.
    pub fn starts_at(&self) -> CalendarDate {
        self.classification()
            .map(Classification::starts_at)
            .unwrap_or_default()
    }

    /// End of the window, or the epoch placeholder if unclassified.
    pub fn due_at(&self) -> CalendarDate {
        self.classification()
            .map(Classification::due_at)
            .unwrap_or_default()
    }
}

/// Labels of tasks and locations must contain something besides whitespace.
pub fn validate_label(label: &str) -> Result<String> {
    let label = label.trim();
    if label.is_empty() {
        return Err(EngineError::EmptyLabel);
    }
    Ok(label.to_string())
}
