//! Entities read from the backend.

use chrono::{DateTime, Duration, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::time::deserialize_lenient_timestamp;

/// Server-assigned task identifier.
pub type TaskId = i64;
/// Server-assigned machine identifier.
pub type MachineId = i64;

/// Status strings the backend is known to emit. The field itself is free text.
pub mod status {
    #![allow(missing_docs)]
    pub const PENDING: &str = "Pending";
    pub const SCHEDULED: &str = "Scheduled";
    pub const IN_PROGRESS: &str = "In Progress";
    pub const COMPLETED: &str = "Completed";
    pub const CANCELED: &str = "Canceled";
}

/// One row of the schedule as returned by `GET /api/schedule`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTask")]
pub struct Task {
    /// Server-assigned id.
    pub task_id: TaskId,
    /// Job the task belongs to.
    pub job_id: i64,
    /// `task_name` on the wire.
    #[serde(rename = "task_name")]
    pub name: String,
    /// Sent by the backend as a number or a numeric string.
    pub duration_hours: f64,
    /// Name of the machine the task runs on.
    pub machine_name: String,
    /// Free text, usually one of the [`status`] constants.
    pub status: String,
    /// Set together with `end_time`, only once the optimizer has placed the task.
    pub start_time: Option<DateTime<Utc>>,
    /// Set together with `start_time`.
    pub end_time: Option<DateTime<Utc>>,
}

impl Task {
    /// Completed tasks are skipped by the optimizer.
    pub fn is_completed(&self) -> bool {
        self.status == status::COMPLETED
    }

    /// The scheduled `[start, end]` window, if the optimizer has run.
    pub fn window(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.start_time.zip(self.end_time)
    }
}

#[derive(Deserialize)]
struct RawTask {
    task_id: TaskId,
    job_id: i64,
    task_name: String,
    #[serde(deserialize_with = "deserialize_hours")]
    duration_hours: f64,
    machine_name: String,
    status: String,
    #[serde(default, deserialize_with = "deserialize_lenient_timestamp")]
    start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_lenient_timestamp")]
    end_time: Option<DateTime<Utc>>,
}

impl From<RawTask> for Task {
    fn from(raw: RawTask) -> Self {
        // Half a window is no window.
        let (start_time, end_time) = match (raw.start_time, raw.end_time) {
            (Some(s), Some(e)) => (Some(s), Some(e)),
            _ => (None, None),
        };
        Self {
            task_id: raw.task_id,
            job_id: raw.job_id,
            name: raw.task_name,
            duration_hours: raw.duration_hours,
            machine_name: raw.machine_name,
            status: raw.status,
            start_time,
            end_time,
        }
    }
}

/// Accepts `2.5` as well as `"2.5"`; the backend serializes NUMERIC columns as strings.
fn deserialize_hours<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Hours {
        Number(f64),
        Text(String),
    }

    match Hours::deserialize(deserializer)? {
        Hours::Number(n) => Ok(n),
        Hours::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("duration_hours is not numeric: {s:?}"))),
    }
}

/// A resource tasks are scheduled on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    /// Server-assigned id.
    pub machine_id: MachineId,
    /// Unique machine name.
    pub name: String,
    /// Concurrent tasks; 1 when the backend omits it.
    #[serde(default = "default_capacity")]
    pub capacity: i64,
}

fn default_capacity() -> i64 {
    1
}

/// `(id, name)` projection of a task, used to fill selection lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropdownTask {
    /// Server-assigned id.
    pub task_id: TaskId,
    /// Task label.
    pub name: String,
}

/// Directed must-follow edge: `successor_id` starts after `predecessor_id` ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Precedence {
    /// Task that must finish first.
    pub predecessor_id: TaskId,
    /// Task that waits.
    pub successor_id: TaskId,
}

/// Latest end minus earliest start over every scheduled task.
pub fn makespan(tasks: &[Task]) -> Option<Duration> {
    let mut windows = tasks.iter().filter_map(Task::window);
    let (mut first, mut last) = windows.next()?;
    for (start, end) in windows {
        first = first.min(start);
        last = last.max(end);
    }
    Some(last - first)
}
