//! Request and reply bodies for the backend endpoints.

use serde::{Deserialize, Serialize};

use crate::model::TaskId;

/// `POST /tasks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    /// Task label shown in the schedule.
    pub name: String,
    /// Must be greater than zero.
    pub duration_hours: f64,
    /// Name of an existing machine.
    pub machine_name: String,
    /// Job the task belongs to.
    pub job_id: i64,
}

/// `PATCH /tasks/{id}`. Omitted fields are left untouched by the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskEdit {
    /// New task name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New duration, greater than zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_hours: Option<f64>,
    /// Move the task to another machine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_name: Option<String>,
}

impl TaskEdit {
    /// No field set; such an edit is never sent.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.duration_hours.is_none() && self.machine_name.is_none()
    }
}

/// `PATCH /tasks/{id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// Free text; the backend owns the allowed values.
    pub status: String,
}

/// `POST /machines`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMachine {
    /// Unique machine name.
    pub name: String,
    /// Tasks the machine can run at once, at least 1.
    pub capacity: i64,
}

/// `POST /api/production_log`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionLog {
    /// Task the output belongs to.
    pub task_id: TaskId,
    /// Free-text description of material consumed.
    pub resource_used: String,
    /// Units produced, zero or more.
    pub product_count: i64,
}

/// `POST /api/optimize`. An absent start lets the server pick "now".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptimizeRequest {
    /// See [`format_optimizer_start`](crate::format_optimizer_start).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
}

/// Body shared by every mutating endpoint.
///
/// Most endpoints put their text in `message`; some failures use `error`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerReply {
    /// Outcome text on success and on most failures.
    #[serde(default)]
    pub message: Option<String>,
    /// Failure text on the production log endpoint.
    #[serde(default)]
    pub error: Option<String>,
    /// Optimizer only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub makespan_minutes: Option<f64>,
    /// Optimizer only: `OPTIMAL` or `INFEASIBLE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Which reply field carries the human-readable text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyField {
    /// [`ServerReply::message`].
    Message,
    /// [`ServerReply::error`].
    Error,
}

impl ServerReply {
    /// Non-blank text from `field`.
    pub fn text(&self, field: ReplyField) -> Option<&str> {
        let v = match field {
            ReplyField::Message => self.message.as_deref(),
            ReplyField::Error => self.error.as_deref(),
        };
        v.filter(|s| !s.trim().is_empty())
    }
}
