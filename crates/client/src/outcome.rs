use scheduler_core::ServerReply;
use serde::Serialize;

use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Success,
    /// The call went through, but the server asks for the optimizer to be re-run.
    RerunOptimizer,
    /// The server answered with a non-2xx status.
    Rejected,
    ConnectionFailed,
    /// Rejected locally; nothing was sent.
    Invalid,
}

/// Solver figures attached to a successful optimization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizerReport {
    /// Solver verdict, `OPTIMAL` when a schedule was saved.
    pub solver_status: Option<String>,
    pub makespan_minutes: Option<f64>,
}

impl OptimizerReport {
    pub(crate) fn from_reply(reply: &ServerReply) -> Option<Self> {
        if reply.status.is_none() && reply.makespan_minutes.is_none() {
            return None;
        }
        Some(Self {
            solver_status: reply.status.clone(),
            makespan_minutes: reply.makespan_minutes,
        })
    }
}

/// Result of one client operation, ready to show to a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub status: OutcomeStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimizer: Option<OptimizerReport>,
}

impl Outcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Success,
            message: message.into(),
            optimizer: None,
        }
    }

    /// Classifies a successful reply. Only operations that change scheduling
    /// inputs opt into the re-run convention.
    pub(crate) fn accepted(message: String, detect_rerun: bool) -> Self {
        let status = if detect_rerun && asks_for_rerun(&message) {
            OutcomeStatus::RerunOptimizer
        } else {
            OutcomeStatus::Success
        };
        Self {
            status,
            message,
            optimizer: None,
        }
    }

    /// Folds an error into an outcome; `fallback` replaces missing server text.
    pub(crate) fn from_error(err: ClientError, fallback: &str) -> Self {
        let (status, message) = match err {
            ClientError::Invalid(e) => (OutcomeStatus::Invalid, e.to_string()),
            e @ ClientError::Connection(_) => (OutcomeStatus::ConnectionFailed, e.to_string()),
            ClientError::Rejected { message, .. } => (OutcomeStatus::Rejected, message),
            ClientError::RejectedSilently { .. } | ClientError::Decode(_) => {
                (OutcomeStatus::Rejected, fallback.to_string())
            }
        };
        Self {
            status,
            message,
            optimizer: None,
        }
    }

    /// The request was carried out by the server.
    pub fn succeeded(&self) -> bool {
        matches!(
            self.status,
            OutcomeStatus::Success | OutcomeStatus::RerunOptimizer
        )
    }

    pub fn needs_optimizer(&self) -> bool {
        self.status == OutcomeStatus::RerunOptimizer
    }
}

fn asks_for_rerun(message: &str) -> bool {
    message.to_ascii_lowercase().contains("run optimizer")
}
