use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Method;
use scheduler_core::{
    format_optimizer_start, validate_new_machine, validate_new_task, validate_precedence,
    validate_production_log, validate_status, validate_task_edit, DropdownTask, Machine,
    MachineId, NewMachine, NewTask, OptimizeRequest, Precedence, ProductionLog, ReplyField,
    ServerReply, StatusUpdate, Task, TaskEdit, TaskId, ValidationError,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::outcome::{OptimizerReport, Outcome};
use crate::store::ScheduleStore;
use crate::transport::{ApiRequest, HttpTransport, Transport};

const SCHEDULE_PATH: &str = "/api/schedule";
const DROPDOWN_TASKS_PATH: &str = "/api/tasks";
const MACHINES_PATH: &str = "/machines";
const TASKS_PATH: &str = "/tasks";
const PRECEDENCES_PATH: &str = "/precedences";
const OPTIMIZE_PATH: &str = "/api/optimize";
const PRODUCTION_LOG_PATH: &str = "/api/production_log";

/// Collection re-read after a successful mutation.
#[derive(Debug, Clone, Copy)]
enum Refresh {
    Nothing,
    Schedule,
    Machines,
}

/// Per-operation reply handling.
struct Op {
    name: &'static str,
    /// Shown when a 2xx reply carries no message.
    done: &'static str,
    /// Shown when a failure reply carries no usable text.
    fallback: &'static str,
    failure_field: ReplyField,
    detect_rerun: bool,
    refresh: Refresh,
}

const ADD_TASK: Op = Op {
    name: "add_task",
    done: "Task added.",
    fallback: "Failed to add task.",
    failure_field: ReplyField::Message,
    detect_rerun: false,
    refresh: Refresh::Schedule,
};

const ADD_PRECEDENCE: Op = Op {
    name: "add_precedence",
    done: "Precedence rule added.",
    fallback: "Failed to add precedence rule.",
    failure_field: ReplyField::Message,
    detect_rerun: false,
    refresh: Refresh::Nothing,
};

const UPDATE_STATUS: Op = Op {
    name: "update_task_status",
    done: "Task status updated.",
    fallback: "Failed to update task status.",
    failure_field: ReplyField::Message,
    detect_rerun: true,
    refresh: Refresh::Schedule,
};

const EDIT_TASK: Op = Op {
    name: "edit_task",
    done: "Task updated.",
    fallback: "Failed to update task.",
    failure_field: ReplyField::Message,
    detect_rerun: true,
    refresh: Refresh::Schedule,
};

const DELETE_TASK: Op = Op {
    name: "delete_task",
    done: "Task deleted.",
    fallback: "Failed to delete task.",
    failure_field: ReplyField::Message,
    detect_rerun: false,
    refresh: Refresh::Schedule,
};

const ADD_MACHINE: Op = Op {
    name: "add_machine",
    done: "Machine added.",
    fallback: "Failed to add machine.",
    failure_field: ReplyField::Message,
    detect_rerun: false,
    refresh: Refresh::Machines,
};

const DELETE_MACHINE: Op = Op {
    name: "delete_machine",
    done: "Machine deleted.",
    fallback: "Failed to delete machine.",
    failure_field: ReplyField::Message,
    detect_rerun: false,
    refresh: Refresh::Machines,
};

const LOG_PRODUCTION: Op = Op {
    name: "log_production",
    done: "Production log saved.",
    fallback: "Failed to save production log.",
    failure_field: ReplyField::Error,
    detect_rerun: false,
    refresh: Refresh::Schedule,
};

const OPTIMIZE: Op = Op {
    name: "run_optimization",
    done: "Optimization finished.",
    fallback: "Optimization failed.",
    failure_field: ReplyField::Message,
    detect_rerun: false,
    refresh: Refresh::Schedule,
};

/// Single point of contact with the scheduling backend.
///
/// Operations never return errors: each one resolves to an [`Outcome`] and
/// leaves the [`ScheduleStore`] holding the last successful server read.
#[derive(Clone)]
pub struct ScheduleClient {
    transport: Arc<dyn Transport>,
    store: ScheduleStore,
}

impl ScheduleClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_store(transport, ScheduleStore::new())
    }

    pub fn with_store(transport: Arc<dyn Transport>, store: ScheduleStore) -> Self {
        Self { transport, store }
    }

    pub fn over_http(config: ClientConfig) -> Self {
        Self::new(Arc::new(HttpTransport::new(config)))
    }

    pub fn store(&self) -> &ScheduleStore {
        &self.store
    }

    /// Replaces the task replica. A failure keeps the old list and records the
    /// message in [`ScheduleState::error`](crate::ScheduleState::error).
    pub async fn fetch_schedule(&self) -> Outcome {
        match self.fetch_list::<Task>(SCHEDULE_PATH).await {
            Ok(tasks) => {
                let count = tasks.len();
                self.store.update(|s| {
                    s.tasks = tasks;
                    s.error = None;
                });
                info!(count, "schedule refreshed");
                Outcome::success(format!("Loaded {count} tasks."))
            }
            Err(e) => {
                warn!(error = %e, "schedule refresh failed");
                let outcome = Outcome::from_error(e, "Failed to load schedule.");
                let message = outcome.message.clone();
                self.store.update(|s| s.error = Some(message));
                outcome
            }
        }
    }

    /// Best-effort machine refresh; failures are only logged.
    pub async fn fetch_machines(&self) {
        match self.fetch_list::<Machine>(MACHINES_PATH).await {
            Ok(machines) => {
                let count = machines.len();
                self.store.update(|s| s.machines = machines);
                info!(count, "machines refreshed");
            }
            Err(e) => {
                warn!(error = %e, "machine refresh failed");
                self.store.update(|_| {});
            }
        }
    }

    pub async fn fetch_dropdown_tasks(&self) -> Outcome {
        match self.fetch_list::<DropdownTask>(DROPDOWN_TASKS_PATH).await {
            Ok(tasks) => {
                let count = tasks.len();
                self.store.update(|s| s.dropdown_tasks = tasks);
                Outcome::success(format!("Loaded {count} tasks."))
            }
            Err(e) => {
                warn!(error = %e, "task list refresh failed");
                self.store.update(|_| {});
                Outcome::from_error(e, "Failed to load tasks.")
            }
        }
    }

    pub async fn add_task(&self, task: NewTask) -> Outcome {
        let request = prepare(validate_new_task(&task), Method::POST, TASKS_PATH.into(), &task);
        self.execute(&ADD_TASK, request).await
    }

    pub async fn add_precedence(&self, rule: Precedence) -> Outcome {
        let request = prepare(
            validate_precedence(&rule),
            Method::POST,
            PRECEDENCES_PATH.into(),
            &rule,
        );
        self.execute(&ADD_PRECEDENCE, request).await
    }

    pub async fn update_task_status(&self, task_id: TaskId, status: &str) -> Outcome {
        let body = StatusUpdate {
            status: status.to_string(),
        };
        let request = prepare(
            validate_status(status),
            Method::PATCH,
            format!("{TASKS_PATH}/{task_id}/status"),
            &body,
        );
        self.execute(&UPDATE_STATUS, request).await
    }

    /// Partial update. The server resets the task to Pending and clears its
    /// window, whatever its previous status.
    pub async fn edit_task(&self, task_id: TaskId, edit: TaskEdit) -> Outcome {
        let request = prepare(
            validate_task_edit(&edit),
            Method::PATCH,
            format!("{TASKS_PATH}/{task_id}"),
            &edit,
        );
        self.execute(&EDIT_TASK, request).await
    }

    pub async fn delete_task(&self, task_id: TaskId) -> Outcome {
        let request = ApiRequest::delete(format!("{TASKS_PATH}/{task_id}"));
        self.execute(&DELETE_TASK, Ok(request)).await
    }

    pub async fn add_machine(&self, machine: NewMachine) -> Outcome {
        let request = prepare(
            validate_new_machine(&machine),
            Method::POST,
            MACHINES_PATH.into(),
            &machine,
        );
        self.execute(&ADD_MACHINE, request).await
    }

    /// The server refuses to delete machines still required by tasks; its
    /// reason is returned verbatim.
    pub async fn delete_machine(&self, machine_id: MachineId) -> Outcome {
        let request = ApiRequest::delete(format!("{MACHINES_PATH}/{machine_id}"));
        self.execute(&DELETE_MACHINE, Ok(request)).await
    }

    pub async fn log_production(&self, log: ProductionLog) -> Outcome {
        let request = prepare(
            validate_production_log(&log),
            Method::POST,
            PRODUCTION_LOG_PATH.into(),
            &log,
        );
        self.execute(&LOG_PRODUCTION, request).await
    }

    /// Asks the backend to re-plan every unscheduled task, starting at
    /// `start` or, when `None`, at the server's current time.
    pub async fn run_optimization(&self, start: Option<DateTime<Utc>>) -> Outcome {
        let body = OptimizeRequest {
            start_time: start.map(format_optimizer_start),
        };
        let request = prepare(Ok(()), Method::POST, OPTIMIZE_PATH.into(), &body);
        self.execute(&OPTIMIZE, request).await
    }

    async fn fetch_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ClientError> {
        debug!(path, "fetching collection");
        let resp = self.transport.send(ApiRequest::get(path)).await?;
        if !resp.status.is_success() {
            let reply: ServerReply = serde_json::from_value(resp.body).unwrap_or_default();
            return Err(rejection(resp.status, &reply, ReplyField::Message));
        }
        Ok(serde_json::from_value(resp.body)?)
    }

    async fn submit(
        &self,
        request: ApiRequest,
        failure_field: ReplyField,
    ) -> Result<ServerReply, ClientError> {
        debug!(method = %request.method, path = %request.path, "sending request");
        let resp = self.transport.send(request).await?;
        let reply: ServerReply = serde_json::from_value(resp.body).unwrap_or_default();
        if resp.status.is_success() {
            Ok(reply)
        } else {
            Err(rejection(resp.status, &reply, failure_field))
        }
    }

    /// Sends a mutation and, on success only, re-reads the affected collection.
    async fn execute(&self, op: &Op, request: Result<ApiRequest, ClientError>) -> Outcome {
        let result = match request {
            Ok(request) => self.submit(request, op.failure_field).await,
            Err(e) => Err(e),
        };

        let reply = match result {
            Ok(reply) => reply,
            Err(ClientError::Invalid(e)) => {
                debug!(op = op.name, reason = %e, "rejected before sending");
                return Outcome::from_error(ClientError::Invalid(e), op.fallback);
            }
            Err(e) => {
                warn!(op = op.name, error = %e, "request failed");
                return Outcome::from_error(e, op.fallback);
            }
        };

        let message = reply
            .text(ReplyField::Message)
            .map_or_else(|| op.done.to_string(), str::to_string);
        let optimizer = OptimizerReport::from_reply(&reply);
        if let Some(minutes) = reply.makespan_minutes {
            info!(op = op.name, makespan_minutes = minutes, "optimizer produced a schedule");
        }
        info!(op = op.name, %message, "request accepted");

        match op.refresh {
            Refresh::Nothing => {}
            Refresh::Schedule => {
                self.fetch_schedule().await;
            }
            Refresh::Machines => self.fetch_machines().await,
        }

        Outcome {
            optimizer,
            ..Outcome::accepted(message, op.detect_rerun)
        }
    }
}

fn prepare<B: Serialize>(
    check: Result<(), ValidationError>,
    method: Method,
    path: String,
    body: &B,
) -> Result<ApiRequest, ClientError> {
    check?;
    Ok(ApiRequest {
        method,
        path,
        body: Some(serde_json::to_value(body)?),
    })
}

fn rejection(status: reqwest::StatusCode, reply: &ServerReply, field: ReplyField) -> ClientError {
    match reply.text(field) {
        Some(message) => ClientError::Rejected {
            status,
            message: message.to_string(),
        },
        None => ClientError::RejectedSilently { status },
    }
}
