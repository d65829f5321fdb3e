//! In-memory stand-ins for the scheduling backend.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use scheduler_client::{ApiRequest, ApiResponse, Transport, TransportError};
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct FakeTask {
    pub id: i64,
    pub job_id: i64,
    pub name: String,
    pub hours: f64,
    pub machine_id: i64,
    pub status: String,
    /// HTTP-date strings, the way the backend serializes timestamps.
    pub window: Option<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct FakeMachine {
    pub id: i64,
    pub name: String,
    pub capacity: i64,
}

#[derive(Default)]
struct State {
    tasks: Vec<FakeTask>,
    machines: Vec<FakeMachine>,
    precedences: Vec<(i64, i64)>,
    logs: Vec<Value>,
    next_task: i64,
    next_machine: i64,
}

/// Answers like the real backend and records every request it receives.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
    requests: Mutex<Vec<ApiRequest>>,
    canned: Mutex<HashMap<(Method, String), ApiResponse>>,
    offline: Mutex<bool>,
}

impl FakeBackend {
    pub fn new() -> Self {
        let backend = Self::default();
        {
            let mut st = backend.state.lock().unwrap();
            st.next_task = 1;
            st.next_machine = 1;
        }
        backend
    }

    pub fn with_machine(self, name: &str, capacity: i64) -> Self {
        {
            let mut st = self.state.lock().unwrap();
            let id = st.next_machine;
            st.next_machine += 1;
            st.machines.push(FakeMachine {
                id,
                name: name.into(),
                capacity,
            });
        }
        self
    }

    pub fn with_task(self, name: &str, hours: f64, machine: &str, status: &str) -> Self {
        {
            let mut st = self.state.lock().unwrap();
            let machine_id = st
                .machines
                .iter()
                .find(|m| m.name == machine)
                .map(|m| m.id)
                .expect("machine must exist");
            let id = st.next_task;
            st.next_task += 1;
            st.tasks.push(FakeTask {
                id,
                job_id: id,
                name: name.into(),
                hours,
                machine_id,
                status: status.into(),
                window: None,
            });
        }
        self
    }

    /// Every later `method path` call gets `response` instead of the normal handling.
    pub fn respond(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        self.canned
            .lock()
            .unwrap()
            .insert((method, path.to_string()), ApiResponse::new(status, body));
    }

    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap() = offline;
    }

    pub fn requests(&self) -> Vec<(Method, String)> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| (r.method.clone(), r.path.clone()))
            .collect()
    }

    pub fn last_body(&self) -> Option<Value> {
        self.requests.lock().unwrap().last().and_then(|r| r.body.clone())
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    pub fn precedences(&self) -> Vec<(i64, i64)> {
        self.state.lock().unwrap().precedences.clone()
    }

    pub fn production_logs(&self) -> Vec<Value> {
        self.state.lock().unwrap().logs.clone()
    }

    /// What `GET /api/schedule` would return right now.
    pub fn schedule_json(&self) -> Value {
        let st = self.state.lock().unwrap();
        schedule_body(&st)
    }

    pub fn machines_json(&self) -> Value {
        let st = self.state.lock().unwrap();
        machines_body(&st)
    }

    fn handle(&self, req: &ApiRequest) -> ApiResponse {
        let mut st = self.state.lock().unwrap();
        let segments: Vec<&str> = req.path.trim_matches('/').split('/').collect();
        let body = req.body.clone().unwrap_or(Value::Null);

        match (req.method.as_str(), segments.as_slice()) {
            ("GET", ["api", "schedule"]) => ok(schedule_body(&st)),
            ("GET", ["machines"]) => ok(machines_body(&st)),
            ("GET", ["api", "tasks"]) => ok(Value::Array(
                st.tasks
                    .iter()
                    .map(|t| json!({"task_id": t.id, "name": t.name}))
                    .collect(),
            )),
            ("POST", ["tasks"]) => {
                let machine_name = body["machine_name"].as_str().unwrap_or_default().to_string();
                let Some(machine_id) = st
                    .machines
                    .iter()
                    .find(|m| m.name == machine_name)
                    .map(|m| m.id)
                else {
                    return reply(
                        StatusCode::NOT_FOUND,
                        json!({"message": format!("Machine not found: {machine_name}")}),
                    );
                };
                let id = st.next_task;
                st.next_task += 1;
                let name = body["name"].as_str().unwrap_or_default().to_string();
                st.tasks.push(FakeTask {
                    id,
                    job_id: id,
                    name: name.clone(),
                    hours: body["duration_hours"].as_f64().unwrap_or_default(),
                    machine_id,
                    status: "Pending".into(),
                    window: None,
                });
                reply(
                    StatusCode::CREATED,
                    json!({"message": format!("Task '{name}' added with ID {id}. Run optimizer for true schedule.")}),
                )
            }
            ("PATCH", ["tasks", id, "status"]) => {
                let id: i64 = id.parse().unwrap();
                let status = body["status"].as_str().unwrap_or_default().to_string();
                match st.tasks.iter_mut().find(|t| t.id == id) {
                    Some(task) => {
                        task.status = status.clone();
                        ok(json!({"message": format!("Task {id} status updated to '{status}'. RUN OPTIMIZER NOW.")}))
                    }
                    None => reply(
                        StatusCode::NOT_FOUND,
                        json!({"message": format!("Task with ID {id} not found.")}),
                    ),
                }
            }
            ("PATCH", ["tasks", id]) => {
                let id: i64 = id.parse().unwrap();
                let machine_id = match body["machine_name"].as_str() {
                    Some(name) => match st.machines.iter().find(|m| m.name == name) {
                        Some(m) => Some(m.id),
                        None => {
                            return reply(
                                StatusCode::NOT_FOUND,
                                json!({"message": format!("Machine not found: {name}")}),
                            )
                        }
                    },
                    None => None,
                };
                match st.tasks.iter_mut().find(|t| t.id == id) {
                    Some(task) => {
                        if let Some(name) = body["name"].as_str() {
                            task.name = name.into();
                        }
                        if let Some(hours) = body["duration_hours"].as_f64() {
                            task.hours = hours;
                        }
                        if let Some(machine_id) = machine_id {
                            task.machine_id = machine_id;
                        }
                        task.status = "Pending".into();
                        task.window = None;
                        ok(json!({"message": format!("Task {id} updated successfully. Status reset to PENDING. RUN OPTIMIZER NOW.")}))
                    }
                    None => reply(
                        StatusCode::NOT_FOUND,
                        json!({"message": format!("Task with ID {id} not found.")}),
                    ),
                }
            }
            ("DELETE", ["tasks", id]) => {
                let id: i64 = id.parse().unwrap();
                let before = st.tasks.len();
                st.tasks.retain(|t| t.id != id);
                st.precedences.retain(|(a, b)| *a != id && *b != id);
                if st.tasks.len() == before {
                    return reply(
                        StatusCode::NOT_FOUND,
                        json!({"message": format!("Task with ID {id} not found.")}),
                    );
                }
                ok(json!({"message": format!("Task {id} successfully deleted. Run optimizer to re-schedule remaining tasks.")}))
            }
            ("POST", ["precedences"]) => {
                let a = body["predecessor_id"].as_i64().unwrap_or_default();
                let b = body["successor_id"].as_i64().unwrap_or_default();
                st.precedences.push((a, b));
                reply(
                    StatusCode::CREATED,
                    json!({"message": format!("Precedence rule added: Task {b} follows Task {a}.")}),
                )
            }
            ("POST", ["machines"]) => {
                let id = st.next_machine;
                st.next_machine += 1;
                let name = body["name"].as_str().unwrap_or_default().to_string();
                st.machines.push(FakeMachine {
                    id,
                    name: name.clone(),
                    capacity: body["capacity"].as_i64().unwrap_or(1),
                });
                reply(
                    StatusCode::CREATED,
                    json!({"message": format!("Machine '{name}' added with ID {id}.")}),
                )
            }
            ("DELETE", ["machines", id]) => {
                let id: i64 = id.parse().unwrap();
                let in_use = st.tasks.iter().filter(|t| t.machine_id == id).count();
                if in_use > 0 {
                    return reply(
                        StatusCode::CONFLICT,
                        json!({"message": format!("Cannot delete machine ID {id}. It is currently required by {in_use} task(s).")}),
                    );
                }
                st.machines.retain(|m| m.id != id);
                ok(json!({"message": format!("Machine ID {id} successfully deleted.")}))
            }
            ("POST", ["api", "production_log"]) => {
                let task_id = body["task_id"].as_i64().unwrap_or_default();
                st.logs.push(body.clone());
                reply(
                    StatusCode::CREATED,
                    json!({"message": format!("Production log saved successfully for Task ID {task_id}.")}),
                )
            }
            ("POST", ["api", "optimize"]) => {
                // Back-to-back placement, one hour per slot.
                let mut slot = 8;
                let mut scheduled = 0;
                for task in st
                    .tasks
                    .iter_mut()
                    .filter(|t| t.status != "Completed" && t.status != "Scheduled")
                {
                    task.window = Some((
                        format!("Sun, 07 Dec 2025 {slot:02}:00:00 GMT"),
                        format!("Sun, 07 Dec 2025 {:02}:00:00 GMT", slot + 1),
                    ));
                    task.status = "Scheduled".into();
                    slot += 1;
                    scheduled += 1;
                }
                if scheduled == 0 {
                    return ok(json!({"message": "Optimization successful. No pending tasks found to schedule."}));
                }
                ok(json!({
                    "message": "Optimization successful. New schedule generated and saved.",
                    "makespan_minutes": (scheduled * 60) as f64,
                    "status": "OPTIMAL"
                }))
            }
            _ => reply(StatusCode::NOT_FOUND, Value::Null),
        }
    }
}

fn schedule_body(st: &State) -> Value {
    Value::Array(
        st.tasks
            .iter()
            .map(|t| {
                let machine = st
                    .machines
                    .iter()
                    .find(|m| m.id == t.machine_id)
                    .map(|m| m.name.clone())
                    .unwrap_or_default();
                let (start, end) = match &t.window {
                    Some((s, e)) => (json!(s), json!(e)),
                    None => (Value::Null, Value::Null),
                };
                json!({
                    "task_id": t.id,
                    "job_id": t.job_id,
                    "task_name": t.name,
                    "duration_hours": format!("{:.2}", t.hours),
                    "machine_name": machine,
                    "status": t.status,
                    "start_time": start,
                    "end_time": end,
                })
            })
            .collect(),
    )
}

fn machines_body(st: &State) -> Value {
    Value::Array(
        st.machines
            .iter()
            .map(|m| json!({"machine_id": m.id, "name": m.name, "capacity": m.capacity}))
            .collect(),
    )
}

fn ok(body: Value) -> ApiResponse {
    reply(StatusCode::OK, body)
}

fn reply(status: StatusCode, body: Value) -> ApiResponse {
    ApiResponse::new(status, body)
}

#[async_trait]
impl Transport for FakeBackend {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        if *self.offline.lock().unwrap() {
            return Err(TransportError("connection refused".into()));
        }
        let canned = self
            .canned
            .lock()
            .unwrap()
            .get(&(request.method.clone(), request.path.clone()))
            .cloned();
        Ok(canned.unwrap_or_else(|| self.handle(&request)))
    }
}

/// Replays queued `(delay, response)` pairs in request order.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<(Duration, ApiResponse)>>,
}

impl ScriptedTransport {
    pub fn new(script: impl IntoIterator<Item = (Duration, ApiResponse)>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, _request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let next = self.script.lock().unwrap().pop_front();
        let (delay, response) = next.ok_or_else(|| TransportError("script exhausted".into()))?;
        tokio::time::sleep(delay).await;
        Ok(response)
    }
}
