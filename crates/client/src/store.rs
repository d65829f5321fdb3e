use std::sync::Arc;

use scheduler_core::{DropdownTask, Machine, Task};
use tokio::sync::watch;

/// Last successful server read of every collection the client mirrors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleState {
    pub tasks: Vec<Task>,
    pub machines: Vec<Machine>,
    pub dropdown_tasks: Vec<DropdownTask>,
    /// Set by a failed schedule fetch, cleared by the next successful one.
    pub error: Option<String>,
    /// Bumped once per notification.
    pub revision: u64,
}

/// Observable replica store shared between the client and its views.
///
/// Only [`ScheduleClient`](crate::ScheduleClient) writes to it. Readers either
/// take a [`snapshot`](Self::snapshot) or [`subscribe`](Self::subscribe) and
/// wait for `changed()`.
#[derive(Clone, Debug)]
pub struct ScheduleStore {
    tx: Arc<watch::Sender<ScheduleState>>,
}

impl Default for ScheduleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ScheduleState::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<ScheduleState> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> ScheduleState {
        self.tx.borrow().clone()
    }

    pub fn revision(&self) -> u64 {
        self.tx.borrow().revision
    }

    /// Applies `f` and notifies subscribers exactly once.
    pub(crate) fn update(&self, f: impl FnOnce(&mut ScheduleState)) {
        self.tx.send_modify(|state| {
            f(state);
            state.revision += 1;
        });
    }
}
