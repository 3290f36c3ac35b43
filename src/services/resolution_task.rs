// src/services/resolution_task.rs
//
// Background Resolution Task
//
// One bulk resolution over a snapshot of the displayed rows.
//
// CRITICAL RULES:
// - The resolution loop runs on a blocking worker, never on the UI context
// - Listener slot, progress and result share one lock, so listeners observe
//   events in production order
// - At most one listener is attached; attaching replaces silently
// - Detach only clears a matching listener
// - Completion is delivered at most once per listener
// - A task cannot be canceled; it runs to completion once started

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use uuid::Uuid;

use crate::domain::resolution::{
    ResolutionDirection, ResolutionSummary, ResolveRowEntry, RowResolution, SkipReason,
};
use crate::events::{
    CheckpointResolutionCompleted, CheckpointResolutionStarted, EventBus, RowCheckpointResolved,
    RowCheckpointSkipped,
};
use crate::repositories::CheckpointRepository;
use crate::services::listener::{ListenerId, ResolutionEvent, ResolutionListener};

pub struct ResolutionTask {
    id: Uuid,
    table_id: String,
    direction: ResolutionDirection,
    rows: Vec<ResolveRowEntry>,
    state: Mutex<TaskState>,
}

struct TaskState {
    progress: Option<String>,
    tally: ResolutionSummary,
    result: Option<ResolutionSummary>,
    listener: Option<ResolutionListener>,
    completion_delivered: HashSet<ListenerId>,
}

impl TaskState {
    /// Send to the attached listener; a listener whose inbox is gone is dropped.
    fn deliver(&mut self, event: ResolutionEvent) -> bool {
        let Some(listener) = &self.listener else {
            return false;
        };

        match listener.send(event) {
            Ok(()) => true,
            Err(_) => {
                log::debug!("Listener {} went away; detaching", listener.id());
                self.listener = None;
                false
            }
        }
    }

    fn deliver_completion(&mut self) {
        let (Some(summary), Some(listener_id)) =
            (self.result.clone(), self.listener.as_ref().map(|l| l.id()))
        else {
            return;
        };

        if self.completion_delivered.contains(&listener_id) {
            return;
        }

        if self.deliver(ResolutionEvent::Complete(summary)) {
            self.completion_delivered.insert(listener_id);
        }
    }
}

impl ResolutionTask {
    pub(crate) fn new(
        table_id: impl Into<String>,
        direction: ResolutionDirection,
        rows: Vec<ResolveRowEntry>,
    ) -> Self {
        let id = Uuid::new_v4();
        let table_id = table_id.into();
        Self {
            id,
            direction,
            rows,
            state: Mutex::new(TaskState {
                progress: None,
                tally: ResolutionSummary::new(id, table_id.clone(), direction),
                result: None,
                listener: None,
                completion_delivered: HashSet::new(),
            }),
            table_id,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    pub fn direction(&self) -> ResolutionDirection {
        self.direction
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn lock(&self) -> MutexGuard<'_, TaskState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Latest progress message, if any unit of work finished
    pub fn progress(&self) -> Option<String> {
        self.lock().progress.clone()
    }

    /// Final summary; `None` while running
    pub fn result(&self) -> Option<ResolutionSummary> {
        self.lock().result.clone()
    }

    pub fn is_complete(&self) -> bool {
        self.lock().result.is_some()
    }

    pub fn attached_listener(&self) -> Option<ListenerId> {
        self.lock().listener.as_ref().map(|l| l.id())
    }

    /// Replace the attached listener and hand it the current state.
    ///
    /// Missed progress is not replayed. A completed task delivers `Complete`
    /// (once per listener); a running task delivers its latest progress.
    pub fn attach_listener(&self, listener: ResolutionListener) {
        let mut state = self.lock();

        if let Some(previous) = state.listener.replace(listener) {
            log::debug!("Task {} replaced listener {}", self.id, previous.id());
        }

        if state.result.is_some() {
            state.deliver_completion();
        } else if let Some(message) = state.progress.clone() {
            state.deliver(ResolutionEvent::Progress {
                task_id: self.id,
                message,
            });
        }
    }

    /// Clear the listener only if it is `listener_id`. Returns whether it was.
    pub fn detach_listener(&self, listener_id: ListenerId) -> bool {
        let mut state = self.lock();
        match &state.listener {
            Some(current) if current.id() == listener_id => {
                state.listener = None;
                true
            }
            _ => false,
        }
    }

    fn record_row(&self, outcome: &RowResolution, message: String) {
        let mut state = self.lock();
        state.tally.record(outcome);
        state.progress = Some(message.clone());
        state.deliver(ResolutionEvent::Progress {
            task_id: self.id,
            message,
        });
    }

    /// Store the final summary and notify the attached listener, if any.
    /// Without a listener the result waits for the next attach.
    pub(crate) fn complete(&self, summary: ResolutionSummary) {
        let mut state = self.lock();
        state.result = Some(summary);
        state.deliver_completion();
    }

    /// Summary after the loop died part-way: unprocessed rows count as skipped.
    pub(crate) fn abandoned_summary(&self) -> ResolutionSummary {
        let state = self.lock();
        let mut summary = state.tally.clone();
        let remaining = self.rows.len().saturating_sub(summary.total);
        summary.total += remaining;
        summary.skipped += remaining;
        summary
    }

    /// The resolution loop. Blocking; call from a worker thread.
    pub(crate) fn run(
        &self,
        repository: &dyn CheckpointRepository,
        event_bus: &EventBus,
    ) -> ResolutionSummary {
        let started = Instant::now();
        let total = self.rows.len();

        event_bus.emit(CheckpointResolutionStarted::new(
            self.id,
            self.table_id.clone(),
            self.direction,
            total,
        ));

        for (index, entry) in self.rows.iter().enumerate() {
            let outcome = match repository.resolve_row(&self.table_id, &entry.row_id, self.direction) {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::warn!("Failed to resolve row '{}': {}", entry.row_id, e);
                    RowResolution::Skipped(SkipReason::Failed(e.to_string()))
                }
            };

            match &outcome {
                RowResolution::Resolved => event_bus.emit(RowCheckpointResolved::new(
                    self.id,
                    self.table_id.clone(),
                    entry.row_id.clone(),
                    self.direction,
                )),
                RowResolution::Skipped(reason) => event_bus.emit(RowCheckpointSkipped::new(
                    self.id,
                    self.table_id.clone(),
                    entry.row_id.clone(),
                    reason.to_string(),
                )),
            }

            self.record_row(&outcome, format!("Resolving row {} of {}", index + 1, total));
        }

        let summary = self.lock().tally.clone();

        event_bus.emit(CheckpointResolutionCompleted::new(
            self.id,
            self.table_id.clone(),
            summary.resolved,
            summary.skipped,
            started.elapsed().as_millis() as u64,
        ));

        summary
    }
}
