// src/services/task_registry.rs
//
// Resolution Registry
//
// Owns the single active resolution task. Shared by reference with every
// controller; the task outlives any controller that started it.
//
// CRITICAL RULES:
// - At most one active task; a second start is rejected, never queued
// - A completed task stays active until a listener acknowledges its result
// - Create and clear happen under one lock

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::domain::resolution::{ResolutionDirection, ResolveRowEntry};
use crate::error::{AppError, AppResult};
use crate::events::{CheckpointResolutionCompleted, EventBus};
use crate::repositories::CheckpointRepository;
use crate::services::listener::{ListenerId, ResolutionListener};
use crate::services::resolution_task::ResolutionTask;

pub struct ResolutionRegistry {
    active: Mutex<Option<Arc<ResolutionTask>>>,
    repository: Arc<dyn CheckpointRepository>,
    event_bus: Arc<EventBus>,
}

impl ResolutionRegistry {
    pub fn new(repository: Arc<dyn CheckpointRepository>, event_bus: Arc<EventBus>) -> Self {
        Self {
            active: Mutex::new(None),
            repository,
            event_bus,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<ResolutionTask>>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a bulk resolution over `rows` with `listener` attached.
    ///
    /// Must be called from within a tokio runtime. Returns
    /// `AppError::ResolverAlreadyActive` without touching the active task if
    /// one exists.
    pub fn start(
        &self,
        table_id: &str,
        direction: ResolutionDirection,
        rows: Vec<ResolveRowEntry>,
        listener: ResolutionListener,
    ) -> AppResult<Arc<ResolutionTask>> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| AppError::Task(format!("No async runtime for resolution: {}", e)))?;

        let mut active = self.lock();
        if let Some(existing) = active.as_ref() {
            log::info!(
                "Rejected {} on '{}': task {} is still active",
                direction,
                table_id,
                existing.id()
            );
            return Err(AppError::ResolverAlreadyActive);
        }

        let task = Arc::new(ResolutionTask::new(table_id, direction, rows));
        task.attach_listener(listener);
        *active = Some(Arc::clone(&task));

        let worker = Arc::clone(&task);
        let repository = Arc::clone(&self.repository);
        let event_bus = Arc::clone(&self.event_bus);

        runtime.spawn_blocking(move || {
            let run = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                worker.run(repository.as_ref(), &event_bus)
            }));

            let summary = match run {
                Ok(summary) => summary,
                Err(panic) => {
                    log::error!("Resolution task {} panicked: {:?}", worker.id(), panic);
                    let summary = worker.abandoned_summary();
                    event_bus.emit(CheckpointResolutionCompleted::new(
                        worker.id(),
                        worker.table_id().to_string(),
                        summary.resolved,
                        summary.skipped,
                        0,
                    ));
                    summary
                }
            };

            worker.complete(summary);
        });

        log::info!(
            "Started resolution {} on '{}' ({}, {} rows)",
            task.id(),
            table_id,
            direction,
            task.row_count()
        );

        Ok(task)
    }

    /// The active task, running or awaiting acknowledgement
    pub fn active(&self) -> Option<Arc<ResolutionTask>> {
        self.lock().clone()
    }

    pub fn is_active(&self) -> bool {
        self.lock().is_some()
    }

    /// Attach to the active task, if there is one.
    pub fn attach_listener(&self, listener: ResolutionListener) -> Option<Arc<ResolutionTask>> {
        let task = self.active()?;
        task.attach_listener(listener);
        Some(task)
    }

    /// Detach `listener_id` from the active task if it is the attached one.
    pub fn detach_listener(&self, listener_id: ListenerId) -> bool {
        self.active()
            .map(|task| task.detach_listener(listener_id))
            .unwrap_or(false)
    }

    /// Clear the active task once its completion has been consumed.
    ///
    /// No-op unless `task_id` is the active task and it has completed.
    pub fn acknowledge(&self, task_id: Uuid) -> bool {
        let mut active = self.lock();
        match active.as_ref() {
            Some(task) if task.id() == task_id && task.is_complete() => {
                log::debug!("Resolution {} acknowledged", task_id);
                *active = None;
                true
            }
            _ => false,
        }
    }
}
