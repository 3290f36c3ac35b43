// src/events/handlers/journal_handler.rs
//
// Writes resolution facts to the application log.

use crate::events::bus::EventBus;
use crate::events::types::{
    CheckpointResolutionCompleted, CheckpointResolutionStarted, CheckpointsSilentlyReverted,
    RowCheckpointResolved, RowCheckpointSkipped,
};

pub fn register_journal_handlers(bus: &EventBus) {
    bus.subscribe::<CheckpointResolutionStarted, _>(|e| {
        log::info!(
            "Resolution {} started on '{}' ({}, {} rows)",
            e.task_id,
            e.table_id,
            e.direction,
            e.row_count
        );
    });

    bus.subscribe::<RowCheckpointResolved, _>(|e| {
        log::debug!("Row '{}' of '{}' resolved ({})", e.row_id, e.table_id, e.direction);
    });

    bus.subscribe::<RowCheckpointSkipped, _>(|e| {
        log::warn!("Row '{}' of '{}' skipped: {}", e.row_id, e.table_id, e.reason);
    });

    bus.subscribe::<CheckpointResolutionCompleted, _>(|e| {
        log::info!(
            "Resolution {} on '{}' finished in {} ms: {} resolved, {} skipped",
            e.task_id,
            e.table_id,
            e.duration_ms,
            e.resolved,
            e.skipped
        );
    });

    bus.subscribe::<CheckpointsSilentlyReverted, _>(|e| {
        log::info!(
            "Silently reverted {} metadata-only checkpoint row(s) in '{}'",
            e.row_count,
            e.table_id
        );
    });
}
