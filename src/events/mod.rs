// src/events/mod.rs
//
// Internal Event System - Public API

pub mod bus;
pub mod handlers;
pub mod types;

pub use types::DomainEvent;

pub use types::{
    CheckpointResolutionCompleted, CheckpointResolutionStarted, CheckpointsSilentlyReverted,
    RowCheckpointResolved, RowCheckpointSkipped,
};

pub use bus::{EventBus, EventLogEntry};

pub use handlers::register_journal_handlers;

/// Initialize a new event bus with the journal handlers registered
pub fn create_event_bus() -> EventBus {
    let bus = EventBus::new();
    register_journal_handlers(&bus);
    bus
}
