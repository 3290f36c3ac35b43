// src/events/types.rs
//
// All domain events in the system.
// Each event represents an immutable fact that has already occurred.
//
// CRITICAL RULES:
// - Events are facts, not commands
// - Events carry only the data needed to react
// - No business logic in event types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::resolution::ResolutionDirection;

/// Trait that all domain events must implement
pub trait DomainEvent: std::fmt::Debug + Clone {
    /// Unique identifier for this event instance
    fn event_id(&self) -> Uuid;

    /// When this event occurred
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Human-readable event type name
    fn event_type(&self) -> &'static str;
}

// ============================================================================
// BULK RESOLUTION EVENTS
// ============================================================================

/// Emitted when a bulk resolution task is accepted by the registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointResolutionStarted {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub task_id: Uuid,
    pub table_id: String,
    pub direction: ResolutionDirection,
    pub row_count: usize,
}

impl CheckpointResolutionStarted {
    pub fn new(task_id: Uuid, table_id: String, direction: ResolutionDirection, row_count: usize) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            task_id,
            table_id,
            direction,
            row_count,
        }
    }
}

impl DomainEvent for CheckpointResolutionStarted {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "CheckpointResolutionStarted" }
}

/// Emitted for each row the bulk policy resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowCheckpointResolved {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub task_id: Uuid,
    pub table_id: String,
    pub row_id: String,
    pub direction: ResolutionDirection,
}

impl RowCheckpointResolved {
    pub fn new(task_id: Uuid, table_id: String, row_id: String, direction: ResolutionDirection) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            task_id,
            table_id,
            row_id,
            direction,
        }
    }
}

impl DomainEvent for RowCheckpointResolved {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "RowCheckpointResolved" }
}

/// Emitted for each row the bulk policy left untouched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowCheckpointSkipped {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub task_id: Uuid,
    pub table_id: String,
    pub row_id: String,
    pub reason: String,
}

impl RowCheckpointSkipped {
    pub fn new(task_id: Uuid, table_id: String, row_id: String, reason: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            task_id,
            table_id,
            row_id,
            reason,
        }
    }
}

impl DomainEvent for RowCheckpointSkipped {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "RowCheckpointSkipped" }
}

/// Emitted once per task when the resolution loop ends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointResolutionCompleted {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub task_id: Uuid,
    pub table_id: String,
    pub resolved: usize,
    pub skipped: usize,
    pub duration_ms: u64,
}

impl CheckpointResolutionCompleted {
    pub fn new(task_id: Uuid, table_id: String, resolved: usize, skipped: usize, duration_ms: u64) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            task_id,
            table_id,
            resolved,
            skipped,
            duration_ms,
        }
    }
}

impl DomainEvent for CheckpointResolutionCompleted {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "CheckpointResolutionCompleted" }
}

// ============================================================================
// LOADER EVENTS
// ============================================================================

/// Emitted when the row loader drops metadata-only checkpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointsSilentlyReverted {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub table_id: String,
    pub row_count: usize,
}

impl CheckpointsSilentlyReverted {
    pub fn new(table_id: String, row_count: usize) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            table_id,
            row_count,
        }
    }
}

impl DomainEvent for CheckpointsSilentlyReverted {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "CheckpointsSilentlyReverted" }
}
