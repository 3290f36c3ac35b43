// src/lib.rs
// Checkpoint Resolver - Local-first checkpoint conflict resolution
//
// Architecture:
// - Domain-centric: row versions, planning and summaries live in domain
// - Event-driven: resolution facts are journaled through the event bus
// - Explicit: one registry owns the single active bulk resolution task
// - Local-first: all data lives in a SQLite file the user controls
// - Application Layer: controller + view contract, host-agnostic

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod db;
pub mod domain;
pub mod error;
pub mod events;
pub mod repositories;
pub mod services;

// ============================================================================
// APPLICATION LAYER
// ============================================================================

pub mod application;

// ============================================================================
// PUBLIC API - Domain
// ============================================================================

pub use domain::{
    plan_row_resolution,
    validate_checkpoint_row,
    validate_identifier,
    // Checkpoints
    CheckpointRow,
    DomainError,
    LaunchContext,
    // Resolution
    ResolutionDirection,
    ResolutionPlan,
    ResolutionSummary,
    ResolveRowEntry,
    RowResolution,
    RowVersions,
    SavepointType,
    SkipReason,
};

// ============================================================================
// PUBLIC API - Error Types
// ============================================================================

pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Events
// ============================================================================

pub use events::{
    create_event_bus,
    register_journal_handlers,
    CheckpointResolutionCompleted,
    CheckpointResolutionStarted,
    CheckpointsSilentlyReverted,
    DomainEvent,
    EventBus,
    EventLogEntry,
    RowCheckpointResolved,
    RowCheckpointSkipped,
};

// ============================================================================
// PUBLIC API - Database
// ============================================================================

pub use db::{create_connection_pool, initialize_database, ConnectionPool};

// ============================================================================
// PUBLIC API - Repositories
// ============================================================================

pub use repositories::{CheckpointRepository, SqliteCheckpointRepository};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{
    CheckpointRowLoader,
    ListenerId,
    ListenerInbox,
    LoadResult,
    ResolutionEvent,
    ResolutionListener,
    ResolutionRegistry,
    ResolutionTask,
    RowLoader,
};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use application::{
    AppState, ConsoleView, ControllerDeps, FlowOutcome, Notice, ResolutionListController,
    ResolutionView, ResolverConfig,
};

pub use application::dto;
