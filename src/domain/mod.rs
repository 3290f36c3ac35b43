// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod checkpoint;
pub mod launch;
pub mod resolution;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use checkpoint::{validate_checkpoint_row, CheckpointRow, RowVersions, SavepointType};

pub use launch::{validate_identifier, LaunchContext};

pub use resolution::{
    plan_row_resolution, ResolutionDirection, ResolutionPlan, ResolutionSummary, ResolveRowEntry,
    RowResolution, SkipReason,
};

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
/// These represent violations of business rules and invariants
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Entity not found: {0}")]
    NotFound(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;
