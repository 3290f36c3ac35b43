// src/domain/resolution/mod.rs
//
// Resolution Domain
//
// Value objects and the per-row planner for checkpoint resolution.
//
// CRITICAL RULES:
// - All types are pure value objects (immutable)
// - No persistence
// - No event emission (that's the service's job)

pub mod plan;
pub mod value_objects;

pub use plan::{plan_row_resolution, ResolutionPlan};
pub use value_objects::{
    ResolutionDirection, ResolutionSummary, ResolveRowEntry, RowResolution, SkipReason,
};
