// src/repositories/mod.rs
//
// Repository layer
//
// CRITICAL RULES:
// - Repositories are data mappers
// - Resolution decisions come from the domain planner
// - NO event emission
// - Explicit SQL only

pub mod checkpoint_repository;

pub use checkpoint_repository::{CheckpointRepository, SqliteCheckpointRepository};

#[cfg(test)]
pub use checkpoint_repository::MockCheckpointRepository;
