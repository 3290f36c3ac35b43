// src/services/mod.rs
//
// Services Module - Orchestration Layer
//
// The single-task resolution protocol and the row loader that feeds it.

pub mod listener;
pub mod resolution_task;
pub mod row_loader;
pub mod task_registry;


#[cfg(test)]
pub(crate) mod test_support;

pub use listener::{ListenerId, ListenerInbox, ResolutionEvent, ResolutionListener};

pub use resolution_task::ResolutionTask;

pub use row_loader::{CheckpointRowLoader, LoadResult, RowLoader};

pub use task_registry::ResolutionRegistry;
