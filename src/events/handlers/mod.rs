// src/events/handlers/mod.rs
//
// Event Handlers
//
// Handlers use closure-based subscription via EventBus::subscribe.

pub mod journal_handler;

pub use journal_handler::register_journal_handlers;
