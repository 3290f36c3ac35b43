// src/application/mod.rs
//
// Application Layer
//
// ARCHITECTURE:
// - Sits above services; owns the UI boundary
// - Controllers coordinate, views render
// - Translates between DTOs and domain entities

pub mod config;
pub mod console_view;
pub mod controller;
pub mod dto;
pub mod error_handling;
pub mod state;
pub mod view;


pub use config::ResolverConfig;
pub use console_view::ConsoleView;
pub use controller::{ControllerDeps, DialogState, Lifecycle, ResolutionListController};
pub use dto::*;
pub use error_handling::{ErrorResponse, ErrorType};
pub use state::AppState;
pub use view::{FlowOutcome, Notice, ResolutionView, RowResolutionRequest, RESOLVING_ALL_TITLE};
