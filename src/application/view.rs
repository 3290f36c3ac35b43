// src/application/view.rs
//
// View contract for the resolution list screen.
//
// RULES:
// - Views render; they never decide
// - Every call arrives on the controller's context, in order

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::ResolveRowEntry;
use crate::error::AppResult;

/// Title of the bulk-resolution progress indicator
pub const RESOLVING_ALL_TITLE: &str = "Resolving all conflicts";

/// Short user-facing messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
    ResolverAlreadyActive,
    /// Rows whose checkpoints only differed in metadata and were reverted
    SilentlyResolved(usize),
    AllCheckpointsApplied,
    ResolutionResult(String),
    Error(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::ResolverAlreadyActive => write!(
                f,
                "A conflict resolver is already running. Wait for it to finish."
            ),
            Notice::SilentlyResolved(1) => write!(
                f,
                "1 checkpoint only changed metadata and was reverted."
            ),
            Notice::SilentlyResolved(n) => write!(
                f,
                "{} checkpoints only changed metadata and were reverted.",
                n
            ),
            Notice::AllCheckpointsApplied => write!(f, "All checkpoints have been applied."),
            Notice::ResolutionResult(message) => f.write_str(message),
            Notice::Error(message) => write!(f, "Error: {}", message),
        }
    }
}

/// How the screen ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowOutcome {
    Ok,
    Canceled,
}

/// Hand-off to the per-row resolution screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowResolutionRequest {
    pub app_name: String,
    pub table_id: String,
    pub row_id: String,
}

pub trait ResolutionView {
    fn show_notice(&mut self, notice: Notice);

    /// Enable or disable the take-all controls
    fn set_controls_enabled(&mut self, enabled: bool);

    fn show_progress(&mut self, title: &str, message: Option<&str>);

    fn update_progress(&mut self, message: &str);

    /// May fail if the indicator is already gone; callers log and move on.
    fn dismiss_progress(&mut self) -> AppResult<()>;

    fn render_rows(&mut self, rows: &[ResolveRowEntry]);

    fn open_row_resolution(&mut self, request: RowResolutionRequest);

    fn finish(&mut self, outcome: FlowOutcome);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silently_resolved_wording() {
        assert_eq!(
            Notice::SilentlyResolved(1).to_string(),
            "1 checkpoint only changed metadata and was reverted."
        );
        assert_eq!(
            Notice::SilentlyResolved(3).to_string(),
            "3 checkpoints only changed metadata and were reverted."
        );
    }

    #[test]
    fn test_result_notice_is_message_verbatim() {
        let notice = Notice::ResolutionResult("Take all newest: 4 resolved, 1 skipped".into());
        assert_eq!(notice.to_string(), "Take all newest: 4 resolved, 1 skipped");
    }
}
