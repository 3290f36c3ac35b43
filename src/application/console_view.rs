// src/application/console_view.rs
//
// Terminal rendering of the resolution list screen.

use crate::application::view::{FlowOutcome, Notice, ResolutionView, RowResolutionRequest};
use crate::domain::ResolveRowEntry;
use crate::error::AppResult;

#[derive(Debug, Default)]
pub struct ConsoleView {
    outcome: Option<FlowOutcome>,
    row_request: Option<RowResolutionRequest>,
    rows_shown: usize,
}

impl ConsoleView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set once the screen has finished
    pub fn outcome(&self) -> Option<FlowOutcome> {
        self.outcome
    }

    /// Row handed off for per-row resolution, if any
    pub fn row_request(&self) -> Option<&RowResolutionRequest> {
        self.row_request.as_ref()
    }

    pub fn rows_shown(&self) -> usize {
        self.rows_shown
    }
}

impl ResolutionView for ConsoleView {
    fn show_notice(&mut self, notice: Notice) {
        match notice {
            Notice::Error(_) => eprintln!("{}", notice),
            _ => println!("{}", notice),
        }
    }

    fn set_controls_enabled(&mut self, enabled: bool) {
        log::debug!("Take-all controls {}", if enabled { "enabled" } else { "disabled" });
    }

    fn show_progress(&mut self, title: &str, message: Option<&str>) {
        match message {
            Some(message) => println!("{}... {}", title, message),
            None => println!("{}...", title),
        }
    }

    fn update_progress(&mut self, message: &str) {
        println!("  {}", message);
    }

    fn dismiss_progress(&mut self) -> AppResult<()> {
        Ok(())
    }

    fn render_rows(&mut self, rows: &[ResolveRowEntry]) {
        self.rows_shown = rows.len();
        if rows.is_empty() {
            return;
        }

        println!("{} row(s) with checkpoints:", rows.len());
        for (index, row) in rows.iter().enumerate() {
            let newest = row
                .newest_savepoint
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  [{}] {}  checkpoints: {}  newest: {}",
                index, row, row.checkpoint_count, newest
            );
        }
    }

    fn open_row_resolution(&mut self, request: RowResolutionRequest) {
        println!(
            "Row '{}' needs individual resolution: checkpoint-resolver --app-name {} --table-id {} resolve-row {} --direction <newest|oldest>",
            request.row_id, request.app_name, request.table_id, request.row_id
        );
        self.row_request = Some(request);
    }

    fn finish(&mut self, outcome: FlowOutcome) {
        log::debug!("Resolution list finished: {:?}", outcome);
        self.outcome = Some(outcome);
    }
}
