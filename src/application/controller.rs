// src/application/controller.rs
//
// Resolution List Controller
//
// Drives one resolution list screen: loads conflicted rows, starts or rejoins
// the bulk resolution task, and renders its progress and result.
//
// CRITICAL RULES:
// - A controller never owns the task; the registry does
// - The controller is the only consumer of its listener inbox, so every
//   progress/completion callback runs on the controller's context
// - Detach uses the controller's own listener id, never a blanket clear
// - Invalid launch parameters end the flow as Canceled, silently

use std::sync::Arc;

use crate::application::dto::{LaunchParams, SavedState};
use crate::application::error_handling::ErrorResponse;
use crate::application::state::AppState;
use crate::application::view::{
    FlowOutcome, Notice, ResolutionView, RowResolutionRequest, RESOLVING_ALL_TITLE,
};
use crate::domain::{LaunchContext, ResolutionDirection, ResolutionSummary, ResolveRowEntry};
use crate::error::{AppError, AppResult};
use crate::services::{
    ListenerId, ListenerInbox, LoadResult, ResolutionEvent, ResolutionListener,
    ResolutionRegistry, RowLoader,
};

/// Shared collaborators handed to every controller instance
#[derive(Clone)]
pub struct ControllerDeps {
    pub loader: Arc<dyn RowLoader>,
    pub registry: Arc<ResolutionRegistry>,
}

impl From<&AppState> for ControllerDeps {
    fn from(state: &AppState) -> Self {
        Self {
            loader: state.loader.clone(),
            registry: state.registry.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Resumed,
    Paused,
    Destroyed,
}

/// Whether the progress indicator is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Hidden,
    Showing,
}

pub struct ResolutionListController<V: ResolutionView> {
    context: LaunchContext,
    deps: ControllerDeps,
    view: V,
    listener: ResolutionListener,
    inbox: ListenerInbox,
    rows: Vec<ResolveRowEntry>,
    have_resolved_metadata_conflicts: bool,
    dialog: DialogState,
    lifecycle: Lifecycle,
}

impl<V: ResolutionView> ResolutionListController<V> {
    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    /// Validate the launch parameters and build the controller.
    ///
    /// On invalid parameters the view is finished as `Canceled` and
    /// `AppError::LaunchCanceled` is returned.
    pub fn create(
        params: &LaunchParams,
        saved_state: Option<SavedState>,
        deps: ControllerDeps,
        mut view: V,
    ) -> AppResult<Self> {
        let context = match LaunchContext::from_params(
            params.app_name.as_deref(),
            params.table_id.as_deref(),
        ) {
            Ok(context) => context,
            Err(e) => {
                log::debug!("Resolution list launch canceled: {}", e);
                view.finish(FlowOutcome::Canceled);
                return Err(AppError::LaunchCanceled(e.to_string()));
            }
        };

        let (listener, inbox) = ResolutionListener::channel();
        log::debug!(
            "Controller {} created for {}/{}",
            listener.id(),
            context.app_name,
            context.table_id
        );

        Ok(Self {
            context,
            deps,
            view,
            listener,
            inbox,
            rows: Vec::new(),
            have_resolved_metadata_conflicts: saved_state
                .map(|s| s.have_resolved_metadata_conflicts)
                .unwrap_or(false),
            dialog: DialogState::Hidden,
            lifecycle: Lifecycle::Created,
        })
    }

    /// Initial row load
    pub async fn on_activity_created(&mut self) {
        self.reload().await;
    }

    /// Rejoin an active task, if any, and render its state.
    pub async fn on_resume(&mut self) {
        self.lifecycle = Lifecycle::Resumed;
        self.show_progress().await;
    }

    pub fn on_pause(&mut self) {
        self.lifecycle = Lifecycle::Paused;
        self.detach();
    }

    pub fn on_destroy(&mut self) {
        self.lifecycle = Lifecycle::Destroyed;
        self.detach();
    }

    pub fn save_instance_state(&self) -> SavedState {
        SavedState {
            have_resolved_metadata_conflicts: self.have_resolved_metadata_conflicts,
        }
    }

    fn detach(&mut self) {
        if self.deps.registry.detach_listener(self.listener.id()) {
            log::debug!("Controller {} detached", self.listener.id());
        }
    }

    // ========================================================================
    // ROW LOADING
    // ========================================================================

    /// Reload the row list
    pub async fn reload(&mut self) {
        let loaded = self
            .deps
            .loader
            .load(&self.context.table_id, self.have_resolved_metadata_conflicts)
            .await;

        match loaded {
            Ok(result) => self.on_load_finished(result),
            Err(e) => {
                log::error!("Failed to load rows of '{}': {}", self.context.table_id, e);
                let response = ErrorResponse::from_app_error(e);
                self.view.show_notice(Notice::Error(response.user_message()));
            }
        }
    }

    pub fn on_load_finished(&mut self, result: LoadResult) {
        self.have_resolved_metadata_conflicts = true;

        if result.silently_reverted != 0 {
            self.view
                .show_notice(Notice::SilentlyResolved(result.silently_reverted));
        }

        self.rows.clear();
        match result.rows.len() {
            1 => {
                let entry = &result.rows[0];
                log::debug!("Single conflicted row '{}'; resolving directly", entry.row_id);
                self.launch_row_resolution(entry);
            }
            0 => {
                self.view.show_notice(Notice::AllCheckpointsApplied);
                self.view.finish(FlowOutcome::Ok);
            }
            _ => {
                self.rows = result.rows;
                self.view.render_rows(&self.rows);
            }
        }
    }

    pub fn on_loader_reset(&mut self) {
        self.rows.clear();
        self.view.render_rows(&self.rows);
    }

    // ========================================================================
    // USER ACTIONS
    // ========================================================================

    pub async fn take_all_newest(&mut self) {
        self.resolve_conflict_list(ResolutionDirection::TakeNewest)
            .await;
    }

    pub async fn take_all_oldest(&mut self) {
        self.resolve_conflict_list(ResolutionDirection::TakeOldest)
            .await;
    }

    pub fn on_row_selected(&mut self, index: usize) {
        let Some(entry) = self.rows.get(index).cloned() else {
            log::warn!("Row selection {} out of range ({} rows)", index, self.rows.len());
            return;
        };

        log::debug!("Selected row {} ('{}')", index, entry.row_id);
        if self.deps.registry.is_active() {
            self.view.show_notice(Notice::ResolverAlreadyActive);
        } else {
            self.launch_row_resolution(&entry);
        }
    }

    async fn resolve_conflict_list(&mut self, direction: ResolutionDirection) {
        if self.rows.is_empty() {
            log::debug!("Ignoring {}: no rows displayed", direction);
            return;
        }

        let started = self.deps.registry.start(
            &self.context.table_id,
            direction,
            self.rows.clone(),
            self.listener.clone(),
        );

        match started {
            Ok(_) => {}
            Err(AppError::ResolverAlreadyActive) => {
                self.deps.registry.attach_listener(self.listener.clone());
                self.view.show_notice(Notice::ResolverAlreadyActive);
            }
            Err(e) => {
                log::error!("Could not start {}: {}", direction, e);
                let response = ErrorResponse::from_app_error(e);
                self.view.show_notice(Notice::Error(response.user_message()));
                return;
            }
        }

        self.show_progress().await;
    }

    fn launch_row_resolution(&mut self, entry: &ResolveRowEntry) {
        self.view.open_row_resolution(RowResolutionRequest {
            app_name: self.context.app_name.clone(),
            table_id: self.context.table_id.clone(),
            row_id: entry.row_id.clone(),
        });
    }

    // ========================================================================
    // TASK EVENTS
    // ========================================================================

    async fn show_progress(&mut self) {
        let Some(task) = self.deps.registry.attach_listener(self.listener.clone()) else {
            return;
        };

        if task.is_complete() {
            // attach queued the completion for us
            self.drain_pending().await;
            return;
        }

        self.view.set_controls_enabled(false);

        let progress = task.progress();
        match self.dialog {
            DialogState::Showing => {
                if let Some(message) = progress.as_deref() {
                    self.view.update_progress(message);
                }
            }
            DialogState::Hidden => {
                self.view.show_progress(RESOLVING_ALL_TITLE, progress.as_deref());
                self.dialog = DialogState::Showing;
            }
        }
    }

    /// Wait for the next task event and handle it. Returns false once the
    /// inbox is closed.
    pub async fn pump(&mut self) -> bool {
        match self.inbox.recv().await {
            Some(event) => {
                self.handle_event(event).await;
                true
            }
            None => false,
        }
    }

    /// Handle every already-queued task event. Returns how many were handled.
    pub async fn drain_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.inbox.try_recv() {
            self.handle_event(event).await;
            handled += 1;
        }
        handled
    }

    async fn handle_event(&mut self, event: ResolutionEvent) {
        match event {
            ResolutionEvent::Progress { message, .. } => {
                if self.dialog == DialogState::Showing {
                    self.view.update_progress(&message);
                }
            }
            ResolutionEvent::Complete(summary) => self.resolution_complete(summary).await,
        }
    }

    async fn resolution_complete(&mut self, summary: ResolutionSummary) {
        if !self.deps.registry.acknowledge(summary.task_id) {
            log::debug!("Completion of {} already acknowledged", summary.task_id);
        }

        self.view.set_controls_enabled(true);

        self.dialog = DialogState::Hidden;
        if let Err(e) = self.view.dismiss_progress() {
            log::warn!("Failed to dismiss progress indicator: {}", e);
        }

        let message = summary.message();
        if !message.is_empty() {
            self.view.show_notice(Notice::ResolutionResult(message));
        }

        self.reload().await;
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn context(&self) -> &LaunchContext {
        &self.context
    }

    pub fn listener_id(&self) -> ListenerId {
        self.listener.id()
    }

    pub fn rows(&self) -> &[ResolveRowEntry] {
        &self.rows
    }

    /// True while the progress indicator is up
    pub fn is_busy(&self) -> bool {
        self.dialog == DialogState::Showing
    }

    pub fn dialog_state(&self) -> DialogState {
        self.dialog
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }
}
