// src/services/test_support.rs
//
// Repository fakes shared by the protocol and controller tests.

use std::sync::{Condvar, Mutex};

use crate::domain::checkpoint::CheckpointRow;
use crate::domain::resolution::{ResolutionDirection, RowResolution};
use crate::error::AppResult;
use crate::repositories::CheckpointRepository;

/// Holds every caller of `wait` until opened.
#[derive(Default)]
pub struct Gate {
    open: Mutex<bool>,
    changed: Condvar,
}

impl Gate {
    pub fn wait(&self) {
        let mut open = self.open.lock().unwrap();
        while !*open {
            open = self.changed.wait(open).unwrap();
        }
    }

    pub fn open(&self) {
        *self.open.lock().unwrap() = true;
        self.changed.notify_all();
    }
}

/// Resolves every row, but only once its gate opens.
pub struct GatedRepository {
    pub gate: std::sync::Arc<Gate>,
}

impl CheckpointRepository for GatedRepository {
    fn save(&self, _row: &CheckpointRow) -> AppResult<()> {
        Ok(())
    }

    fn list_versions(&self, _table_id: &str, _row_id: &str) -> AppResult<Vec<CheckpointRow>> {
        Ok(Vec::new())
    }

    fn list_conflicted_row_ids(&self, _table_id: &str) -> AppResult<Vec<String>> {
        Ok(Vec::new())
    }

    fn resolve_row(
        &self,
        _table_id: &str,
        _row_id: &str,
        _direction: ResolutionDirection,
    ) -> AppResult<RowResolution> {
        self.gate.wait();
        Ok(RowResolution::Resolved)
    }

    fn revert_metadata_only_checkpoints(&self, _table_id: &str) -> AppResult<usize> {
        Ok(0)
    }
}
