// src/services/row_loader.rs
//
// Row Loader
//
// Produces the list of rows that still need checkpoint resolution. On the
// first load for a screen it also drops checkpoints that only differ from the
// committed row in metadata, and reports how many rows that touched.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::checkpoint::RowVersions;
use crate::domain::resolution::ResolveRowEntry;
use crate::error::AppResult;
use crate::events::{CheckpointsSilentlyReverted, EventBus};
use crate::repositories::CheckpointRepository;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadResult {
    pub rows: Vec<ResolveRowEntry>,
    pub silently_reverted: usize,
}

#[async_trait]
pub trait RowLoader: Send + Sync {
    async fn load(&self, table_id: &str, have_resolved_metadata_conflicts: bool)
        -> AppResult<LoadResult>;
}

pub struct CheckpointRowLoader {
    repository: Arc<dyn CheckpointRepository>,
    event_bus: Arc<EventBus>,
}

impl CheckpointRowLoader {
    pub fn new(repository: Arc<dyn CheckpointRepository>, event_bus: Arc<EventBus>) -> Self {
        Self {
            repository,
            event_bus,
        }
    }

    /// Blocking variant of [`RowLoader::load`].
    pub fn load_blocking(
        &self,
        table_id: &str,
        have_resolved_metadata_conflicts: bool,
    ) -> AppResult<LoadResult> {
        let silently_reverted = if have_resolved_metadata_conflicts {
            0
        } else {
            self.repository.revert_metadata_only_checkpoints(table_id)?
        };

        if silently_reverted > 0 {
            self.event_bus.emit(CheckpointsSilentlyReverted::new(
                table_id.to_string(),
                silently_reverted,
            ));
        }

        let mut rows = Vec::new();
        for row_id in self.repository.list_conflicted_row_ids(table_id)? {
            let versions = match RowVersions::from_versions(
                &row_id,
                self.repository.list_versions(table_id, &row_id)?,
            ) {
                Ok(versions) => versions,
                Err(e) => {
                    log::warn!("Leaving row '{}' out of the list: {}", row_id, e);
                    continue;
                }
            };

            // Resolved between the two queries
            if versions.checkpoints.is_empty() {
                continue;
            }

            rows.push(ResolveRowEntry {
                display_name: versions.display_name(),
                checkpoint_count: versions.checkpoints.len(),
                newest_savepoint: versions.newest_checkpoint().map(|c| c.savepoint_timestamp),
                row_id,
            });
        }

        rows.sort_by(|a, b| {
            a.display_name
                .cmp(&b.display_name)
                .then_with(|| a.row_id.cmp(&b.row_id))
        });

        log::debug!(
            "Loaded {} conflicted row(s) from '{}' ({} silently reverted)",
            rows.len(),
            table_id,
            silently_reverted
        );

        Ok(LoadResult {
            rows,
            silently_reverted,
        })
    }
}

#[async_trait]
impl RowLoader for CheckpointRowLoader {
    async fn load(
        &self,
        table_id: &str,
        have_resolved_metadata_conflicts: bool,
    ) -> AppResult<LoadResult> {
        let loader = CheckpointRowLoader {
            repository: Arc::clone(&self.repository),
            event_bus: Arc::clone(&self.event_bus),
        };
        let table_id = table_id.to_string();

        tokio::task::spawn_blocking(move || {
            loader.load_blocking(&table_id, have_resolved_metadata_conflicts)
        })
        .await?
    }
}
