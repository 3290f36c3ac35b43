// src/repositories/checkpoint_repository.rs
//
// Checkpoint Repository
//
// Stores every version of every row. Committed versions carry a savepoint
// type; checkpoints carry NULL. Timestamps are stored as fixed-width RFC 3339
// (nanosecond precision, `Z` suffix) so they round-trip exactly as keys.

use crate::db::ConnectionPool;
use crate::domain::checkpoint::{CheckpointRow, RowVersions, SavepointType};
use crate::domain::resolution::{
    plan_row_resolution, ResolutionDirection, ResolutionPlan, RowResolution,
};
use crate::error::AppResult;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, Row};
use std::sync::Arc;

pub struct SqliteCheckpointRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteCheckpointRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    fn format_timestamp(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }

    fn conversion_error(column: usize, message: String) -> rusqlite::Error {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message)),
        )
    }

    /// Convert a database row to a CheckpointRow.
    ///
    /// Malformed timestamps, savepoint types or data are explicit errors.
    fn row_to_checkpoint(row: &Row) -> rusqlite::Result<CheckpointRow> {
        let timestamp_str: String = row.get("savepoint_timestamp")?;
        let savepoint_type_str: Option<String> = row.get("savepoint_type")?;
        let data_str: String = row.get("data")?;

        let savepoint_timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                Self::conversion_error(
                    2,
                    format!("Invalid savepoint_timestamp '{}': {}", timestamp_str, e),
                )
            })?;

        let savepoint_type = match savepoint_type_str {
            Some(s) => Some(SavepointType::parse(&s).ok_or_else(|| {
                Self::conversion_error(3, format!("Invalid savepoint_type '{}'", s))
            })?),
            None => None,
        };

        let data = serde_json::from_str(&data_str)
            .map_err(|e| Self::conversion_error(6, format!("Invalid row data: {}", e)))?;

        Ok(CheckpointRow {
            table_id: row.get("table_id")?,
            row_id: row.get("row_id")?,
            savepoint_timestamp,
            savepoint_type,
            conflict_type: row.get("conflict_type")?,
            instance_name: row.get("instance_name")?,
            data,
        })
    }

    fn query_versions(
        conn: &Connection,
        table_id: &str,
        row_id: &str,
    ) -> AppResult<Vec<CheckpointRow>> {
        let mut stmt = conn.prepare(
            "SELECT table_id, row_id, savepoint_timestamp, savepoint_type,
                    conflict_type, instance_name, data
             FROM checkpoint_rows
             WHERE table_id = ?1 AND row_id = ?2
             ORDER BY savepoint_timestamp",
        )?;

        let versions = stmt
            .query_map(rusqlite::params![table_id, row_id], Self::row_to_checkpoint)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(versions)
    }

    fn query_conflicted_row_ids(conn: &Connection, table_id: &str) -> AppResult<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT DISTINCT row_id FROM checkpoint_rows
             WHERE table_id = ?1 AND savepoint_type IS NULL
             ORDER BY row_id",
        )?;

        let ids = stmt
            .query_map(rusqlite::params![table_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(ids)
    }
}

// ---------------------------------------------------------------------
// Repository contract
// ---------------------------------------------------------------------
#[cfg_attr(test, mockall::automock)]
pub trait CheckpointRepository: Send + Sync {
    /// Insert or replace one version of a row. A committed version replaces
    /// any earlier committed version of the same row.
    fn save(&self, row: &CheckpointRow) -> AppResult<()>;

    /// All versions of a row, oldest first
    fn list_versions(&self, table_id: &str, row_id: &str) -> AppResult<Vec<CheckpointRow>>;

    /// Ids of rows that have at least one checkpoint
    fn list_conflicted_row_ids(&self, table_id: &str) -> AppResult<Vec<String>>;

    /// Apply the bulk policy to one row in a single transaction
    fn resolve_row(
        &self,
        table_id: &str,
        row_id: &str,
        direction: ResolutionDirection,
    ) -> AppResult<RowResolution>;

    /// Drop checkpoints that only differ from the committed row in metadata.
    /// Returns the number of rows reverted.
    fn revert_metadata_only_checkpoints(&self, table_id: &str) -> AppResult<usize>;
}

// ---------------------------------------------------------------------
// SQLite Implementation
// ---------------------------------------------------------------------
impl CheckpointRepository for SqliteCheckpointRepository {
    fn save(&self, row: &CheckpointRow) -> AppResult<()> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let timestamp = Self::format_timestamp(&row.savepoint_timestamp);

        // One committed version per row
        if row.savepoint_type.is_some() {
            let replaced = tx.execute(
                "DELETE FROM checkpoint_rows
                 WHERE table_id = ?1 AND row_id = ?2
                   AND savepoint_type IS NOT NULL AND savepoint_timestamp != ?3",
                rusqlite::params![row.table_id, row.row_id, timestamp],
            )?;
            if replaced > 0 {
                log::debug!(
                    "Replaced committed version of row '{}' in '{}'",
                    row.row_id,
                    row.table_id
                );
            }
        }

        tx.execute(
            "INSERT OR REPLACE INTO checkpoint_rows (
                table_id, row_id, savepoint_timestamp, savepoint_type,
                conflict_type, instance_name, data
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                row.table_id,
                row.row_id,
                timestamp,
                row.savepoint_type.map(|t| t.as_str()),
                row.conflict_type,
                row.instance_name,
                serde_json::to_string(&row.data)?,
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn list_versions(&self, table_id: &str, row_id: &str) -> AppResult<Vec<CheckpointRow>> {
        let conn = self.pool.get()?;
        Self::query_versions(&conn, table_id, row_id)
    }

    fn list_conflicted_row_ids(&self, table_id: &str) -> AppResult<Vec<String>> {
        let conn = self.pool.get()?;
        Self::query_conflicted_row_ids(&conn, table_id)
    }

    fn resolve_row(
        &self,
        table_id: &str,
        row_id: &str,
        direction: ResolutionDirection,
    ) -> AppResult<RowResolution> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let versions = RowVersions::from_versions(row_id, Self::query_versions(&tx, table_id, row_id)?)?;

        let (promote, delete) = match plan_row_resolution(&versions, direction) {
            ResolutionPlan::Skip(reason) => return Ok(RowResolution::Skipped(reason)),
            ResolutionPlan::Apply { promote, delete } => (promote, delete),
        };

        for ts in &delete {
            tx.execute(
                "DELETE FROM checkpoint_rows
                 WHERE table_id = ?1 AND row_id = ?2 AND savepoint_timestamp = ?3",
                rusqlite::params![table_id, row_id, Self::format_timestamp(ts)],
            )?;
        }

        if let Some(ts) = promote {
            tx.execute(
                "UPDATE checkpoint_rows SET savepoint_type = ?4
                 WHERE table_id = ?1 AND row_id = ?2 AND savepoint_timestamp = ?3",
                rusqlite::params![
                    table_id,
                    row_id,
                    Self::format_timestamp(&ts),
                    SavepointType::Incomplete.as_str(),
                ],
            )?;
        }

        tx.commit()?;
        Ok(RowResolution::Resolved)
    }

    fn revert_metadata_only_checkpoints(&self, table_id: &str) -> AppResult<usize> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let mut reverted = 0;
        for row_id in Self::query_conflicted_row_ids(&tx, table_id)? {
            let versions = match RowVersions::from_versions(
                &row_id,
                Self::query_versions(&tx, table_id, &row_id)?,
            ) {
                Ok(versions) => versions,
                Err(e) => {
                    log::warn!("Not reverting row '{}' in '{}': {}", row_id, table_id, e);
                    continue;
                }
            };

            if versions.has_sync_conflict() || !versions.is_metadata_only() {
                continue;
            }

            tx.execute(
                "DELETE FROM checkpoint_rows
                 WHERE table_id = ?1 AND row_id = ?2 AND savepoint_type IS NULL",
                rusqlite::params![table_id, row_id],
            )?;
            reverted += 1;
        }

        tx.commit()?;
        Ok(reverted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_connection_pool, initialize_database};
    use crate::domain::resolution::SkipReason;
    use chrono::TimeZone;
    use serde_json::json;
    use tempfile::TempDir;

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 4, 10, minute, 0).unwrap()
    }

    fn test_repo() -> (TempDir, SqliteCheckpointRepository) {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_connection_pool(&dir.path().join("test.db"), 2).unwrap();
        initialize_database(&pool.get().unwrap()).unwrap();
        (dir, SqliteCheckpointRepository::new(Arc::new(pool)))
    }

    fn seed_row(repo: &SqliteCheckpointRepository, row_id: &str) {
        repo.save(&CheckpointRow::committed(
            "census",
            row_id,
            ts(0),
            SavepointType::Complete,
            json!({"age": 30}),
        ))
        .unwrap();
        repo.save(&CheckpointRow::checkpoint("census", row_id, ts(1), json!({"age": 31})))
            .unwrap();
        repo.save(&CheckpointRow::checkpoint("census", row_id, ts(2), json!({"age": 32})))
            .unwrap();
    }

    #[test]
    fn test_save_and_list_roundtrip() {
        let (_dir, repo) = test_repo();
        let row = CheckpointRow::checkpoint("census", "r1", ts(3), json!({"name": "Ana"}))
            .with_instance_name("Ana");
        repo.save(&row).unwrap();

        let versions = repo.list_versions("census", "r1").unwrap();
        assert_eq!(versions, vec![row]);
    }

    #[test]
    fn test_conflicted_ids_only_include_rows_with_checkpoints() {
        let (_dir, repo) = test_repo();
        seed_row(&repo, "r1");
        repo.save(&CheckpointRow::committed(
            "census",
            "clean",
            ts(0),
            SavepointType::Complete,
            json!({}),
        ))
        .unwrap();

        assert_eq!(repo.list_conflicted_row_ids("census").unwrap(), vec!["r1"]);
        assert!(repo.list_conflicted_row_ids("other").unwrap().is_empty());
    }

    #[test]
    fn test_take_newest_leaves_single_incomplete_version() {
        let (_dir, repo) = test_repo();
        seed_row(&repo, "r1");

        let outcome = repo
            .resolve_row("census", "r1", ResolutionDirection::TakeNewest)
            .unwrap();
        assert_eq!(outcome, RowResolution::Resolved);

        let versions = repo.list_versions("census", "r1").unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].savepoint_type, Some(SavepointType::Incomplete));
        assert_eq!(versions[0].data, json!({"age": 32}));
    }

    #[test]
    fn test_take_oldest_restores_committed_version() {
        let (_dir, repo) = test_repo();
        seed_row(&repo, "r1");

        repo.resolve_row("census", "r1", ResolutionDirection::TakeOldest)
            .unwrap();

        let versions = repo.list_versions("census", "r1").unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].savepoint_type, Some(SavepointType::Complete));
        assert_eq!(versions[0].data, json!({"age": 30}));
    }

    #[test]
    fn test_take_oldest_removes_never_committed_row() {
        let (_dir, repo) = test_repo();
        repo.save(&CheckpointRow::checkpoint("census", "new", ts(1), json!({})))
            .unwrap();

        repo.resolve_row("census", "new", ResolutionDirection::TakeOldest)
            .unwrap();

        assert!(repo.list_versions("census", "new").unwrap().is_empty());
    }

    #[test]
    fn test_sync_conflict_row_is_untouched() {
        let (_dir, repo) = test_repo();
        repo.save(
            &CheckpointRow::committed("census", "r1", ts(0), SavepointType::Complete, json!({}))
                .with_conflict_type(2),
        )
        .unwrap();
        repo.save(&CheckpointRow::checkpoint("census", "r1", ts(1), json!({"x": 1})))
            .unwrap();

        let outcome = repo
            .resolve_row("census", "r1", ResolutionDirection::TakeNewest)
            .unwrap();
        assert_eq!(outcome, RowResolution::Skipped(SkipReason::SyncConflict));
        assert_eq!(repo.list_versions("census", "r1").unwrap().len(), 2);
    }

    #[test]
    fn test_missing_row_is_skipped() {
        let (_dir, repo) = test_repo();
        let outcome = repo
            .resolve_row("census", "ghost", ResolutionDirection::TakeNewest)
            .unwrap();
        assert_eq!(outcome, RowResolution::Skipped(SkipReason::NoCheckpoints));
    }

    /// Writes a second committed version directly, as an older tool could have.
    fn insert_raw_committed(repo: &SqliteCheckpointRepository, row_id: &str, minute: u32) {
        let conn = repo.pool.get().unwrap();
        conn.execute(
            "INSERT INTO checkpoint_rows (
                table_id, row_id, savepoint_timestamp, savepoint_type,
                conflict_type, instance_name, data
            ) VALUES ('census', ?1, ?2, 'COMPLETE', NULL, NULL, '{}')",
            rusqlite::params![row_id, SqliteCheckpointRepository::format_timestamp(&ts(minute))],
        )
        .unwrap();
    }

    #[test]
    fn test_saving_committed_version_replaces_previous_one() {
        let (_dir, repo) = test_repo();
        seed_row(&repo, "r1");
        repo.save(&CheckpointRow::committed(
            "census",
            "r1",
            ts(3),
            SavepointType::Complete,
            json!({"age": 33}),
        ))
        .unwrap();

        let versions = repo.list_versions("census", "r1").unwrap();
        assert_eq!(versions.len(), 3);
        let grouped = RowVersions::from_versions("r1", versions).unwrap();
        assert_eq!(grouped.committed.unwrap().data, json!({"age": 33}));
        assert_eq!(grouped.checkpoints.len(), 2);
    }

    #[test]
    fn test_resaving_same_committed_version_keeps_it() {
        let (_dir, repo) = test_repo();
        let row =
            CheckpointRow::committed("census", "r1", ts(0), SavepointType::Complete, json!({"a": 1}));
        repo.save(&row).unwrap();
        repo.save(&row).unwrap();

        assert_eq!(repo.list_versions("census", "r1").unwrap(), vec![row]);
    }

    #[test]
    fn test_revert_passes_over_row_with_two_committed_versions() {
        let (_dir, repo) = test_repo();
        repo.save(&CheckpointRow::committed(
            "census",
            "broken",
            ts(0),
            SavepointType::Complete,
            json!({}),
        ))
        .unwrap();
        insert_raw_committed(&repo, "broken", 1);
        repo.save(&CheckpointRow::checkpoint("census", "broken", ts(2), json!({})))
            .unwrap();

        repo.save(&CheckpointRow::committed(
            "census",
            "same",
            ts(0),
            SavepointType::Complete,
            json!({"age": 40}),
        ))
        .unwrap();
        repo.save(&CheckpointRow::checkpoint("census", "same", ts(5), json!({"age": 40})))
            .unwrap();

        assert_eq!(repo.revert_metadata_only_checkpoints("census").unwrap(), 1);
        assert_eq!(repo.list_conflicted_row_ids("census").unwrap(), vec!["broken"]);
    }

    #[test]
    fn test_revert_metadata_only_checkpoints() {
        let (_dir, repo) = test_repo();
        seed_row(&repo, "changed");
        repo.save(&CheckpointRow::committed(
            "census",
            "same",
            ts(0),
            SavepointType::Complete,
            json!({"age": 40}),
        ))
        .unwrap();
        repo.save(&CheckpointRow::checkpoint("census", "same", ts(5), json!({"age": 40})))
            .unwrap();

        let reverted = repo.revert_metadata_only_checkpoints("census").unwrap();
        assert_eq!(reverted, 1);
        assert_eq!(repo.list_conflicted_row_ids("census").unwrap(), vec!["changed"]);
        assert_eq!(repo.list_versions("census", "same").unwrap().len(), 1);
    }
}
