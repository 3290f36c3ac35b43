use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};

/// One stored version of a data row.
///
/// A row may have a single committed version (`savepoint_type` set) and any
/// number of checkpoints (`savepoint_type` = `None`), each keyed by its
/// savepoint timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointRow {
    pub table_id: String,

    /// Opaque row identifier, shared by all versions of the row
    pub row_id: String,

    /// When this version was saved; unique per row
    pub savepoint_timestamp: DateTime<Utc>,

    /// `None` marks an uncommitted checkpoint
    pub savepoint_type: Option<SavepointType>,

    /// Non-null while the row is in a server sync conflict
    pub conflict_type: Option<i32>,

    /// Human-readable name of the instance, when the form provides one
    pub instance_name: Option<String>,

    /// Column values
    pub data: serde_json::Value,
}

/// Committed savepoint kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SavepointType {
    Complete,
    Incomplete,
}

impl SavepointType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SavepointType::Complete => "COMPLETE",
            SavepointType::Incomplete => "INCOMPLETE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "COMPLETE" => Some(SavepointType::Complete),
            "INCOMPLETE" => Some(SavepointType::Incomplete),
            _ => None,
        }
    }
}

impl std::fmt::Display for SavepointType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CheckpointRow {
    /// A new checkpoint for `row_id`
    pub fn checkpoint(
        table_id: impl Into<String>,
        row_id: impl Into<String>,
        savepoint_timestamp: DateTime<Utc>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            table_id: table_id.into(),
            row_id: row_id.into(),
            savepoint_timestamp,
            savepoint_type: None,
            conflict_type: None,
            instance_name: None,
            data,
        }
    }

    /// A committed version for `row_id`
    pub fn committed(
        table_id: impl Into<String>,
        row_id: impl Into<String>,
        savepoint_timestamp: DateTime<Utc>,
        savepoint_type: SavepointType,
        data: serde_json::Value,
    ) -> Self {
        Self {
            savepoint_type: Some(savepoint_type),
            ..Self::checkpoint(table_id, row_id, savepoint_timestamp, data)
        }
    }

    pub fn with_instance_name(mut self, name: impl Into<String>) -> Self {
        self.instance_name = Some(name.into());
        self
    }

    pub fn with_conflict_type(mut self, conflict_type: i32) -> Self {
        self.conflict_type = Some(conflict_type);
        self
    }

    pub fn is_checkpoint(&self) -> bool {
        self.savepoint_type.is_none()
    }
}

/// All stored versions of one row, split into committed and checkpoints.
#[derive(Debug, Clone)]
pub struct RowVersions {
    pub row_id: String,
    pub committed: Option<CheckpointRow>,
    /// Oldest first
    pub checkpoints: Vec<CheckpointRow>,
}

impl RowVersions {
    /// Group the versions of a single row.
    ///
    /// Fails if the versions belong to different rows or if more than one
    /// committed version exists.
    pub fn from_versions(row_id: &str, versions: Vec<CheckpointRow>) -> DomainResult<Self> {
        let mut committed = None;
        let mut checkpoints = Vec::new();

        for version in versions {
            if version.row_id != row_id {
                return Err(DomainError::InvariantViolation(format!(
                    "Version of row '{}' grouped under row '{}'",
                    version.row_id, row_id
                )));
            }

            if version.is_checkpoint() {
                checkpoints.push(version);
            } else if committed.replace(version).is_some() {
                return Err(DomainError::InvariantViolation(format!(
                    "Row '{}' has more than one committed version",
                    row_id
                )));
            }
        }

        checkpoints.sort_by_key(|c| c.savepoint_timestamp);

        Ok(Self {
            row_id: row_id.to_string(),
            committed,
            checkpoints,
        })
    }

    pub fn newest_checkpoint(&self) -> Option<&CheckpointRow> {
        self.checkpoints.last()
    }

    pub fn has_sync_conflict(&self) -> bool {
        self.committed
            .iter()
            .chain(self.checkpoints.iter())
            .any(|v| v.conflict_type.is_some())
    }

    /// True when every checkpoint carries exactly the committed data, i.e. the
    /// checkpoints differ only in savepoint metadata.
    pub fn is_metadata_only(&self) -> bool {
        match &self.committed {
            Some(committed) => {
                !self.checkpoints.is_empty()
                    && self.checkpoints.iter().all(|c| c.data == committed.data)
            }
            None => false,
        }
    }

    /// Newest checkpoint's instance name, then the committed one, then the row id.
    pub fn display_name(&self) -> String {
        self.newest_checkpoint()
            .and_then(|c| c.instance_name.clone())
            .or_else(|| self.committed.as_ref().and_then(|c| c.instance_name.clone()))
            .unwrap_or_else(|| self.row_id.clone())
    }
}
