// src/application/dto/mod.rs
//
// Data Transfer Objects
//
// CRITICAL PRINCIPLES:
// - DTOs are UI-friendly representations
// - DTOs are simple, serializable structs
// - Incoming DTOs are validated before they become domain entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{validate_checkpoint_row, CheckpointRow, DomainError, SavepointType};
use crate::error::AppResult;

// ============================================================================
// LAUNCH / SAVED STATE
// ============================================================================

/// Navigation parameters a resolution screen is opened with
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchParams {
    pub app_name: Option<String>,
    pub table_id: Option<String>,
}

impl LaunchParams {
    pub fn new(app_name: impl Into<String>, table_id: impl Into<String>) -> Self {
        Self {
            app_name: Some(app_name.into()),
            table_id: Some(table_id.into()),
        }
    }
}

/// Controller state that survives recreation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedState {
    pub have_resolved_metadata_conflicts: bool,
}

// ============================================================================
// IMPORT DTOs
// ============================================================================

/// One stored version as it appears in an import file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRowDto {
    pub row_id: String,
    pub savepoint_timestamp: String,
    #[serde(default)]
    pub savepoint_type: Option<String>,
    #[serde(default)]
    pub conflict_type: Option<i32>,
    #[serde(default)]
    pub instance_name: Option<String>,
    #[serde(default = "empty_object")]
    pub data: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl ImportRowDto {
    /// Validated storage row for `table_id`.
    pub fn into_checkpoint_row(self, table_id: &str) -> AppResult<CheckpointRow> {
        let savepoint_timestamp =
            DateTime::parse_from_rfc3339(&self.savepoint_timestamp)?.with_timezone(&Utc);

        let savepoint_type = match self.savepoint_type.as_deref() {
            None => None,
            Some(raw) => Some(SavepointType::parse(raw).ok_or_else(|| {
                DomainError::InvariantViolation(format!("Unknown savepoint type '{}'", raw))
            })?),
        };

        let row = CheckpointRow {
            table_id: table_id.to_string(),
            row_id: self.row_id,
            savepoint_timestamp,
            savepoint_type,
            conflict_type: self.conflict_type,
            instance_name: self.instance_name,
            data: self.data,
        };

        validate_checkpoint_row(&row)?;
        Ok(row)
    }
}

/// Parse an import file: a JSON array of rows.
pub fn parse_import_rows(json: &str) -> AppResult<Vec<ImportRowDto>> {
    Ok(serde_json::from_str(json)?)
}
