use super::entity::CheckpointRow;
use crate::domain::launch::validate_identifier;
use crate::domain::{DomainError, DomainResult};

/// Validates a row version before it is stored
pub fn validate_checkpoint_row(row: &CheckpointRow) -> DomainResult<()> {
    validate_identifier("table_id", &row.table_id)?;

    if row.row_id.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "Row id cannot be empty".to_string(),
        ));
    }

    if !row.data.is_object() {
        return Err(DomainError::InvariantViolation(format!(
            "Row '{}' data must be a JSON object",
            row.row_id
        )));
    }

    Ok(())
}
