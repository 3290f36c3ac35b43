pub mod entity;
pub mod invariants;

pub use entity::{CheckpointRow, RowVersions, SavepointType};
pub use invariants::validate_checkpoint_row;
