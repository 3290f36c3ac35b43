// src/domain/resolution/value_objects.rs
//
// Resolution Value Objects
//
// Pure, immutable data describing how checkpoint conflicts are resolved and
// what came out of it.
//
// CRITICAL INVARIANTS:
// - No side effects
// - No I/O operations
// - Clone + Debug + Serialize for traceability

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// DIRECTION
// ============================================================================

/// Bulk policy applied to every conflicted row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionDirection {
    /// Newest checkpoint wins and becomes the saved (incomplete) row
    TakeNewest,

    /// All checkpoints are discarded; the last committed version wins
    TakeOldest,
}

impl ResolutionDirection {
    pub fn label(&self) -> &'static str {
        match self {
            ResolutionDirection::TakeNewest => "Take all newest",
            ResolutionDirection::TakeOldest => "Take all oldest",
        }
    }

    /// Accepts `newest` / `oldest` (case-insensitive)
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "newest" | "take_newest" => Some(ResolutionDirection::TakeNewest),
            "oldest" | "take_oldest" => Some(ResolutionDirection::TakeOldest),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResolutionDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionDirection::TakeNewest => write!(f, "take_newest"),
            ResolutionDirection::TakeOldest => write!(f, "take_oldest"),
        }
    }
}

// ============================================================================
// ROW OUTCOMES
// ============================================================================

/// Why a row was left in its prior state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Row is in a server sync conflict; bulk policy does not apply
    SyncConflict,

    /// Row no longer has checkpoints (resolved elsewhere)
    NoCheckpoints,

    /// Storage failed while resolving this row
    Failed(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::SyncConflict => write!(f, "row is in a sync conflict"),
            SkipReason::NoCheckpoints => write!(f, "row has no checkpoints"),
            SkipReason::Failed(msg) => write!(f, "resolution failed: {}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowResolution {
    Resolved,
    Skipped(SkipReason),
}

impl RowResolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, RowResolution::Resolved)
    }
}

// ============================================================================
// LIST ENTRY
// ============================================================================

/// One unresolved row as shown in the resolution list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveRowEntry {
    pub row_id: String,
    pub display_name: String,
    pub checkpoint_count: usize,
    pub newest_savepoint: Option<DateTime<Utc>>,
}

impl ResolveRowEntry {
    pub fn new(row_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            row_id: row_id.into(),
            display_name: display_name.into(),
            checkpoint_count: 0,
            newest_savepoint: None,
        }
    }
}

impl std::fmt::Display for ResolveRowEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name)?;
        if self.display_name != self.row_id {
            write!(f, " ({})", self.row_id)?;
        }
        Ok(())
    }
}

// ============================================================================
// SUMMARY
// ============================================================================

/// Final outcome of a bulk resolution task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionSummary {
    pub task_id: Uuid,
    pub table_id: String,
    pub direction: ResolutionDirection,
    pub total: usize,
    pub resolved: usize,
    pub skipped: usize,
}

impl ResolutionSummary {
    pub fn new(task_id: Uuid, table_id: impl Into<String>, direction: ResolutionDirection) -> Self {
        Self {
            task_id,
            table_id: table_id.into(),
            direction,
            total: 0,
            resolved: 0,
            skipped: 0,
        }
    }

    pub fn record(&mut self, outcome: &RowResolution) {
        self.total += 1;
        if outcome.is_resolved() {
            self.resolved += 1;
        } else {
            self.skipped += 1;
        }
    }

    /// Human-readable result. Empty when nothing was attempted.
    pub fn message(&self) -> String {
        if self.total == 0 {
            return String::new();
        }
        format!(
            "{}: {} resolved, {} skipped",
            self.direction.label(),
            self.resolved,
            self.skipped
        )
    }
}
