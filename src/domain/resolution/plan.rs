// src/domain/resolution/plan.rs
//
// Decides what happens to the stored versions of one row under a bulk policy.
// Pure function; the repository applies the plan inside a transaction.

use chrono::{DateTime, Utc};

use super::value_objects::{ResolutionDirection, SkipReason};
use crate::domain::checkpoint::RowVersions;

#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionPlan {
    Skip(SkipReason),
    Apply {
        /// Version promoted to the saved (incomplete) row, if any
        promote: Option<DateTime<Utc>>,
        /// Versions removed
        delete: Vec<DateTime<Utc>>,
    },
}

pub fn plan_row_resolution(versions: &RowVersions, direction: ResolutionDirection) -> ResolutionPlan {
    if versions.has_sync_conflict() {
        return ResolutionPlan::Skip(SkipReason::SyncConflict);
    }

    let newest = match versions.newest_checkpoint() {
        Some(newest) => newest.savepoint_timestamp,
        None => return ResolutionPlan::Skip(SkipReason::NoCheckpoints),
    };

    match direction {
        ResolutionDirection::TakeNewest => {
            let delete = versions
                .committed
                .iter()
                .chain(versions.checkpoints.iter())
                .map(|v| v.savepoint_timestamp)
                .filter(|ts| *ts != newest)
                .collect();

            ResolutionPlan::Apply {
                promote: Some(newest),
                delete,
            }
        }
        ResolutionDirection::TakeOldest => ResolutionPlan::Apply {
            promote: None,
            delete: versions
                .checkpoints
                .iter()
                .map(|c| c.savepoint_timestamp)
                .collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::checkpoint::{CheckpointRow, SavepointType};
    use chrono::TimeZone;
    use serde_json::json;

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, minute, 0).unwrap()
    }

    fn row_with_two_checkpoints() -> RowVersions {
        RowVersions::from_versions(
            "r1",
            vec![
                CheckpointRow::committed("t", "r1", ts(0), SavepointType::Complete, json!({"v": 0})),
                CheckpointRow::checkpoint("t", "r1", ts(1), json!({"v": 1})),
                CheckpointRow::checkpoint("t", "r1", ts(2), json!({"v": 2})),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_take_newest_promotes_latest_and_drops_the_rest() {
        let plan = plan_row_resolution(&row_with_two_checkpoints(), ResolutionDirection::TakeNewest);
        assert_eq!(
            plan,
            ResolutionPlan::Apply {
                promote: Some(ts(2)),
                delete: vec![ts(0), ts(1)],
            }
        );
    }

    #[test]
    fn test_take_oldest_drops_only_checkpoints() {
        let plan = plan_row_resolution(&row_with_two_checkpoints(), ResolutionDirection::TakeOldest);
        assert_eq!(
            plan,
            ResolutionPlan::Apply {
                promote: None,
                delete: vec![ts(1), ts(2)],
            }
        );
    }

    #[test]
    fn test_sync_conflict_is_skipped() {
        let versions = RowVersions::from_versions(
            "r1",
            vec![
                CheckpointRow::committed("t", "r1", ts(0), SavepointType::Complete, json!({}))
                    .with_conflict_type(1),
                CheckpointRow::checkpoint("t", "r1", ts(1), json!({})),
            ],
        )
        .unwrap();

        assert_eq!(
            plan_row_resolution(&versions, ResolutionDirection::TakeNewest),
            ResolutionPlan::Skip(SkipReason::SyncConflict)
        );
    }

    #[test]
    fn test_no_checkpoints_is_skipped() {
        let versions = RowVersions::from_versions(
            "r1",
            vec![CheckpointRow::committed("t", "r1", ts(0), SavepointType::Complete, json!({}))],
        )
        .unwrap();

        assert_eq!(
            plan_row_resolution(&versions, ResolutionDirection::TakeOldest),
            ResolutionPlan::Skip(SkipReason::NoCheckpoints)
        );
    }
}
