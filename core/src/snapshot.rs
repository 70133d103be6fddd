//! Workload snapshot serialization: allocation counters to/from JSON.
//!
//! The engine keeps no state between batches. A snapshot taken at the end
//! of one batch can be persisted by the caller and passed back as the
//! initial workload of the next.

use crate::{
    allocator::AllocationState,
    error::AssignResult,
    types::{BatchId, StaffId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadSnapshot {
    pub batch_id: BatchId,
    pub taken_at: DateTime<Utc>,
    pub ongoing_cases: BTreeMap<StaffId, u32>,
    /// Cases assigned during the batch that produced this snapshot.
    #[serde(default)]
    pub assignment_counts: BTreeMap<StaffId, u32>,
}

impl WorkloadSnapshot {
    pub fn capture(batch_id: BatchId, state: &AllocationState) -> Self {
        Self {
            batch_id,
            taken_at: Utc::now(),
            ongoing_cases: state.ongoing_cases.clone(),
            assignment_counts: state.assignment_counts.clone(),
        }
    }

    pub fn to_json(&self) -> AssignResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> AssignResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
