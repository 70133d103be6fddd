//! The assignment engine: one batch of pending cases in, decisions out.
//!
//! PIPELINE (per case, fixed order):
//!   1. Validate the row      (malformed rows are skipped, not fatal)
//!   2. Case types            (classifier or pre-assigned list)
//!   3. Resolve               (excluded / eligible / expertise matches)
//!   4. Allocate              (policy pick, state updated)
//!   5. Explain               (reasoning string)
//!
//! RULES:
//!   - Every batch-fatal check runs before the first case is touched.
//!   - Cases are processed strictly in the order given; each allocation
//!     sees the state left by the previous one.
//!   - All randomness flows through the allocator's seeded streams.

use crate::{
    allocator::{AllocationState, Allocator, Policy, SelectionRule},
    case::{CaseRecord, CaseRow, SkippedRecord},
    classifier::CaseTypes,
    config::{EngineConfig, ResolvedSettings},
    error::{AssignError, AssignResult},
    reasoning::{explain, ReasoningContext},
    resolver::{resolve_for, Resolution},
    roster::{ListInterpretation, StaffMember},
    snapshot::WorkloadSnapshot,
    types::{BatchId, StaffId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One assignment. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentDecision {
    pub staff_id: StaffId,
    pub case_name: String,
    pub priority: f64,
    pub case_types: CaseTypes,
    pub rule: SelectionRule,
    pub reasoning: String,
}

impl AssignmentDecision {
    pub fn is_fallback(&self) -> bool {
        self.rule.is_fallback()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub batch_id: BatchId,
    pub started_at: DateTime<Utc>,
    pub policy: Policy,
    pub interpretation: ListInterpretation,
    /// In processing order.
    pub decisions: Vec<AssignmentDecision>,
    pub skipped: Vec<SkippedRecord>,
    /// Final counters, ready to persist and feed into the next batch.
    pub snapshot: WorkloadSnapshot,
}

impl BatchOutcome {
    pub fn decision_for(&self, case_name: &str) -> Option<&AssignmentDecision> {
        self.decisions.iter().find(|d| d.case_name == case_name)
    }
}

pub struct AssignmentEngine {
    pub config: EngineConfig,
}

/// Live state for the batch in progress. Owned by exactly one run.
struct Batch<'a> {
    config: &'a EngineConfig,
    settings: ResolvedSettings,
    active: Vec<StaffMember>,
    allocator: Allocator,
    state: AllocationState,
}

impl AssignmentEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Engine over the built-in team and phrase table.
    pub fn build_test() -> Self {
        Self::new(EngineConfig::default_test())
    }

    /// Case types for one record, whichever input shape it uses.
    pub fn case_types_for(&self, record: &CaseRecord) -> CaseTypes {
        record.source.case_types(&self.config.case_type_map)
    }

    /// Run one batch. `initial` seeds the ongoing-case counters; without it
    /// every active member starts at zero.
    pub fn run_batch(
        &self,
        rows: &[CaseRow],
        initial: Option<&WorkloadSnapshot>,
    ) -> AssignResult<BatchOutcome> {
        let batch_id = uuid::Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let mut batch = self.start_batch(initial)?;

        log::info!(
            "batch {batch_id}: {} case(s), policy={}, lists={}, {} active staff",
            rows.len(),
            batch.settings.policy.key(),
            batch.settings.interpretation,
            batch.active.len(),
        );

        let mut decisions = Vec::with_capacity(rows.len());
        let mut skipped = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            let record = match row.validate(index) {
                Ok(record) => record,
                Err(err @ AssignError::MalformedCaseRecord { .. }) => {
                    log::warn!("batch {batch_id}: skipping record: {err}");
                    skipped.push(SkippedRecord {
                        index,
                        name: row.name.clone().unwrap_or_else(|| format!("row {index}")),
                        reason: err.to_string(),
                    });
                    continue;
                }
                Err(err) => return Err(err),
            };
            decisions.push(batch.decide(&record)?);
        }

        let fallbacks = decisions.iter().filter(|d| d.is_fallback()).count();
        log::info!(
            "batch {batch_id}: assigned={} skipped={} fallbacks={fallbacks}",
            decisions.len(),
            skipped.len(),
        );

        Ok(BatchOutcome {
            snapshot: WorkloadSnapshot::capture(batch_id.clone(), &batch.state),
            batch_id,
            started_at,
            policy: batch.settings.policy,
            interpretation: batch.settings.interpretation,
            decisions,
            skipped,
        })
    }

    /// All batch-fatal checks live here: policy, tiers, list reading,
    /// and a non-empty active roster.
    fn start_batch(&self, initial: Option<&WorkloadSnapshot>) -> AssignResult<Batch<'_>> {
        let settings = self.config.settings.resolve()?;
        let active = self.config.roster.active_subset(&settings.tiers);
        if active.is_empty() {
            return Err(AssignError::NoStaffSelected {
                tiers: self.config.settings.tiers.join(", "),
            });
        }
        let allocator = Allocator::new(settings.policy, &active, settings.seed)?;

        let mut state = match initial {
            Some(snapshot) => AllocationState::with_ongoing(snapshot.ongoing_cases.clone()),
            None => AllocationState::new(),
        };
        state.register_staff(active.iter().map(|m| &m.id));

        Ok(Batch {
            config: &self.config,
            settings,
            active,
            allocator,
            state,
        })
    }
}

impl Batch<'_> {
    fn decide(&mut self, record: &CaseRecord) -> AssignResult<AssignmentDecision> {
        let case_types = record.source.case_types(&self.config.case_type_map);
        let resolution: Resolution =
            resolve_for(&case_types, &self.active, self.settings.interpretation);
        let selection = self.allocator.assign(&resolution, &mut self.state)?;

        let reasoning = explain(&ReasoningContext {
            assigned: &selection.staff_id,
            policy: self.settings.policy,
            rule: &selection.rule,
            case_types: &case_types,
            excluded: &resolution.excluded,
            eligible: &resolution.eligible,
            active: self.allocator.active(),
            matched: &resolution.matched,
        });
        log::debug!(
            "case '{}' (priority {}) -> {}",
            record.name,
            record.priority,
            selection.staff_id
        );

        Ok(AssignmentDecision {
            staff_id: selection.staff_id,
            case_name: record.name.clone(),
            priority: record.priority,
            case_types,
            rule: selection.rule,
            reasoning,
        })
    }
}
