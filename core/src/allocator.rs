//! Allocator: choose one staff member for a case under the batch policy.
//!
//! RULES:
//!   - Empty eligible set => uniform pick over the FULL active roster,
//!     flagged as a fallback. Applies to every policy.
//!   - FewestOngoing drops the last assignee before the minimum search,
//!     unless they are the only eligible member. Ties go to roster order.
//!   - RoundRobin rotates over the full active roster and ignores
//!     exclusions whenever anyone is eligible.
//!   - Every selection bumps ongoing and assignment counters and sets
//!     last_assigned. Nothing else is mutated.

use crate::{
    error::{AssignError, AssignResult},
    resolver::Resolution,
    rng::{AllocatorRng, RngBank, StreamSlot},
    roster::{ListInterpretation, StaffMember},
    types::StaffId,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    FewestOngoing,
    RoundRobin,
    Random,
    ExpertiseMatch,
}

impl Policy {
    pub const ALL: [Policy; 4] = [
        Policy::FewestOngoing,
        Policy::RoundRobin,
        Policy::Random,
        Policy::ExpertiseMatch,
    ];

    /// Accepts the snake_case key or the display label, case-insensitively.
    pub fn parse(name: &str) -> AssignResult<Self> {
        let wanted = name.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.key().eq_ignore_ascii_case(wanted) || p.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AssignError::UnknownPolicy { name: name.to_string() })
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::FewestOngoing  => "fewest_ongoing",
            Self::RoundRobin     => "round_robin",
            Self::Random         => "random",
            Self::ExpertiseMatch => "expertise_match",
        }
    }

    /// Label shown to people choosing a method.
    pub fn label(&self) -> &'static str {
        match self {
            Self::FewestOngoing  => "Exclusion-Based",
            Self::RoundRobin     => "Round Robin",
            Self::Random         => "Random Assignment",
            Self::ExpertiseMatch => "Expertise-Based",
        }
    }

    pub fn default_interpretation(&self) -> ListInterpretation {
        match self {
            Self::ExpertiseMatch => ListInterpretation::Expertise,
            _ => ListInterpretation::Exclusions,
        }
    }

    /// ExpertiseMatch has nothing to match on when lists are exclusions.
    pub fn check_interpretation(&self, interpretation: ListInterpretation) -> AssignResult<()> {
        if *self == Self::ExpertiseMatch && interpretation != ListInterpretation::Expertise {
            return Err(AssignError::PolicyMismatch {
                policy: self.label().to_string(),
                interpretation: interpretation.to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Mutable per-batch workload state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationState {
    pub ongoing_cases: BTreeMap<StaffId, u32>,
    pub assignment_counts: BTreeMap<StaffId, u32>,
    pub last_assigned: Option<StaffId>,
}

impl AllocationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed ongoing counters from a prior snapshot; staff missing from it start at zero.
    pub fn with_ongoing(ongoing_cases: BTreeMap<StaffId, u32>) -> Self {
        Self {
            ongoing_cases,
            ..Self::default()
        }
    }

    pub fn ongoing(&self, id: &str) -> u32 {
        self.ongoing_cases.get(id).copied().unwrap_or(0)
    }

    pub fn assigned(&self, id: &str) -> u32 {
        self.assignment_counts.get(id).copied().unwrap_or(0)
    }

    /// Make sure every active member shows up in both tables, at zero if new.
    pub fn register_staff<'a, I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = &'a StaffId>,
    {
        for id in ids {
            self.ongoing_cases.entry(id.clone()).or_insert(0);
            self.assignment_counts.entry(id.clone()).or_insert(0);
        }
    }

    pub fn record(&mut self, id: &str) {
        // Counters can come from a caller's snapshot; saturate so a huge
        // seed never wraps to look like the least loaded member.
        let ongoing = self.ongoing_cases.entry(id.to_string()).or_insert(0);
        *ongoing = ongoing.saturating_add(1);
        let assigned = self.assignment_counts.entry(id.to_string()).or_insert(0);
        *assigned = assigned.saturating_add(1);
        self.last_assigned = Some(id.to_string());
    }
}

/// The rule that actually produced a selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum SelectionRule {
    FewestOngoing {
        /// Ongoing count of the chosen member before this assignment.
        ongoing: u32,
        /// Last assignee passed over by the anti-repeat rule, if any.
        passed_over: Option<StaffId>,
    },
    RoundRobin,
    Random,
    ExpertiseMatch,
    /// ExpertiseMatch found nobody; random over the full active roster.
    NoExpertiseRandom,
    /// Nobody eligible after exclusions; random over the full active roster.
    Fallback,
}

impl SelectionRule {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub staff_id: StaffId,
    pub rule: SelectionRule,
}

/// Fewest-ongoing pick with the anti-repeat rule. Pure; None only if
/// `eligible` is empty.
pub fn fewest_ongoing(
    eligible: &[StaffId],
    state: &AllocationState,
    last_assigned: Option<&str>,
) -> Option<(StaffId, Option<StaffId>)> {
    let passed_over = last_assigned
        .filter(|last| eligible.len() > 1 && eligible.iter().any(|e| e == last))
        .map(str::to_string);

    // min_by_key returns the first minimum, so ties resolve to roster order.
    eligible
        .iter()
        .filter(|id| passed_over.as_deref() != Some(id.as_str()))
        .min_by_key(|id| state.ongoing(id))
        .map(|id| (id.clone(), passed_over.clone()))
}

pub struct Allocator {
    policy: Policy,
    active: Vec<StaffId>,
    round_robin_index: usize,
    // Keyed by the first matched member of each expertise match.
    expertise_indices: HashMap<StaffId, usize>,
    selection_rng: AllocatorRng,
    fallback_rng: AllocatorRng,
}

impl Allocator {
    /// Fails with NoStaffSelected ("the active roster is empty") when
    /// `active` is empty, so the problem surfaces before any case is processed.
    pub fn new(policy: Policy, active: &[StaffMember], seed: u64) -> AssignResult<Self> {
        if active.is_empty() {
            return Err(AssignError::NoStaffSelected { tiers: String::new() });
        }
        let bank = RngBank::new(seed);
        Ok(Self {
            policy,
            active: active.iter().map(|m| m.id.clone()).collect(),
            round_robin_index: 0,
            expertise_indices: HashMap::new(),
            selection_rng: bank.for_stream(StreamSlot::Selection),
            fallback_rng: bank.for_stream(StreamSlot::Fallback),
        })
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn active(&self) -> &[StaffId] {
        &self.active
    }

    pub fn round_robin_index(&self) -> usize {
        self.round_robin_index
    }

    /// Pick an assignee for one case and record it in `state`.
    pub fn assign(
        &mut self,
        resolution: &Resolution,
        state: &mut AllocationState,
    ) -> AssignResult<Selection> {
        let selection = self.select(resolution, state)?;
        state.record(&selection.staff_id);
        log::debug!(
            "allocator: {} -> {} ({:?})",
            self.policy.key(),
            selection.staff_id,
            selection.rule
        );
        Ok(selection)
    }

    fn select(&mut self, resolution: &Resolution, state: &AllocationState) -> AssignResult<Selection> {
        if resolution.eligible.is_empty() {
            let staff_id = pick_from(&mut self.fallback_rng, &self.active)?;
            log::warn!("allocator: no eligible staff, falling back to {staff_id}");
            return Ok(Selection {
                staff_id,
                rule: SelectionRule::Fallback,
            });
        }

        match self.policy {
            Policy::FewestOngoing => {
                let (staff_id, passed_over) =
                    fewest_ongoing(&resolution.eligible, state, state.last_assigned.as_deref())
                        .ok_or(AssignError::Internal("fewest-ongoing search found nobody"))?;
                let ongoing = state.ongoing(&staff_id);
                Ok(Selection {
                    staff_id,
                    rule: SelectionRule::FewestOngoing { ongoing, passed_over },
                })
            }
            Policy::RoundRobin => {
                let n = self.active.len();
                let staff_id = self.active[self.round_robin_index % n].clone();
                self.round_robin_index = (self.round_robin_index + 1) % n;
                Ok(Selection {
                    staff_id,
                    rule: SelectionRule::RoundRobin,
                })
            }
            Policy::Random => {
                let staff_id = pick_from(&mut self.selection_rng, &resolution.eligible)?;
                Ok(Selection {
                    staff_id,
                    rule: SelectionRule::Random,
                })
            }
            Policy::ExpertiseMatch => {
                let matched = &resolution.matched;
                let Some(key) = matched.first() else {
                    let staff_id = pick_from(&mut self.selection_rng, &self.active)?;
                    return Ok(Selection {
                        staff_id,
                        rule: SelectionRule::NoExpertiseRandom,
                    });
                };
                let index = self.expertise_indices.entry(key.clone()).or_insert(0);
                let staff_id = matched[*index % matched.len()].clone();
                *index += 1;
                Ok(Selection {
                    staff_id,
                    rule: SelectionRule::ExpertiseMatch,
                })
            }
        }
    }
}

fn pick_from(rng: &mut AllocatorRng, pool: &[StaffId]) -> AssignResult<StaffId> {
    rng.pick(pool)
        .cloned()
        .ok_or(AssignError::Internal("random pick from an empty pool"))
}
