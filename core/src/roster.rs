//! Roster model: staff grouped into tiers, each carrying a case-type list.
//!
//! The per-member list is structurally the same for both exclusion and
//! expertise semantics. Which reading applies is decided per batch by
//! [`ListInterpretation`]; the roster itself never interprets it.

use crate::{
    error::{AssignError, AssignResult},
    types::{CaseTypeLabel, StaffId},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Leadership,
    Senior,
    Junior,
}

impl Tier {
    /// Display order, which is also roster order.
    pub const ALL: [Tier; 3] = [Tier::Leadership, Tier::Senior, Tier::Junior];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Leadership => "Leadership",
            Self::Senior     => "Senior",
            Self::Junior     => "Junior",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = AssignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tier::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AssignError::UnknownTier { name: s.to_string() })
    }
}

/// How the per-member case-type list is read for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListInterpretation {
    /// Listed case types must NOT be handled by the member.
    Exclusions,
    /// Listed case types are the member's declared expertise.
    Expertise,
}

impl fmt::Display for ListInterpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exclusions => f.write_str("exclusions"),
            Self::Expertise  => f.write_str("expertise"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: StaffId,
    pub tier: Tier,
    pub case_types: BTreeSet<CaseTypeLabel>,
}

impl StaffMember {
    pub fn new<I, S>(id: impl Into<StaffId>, tier: Tier, case_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CaseTypeLabel>,
    {
        Self {
            id: id.into(),
            tier,
            case_types: case_types.into_iter().map(Into::into).collect(),
        }
    }

    /// True if any of `labels` appears in this member's list.
    pub fn lists_any<'a, I>(&self, labels: I) -> bool
    where
        I: IntoIterator<Item = &'a CaseTypeLabel>,
    {
        labels.into_iter().any(|l| self.case_types.contains(l))
    }
}

/// Ordered staff collection. Order is tier order, then insertion order
/// within a tier; it drives every tie-break in the allocator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Roster {
    members: Vec<StaffMember>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from members, rejecting duplicate identifiers across tiers.
    pub fn from_members(members: Vec<StaffMember>) -> AssignResult<Self> {
        let mut roster = Self::new();
        for m in members {
            roster.add(m)?;
        }
        Ok(roster)
    }

    pub fn add(&mut self, member: StaffMember) -> AssignResult<()> {
        if self.get(&member.id).is_some() {
            return Err(AssignError::DuplicateStaff { id: member.id });
        }
        // Keep members grouped by tier: insert after the last member whose
        // tier sorts at or before the newcomer's.
        let pos = self
            .members
            .iter()
            .rposition(|m| m.tier <= member.tier)
            .map_or(0, |i| i + 1);
        self.members.insert(pos, member);
        Ok(())
    }

    /// Parse the nested `tier -> member -> [case types]` mapping.
    /// Member order within a tier follows the source object order.
    pub fn from_json_value(value: &serde_json::Value) -> AssignResult<Self> {
        let tiers = value
            .as_object()
            .ok_or_else(|| anyhow::anyhow!("roster must be an object of tiers"))?;
        let mut roster = Self::new();
        for (tier_name, members) in tiers {
            let tier: Tier = tier_name.parse()?;
            let members = members
                .as_object()
                .ok_or_else(|| anyhow::anyhow!("tier '{tier_name}' must map member names to lists"))?;
            for (member_id, list) in members {
                let case_types: Vec<String> = serde_json::from_value(list.clone())?;
                roster.add(StaffMember::new(member_id.clone(), tier, case_types))?;
            }
        }
        Ok(roster)
    }

    pub fn members(&self) -> &[StaffMember] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&StaffMember> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn tier_members(&self, tier: Tier) -> impl Iterator<Item = &StaffMember> {
        self.members.iter().filter(move |m| m.tier == tier)
    }

    /// Members whose tier is in `tiers`, in roster order.
    pub fn active_subset(&self, tiers: &[Tier]) -> Vec<StaffMember> {
        let wanted: HashSet<Tier> = tiers.iter().copied().collect();
        self.members
            .iter()
            .filter(|m| wanted.contains(&m.tier))
            .cloned()
            .collect()
    }

    /// The built-in team. Its lists are expertise lists, meant for the
    /// Expertise-Based policy. Read as exclusions, every member but
    /// Zhengqin is barred from Work, Anxiety and Depression cases.
    pub fn default_team() -> Self {
        let wad = ["Work", "Anxiety", "Depression"];
        let members = vec![
            StaffMember::new("Haikel",   Tier::Leadership, wad),
            StaffMember::new("Zhengqin", Tier::Leadership, ["Body Image"]),
            StaffMember::new("Kirsty",   Tier::Senior,     wad),
            StaffMember::new("Dominic",  Tier::Senior,     wad),
            StaffMember::new("Jiaying",  Tier::Senior,     wad),
            StaffMember::new("Oliver",   Tier::Junior,     wad),
            StaffMember::new("Janice",   Tier::Junior,     wad),
            StaffMember::new("Andrew",   Tier::Junior,     wad),
        ];
        Self { members }
    }
}

/// Parse a list of tier names, e.g. from a multiselect or a CLI flag.
pub fn parse_tiers<S: AsRef<str>>(names: &[S]) -> AssignResult<Vec<Tier>> {
    names.iter().map(|n| n.as_ref().parse()).collect()
}
