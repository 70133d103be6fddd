//! Human-readable justification for one assignment.

use crate::{
    allocator::{Policy, SelectionRule},
    classifier::CaseTypes,
    types::StaffId,
};

/// Everything the explanation depends on. Borrowed from the decision
/// pipeline; building one has no side effects.
#[derive(Debug, Clone, Copy)]
pub struct ReasoningContext<'a> {
    pub assigned: &'a str,
    pub policy: Policy,
    pub rule: &'a SelectionRule,
    pub case_types: &'a CaseTypes,
    pub excluded: &'a [StaffId],
    pub eligible: &'a [StaffId],
    /// Full active roster; the pool for picks that ignore eligibility.
    pub active: &'a [StaffId],
    /// Expertise matches; only meaningful under ExpertiseMatch.
    pub matched: &'a [StaffId],
}

impl ReasoningContext<'_> {
    /// Members the allocator could have picked instead.
    fn alternatives(&self) -> Vec<&str> {
        let pool = match self.rule {
            SelectionRule::ExpertiseMatch => self.matched,
            SelectionRule::RoundRobin | SelectionRule::NoExpertiseRandom => self.active,
            _ => self.eligible,
        };
        pool.iter()
            .map(String::as_str)
            .filter(|id| *id != self.assigned)
            .collect()
    }
}

pub fn explain(ctx: &ReasoningContext<'_>) -> String {
    let mut parts = vec![rule_sentence(ctx)];

    if let SelectionRule::FewestOngoing {
        passed_over: Some(last),
        ..
    } = ctx.rule
    {
        parts.push(format!(
            "{last} was passed over to avoid assigning them back-to-back."
        ));
    }

    if matches!(ctx.rule, SelectionRule::RoundRobin)
        && ctx.excluded.iter().any(|e| e == ctx.assigned)
    {
        parts.push(format!(
            "Round-robin does not apply case-type restrictions, so {} was assigned despite their restriction on {}.",
            ctx.assigned,
            ctx.case_types.joined()
        ));
    }

    if ctx.excluded.is_empty() {
        parts.push("No staff were excluded.".to_string());
    } else {
        parts.push(format!(
            "Excluded due to case-type restrictions ({}): {}.",
            ctx.case_types.joined(),
            ctx.excluded.join(", ")
        ));
    }

    let alternatives = ctx.alternatives();
    if ctx.rule.is_fallback() || alternatives.is_empty() {
        parts.push("No other eligible staff were available.".to_string());
    } else {
        parts.push(format!("Possible alternatives: {}.", alternatives.join(", ")));
    }

    parts.join(" ")
}

fn rule_sentence(ctx: &ReasoningContext<'_>) -> String {
    let who = ctx.assigned;
    match ctx.rule {
        SelectionRule::FewestOngoing { ongoing, .. } => format!(
            "{who} was chosen because they had the fewest ongoing cases ({ongoing}) among eligible staff."
        ),
        SelectionRule::RoundRobin => {
            format!("{who} was next in the round-robin rotation.")
        }
        SelectionRule::Random => format!("{who} was randomly selected."),
        SelectionRule::ExpertiseMatch => {
            if ctx.alternatives().is_empty() {
                format!("{who} was chosen because they are the best match.")
            } else {
                format!("{who} was chosen because their expertise matches the case type(s).")
            }
        }
        SelectionRule::NoExpertiseRandom => {
            format!("{who} was randomly selected as no matching expertise was found.")
        }
        SelectionRule::Fallback => format!(
            "FALLBACK: every staff member is excluded for this case under {}, so {who} was randomly selected from the full active roster.",
            ctx.policy.label()
        ),
    }
}
