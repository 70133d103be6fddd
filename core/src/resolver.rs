//! Exclusion resolver: split the active roster into excluded and eligible
//! members for one case, and find expertise matches when lists are read as
//! expertise.

use crate::{
    classifier::CaseTypes,
    roster::{ListInterpretation, StaffMember},
    types::StaffId,
};
use serde::{Deserialize, Serialize};

/// Per-case view of the active roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Members barred by a case-type restriction, in roster order.
    pub excluded: Vec<StaffId>,
    /// Active roster minus `excluded`, in roster order.
    pub eligible: Vec<StaffId>,
    /// Members whose declared expertise covers a case type, in roster order.
    /// Always empty under the exclusion interpretation.
    pub matched: Vec<StaffId>,
}

impl Resolution {
    pub fn is_excluded(&self, id: &str) -> bool {
        self.excluded.iter().any(|e| e == id)
    }

    pub fn is_eligible(&self, id: &str) -> bool {
        self.eligible.iter().any(|e| e == id)
    }
}

/// A member is excluded iff their exclusion list intersects `case_types`.
pub fn resolve(case_types: &CaseTypes, active: &[StaffMember]) -> (Vec<StaffId>, Vec<StaffId>) {
    let (excluded, eligible): (Vec<&StaffMember>, Vec<&StaffMember>) =
        active.iter().partition(|m| m.lists_any(case_types));
    (
        excluded.into_iter().map(|m| m.id.clone()).collect(),
        eligible.into_iter().map(|m| m.id.clone()).collect(),
    )
}

/// Members whose expertise list shares at least one label with `case_types`.
pub fn match_expertise(case_types: &CaseTypes, active: &[StaffMember]) -> Vec<StaffId> {
    active
        .iter()
        .filter(|m| m.lists_any(case_types))
        .map(|m| m.id.clone())
        .collect()
}

/// Resolve under the batch's list interpretation. Expertise lists never
/// exclude anyone.
pub fn resolve_for(
    case_types: &CaseTypes,
    active: &[StaffMember],
    interpretation: ListInterpretation,
) -> Resolution {
    match interpretation {
        ListInterpretation::Exclusions => {
            let (excluded, eligible) = resolve(case_types, active);
            Resolution {
                excluded,
                eligible,
                matched: Vec::new(),
            }
        }
        ListInterpretation::Expertise => Resolution {
            excluded: Vec::new(),
            eligible: active.iter().map(|m| m.id.clone()).collect(),
            matched: match_expertise(case_types, active),
        },
    }
}
