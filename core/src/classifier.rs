//! Case classifier: free-text description -> case-type labels.
//!
//! Matching is verbatim, case-insensitive substring search over an ordered
//! phrase table. No stemming, no fuzzy matching. Pure function of the
//! table and the input.

use crate::types::{CaseTypeLabel, MISCELLANEOUS};
use serde::{Deserialize, Serialize};

/// One row of the phrase table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseRule {
    pub phrase: String,
    pub case_type: CaseTypeLabel,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CaseTypeMapFile {
    pub phrases: Vec<PhraseRule>,
}

/// Ordered phrase -> label table. Loaded once, never mutated during a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CaseTypeMap {
    rules: Vec<PhraseRule>,
    // Lowercased phrases, index-aligned with `rules`.
    #[serde(skip)]
    folded: Vec<String>,
}

impl CaseTypeMap {
    pub fn new(rules: Vec<PhraseRule>) -> Self {
        let folded = rules.iter().map(|r| r.phrase.to_lowercase()).collect();
        Self { rules, folded }
    }

    pub fn from_pairs<I, P, L>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (P, L)>,
        P: Into<String>,
        L: Into<CaseTypeLabel>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(p, l)| PhraseRule {
                    phrase: p.into(),
                    case_type: l.into(),
                })
                .collect(),
        )
    }

    pub fn rules(&self) -> &[PhraseRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Labels for every phrase found in `description`, in table order,
    /// duplicates collapsed. Never empty: falls back to Miscellaneous.
    pub fn classify(&self, description: &str) -> CaseTypes {
        let haystack = description.to_lowercase();
        let mut types = CaseTypes::default();
        for (rule, phrase) in self.rules.iter().zip(&self.folded) {
            if !phrase.is_empty() && haystack.contains(phrase.as_str()) {
                types.insert(rule.case_type.clone());
            }
        }
        if types.is_empty() {
            types.insert(MISCELLANEOUS.to_string());
        }
        types
    }

    /// Built-in survey phrase table.
    pub fn default_map() -> Self {
        Self::from_pairs([
            ("grieving",             "Grief and Loss"),
            ("passed away",          "Grief and Loss"),
            ("lost a loved one",     "Grief and Loss"),
            ("bereave",              "Grief and Loss"),
            ("my job",               "Work"),
            ("workplace",            "Work"),
            ("stress at work",       "Work"),
            ("my boss",              "Work"),
            ("anxious",              "Anxiety"),
            ("anxiety",              "Anxiety"),
            ("panic",                "Anxiety"),
            ("depressed",            "Depression"),
            ("feeling low",          "Depression"),
            ("hopeless",             "Depression"),
            ("body image",           "Body Image"),
            ("my weight",            "Body Image"),
            ("my appearance",        "Body Image"),
            ("relationship",         "Relationships"),
            ("breakup",              "Relationships"),
            ("family",               "Family"),
            ("my parents",           "Family"),
            ("school",               "Academic"),
            ("exams",                "Academic"),
        ])
    }
}

/// Ordered, duplicate-free set of case-type labels for one case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseTypes(Vec<CaseTypeLabel>);

impl CaseTypes {
    /// Returns false if the label was already present.
    pub fn insert(&mut self, label: CaseTypeLabel) -> bool {
        if self.0.contains(&label) {
            return false;
        }
        self.0.push(label);
        true
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|l| l == label)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CaseTypeLabel> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[CaseTypeLabel] {
        &self.0
    }

    /// Comma-joined, the same shape a pre-assigned case-type column uses.
    pub fn joined(&self) -> String {
        self.0.join(", ")
    }
}

impl<'a> IntoIterator for &'a CaseTypes {
    type Item = &'a CaseTypeLabel;
    type IntoIter = std::slice::Iter<'a, CaseTypeLabel>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<S: Into<CaseTypeLabel>> FromIterator<S> for CaseTypes {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut types = CaseTypes::default();
        for label in iter {
            types.insert(label.into());
        }
        types
    }
}

/// Where a case's types come from: a free-text description to classify,
/// or a comma-separated list already assigned upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CaseTypeSource {
    Description(String),
    PreAssigned(String),
}

impl CaseTypeSource {
    /// The single entry point for "case types for this case".
    pub fn case_types(&self, map: &CaseTypeMap) -> CaseTypes {
        match self {
            Self::Description(text) => map.classify(text),
            Self::PreAssigned(list) => split_pre_assigned(list),
        }
    }
}

/// Split on commas and trim each entry. Entries are passed through
/// unchanged otherwise; empty entries are dropped.
fn split_pre_assigned(list: &str) -> CaseTypes {
    let types: CaseTypes = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if types.is_empty() {
        return std::iter::once(MISCELLANEOUS).collect();
    }
    types
}
