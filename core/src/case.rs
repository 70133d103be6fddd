//! Case records as handed over by the caller, and their validation.

use crate::{
    classifier::CaseTypeSource,
    error::{AssignError, AssignResult},
};
use serde::{Deserialize, Serialize};

/// One row as it arrives from the caller's tabular source.
/// Every field is optional here; `validate` decides what is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseRow {
    #[serde(default, alias = "Name")]
    pub name: Option<String>,
    #[serde(default, alias = "Priority Score")]
    pub priority: Option<f64>,
    #[serde(default, alias = "Case Description")]
    pub description: Option<String>,
    /// Older schema: comma-separated case types assigned upstream.
    #[serde(default, alias = "Case Type")]
    pub case_type: Option<String>,
    #[serde(default, alias = "Still Pending")]
    pub still_pending: Option<String>,
}

impl CaseRow {
    pub fn with_description(name: &str, priority: f64, description: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            priority: Some(priority),
            description: Some(description.to_string()),
            ..Self::default()
        }
    }

    pub fn with_case_type(name: &str, priority: f64, case_type: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            priority: Some(priority),
            case_type: Some(case_type.to_string()),
            ..Self::default()
        }
    }

    /// Turn a raw row into a record. `index` is the row's position in the
    /// batch and is only used for reporting. A description wins over a
    /// pre-assigned case type when both are present.
    pub fn validate(&self, index: usize) -> AssignResult<CaseRecord> {
        let label = self.name.clone().unwrap_or_else(|| format!("row {index}"));
        let malformed = |field: &'static str| AssignError::MalformedCaseRecord {
            index,
            name: label.clone(),
            field,
        };

        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| malformed("name"))?;
        let priority = self
            .priority
            .filter(|p| p.is_finite())
            .ok_or_else(|| malformed("priority"))?;
        let source = match (non_blank(&self.description), non_blank(&self.case_type)) {
            (Some(text), _) => CaseTypeSource::Description(text.to_string()),
            (None, Some(list)) => CaseTypeSource::PreAssigned(list.to_string()),
            (None, None) => return Err(malformed("case description")),
        };

        Ok(CaseRecord {
            name: name.to_string(),
            priority,
            source,
        })
    }
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.trim().is_empty())
}

/// A validated pending case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub name: String,
    /// Higher is more urgent.
    pub priority: f64,
    pub source: CaseTypeSource,
}

/// A row rejected during a batch, reported alongside the decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub index: usize,
    pub name: String,
    pub reason: String,
}
