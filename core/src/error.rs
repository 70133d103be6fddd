use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssignError {
    /// `tiers` is empty when the allocator is handed an empty roster directly.
    #[error("No staff selected: {}", tier_scope(.tiers))]
    NoStaffSelected { tiers: String },

    #[error("Unknown assignment policy '{name}'")]
    UnknownPolicy { name: String },

    #[error("Unknown tier '{name}' (expected Leadership, Senior or Junior)")]
    UnknownTier { name: String },

    #[error("Policy '{policy}' cannot run with roster lists read as {interpretation}")]
    PolicyMismatch { policy: String, interpretation: String },

    #[error("Duplicate staff identifier '{id}' in roster")]
    DuplicateStaff { id: String },

    #[error("Malformed case record #{index} ({name}): missing {field}")]
    MalformedCaseRecord {
        index: usize,
        name: String,
        field: &'static str,
    },

    #[error("Internal allocator error: {0}")]
    Internal(&'static str),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AssignError {
    /// Batch-fatal errors stop a run before any decision is produced.
    /// Everything else is scoped to a single record.
    pub fn is_batch_fatal(&self) -> bool {
        !matches!(self, Self::MalformedCaseRecord { .. })
    }
}

fn tier_scope(tiers: &str) -> String {
    if tiers.is_empty() {
        "the active roster is empty".to_string()
    } else {
        format!("tiers [{tiers}] contain no staff members")
    }
}

pub type AssignResult<T> = Result<T, AssignError>;
