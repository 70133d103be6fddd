use crate::{
    allocator::Policy,
    classifier::{CaseTypeMap, CaseTypeMapFile},
    error::AssignResult,
    roster::{parse_tiers, ListInterpretation, Roster, Tier},
};
use serde::{Deserialize, Serialize};

/// Per-run choices made by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSettings {
    /// Policy key or label, parsed at batch start.
    pub policy: String,
    /// Tier names to include in the active roster.
    pub tiers: Vec<String>,
    /// Seed for every random pick in the batch.
    pub seed: u64,
    /// Overrides the policy's default reading of roster lists.
    #[serde(default)]
    pub interpretation: Option<ListInterpretation>,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            policy: Policy::FewestOngoing.key().to_string(),
            tiers: Tier::ALL.iter().map(|t| t.as_str().to_string()).collect(),
            seed: 42,
            interpretation: None,
        }
    }
}

/// Settings after every batch-fatal check has passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    pub policy: Policy,
    pub tiers: Vec<Tier>,
    pub interpretation: ListInterpretation,
    pub seed: u64,
}

impl BatchSettings {
    pub fn with_policy(mut self, policy: &str) -> Self {
        self.policy = policy.to_string();
        self
    }

    pub fn with_tiers<S: AsRef<str>>(mut self, tiers: &[S]) -> Self {
        self.tiers = tiers.iter().map(|t| t.as_ref().to_string()).collect();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_interpretation(mut self, interpretation: ListInterpretation) -> Self {
        self.interpretation = Some(interpretation);
        self
    }

    /// Fails with UnknownPolicy, UnknownTier or PolicyMismatch.
    pub fn resolve(&self) -> AssignResult<ResolvedSettings> {
        let policy = Policy::parse(&self.policy)?;
        let tiers = parse_tiers(&self.tiers[..])?;
        let interpretation = self
            .interpretation
            .unwrap_or_else(|| policy.default_interpretation());
        policy.check_interpretation(interpretation)?;
        Ok(ResolvedSettings {
            policy,
            tiers,
            interpretation,
            seed: self.seed,
        })
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub roster: Roster,
    pub case_type_map: CaseTypeMap,
    pub settings: BatchSettings,
}

impl EngineConfig {
    /// Load from the data/ directory.
    /// In tests, use EngineConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let roster_path = format!("{data_dir}/roster.json");
        let roster_content = std::fs::read_to_string(&roster_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {roster_path}: {e}"))?;
        let roster_value: serde_json::Value = serde_json::from_str(&roster_content)?;
        let roster = Roster::from_json_value(&roster_value)
            .map_err(|e| anyhow::anyhow!("Invalid roster in {roster_path}: {e}"))?;

        let map_path = format!("{data_dir}/case_type_map.json");
        let map_content = std::fs::read_to_string(&map_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {map_path}: {e}"))?;
        let map_file: CaseTypeMapFile = serde_json::from_str(&map_content)?;

        log::info!(
            "config: loaded {} staff and {} phrases from {data_dir}",
            roster.len(),
            map_file.phrases.len()
        );

        Ok(Self {
            roster,
            case_type_map: CaseTypeMap::new(map_file.phrases),
            settings: BatchSettings::default(),
        })
    }

    /// Config with the built-in team and phrase table, for unit tests.
    pub fn default_test() -> Self {
        Self {
            roster: Roster::default_team(),
            case_type_map: CaseTypeMap::default_map(),
            settings: BatchSettings::default(),
        }
    }

    pub fn with_roster(mut self, roster: Roster) -> Self {
        self.roster = roster;
        self
    }

    pub fn with_settings(mut self, settings: BatchSettings) -> Self {
        self.settings = settings;
        self
    }
}
