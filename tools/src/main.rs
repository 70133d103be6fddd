//! assign-runner: headless batch runner for the case assignment engine.
//!
//! Usage:
//!   assign-runner --cases cases.json --policy fewest_ongoing --seed 42
//!   assign-runner --data-dir ./data --cases cases.json --tiers Senior,Junior \
//!                 --statuses YES --workload last.json --save-workload next.json

use anyhow::{Context, Result};
use caseload_core::{
    case::CaseRow,
    config::{BatchSettings, EngineConfig},
    engine::{AssignmentEngine, BatchOutcome},
    intake::{pending_cases, status_options, DEFAULT_STATUS},
    snapshot::WorkloadSnapshot,
};
use std::env;

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum CasesFile {
    Wrapped { cases: Vec<CaseRow> },
    Bare(Vec<CaseRow>),
}

impl CasesFile {
    fn into_rows(self) -> Vec<CaseRow> {
        match self {
            Self::Wrapped { cases } => cases,
            Self::Bare(rows) => rows,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let data_dir = flag_value(&args, "--data-dir").unwrap_or("./data");
    let cases_path = flag_value(&args, "--cases").unwrap_or("./data/cases.json");
    let policy = flag_value(&args, "--policy").unwrap_or("fewest_ongoing");
    let tiers: Vec<String> = flag_value(&args, "--tiers")
        .unwrap_or("Leadership,Senior,Junior")
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    let statuses: Vec<String> = flag_value(&args, "--statuses")
        .unwrap_or(DEFAULT_STATUS)
        .split(',')
        .map(|s| s.trim().to_string())
        .collect();
    let workload_in = flag_value(&args, "--workload");
    let workload_out = flag_value(&args, "--save-workload");

    println!("Case Assigner: assign-runner");
    println!("  data_dir:  {data_dir}");
    println!("  cases:     {cases_path}");
    println!("  policy:    {policy}");
    println!("  tiers:     {}", tiers.join(", "));
    println!("  statuses:  {}", statuses.join(", "));
    println!("  seed:      {seed}");
    println!();

    let settings = BatchSettings::default()
        .with_policy(policy)
        .with_tiers(&tiers[..])
        .with_seed(seed);
    let config = EngineConfig::load(data_dir)?.with_settings(settings);
    let engine = AssignmentEngine::new(config);

    let content = std::fs::read_to_string(cases_path)
        .with_context(|| format!("Cannot read {cases_path}"))?;
    let rows = serde_json::from_str::<CasesFile>(&content)?.into_rows();
    log::info!(
        "loaded {} row(s); status options: {}",
        rows.len(),
        status_options(&rows).join(", ")
    );

    let pending = pending_cases(&rows, &statuses[..]);
    if pending.is_empty() {
        println!("No pending cases match the selected statuses.");
        return Ok(());
    }

    let initial = match workload_in {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Cannot read {path}"))?;
            Some(WorkloadSnapshot::from_json(&json)?)
        }
        None => None,
    };

    let outcome = engine.run_batch(&pending, initial.as_ref())?;
    print_outcome(&outcome);

    if let Some(path) = workload_out {
        std::fs::write(path, outcome.snapshot.to_json()?)
            .with_context(|| format!("Cannot write {path}"))?;
        println!();
        println!("Workload snapshot written to {path}");
    }

    Ok(())
}

fn print_outcome(outcome: &BatchOutcome) {
    println!("=== ASSIGNMENTS ({}) ===", outcome.policy);
    for d in &outcome.decisions {
        println!(
            "Case '{}' assigned to {} (Priority: {}) [{}]",
            d.case_name,
            d.staff_id,
            d.priority,
            d.case_types.joined()
        );
        println!("  Reasoning: {}", d.reasoning);
    }

    if !outcome.skipped.is_empty() {
        println!();
        println!("=== SKIPPED ({}) ===", outcome.skipped.len());
        for s in &outcome.skipped {
            println!("  #{} {}: {}", s.index, s.name, s.reason);
        }
    }

    println!();
    println!("=== WORKLOAD ===");
    println!("  {:<12} {:>8} {:>8}", "staff", "ongoing", "batch");
    for (id, ongoing) in &outcome.snapshot.ongoing_cases {
        let assigned = outcome.snapshot.assignment_counts.get(id).copied().unwrap_or(0);
        println!("  {id:<12} {ongoing:>8} {assigned:>8}");
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
