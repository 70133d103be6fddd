//! End-to-end batch tests.

use caseload_core::{
    allocator::{Policy, SelectionRule},
    case::CaseRow,
    config::{BatchSettings, EngineConfig},
    engine::AssignmentEngine,
    error::AssignError,
    roster::{ListInterpretation, Roster, StaffMember, Tier},
    snapshot::WorkloadSnapshot,
};
use std::collections::BTreeMap;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn two_person_engine(policy: &str) -> AssignmentEngine {
    let roster = Roster::from_members(vec![
        StaffMember::new("A", Tier::Senior, Vec::<String>::new()),
        StaffMember::new("B", Tier::Senior, ["Grief and Loss"]),
    ])
    .unwrap();
    let config = EngineConfig::default_test()
        .with_roster(roster)
        .with_settings(BatchSettings::default().with_policy(policy));
    AssignmentEngine::new(config)
}

#[test]
fn grieving_case_goes_to_unrestricted_member() {
    init_logging();
    let engine = two_person_engine("Exclusion-Based");
    let rows = vec![CaseRow::with_description("Case 1", 5.0, "I am grieving")];

    let outcome = engine.run_batch(&rows, None).unwrap();
    assert_eq!(outcome.decisions.len(), 1);
    let d = &outcome.decisions[0];
    assert_eq!(d.case_types.as_slice(), ["Grief and Loss"]);
    assert_eq!(d.staff_id, "A");
    assert!(d.reasoning.contains("Excluded due to case-type restrictions (Grief and Loss): B."),
        "{}", d.reasoning);

    let expected: BTreeMap<String, u32> =
        [("A".to_string(), 1), ("B".to_string(), 0)].into_iter().collect();
    assert_eq!(outcome.snapshot.ongoing_cases, expected);
}

#[test]
fn zero_selected_staff_is_fatal_before_processing() {
    let config = EngineConfig::default_test().with_roster(
        Roster::from_members(vec![StaffMember::new("A", Tier::Senior, Vec::<String>::new())]).unwrap(),
    );
    let engine = AssignmentEngine::new(
        config.with_settings(BatchSettings::default().with_tiers(&["Junior"])),
    );
    let rows = vec![CaseRow::with_description("Case 1", 1.0, "anything")];

    match engine.run_batch(&rows, None) {
        Err(AssignError::NoStaffSelected { tiers }) => assert_eq!(tiers, "Junior"),
        other => panic!("expected NoStaffSelected, got {other:?}"),
    }
}

#[test]
fn empty_tier_selection_is_fatal() {
    let engine = AssignmentEngine::new(
        EngineConfig::default_test()
            .with_settings(BatchSettings::default().with_tiers::<&str>(&[])),
    );
    let err = engine.run_batch(&[], None).unwrap_err();
    assert!(matches!(err, AssignError::NoStaffSelected { .. }));
    assert!(err.is_batch_fatal());
}

#[test]
fn unknown_policy_is_fatal() {
    let engine = two_person_engine("coin_flip");
    let rows = vec![CaseRow::with_description("Case 1", 1.0, "anything")];
    let err = engine.run_batch(&rows, None).unwrap_err();
    assert!(matches!(err, AssignError::UnknownPolicy { .. }), "{err}");
}

#[test]
fn expertise_policy_with_exclusion_lists_is_fatal() {
    let settings = BatchSettings::default()
        .with_policy("expertise_match")
        .with_interpretation(ListInterpretation::Exclusions);
    let engine = AssignmentEngine::new(EngineConfig::default_test().with_settings(settings));
    let err = engine.run_batch(&[], None).unwrap_err();
    assert!(matches!(err, AssignError::PolicyMismatch { .. }), "{err}");
}

#[test]
fn malformed_record_is_skipped_not_fatal() {
    let engine = two_person_engine("fewest_ongoing");
    let rows = vec![
        CaseRow::with_description("Case 1", 3.0, "stress at work"),
        CaseRow {
            name: Some("Case 2".into()),
            priority: Some(2.0),
            ..CaseRow::default()
        },
        CaseRow::with_description("Case 3", 1.0, "feeling low"),
    ];

    let outcome = engine.run_batch(&rows, None).unwrap();
    let names: Vec<&str> = outcome.decisions.iter().map(|d| d.case_name.as_str()).collect();
    assert_eq!(names, ["Case 1", "Case 3"]);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].index, 1);
    assert_eq!(outcome.skipped[0].name, "Case 2");
    assert!(outcome.skipped[0].reason.contains("case description"));
}

#[test]
fn workload_carries_between_cases_in_a_batch() {
    let engine = two_person_engine("fewest_ongoing");
    let rows: Vec<CaseRow> = (0..4)
        .map(|i| CaseRow::with_description(&format!("Case {i}"), 1.0, "stress at work"))
        .collect();
    let outcome = engine.run_batch(&rows, None).unwrap();
    let picks: Vec<&str> = outcome.decisions.iter().map(|d| d.staff_id.as_str()).collect();
    assert_eq!(picks, ["A", "B", "A", "B"]);
    assert_eq!(outcome.snapshot.assignment_counts["A"], 2);
    assert_eq!(outcome.snapshot.assignment_counts["B"], 2);
}

#[test]
fn initial_snapshot_seeds_ongoing_counts() {
    let engine = two_person_engine("fewest_ongoing");
    let mut ongoing = BTreeMap::new();
    ongoing.insert("A".to_string(), 4);
    ongoing.insert("B".to_string(), 1);
    let initial = WorkloadSnapshot {
        batch_id: "prior".into(),
        taken_at: chrono::Utc::now(),
        ongoing_cases: ongoing,
        assignment_counts: BTreeMap::new(),
    };
    let rows = vec![CaseRow::with_description("Case 1", 1.0, "stress at work")];

    let outcome = engine.run_batch(&rows, Some(&initial)).unwrap();
    assert_eq!(outcome.decisions[0].staff_id, "B");
    assert_eq!(outcome.snapshot.ongoing_cases["B"], 2);
    assert_eq!(outcome.snapshot.ongoing_cases["A"], 4);
    assert_eq!(outcome.snapshot.assignment_counts["A"], 0, "batch counts start at zero");
}

#[test]
fn everyone_excluded_falls_back_with_flagged_reasoning() {
    let roster = Roster::from_members(vec![
        StaffMember::new("A", Tier::Senior, ["Work"]),
        StaffMember::new("B", Tier::Junior, ["Work"]),
        StaffMember::new("C", Tier::Junior, ["Work"]),
    ])
    .unwrap();
    let engine = AssignmentEngine::new(EngineConfig::default_test().with_roster(roster));
    let rows = vec![CaseRow::with_description("Case 1", 1.0, "trouble in the workplace")];

    let outcome = engine.run_batch(&rows, None).unwrap();
    let d = &outcome.decisions[0];
    assert!(["A", "B", "C"].contains(&d.staff_id.as_str()));
    assert_eq!(d.rule, SelectionRule::Fallback);
    assert!(d.reasoning.contains("FALLBACK"), "{}", d.reasoning);
}

#[test]
fn pre_assigned_case_types_are_used_verbatim() {
    let engine = two_person_engine("fewest_ongoing");
    let rows = vec![CaseRow::with_case_type("Case 1", 1.0, "Grief and Loss, Work")];
    let outcome = engine.run_batch(&rows, None).unwrap();
    let d = &outcome.decisions[0];
    assert_eq!(d.case_types.as_slice(), ["Grief and Loss", "Work"]);
    assert_eq!(d.staff_id, "A");
}

#[test]
fn expertise_policy_on_built_in_team() {
    let settings = BatchSettings::default().with_policy("Expertise-Based");
    let engine = AssignmentEngine::new(EngineConfig::default_test().with_settings(settings));
    let rows = vec![
        CaseRow::with_case_type("Case 1", 9.0, "Body Image"),
        CaseRow::with_case_type("Case 2", 8.0, "Work"),
        CaseRow::with_case_type("Case 3", 7.0, "Work"),
    ];

    let outcome = engine.run_batch(&rows, None).unwrap();
    assert_eq!(outcome.policy, Policy::ExpertiseMatch);
    assert_eq!(outcome.interpretation, ListInterpretation::Expertise);

    let first = &outcome.decisions[0];
    assert_eq!(first.staff_id, "Zhengqin");
    assert!(first.reasoning.contains("best match"), "{}", first.reasoning);

    // Every other member lists Work; rotation starts at Haikel.
    assert_eq!(outcome.decisions[1].staff_id, "Haikel");
    assert_eq!(outcome.decisions[2].staff_id, "Kirsty");
    assert!(outcome.decisions[1].reasoning.contains("Possible alternatives: Kirsty"),
        "{}", outcome.decisions[1].reasoning);
}

#[test]
fn expertise_policy_without_match_lists_roster_alternatives() {
    let settings = BatchSettings::default().with_policy("Expertise-Based");
    let engine = AssignmentEngine::new(EngineConfig::default_test().with_settings(settings));
    let rows = vec![CaseRow::with_case_type("Case 1", 1.0, "Family")];

    let outcome = engine.run_batch(&rows, None).unwrap();
    let d = &outcome.decisions[0];
    assert_eq!(d.rule, SelectionRule::NoExpertiseRandom);
    assert!(d.reasoning.contains("no matching expertise"), "{}", d.reasoning);
    assert!(d.reasoning.contains("Possible alternatives: "), "{}", d.reasoning);
    assert!(!d.reasoning.contains(&format!("alternatives: {},", d.staff_id)),
        "{}", d.reasoning);
}

#[test]
fn round_robin_onto_restricted_member_is_explained() {
    let engine = two_person_engine("round_robin");
    let rows = vec![
        CaseRow::with_description("Case 1", 2.0, "I am grieving"),
        CaseRow::with_description("Case 2", 1.0, "I am grieving"),
    ];

    let outcome = engine.run_batch(&rows, None).unwrap();
    assert_eq!(outcome.decisions[0].staff_id, "A");
    let d = &outcome.decisions[1];
    assert_eq!(d.staff_id, "B");
    assert_eq!(d.rule, SelectionRule::RoundRobin);
    assert!(d.reasoning.contains("does not apply case-type restrictions"), "{}", d.reasoning);
    assert!(d.reasoning.contains("Possible alternatives: A."), "{}", d.reasoning);
}

#[test]
fn built_in_team_read_as_exclusions_leaves_one_member_for_work() {
    let engine = AssignmentEngine::build_test();
    let rows: Vec<CaseRow> = (0..3)
        .map(|i| CaseRow::with_case_type(&format!("Case {i}"), 1.0, "Work"))
        .collect();

    let outcome = engine.run_batch(&rows, None).unwrap();
    assert_eq!(outcome.interpretation, ListInterpretation::Exclusions);
    for d in &outcome.decisions {
        assert_eq!(d.staff_id, "Zhengqin");
        assert!(d.reasoning.contains("No other eligible staff were available."),
            "{}", d.reasoning);
    }
}

#[test]
fn tier_filter_limits_active_roster() {
    let settings = BatchSettings::default()
        .with_policy("round_robin")
        .with_tiers(&["Junior"]);
    let engine = AssignmentEngine::new(EngineConfig::default_test().with_settings(settings));
    let rows: Vec<CaseRow> = (0..4)
        .map(|i| CaseRow::with_description(&format!("Case {i}"), 1.0, "hello"))
        .collect();
    let outcome = engine.run_batch(&rows, None).unwrap();
    let picks: Vec<&str> = outcome.decisions.iter().map(|d| d.staff_id.as_str()).collect();
    assert_eq!(picks, ["Oliver", "Janice", "Andrew", "Oliver"]);
}

#[test]
fn snapshot_json_feeds_next_batch() {
    let engine = two_person_engine("fewest_ongoing");
    let rows = vec![CaseRow::with_description("Case 1", 1.0, "hello")];
    let first = engine.run_batch(&rows, None).unwrap();

    let json = first.snapshot.to_json().unwrap();
    let restored = WorkloadSnapshot::from_json(&json).unwrap();
    assert_eq!(restored, first.snapshot);

    let second = engine.run_batch(&rows, Some(&restored)).unwrap();
    assert_eq!(second.decisions[0].staff_id, "B", "A already carries one case");
    assert_ne!(second.batch_id, first.batch_id);
}
