//! Missing-fact selection and readiness assessment.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use lawlord::intake::facts::fact_text;
use lawlord::intake::{assess_readiness, missing_facts, Readiness};
use lawlord::knowledge::{
    texas_dwi, CaseTypeKnowledge, FactCategory, FactDefinition, Priority,
};

fn facts(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), v.clone()))
        .collect()
}

fn keys(knowledge: &CaseTypeKnowledge, gathered: &BTreeMap<String, Value>) -> Vec<String> {
    missing_facts(knowledge, gathered)
        .into_iter()
        .map(|f| f.key.clone())
        .collect()
}

/// Two P1 facts, one P2 fact, one P3 fact and one conditional P1 fact.
fn small_schedule() -> CaseTypeKnowledge {
    let mut knowledge = texas_dwi();
    knowledge.facts = vec![
        FactDefinition::new("helpful", "?", Priority::Helpful, FactCategory::Context),
        FactDefinition::new("critical_a", "?", Priority::Critical, FactCategory::Classification),
        FactDefinition::new("important", "?", Priority::Important, FactCategory::Procedural),
        FactDefinition::new("critical_b", "?", Priority::Critical, FactCategory::Severity),
        FactDefinition::new("conditional", "?", Priority::Critical, FactCategory::Severity)
            .when("critical_a", "yes"),
    ];
    knowledge
}

#[test]
fn missing_facts_sorted_by_priority_with_stable_ties() {
    let knowledge = small_schedule();
    let missing = keys(&knowledge, &BTreeMap::new());
    assert_eq!(missing, vec!["critical_a", "critical_b", "important", "helpful"]);
}

#[test]
fn gathered_facts_are_excluded() {
    let knowledge = small_schedule();
    let gathered = facts(&[("critical_b", json!("x")), ("helpful", json!(true))]);
    let missing = keys(&knowledge, &gathered);
    assert_eq!(missing, vec!["critical_a", "important"]);
}

#[test]
fn follow_up_requires_matching_value_case_insensitive() {
    let knowledge = small_schedule();

    let absent = keys(&knowledge, &BTreeMap::new());
    assert!(!absent.contains(&"conditional".to_owned()));

    let mismatch = keys(&knowledge, &facts(&[("critical_a", json!("no"))]));
    assert!(!mismatch.contains(&"conditional".to_owned()));

    let matched = keys(&knowledge, &facts(&[("critical_a", json!("YES"))]));
    assert_eq!(matched.first().map(String::as_str), Some("critical_b"));
    assert!(matched.contains(&"conditional".to_owned()));
}

#[test]
fn dwi_breath_follow_up_appears_only_after_breath_test() {
    let knowledge = texas_dwi();

    let before = keys(&knowledge, &BTreeMap::new());
    assert!(!before.contains(&"bac_result".to_owned()));

    let blood = keys(&knowledge, &facts(&[("chemical_test", json!("blood"))]));
    assert!(!blood.contains(&"bac_result".to_owned()));
    assert!(blood.contains(&"blood_warrant".to_owned()));

    let breath = keys(&knowledge, &facts(&[("chemical_test", json!("Breath"))]));
    assert!(breath.contains(&"bac_result".to_owned()));
}

#[test]
fn missing_facts_is_idempotent() {
    let knowledge = texas_dwi();
    let gathered = facts(&[("arrest_date", json!("Friday")), ("chemical_test", json!("breath"))]);
    assert_eq!(keys(&knowledge, &gathered), keys(&knowledge, &gathered));
}

#[test]
fn readiness_tiers_follow_gathered_priorities() {
    let knowledge = small_schedule();

    let none = assess_readiness(&knowledge, &BTreeMap::new());
    assert_eq!(none, Readiness::GatheringCritical);
    assert_eq!(none.status(), "STATUS: Still gathering critical facts.");

    let p1 = facts(&[("critical_a", json!("no")), ("critical_b", json!(1))]);
    let important = assess_readiness(&knowledge, &p1);
    assert_eq!(important, Readiness::GatheringImportant);
    assert!(important.status().contains("priority 2"));

    let mut all = p1.clone();
    all.insert("important".to_owned(), json!("done"));
    let complete = assess_readiness(&knowledge, &all);
    assert_eq!(complete, Readiness::Complete);
    assert!(complete.status().contains("ready_for_report to true"));
}

#[test]
fn conditional_facts_do_not_block_readiness() {
    let knowledge = small_schedule();
    let gathered = facts(&[
        ("critical_a", json!("yes")),
        ("critical_b", json!("x")),
        ("important", json!("y")),
    ]);
    assert_eq!(assess_readiness(&knowledge, &gathered), Readiness::Complete);
}

#[test]
fn fact_text_renders_strings_raw() {
    assert_eq!(fact_text(&json!("breath")), "breath");
    assert_eq!(fact_text(&json!(0.12)), "0.12");
    assert_eq!(fact_text(&json!(true)), "true");
}
