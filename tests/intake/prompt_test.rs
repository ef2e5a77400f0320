//! Prompt rendering.

use std::collections::BTreeMap;

use serde_json::json;

use lawlord::config::{FirmConfig, IntakeConfig};
use lawlord::intake::{IntakeSession, PromptBuilder};
use lawlord::knowledge::{texas_dwi, KnowledgeCatalog};

fn builder() -> PromptBuilder {
    let firm = FirmConfig {
        name: "Smith & Lee".to_owned(),
        practice: "a Houston defense firm".to_owned(),
    };
    PromptBuilder::new(firm, &IntakeConfig::default())
}

fn dwi_session(facts: &[(&str, serde_json::Value)]) -> IntakeSession {
    let mut session = IntakeSession::new();
    session.set_case_type("dwi", 0.9);
    session.merge_facts(
        facts
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect::<BTreeMap<_, _>>(),
    );
    session
}

#[test]
fn greeting_names_the_firm() {
    let greeting = builder().greeting();
    assert!(greeting.starts_with("Hey! I'm the intake assistant for Smith & Lee."));
    assert!(greeting.ends_with("\n\nWhat's going on?"));
}

#[test]
fn classification_lists_every_case_type() {
    let prompt = builder().classification(&KnowledgeCatalog::builtin());
    assert!(prompt.contains("Smith & Lee, a Houston defense firm"));
    assert!(prompt.contains("type key: \"dwi\""));
    assert!(prompt.contains("type key: \"parking_ticket\""));
    assert!(prompt.contains("\"case_type\": \"dwi\" or \"parking_ticket\" or null,"));
    assert!(prompt.contains("\"ready_for_report\": false"));
}

#[test]
fn fact_gathering_shows_none_yet_without_facts() {
    let session = dwi_session(&[]);
    let prompt = builder().fact_gathering(&session, &texas_dwi());
    assert!(prompt.contains("FACTS ALREADY GATHERED:\n  (none yet)"));
    assert!(prompt.contains("STATUS: Still gathering critical facts."));
    assert!(prompt.contains("\"case_type\": \"dwi\""));
}

#[test]
fn fact_gathering_caps_missing_facts() {
    let session = dwi_session(&[("arrest_date", json!("Friday"))]);
    let prompt = builder().fact_gathering(&session, &texas_dwi());

    assert!(prompt.contains("  arrest_date: Friday"));
    assert!(!prompt.contains("[priority 1] arrest_date"));
    assert!(prompt.contains("  [priority 1] prior_dwi_convictions: \""));

    let listed = prompt.lines().filter(|l| l.starts_with("  [priority ")).count();
    assert_eq!(listed, IntakeConfig::default().max_prompt_facts);
}

#[test]
fn fact_gathering_is_deterministic() {
    let session = dwi_session(&[("chemical_test", json!("breath"))]);
    let knowledge = texas_dwi();
    let builder = builder();
    assert_eq!(
        builder.fact_gathering(&session, &knowledge),
        builder.fact_gathering(&session, &knowledge)
    );
}

#[test]
fn report_prompt_truncates_transcript_turns() {
    let mut session = dwi_session(&[("arrest_date", json!("Friday"))]);
    session.push_user(&"a".repeat(500));
    session.push_assistant("Thanks.");

    let prompt = builder().report(&session, &texas_dwi());
    let user_line = prompt
        .lines()
        .find(|l| l.starts_with("  USER: "))
        .expect("transcript should include the user turn");
    assert_eq!(user_line.len(), "  USER: ".len() + 300);
    assert!(prompt.contains("  ASSISTANT: Thanks."));
    assert!(prompt.contains("\"arrest_date\": \"Friday\""));
    assert!(prompt.contains("SIGNALS: TAKE THE CASE:"));
    assert!(prompt.contains("\"recommendation\": \"take\" or \"pass\" or \"needs_review\""));
}
