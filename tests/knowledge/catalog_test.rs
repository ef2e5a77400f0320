//! Built-in catalog consistency.

use std::collections::HashSet;

use lawlord::knowledge::{texas_dwi, texas_parking, KnowledgeCatalog, Priority};

#[test]
fn builtin_catalog_is_ordered() {
    let catalog = KnowledgeCatalog::builtin();
    let ids: Vec<&str> = catalog.iter().map(|k| k.case_type.as_str()).collect();
    assert_eq!(ids, vec!["dwi", "parking_ticket"]);
    assert_eq!(catalog.len(), 2);
    assert!(catalog.contains("dwi"));
    assert!(catalog.get("burglary").is_none());
}

#[test]
fn duplicate_case_types_keep_first_entry() {
    let mut shadow = texas_parking();
    shadow.case_type = "dwi".to_owned();
    shadow.display_name = "Shadow".to_owned();

    let catalog = KnowledgeCatalog::new(vec![texas_dwi(), shadow]);
    assert_eq!(catalog.len(), 1);
    assert_eq!(
        catalog.get("dwi").map(|k| k.display_name.as_str()),
        Some("Driving While Intoxicated (DWI)")
    );
}

#[test]
fn fact_keys_are_unique_per_case_type() {
    for knowledge in KnowledgeCatalog::builtin().iter() {
        let mut seen = HashSet::new();
        for fact in &knowledge.facts {
            assert!(
                seen.insert(fact.key.as_str()),
                "{} repeats fact {}",
                knowledge.case_type,
                fact.key
            );
        }
    }
}

#[test]
fn follow_up_conditions_reference_known_facts() {
    for knowledge in KnowledgeCatalog::builtin().iter() {
        let keys: HashSet<&str> = knowledge.facts.iter().map(|f| f.key.as_str()).collect();
        for fact in knowledge.facts.iter().filter(|f| f.is_follow_up()) {
            for referenced in fact.follow_up_condition.keys() {
                assert!(
                    keys.contains(referenced.as_str()),
                    "{} follow-up {} references unknown fact {referenced}",
                    knowledge.case_type,
                    fact.key
                );
            }
        }
    }
}

#[test]
fn defenses_require_known_facts() {
    for knowledge in KnowledgeCatalog::builtin().iter() {
        let keys: HashSet<&str> = knowledge.facts.iter().map(|f| f.key.as_str()).collect();
        for defense in &knowledge.defenses {
            for required in &defense.required_facts {
                assert!(
                    keys.contains(required.as_str()),
                    "{} defense '{}' requires unknown fact {required}",
                    knowledge.case_type,
                    defense.name
                );
            }
        }
    }
}

#[test]
fn every_case_type_has_critical_facts_and_signals() {
    for knowledge in KnowledgeCatalog::builtin().iter() {
        assert!(knowledge
            .facts
            .iter()
            .any(|f| f.priority == Priority::Critical && !f.is_follow_up()));
        assert!(!knowledge.offense_levels.is_empty());
        assert!(!knowledge.take_signals.is_empty());
        assert!(!knowledge.pass_signals.is_empty());
        assert!(!knowledge.review_signals.is_empty());
        assert!(!knowledge.keywords.is_empty());
    }
}

#[test]
fn priorities_order_critical_first() {
    assert!(Priority::Critical < Priority::Important);
    assert!(Priority::Important < Priority::Helpful);
    assert_eq!(Priority::Helpful.to_string(), "3");
}
