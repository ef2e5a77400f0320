//! Missing-fact selection and readiness assessment.
//!
//! Both are pure functions of a case type's fact schedule and the facts
//! gathered so far.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::knowledge::{CaseTypeKnowledge, FactDefinition, Priority};

/// Facts still worth asking about, critical first.
///
/// A fact is skipped when already gathered, or when its follow-up condition
/// references a fact that is absent or whose value differs (case-insensitive).
/// Ties keep catalog order.
pub fn missing_facts<'a>(
    knowledge: &'a CaseTypeKnowledge,
    gathered: &BTreeMap<String, Value>,
) -> Vec<&'a FactDefinition> {
    let mut missing: Vec<&FactDefinition> = knowledge
        .facts
        .iter()
        .filter(|fact| !gathered.contains_key(&fact.key))
        .filter(|fact| follow_up_satisfied(fact, gathered))
        .collect();
    // sort_by_key is stable.
    missing.sort_by_key(|fact| fact.priority);
    missing
}

fn follow_up_satisfied(fact: &FactDefinition, gathered: &BTreeMap<String, Value>) -> bool {
    fact.follow_up_condition
        .iter()
        .all(|(key, required)| match gathered.get(key) {
            Some(actual) if !actual.is_null() => {
                fact_text(actual).to_lowercase() == required.to_lowercase()
            }
            _ => false,
        })
}

/// Render a fact value the way it is shown to the oracle and compared.
pub fn fact_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// How far the interview has progressed through the fact schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Readiness {
    /// Some unconditional priority-1 facts are missing.
    GatheringCritical,
    /// Priority-1 complete, some unconditional priority-2 facts missing.
    GatheringImportant,
    /// Priority-1 and priority-2 complete.
    Complete,
}

impl Readiness {
    /// Status line injected into the fact-gathering prompt.
    pub fn status(self) -> &'static str {
        match self {
            Self::Complete => {
                "STATUS: All critical and important facts are gathered. \
                 Ask if there's anything else they want to add, then set \
                 ready_for_report to true."
            }
            Self::GatheringImportant => {
                "STATUS: All critical facts gathered. \
                 Continue with important (priority 2) questions."
            }
            Self::GatheringCritical => "STATUS: Still gathering critical facts.",
        }
    }

    /// Whether every unconditional critical fact is known.
    pub fn critical_complete(self) -> bool {
        !matches!(self, Self::GatheringCritical)
    }
}

/// Assess progress from unconditional priority-1 and priority-2 facts.
///
/// Advisory only: the oracle decides the per-turn readiness flag.
pub fn assess_readiness(
    knowledge: &CaseTypeKnowledge,
    gathered: &BTreeMap<String, Value>,
) -> Readiness {
    let tier_done = |priority: Priority| {
        knowledge
            .facts
            .iter()
            .filter(|fact| fact.priority == priority && !fact.is_follow_up())
            .all(|fact| gathered.contains_key(&fact.key))
    };

    match (tier_done(Priority::Critical), tier_done(Priority::Important)) {
        (true, true) => Readiness::Complete,
        (true, false) => Readiness::GatheringImportant,
        _ => Readiness::GatheringCritical,
    }
}
