//! Configurable rules layered over the oracle's per-turn output.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::knowledge::CaseTypeKnowledge;

use super::facts::assess_readiness;

/// What to do when the oracle proposes a different case type after one is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReclassificationPolicy {
    /// Keep the first case type that cleared the threshold.
    #[default]
    Lock,
    /// Adopt any later proposal that clears the threshold.
    AllowOverride,
}

impl ReclassificationPolicy {
    /// Whether an above-threshold proposal replaces the current case type.
    ///
    /// Re-proposing the current case type is always adopted so its
    /// confidence is refreshed.
    pub fn adopts(self, current: Option<&str>, proposed: &str) -> bool {
        match current {
            None => true,
            Some(current) if current == proposed => true,
            Some(_) => self == Self::AllowOverride,
        }
    }
}

/// Whether the oracle's readiness flag is verified before finalizing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessGuard {
    /// Honour the oracle's flag as-is.
    #[default]
    TrustOracle,
    /// Require every unconditional priority-1 fact before finalizing.
    RequireCritical,
}

impl ReadinessGuard {
    /// Whether an oracle readiness signal is accepted.
    ///
    /// `knowledge` is `None` while the session is unclassified.
    pub fn accepts(
        self,
        knowledge: Option<&CaseTypeKnowledge>,
        gathered: &BTreeMap<String, Value>,
    ) -> bool {
        match self {
            Self::TrustOracle => true,
            Self::RequireCritical => knowledge
                .is_some_and(|k| assess_readiness(k, gathered).critical_complete()),
        }
    }
}
