//! Static legal knowledge driving the interview.
//!
//! Each [`CaseTypeKnowledge`] lists the facts an attorney needs (with
//! priority and optional follow-up conditions), the offense tiers, the known
//! defenses, and the signals used to recommend taking or passing on a case.
//! The data is pure: behaviour over it lives in [`crate::intake`].

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

mod texas_dwi;
mod texas_parking;

pub use texas_dwi::texas_dwi;
pub use texas_parking::texas_parking;

/// How much a fact matters to the evaluation. Lower sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Must be known before a report is useful.
    Critical = 1,
    /// Materially changes the evaluation.
    Important = 2,
    /// Nice to have.
    Helpful = 3,
}

impl Priority {
    /// Numeric tier (1 = critical).
    pub fn number(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// What a fact is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FactCategory {
    /// Determines which offense tier applies.
    Classification,
    /// Supports or rules out a defense.
    Defense,
    /// Aggravates or mitigates exposure.
    Severity,
    /// Deadlines, venue and paperwork.
    Procedural,
    /// Background about the caller.
    Context,
}

/// One datum the interview tries to collect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactDefinition {
    /// Unique key within the case type.
    pub key: String,
    /// Question the oracle should ask to obtain it.
    pub question: String,
    /// Importance tier.
    pub priority: Priority,
    /// Purpose of the fact.
    pub category: FactCategory,
    /// Other facts' required values (case-insensitive) before this one is asked.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub follow_up_condition: BTreeMap<String, String>,
    /// Enumerated answers, when the fact is categorical.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl FactDefinition {
    /// Unconditional fact with no enumerated options.
    pub fn new(key: &str, question: &str, priority: Priority, category: FactCategory) -> Self {
        Self {
            key: key.to_owned(),
            question: question.to_owned(),
            priority,
            category,
            follow_up_condition: BTreeMap::new(),
            options: Vec::new(),
        }
    }

    /// Only ask once `key` has been gathered with `value`.
    #[must_use]
    pub fn when(mut self, key: &str, value: &str) -> Self {
        self.follow_up_condition
            .insert(key.to_owned(), value.to_owned());
        self
    }

    /// Restrict answers to a fixed set.
    #[must_use]
    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| (*o).to_owned()).collect();
        self
    }

    /// Whether the fact depends on another fact's value.
    pub fn is_follow_up(&self) -> bool {
        !self.follow_up_condition.is_empty()
    }
}

/// A statutory severity tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OffenseLevel {
    /// Offense name.
    pub name: String,
    /// Statutory classification (e.g. "Class B Misdemeanor").
    pub classification: String,
    /// Jail or prison range.
    pub jail_range: String,
    /// Fine range.
    pub fine_range: String,
    /// Effect on the caller's driver's license, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_impact: Option<String>,
    /// When this tier applies, if not the base case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<String>,
}

impl OffenseLevel {
    fn new(name: &str, classification: &str, jail_range: &str, fine_range: &str) -> Self {
        Self {
            name: name.to_owned(),
            classification: classification.to_owned(),
            jail_range: jail_range.to_owned(),
            fine_range: fine_range.to_owned(),
            license_impact: None,
            conditions: None,
        }
    }

    fn license(mut self, impact: &str) -> Self {
        self.license_impact = Some(impact.to_owned());
        self
    }

    fn when(mut self, conditions: &str) -> Self {
        self.conditions = Some(conditions.to_owned());
        self
    }
}

/// Rough strength of a defense when its facts are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DefenseStrength {
    /// Often dispositive.
    Strong,
    /// Useful leverage.
    Moderate,
    /// Rarely decisive.
    Weak,
}

impl fmt::Display for DefenseStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Strong => "strong",
            Self::Moderate => "moderate",
            Self::Weak => "weak",
        })
    }
}

/// A known defense for a case type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Defense {
    /// Defense name.
    pub name: String,
    /// What the defense argues.
    pub description: String,
    /// How strong it tends to be.
    pub strength: DefenseStrength,
    /// Fact keys needed to invoke it.
    pub required_facts: Vec<String>,
}

impl Defense {
    fn new(name: &str, description: &str, strength: DefenseStrength, required: &[&str]) -> Self {
        Self {
            name: name.to_owned(),
            description: description.to_owned(),
            strength,
            required_facts: required.iter().map(|f| (*f).to_owned()).collect(),
        }
    }
}

/// Everything the engine knows about one case type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseTypeKnowledge {
    /// Identifier returned by the oracle (e.g. "dwi").
    pub case_type: String,
    /// Human-readable name.
    pub display_name: String,
    /// Governing jurisdiction.
    pub jurisdiction: String,
    /// Short description of the matter.
    pub description: String,
    /// Governing statutes.
    pub statutes: Vec<String>,
    /// Fact schedule, in catalog order.
    pub facts: Vec<FactDefinition>,
    /// Severity tiers.
    pub offense_levels: Vec<OffenseLevel>,
    /// Known defenses.
    pub defenses: Vec<Defense>,
    /// Conditions favoring taking the case.
    pub take_signals: Vec<String>,
    /// Conditions favoring passing on the case.
    pub pass_signals: Vec<String>,
    /// Conditions requiring attorney review.
    pub review_signals: Vec<String>,
    /// Words that suggest this case type in a caller's description.
    pub keywords: Vec<String>,
}

/// Ordered collection of case types with lookup by identifier.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeCatalog {
    entries: Vec<CaseTypeKnowledge>,
}

impl KnowledgeCatalog {
    /// Build a catalog; later entries with a duplicate identifier are dropped.
    pub fn new(entries: Vec<CaseTypeKnowledge>) -> Self {
        let mut unique: Vec<CaseTypeKnowledge> = Vec::with_capacity(entries.len());
        for entry in entries {
            if unique.iter().any(|e| e.case_type == entry.case_type) {
                tracing::warn!(case_type = %entry.case_type, "duplicate case type ignored");
                continue;
            }
            unique.push(entry);
        }
        Self { entries: unique }
    }

    /// The built-in Texas catalog.
    pub fn builtin() -> Self {
        Self::new(vec![texas_dwi(), texas_parking()])
    }

    /// Look up a case type by identifier.
    pub fn get(&self, case_type: &str) -> Option<&CaseTypeKnowledge> {
        self.entries.iter().find(|e| e.case_type == case_type)
    }

    /// Whether `case_type` is known.
    pub fn contains(&self, case_type: &str) -> bool {
        self.get(case_type).is_some()
    }

    /// Case types in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &CaseTypeKnowledge> {
        self.entries.iter()
    }

    /// Number of case types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}
