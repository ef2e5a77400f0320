//! Final evaluation report and its assembly.
//!
//! [`ReportAssembler::finalize`] runs once a session's readiness has been
//! accepted. It never fails the request: an unclassified session is sent
//! back to intake, an unknown case type yields a stub report, and an
//! unusable oracle reply yields a deterministic `needs_review` report.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::intake::prompt::PromptBuilder;
use crate::intake::session::{IntakeSession, SessionPhase};
use crate::intake::{IntakeError, ProcessResult};
use crate::knowledge::{CaseTypeKnowledge, KnowledgeCatalog};
use crate::oracle::{Oracle, OracleError, REPORT_ROLE};
use crate::providers::Message;

/// Returned when readiness arrives before a case type is locked.
pub const NEED_MORE_DETAIL: &str = "Can you tell me a bit more about what happened?";

/// Returned once the report is attached.
pub const REPORT_READY: &str = "Got it, I have everything I need. An attorney will review your \
                                info and reach out soon. Anything else you want to add?";

const REPORT_REQUEST: &str =
    "Generate the intake report based on the conversation and facts provided in the system prompt.";

/// Overall strength of the caller's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStrength {
    /// Weak.
    Weak,
    /// Moderate.
    Moderate,
    /// Strong.
    Strong,
}

impl CaseStrength {
    fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "weak" => Self::Weak,
            "strong" => Self::Strong,
            _ => Self::Moderate,
        }
    }
}

/// What the firm should do with the matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// Take the case.
    Take,
    /// Decline the case.
    Pass,
    /// An attorney should look before deciding.
    NeedsReview,
}

impl Recommendation {
    fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "take" => Self::Take,
            "pass" => Self::Pass,
            _ => Self::NeedsReview,
        }
    }
}

/// Structured evaluation handed to the attorneys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeReport {
    /// Session the report belongs to.
    pub session_id: String,
    /// Case type identifier.
    pub case_type: String,
    /// Case type display name.
    pub case_type_display: String,
    /// Governing jurisdiction.
    pub jurisdiction: String,
    /// Plain-English summary.
    pub client_summary: String,
    /// Most relevant facts.
    pub key_facts: BTreeMap<String, Value>,
    /// Offense tier that applies.
    pub offense_classification: String,
    /// Penalty range for that tier.
    pub potential_penalties: String,
    /// Defenses supported by the facts.
    pub identified_defenses: Vec<String>,
    /// Factors weakening the case.
    pub red_flags: Vec<String>,
    /// Factors strengthening the case.
    pub green_flags: Vec<String>,
    /// Overall strength.
    pub case_strength: CaseStrength,
    /// Take, pass or review.
    pub recommendation: Recommendation,
    /// Why.
    pub recommendation_reasoning: String,
    /// Suggested follow-ups.
    pub next_steps: Vec<String>,
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
}

impl IntakeReport {
    /// Stub for a session whose case type is missing from the catalog.
    pub fn unclassified(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_owned(),
            case_type: "unknown".to_owned(),
            case_type_display: "Unclassified".to_owned(),
            jurisdiction: "Texas".to_owned(),
            client_summary: "Unable to determine case type from conversation.".to_owned(),
            key_facts: BTreeMap::new(),
            offense_classification: "Unknown".to_owned(),
            potential_penalties: "Unknown".to_owned(),
            identified_defenses: Vec::new(),
            red_flags: vec!["Case type could not be determined".to_owned()],
            green_flags: Vec::new(),
            case_strength: CaseStrength::Weak,
            recommendation: Recommendation::NeedsReview,
            recommendation_reasoning: "Not enough information was gathered to classify the \
                                       case. An attorney should follow up directly."
                .to_owned(),
            next_steps: vec!["Schedule a follow-up call with the potential client".to_owned()],
            generated_at: Utc::now(),
        }
    }

    /// Deterministic report used when the oracle could not evaluate the case.
    pub fn evaluation_failed(session: &IntakeSession, knowledge: &CaseTypeKnowledge) -> Self {
        Self {
            session_id: session.id().to_owned(),
            case_type: knowledge.case_type.clone(),
            case_type_display: knowledge.display_name.clone(),
            jurisdiction: knowledge.jurisdiction.clone(),
            client_summary: format!(
                "Intake completed for a {} matter; automated evaluation was unavailable.",
                knowledge.display_name
            ),
            key_facts: session.facts().clone(),
            offense_classification: "Undetermined".to_owned(),
            potential_penalties: "Undetermined".to_owned(),
            identified_defenses: Vec::new(),
            red_flags: vec!["Automated evaluation could not be generated".to_owned()],
            green_flags: Vec::new(),
            case_strength: CaseStrength::Moderate,
            recommendation: Recommendation::NeedsReview,
            recommendation_reasoning: "The gathered facts are attached but were not evaluated. \
                                       An attorney should review them directly."
                .to_owned(),
            next_steps: vec!["Attorney to review gathered facts and call the client".to_owned()],
            generated_at: Utc::now(),
        }
    }
}

/// Lenient view of the report oracle's JSON.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReportDraft {
    #[serde(deserialize_with = "lenient_text")]
    case_type: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    case_type_display: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    jurisdiction: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    client_summary: Option<String>,
    #[serde(deserialize_with = "lenient_facts")]
    key_facts: BTreeMap<String, Value>,
    #[serde(deserialize_with = "lenient_text")]
    offense_classification: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    potential_penalties: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    identified_defenses: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    red_flags: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    green_flags: Vec<String>,
    #[serde(deserialize_with = "lenient_text")]
    case_strength: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    recommendation: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    recommendation_reasoning: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    next_steps: Vec<String>,
}

impl ReportDraft {
    fn into_report(self, session_id: &str, knowledge: &CaseTypeKnowledge) -> IntakeReport {
        IntakeReport {
            session_id: session_id.to_owned(),
            case_type: self.case_type.unwrap_or_else(|| knowledge.case_type.clone()),
            case_type_display: self
                .case_type_display
                .unwrap_or_else(|| knowledge.display_name.clone()),
            jurisdiction: self
                .jurisdiction
                .unwrap_or_else(|| knowledge.jurisdiction.clone()),
            client_summary: self.client_summary.unwrap_or_default(),
            key_facts: self.key_facts,
            offense_classification: self.offense_classification.unwrap_or_default(),
            potential_penalties: self.potential_penalties.unwrap_or_default(),
            identified_defenses: self.identified_defenses,
            red_flags: self.red_flags,
            green_flags: self.green_flags,
            case_strength: self
                .case_strength
                .as_deref()
                .map_or(CaseStrength::Moderate, CaseStrength::parse_lenient),
            recommendation: self
                .recommendation
                .as_deref()
                .map_or(Recommendation::NeedsReview, Recommendation::parse_lenient),
            recommendation_reasoning: self.recommendation_reasoning.unwrap_or_default(),
            next_steps: self.next_steps,
            generated_at: Utc::now(),
        }
    }
}

fn value_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(value_text(Value::deserialize(deserializer)?))
}

fn lenient_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(value_text).collect(),
        other => value_text(other).into_iter().collect(),
    })
}

fn lenient_facts<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, Value>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map.into_iter().filter(|(_, v)| !v.is_null()).collect(),
        _ => BTreeMap::new(),
    })
}

/// Produces the final report for a session.
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    oracle: Oracle,
    prompts: PromptBuilder,
}

impl ReportAssembler {
    /// Create an assembler sharing the engine's oracle and prompt builder.
    pub fn new(oracle: Oracle, prompts: PromptBuilder) -> Self {
        Self { oracle, prompts }
    }

    /// Finalize a session whose readiness was accepted.
    ///
    /// Does not touch the conversation history.
    pub async fn finalize(
        &self,
        session: &mut IntakeSession,
        catalog: &KnowledgeCatalog,
    ) -> ProcessResult {
        let report = match resolve_knowledge(session, catalog) {
            Err(IntakeError::UnclassifiedCase) => {
                warn!(session_id = %session.id(), "readiness without case type, returning to intake");
                session.set_phase(SessionPhase::Intake);
                return ProcessResult {
                    message: NEED_MORE_DETAIL.to_owned(),
                    case_type: None,
                    ready_for_report: false,
                };
            }
            Err(e) => {
                warn!(session_id = %session.id(), error = %e, "emitting unclassified stub report");
                IntakeReport::unclassified(session.id())
            }
            Ok(knowledge) => self.generate(session, knowledge).await,
        };

        let case_type = session.case_type().map(str::to_owned);
        info!(
            session_id = %session.id(),
            case_type = case_type.as_deref().unwrap_or_default(),
            recommendation = ?report.recommendation,
            "intake report generated"
        );

        if session.attach_report(report).is_err() {
            warn!(session_id = %session.id(), "report already attached, keeping the first");
        }
        session.set_phase(SessionPhase::Complete);

        ProcessResult {
            message: REPORT_READY.to_owned(),
            case_type,
            ready_for_report: true,
        }
    }

    async fn generate(&self, session: &IntakeSession, knowledge: &CaseTypeKnowledge) -> IntakeReport {
        match self.request_draft(session, knowledge).await {
            Ok(draft) => draft.into_report(session.id(), knowledge),
            Err(e) => {
                warn!(session_id = %session.id(), error = %e, "report oracle failed, emitting review report");
                IntakeReport::evaluation_failed(session, knowledge)
            }
        }
    }

    async fn request_draft(
        &self,
        session: &IntakeSession,
        knowledge: &CaseTypeKnowledge,
    ) -> Result<ReportDraft, OracleError> {
        let prompt = self.prompts.report(session, knowledge);
        let draft: ReportDraft = self
            .oracle
            .request_json(
                REPORT_ROLE,
                &prompt,
                vec![Message::user(REPORT_REQUEST)],
                self.oracle.report_max_tokens(),
            )
            .await?;

        if draft.client_summary.is_none() && draft.recommendation.is_none() {
            return Err(OracleError::Malformed(
                "report lacks both client_summary and recommendation".to_owned(),
            ));
        }
        Ok(draft)
    }
}

fn resolve_knowledge<'a>(
    session: &IntakeSession,
    catalog: &'a KnowledgeCatalog,
) -> Result<&'a CaseTypeKnowledge, IntakeError> {
    let case_type = session.case_type().ok_or(IntakeError::UnclassifiedCase)?;
    catalog
        .get(case_type)
        .ok_or_else(|| IntakeError::UnknownCaseType(case_type.to_owned()))
}
