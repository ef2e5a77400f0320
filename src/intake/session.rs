//! Per-caller interview state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::providers::Message;
use crate::report::IntakeReport;

/// Where a session is in the interview lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Allocated, greeting not yet sent.
    Greeting,
    /// Classifying and gathering facts.
    Intake,
    /// Readiness accepted, report being assembled.
    GeneratingReport,
    /// Report attached; no further questions.
    Complete,
}

/// One interview instance.
///
/// Mutation goes through methods that keep the history append-only, never
/// store null facts, and attach at most one report.
#[derive(Debug, Clone, Serialize)]
pub struct IntakeSession {
    id: String,
    phase: SessionPhase,
    case_type: Option<String>,
    case_type_confidence: f64,
    gathered_facts: BTreeMap<String, Value>,
    history: Vec<Message>,
    report: Option<IntakeReport>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Default for IntakeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl IntakeSession {
    /// Allocate a session with a fresh v4 identifier in the greeting phase.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            phase: SessionPhase::Greeting,
            case_type: None,
            case_type_confidence: 0.0,
            gathered_facts: BTreeMap::new(),
            history: Vec::new(),
            report: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Session identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Locked case type, if classification has succeeded.
    pub fn case_type(&self) -> Option<&str> {
        self.case_type.as_deref()
    }

    /// Confidence reported when the case type was set.
    pub fn case_type_confidence(&self) -> f64 {
        self.case_type_confidence
    }

    /// Facts gathered so far, keyed by fact key.
    pub fn facts(&self) -> &BTreeMap<String, Value> {
        &self.gathered_facts
    }

    /// Conversation turns in order.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Final report, once generated.
    pub fn report(&self) -> Option<&IntakeReport> {
        self.report.as_ref()
    }

    /// Creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time of the last mutation.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Move to another lifecycle phase.
    pub fn set_phase(&mut self, phase: SessionPhase) {
        self.phase = phase;
        self.touch();
    }

    /// Append a caller turn.
    pub fn push_user(&mut self, text: &str) {
        self.history.push(Message::user(text));
        self.touch();
    }

    /// Append an assistant turn.
    pub fn push_assistant(&mut self, text: &str) {
        self.history.push(Message::assistant(text));
        self.touch();
    }

    /// Merge extracted facts; null values are dropped, others overwrite.
    ///
    /// Returns the number of facts written.
    pub fn merge_facts(&mut self, extracted: BTreeMap<String, Value>) -> usize {
        let mut written = 0_usize;
        for (key, value) in extracted {
            if value.is_null() {
                continue;
            }
            self.gathered_facts.insert(key, value);
            written = written.saturating_add(1);
        }
        if written > 0 {
            self.touch();
        }
        written
    }

    /// Set the case type and the confidence it was classified with.
    pub fn set_case_type(&mut self, case_type: &str, confidence: f64) {
        self.case_type = Some(case_type.to_owned());
        self.case_type_confidence = confidence;
        self.touch();
    }

    /// Attach the final report. A second report is refused and returned.
    ///
    /// # Errors
    ///
    /// Returns the rejected report when one is already attached.
    pub fn attach_report(&mut self, report: IntakeReport) -> Result<(), Box<IntakeReport>> {
        if self.report.is_some() {
            return Err(Box::new(report));
        }
        self.report = Some(report);
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
