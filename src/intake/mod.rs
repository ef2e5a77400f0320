//! Intake session engine.
//!
//! Drives one interview per session: classify the matter, gather the facts
//! its schedule asks for, and hand off to [`ReportAssembler`] once the
//! oracle signals readiness.
//!
//! ```text
//! start() -> intake --(ready accepted)--> generating_report --> complete
//!               ^                               |
//!               +-------(no case type)----------+
//! ```

pub mod facts;
pub mod policy;
pub mod prompt;
pub mod session;
pub mod store;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::knowledge::KnowledgeCatalog;
use crate::oracle::Oracle;
use crate::report::{IntakeReport, ReportAssembler};

pub use facts::{assess_readiness, missing_facts, Readiness};
pub use policy::{ReadinessGuard, ReclassificationPolicy};
pub use prompt::{PromptBuilder, PROMPT_VERSION};
pub use session::{IntakeSession, SessionPhase};
pub use store::{SessionStore, SharedSession};

/// Reply to any message on a completed session.
pub const CLOSING_MESSAGE: &str = "You're all set. An attorney will be in touch soon.";

/// Errors surfaced by the engine.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    /// No session is registered under the id.
    #[error("Session not found. Please start a new conversation.")]
    SessionNotFound(String),
    /// Finalization was requested before any case type was set.
    #[error("case type has not been determined")]
    UnclassifiedCase,
    /// The session's case type is missing from the catalog.
    #[error("unknown case type: {0}")]
    UnknownCaseType(String),
}

/// Outcome of one processed message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessResult {
    /// Reply for the caller.
    pub message: String,
    /// Case type locked so far.
    pub case_type: Option<String>,
    /// Whether the report has been generated.
    pub ready_for_report: bool,
}

/// Coordinates sessions, the oracle and report assembly.
#[derive(Debug, Clone)]
pub struct IntakeEngine {
    store: Arc<SessionStore>,
    catalog: Arc<KnowledgeCatalog>,
    oracle: Oracle,
    prompts: PromptBuilder,
    assembler: ReportAssembler,
    threshold: f64,
    reclassification: ReclassificationPolicy,
    readiness_guard: ReadinessGuard,
}

impl IntakeEngine {
    /// Build an engine from its collaborators and the loaded configuration.
    pub fn new(
        store: Arc<SessionStore>,
        catalog: Arc<KnowledgeCatalog>,
        oracle: Oracle,
        config: &Config,
    ) -> Self {
        let prompts = PromptBuilder::new(config.firm.clone(), &config.intake);
        let assembler = ReportAssembler::new(oracle.clone(), prompts.clone());
        Self {
            store,
            catalog,
            oracle,
            prompts,
            assembler,
            threshold: config.intake.classification_threshold,
            reclassification: config.intake.reclassification,
            readiness_guard: config.intake.readiness_guard,
        }
    }

    /// Session registry backing this engine.
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Case types this engine can classify into.
    pub fn catalog(&self) -> &KnowledgeCatalog {
        &self.catalog
    }

    /// Open a session and return its id with the greeting.
    pub async fn start(&self) -> (String, String) {
        let mut session = IntakeSession::new();
        let greeting = self.prompts.greeting();
        session.set_phase(SessionPhase::Intake);
        session.push_assistant(&greeting);

        let id = session.id().to_owned();
        self.store.insert(session).await;
        info!(session_id = %id, prompt_version = PROMPT_VERSION, "intake session started");
        (id, greeting)
    }

    /// Process one caller message.
    ///
    /// The session stays locked for the whole turn, so concurrent messages
    /// for one session are applied in order.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::SessionNotFound`] for an unknown id.
    pub async fn process_message(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<ProcessResult, IntakeError> {
        let shared = self.lookup(session_id).await?;
        let mut session = shared.lock().await;
        session.push_user(text);

        match session.phase() {
            SessionPhase::Complete => {
                debug!(session_id, "message on completed session");
                Ok(ProcessResult {
                    message: CLOSING_MESSAGE.to_owned(),
                    case_type: session.case_type().map(str::to_owned),
                    ready_for_report: true,
                })
            }
            SessionPhase::GeneratingReport => {
                let result = self.assembler.finalize(&mut session, &self.catalog).await;
                session.push_assistant(&result.message);
                Ok(result)
            }
            SessionPhase::Greeting | SessionPhase::Intake => Ok(self.intake_turn(&mut session).await),
        }
    }

    async fn intake_turn(&self, session: &mut IntakeSession) -> ProcessResult {
        let knowledge = session.case_type().and_then(|ct| self.catalog.get(ct));
        let prompt = match knowledge {
            Some(knowledge) => self.prompts.fact_gathering(session, knowledge),
            None => self.prompts.classification(&self.catalog),
        };

        let result = self.oracle.extract(&prompt, session.history()).await;

        let merged = session.merge_facts(result.extracted_facts);
        debug!(session_id = %session.id(), merged, "facts merged");

        if let Some(proposed) = result.case_type.as_deref().filter(|ct| !ct.is_empty()) {
            self.consider_case_type(session, proposed, result.case_type_confidence);
        }

        session.push_assistant(&result.response);

        if result.ready_for_report {
            let knowledge = session.case_type().and_then(|ct| self.catalog.get(ct));
            if self.readiness_guard.accepts(knowledge, session.facts()) {
                info!(session_id = %session.id(), "readiness signal accepted");
                session.set_phase(SessionPhase::GeneratingReport);
                return self.assembler.finalize(session, &self.catalog).await;
            }
            info!(session_id = %session.id(), "readiness signal rejected by guard");
        }

        ProcessResult {
            message: result.response,
            case_type: session.case_type().map(str::to_owned),
            ready_for_report: false,
        }
    }

    fn consider_case_type(&self, session: &mut IntakeSession, proposed: &str, confidence: f64) {
        if !(0.0..=1.0).contains(&confidence) {
            warn!(session_id = %session.id(), case_type = proposed, confidence, "confidence out of range, ignoring proposal");
            return;
        }
        if confidence <= self.threshold {
            return;
        }
        if !self.catalog.contains(proposed) {
            warn!(session_id = %session.id(), case_type = proposed, "oracle proposed unknown case type");
            return;
        }
        if !self.reclassification.adopts(session.case_type(), proposed) {
            debug!(
                session_id = %session.id(),
                current = session.case_type().unwrap_or_default(),
                proposed,
                "case type locked, ignoring proposal"
            );
            return;
        }
        if session.case_type() != Some(proposed) {
            info!(session_id = %session.id(), case_type = proposed, confidence, "case type classified");
        }
        session.set_case_type(proposed, confidence);
    }

    /// Report for a session, if one has been generated.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::SessionNotFound`] for an unknown id.
    pub async fn report(&self, session_id: &str) -> Result<Option<IntakeReport>, IntakeError> {
        let shared = self.lookup(session_id).await?;
        let session = shared.lock().await;
        Ok(session.report().cloned())
    }

    /// Copy of a session's current state.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::SessionNotFound`] for an unknown id.
    pub async fn snapshot(&self, session_id: &str) -> Result<IntakeSession, IntakeError> {
        let shared = self.lookup(session_id).await?;
        let session = shared.lock().await;
        Ok(session.clone())
    }

    async fn lookup(&self, session_id: &str) -> Result<SharedSession, IntakeError> {
        self.store
            .get(session_id)
            .await
            .ok_or_else(|| IntakeError::SessionNotFound(session_id.to_owned()))
    }
}
