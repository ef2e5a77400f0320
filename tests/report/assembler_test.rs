//! Report finalization and lenient parsing of the report oracle.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use lawlord::config::Config;
use lawlord::intake::{IntakeSession, PromptBuilder, SessionPhase};
use lawlord::knowledge::KnowledgeCatalog;
use lawlord::oracle::{Oracle, REPORT_ROLE};
use lawlord::providers::router::ModelRouter;
use lawlord::providers::{
    CompletionRequest, CompletionResponse, LlmProvider, ProviderError, UsageStats,
};
use lawlord::report::{
    CaseStrength, IntakeReport, Recommendation, ReportAssembler, NEED_MORE_DETAIL, REPORT_READY,
};

/// A mock LLM provider that returns a canned response.
struct MockProvider {
    response_text: String,
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        assert_eq!(request.max_tokens, Some(2048));
        Ok(CompletionResponse {
            text: self.response_text.clone(),
            usage: UsageStats::default(),
            model: "mock".to_owned(),
        })
    }

    fn model_id(&self) -> &str {
        "mock/report"
    }
}

fn assembler(response: &str) -> ReportAssembler {
    let config = Config::default();
    let provider = Arc::new(MockProvider {
        response_text: response.to_owned(),
    });
    let router = ModelRouter::for_testing("mock/default".to_owned(), provider);
    let oracle = Oracle::new(Arc::new(router), config.oracle.clone());
    ReportAssembler::new(oracle, PromptBuilder::new(config.firm, &config.intake))
}

fn ready_session(case_type: &str) -> IntakeSession {
    let mut session = IntakeSession::new();
    session.set_case_type(case_type, 0.9);
    session.merge_facts([("citation_city".to_owned(), json!("Austin"))].into());
    session.set_phase(SessionPhase::GeneratingReport);
    session
}

#[tokio::test]
async fn lenient_draft_fills_defaults() {
    let response = json!({
        "client_summary": "Caller received a meter ticket in Austin.",
        "key_facts": {"citation_city": "Austin", "fine_amount": null},
        "red_flags": "Ticket is past due",
        "case_strength": "very strong",
        "recommendation": "Needs Review",
        "next_steps": ["Pull meter maintenance logs", null],
    })
    .to_string();
    let assembler = assembler(&response);
    let mut session = ready_session("parking_ticket");

    let result = assembler
        .finalize(&mut session, &KnowledgeCatalog::builtin())
        .await;
    assert_eq!(result.message, REPORT_READY);
    assert!(result.ready_for_report);

    let report = session.report().expect("report should be attached");
    assert_eq!(report.case_type, "parking_ticket");
    assert_eq!(report.case_type_display, "Parking Citation");
    assert_eq!(report.jurisdiction, "Texas");
    assert_eq!(report.case_strength, CaseStrength::Moderate);
    assert_eq!(report.recommendation, Recommendation::NeedsReview);
    assert_eq!(report.red_flags, vec!["Ticket is past due".to_owned()]);
    assert_eq!(report.next_steps.len(), 1);
    assert!(!report.key_facts.contains_key("fine_amount"));
    assert_eq!(session.phase(), SessionPhase::Complete);
}

#[tokio::test]
async fn empty_report_object_is_treated_as_failure() {
    let assembler = assembler("{}");
    let mut session = ready_session("dwi");

    assembler
        .finalize(&mut session, &KnowledgeCatalog::builtin())
        .await;

    let report = session.report().expect("fallback report should be attached");
    assert_eq!(report.recommendation, Recommendation::NeedsReview);
    assert_eq!(report.case_type, "dwi");
    assert_eq!(report.key_facts.get("citation_city"), Some(&json!("Austin")));
}

#[tokio::test]
async fn unknown_case_type_yields_unclassified_stub() {
    let assembler = assembler("{}");
    let mut session = ready_session("arson");

    let result = assembler
        .finalize(&mut session, &KnowledgeCatalog::builtin())
        .await;
    assert!(result.ready_for_report);

    let report = session.report().expect("stub report should be attached");
    assert_eq!(report.case_type, "unknown");
    assert_eq!(report.case_type_display, "Unclassified");
    assert_eq!(report.recommendation, Recommendation::NeedsReview);
    assert_eq!(report.red_flags, vec!["Case type could not be determined".to_owned()]);
    assert_eq!(
        report.next_steps,
        vec!["Schedule a follow-up call with the potential client".to_owned()]
    );
}

#[tokio::test]
async fn missing_case_type_regresses_without_report() {
    let assembler = assembler("{}");
    let mut session = IntakeSession::new();
    session.set_phase(SessionPhase::GeneratingReport);

    let result = assembler
        .finalize(&mut session, &KnowledgeCatalog::builtin())
        .await;

    assert_eq!(result.message, NEED_MORE_DETAIL);
    assert!(!result.ready_for_report);
    assert_eq!(session.phase(), SessionPhase::Intake);
    assert!(session.report().is_none());
}

#[test]
fn report_serializes_enums_in_wire_form() {
    let report = IntakeReport::unclassified("abc");
    let value = serde_json::to_value(&report).expect("report should serialize");
    assert_eq!(value["recommendation"], "needs_review");
    assert_eq!(value["case_strength"], "weak");
    assert_eq!(value["session_id"], "abc");
}

#[tokio::test]
async fn report_requests_use_the_report_role_provider() {
    let config = Config::default();
    let default = Arc::new(MockProvider {
        response_text: "not json".to_owned(),
    });
    let reporter = Arc::new(MockProvider {
        response_text: json!({"client_summary": "Summary.", "recommendation": "pass"}).to_string(),
    });
    let router = ModelRouter::for_testing("mock/default".to_owned(), default).with_role(
        REPORT_ROLE,
        "mock/report".to_owned(),
        reporter,
    );
    let oracle = Oracle::new(Arc::new(router), config.oracle.clone());
    let assembler = ReportAssembler::new(oracle, PromptBuilder::new(config.firm, &config.intake));
    let mut session = ready_session("dwi");

    assembler
        .finalize(&mut session, &KnowledgeCatalog::builtin())
        .await;

    let report = session.report().expect("report should be attached");
    assert_eq!(report.recommendation, Recommendation::Pass);
    assert_eq!(report.client_summary, "Summary.");
}
