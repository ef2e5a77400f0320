//! Extraction oracle parsing and failure absorption.

use std::sync::Arc;

use async_trait::async_trait;

use lawlord::config::OracleConfig;
use lawlord::oracle::{
    parse_json_object, ExtractionResult, Oracle, OracleError, DEFAULT_REPLY, FALLBACK_REPLY,
};
use lawlord::providers::router::ModelRouter;
use lawlord::providers::{
    CompletionRequest, CompletionResponse, LlmProvider, Message, ProviderError, UsageStats,
};

/// Returns a fixed body, or fails when none is configured.
struct FixedProvider {
    body: Option<String>,
}

#[async_trait]
impl LlmProvider for FixedProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        assert_eq!(request.temperature, Some(0.3));
        assert_eq!(request.max_tokens, Some(1024));
        assert!(request.json_output);
        match &self.body {
            Some(text) => Ok(CompletionResponse {
                text: text.clone(),
                usage: UsageStats::default(),
                model: "fixed".to_owned(),
            }),
            None => Err(ProviderError::HttpStatus {
                status: 503,
                body: "overloaded".to_owned(),
            }),
        }
    }

    fn model_id(&self) -> &str {
        "mock/fixed"
    }
}

fn oracle(body: Option<&str>) -> Oracle {
    let provider = Arc::new(FixedProvider {
        body: body.map(str::to_owned),
    });
    let router = ModelRouter::for_testing("mock/fixed".to_owned(), provider);
    Oracle::new(Arc::new(router), OracleConfig::default())
}

#[test]
fn parse_tolerates_surrounding_prose() {
    let text = "Sure! Here you go:\n{\"case_type\": \"dwi\", \"case_type_confidence\": 0.8}\nThanks";
    let parsed: ExtractionResult = parse_json_object(text).expect("object should parse");
    assert_eq!(parsed.case_type.as_deref(), Some("dwi"));
    assert!((parsed.case_type_confidence - 0.8).abs() < f64::EPSILON);
}

#[test]
fn missing_and_null_fields_take_defaults() {
    let parsed: ExtractionResult = parse_json_object(
        r#"{"extracted_facts": null, "case_type": null, "case_type_confidence": null, "response": "  "}"#,
    )
    .expect("object should parse");
    assert!(parsed.extracted_facts.is_empty());
    assert_eq!(parsed.case_type, None);
    assert_eq!(parsed.case_type_confidence, 0.0);
    assert_eq!(parsed.response, DEFAULT_REPLY);
    assert!(!parsed.ready_for_report);
}

#[test]
fn non_object_output_is_malformed() {
    let result: Result<ExtractionResult, OracleError> = parse_json_object("[1, 2, 3]");
    match result {
        Err(OracleError::Malformed(detail)) => assert!(!detail.is_empty()),
        other => panic!("expected malformed error, got {other:?}"),
    }
}

#[test]
fn malformed_error_omits_oracle_output() {
    let text = r#"{"extracted_facts": {"arrest_date": "last Friday in Austin"}, "ready_for_report": "maybe"}"#;
    let result: Result<ExtractionResult, OracleError> = parse_json_object(text);
    match result {
        Err(OracleError::Malformed(detail)) => {
            assert!(!detail.contains("Austin"), "detail leaked output: {detail}");
        }
        other => panic!("expected malformed error, got {other:?}"),
    }
}

#[test]
fn quoted_confidence_is_accepted() {
    let parsed: ExtractionResult = parse_json_object(
        r#"{"extracted_facts": {"arrest_date": "today"}, "case_type": "dwi",
            "case_type_confidence": " 0.9 ", "response": "When?"}"#,
    )
    .expect("quoted confidence should parse");
    assert!((parsed.case_type_confidence - 0.9).abs() < f64::EPSILON);
    assert_eq!(parsed.extracted_facts.len(), 1);
}

#[test]
fn non_numeric_confidence_is_malformed() {
    let result: Result<ExtractionResult, OracleError> =
        parse_json_object(r#"{"case_type": "dwi", "case_type_confidence": "high"}"#);
    assert!(matches!(result, Err(OracleError::Malformed(_))));
}

#[test]
fn fallback_is_fixed() {
    let fallback = ExtractionResult::fallback();
    assert_eq!(fallback.response, FALLBACK_REPLY);
    assert!(fallback.extracted_facts.is_empty());
    assert_eq!(fallback.case_type, None);
    assert!(!fallback.ready_for_report);
}

#[tokio::test]
async fn extract_returns_parsed_result() {
    let oracle = oracle(Some(
        r#"{"extracted_facts": {"arrest_date": "today"}, "case_type": "dwi",
            "case_type_confidence": 0.9, "response": "When?", "ready_for_report": false}"#,
    ));
    let result = oracle
        .extract("system", &[Message::user("I was arrested today")])
        .await;
    assert_eq!(result.response, "When?");
    assert_eq!(result.extracted_facts.len(), 1);
}

#[tokio::test]
async fn extract_absorbs_provider_errors() {
    let oracle = oracle(None);
    let messages = [Message::user("hello")];

    let err = oracle
        .try_extract("system", &messages)
        .await
        .expect_err("provider failure should surface from try_extract");
    assert!(matches!(err, OracleError::Provider(_)));

    let result = oracle.extract("system", &messages).await;
    assert_eq!(result, ExtractionResult::fallback());
}
