use super::*;
use crate::logic::model::IngestReceipt;
use crate::logic::navigation::NavigationEvent;
use crate::logic::store::fake::FakeStore;
use serde_json::json;
use tokio::sync::mpsc;

fn controller(store: &Arc<FakeStore>) -> (IngestController, mpsc::UnboundedReceiver<NavigationEvent>) {
    let (navigator, rx) = Navigator::channel();
    (IngestController::new(store.clone(), navigator), rx)
}

fn filled_form() -> IngestForm {
    IngestForm {
        source_system: "fraud_detection".to_string(),
        risk_level: RiskLevel::High,
        confidence: "0.87".to_string(),
        input_payload: r#"{"transaction_id": "TXN123", "amount": 5000}"#.to_string(),
        output: r#"{"decision": "REVIEW"}"#.to_string(),
    }
}

#[test]
fn test_form_defaults() {
    let form = IngestForm::default();
    assert_eq!(form.risk_level, RiskLevel::Medium);
    assert_eq!(form.input_payload, "{}");
    assert_eq!(form.output, "{}");
    assert_eq!(form.confidence, "0.95");
}

#[test]
fn test_build_request_parses_fields() {
    let request = filled_form().build_request().unwrap();
    assert_eq!(request.source_system, "fraud_detection");
    assert_eq!(request.input_payload, json!({"transaction_id": "TXN123", "amount": 5000}));
    assert_eq!(request.output, json!({"decision": "REVIEW"}));
    assert!(request.rules_triggered.is_empty());
    assert_eq!(request.confidence, 0.87);
    assert_eq!(request.risk_level, RiskLevel::High);
}

#[test]
fn test_out_of_range_confidence_is_not_blocked() {
    let form = IngestForm {
        confidence: "1.5".to_string(),
        ..filled_form()
    };
    assert_eq!(form.build_request().unwrap().confidence, 1.5);
}

#[test]
fn test_local_validation_errors() {
    let blank = IngestForm {
        source_system: "  ".to_string(),
        ..filled_form()
    };
    assert_eq!(blank.build_request(), Err(IngestError::MissingField("source_system")));

    let bad_output = IngestForm {
        output: "[1, 2".to_string(),
        ..filled_form()
    };
    assert!(matches!(
        bad_output.build_request(),
        Err(IngestError::MalformedJson { field: "output", .. })
    ));

    for raw in ["abc", "", "NaN", "inf"] {
        let form = IngestForm {
            confidence: raw.to_string(),
            ..filled_form()
        };
        let err = form.build_request().unwrap_err();
        assert_eq!(err, IngestError::MalformedConfidence(raw.to_string()));
        assert!(err.is_local());
    }
}

#[tokio::test]
async fn test_malformed_json_never_reaches_the_store() {
    let store = Arc::new(FakeStore::default());
    let (ingest, mut rx) = controller(&store);
    ingest.edit(|form| {
        *form = filled_form();
        form.input_payload = "{bad json".to_string();
    });

    let err = ingest.submit().await.unwrap_err();

    assert!(matches!(err, IngestError::MalformedJson { field: "input_payload", .. }));
    assert!(err.user_message().starts_with("Malformed JSON"));
    assert_eq!(FakeStore::calls(&store.ingest_calls), 0);
    assert!(rx.try_recv().is_err());

    let state = ingest.state();
    assert_eq!(state.phase, IngestPhase::Editing);
    assert_eq!(state.form.input_payload, "{bad json");
    assert_eq!(state.error, Some(err));
}

#[tokio::test]
async fn test_accepted_ingest_navigates_to_trace() {
    let store = Arc::new(FakeStore::default());
    *store.ingest_result.lock() = Ok(IngestReceipt {
        decision_id: "dec-123".to_string(),
    });
    let (ingest, mut rx) = controller(&store);
    ingest.edit(|form| *form = filled_form());

    let decision_id = tokio_test::assert_ok!(ingest.submit().await);

    assert_eq!(decision_id, "dec-123");
    assert_eq!(
        rx.recv().await,
        Some(NavigationEvent::OpenTrace {
            decision_id: "dec-123".to_string()
        })
    );
    assert_eq!(
        ingest.state().phase,
        IngestPhase::Succeeded {
            decision_id: "dec-123".to_string()
        }
    );

    let sent = store.last_ingest.lock().clone().unwrap();
    assert_eq!(sent.source_system, "fraud_detection");
    assert!(sent.rules_triggered.is_empty());
}

#[tokio::test]
async fn test_rejection_detail_is_surfaced_verbatim() {
    let store = Arc::new(FakeStore::default());
    *store.ingest_result.lock() = Err(StoreError::Rejected {
        status: 422,
        detail: Some("X".to_string()),
    });
    let (ingest, mut rx) = controller(&store);
    ingest.edit(|form| *form = filled_form());

    let err = ingest.submit().await.unwrap_err();

    assert_eq!(err.user_message(), "X");
    assert!(!err.is_local());
    assert!(rx.try_recv().is_err());

    let state = ingest.state();
    assert_eq!(state.phase, IngestPhase::Editing);
    assert_eq!(state.form, filled_form());
    assert_eq!(state.error, Some(IngestError::Rejected("X".to_string())));
}

#[tokio::test]
async fn test_failure_without_detail_falls_back() {
    let store = Arc::new(FakeStore::default());
    *store.ingest_result.lock() = Err(StoreError::Network("connection refused".to_string()));
    let (ingest, _rx) = controller(&store);
    ingest.edit(|form| *form = filled_form());

    let err = ingest.submit().await.unwrap_err();
    assert_eq!(err.user_message(), GENERIC_FAILURE);
    assert_eq!(ingest.form(), filled_form());

    let no_detail = IngestError::from(StoreError::Rejected {
        status: 500,
        detail: None,
    });
    assert_eq!(no_detail.user_message(), GENERIC_FAILURE);
}

#[tokio::test(start_paused = true)]
async fn test_second_submit_while_submitting_is_refused() {
    let store = Arc::new(FakeStore::default());
    *store.delay.lock() = std::time::Duration::from_secs(3);
    let (ingest, _rx) = controller(&store);
    let ingest = Arc::new(ingest);
    ingest.edit(|form| *form = filled_form());

    let first = tokio::spawn({
        let ingest = ingest.clone();
        async move { ingest.submit().await }
    });
    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    assert_eq!(ingest.state().phase, IngestPhase::Submitting);
    assert_eq!(ingest.submit().await, Err(IngestError::Busy));

    assert!(first.await.unwrap().is_ok());
    assert_eq!(FakeStore::calls(&store.ingest_calls), 1);
}

#[tokio::test(start_paused = true)]
async fn test_answer_after_close_neither_navigates_nor_updates() {
    let store = Arc::new(FakeStore::default());
    *store.delay.lock() = std::time::Duration::from_secs(3);
    let (ingest, mut rx) = controller(&store);
    let ingest = Arc::new(ingest);
    ingest.edit(|form| *form = filled_form());

    let task = tokio::spawn({
        let ingest = ingest.clone();
        async move { ingest.submit().await }
    });
    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    ingest.close();

    assert_eq!(task.await.unwrap(), Ok("dec-new".to_string()));
    assert_eq!(ingest.state().phase, IngestPhase::Editing);
    assert!(rx.try_recv().is_err());
    assert_eq!(ingest.form(), filled_form());

    assert_eq!(ingest.submit().await, Err(IngestError::Closed));
    assert_eq!(FakeStore::calls(&store.ingest_calls), 1);
}
