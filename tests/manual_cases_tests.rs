mod common;

use std::sync::Arc;

use common::*;
use futures::future::join;
use genai_automation::bridge::RequestBody;
use genai_automation::engine::manual_cases::{
    ACCEPTANCE_CRITERIA, APPLICATION_URL, EPIC_STORY, USER_STORY,
};
use genai_automation::engine::{
    ManualTestCaseWorkflow, PipelineError, PipelineState, ReportEvent, Severity,
};
use genai_automation::workflow::FieldUpdate;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

const GENERATE: &str = "/api/generateTestCases";
const RENDER: &str = "/api/downloadTestCases";

fn fill(workflow: &ManualTestCaseWorkflow) {
    workflow
        .update(FieldUpdate::text(APPLICATION_URL, "https://shop.test"))
        .unwrap();
    workflow
        .update(FieldUpdate::text(USER_STORY, "As a shopper I can pay by card"))
        .unwrap();
    workflow
        .update(FieldUpdate::text(ACCEPTANCE_CRITERIA, "Receipt is emailed"))
        .unwrap();
}

#[tokio::test]
async fn test_missing_field_blocks_without_network() {
    let transport = Arc::new(ScriptedTransport::new());
    let h = harness(transport.clone());
    let workflow = h.console.manual_cases();

    workflow
        .update(FieldUpdate::text(USER_STORY, "As a shopper I can pay by card"))
        .unwrap();
    workflow
        .update(FieldUpdate::text(ACCEPTANCE_CRITERIA, "Receipt is emailed"))
        .unwrap();

    let err = workflow.generate_and_download().await.unwrap_err();
    let faults = err.validation().expect("validation error");
    assert!(faults.is_faulted(APPLICATION_URL));
    assert!(!faults.is_faulted(USER_STORY));

    let status = workflow.status();
    assert_eq!(status.state, PipelineState::Idle);
    assert_eq!(
        status.error.as_deref(),
        Some("Please fill in the required fields: applicationUrl")
    );
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_reveal_follows_error_report() {
    let h = harness(Arc::new(ScriptedTransport::new()));

    let err = h.console.manual_cases().generate_and_download().await;
    assert_err!(err);

    let events = h.reporter.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], ReportEvent::Reported(Severity::Error, _)));
    assert_eq!(events[1], ReportEvent::Revealed);
    assert_eq!(h.reporter.reveal_count(), 1);
    assert!(h.reporter.banner().is_some());
}

#[tokio::test]
async fn test_success_saves_artifact_and_resets_input() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .json(GENERATE, json!([{"id": 1, "title": "Pay by card"}]))
            .respond(RENDER, 200, b"PK\x03\x04sheet".to_vec()),
    );
    let h = harness(transport.clone());
    let workflow = h.console.manual_cases();
    fill(workflow);
    workflow.update(FieldUpdate::toggle("negative")).unwrap();

    let artifact = assert_ok!(workflow.generate_and_download().await);
    assert_eq!(artifact.filename, "test_cases.xlsx");

    let saved = h.persistence.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].0, "test_cases.xlsx");
    assert_eq!(saved[0].1, b"PK\x03\x04sheet".to_vec());

    let generate = transport.last_to(GENERATE).unwrap();
    assert_eq!(
        generate.body,
        RequestBody::Json(json!({
            "testType": {"positive": false, "negative": true, "edge": false},
            "userStoryDescription": "As a shopper I can pay by card",
            "applicationUrl": "https://shop.test",
            "acceptanceCriteria": "Receipt is emailed",
            "epicDescription": "",
        }))
    );
    let render = transport.last_to(RENDER).unwrap();
    assert_eq!(
        render.body,
        RequestBody::Json(json!([{"id": 1, "title": "Pay by card"}]))
    );

    let status = workflow.status();
    assert_eq!(status.state, PipelineState::Succeeded);
    assert!(status.error.is_none());
    assert_eq!(
        status.notice.as_deref(),
        Some("Test cases downloaded to test_cases.xlsx")
    );
    assert_eq!(
        status.completed_stages,
        vec!["generate-test-cases", "render-artifact"]
    );
    assert_eq!(workflow.input(), ManualTestCaseWorkflow::initial_input());
    assert_eq!(h.reporter.toasts()[0].severity, Severity::Success);
}

#[tokio::test]
async fn test_generation_failure_keeps_input() {
    let transport = Arc::new(ScriptedTransport::new().respond(GENERATE, 500, "LLM timeout"));
    let h = harness(transport.clone());
    let workflow = h.console.manual_cases();
    fill(workflow);
    workflow
        .update(FieldUpdate::text(EPIC_STORY, "Checkout"))
        .unwrap();
    let before = workflow.input();

    let err = workflow.generate_and_download().await.unwrap_err();
    assert_eq!(err.diagnostic(), "LLM timeout");

    let status = workflow.status();
    assert_eq!(status.state, PipelineState::Failed);
    assert_eq!(status.error.as_deref(), Some("LLM timeout"));
    assert_eq!(transport.calls_to(RENDER), 0);
    assert!(h.persistence.saved().is_empty());
    assert_eq!(workflow.input(), before);
    assert_eq!(h.reporter.banner().as_deref(), Some("LLM timeout"));
}

#[tokio::test]
async fn test_render_failure_saves_nothing() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .json(GENERATE, json!([{"id": 1}]))
            .unreachable(RENDER),
    );
    let h = harness(transport);
    let workflow = h.console.manual_cases();
    fill(workflow);

    let err = workflow.generate_and_download().await.unwrap_err();
    assert!(err.stage_error().unwrap().is_transport());
    assert_eq!(workflow.status().state, PipelineState::Failed);
    assert!(h.persistence.saved().is_empty());
}

#[tokio::test]
async fn test_persistence_failure_fails_run() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .json(GENERATE, json!([]))
            .respond(RENDER, 200, b"xlsx".to_vec()),
    );
    let h = harness_with(
        transport,
        RecordingPersistence::failing(),
        RecordingNavigation::new(),
    );
    let workflow = h.console.manual_cases();
    fill(workflow);

    let err = workflow.generate_and_download().await.unwrap_err();
    assert!(matches!(err, PipelineError::Persistence(_)));
    assert_eq!(workflow.status().state, PipelineState::Failed);
    assert!(!workflow.input().is_blank(APPLICATION_URL));
}

#[tokio::test]
async fn test_second_trigger_while_running_is_ignored() {
    let gated = Arc::new(GatedTransport::new(
        ScriptedTransport::new()
            .json(GENERATE, json!([{"id": 1}]))
            .respond(RENDER, 200, b"xlsx".to_vec()),
        GENERATE,
    ));
    let h = harness(gated.clone());
    let workflow = h.console.manual_cases();
    fill(workflow);

    let (first, second) = join(workflow.generate_and_download(), async {
        gated.entered().await;
        assert!(!workflow.trigger_enabled());
        let second = workflow.generate_and_download().await;
        gated.release();
        second
    })
    .await;

    assert!(second.unwrap_err().is_busy());
    assert_ok!(first);
    assert_eq!(gated.inner().calls_to(GENERATE), 1);
    assert_eq!(h.persistence.saved().len(), 1);
    assert!(workflow.trigger_enabled());
}

#[tokio::test]
async fn test_retrigger_after_failure_clears_error() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond(GENERATE, 500, "LLM timeout")
            .json(GENERATE, json!([]))
            .respond(RENDER, 200, b"xlsx".to_vec()),
    );
    let h = harness(transport);
    let workflow = h.console.manual_cases();
    fill(workflow);

    assert_err!(workflow.generate_and_download().await);
    assert_ok!(workflow.generate_and_download().await);

    let status = workflow.status();
    assert_eq!(status.state, PipelineState::Succeeded);
    assert!(status.error.is_none());
}
