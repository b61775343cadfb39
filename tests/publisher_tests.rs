mod common;

use std::sync::{Arc, Mutex, OnceLock, Weak};

use common::*;
use genai_automation::bridge::{HttpMethod, RemoteStageInvoker};
use genai_automation::engine::{
    BranchPublisher, PipelineError, PublisherState, Reporter, Severity,
};
use genai_automation::workflow::Endpoints;
use serde_json::json;

const BRANCHES: &str = "/api/github/branches";
const PUSH: &str = "/api/github/pushCode";

#[tokio::test]
async fn test_open_lists_branches_and_selects_first() {
    let transport = Arc::new(ScriptedTransport::new().json(BRANCHES, json!(["main", "develop"])));
    let h = harness(transport.clone());
    let publisher = h.console.api_tests().publisher();

    assert_eq!(publisher.state(), PublisherState::Closed);
    publisher.open().await;

    assert_eq!(publisher.state(), PublisherState::Ready);
    let selection = publisher.selection();
    assert_eq!(selection.branches, vec!["main", "develop"]);
    assert_eq!(selection.selected.as_deref(), Some("main"));
    assert_eq!(
        transport.last_to(BRANCHES).unwrap().method,
        HttpMethod::Get
    );
}

#[tokio::test]
async fn test_listing_failure_blocks_push_locally() {
    let transport = Arc::new(ScriptedTransport::new().respond(BRANCHES, 500, "token expired"));
    let h = harness(transport.clone());
    let publisher = h.console.api_tests().publisher();

    publisher.open().await;
    assert_eq!(publisher.state(), PublisherState::Ready);
    assert!(publisher.selection().branches.is_empty());

    publisher.set_commit_message("Add tests");
    let err = publisher.push("class T {}").await.unwrap_err();
    let faults = err.validation().unwrap();
    assert!(faults.is_faulted("branch"));
    assert!(!faults.is_faulted("commitMessage"));
    assert_eq!(transport.calls_to(PUSH), 0);
    assert_eq!(
        h.reporter.banner().as_deref(),
        Some("Please select a branch and enter a commit message.")
    );
}

#[tokio::test]
async fn test_unreachable_listing_leaves_list_empty() {
    let transport = Arc::new(ScriptedTransport::new().unreachable(BRANCHES));
    let h = harness(transport.clone());
    let publisher = h.console.api_tests().publisher();

    publisher.open().await;
    assert_eq!(publisher.state(), PublisherState::Ready);
    assert!(publisher.selection().branches.is_empty());
    assert!(publisher.selection().selected.is_none());

    publisher.set_commit_message("Add tests");
    let err = publisher.push("class T {}").await.unwrap_err();
    assert!(err.validation().unwrap().is_faulted("branch"));
    assert_eq!(transport.calls_to(PUSH), 0);
}

#[tokio::test]
async fn test_blank_commit_message_rejected() {
    let transport = Arc::new(ScriptedTransport::new().json(BRANCHES, json!(["main"])));
    let h = harness(transport.clone());
    let publisher = h.console.api_tests().publisher();

    publisher.open().await;
    publisher.set_commit_message("   ");
    let err = publisher.push("class T {}").await.unwrap_err();
    assert!(err.validation().unwrap().is_faulted("commitMessage"));
    assert_eq!(transport.calls_to(PUSH), 0);
    assert_eq!(publisher.state(), PublisherState::Ready);
}

#[tokio::test]
async fn test_push_success_closes_dialog() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .json(BRANCHES, json!(["main"]))
            .respond(PUSH, 200, "pushed"),
    );
    let h = harness(transport);
    let publisher = h.console.api_tests().publisher();

    publisher.open().await;
    publisher.set_commit_message("Add tests");
    assert_eq!(publisher.push("class T {}").await.unwrap(), "pushed");

    assert_eq!(publisher.state(), PublisherState::Closed);
    assert!(publisher.selection().branches.is_empty());
    let toast = &h.reporter.toasts()[0];
    assert_eq!(toast.severity, Severity::Success);
    assert_eq!(toast.message, "Push Code Success: pushed");
}

#[tokio::test]
async fn test_push_failure_also_closes_dialog() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .json(BRANCHES, json!(["main"]))
            .respond(PUSH, 409, "branch protected"),
    );
    let h = harness(transport);
    let publisher = h.console.api_tests().publisher();

    publisher.open().await;
    publisher.set_commit_message("Add tests");
    let err = publisher.push("class T {}").await.unwrap_err();
    assert!(matches!(err, PipelineError::Stage(_)));
    assert_eq!(err.diagnostic(), "branch protected");

    assert_eq!(publisher.state(), PublisherState::Closed);
    assert_eq!(
        h.reporter.banner().as_deref(),
        Some("Push Code failed: branch protected")
    );
}

#[tokio::test]
async fn test_unknown_branch_not_selectable() {
    let transport = Arc::new(ScriptedTransport::new().json(BRANCHES, json!(["main"])));
    let h = harness(transport);
    let publisher = h.console.api_tests().publisher();

    assert!(!publisher.select_branch("main"));
    publisher.open().await;
    assert!(!publisher.select_branch("release"));
    assert!(publisher.select_branch("main"));

    publisher.close();
    assert_eq!(publisher.state(), PublisherState::Closed);
}

/// Records the dialog state seen at each report
#[derive(Default)]
struct StateAtReport {
    publisher: OnceLock<Weak<BranchPublisher>>,
    seen: Mutex<Vec<(Severity, PublisherState)>>,
}

impl Reporter for StateAtReport {
    fn report(&self, severity: Severity, _message: &str) {
        if let Some(publisher) = self.publisher.get().and_then(Weak::upgrade) {
            self.seen.lock().unwrap().push((severity, publisher.state()));
        }
    }
}

fn publisher_reporting_state(
    transport: ScriptedTransport,
) -> (Arc<BranchPublisher>, Arc<StateAtReport>) {
    let reporter = Arc::new(StateAtReport::default());
    let publisher = Arc::new(BranchPublisher::new(
        RemoteStageInvoker::new(Arc::new(transport)),
        &Endpoints::default(),
        reporter.clone(),
    ));
    reporter
        .publisher
        .set(Arc::downgrade(&publisher))
        .unwrap();
    (publisher, reporter)
}

#[tokio::test]
async fn test_push_outcome_reported_before_close() {
    let (publisher, reporter) = publisher_reporting_state(
        ScriptedTransport::new()
            .json(BRANCHES, json!(["main"]))
            .respond(PUSH, 200, "pushed"),
    );

    publisher.open().await;
    publisher.set_commit_message("Add tests");
    publisher.push("class T {}").await.unwrap();

    assert_eq!(
        *reporter.seen.lock().unwrap(),
        vec![(Severity::Success, PublisherState::Pushing)]
    );
    assert_eq!(publisher.state(), PublisherState::Closed);
}

#[tokio::test]
async fn test_push_failure_reported_before_close() {
    let (publisher, reporter) = publisher_reporting_state(
        ScriptedTransport::new()
            .json(BRANCHES, json!(["main"]))
            .unreachable(PUSH),
    );

    publisher.open().await;
    publisher.set_commit_message("Add tests");
    assert!(publisher.push("class T {}").await.is_err());

    assert_eq!(
        *reporter.seen.lock().unwrap(),
        vec![(Severity::Error, PublisherState::Pushing)]
    );
    assert_eq!(publisher.state(), PublisherState::Closed);
}
