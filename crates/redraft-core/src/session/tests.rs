use super::*;
use crate::mock::{MockDocument, MockElement, MockService, NoticeLog, StaticSettings, WriteBehavior};
use crate::host::HostElement;
use crate::types::{NoticeLevel, Sender};

type TestOrchestrator = Orchestrator<MockDocument, MockService, StaticSettings, NoticeLog>;

struct Fixture {
    doc: MockDocument,
    service: MockService,
    notices: NoticeLog,
    orchestrator: TestOrchestrator,
}

fn fixture() -> Fixture {
    let doc = MockDocument::new("chat.example.com");
    let service = MockService::new();
    let notices = NoticeLog::new();
    let orchestrator = Orchestrator::new(
        doc.clone(),
        service.clone(),
        StaticSettings::with_key("sk-test"),
        notices.clone(),
        RedraftConfig::default(),
    );
    Fixture {
        doc,
        service,
        notices,
        orchestrator,
    }
}

fn draft_box(doc: &MockDocument, text: &str) -> MockElement {
    let area = doc.body().child("textarea").with_value(text);
    doc.focus(&area);
    area
}

fn refined(text: &str) -> Result<RewriteResult, String> {
    Ok(RewriteResult {
        refined_text: text.to_string(),
    })
}

#[tokio::test]
async fn test_preview_cycle() {
    let mut f = fixture();
    let area = draft_box(&f.doc, "hey can u send it tmrw");

    let outcome = f.orchestrator.trigger(RewriteMode::Preview, None);
    let TriggerOutcome::Dispatched(request) = outcome else {
        panic!("expected dispatch, got {outcome:?}");
    };
    assert_eq!(request.draft_text, "hey can u send it tmrw");
    assert_eq!(request.custom_instruction, None);
    assert_eq!(f.service.requests().len(), 1);
    assert_eq!(f.orchestrator.state(), SessionState::AwaitingResult);
    assert_eq!(
        f.notices.last(),
        Some(Notice::info("Refining your message..."))
    );

    let mut review = f
        .orchestrator
        .handle_result(refined("Hey, could you send it tomorrow?"))
        .unwrap();
    assert_eq!(f.orchestrator.state(), SessionState::Idle);
    assert!(!review.hunks().is_empty());
    assert_eq!(review.original(), "hey can u send it tmrw");

    review.preview(&f.notices).await.unwrap();
    assert!(review.is_applied());
    assert_eq!(area.value().unwrap(), "Hey, could you send it tomorrow?");

    area.clear_calls();
    let report = review.accept(&f.notices).await.unwrap();
    assert!(report.is_none());
    assert!(area.calls().is_empty());
    assert_eq!(
        f.notices.last(),
        Some(Notice::success("Text refined successfully"))
    );
}

#[tokio::test]
async fn test_preview_reject_restores_original() {
    let mut f = fixture();
    let area = draft_box(&f.doc, "see u at 5");

    f.orchestrator.trigger(RewriteMode::Preview, None);
    let mut review = f
        .orchestrator
        .handle_result(refined("See you at 5."))
        .unwrap();
    review.preview(&f.notices).await.unwrap();
    assert_eq!(area.value().unwrap(), "See you at 5.");

    let report = review.reject(&f.notices).await.unwrap();
    assert!(report.is_some());
    assert_eq!(area.value().unwrap(), "see u at 5");
}

#[tokio::test]
async fn test_replace_writes_only_on_accept() {
    let mut f = fixture();
    let area = draft_box(&f.doc, "thx for the help");

    f.orchestrator.trigger(RewriteMode::Replace, None);
    assert_eq!(
        f.notices.last(),
        Some(Notice::info("Refining and replacing your message..."))
    );
    let review = f
        .orchestrator
        .handle_result(refined("Thanks for the help!"))
        .unwrap();
    assert_eq!(area.value().unwrap(), "thx for the help");

    let report = review.accept(&f.notices).await.unwrap().unwrap();
    assert_eq!(report.attempts.len(), 1);
    assert_eq!(area.value().unwrap(), "Thanks for the help!");
    assert_eq!(f.notices.last(), Some(Notice::success("✓ Changes applied")));
}

#[tokio::test]
async fn test_reject_without_preview_writes_nothing() {
    let mut f = fixture();
    let area = draft_box(&f.doc, "ok lets go");

    f.orchestrator.trigger(RewriteMode::Replace, None);
    let review = f.orchestrator.handle_result(refined("Ok, let's go.")).unwrap();
    area.clear_calls();

    assert!(review.reject(&f.notices).await.unwrap().is_none());
    assert!(area.calls().is_empty());
    assert_eq!(area.value().unwrap(), "ok lets go");
}

fn draft_editor(doc: &MockDocument, text: &str) -> MockElement {
    let editor = doc.body().child("div").attr("contenteditable", "true").text(text);
    doc.focus(&editor);
    editor
}

#[tokio::test]
async fn test_reject_keeps_uncleaned_draft() {
    let mut f = fixture();
    let editor = draft_editor(&f.doc, "see you at\n12:30\nthanks");

    let TriggerOutcome::Dispatched(request) = f.orchestrator.trigger(RewriteMode::Replace, None)
    else {
        panic!("expected dispatch");
    };
    assert_eq!(request.draft_text, "see you at\nthanks");

    let review = f
        .orchestrator
        .handle_result(refined("See you at 12:30. Thanks!"))
        .unwrap();
    assert_eq!(review.snapshot(), "see you at\n12:30\nthanks");
    editor.clear_calls();

    assert!(review.reject(&f.notices).await.unwrap().is_none());
    assert!(editor.calls().is_empty());
    assert_eq!(editor.inner_text().unwrap(), "see you at\n12:30\nthanks");
}

#[tokio::test]
async fn test_preview_reject_restores_uncleaned_draft() {
    let mut f = fixture();
    let editor = draft_editor(&f.doc, "see you at\n12:30\nthanks");

    f.orchestrator.trigger(RewriteMode::Preview, None);
    let mut review = f
        .orchestrator
        .handle_result(refined("See you at 12:30. Thanks!"))
        .unwrap();
    review.preview(&f.notices).await.unwrap();
    assert_eq!(editor.inner_text().unwrap(), "See you at 12:30. Thanks!");

    assert!(review.reject(&f.notices).await.unwrap().is_some());
    assert_eq!(editor.inner_text().unwrap(), "see you at\n12:30\nthanks");
}

#[tokio::test]
async fn test_failed_write_is_reported() {
    let mut f = fixture();
    let area = draft_box(&f.doc, "original words");
    area.clone().behavior(WriteBehavior::inert());

    f.orchestrator.trigger(RewriteMode::Replace, None);
    let review = f.orchestrator.handle_result(refined("better words")).unwrap();
    let err = review.accept(&f.notices).await.unwrap_err();

    assert!(matches!(err, RedraftError::WriteFailure { .. }));
    assert_eq!(area.value().unwrap(), "original words");
    assert_eq!(
        f.notices.last(),
        Some(Notice::error("Could not insert the refined text into this field."))
    );
}

#[test]
fn test_no_surface() {
    let mut f = fixture();
    f.doc.body().child("p").text("nothing to type into");

    let outcome = f.orchestrator.trigger(RewriteMode::Preview, None);
    assert!(matches!(
        outcome,
        TriggerOutcome::Aborted(RedraftError::NoSurfaceFound)
    ));
    assert_eq!(f.orchestrator.state(), SessionState::Idle);
    assert!(f.service.requests().is_empty());
    assert_eq!(
        f.notices.messages(),
        vec!["No text area found. Click in a text input field first."]
    );
}

#[test]
fn test_whitespace_draft() {
    let mut f = fixture();
    draft_box(&f.doc, "   \n\t ");

    let outcome = f.orchestrator.trigger(RewriteMode::Replace, None);
    assert!(matches!(outcome, TriggerOutcome::Aborted(RedraftError::EmptyDraft)));
    assert!(f.service.requests().is_empty());
    assert_eq!(f.orchestrator.state(), SessionState::Idle);
}

#[test]
fn test_service_error_leaves_surface() {
    let mut f = fixture();
    let area = draft_box(&f.doc, "my draft");

    f.orchestrator.trigger(RewriteMode::Replace, None);
    area.clear_calls();
    let review = f.orchestrator.handle_result(Err("quota exceeded".into()));

    assert!(review.is_none());
    assert!(area.calls().is_empty());
    assert_eq!(area.value().unwrap(), "my draft");
    assert_eq!(f.orchestrator.state(), SessionState::Idle);
    let last = f.notices.last().unwrap();
    assert_eq!(last.level, NoticeLevel::Error);
    assert_eq!(last.message, "Refinement failed: quota exceeded");
}

#[test]
fn test_trigger_while_in_flight_is_ignored() {
    let mut f = fixture();
    draft_box(&f.doc, "first draft");

    assert!(matches!(
        f.orchestrator.trigger(RewriteMode::Preview, None),
        TriggerOutcome::Dispatched(_)
    ));
    let notices_before = f.notices.notices().len();
    assert!(matches!(
        f.orchestrator.trigger(RewriteMode::Replace, None),
        TriggerOutcome::Busy
    ));
    assert_eq!(f.service.requests().len(), 1);
    assert_eq!(f.notices.notices().len(), notices_before);
    assert_eq!(f.orchestrator.session().mode(), RewriteMode::Preview);

    // The guard lifts once the cycle ends.
    f.orchestrator.handle_result(Err("boom".into()));
    assert!(matches!(
        f.orchestrator.trigger(RewriteMode::Replace, None),
        TriggerOutcome::Dispatched(_)
    ));
}

#[test]
fn test_no_changes() {
    let mut f = fixture();
    draft_box(&f.doc, "Already perfect.");

    f.orchestrator.trigger(RewriteMode::Preview, None);
    assert!(f.orchestrator.handle_result(refined("Already perfect.")).is_none());
    assert_eq!(f.notices.last(), Some(Notice::info("No changes detected")));
    assert_eq!(f.orchestrator.state(), SessionState::Idle);
}

#[test]
fn test_cancel_discards_result() {
    let mut f = fixture();
    let area = draft_box(&f.doc, "draft");

    assert!(!f.orchestrator.cancel());
    f.orchestrator.trigger(RewriteMode::Preview, None);
    assert!(f.orchestrator.cancel());
    assert!(f.orchestrator.session().is_discarded());
    assert!(matches!(
        f.orchestrator.trigger(RewriteMode::Preview, None),
        TriggerOutcome::Busy
    ));

    let notices_before = f.notices.notices().len();
    assert!(f.orchestrator.handle_result(refined("Draft.")).is_none());
    assert_eq!(f.notices.notices().len(), notices_before);
    assert_eq!(area.value().unwrap(), "draft");
    assert_eq!(f.orchestrator.state(), SessionState::Idle);
}

#[test]
fn test_result_without_request_is_dropped() {
    let mut f = fixture();
    draft_box(&f.doc, "draft");
    assert!(f.orchestrator.handle_result(refined("Draft.")).is_none());
    assert!(f.notices.notices().is_empty());
}

#[test]
fn test_stale_context() {
    let mut f = fixture();
    draft_box(&f.doc, "draft");
    f.service.invalidate();

    let outcome = f.orchestrator.trigger(RewriteMode::Preview, None);
    assert!(matches!(outcome, TriggerOutcome::Aborted(RedraftError::StaleContext)));
    assert_eq!(
        f.notices.messages(),
        vec!["Extension was reloaded. Please refresh the page to continue."]
    );
}

#[test]
fn test_transport_failure_returns_to_idle() {
    let mut f = fixture();
    draft_box(&f.doc, "draft");
    f.service.fail_with("port closed");

    let outcome = f.orchestrator.trigger(RewriteMode::Preview, None);
    assert!(matches!(outcome, TriggerOutcome::Aborted(RedraftError::Transport(_))));
    assert_eq!(f.orchestrator.state(), SessionState::Idle);
    assert!(f.orchestrator.session().surface().is_none());
    assert_eq!(
        f.notices.messages(),
        vec!["Extension communication error. Please reload the page."]
    );
}

#[test]
fn test_missing_api_key() {
    let doc = MockDocument::new("example.com");
    draft_box(&doc, "draft");
    let notices = NoticeLog::new();
    let service = MockService::new();
    let mut orchestrator = Orchestrator::new(
        doc,
        service.clone(),
        StaticSettings {
            api_key: Some("  ".into()),
            system_prompt: None,
        },
        notices.clone(),
        RedraftConfig::default(),
    );

    let outcome = orchestrator.trigger(RewriteMode::Preview, None);
    assert!(matches!(outcome, TriggerOutcome::Aborted(RedraftError::ConfigMissing)));
    assert!(service.requests().is_empty());

    orchestrator.settings_mut().api_key = Some("sk-real".into());
    assert!(matches!(
        orchestrator.trigger(RewriteMode::Preview, None),
        TriggerOutcome::Dispatched(_)
    ));
}

#[test]
fn test_custom_instruction() {
    let mut f = fixture();
    draft_box(&f.doc, "pls review");

    let outcome = f.orchestrator.trigger(RewriteMode::Custom, Some("   "));
    assert!(matches!(
        outcome,
        TriggerOutcome::Aborted(RedraftError::EmptyInstruction)
    ));
    assert_eq!(f.notices.messages(), vec!["Please enter a custom instruction"]);

    let outcome = f
        .orchestrator
        .trigger(RewriteMode::Custom, Some("  make it formal "));
    let TriggerOutcome::Dispatched(request) = outcome else {
        panic!("expected dispatch");
    };
    assert_eq!(request.custom_instruction.as_deref(), Some("make it formal"));
    assert_eq!(request.mode, RewriteMode::Custom);
    assert_eq!(
        f.notices.last(),
        Some(Notice::info(
            "Refining with custom instruction: \"make it formal\"..."
        ))
    );
}

#[test]
fn test_request_carries_history() {
    let mut f = fixture();
    let thread = f.doc.body().child("div").class("thread");
    thread
        .child("div")
        .class("message")
        .child("span")
        .class("message-text")
        .text("can you send the report?");
    thread
        .child("div")
        .class("message")
        .class("outgoing")
        .child("span")
        .class("message-text")
        .text("sure, later today");
    draft_box(&f.doc, "here it is");

    let TriggerOutcome::Dispatched(request) = f.orchestrator.trigger(RewriteMode::Preview, None)
    else {
        panic!("expected dispatch");
    };
    let history: Vec<_> = request
        .history
        .iter()
        .map(|m| (m.text.as_str(), m.sender))
        .collect();
    assert_eq!(
        history,
        vec![
            ("can you send the report?", Sender::Other),
            ("sure, later today", Sender::Myself)
        ]
    );
}

#[tokio::test]
async fn test_detached_surface_fails_accept() {
    let mut f = fixture();
    let area = draft_box(&f.doc, "draft here");

    f.orchestrator.trigger(RewriteMode::Replace, None);
    let review = f.orchestrator.handle_result(refined("Draft here.")).unwrap();
    area.detach();

    let err = review.accept(&f.notices).await.unwrap_err();
    assert!(matches!(err, RedraftError::WriteFailure { ref attempts } if attempts.is_empty()));
}
