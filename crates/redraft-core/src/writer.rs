//! Writing text back into a surface.
//!
//! Runs the strategy chain for the surface kind, verifying after every
//! recipe. The first verified strategy wins; exhausting the chain is a
//! [`RedraftError::WriteFailure`]. Nothing is rolled back and nothing is
//! retried.

use crate::config::WriterConfig;
use crate::error::{PlatformError, RedraftError};
use crate::extract::{normalize_whitespace, read_raw};
use crate::host::{HostElement, WriteSurface};
use crate::recipe::{Recipe, Step, SurfaceAction, WriteStrategy};
use crate::types::{SurfaceKind, WriteAttemptOutcome};

/// Attempts made by a successful write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteReport {
    /// The strategy whose result verified.
    pub strategy: WriteStrategy,
    pub attempts: Vec<WriteAttemptOutcome>,
}

/// Replace the surface's text with `text`.
///
/// On success a raw read of the surface equals `text` up to whitespace
/// normalization, and the caret sits at the end.
pub async fn write<S>(
    surface: &S,
    kind: &SurfaceKind,
    text: &str,
    config: &WriterConfig,
) -> Result<WriteReport, RedraftError>
where
    S: HostElement + WriteSurface,
{
    if !surface.is_connected() {
        tracing::warn!(target: "redraft::writer", "surface detached before write");
        return Err(RedraftError::WriteFailure {
            attempts: Vec::new(),
        });
    }

    let target = normalize_whitespace(text);
    let mut attempts = Vec::new();

    for &strategy in WriteStrategy::chain(kind) {
        let recipe = Recipe::build(strategy, text, config);
        let outcome = run_recipe(surface, kind, &recipe, &target).await;
        tracing::debug!(
            target: "redraft::writer",
            strategy = strategy.name(),
            succeeded = outcome.succeeded,
            observed_chars = outcome.observed_text.chars().count(),
            "write attempt"
        );
        let succeeded = outcome.succeeded;
        attempts.push(outcome);

        if succeeded {
            if let Err(err) = surface.place_caret_at_end() {
                tracing::debug!(target: "redraft::writer", %err, "could not move caret");
            }
            return Ok(WriteReport { strategy, attempts });
        }
    }

    tracing::warn!(target: "redraft::writer", attempts = attempts.len(), "write strategies exhausted");
    Err(RedraftError::WriteFailure { attempts })
}

async fn run_recipe<S>(
    surface: &S,
    kind: &SurfaceKind,
    recipe: &Recipe,
    target: &str,
) -> WriteAttemptOutcome
where
    S: HostElement + WriteSurface,
{
    let outcome = |succeeded: bool| {
        let observed_text = read_raw(surface, kind);
        let succeeded = succeeded && normalize_whitespace(&observed_text) == target;
        WriteAttemptOutcome {
            strategy: recipe.strategy,
            succeeded,
            observed_text,
        }
    };

    for step in &recipe.steps {
        let result = match step {
            Step::Act(action) => apply(surface, kind, action),
            Step::Emit(event) => surface.dispatch(event),
            Step::Wait(ms) => {
                surface.sleep(*ms).await;
                Ok(())
            }
            Step::Checkpoint => {
                let checked = outcome(true);
                if checked.succeeded {
                    return checked;
                }
                Ok(())
            }
        };
        if let Err(err) = result {
            tracing::debug!(
                target: "redraft::writer",
                strategy = recipe.strategy.name(),
                %err,
                "step failed"
            );
            return outcome(false);
        }
    }

    outcome(true)
}

/// Block boundaries read as newlines in `innerText` but vanish from a range's
/// text, so only non-whitespace characters are compared.
fn visible_chars(s: &str) -> usize {
    s.chars().filter(|c| !c.is_whitespace()).count()
}

fn apply<S>(surface: &S, kind: &SurfaceKind, action: &SurfaceAction) -> Result<(), PlatformError>
where
    S: HostElement + WriteSurface,
{
    match action {
        SurfaceAction::Focus => surface.focus(),
        SurfaceAction::SelectAll { verify } => {
            let prior = read_raw(surface, kind);
            surface.select_all()?;
            if *verify {
                let expected = visible_chars(&prior);
                let selected = visible_chars(&surface.selected_text());
                if selected < expected {
                    tracing::debug!(
                        target: "redraft::writer",
                        selected,
                        expected,
                        "selection short of content, clearing"
                    );
                    surface.clear()?;
                }
            }
            Ok(())
        }
        SurfaceAction::ExecDelete => surface.exec_delete().map(|_| ()),
        SurfaceAction::ExecInsert(text) => surface.exec_insert_text(text).map(|_| ()),
        SurfaceAction::Clear => surface.clear(),
        SurfaceAction::Assign(text) => surface.assign(text),
        SurfaceAction::Rebuild(text) => surface.rebuild(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockCall, MockDocument, MockElement, WriteBehavior};
    use crate::recipe::{EventDescriptor, EventKind};
    use crate::types::FrameworkVariant;

    fn editor(doc: &MockDocument, behavior: WriteBehavior) -> MockElement {
        doc.body()
            .child("div")
            .attr("contenteditable", "true")
            .text("old draft text")
            .behavior(behavior)
    }

    fn strategies(report: &[WriteAttemptOutcome]) -> Vec<WriteStrategy> {
        report.iter().map(|a| a.strategy).collect()
    }

    #[tokio::test]
    async fn test_first_strategy_wins() {
        let doc = MockDocument::new("example.com");
        let el = editor(&doc, WriteBehavior::default());
        let report = write(&el, &SurfaceKind::ContentEditable, "new text", &WriterConfig::default())
            .await
            .unwrap();

        assert_eq!(report.strategy, WriteStrategy::ClipboardPaste);
        assert_eq!(report.attempts.len(), 1);
        assert_eq!(el.inner_text().unwrap(), "new text");
        assert_eq!(el.calls().last(), Some(&MockCall::CaretAtEnd));

        let kinds: Vec<_> = el.events().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::Paste, EventKind::Input, EventKind::Change]);
        assert_eq!(el.events()[1], EventDescriptor::input("new text"));
    }

    #[tokio::test]
    async fn test_falls_through_to_direct_mutation() {
        let doc = MockDocument::new("example.com");
        let el = doc.body().child("textarea").with_value("old").behavior(WriteBehavior {
            paste_event: false,
            exec_commands: false,
            ..Default::default()
        });

        let report = write(&el, &SurfaceKind::PlainControl, "brand new", &WriterConfig::default())
            .await
            .unwrap();
        assert_eq!(report.strategy, WriteStrategy::DirectMutation);
        assert_eq!(
            strategies(&report.attempts),
            vec![
                WriteStrategy::ClipboardPaste,
                WriteStrategy::EditCommand,
                WriteStrategy::DirectMutation
            ]
        );
        assert!(!report.attempts[0].succeeded);
        assert_eq!(el.value().unwrap(), "brand new");
    }

    #[tokio::test]
    async fn test_partial_selection_is_cleared_before_paste() {
        let doc = MockDocument::new("example.com");
        let el = editor(
            &doc,
            WriteBehavior {
                partial_select: true,
                ..Default::default()
            },
        );
        let report = write(&el, &SurfaceKind::ContentEditable, "fresh", &WriterConfig::default())
            .await
            .unwrap();
        assert_eq!(report.strategy, WriteStrategy::ClipboardPaste);
        assert!(el.calls().contains(&MockCall::Clear));
        assert_eq!(el.inner_text().unwrap(), "fresh");
    }

    #[tokio::test]
    async fn test_full_selection_across_blocks_is_kept() {
        let doc = MockDocument::new("example.com");
        let el = doc.body().child("div").attr("contenteditable", "true");
        for line in ["first line", "second line", "third"] {
            el.child("p").text(line);
        }
        assert_eq!(el.inner_text().unwrap(), "first line\nsecond line\nthird");

        let report = write(&el, &SurfaceKind::ContentEditable, "fresh", &WriterConfig::default())
            .await
            .unwrap();
        assert_eq!(report.strategy, WriteStrategy::ClipboardPaste);
        assert!(!el.calls().contains(&MockCall::Clear));
        assert_eq!(el.inner_text().unwrap(), "fresh");
    }

    #[tokio::test]
    async fn test_framework_chain_order() {
        let doc = MockDocument::new("example.com");
        let el = editor(
            &doc,
            WriteBehavior {
                before_input_paste: false,
                paste_event: false,
                ..Default::default()
            },
        );
        let kind = SurfaceKind::FrameworkEditor(FrameworkVariant::Lexical);
        let report = write(&el, &kind, "line one\nline two", &WriterConfig::default())
            .await
            .unwrap();

        assert_eq!(report.strategy, WriteStrategy::ResetSubtree);
        assert_eq!(
            strategies(&report.attempts),
            vec![
                WriteStrategy::NativeTransaction,
                WriteStrategy::PasteEvent,
                WriteStrategy::ResetSubtree
            ]
        );
        assert_eq!(el.inner_text().unwrap(), "line one\nline two");
    }

    #[tokio::test]
    async fn test_reset_subtree_stops_at_first_verified_burst() {
        let doc = MockDocument::new("example.com");
        let el = editor(
            &doc,
            WriteBehavior {
                before_input_paste: false,
                paste_event: false,
                exec_commands: false,
                ..Default::default()
            },
        );
        let kind = SurfaceKind::FrameworkEditor(FrameworkVariant::Slate);
        write(&el, &kind, "x y", &WriterConfig::default()).await.unwrap();

        let rebuilds = el
            .calls()
            .iter()
            .filter(|c| matches!(c, MockCall::Rebuild(_)))
            .count();
        assert_eq!(rebuilds, 1);
    }

    #[tokio::test]
    async fn test_exhaustion_reports_every_attempt() {
        let doc = MockDocument::new("example.com");
        let el = editor(&doc, WriteBehavior::inert());
        let kind = SurfaceKind::FrameworkEditor(FrameworkVariant::Quill);

        let err = write(&el, &kind, "nope", &WriterConfig::default())
            .await
            .unwrap_err();
        let RedraftError::WriteFailure { attempts } = err else {
            panic!("expected write failure, got {err:?}");
        };
        assert_eq!(attempts.len(), 6);
        assert!(attempts.iter().all(|a| !a.succeeded));
        assert!(attempts.iter().all(|a| a.observed_text == "old draft text"));
        assert!(!el.calls().contains(&MockCall::CaretAtEnd));
    }

    #[tokio::test]
    async fn test_failing_dispatch_moves_to_next_strategy() {
        let doc = MockDocument::new("example.com");
        let el = editor(
            &doc,
            WriteBehavior {
                fail_dispatch: true,
                ..Default::default()
            },
        );
        let err = write(&el, &SurfaceKind::ContentEditable, "abc", &WriterConfig::default())
            .await
            .unwrap_err();
        // Every recipe dispatches events, so every attempt fails, but the
        // direct assignment still landed before its notification failed.
        let RedraftError::WriteFailure { attempts } = err else {
            panic!("expected write failure");
        };
        assert_eq!(attempts.len(), 3);
        assert_eq!(el.inner_text().unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_detached_surface_fails_without_attempts() {
        let doc = MockDocument::new("example.com");
        let el = editor(&doc, WriteBehavior::default());
        el.detach();

        let err = write(&el, &SurfaceKind::ContentEditable, "x", &WriterConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RedraftError::WriteFailure { ref attempts } if attempts.is_empty()));
        assert!(el.calls().is_empty());
    }

    #[tokio::test]
    async fn test_whitespace_normalized_verification() {
        let doc = MockDocument::new("example.com");
        let el = editor(&doc, WriteBehavior::default());
        let report = write(
            &el,
            &SurfaceKind::ContentEditable,
            "  spaced   out\n",
            &WriterConfig::default(),
        )
        .await
        .unwrap();
        assert!(report.attempts[0].succeeded);
    }
}
