//! Declarative write recipes.
//!
//! A recipe is the ordered list of steps one write strategy performs against
//! a surface: surface actions, synthetic events and fixed waits. Recipes are
//! plain data so the exact dispatch sequence can be asserted in tests; the
//! [`crate::writer`] module runs them and verifies the result.

use serde::Serialize;

use crate::config::WriterConfig;
use crate::types::SurfaceKind;

/// One way of getting text into a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WriteStrategy {
    /// Select all, native delete, then `beforeinput` insertFromPaste.
    NativeTransaction,
    /// Paste event bracketed by the keystrokes of a paste shortcut.
    PasteEvent,
    /// Clear and rebuild the subtree, in several event bursts.
    ResetSubtree,
    /// Select all (cleared manually if the selection falls short), then paste.
    ClipboardPaste,
    /// `execCommand('insertText')` over the selection.
    EditCommand,
    /// Clear, assign the value or content, notify.
    DirectMutation,
}

const GENERIC_CHAIN: &[WriteStrategy] = &[
    WriteStrategy::ClipboardPaste,
    WriteStrategy::EditCommand,
    WriteStrategy::DirectMutation,
];

const FRAMEWORK_CHAIN: &[WriteStrategy] = &[
    WriteStrategy::NativeTransaction,
    WriteStrategy::PasteEvent,
    WriteStrategy::ResetSubtree,
    WriteStrategy::ClipboardPaste,
    WriteStrategy::EditCommand,
    WriteStrategy::DirectMutation,
];

impl WriteStrategy {
    /// Strategies to try for a surface kind, in order.
    pub fn chain(kind: &SurfaceKind) -> &'static [WriteStrategy] {
        match kind {
            SurfaceKind::FrameworkEditor(_) => FRAMEWORK_CHAIN,
            SurfaceKind::ContentEditable | SurfaceKind::PlainControl => GENERIC_CHAIN,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WriteStrategy::NativeTransaction => "native-transaction",
            WriteStrategy::PasteEvent => "paste-event",
            WriteStrategy::ResetSubtree => "reset-subtree",
            WriteStrategy::ClipboardPaste => "clipboard-paste",
            WriteStrategy::EditCommand => "edit-command",
            WriteStrategy::DirectMutation => "direct-mutation",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    BeforeInput,
    Input,
    Change,
    Paste,
    KeyDown,
    KeyUp,
    CompositionStart,
    CompositionEnd,
}

impl EventKind {
    /// DOM event type string.
    pub fn event_type(&self) -> &'static str {
        match self {
            EventKind::BeforeInput => "beforeinput",
            EventKind::Input => "input",
            EventKind::Change => "change",
            EventKind::Paste => "paste",
            EventKind::KeyDown => "keydown",
            EventKind::KeyUp => "keyup",
            EventKind::CompositionStart => "compositionstart",
            EventKind::CompositionEnd => "compositionend",
        }
    }
}

/// A synthetic event to dispatch at the surface.
///
/// Every event bubbles. `transfer` means `data` travels in a `DataTransfer`
/// as `text/plain` rather than in the event's `data` field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventDescriptor {
    pub kind: EventKind,
    pub input_type: Option<String>,
    pub data: Option<String>,
    pub transfer: bool,
    pub key: Option<String>,
    /// Whether the paste shortcut modifier (ctrl/meta) is held.
    pub modifier: bool,
    pub cancelable: bool,
}

impl EventDescriptor {
    fn bare(kind: EventKind) -> Self {
        Self {
            kind,
            input_type: None,
            data: None,
            transfer: false,
            key: None,
            modifier: false,
            cancelable: false,
        }
    }

    /// `input` of type insertText carrying the new value.
    pub fn input(text: &str) -> Self {
        Self {
            input_type: Some("insertText".into()),
            data: Some(text.into()),
            ..Self::bare(EventKind::Input)
        }
    }

    pub fn change() -> Self {
        Self::bare(EventKind::Change)
    }

    /// Cancelable `beforeinput` insertFromPaste with a `DataTransfer`.
    pub fn before_input_paste(text: &str) -> Self {
        Self {
            input_type: Some("insertFromPaste".into()),
            data: Some(text.into()),
            transfer: true,
            cancelable: true,
            ..Self::bare(EventKind::BeforeInput)
        }
    }

    /// Cancelable `paste` with a `DataTransfer` payload.
    pub fn paste(text: &str) -> Self {
        Self {
            data: Some(text.into()),
            transfer: true,
            cancelable: true,
            ..Self::bare(EventKind::Paste)
        }
    }

    pub fn key_down(key: &str, modifier: bool) -> Self {
        Self {
            key: Some(key.into()),
            modifier,
            cancelable: true,
            ..Self::bare(EventKind::KeyDown)
        }
    }

    pub fn key_up(key: &str, modifier: bool) -> Self {
        Self {
            key: Some(key.into()),
            modifier,
            ..Self::bare(EventKind::KeyUp)
        }
    }

    pub fn composition_start() -> Self {
        Self::bare(EventKind::CompositionStart)
    }

    pub fn composition_end(text: &str) -> Self {
        Self {
            data: Some(text.into()),
            ..Self::bare(EventKind::CompositionEnd)
        }
    }
}

/// A direct operation on the surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceAction {
    Focus,
    /// Select the whole content. With `verify`, a selection shorter than the
    /// prior text is replaced by a manual clear.
    SelectAll { verify: bool },
    ExecDelete,
    ExecInsert(String),
    Clear,
    Assign(String),
    Rebuild(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Act(SurfaceAction),
    Emit(EventDescriptor),
    Wait(u32),
    /// Verify now and stop early on success. The runner always verifies at
    /// the end of a recipe, so this only marks intermediate points.
    Checkpoint,
}

/// The steps one strategy performs to write `text`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recipe {
    pub strategy: WriteStrategy,
    pub steps: Vec<Step>,
}

impl Recipe {
    pub fn build(strategy: WriteStrategy, text: &str, config: &WriterConfig) -> Self {
        use Step::{Act, Emit, Wait};
        use SurfaceAction::*;

        let mut steps = match strategy {
            WriteStrategy::NativeTransaction => vec![
                Act(Focus),
                Act(SelectAll { verify: false }),
                Act(ExecDelete),
                Emit(EventDescriptor::before_input_paste(text)),
                Wait(config.settle_delay_ms),
            ],
            WriteStrategy::PasteEvent => vec![
                Act(Focus),
                Act(SelectAll { verify: false }),
                Emit(EventDescriptor::key_down("v", true)),
                Emit(EventDescriptor::paste(text)),
                Emit(EventDescriptor::key_up("v", true)),
                Wait(config.settle_delay_ms),
            ],
            WriteStrategy::ResetSubtree => {
                let mut steps = Vec::new();
                for burst in 0..config.reset_attempts.max(1) {
                    if burst > 0 {
                        steps.push(Wait(config.burst_delay_ms));
                        steps.push(Step::Checkpoint);
                    }
                    steps.extend([
                        Act(Focus),
                        Emit(EventDescriptor::composition_start()),
                        Act(Clear),
                        Act(Rebuild(text.to_string())),
                        Emit(EventDescriptor::composition_end(text)),
                    ]);
                    if burst + 1 < config.reset_attempts {
                        steps.push(Emit(EventDescriptor::input(text)));
                        steps.push(Emit(EventDescriptor::change()));
                    }
                }
                steps
            }
            WriteStrategy::ClipboardPaste => vec![
                Act(Focus),
                Act(SelectAll { verify: true }),
                Emit(EventDescriptor::paste(text)),
                Wait(config.settle_delay_ms),
            ],
            WriteStrategy::EditCommand => vec![
                Act(Focus),
                Act(SelectAll { verify: false }),
                Act(ExecInsert(text.to_string())),
            ],
            WriteStrategy::DirectMutation => vec![
                Act(Focus),
                Act(Clear),
                Act(Assign(text.to_string())),
            ],
        };

        steps.push(Emit(EventDescriptor::input(text)));
        steps.push(Emit(EventDescriptor::change()));

        Self { strategy, steps }
    }

    /// Events this recipe dispatches, in order.
    pub fn events(&self) -> impl Iterator<Item = &EventDescriptor> {
        self.steps.iter().filter_map(|step| match step {
            Step::Emit(event) => Some(event),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FrameworkVariant;

    fn kinds(recipe: &Recipe) -> Vec<EventKind> {
        recipe.events().map(|e| e.kind).collect()
    }

    #[test]
    fn test_chains_by_kind() {
        let framework = SurfaceKind::FrameworkEditor(FrameworkVariant::Lexical);
        assert_eq!(WriteStrategy::chain(&framework).len(), 6);
        assert_eq!(
            WriteStrategy::chain(&framework)[0],
            WriteStrategy::NativeTransaction
        );
        assert_eq!(
            WriteStrategy::chain(&SurfaceKind::ContentEditable),
            WriteStrategy::chain(&SurfaceKind::PlainControl)
        );
        assert_eq!(
            WriteStrategy::chain(&SurfaceKind::PlainControl),
            &FRAMEWORK_CHAIN[3..]
        );
    }

    #[test]
    fn test_every_recipe_ends_with_notification() {
        let config = WriterConfig::default();
        for &strategy in FRAMEWORK_CHAIN {
            let recipe = Recipe::build(strategy, "new text", &config);
            let n = recipe.steps.len();
            assert_eq!(
                recipe.steps[n - 2],
                Step::Emit(EventDescriptor::input("new text")),
                "{strategy:?}"
            );
            assert_eq!(recipe.steps[n - 1], Step::Emit(EventDescriptor::change()));
        }
    }

    #[test]
    fn test_native_transaction_sequence() {
        let recipe = Recipe::build(
            WriteStrategy::NativeTransaction,
            "hello",
            &WriterConfig::default(),
        );
        assert_eq!(
            kinds(&recipe),
            vec![EventKind::BeforeInput, EventKind::Input, EventKind::Change]
        );
        let before = recipe.events().next().unwrap();
        assert_eq!(before.input_type.as_deref(), Some("insertFromPaste"));
        assert!(before.transfer);
        assert!(recipe.steps.contains(&Step::Act(SurfaceAction::ExecDelete)));
        assert!(recipe.steps.contains(&Step::Wait(50)));
    }

    #[test]
    fn test_reset_subtree_bursts_and_checkpoints() {
        let config = WriterConfig {
            reset_attempts: 3,
            burst_delay_ms: 20,
            ..Default::default()
        };
        let recipe = Recipe::build(WriteStrategy::ResetSubtree, "x", &config);
        let rebuilds = recipe
            .steps
            .iter()
            .filter(|s| matches!(s, Step::Act(SurfaceAction::Rebuild(_))))
            .count();
        let checkpoints = recipe
            .steps
            .iter()
            .filter(|s| **s == Step::Checkpoint)
            .count();
        assert_eq!(rebuilds, 3);
        assert_eq!(checkpoints, 2);
        assert_eq!(
            recipe.steps.iter().filter(|s| **s == Step::Wait(20)).count(),
            2
        );
    }

    #[test]
    fn test_clipboard_paste_verifies_selection() {
        let recipe = Recipe::build(
            WriteStrategy::ClipboardPaste,
            "x",
            &WriterConfig::default(),
        );
        assert_eq!(
            recipe.steps[1],
            Step::Act(SurfaceAction::SelectAll { verify: true })
        );
        assert_eq!(
            kinds(&recipe),
            vec![EventKind::Paste, EventKind::Input, EventKind::Change]
        );
    }
}
