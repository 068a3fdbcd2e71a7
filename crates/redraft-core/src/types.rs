//! Core data types for one rewrite cycle.
//!
//! All of these are created when the user triggers a rewrite and dropped when
//! the cycle ends. None of them outlive the page.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::recipe::WriteStrategy;

/// Known framework-managed rich-text editors.
///
/// `Other` carries the name of a signature defined only in configuration.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FrameworkVariant {
    Quill,
    DraftJs,
    Lexical,
    ProseMirror,
    Slate,
    Other(String),
}

impl FrameworkVariant {
    pub fn name(&self) -> &str {
        match self {
            FrameworkVariant::Quill => "quill",
            FrameworkVariant::DraftJs => "draft-js",
            FrameworkVariant::Lexical => "lexical",
            FrameworkVariant::ProseMirror => "prosemirror",
            FrameworkVariant::Slate => "slate",
            FrameworkVariant::Other(name) => name,
        }
    }
}

/// How a surface must be read and written.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SurfaceKind {
    /// `<textarea>` or a text-like `<input>`.
    PlainControl,
    /// Any contenteditable or `role="textbox"` element nobody else claims.
    ContentEditable,
    /// Contenteditable governed by a JS editor framework.
    FrameworkEditor(FrameworkVariant),
}

impl SurfaceKind {
    pub fn is_plain(&self) -> bool {
        matches!(self, SurfaceKind::PlainControl)
    }

    pub fn is_framework(&self) -> bool {
        matches!(self, SurfaceKind::FrameworkEditor(_))
    }
}

/// A host element acting as the user's text input, with its classification.
///
/// The element belongs to the page. This is a transient handle for one cycle
/// and must be re-validated before writing.
#[derive(Clone, Debug)]
pub struct EditableSurface<E> {
    pub element: E,
    pub kind: SurfaceKind,
}

impl<E> EditableSurface<E> {
    pub fn new(element: E, kind: SurfaceKind) -> Self {
        Self { element, kind }
    }
}

/// Who wrote a harvested message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Sender {
    #[serde(rename = "me")]
    Myself,
    Other,
}

impl Sender {
    pub fn label(&self) -> &'static str {
        match self {
            Sender::Myself => "me",
            Sender::Other => "other",
        }
    }
}

/// One message of page context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMessage {
    pub text: String,
    pub sender: Sender,
    /// Milliseconds since the Unix epoch, when the page exposes a parseable time.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timestamp: Option<i64>,
}

/// What the user asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RewriteMode {
    /// Write the result in place, let the user keep or revert it.
    Preview,
    /// Show the result next to the surface, write on accept.
    Replace,
    /// Same as `Replace`, with a user-supplied instruction.
    Custom,
}

/// Everything the rewrite service needs. Built fresh per trigger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteRequest {
    pub draft_text: String,
    pub history: Vec<ConversationMessage>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub custom_instruction: Option<String>,
    pub mode: RewriteMode,
}

/// Successful output of the rewrite service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteResult {
    pub refined_text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HunkKind {
    Change,
}

/// A token-aligned region where original and refined text differ.
///
/// Spans are token indices into the respective `tokenize` output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffHunk {
    pub kind: HunkKind,
    pub original_span: Range<usize>,
    pub refined_span: Range<usize>,
    pub original_text: String,
    pub refined_text: String,
}

/// Result of running one write strategy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteAttemptOutcome {
    pub strategy: WriteStrategy,
    pub succeeded: bool,
    /// Raw surface text read back after the attempt.
    pub observed_text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A transient, dismissable message for the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}
