//! redraft-core: draft-rewrite logic without any browser dependency.
//!
//! This crate provides:
//! - `HostDocument` / `HostElement` / `WriteSurface` traits abstracting the page
//! - `Classifier` and `locate` for finding the editable surface
//! - `extract_text` and `clean` for reading surfaces and page text
//! - `harvest` for conversation context under a token budget
//! - `compute_diff` for display hunks
//! - write recipes and the verified fallback chain in `writer`
//! - `Orchestrator`, the guarded rewrite-cycle state machine
//! - prompt text, the page message protocol and keyboard shortcuts
//!
//! Everything is generic over the host traits so the same logic runs against
//! `web-sys` in the browser crate and against the in-memory DOM in tests.

pub mod classify;
pub mod config;
pub mod diff;
pub mod error;
pub mod extract;
pub mod harvest;
pub mod host;
pub mod locate;
pub mod message;
pub mod present;
pub mod prompt;
pub mod recipe;
pub mod session;
pub mod shortcuts;
pub mod types;
pub mod writer;

#[cfg(any(test, feature = "testing"))]
pub mod mock;

pub use classify::{Classifier, SurfaceStrategy};
pub use config::{FrameworkSignature, RedraftConfig, SelectorGroup, SelectorTables, WriterConfig};
pub use diff::{Token, compute_diff, tokenize};
pub use error::{PlatformError, RedraftError};
pub use extract::{clean, estimate_tokens, extract_text, normalize_whitespace, read_raw};
pub use harvest::harvest;
pub use host::{HostDocument, HostElement, LayoutHints, WriteSurface};
pub use locate::locate;
pub use message::{CompletionData, ContentMessage, PingReply};
pub use present::{PanelPlacement, Rect, Segment, anchor_panel, render_segments};
pub use prompt::{DEFAULT_SYSTEM_PROMPT, build_prompt};
pub use recipe::{EventDescriptor, EventKind, Recipe, Step, SurfaceAction, WriteStrategy};
pub use session::{
    ConfigSource, NoticeSink, Orchestrator, Review, RewriteService, RewriteSession, SessionState,
    TriggerOutcome,
};
pub use shortcuts::{Command, KeyInput, Modifiers, Overlay, match_shortcut};
pub use types::{
    ConversationMessage, DiffHunk, EditableSurface, FrameworkVariant, HunkKind, Notice,
    NoticeLevel, RewriteMode, RewriteRequest, RewriteResult, Sender, SurfaceKind,
    WriteAttemptOutcome,
};
pub use writer::{WriteReport, write};
