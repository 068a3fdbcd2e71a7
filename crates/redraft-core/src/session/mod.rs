//! The rewrite cycle.
//!
//! [`Orchestrator`] owns the page handles, the collaborators and a single
//! [`RewriteSession`]. It is a synchronous state machine:
//!
//! ```text
//! Idle -> Capturing -> AwaitingResult -> Idle
//! ```
//!
//! so it can sit behind a `RefCell` without a borrow crossing an await. When
//! a result arrives, the async part (writing) moves out into a [`Review`].

mod review;

#[cfg(test)]
mod tests;

use std::rc::Rc;

pub use review::Review;

use crate::classify::Classifier;
use crate::config::RedraftConfig;
use crate::diff::compute_diff;
use crate::error::RedraftError;
use crate::extract::{extract_text, read_raw};
use crate::harvest::harvest;
use crate::host::HostDocument;
use crate::locate::locate;
use crate::types::{EditableSurface, Notice, RewriteMode, RewriteRequest, RewriteResult};

/// Hands requests to whatever performs the rewrite.
///
/// Fire-and-forget: the result comes back later through
/// [`Orchestrator::handle_result`].
pub trait RewriteService {
    /// `Err` is [`RedraftError::Transport`], or [`RedraftError::StaleContext`]
    /// when the transport reports that the embedding context is gone.
    fn dispatch(&self, request: &RewriteRequest) -> Result<(), RedraftError>;

    /// Whether the embedding context (extension runtime) is still alive.
    fn context_valid(&self) -> bool;
}

/// Externally stored settings.
pub trait ConfigSource {
    fn api_key(&self) -> Option<String>;

    fn system_prompt_override(&self) -> Option<String>;
}

/// Where user-visible notices go.
pub trait NoticeSink {
    fn notify(&self, notice: &Notice);
}

impl<T: NoticeSink + ?Sized> NoticeSink for &T {
    fn notify(&self, notice: &Notice) {
        (**self).notify(notice)
    }
}

impl<T: NoticeSink + ?Sized> NoticeSink for Rc<T> {
    fn notify(&self, notice: &Notice) {
        (**self).notify(notice)
    }
}

impl<T: RewriteService + ?Sized> RewriteService for Rc<T> {
    fn dispatch(&self, request: &RewriteRequest) -> Result<(), RedraftError> {
        (**self).dispatch(request)
    }

    fn context_valid(&self) -> bool {
        (**self).context_valid()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Capturing,
    AwaitingResult,
}

/// State of the one in-flight cycle. Reset to idle at every terminal
/// transition.
#[derive(Debug)]
pub struct RewriteSession<E> {
    state: SessionState,
    surface: Option<EditableSurface<E>>,
    original: String,
    /// Uncleaned surface content at capture, what a reject restores.
    snapshot: String,
    mode: RewriteMode,
    instruction: Option<String>,
    discard: bool,
}

impl<E> Default for RewriteSession<E> {
    fn default() -> Self {
        Self {
            state: SessionState::Idle,
            surface: None,
            original: String::new(),
            snapshot: String::new(),
            mode: RewriteMode::Preview,
            instruction: None,
            discard: false,
        }
    }
}

impl<E> RewriteSession<E> {
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn mode(&self) -> RewriteMode {
        self.mode
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn snapshot(&self) -> &str {
        &self.snapshot
    }

    pub fn surface(&self) -> Option<&EditableSurface<E>> {
        self.surface.as_ref()
    }

    pub fn is_discarded(&self) -> bool {
        self.discard
    }
}

/// What a trigger did.
#[derive(Debug)]
pub enum TriggerOutcome {
    /// A cycle is already running; nothing happened.
    Busy,
    /// The request went out; the session awaits its result.
    Dispatched(RewriteRequest),
    /// The cycle ended early. The error was already shown as a notice.
    Aborted(RedraftError),
}

pub struct Orchestrator<D, R, C, N>
where
    D: HostDocument,
{
    document: D,
    service: R,
    settings: C,
    notices: N,
    config: RedraftConfig,
    classifier: Classifier,
    session: RewriteSession<D::Element>,
}

impl<D, R, C, N> Orchestrator<D, R, C, N>
where
    D: HostDocument,
    R: RewriteService,
    C: ConfigSource,
    N: NoticeSink,
{
    pub fn new(document: D, service: R, settings: C, notices: N, config: RedraftConfig) -> Self {
        let classifier = Classifier::from_config(&config);
        Self {
            document,
            service,
            settings,
            notices,
            config,
            classifier,
            session: RewriteSession::default(),
        }
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn service(&self) -> &R {
        &self.service
    }

    pub fn config(&self) -> &RedraftConfig {
        &self.config
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn settings(&self) -> &C {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut C {
        &mut self.settings
    }

    pub fn notices(&self) -> &N {
        &self.notices
    }

    pub fn session(&self) -> &RewriteSession<D::Element> {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state
    }

    /// Start a cycle. A no-op while another cycle is running.
    pub fn trigger(&mut self, mode: RewriteMode, instruction: Option<&str>) -> TriggerOutcome {
        if self.session.state != SessionState::Idle {
            tracing::debug!(target: "redraft::session", state = ?self.session.state, ?mode, "trigger ignored, cycle in flight");
            return TriggerOutcome::Busy;
        }
        self.session.state = SessionState::Capturing;

        let request = match self.capture(mode, instruction) {
            Ok(request) => request,
            Err(err) => return self.abort(err),
        };

        if let Err(err) = self.service.dispatch(&request) {
            return self.abort(err);
        }

        self.session.state = SessionState::AwaitingResult;
        tracing::debug!(
            target: "redraft::session",
            ?mode,
            draft_chars = request.draft_text.chars().count(),
            history = request.history.len(),
            "request dispatched"
        );
        self.notices.notify(&busy_notice(mode, request.custom_instruction.as_deref()));
        TriggerOutcome::Dispatched(request)
    }

    fn capture(
        &mut self,
        mode: RewriteMode,
        instruction: Option<&str>,
    ) -> Result<RewriteRequest, RedraftError> {
        if !self.service.context_valid() {
            return Err(RedraftError::StaleContext);
        }

        let surface = locate(&self.document, &self.classifier, &self.config.tables)
            .ok_or(RedraftError::NoSurfaceFound)?;

        let draft = extract_text(&surface);
        if draft.trim().is_empty() {
            return Err(RedraftError::EmptyDraft);
        }

        let custom_instruction = match mode {
            RewriteMode::Custom => Some(
                instruction
                    .map(str::trim)
                    .filter(|i| !i.is_empty())
                    .ok_or(RedraftError::EmptyInstruction)?
                    .to_string(),
            ),
            RewriteMode::Preview | RewriteMode::Replace => None,
        };

        if self
            .settings
            .api_key()
            .is_none_or(|key| key.trim().is_empty())
        {
            return Err(RedraftError::ConfigMissing);
        }

        let history = harvest(
            &self.document,
            &self.classifier,
            &self.config,
            self.config.token_budget,
        );

        self.session.snapshot = read_raw(&surface.element, &surface.kind);
        self.session.surface = Some(surface);
        self.session.original = draft.clone();
        self.session.mode = mode;
        self.session.instruction = custom_instruction.clone();

        Ok(RewriteRequest {
            draft_text: draft,
            history,
            custom_instruction,
            mode,
        })
    }

    fn abort(&mut self, err: RedraftError) -> TriggerOutcome {
        tracing::debug!(target: "redraft::session", %err, "cycle aborted");
        self.session = RewriteSession::default();
        self.notices.notify(&err.notice());
        TriggerOutcome::Aborted(err)
    }

    /// Drop the pending result when it arrives. The request itself is not
    /// aborted and the guard holds until then.
    pub fn cancel(&mut self) -> bool {
        if self.session.state != SessionState::AwaitingResult {
            return false;
        }
        tracing::debug!(target: "redraft::session", "pending result will be discarded");
        self.session.discard = true;
        true
    }

    /// Consume the service's answer and end the cycle.
    ///
    /// Returns a [`Review`] when there is something to show or write.
    pub fn handle_result(
        &mut self,
        result: Result<RewriteResult, String>,
    ) -> Option<Review<D::Element>> {
        if self.session.state != SessionState::AwaitingResult {
            tracing::debug!(target: "redraft::session", state = ?self.session.state, "stale result dropped");
            return None;
        }
        let session = std::mem::take(&mut self.session);

        if session.discard {
            tracing::debug!(target: "redraft::session", "result discarded");
            return None;
        }

        let refined = match result {
            Ok(result) => result.refined_text,
            Err(message) => {
                tracing::debug!(target: "redraft::session", %message, "rewrite failed");
                self.notices
                    .notify(&RedraftError::ServiceError(message).notice());
                return None;
            }
        };

        if refined == session.original {
            self.notices.notify(&Notice::info("No changes detected"));
            return None;
        }

        let surface = session.surface?;
        let hunks = compute_diff(&session.original, &refined);
        tracing::debug!(target: "redraft::session", hunks = hunks.len(), mode = ?session.mode, "review ready");
        Some(Review::new(
            surface,
            session.original,
            session.snapshot,
            refined,
            hunks,
            session.mode,
            self.config.writer.clone(),
        ))
    }
}

fn busy_notice(mode: RewriteMode, instruction: Option<&str>) -> Notice {
    match (mode, instruction) {
        (RewriteMode::Preview, _) => Notice::info("Refining your message..."),
        (RewriteMode::Replace, _) => Notice::info("Refining and replacing your message..."),
        (RewriteMode::Custom, Some(instruction)) => {
            Notice::info(format!("Refining with custom instruction: \"{instruction}\"..."))
        }
        (RewriteMode::Custom, None) => Notice::info("Refining with custom instruction..."),
    }
}
