//! JsRedraft - the page-side controller exposed to JavaScript.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions, EventListenerPhase};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use redraft_browser::{BrowserDocument, BrowserElement, BrowserNotices, InstructionBox, ReviewPanel};
use redraft_core::{
    Command, ConfigSource, ContentMessage, KeyInput, Modifiers, NoticeSink,
    Orchestrator, Overlay, PingReply, RedraftError, Review, RewriteMode, RewriteResult,
    RewriteService, SessionState, TriggerOutcome, WriteSurface, build_prompt, extract_text, locate,
    match_shortcut, render_segments,
};

use crate::service::{JsService, StoredSettings};
use crate::types::{JsOptions, JsReviewSnapshot, JsRewriteRequest};

type Inner = Orchestrator<BrowserDocument, JsService, StoredSettings, Rc<BrowserNotices>>;

struct OpenReview {
    review: Review<BrowserElement>,
    /// `None` when the panel could not be drawn; the page can still settle
    /// the review through `accept()` / `reject()`.
    panel: Option<ReviewPanel>,
}

struct OpenInstruction {
    instruction_box: InstructionBox,
    /// Surface the box was opened for. Focus goes back to it on close.
    target: BrowserElement,
}

/// Shared state behind a [`JsRedraft`] handle.
///
/// UI callbacks hold a `Weak` to it, so freeing the handle tears
/// everything down.
struct Controller {
    orchestrator: RefCell<Inner>,
    notices: Rc<BrowserNotices>,
    review: RefCell<Option<OpenReview>>,
    instruction: RefCell<Option<OpenInstruction>>,
    /// A write is running outside the orchestrator.
    writing: Cell<bool>,
    keys: RefCell<Option<EventListener>>,
}

impl Controller {
    fn overlay(&self) -> Overlay {
        if self.instruction.borrow().is_some() {
            Overlay::InstructionBox
        } else if self.review.borrow().is_some() {
            Overlay::Review
        } else {
            Overlay::None
        }
    }

    fn busy(&self) -> bool {
        self.writing.get()
            || self.review.borrow().is_some()
            || !self
                .orchestrator
                .try_borrow()
                .is_ok_and(|orchestrator| orchestrator.state() == SessionState::Idle)
    }

    fn trigger(self: &Rc<Self>, mode: RewriteMode, instruction: Option<&str>) -> bool {
        if self.busy() {
            tracing::debug!(target: "redraft::js", ?mode, "trigger ignored, cycle in flight");
            return false;
        }
        self.close_instruction();
        let Ok(mut orchestrator) = self.orchestrator.try_borrow_mut() else {
            tracing::debug!(target: "redraft::js", ?mode, "trigger ignored, orchestrator in use");
            return false;
        };
        matches!(
            orchestrator.trigger(mode, instruction),
            TriggerOutcome::Dispatched(_)
        )
    }

    /// Feed a service answer in on the next tick.
    fn deliver(self: &Rc<Self>, result: Result<RewriteResult, String>) {
        let controller = self.clone();
        wasm_bindgen_futures::spawn_local(async move { controller.complete(result).await });
    }

    async fn complete(self: Rc<Self>, result: Result<RewriteResult, String>) {
        let review = match self.orchestrator.try_borrow_mut() {
            Ok(mut orchestrator) => orchestrator.handle_result(result),
            Err(_) => {
                tracing::warn!(target: "redraft::js", "result arrived while orchestrator in use, dropped");
                return;
            }
        };
        let Some(mut review) = review else {
            return;
        };

        if review.mode() == RewriteMode::Preview {
            self.writing.set(true);
            let written = review.preview(&self.notices).await;
            self.writing.set(false);
            if written.is_err() {
                return;
            }
        }
        self.show(review);
    }

    fn show(self: &Rc<Self>, review: Review<BrowserElement>) {
        let segments = render_segments(review.original(), review.hunks());
        let on_accept = Rc::downgrade(self);
        let on_reject = Rc::downgrade(self);
        let panel = ReviewPanel::open(
            &review.surface().element,
            &segments,
            move || {
                if let Some(controller) = on_accept.upgrade() {
                    controller.decide(true);
                }
            },
            move || {
                if let Some(controller) = on_reject.upgrade() {
                    controller.decide(false);
                }
            },
        );
        let panel = match panel {
            Ok(panel) => Some(panel),
            Err(err) => {
                tracing::warn!(target: "redraft::js", %err, "could not open review panel");
                None
            }
        };
        *self.review.borrow_mut() = Some(OpenReview { review, panel });
    }

    /// Settle the open review. `false` when there is none.
    fn decide(self: &Rc<Self>, accepted: bool) -> bool {
        let Some(OpenReview { review, panel }) = self.review.borrow_mut().take() else {
            return false;
        };
        drop(panel);

        self.writing.set(true);
        let controller = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = if accepted {
                review.accept(&controller.notices).await
            } else {
                review.reject(&controller.notices).await
            };
            controller.writing.set(false);
            if let Err(err) = outcome {
                tracing::debug!(target: "redraft::js", %err, accepted, "review write failed");
            }
        });
        true
    }

    fn show_instruction_box(&self) -> bool {
        if self.instruction.borrow().is_some() {
            return true;
        }
        if self.busy() {
            tracing::debug!(target: "redraft::js", "instruction box ignored, cycle in flight");
            return false;
        }

        let surface = {
            let Ok(orchestrator) = self.orchestrator.try_borrow() else {
                return false;
            };
            if !orchestrator.service().context_valid() {
                self.notices.notify(&RedraftError::StaleContext.notice());
                return false;
            }
            let Some(surface) = locate(
                orchestrator.document(),
                orchestrator.classifier(),
                &orchestrator.config().tables,
            ) else {
                self.notices.notify(&RedraftError::NoSurfaceFound.notice());
                return false;
            };
            surface
        };
        if extract_text(&surface).trim().is_empty() {
            self.notices.notify(&RedraftError::EmptyDraft.notice());
            return false;
        }

        match InstructionBox::open(&surface.element) {
            Ok(instruction_box) => {
                *self.instruction.borrow_mut() = Some(OpenInstruction {
                    instruction_box,
                    target: surface.element,
                });
                true
            }
            Err(err) => {
                tracing::warn!(target: "redraft::js", %err, "could not open instruction box");
                false
            }
        }
    }

    /// Remove the instruction box and give focus back to its surface.
    /// Returns what was typed.
    fn close_instruction(&self) -> Option<String> {
        let OpenInstruction {
            instruction_box,
            target,
        } = self.instruction.borrow_mut().take()?;
        let typed = instruction_box.instruction();
        drop(instruction_box);
        if let Err(err) = target.focus() {
            tracing::debug!(target: "redraft::js", %err, "could not refocus surface");
        }
        Some(typed)
    }

    fn run(self: &Rc<Self>, command: Command) {
        tracing::debug!(target: "redraft::js", ?command, "shortcut");
        match command {
            Command::TriggerReplace => {
                self.trigger(RewriteMode::Replace, None);
            }
            Command::OpenInstructionBox => {
                self.show_instruction_box();
            }
            Command::Accept => {
                self.decide(true);
            }
            Command::Reject => {
                self.decide(false);
            }
            Command::SubmitInstruction => {
                if let Some(instruction) = self.close_instruction() {
                    self.trigger(RewriteMode::Custom, Some(&instruction));
                }
            }
            Command::CloseInstructionBox => {
                self.close_instruction();
            }
        }
    }

    fn on_keydown(self: &Rc<Self>, event: &web_sys::KeyboardEvent) {
        let Some(command) = match_shortcut(&key_input(event), self.overlay()) else {
            return;
        };
        event.prevent_default();
        event.stop_propagation();
        self.run(command);
    }
}

fn key_input(event: &web_sys::KeyboardEvent) -> KeyInput {
    let modifiers = Modifiers {
        ctrl: event.ctrl_key(),
        alt: event.alt_key(),
        shift: event.shift_key(),
        meta: event.meta_key(),
    };
    // With Alt held, macOS reports the composed symbol as `key`.
    let code = event.code();
    let key = match code.strip_prefix("Key") {
        Some(letter) if modifiers.alt => letter.to_ascii_lowercase(),
        _ => event.key(),
    };
    KeyInput::new(key, modifiers)
}

/// The page-side controller.
///
/// One per page. The page script forwards runtime messages to
/// [`JsRedraft::handle_message`] and hands rewrite requests to the
/// background process through the `dispatch` callback.
#[wasm_bindgen]
pub struct JsRedraft {
    controller: Rc<Controller>,
}

#[wasm_bindgen]
impl JsRedraft {
    /// Create a controller for the current document.
    ///
    /// `dispatch(request)` sends a request and returns immediately (or with
    /// a promise; a rejection counts as a failed rewrite). `context_check()`
    /// returns whether the extension runtime is still alive.
    #[wasm_bindgen(constructor)]
    pub fn new(
        options: JsOptions,
        dispatch: js_sys::Function,
        context_check: Option<js_sys::Function>,
    ) -> Result<JsRedraft, JsError> {
        let document =
            BrowserDocument::current().ok_or_else(|| JsError::new("No document available"))?;
        let settings = StoredSettings {
            api_key: options.api_key,
            system_prompt: options.system_prompt,
        };
        let notices = Rc::new(BrowserNotices::new());
        let orchestrator = Orchestrator::new(
            document,
            JsService::new(dispatch, context_check),
            settings,
            notices.clone(),
            options.config.unwrap_or_default(),
        );

        let controller = Rc::new(Controller {
            orchestrator: RefCell::new(orchestrator),
            notices,
            review: RefCell::new(None),
            instruction: RefCell::new(None),
            writing: Cell::new(false),
            keys: RefCell::new(None),
        });

        let weak = Rc::downgrade(&controller);
        controller
            .orchestrator
            .borrow()
            .service()
            .on_rejected(move |message| {
                if let Some(controller) = weak.upgrade() {
                    controller.deliver(Err(message));
                }
            });

        tracing::debug!(target: "redraft::js", "controller created");
        Ok(Self { controller })
    }

    // === Settings ===

    #[wasm_bindgen(js_name = setApiKey)]
    pub fn set_api_key(&self, api_key: Option<String>) -> Result<(), JsError> {
        self.orchestrator_mut()?.settings_mut().api_key = api_key;
        Ok(())
    }

    /// Replace the default system prompt. Blank or `undefined` restores it.
    #[wasm_bindgen(js_name = setSystemPromptOverride)]
    pub fn set_system_prompt_override(&self, prompt: Option<String>) -> Result<(), JsError> {
        self.orchestrator_mut()?.settings_mut().system_prompt = prompt;
        Ok(())
    }

    // === Wiring ===

    /// Listen for the keyboard shortcuts. Calling it again is a no-op.
    pub fn install(&self) -> Result<(), JsError> {
        if self.controller.keys.borrow().is_some() {
            return Ok(());
        }
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsError::new("No document available"))?;

        let weak = Rc::downgrade(&self.controller);
        let listener = EventListener::new_with_options(
            &document,
            "keydown",
            EventListenerOptions {
                phase: EventListenerPhase::Capture,
                passive: false,
            },
            move |event| {
                let Some(event) = event.dyn_ref::<web_sys::KeyboardEvent>() else {
                    return;
                };
                if let Some(controller) = weak.upgrade() {
                    controller.on_keydown(event);
                }
            },
        );
        *self.controller.keys.borrow_mut() = Some(listener);
        Ok(())
    }

    /// Handle a runtime message (`{ action, ... }`).
    ///
    /// Returns `{ status: "available" }` for `ping`, `undefined` otherwise.
    #[wasm_bindgen(js_name = handleMessage)]
    pub fn handle_message(&self, message: JsValue) -> Result<JsValue, JsError> {
        let message: ContentMessage = serde_wasm_bindgen::from_value(message)
            .map_err(|e| JsError::new(&format!("Invalid message: {}", e)))?;
        tracing::debug!(target: "redraft::js", ?message, "message received");

        match message {
            ContentMessage::RefinePreview => {
                self.controller.trigger(RewriteMode::Preview, None);
            }
            ContentMessage::RefineReplace => {
                self.controller.trigger(RewriteMode::Replace, None);
            }
            ContentMessage::CustomCommands => {
                self.controller.show_instruction_box();
            }
            ContentMessage::CustomInstruction { instruction } => {
                self.controller
                    .trigger(RewriteMode::Custom, Some(&instruction));
            }
            ContentMessage::RefinementComplete { data } => {
                self.controller.deliver(Ok(data.into()));
            }
            ContentMessage::RefinementError { error } => {
                self.controller.deliver(Err(error));
            }
            ContentMessage::Ping => {
                return serde_wasm_bindgen::to_value(&PingReply::AVAILABLE)
                    .map_err(|e| JsError::new(&format!("Serialization error: {}", e)));
            }
        }
        Ok(JsValue::UNDEFINED)
    }

    // === Triggers ===

    /// Returns whether a request went out.
    #[wasm_bindgen(js_name = triggerPreview)]
    pub fn trigger_preview(&self) -> bool {
        self.controller.trigger(RewriteMode::Preview, None)
    }

    #[wasm_bindgen(js_name = triggerReplace)]
    pub fn trigger_replace(&self) -> bool {
        self.controller.trigger(RewriteMode::Replace, None)
    }

    #[wasm_bindgen(js_name = triggerCustom)]
    pub fn trigger_custom(&self, instruction: &str) -> bool {
        self.controller
            .trigger(RewriteMode::Custom, Some(instruction))
    }

    #[wasm_bindgen(js_name = showInstructionBox)]
    pub fn show_instruction_box(&self) -> bool {
        self.controller.show_instruction_box()
    }

    /// Drop the pending result when it arrives.
    pub fn cancel(&self) -> bool {
        self.controller
            .orchestrator
            .try_borrow_mut()
            .is_ok_and(|mut orchestrator| orchestrator.cancel())
    }

    // === Results ===

    #[wasm_bindgen(js_name = resultAvailable)]
    pub fn result_available(&self, refined_text: String) {
        self.controller
            .deliver(Ok(RewriteResult { refined_text }));
    }

    #[wasm_bindgen(js_name = errorAvailable)]
    pub fn error_available(&self, message: String) {
        self.controller.deliver(Err(message));
    }

    // === Review ===

    /// Keep the refined text. Returns `false` when no review is open.
    pub fn accept(&self) -> bool {
        self.controller.decide(true)
    }

    /// Go back to the original draft. Returns `false` when no review is open.
    pub fn reject(&self) -> bool {
        self.controller.decide(false)
    }

    /// The open review as a `JsReviewSnapshot`, or `undefined`.
    #[wasm_bindgen(js_name = pendingReview)]
    pub fn pending_review(&self) -> Result<JsValue, JsError> {
        let review = self.controller.review.borrow();
        let Some(open) = review.as_ref() else {
            return Ok(JsValue::UNDEFINED);
        };
        serde_wasm_bindgen::to_value(&JsReviewSnapshot::new(&open.review))
            .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
    }

    // === Prompt ===

    /// The full prompt text for `request`, using the configured system
    /// prompt.
    #[wasm_bindgen(js_name = buildPrompt)]
    pub fn build_prompt(&self, request: JsRewriteRequest) -> Result<String, JsError> {
        let orchestrator = self
            .controller
            .orchestrator
            .try_borrow()
            .map_err(|_| JsError::new("Controller busy"))?;
        let system_prompt = orchestrator.settings().system_prompt_override();
        Ok(build_prompt(&request.into(), system_prompt.as_deref()))
    }
}

impl JsRedraft {
    fn orchestrator_mut(&self) -> Result<std::cell::RefMut<'_, Inner>, JsError> {
        self.controller
            .orchestrator
            .try_borrow_mut()
            .map_err(|_| JsError::new("Controller busy"))
    }
}
