//! Types exposed to JavaScript via wasm-bindgen.

use redraft_core::{
    ConversationMessage, RedraftConfig, RewriteMode, RewriteRequest, Segment, render_segments,
};
use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(typescript_custom_section)]
const TS_SHARED: &'static str = r#"
export type RewriteMode = "preview" | "replace" | "custom";

export interface ConversationMessage {
    text: string;
    sender: "me" | "other";
    timestamp?: number;
}

export type Segment =
    | { kind: "same"; text: string }
    | { kind: "removed"; text: string }
    | { kind: "added"; text: string };
"#;

/// Constructor options.
///
/// `config` is merged over the built-in selector tables and limits; any
/// field left out keeps its default.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(default, rename_all = "camelCase")]
pub struct JsOptions {
    #[tsify(optional)]
    pub api_key: Option<String>,
    #[tsify(optional)]
    pub system_prompt: Option<String>,
    #[tsify(optional, type = "Record<string, unknown>")]
    pub config: Option<RedraftConfig>,
}

/// A request as handed to the `dispatch` callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsRewriteRequest {
    pub draft_text: String,
    #[serde(default)]
    #[tsify(type = "ConversationMessage[]")]
    pub history: Vec<ConversationMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[tsify(optional)]
    pub custom_instruction: Option<String>,
    #[tsify(type = "RewriteMode")]
    pub mode: RewriteMode,
}

impl From<RewriteRequest> for JsRewriteRequest {
    fn from(request: RewriteRequest) -> Self {
        Self {
            draft_text: request.draft_text,
            history: request.history,
            custom_instruction: request.custom_instruction,
            mode: request.mode,
        }
    }
}

impl From<JsRewriteRequest> for RewriteRequest {
    fn from(request: JsRewriteRequest) -> Self {
        Self {
            draft_text: request.draft_text,
            history: request.history,
            custom_instruction: request.custom_instruction,
            mode: request.mode,
        }
    }
}

/// The open review, for pages that draw their own UI.
#[derive(Debug, Clone, Serialize, Tsify)]
#[tsify(into_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsReviewSnapshot {
    #[tsify(type = "RewriteMode")]
    pub mode: RewriteMode,
    pub original: String,
    pub refined: String,
    /// Whether the refined text is already in the page.
    pub applied: bool,
    #[tsify(type = "Segment[]")]
    pub segments: Vec<Segment>,
}

impl JsReviewSnapshot {
    pub(crate) fn new<E>(review: &redraft_core::Review<E>) -> Self {
        Self {
            mode: review.mode(),
            original: review.original().to_string(),
            refined: review.refined().to_string(),
            applied: review.is_applied(),
            segments: render_segments(review.original(), review.hunks()),
        }
    }
}
