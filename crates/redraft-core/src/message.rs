//! Messages exchanged between the page script and the background process.

use serde::{Deserialize, Serialize};

use crate::types::{RewriteMode, RewriteResult};

/// A message addressed to the page script, tagged by `action`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ContentMessage {
    RefinePreview,
    RefineReplace,
    /// Open the custom-instruction box.
    CustomCommands,
    CustomInstruction {
        instruction: String,
    },
    RefinementComplete {
        data: CompletionData,
    },
    RefinementError {
        error: String,
    },
    Ping,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionData {
    pub refined_text: String,
    /// Mode of the request this answers. Informational; the session
    /// remembers its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<RewriteMode>,
}

impl From<CompletionData> for RewriteResult {
    fn from(data: CompletionData) -> Self {
        RewriteResult {
            refined_text: data.refined_text,
        }
    }
}

/// Reply to [`ContentMessage::Ping`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PingReply {
    pub status: &'static str,
}

impl PingReply {
    pub const AVAILABLE: PingReply = PingReply {
        status: "available",
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> ContentMessage {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_triggers() {
        assert_eq!(parse(json!({"action": "refinePreview"})), ContentMessage::RefinePreview);
        assert_eq!(parse(json!({"action": "refineReplace"})), ContentMessage::RefineReplace);
        assert_eq!(parse(json!({"action": "customCommands"})), ContentMessage::CustomCommands);
        assert_eq!(parse(json!({"action": "ping"})), ContentMessage::Ping);
        assert_eq!(
            parse(json!({"action": "customInstruction", "instruction": "shorter"})),
            ContentMessage::CustomInstruction {
                instruction: "shorter".into()
            }
        );
    }

    #[test]
    fn test_parse_results() {
        let done = parse(json!({
            "action": "refinementComplete",
            "data": {"refinedText": "Hello there.", "action": "replace"}
        }));
        assert_eq!(
            done,
            ContentMessage::RefinementComplete {
                data: CompletionData {
                    refined_text: "Hello there.".into(),
                    action: Some(RewriteMode::Replace),
                }
            }
        );

        let bare = parse(json!({"action": "refinementComplete", "data": {"refinedText": "x"}}));
        let ContentMessage::RefinementComplete { data } = bare else {
            panic!("expected completion");
        };
        assert_eq!(RewriteResult::from(data).refined_text, "x");

        assert_eq!(
            parse(json!({"action": "refinementError", "error": "API quota exceeded"})),
            ContentMessage::RefinementError {
                error: "API quota exceeded".into()
            }
        );
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let result: Result<ContentMessage, _> =
            serde_json::from_value(json!({"action": "openSettings"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_ping_reply() {
        assert_eq!(
            serde_json::to_value(PingReply::AVAILABLE).unwrap(),
            json!({"status": "available"})
        );
    }
}
