//! Prompt text for the rewrite service.

use std::fmt::Write as _;

use crate::types::RewriteRequest;

/// Refinement instructions used when no override is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str = "<System Prompt>
You are a writing refinement assistant.
Your only task is to take user-written text and refine it so it becomes:
- Preserving the original intent, meaning, and personal voice
- Matching the tone of the surrounding conversation (given as context)

You must never add new ideas, facts, or content that wasn't in the user text.

<Rules>
1. Preserve the intent and emotional nuance of the user text.
2. Refer the message tone and context from given messages and include it in answer.
3. Output only the refined text. Do not include explanations or notes.
</Rules>
</System Prompt>

<User Input>";

/// The full prompt for one request.
///
/// A blank override falls back to [`DEFAULT_SYSTEM_PROMPT`].
pub fn build_prompt(request: &RewriteRequest, system_prompt_override: Option<&str>) -> String {
    let system = system_prompt_override
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SYSTEM_PROMPT);

    let mut prompt = String::with_capacity(system.len() + request.draft_text.len() + 256);
    prompt.push_str(system);
    prompt.push_str("\n\n");

    if !request.history.is_empty() {
        prompt.push_str("Conversation (last 1K–2K tokens):\n");
        for message in &request.history {
            let _ = writeln!(prompt, "[{}]: {}", message.sender.label(), message.text);
        }
    }

    if let Some(instruction) = &request.custom_instruction {
        let _ = writeln!(prompt, "<Instruction>{instruction}</Instruction>");
    }

    let _ = write!(prompt, "\n<My Draft>{}</My Draft>", request.draft_text);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConversationMessage, RewriteMode, Sender};

    fn request(history: Vec<ConversationMessage>, instruction: Option<&str>) -> RewriteRequest {
        RewriteRequest {
            draft_text: "ok sounds good".into(),
            history,
            custom_instruction: instruction.map(String::from),
            mode: RewriteMode::Preview,
        }
    }

    #[test]
    fn test_prompt_with_history() {
        let history = vec![
            ConversationMessage {
                text: "lunch at noon?".into(),
                sender: Sender::Other,
                timestamp: None,
            },
            ConversationMessage {
                text: "maybe 12:30".into(),
                sender: Sender::Myself,
                timestamp: Some(1_700_000_000_000),
            },
        ];
        let prompt = build_prompt(&request(history, None), None);

        assert!(prompt.starts_with("<System Prompt>\nYou are a writing refinement assistant."));
        assert!(prompt.ends_with(
            "<User Input>\n\nConversation (last 1K–2K tokens):\n\
             [other]: lunch at noon?\n\
             [me]: maybe 12:30\n\
             \n<My Draft>ok sounds good</My Draft>"
        ));
        assert!(!prompt.contains("<Instruction>"));
    }

    #[test]
    fn test_prompt_override_and_instruction() {
        let prompt = build_prompt(
            &request(Vec::new(), Some("make it formal")),
            Some("Rewrite politely."),
        );
        assert_eq!(
            prompt,
            "Rewrite politely.\n\n<Instruction>make it formal</Instruction>\n\n<My Draft>ok sounds good</My Draft>"
        );
    }

    #[test]
    fn test_blank_override_uses_default() {
        let prompt = build_prompt(&request(Vec::new(), None), Some("   "));
        assert!(prompt.starts_with(DEFAULT_SYSTEM_PROMPT));
        assert!(!prompt.contains("Conversation"));
    }
}
