//! Error types for a rewrite cycle.
//!
//! Every variant is terminal for the current cycle and maps to a user-visible
//! notice via [`RedraftError::notice`].

use miette::Diagnostic;

use crate::types::{Notice, WriteAttemptOutcome};

/// Error type for a single host DOM operation.
///
/// Raised inside write strategies; a failing operation fails that attempt and
/// the chain moves on, so it never reaches the user directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformError(pub String);

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PlatformError {}

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// Main error type for rewrite cycles.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum RedraftError {
    /// No editable element could be located on the page.
    #[error("no editable surface found")]
    #[diagnostic(
        code(redraft::no_surface),
        help("click in a text field before triggering a rewrite")
    )]
    NoSurfaceFound,

    /// The located surface holds no meaningful text.
    #[error("draft is empty")]
    #[diagnostic(code(redraft::empty_draft))]
    EmptyDraft,

    /// Custom mode was triggered without an instruction.
    #[error("custom instruction is empty")]
    #[diagnostic(code(redraft::empty_instruction))]
    EmptyInstruction,

    /// No API key is configured.
    #[error("API key not configured")]
    #[diagnostic(
        code(redraft::config_missing),
        help("set the API key in the extension options")
    )]
    ConfigMissing,

    /// The rewrite service reported a failure.
    #[error("rewrite failed: {0}")]
    #[diagnostic(code(redraft::service))]
    ServiceError(String),

    /// The request could not be handed to the messaging transport.
    #[error("transport error: {0}")]
    #[diagnostic(code(redraft::transport))]
    Transport(String),

    /// Every write strategy ran without a verified result.
    #[error("could not write text into the surface after {} attempts", .attempts.len())]
    #[diagnostic(code(redraft::write_failure))]
    WriteFailure { attempts: Vec<WriteAttemptOutcome> },

    /// The embedding context was torn down mid-operation.
    #[error("extension context invalidated")]
    #[diagnostic(code(redraft::stale_context), help("refresh the page"))]
    StaleContext,
}

impl RedraftError {
    /// User-facing notice text for this error.
    pub fn notice(&self) -> Notice {
        let message = match self {
            RedraftError::NoSurfaceFound => {
                "No text area found. Click in a text input field first.".to_string()
            }
            RedraftError::EmptyDraft => "No draft text found. Type something first.".to_string(),
            RedraftError::EmptyInstruction => "Please enter a custom instruction".to_string(),
            RedraftError::ConfigMissing => {
                "API key not configured. Please set your API key in the extension options."
                    .to_string()
            }
            RedraftError::ServiceError(msg) => format!("Refinement failed: {msg}"),
            RedraftError::Transport(_) => {
                "Extension communication error. Please reload the page.".to_string()
            }
            RedraftError::WriteFailure { .. } => {
                "Could not insert the refined text into this field.".to_string()
            }
            RedraftError::StaleContext => {
                "Extension was reloaded. Please refresh the page to continue.".to_string()
            }
        };
        Notice::error(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NoticeLevel;

    #[test]
    fn test_service_error_notice_keeps_message() {
        let notice = RedraftError::ServiceError("quota exceeded".into()).notice();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Refinement failed: quota exceeded");
    }

    #[test]
    fn test_write_failure_display_counts_attempts() {
        let err = RedraftError::WriteFailure { attempts: vec![] };
        assert_eq!(
            err.to_string(),
            "could not write text into the surface after 0 attempts"
        );
    }
}
