use crate::config::WriterConfig;
use crate::error::RedraftError;
use crate::extract::{normalize_whitespace, read_raw};
use crate::host::{HostElement, WriteSurface};
use crate::types::{DiffHunk, EditableSurface, Notice, RewriteMode};
use crate::writer::{WriteReport, write};

use super::NoticeSink;

/// A finished rewrite waiting on the user.
///
/// In preview mode the refined text goes in right away through
/// [`Review::preview`]; accepting keeps it and rejecting writes the original
/// back. In the other modes nothing is written until [`Review::accept`].
#[derive(Debug)]
pub struct Review<E> {
    surface: EditableSurface<E>,
    original: String,
    snapshot: String,
    refined: String,
    hunks: Vec<DiffHunk>,
    mode: RewriteMode,
    writer: WriterConfig,
    applied: bool,
}

impl<E> Review<E> {
    pub(super) fn new(
        surface: EditableSurface<E>,
        original: String,
        snapshot: String,
        refined: String,
        hunks: Vec<DiffHunk>,
        mode: RewriteMode,
        writer: WriterConfig,
    ) -> Self {
        Self {
            surface,
            original,
            snapshot,
            refined,
            hunks,
            mode,
            writer,
            applied: false,
        }
    }

    pub fn surface(&self) -> &EditableSurface<E> {
        &self.surface
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    /// Surface content as the user left it, before any cleaning.
    pub fn snapshot(&self) -> &str {
        &self.snapshot
    }

    pub fn refined(&self) -> &str {
        &self.refined
    }

    pub fn hunks(&self) -> &[DiffHunk] {
        &self.hunks
    }

    pub fn mode(&self) -> RewriteMode {
        self.mode
    }

    /// Whether the refined text is already in the surface.
    pub fn is_applied(&self) -> bool {
        self.applied
    }
}

impl<E: HostElement + WriteSurface> Review<E> {
    /// Write the refined text before the user decides.
    pub async fn preview(&mut self, notices: &impl NoticeSink) -> Result<WriteReport, RedraftError> {
        let report = self.put(&self.refined, notices).await?;
        self.applied = true;
        Ok(report)
    }

    /// Keep the refined text, writing it if it is not in yet.
    pub async fn accept(self, notices: &impl NoticeSink) -> Result<Option<WriteReport>, RedraftError> {
        let report = if self.applied {
            None
        } else {
            Some(self.put(&self.refined, notices).await?)
        };
        let message = match self.mode {
            RewriteMode::Preview => "Text refined successfully",
            RewriteMode::Replace | RewriteMode::Custom => "✓ Changes applied",
        };
        notices.notify(&Notice::success(message));
        Ok(report)
    }

    /// Leave the surface holding the original draft.
    pub async fn reject(self, notices: &impl NoticeSink) -> Result<Option<WriteReport>, RedraftError> {
        let current = read_raw(&self.surface.element, &self.surface.kind);
        if normalize_whitespace(&current) == normalize_whitespace(&self.snapshot) {
            tracing::debug!(target: "redraft::session", "rejected, surface already holds the draft");
            return Ok(None);
        }
        self.put(&self.snapshot, notices).await.map(Some)
    }

    async fn put(&self, text: &str, notices: &impl NoticeSink) -> Result<WriteReport, RedraftError> {
        let result = write(&self.surface.element, &self.surface.kind, text, &self.writer).await;
        if let Err(err) = &result {
            notices.notify(&err.notice());
        }
        result
    }
}
