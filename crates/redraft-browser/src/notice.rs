//! Transient toast notices.

use gloo_timers::callback::Timeout;
use redraft_core::{Notice, NoticeLevel, NoticeSink, PlatformError};

use crate::ui;

const NOTICE_ID: &str = "redraft-notice";

/// How long a notice stays up.
const NOTICE_MS: u32 = 3_000;

/// Shows one notice at a time in the page corner. A new notice replaces the
/// one on screen.
#[derive(Clone, Debug, Default)]
pub struct BrowserNotices;

impl BrowserNotices {
    pub fn new() -> Self {
        Self
    }

    fn show(&self, notice: &Notice) -> Result<(), PlatformError> {
        let document = ui::document()?;
        ui::ensure_styles(&document)?;

        if let Some(existing) = document.get_element_by_id(NOTICE_ID) {
            existing.remove();
        }

        let level = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "success",
            NoticeLevel::Error => "error",
        };
        let element = ui::create(
            &document,
            "div",
            Some(&format!("redraft-notice redraft-notice-{level}")),
        )?;
        element.set_id(NOTICE_ID);
        element.set_text_content(Some(&notice.message));
        ui::append(&ui::body(&document)?, &element)?;

        Timeout::new(NOTICE_MS, move || {
            if element.is_connected() {
                element.remove();
            }
        })
        .forget();
        Ok(())
    }
}

impl NoticeSink for BrowserNotices {
    fn notify(&self, notice: &Notice) {
        tracing::debug!(target: "redraft::notice", level = ?notice.level, message = %notice.message);
        if let Err(err) = self.show(notice) {
            tracing::warn!(target: "redraft::notice", %err, "could not show notice");
        }
    }
}
