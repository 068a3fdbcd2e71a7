//! The page as a [`HostDocument`].

use redraft_core::HostDocument;

use crate::element::BrowserElement;

#[derive(Clone, Debug)]
pub struct BrowserDocument {
    document: web_sys::Document,
}

impl BrowserDocument {
    pub fn new(document: web_sys::Document) -> Self {
        Self { document }
    }

    /// The document of the current window.
    pub fn current() -> Option<Self> {
        web_sys::window()?.document().map(Self::new)
    }

    pub fn inner(&self) -> &web_sys::Document {
        &self.document
    }
}

impl HostDocument for BrowserDocument {
    type Element = BrowserElement;

    fn active_element(&self) -> Option<BrowserElement> {
        let active = self.document.active_element()?;
        let is_root = self
            .document
            .body()
            .is_some_and(|body| body.is_same_node(Some(active.as_ref())));
        if is_root || active.tag_name().eq_ignore_ascii_case("html") {
            return None;
        }
        Some(BrowserElement::new(active))
    }

    fn query_selector_all(&self, selector: &str) -> Vec<BrowserElement> {
        match self.document.query_selector_all(selector) {
            Ok(list) => BrowserElement::collect(&list),
            Err(e) => {
                tracing::debug!(target: "redraft::browser", %selector, "selector rejected: {:?}", e);
                Vec::new()
            }
        }
    }

    fn hostname(&self) -> String {
        self.document
            .location()
            .and_then(|location| location.hostname().ok())
            .unwrap_or_default()
    }
}
