//! Host abstraction traits.
//!
//! These traits define the interface between the heuristics in this crate and
//! the page they run against. The browser implementation wraps `web_sys`
//! elements; the mock implementation is an in-memory tree for tests.

use std::future::Future;

use crate::error::PlatformError;

/// Computed-layout facts used by the authorship heuristic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayoutHints {
    /// `text-align: right` (or `end` in a left-to-right document).
    pub text_align_right: bool,
    /// `margin-left: auto`, the usual way chat bubbles are pushed right.
    pub margin_left_auto: bool,
}

impl LayoutHints {
    pub fn is_right_aligned(&self) -> bool {
        self.text_align_right || self.margin_left_auto
    }
}

/// Read-only view of a host element.
///
/// Selectors are plain CSS selector strings. Implementations return `false` /
/// `None` / empty for selectors they cannot evaluate instead of failing.
pub trait HostElement: Clone {
    /// Lowercase tag name.
    fn tag_name(&self) -> String;

    fn attribute(&self, name: &str) -> Option<String>;

    /// The `class` attribute, or an empty string.
    fn class_name(&self) -> String {
        self.attribute("class").unwrap_or_default()
    }

    /// Whether the element is editable through `contenteditable`, inherited or not.
    fn is_content_editable(&self) -> bool;

    fn matches(&self, selector: &str) -> bool;

    /// Nearest inclusive ancestor matching the selector.
    fn closest(&self, selector: &str) -> Option<Self>;

    /// First descendant matching the selector.
    fn query_selector(&self, selector: &str) -> Option<Self>;

    /// All descendants matching the selector, in document order.
    fn query_selector_all(&self, selector: &str) -> Vec<Self>;

    /// Rendered text (`innerText`). `None` when the host cannot render.
    fn inner_text(&self) -> Option<String>;

    /// Raw `textContent`.
    fn text_content(&self) -> String;

    /// Current value of a form control, `None` for other elements.
    fn value(&self) -> Option<String>;

    /// Still attached to the document.
    fn is_connected(&self) -> bool;

    fn layout_hints(&self) -> LayoutHints;

    /// Speculative probe for an expando property, e.g. a framework instance.
    fn has_property(&self, name: &str) -> bool;

    /// Same underlying node.
    fn same_node(&self, other: &Self) -> bool;

    /// Inclusive containment.
    fn contains(&self, other: &Self) -> bool;

    /// `self` comes before `other` in document order.
    fn precedes(&self, other: &Self) -> bool;
}

/// Read-only view of the host document.
pub trait HostDocument {
    type Element: HostElement;

    /// The focused element, if it is not the body.
    fn active_element(&self) -> Option<Self::Element>;

    fn query_selector_all(&self, selector: &str) -> Vec<Self::Element>;

    /// Hostname of the page, used to pick host-specific selector groups.
    fn hostname(&self) -> String;
}

/// Mutation operations the write recipes drive.
///
/// Reads go through [`HostElement`], see [`crate::extract::read_raw`].
///
/// Methods mirror what a page script can do to an input: selection, native
/// editing commands, direct property assignment and synthetic events. Each
/// returns `Ok` when the operation itself ran; whether the text actually
/// changed is decided by a later verification read.
pub trait WriteSurface {
    fn focus(&self) -> Result<(), PlatformError>;

    /// Select the entire content of the surface.
    fn select_all(&self) -> Result<(), PlatformError>;

    /// Text the current selection covers inside the surface, empty when the
    /// selection lies elsewhere.
    fn selected_text(&self) -> String;

    /// Empty the surface through its value/content property.
    fn clear(&self) -> Result<(), PlatformError>;

    /// `execCommand('insertText')` over the current selection.
    fn exec_insert_text(&self, text: &str) -> Result<bool, PlatformError>;

    /// `execCommand('delete')` over the current selection.
    fn exec_delete(&self) -> Result<bool, PlatformError>;

    /// Assign the value/content property directly.
    fn assign(&self, text: &str) -> Result<(), PlatformError>;

    /// Replace the whole subtree with one block per line.
    fn rebuild(&self, text: &str) -> Result<(), PlatformError>;

    /// Dispatch a synthetic event at the surface.
    fn dispatch(&self, event: &crate::recipe::EventDescriptor) -> Result<(), PlatformError>;

    /// Collapse the selection at the end of the content.
    fn place_caret_at_end(&self) -> Result<(), PlatformError>;

    /// Yield to the host for `ms` milliseconds.
    fn sleep(&self, ms: u32) -> impl Future<Output = ()>;
}
