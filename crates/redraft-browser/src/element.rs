//! Read side of a page element.

use redraft_core::{HostElement, LayoutHints};
use wasm_bindgen::{JsCast, JsValue};

/// A page element. Cheap to clone; clones refer to the same node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrowserElement {
    element: web_sys::Element,
}

impl BrowserElement {
    pub fn new(element: web_sys::Element) -> Self {
        Self { element }
    }

    pub fn inner(&self) -> &web_sys::Element {
        &self.element
    }

    /// Elements of a node list, skipping non-element nodes.
    pub(crate) fn collect(list: &web_sys::NodeList) -> Vec<Self> {
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
            .map(Self::new)
            .collect()
    }

    pub(crate) fn as_html(&self) -> Option<&web_sys::HtmlElement> {
        self.element.dyn_ref::<web_sys::HtmlElement>()
    }

    pub(crate) fn as_textarea(&self) -> Option<&web_sys::HtmlTextAreaElement> {
        self.element.dyn_ref::<web_sys::HtmlTextAreaElement>()
    }

    pub(crate) fn as_input(&self) -> Option<&web_sys::HtmlInputElement> {
        self.element.dyn_ref::<web_sys::HtmlInputElement>()
    }

    /// Viewport-relative bounding box.
    pub fn rect(&self) -> redraft_core::Rect {
        let rect = self.element.get_bounding_client_rect();
        redraft_core::Rect {
            top: rect.top(),
            left: rect.left(),
            bottom: rect.bottom(),
            right: rect.right(),
        }
    }
}

impl HostElement for BrowserElement {
    fn tag_name(&self) -> String {
        self.element.tag_name().to_ascii_lowercase()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.element.get_attribute(name)
    }

    fn class_name(&self) -> String {
        self.element.class_name()
    }

    fn is_content_editable(&self) -> bool {
        self.as_html().is_some_and(|el| el.is_content_editable())
    }

    fn matches(&self, selector: &str) -> bool {
        self.element.matches(selector).unwrap_or(false)
    }

    fn closest(&self, selector: &str) -> Option<Self> {
        self.element.closest(selector).ok().flatten().map(Self::new)
    }

    fn query_selector(&self, selector: &str) -> Option<Self> {
        self.element
            .query_selector(selector)
            .ok()
            .flatten()
            .map(Self::new)
    }

    fn query_selector_all(&self, selector: &str) -> Vec<Self> {
        self.element
            .query_selector_all(selector)
            .map(|list| Self::collect(&list))
            .unwrap_or_default()
    }

    fn inner_text(&self) -> Option<String> {
        self.as_html().map(|el| el.inner_text())
    }

    fn text_content(&self) -> String {
        self.element.text_content().unwrap_or_default()
    }

    fn value(&self) -> Option<String> {
        if let Some(area) = self.as_textarea() {
            return Some(area.value());
        }
        self.as_input().map(|input| input.value())
    }

    fn is_connected(&self) -> bool {
        self.element.is_connected()
    }

    fn layout_hints(&self) -> LayoutHints {
        let Some(style) = web_sys::window()
            .and_then(|window| window.get_computed_style(&self.element).ok().flatten())
        else {
            return LayoutHints::default();
        };
        let property = |name: &str| style.get_property_value(name).unwrap_or_default();

        let align = property("text-align");
        let ltr = property("direction") != "rtl";
        let inline_margin = self
            .as_html()
            .and_then(|el| el.style().get_property_value("margin-left").ok())
            .unwrap_or_default();

        LayoutHints {
            text_align_right: align == "right" || (align == "end" && ltr),
            margin_left_auto: property("margin-left") == "auto" || inline_margin == "auto",
        }
    }

    fn has_property(&self, name: &str) -> bool {
        js_sys::Reflect::has(&self.element, &JsValue::from_str(name)).unwrap_or(false)
    }

    fn same_node(&self, other: &Self) -> bool {
        self.element.is_same_node(Some(other.element.as_ref()))
    }

    fn contains(&self, other: &Self) -> bool {
        self.element.contains(Some(other.element.as_ref()))
    }

    fn precedes(&self, other: &Self) -> bool {
        let position = self.element.compare_document_position(other.element.as_ref());
        position & web_sys::Node::DOCUMENT_POSITION_FOLLOWING != 0
    }
}
