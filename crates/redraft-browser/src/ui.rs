//! Shared helpers for the injected UI.

use redraft_core::PlatformError;

const STYLE_ID: &str = "redraft-styles";

const STYLES: &str = r#"
.redraft-notice {
  position: fixed;
  top: 20px;
  right: 20px;
  padding: 12px 20px;
  border-radius: 4px;
  color: white;
  font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
  font-size: 14px;
  z-index: 10001;
  max-width: 300px;
  word-wrap: break-word;
}
.redraft-notice-info { background: #007bff; }
.redraft-notice-success { background: #28a745; }
.redraft-notice-error { background: #dc3545; }
.redraft-overlay {
  position: absolute;
  z-index: 10002;
  width: 400px;
  box-sizing: border-box;
  padding: 10px 12px;
  border-radius: 6px;
  background: #1f2328;
  color: #f0f3f6;
  font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
  font-size: 14px;
  line-height: 1.4;
  box-shadow: 0 4px 16px rgba(0, 0, 0, 0.25);
}
.redraft-text { white-space: pre-wrap; margin-bottom: 8px; }
.redraft-removed { text-decoration: line-through; color: #ff8182; }
.redraft-added { color: #7ee787; }
.redraft-actions { display: flex; justify-content: flex-end; gap: 6px; }
.redraft-btn {
  border: 1px solid #3d444d;
  border-radius: 4px;
  background: transparent;
  color: inherit;
  padding: 2px 8px;
  cursor: pointer;
  font-size: 12px;
}
.redraft-instruction-input {
  width: 100%;
  box-sizing: border-box;
  margin-top: 4px;
  padding: 6px 8px;
  border: 1px solid #3d444d;
  border-radius: 4px;
  background: #0d1117;
  color: inherit;
}
"#;

pub(crate) fn document() -> Result<web_sys::Document, PlatformError> {
    web_sys::window()
        .ok_or("no window")?
        .document()
        .ok_or_else(|| "no document".into())
}

/// Inject the stylesheet once per page.
pub(crate) fn ensure_styles(document: &web_sys::Document) -> Result<(), PlatformError> {
    if document.get_element_by_id(STYLE_ID).is_some() {
        return Ok(());
    }
    let style = create(document, "style", None)?;
    style.set_id(STYLE_ID);
    style.set_text_content(Some(STYLES));
    let parent = document
        .head()
        .map(web_sys::Element::from)
        .or_else(|| document.document_element())
        .ok_or("no head element")?;
    parent
        .append_child(&style)
        .map_err(|e| format!("append_child failed: {:?}", e))?;
    Ok(())
}

pub(crate) fn create(
    document: &web_sys::Document,
    tag: &str,
    class: Option<&str>,
) -> Result<web_sys::Element, PlatformError> {
    let element = document
        .create_element(tag)
        .map_err(|e| format!("create_element({tag}) failed: {:?}", e))?;
    if let Some(class) = class {
        element.set_class_name(class);
    }
    Ok(element)
}

pub(crate) fn append(parent: &web_sys::Element, child: &web_sys::Element) -> Result<(), PlatformError> {
    parent
        .append_child(child)
        .map(|_| ())
        .map_err(|e| format!("append_child failed: {:?}", e).into())
}

pub(crate) fn body(document: &web_sys::Document) -> Result<web_sys::Element, PlatformError> {
    document
        .body()
        .map(web_sys::Element::from)
        .ok_or_else(|| "no body".into())
}

/// Current page scroll offset.
pub(crate) fn scroll() -> (f64, f64) {
    web_sys::window()
        .map(|w| (w.scroll_x().unwrap_or(0.0), w.scroll_y().unwrap_or(0.0)))
        .unwrap_or((0.0, 0.0))
}

pub(crate) fn viewport_width() -> f64 {
    web_sys::window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|width| width.as_f64())
        .unwrap_or(1024.0)
}

/// Position an absolutely placed overlay.
pub(crate) fn place(element: &web_sys::Element, top: f64, left: f64) {
    let _ = element.set_attribute("style", &format!("top: {top}px; left: {left}px;"));
}
