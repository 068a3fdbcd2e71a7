//! WASM browser tests for redraft-browser.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use redraft_browser::events::build_event;
use redraft_browser::{
    BrowserDocument, BrowserElement, BrowserNotices, Classifier, EventDescriptor, HostDocument,
    HostElement, Notice, NoticeSink, Platform, ReviewPanel, Segment, SelectorTables, SurfaceKind,
    WriteSurface, WriterConfig, extract_text, locate, write,
};

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

fn mount(html: &str) -> web_sys::Element {
    let doc = document();
    let host = doc.create_element("div").unwrap();
    host.set_inner_html(html);
    doc.body().unwrap().append_child(&host).unwrap();
    host
}

fn find(host: &web_sys::Element, selector: &str) -> BrowserElement {
    BrowserElement::new(host.query_selector(selector).unwrap().unwrap())
}

// === Platform detection ===

#[wasm_bindgen_test]
fn test_platform_from_user_agent() {
    let mac = Platform::from_user_agent(
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 Safari/605.1.15",
    );
    assert!(mac.mac && mac.primary_is_meta());

    let ipad = Platform::from_user_agent("Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X)");
    assert!(ipad.ios && !ipad.mac);

    let linux = Platform::from_user_agent("Mozilla/5.0 (X11; Linux x86_64) Firefox/128.0");
    assert!(!linux.primary_is_meta());
}

// === Read side ===

#[wasm_bindgen_test]
fn test_locate_focused_textarea() {
    let host = mount(r#"<p>hello</p><textarea class="draft">see u soon</textarea>"#);
    let area = find(&host, ".draft");
    area.focus().unwrap();

    let doc = BrowserDocument::current().unwrap();
    let surface = locate(&doc, &Classifier::default(), &SelectorTables::default()).unwrap();
    assert!(surface.element.same_node(&area));
    assert_eq!(surface.kind, SurfaceKind::PlainControl);
    assert_eq!(extract_text(&surface), "see u soon");
    host.remove();
}

#[wasm_bindgen_test]
fn test_tree_queries() {
    let host = mount(r#"<div class="outer"><span class="inner">x</span></div><b class="later">y</b>"#);
    let outer = find(&host, ".outer");
    let inner = find(&host, ".inner");
    let later = find(&host, ".later");

    assert!(outer.contains(&inner));
    assert!(!inner.contains(&outer));
    assert!(inner.precedes(&later));
    assert!(!later.precedes(&inner));
    assert!(inner.closest(".outer").unwrap().same_node(&outer));
    assert_eq!(outer.tag_name(), "div");
    assert!(BrowserDocument::current()
        .unwrap()
        .query_selector_all("div[")
        .is_empty());
    host.remove();
}

#[wasm_bindgen_test]
fn test_layout_hints() {
    let host = mount(
        r#"<div class="right" style="text-align: right">a</div><div class="left">b</div>"#,
    );
    assert!(find(&host, ".right").layout_hints().is_right_aligned());
    assert!(!find(&host, ".left").layout_hints().is_right_aligned());
    host.remove();
}

// === Events ===

#[wasm_bindgen_test]
fn test_paste_event_carries_text() {
    let event = build_event(&EventDescriptor::paste("hello"), &Platform::default()).unwrap();
    assert_eq!(event.type_(), "paste");
    assert!(event.bubbles());
    let paste = event.dyn_into::<web_sys::ClipboardEvent>().unwrap();
    let data = paste.clipboard_data().unwrap();
    assert_eq!(data.get_data("text/plain").unwrap(), "hello");
}

#[wasm_bindgen_test]
fn test_input_event_shape() {
    let event = build_event(&EventDescriptor::input("abc"), &Platform::default()).unwrap();
    let input = event.dyn_into::<web_sys::InputEvent>().unwrap();
    assert_eq!(input.input_type(), "insertText");
    assert_eq!(input.data().as_deref(), Some("abc"));

    let before =
        build_event(&EventDescriptor::before_input_paste("xyz"), &Platform::default()).unwrap();
    assert!(before.cancelable());
    let before = before.dyn_into::<web_sys::InputEvent>().unwrap();
    assert_eq!(before.input_type(), "insertFromPaste");
}

#[wasm_bindgen_test]
fn test_paste_shortcut_modifier() {
    let mac = Platform {
        mac: true,
        ios: false,
    };
    let event = build_event(&EventDescriptor::key_down("v", true), &mac).unwrap();
    let key = event.dyn_into::<web_sys::KeyboardEvent>().unwrap();
    assert_eq!(key.key(), "v");
    assert!(key.meta_key());
    assert!(!key.ctrl_key());
}

// === Write side ===

#[wasm_bindgen_test]
async fn test_write_textarea() {
    let host = mount(r#"<textarea class="draft">old text</textarea>"#);
    let area = find(&host, ".draft");

    let report = write(
        &area,
        &SurfaceKind::PlainControl,
        "brand new text",
        &WriterConfig::default(),
    )
    .await
    .unwrap();
    assert!(report.attempts.last().unwrap().succeeded);
    assert_eq!(area.value().unwrap(), "brand new text");
    host.remove();
}

#[wasm_bindgen_test]
async fn test_write_contenteditable() {
    let host = mount(r#"<div class="editor" contenteditable="true">old words</div>"#);
    let editor = find(&host, ".editor");

    write(
        &editor,
        &SurfaceKind::ContentEditable,
        "new words here",
        &WriterConfig::default(),
    )
    .await
    .unwrap();
    assert_eq!(editor.inner_text().unwrap().trim(), "new words here");
    host.remove();
}

#[wasm_bindgen_test]
fn test_rebuild_lines() {
    let host = mount(r#"<div class="editor" contenteditable="true">x</div>"#);
    let editor = find(&host, ".editor");
    editor.rebuild("one\n\nthree").unwrap();
    assert_eq!(editor.inner().child_element_count(), 3);
    assert_eq!(editor.text_content(), "onethree");
    host.remove();
}

#[wasm_bindgen_test]
fn test_select_all_covers_content() {
    let host = mount(r#"<div class="editor" contenteditable="true">héllo wörld</div>"#);
    let editor = find(&host, ".editor");
    editor.select_all().unwrap();
    assert_eq!(editor.selected_text(), "héllo wörld");
    host.remove();
}

// === UI ===

#[wasm_bindgen_test]
fn test_panel_lifecycle() {
    let host = mount(r#"<textarea class="draft">see u</textarea>"#);
    let area = find(&host, ".draft");

    let panel = ReviewPanel::open(
        &area,
        &[
            Segment::Same("see ".into()),
            Segment::Removed("u".into()),
            Segment::Added("you".into()),
        ],
        || {},
        || {},
    )
    .unwrap();
    let root = panel.element().clone();
    assert!(root.is_connected());
    assert_eq!(root.query_selector_all(".redraft-added").unwrap().length(), 1);
    assert!(root.text_content().unwrap().starts_with("see uyou"));

    drop(panel);
    assert!(!root.is_connected());
    host.remove();
}

#[wasm_bindgen_test]
fn test_notice_replaces_previous() {
    let notices = BrowserNotices::new();
    notices.notify(&Notice::info("first"));
    notices.notify(&Notice::error("second"));

    let shown = document().query_selector_all(".redraft-notice").unwrap();
    assert_eq!(shown.length(), 1);
    let element = document().get_element_by_id("redraft-notice").unwrap();
    assert_eq!(element.text_content().unwrap(), "second");
    assert!(element.class_list().contains("redraft-notice-error"));
}
