//! The accept/reject review panel.
//!
//! Shows the rewritten text with removed and added runs marked, anchored
//! above the surface and kept there on scroll. Closing is dropping: the
//! panel removes itself and its listeners.

use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use redraft_core::{PlatformError, Segment, anchor_panel};
use wasm_bindgen::JsCast;

use crate::element::BrowserElement;
use crate::ui;

type Action = Rc<dyn Fn()>;

pub struct ReviewPanel {
    root: web_sys::Element,
    _listeners: Vec<EventListener>,
}

impl ReviewPanel {
    /// Render `segments` next to `surface`.
    ///
    /// The callbacks run on a later tick, so they may drop the panel.
    /// A click outside the panel counts as a reject.
    pub fn open(
        surface: &BrowserElement,
        segments: &[Segment],
        on_accept: impl Fn() + 'static,
        on_reject: impl Fn() + 'static,
    ) -> Result<Self, PlatformError> {
        let document = ui::document()?;
        ui::ensure_styles(&document)?;

        let root = ui::create(&document, "div", Some("redraft-overlay"))?;
        root.set_attribute("role", "dialog")
            .map_err(|e| format!("set_attribute failed: {:?}", e))?;

        let text = ui::create(&document, "div", Some("redraft-text"))?;
        for segment in segments {
            let class = match segment {
                Segment::Same(_) => None,
                Segment::Removed(_) => Some("redraft-removed"),
                Segment::Added(_) => Some("redraft-added"),
            };
            let span = ui::create(&document, "span", class)?;
            span.set_text_content(Some(segment.text()));
            ui::append(&text, &span)?;
        }
        ui::append(&root, &text)?;

        let actions = ui::create(&document, "div", Some("redraft-actions"))?;
        let reject = button(&document, "✗ Esc", "Reject (Esc)")?;
        let accept = button(&document, "✓ Enter", "Accept (Enter)")?;
        ui::append(&actions, &reject)?;
        ui::append(&actions, &accept)?;
        ui::append(&root, &actions)?;
        ui::append(&ui::body(&document)?, &root)?;

        let on_accept: Action = Rc::new(on_accept);
        let on_reject: Action = Rc::new(on_reject);
        let window = web_sys::window().ok_or("no window")?;

        let mut listeners = vec![
            EventListener::new(&accept, "click", deferred(&on_accept)),
            EventListener::new(&reject, "click", deferred(&on_reject)),
        ];

        let anchor = surface.clone();
        let overlay = root.clone();
        listeners.push(EventListener::new_with_options(
            &window,
            "scroll",
            EventListenerOptions::run_in_capture_phase(),
            move |_| position(&overlay, &anchor),
        ));

        let overlay = root.clone();
        let reject_outside = on_reject.clone();
        listeners.push(EventListener::new(&document, "click", move |event| {
            let inside = event
                .target()
                .and_then(|target| target.dyn_into::<web_sys::Node>().ok())
                .is_some_and(|node| overlay.contains(Some(&node)));
            if !inside {
                defer(&reject_outside);
            }
        }));

        position(&root, surface);
        tracing::debug!(target: "redraft::panel", segments = segments.len(), "review panel open");

        Ok(Self {
            root,
            _listeners: listeners,
        })
    }

    pub fn element(&self) -> &web_sys::Element {
        &self.root
    }
}

impl Drop for ReviewPanel {
    fn drop(&mut self) {
        self.root.remove();
    }
}

fn button(
    document: &web_sys::Document,
    label: &str,
    title: &str,
) -> Result<web_sys::Element, PlatformError> {
    let button = ui::create(document, "button", Some("redraft-btn"))?;
    button
        .set_attribute("type", "button")
        .map_err(|e| format!("set_attribute failed: {:?}", e))?;
    button
        .set_attribute("title", title)
        .map_err(|e| format!("set_attribute failed: {:?}", e))?;
    button.set_text_content(Some(label));
    Ok(button)
}

fn position(overlay: &web_sys::Element, surface: &BrowserElement) {
    let placement = anchor_panel(surface.rect(), ui::scroll(), ui::viewport_width());
    ui::place(overlay, placement.top, placement.left);
}

/// Run `action` after the current event handler returns.
fn defer(action: &Action) {
    let action = action.clone();
    wasm_bindgen_futures::spawn_local(async move { action() });
}

fn deferred(action: &Action) -> impl FnMut(&web_sys::Event) + 'static {
    let action = action.clone();
    move |event: &web_sys::Event| {
        event.stop_propagation();
        defer(&action);
    }
}
