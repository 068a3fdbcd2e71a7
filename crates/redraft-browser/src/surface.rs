//! Write side of a page element.
//!
//! Form controls are driven through their value and selection range;
//! everything else through the document selection and the element's
//! content.

use std::future::Future;

use redraft_core::{EventDescriptor, HostElement, PlatformError, WriteSurface};
use wasm_bindgen::{JsCast, JsValue};

use crate::element::BrowserElement;
use crate::events::build_event;
use crate::platform::platform;

fn window() -> Result<web_sys::Window, PlatformError> {
    web_sys::window().ok_or_else(|| "no window".into())
}

fn html_document(element: &web_sys::Element) -> Result<web_sys::HtmlDocument, PlatformError> {
    element
        .owner_document()
        .ok_or("element has no document")?
        .dyn_into::<web_sys::HtmlDocument>()
        .map_err(|_| "not an HTML document".into())
}

fn selection() -> Result<web_sys::Selection, PlatformError> {
    window()?
        .get_selection()
        .map_err(|e| format!("get_selection failed: {:?}", e))?
        .ok_or_else(|| "no selection object".into())
}

impl BrowserElement {
    fn is_form_control(&self) -> bool {
        self.as_textarea().is_some() || self.as_input().is_some()
    }

    fn set_control_value(&self, text: &str) -> Result<(), PlatformError> {
        // The prototype setter bypasses instance-level value trackers that
        // frameworks install on controlled inputs.
        if let Some(setter) = native_value_setter(self.inner()) {
            setter
                .call1(self.inner(), &JsValue::from_str(text))
                .map_err(|e| format!("value setter failed: {:?}", e))?;
            return Ok(());
        }
        if let Some(area) = self.as_textarea() {
            area.set_value(text);
        } else if let Some(input) = self.as_input() {
            input.set_value(text);
        }
        Ok(())
    }

    fn exec(&self, command: &str, value: Option<&str>) -> Result<bool, PlatformError> {
        let document = html_document(self.inner())?;
        let result = match value {
            Some(value) => document.exec_command_with_show_ui_and_value(command, false, value),
            None => document.exec_command(command),
        };
        result.map_err(|e| format!("execCommand('{command}') failed: {:?}", e).into())
    }

    fn control_range(&self) -> Option<(u32, u32)> {
        let (start, end) = if let Some(area) = self.as_textarea() {
            (area.selection_start(), area.selection_end())
        } else {
            let input = self.as_input()?;
            (input.selection_start(), input.selection_end())
        };
        Some((start.ok().flatten()?, end.ok().flatten()?))
    }
}

fn native_value_setter(element: &web_sys::Element) -> Option<js_sys::Function> {
    let proto = js_sys::Object::get_prototype_of(element);
    let descriptor = js_sys::Object::get_own_property_descriptor(&proto, &JsValue::from_str("value"));
    js_sys::Reflect::get(&descriptor, &JsValue::from_str("set"))
        .ok()?
        .dyn_into::<js_sys::Function>()
        .ok()
}

impl WriteSurface for BrowserElement {
    fn focus(&self) -> Result<(), PlatformError> {
        self.as_html()
            .ok_or("not an HTML element")?
            .focus()
            .map_err(|e| format!("focus failed: {:?}", e).into())
    }

    fn select_all(&self) -> Result<(), PlatformError> {
        if let Some(area) = self.as_textarea() {
            area.select();
            return Ok(());
        }
        if let Some(input) = self.as_input() {
            input.select();
            return Ok(());
        }

        let document = self.inner().owner_document().ok_or("element has no document")?;
        let range = document
            .create_range()
            .map_err(|e| format!("create_range failed: {:?}", e))?;
        range
            .select_node_contents(self.inner())
            .map_err(|e| format!("select_node_contents failed: {:?}", e))?;
        let selection = selection()?;
        selection
            .remove_all_ranges()
            .map_err(|e| format!("remove_all_ranges failed: {:?}", e))?;
        selection
            .add_range(&range)
            .map_err(|e| format!("add_range failed: {:?}", e).into())
    }

    fn selected_text(&self) -> String {
        if self.is_form_control() {
            let Some((start, end)) = self.control_range() else {
                return String::new();
            };
            // Control offsets are UTF-16 code units.
            let value = js_sys::JsString::from(self.value().unwrap_or_default());
            return String::from(value.substring(start, end));
        }

        let Ok(selection) = selection() else {
            return String::new();
        };
        if selection.range_count() == 0 {
            return String::new();
        }
        let Ok(range) = selection.get_range_at(0) else {
            return String::new();
        };
        let inside = range
            .common_ancestor_container()
            .is_ok_and(|ancestor| self.inner().contains(Some(&ancestor)));
        if !inside {
            return String::new();
        }
        String::from(range.to_string())
    }

    fn clear(&self) -> Result<(), PlatformError> {
        if self.is_form_control() {
            return self.set_control_value("");
        }
        self.inner().set_inner_html("");
        Ok(())
    }

    fn exec_insert_text(&self, text: &str) -> Result<bool, PlatformError> {
        self.exec("insertText", Some(text))
    }

    fn exec_delete(&self) -> Result<bool, PlatformError> {
        self.exec("delete", None)
    }

    fn assign(&self, text: &str) -> Result<(), PlatformError> {
        if self.is_form_control() {
            return self.set_control_value(text);
        }
        let html = self.as_html().ok_or("not an HTML element")?;
        html.set_inner_text(text);
        Ok(())
    }

    fn rebuild(&self, text: &str) -> Result<(), PlatformError> {
        if self.is_form_control() {
            return self.set_control_value(text);
        }
        let document = self.inner().owner_document().ok_or("element has no document")?;
        self.inner().set_inner_html("");

        for line in text.split('\n') {
            let block = document
                .create_element("p")
                .map_err(|e| format!("create_element failed: {:?}", e))?;
            if line.is_empty() {
                let br = document
                    .create_element("br")
                    .map_err(|e| format!("create_element failed: {:?}", e))?;
                block
                    .append_child(&br)
                    .map_err(|e| format!("append_child failed: {:?}", e))?;
            } else {
                block.set_text_content(Some(line));
            }
            self.inner()
                .append_child(&block)
                .map_err(|e| format!("append_child failed: {:?}", e))?;
        }
        Ok(())
    }

    fn dispatch(&self, descriptor: &EventDescriptor) -> Result<(), PlatformError> {
        let event = build_event(descriptor, &platform())?;
        self.inner()
            .dispatch_event(&event)
            .map(|_| ())
            .map_err(|e| format!("dispatch failed: {:?}", e).into())
    }

    fn place_caret_at_end(&self) -> Result<(), PlatformError> {
        if let Some(area) = self.as_textarea() {
            let end = js_sys::JsString::from(area.value()).length();
            return area
                .set_selection_range(end, end)
                .map_err(|e| format!("set_selection_range failed: {:?}", e).into());
        }
        if let Some(input) = self.as_input() {
            let end = js_sys::JsString::from(input.value()).length();
            return input
                .set_selection_range(end, end)
                .map_err(|e| format!("set_selection_range failed: {:?}", e).into());
        }

        let document = self.inner().owner_document().ok_or("element has no document")?;
        let range = document
            .create_range()
            .map_err(|e| format!("create_range failed: {:?}", e))?;

        match last_text_node(&document, self.inner())? {
            Some(text) => {
                let end = text.length();
                range
                    .set_start(&text, end)
                    .map_err(|e| format!("set_start failed: {:?}", e))?;
                range.collapse_with_to_start(true);
            }
            None => {
                range
                    .select_node_contents(self.inner())
                    .map_err(|e| format!("select_node_contents failed: {:?}", e))?;
                range.collapse_with_to_start(false);
            }
        }

        let selection = selection()?;
        selection
            .remove_all_ranges()
            .map_err(|e| format!("remove_all_ranges failed: {:?}", e))?;
        selection
            .add_range(&range)
            .map_err(|e| format!("add_range failed: {:?}", e).into())
    }

    fn sleep(&self, ms: u32) -> impl Future<Output = ()> {
        gloo_timers::future::TimeoutFuture::new(ms)
    }
}

fn last_text_node(
    document: &web_sys::Document,
    root: &web_sys::Element,
) -> Result<Option<web_sys::Text>, PlatformError> {
    let walker = document
        .create_tree_walker_with_what_to_show(root, 0x4 /* NodeFilter.SHOW_TEXT */)
        .map_err(|e| format!("create_tree_walker failed: {:?}", e))?;

    let mut last = None;
    while let Some(node) = walker
        .next_node()
        .map_err(|e| format!("tree walk failed: {:?}", e))?
    {
        last = Some(node);
    }
    Ok(last.and_then(|node| node.dyn_into::<web_sys::Text>().ok()))
}
