//! The custom-instruction box.
//!
//! A labelled text input placed above the surface. Keys are handled by the
//! page-level shortcut listener; this type only owns the DOM.

use redraft_core::{PlatformError, anchor_panel};
use wasm_bindgen::JsCast;

use crate::element::BrowserElement;
use crate::ui;

pub struct InstructionBox {
    root: web_sys::Element,
    input: web_sys::HtmlInputElement,
}

impl InstructionBox {
    pub fn open(surface: &BrowserElement) -> Result<Self, PlatformError> {
        let document = ui::document()?;
        ui::ensure_styles(&document)?;

        let root = ui::create(&document, "div", Some("redraft-overlay"))?;
        let label = ui::create(&document, "div", None)?;
        label.set_text_content(Some("Custom Instructions:"));

        let input = ui::create(&document, "input", Some("redraft-instruction-input"))?
            .dyn_into::<web_sys::HtmlInputElement>()
            .map_err(|_| "created input is not an input element")?;
        input.set_type("text");
        input.set_placeholder("e.g - write formally, add humor, be casual...");
        input.set_autocomplete("off");
        input.set_spellcheck(false);

        ui::append(&root, &label)?;
        ui::append(&root, &input)?;
        ui::append(&ui::body(&document)?, &root)?;

        let placement = anchor_panel(surface.rect(), ui::scroll(), ui::viewport_width());
        ui::place(&root, placement.top, placement.left);

        input
            .focus()
            .map_err(|e| format!("focus failed: {:?}", e))?;
        input.select();

        Ok(Self { root, input })
    }

    /// Trimmed input value.
    pub fn instruction(&self) -> String {
        self.input.value().trim().to_string()
    }

    pub fn element(&self) -> &web_sys::Element {
        &self.root
    }
}

impl Drop for InstructionBox {
    fn drop(&mut self) {
        self.root.remove();
    }
}
