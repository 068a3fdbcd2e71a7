//! Synthetic DOM events for write recipes.
//!
//! Maps a core [`EventDescriptor`] onto the matching `web_sys` event type.
//! Every event bubbles; `transfer` payloads travel in a fresh `DataTransfer`
//! as `text/plain`.

use redraft_core::{EventDescriptor, EventKind, PlatformError};
use wasm_bindgen::JsCast;

use crate::platform::Platform;

/// Build the DOM event for a descriptor.
pub fn build_event(
    descriptor: &EventDescriptor,
    platform: &Platform,
) -> Result<web_sys::Event, PlatformError> {
    let event_type = descriptor.kind.event_type();
    let event: web_sys::Event = match descriptor.kind {
        EventKind::BeforeInput | EventKind::Input => {
            let init = web_sys::InputEventInit::new();
            init.set_bubbles(true);
            init.set_cancelable(descriptor.cancelable);
            if let Some(input_type) = &descriptor.input_type {
                init.set_input_type(input_type);
            }
            if descriptor.transfer {
                let transfer = data_transfer(descriptor.data.as_deref().unwrap_or_default())?;
                init.set_data_transfer(Some(&transfer));
            } else {
                init.set_data(descriptor.data.as_deref());
            }
            web_sys::InputEvent::new_with_event_init_dict(event_type, &init)
                .map_err(|e| format!("{event_type} construction failed: {:?}", e))?
                .unchecked_into()
        }
        EventKind::Paste => {
            let init = web_sys::ClipboardEventInit::new();
            init.set_bubbles(true);
            init.set_cancelable(true);
            let transfer = data_transfer(descriptor.data.as_deref().unwrap_or_default())?;
            init.set_clipboard_data(Some(&transfer));
            web_sys::ClipboardEvent::new_with_event_init_dict(event_type, &init)
                .map_err(|e| format!("paste construction failed: {:?}", e))?
                .unchecked_into()
        }
        EventKind::KeyDown | EventKind::KeyUp => {
            let init = web_sys::KeyboardEventInit::new();
            init.set_bubbles(true);
            init.set_cancelable(true);
            if let Some(key) = &descriptor.key {
                init.set_key(key);
                if key.chars().count() == 1 {
                    init.set_code(&format!("Key{}", key.to_ascii_uppercase()));
                }
            }
            if descriptor.modifier {
                if platform.primary_is_meta() {
                    init.set_meta_key(true);
                } else {
                    init.set_ctrl_key(true);
                }
            }
            web_sys::KeyboardEvent::new_with_keyboard_event_init_dict(event_type, &init)
                .map_err(|e| format!("{event_type} construction failed: {:?}", e))?
                .unchecked_into()
        }
        EventKind::CompositionStart | EventKind::CompositionEnd => {
            let init = web_sys::CompositionEventInit::new();
            init.set_bubbles(true);
            init.set_data(descriptor.data.as_deref().unwrap_or_default());
            web_sys::CompositionEvent::new_with_event_init_dict(event_type, &init)
                .map_err(|e| format!("{event_type} construction failed: {:?}", e))?
                .unchecked_into()
        }
        EventKind::Change => {
            let init = web_sys::EventInit::new();
            init.set_bubbles(true);
            web_sys::Event::new_with_event_init_dict(event_type, &init)
                .map_err(|e| format!("change construction failed: {:?}", e))?
        }
    };
    Ok(event)
}

fn data_transfer(text: &str) -> Result<web_sys::DataTransfer, PlatformError> {
    let transfer =
        web_sys::DataTransfer::new().map_err(|e| format!("DataTransfer unavailable: {:?}", e))?;
    transfer
        .set_data("text/plain", text)
        .map_err(|e| format!("DataTransfer set_data failed: {:?}", e))?;
    Ok(transfer)
}
