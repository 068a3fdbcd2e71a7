//! JS-backed collaborators for the orchestrator.

use std::cell::RefCell;
use std::rc::Rc;

use redraft_core::{ConfigSource, RedraftError, RewriteRequest, RewriteService};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::types::JsRewriteRequest;

/// Substring the extension runtime puts in errors once the page script has
/// outlived its extension.
const CONTEXT_INVALIDATED: &str = "Extension context invalidated";

type RejectionHandler = Rc<dyn Fn(String)>;

/// Sends requests through a JS `dispatch(request)` callback.
///
/// A synchronous throw fails the trigger. If the callback returns a promise
/// that later rejects, the rejection is reported through the handler set
/// with [`JsService::on_rejected`].
pub struct JsService {
    dispatch: js_sys::Function,
    context_check: Option<js_sys::Function>,
    on_rejected: RefCell<Option<RejectionHandler>>,
}

impl JsService {
    pub fn new(dispatch: js_sys::Function, context_check: Option<js_sys::Function>) -> Self {
        Self {
            dispatch,
            context_check,
            on_rejected: RefCell::new(None),
        }
    }

    pub fn on_rejected(&self, handler: impl Fn(String) + 'static) {
        *self.on_rejected.borrow_mut() = Some(Rc::new(handler));
    }

    fn watch(&self, promise: js_sys::Promise) {
        let handler = self.on_rejected.borrow().clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = JsFuture::from(promise).await {
                let message = error_message(&err);
                tracing::warn!(target: "redraft::service", %message, "dispatch rejected");
                if let Some(handler) = handler {
                    handler(message);
                }
            }
        });
    }
}

impl RewriteService for JsService {
    fn dispatch(&self, request: &RewriteRequest) -> Result<(), RedraftError> {
        let payload = serde_wasm_bindgen::to_value(&JsRewriteRequest::from(request.clone()))
            .map_err(|e| RedraftError::Transport(format!("Serialization error: {}", e)))?;

        let returned = self
            .dispatch
            .call1(&JsValue::NULL, &payload)
            .map_err(|err| transport_error(&err))?;

        if let Ok(promise) = returned.dyn_into::<js_sys::Promise>() {
            self.watch(promise);
        }
        Ok(())
    }

    fn context_valid(&self) -> bool {
        let Some(check) = &self.context_check else {
            return true;
        };
        match check.call0(&JsValue::NULL) {
            Ok(value) => value.is_truthy(),
            Err(err) => {
                tracing::debug!(target: "redraft::service", message = %error_message(&err), "context check threw");
                false
            }
        }
    }
}

fn transport_error(err: &JsValue) -> RedraftError {
    let message = error_message(err);
    if message.contains(CONTEXT_INVALIDATED) {
        RedraftError::StaleContext
    } else {
        RedraftError::Transport(message)
    }
}

fn error_message(err: &JsValue) -> String {
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}

/// Settings pushed in from extension storage.
#[derive(Clone, Debug, Default)]
pub struct StoredSettings {
    pub api_key: Option<String>,
    pub system_prompt: Option<String>,
}

impl ConfigSource for StoredSettings {
    fn api_key(&self) -> Option<String> {
        self.api_key.clone()
    }

    fn system_prompt_override(&self) -> Option<String> {
        self.system_prompt
            .clone()
            .filter(|prompt| !prompt.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_prompt_override_is_ignored() {
        let mut settings = StoredSettings {
            api_key: Some("sk-test".into()),
            system_prompt: Some("   ".into()),
        };
        assert_eq!(settings.system_prompt_override(), None);
        assert_eq!(settings.api_key().as_deref(), Some("sk-test"));

        settings.system_prompt = Some("Be brief.".into());
        assert_eq!(settings.system_prompt_override().as_deref(), Some("Be brief."));
    }
}
