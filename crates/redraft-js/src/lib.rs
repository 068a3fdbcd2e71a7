//! WASM bindings for redraft.
//!
//! The extension's page script constructs a [`JsRedraft`], forwards runtime
//! messages to it and hands it a `dispatch` callback that carries requests to
//! the background process. Everything else (finding the draft, harvesting the
//! conversation, showing the review panel, writing the result) happens here.

mod redraft;
mod service;
mod types;

pub use redraft::*;
pub use service::*;
pub use types::*;

use wasm_bindgen::prelude::*;

/// Install the panic hook and the console tracing layer.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    use tracing::Level;
    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    let console_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );

    let _ = set_global_default(Registry::default().with(wasm_layer));
}
