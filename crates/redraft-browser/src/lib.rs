//! Browser DOM layer for redraft.
//!
//! This crate implements the `redraft-core` host traits over `web_sys` and
//! renders the small amount of UI a rewrite cycle needs. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `document`: `BrowserDocument`, the page as a `HostDocument`
//! - `element`: `BrowserElement`, read side (`HostElement`)
//! - `surface`: `BrowserElement` write side (`WriteSurface`)
//! - `events`: synthetic DOM events built from recipe event descriptors
//! - `panel`: the accept/reject review panel
//! - `notice`: transient toast notices (`NoticeSink`)
//! - `instruction`: the custom-instruction input box
//! - `platform`: browser/OS detection for modifier keys
//!
//! # Re-exports
//!
//! This crate re-exports `redraft-core` for convenience, so consumers only
//! need to depend on `redraft-browser`.

// Re-export core crate
pub use redraft_core;
pub use redraft_core::*;

pub mod document;
pub mod element;
pub mod events;
pub mod instruction;
pub mod notice;
pub mod panel;
pub mod platform;
pub mod surface;
mod ui;

pub use document::BrowserDocument;
pub use element::BrowserElement;
pub use instruction::InstructionBox;
pub use notice::BrowserNotices;
pub use panel::ReviewPanel;
pub use platform::{Platform, platform};
