//! Markdown Editor WASM Module
//!
//! This is the main WASM module for the markdown editor. It provides the
//! core engine behind the dual-pane editor: directive text transforms,
//! debounced undo/redo history, the markdown render pipeline with
//! catalog extraction, the per-instance event bus, and scroll
//! synchronization.

pub mod api;
pub mod bus;
pub mod directives;
pub mod errors;
pub mod history;
pub mod models;
pub mod render;
pub mod scroll;
pub mod session;
pub mod utils;

// Re-export commonly used types
pub use bus::{EventBus, EventKind, EventPayload, OutboundEvent};
pub use directives::{Directive, DirectiveConfig, DirectiveOutcome, DirectivePayload};
pub use errors::{EngineError, TransformError};
pub use history::{History, HistoryEntry};
pub use models::{EditorOptions, EditorState, Heading, Selection, SettingKey, Settings};
pub use render::{RenderOutput, RenderPipeline, RenderResult};
pub use scroll::{Pane, ScrollMetrics, ScrollSync};
pub use session::{DirectiveResponse, EditorSession, KeyCombo, Keymap};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).expect("failed to initialize logger");

    log::info!("Markdown Editor WASM module initialized");
}
