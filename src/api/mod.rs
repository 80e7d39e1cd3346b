//! Markdown Editor WASM API
//!
//! This module provides the JavaScript-facing API for the markdown
//! editor engine. It includes shared utilities for serialization,
//! validation, and error handling, as well as the API functions
//! organized by functional domain.
//!
//! # Module Structure
//!
//! - `helpers`: session registry, serialization, error handling, logging
//! - `core`: instance lifecycle, editing, history, settings, collaborators
//! - `render`: document rendering, enhancement completion, scroll sync

pub mod core;
pub mod helpers;
pub mod render;

// Re-export all public functions to present a flat JS-facing surface
pub use self::core::{
    apply_directive, begin_upload, create_editor, destroy_editor, dispatch_key, emit_custom,
    finish_upload, get_text, now_ms, poll_events, redo, request_save, set_keymap, tick, undo,
    update_selection, update_setting, update_text,
};
pub use self::render::{complete_enhancement, render_document, set_active_pane, sync_scroll};
