//! Core WASM API: instance lifecycle, editing, history, collaborators
//!
//! This module provides the JavaScript-facing entry points for creating
//! and destroying editor instances and for everything that mutates the
//! buffer: text input, directives, keyboard dispatch, undo/redo, upload
//! insertions, and the host-driven clock tick.

use wasm_bindgen::prelude::*;

use crate::api::helpers::{
    deserialize, deserialize_optional, lock_sessions, serialize, validation_error, with_session,
};
use crate::directives::DirectivePayload;
use crate::models::{EditorOptions, Selection, SettingKey};
use crate::session::{EditorSession, KeyCombo, KeymapEntry};
use crate::{wasm_info, wasm_log};

fn setting_key_from_str(key: &str) -> Result<SettingKey, JsValue> {
    match key {
        "preview" => Ok(SettingKey::Preview),
        "htmlPreview" => Ok(SettingKey::HtmlPreview),
        "pageFullscreen" => Ok(SettingKey::PageFullscreen),
        "fullscreen" => Ok(SettingKey::Fullscreen),
        other => Err(validation_error(format!("Unknown setting key: {}", other))),
    }
}

// ============================================================================
// Instance Lifecycle
// ============================================================================

/// Create an editor instance under `instance_id`.
///
/// `options` is an optional object matching EditorOptions; omitted fields
/// take their defaults (historyLength 10, tabWidth 2, ...).
#[wasm_bindgen(js_name = createEditor)]
pub fn create_editor(instance_id: &str, options: JsValue) -> Result<(), JsValue> {
    wasm_info!("createEditor called: id={}", instance_id);

    let options: EditorOptions =
        deserialize_optional(options, "Invalid editor options")?.unwrap_or_default();

    let mut sessions = lock_sessions()?;
    if sessions.contains_key(instance_id) {
        return Err(validation_error(format!(
            "Editor instance already exists: {}",
            instance_id
        )));
    }

    sessions.insert(
        instance_id.to_string(),
        EditorSession::new(instance_id, options),
    );
    Ok(())
}

/// Destroy an editor instance, releasing its subscriptions, history and
/// pending timers. In-flight enhancement completions for it become
/// no-ops. Returns false when the id was unknown.
#[wasm_bindgen(js_name = destroyEditor)]
pub fn destroy_editor(instance_id: &str) -> Result<bool, JsValue> {
    wasm_info!("destroyEditor called: id={}", instance_id);

    let mut sessions = lock_sessions()?;
    Ok(sessions.remove(instance_id).is_some())
}

// ============================================================================
// Buffer Editing
// ============================================================================

/// Keystroke path: replace the buffer from the host textarea. Arms the
/// history debounce; the commit happens on a later tick.
#[wasm_bindgen(js_name = updateText)]
pub fn update_text(
    instance_id: &str,
    text: &str,
    selection_start: usize,
    selection_end: usize,
    now_ms: f64,
) -> Result<(), JsValue> {
    with_session(instance_id, |session| {
        session.update_text(
            text.to_string(),
            Selection::new(selection_start, selection_end),
            now_ms,
        );
        Ok(())
    })
}

/// Track the textarea selection without changing the buffer.
#[wasm_bindgen(js_name = updateSelection)]
pub fn update_selection(
    instance_id: &str,
    selection_start: usize,
    selection_end: usize,
) -> Result<(), JsValue> {
    with_session(instance_id, |session| {
        session.update_selection(Selection::new(selection_start, selection_end));
        Ok(())
    })
}

/// Apply a named directive to the current selection.
///
/// `payload` is an optional `{desc, url}` object for link/image. Returns
/// `{text, selectionStart, selectionEnd, clipboard}` for write-back and
/// re-focus.
#[wasm_bindgen(js_name = applyDirective)]
pub fn apply_directive(
    instance_id: &str,
    name: &str,
    payload: JsValue,
    now_ms: f64,
) -> Result<JsValue, JsValue> {
    wasm_log!("applyDirective called: id={}, directive={}", instance_id, name);

    let payload: Option<DirectivePayload> =
        deserialize_optional(payload, "Invalid directive payload")?;

    with_session(instance_id, |session| {
        let response = session.apply_directive(name, payload.as_ref(), now_ms);
        serialize(&response, "Failed to serialize directive response")
    })
}

// ============================================================================
// Keyboard Dispatch
// ============================================================================

/// Resolve a key combination through the instance keymap and dispatch the
/// bound action. Returns `{handled, response}`; an unhandled combination
/// leaves the event to the browser default.
#[wasm_bindgen(js_name = dispatchKey)]
pub fn dispatch_key(
    instance_id: &str,
    key: &str,
    ctrl: bool,
    shift: bool,
    alt: bool,
    now_ms: f64,
) -> Result<JsValue, JsValue> {
    with_session(instance_id, |session| {
        let combo = KeyCombo::new(key, ctrl, shift, alt);
        let dispatch = session.dispatch_key(&combo, now_ms);
        serialize(&dispatch, "Failed to serialize key dispatch")
    })
}

/// Replace the instance's shortcut table with host-supplied entries:
/// an array of `{key, ctrl, shift, alt, action}`.
#[wasm_bindgen(js_name = setKeymap)]
pub fn set_keymap(instance_id: &str, entries: JsValue) -> Result<(), JsValue> {
    let entries: Vec<KeymapEntry> = deserialize(entries, "Invalid keymap entries")?;

    with_session(instance_id, |session| {
        session.keymap_mut().replace(entries);
        Ok(())
    })
}

// ============================================================================
// History
// ============================================================================

/// Step back one history entry. Returns the restored snapshot, or null
/// when already at the earliest entry.
#[wasm_bindgen]
pub fn undo(instance_id: &str) -> Result<JsValue, JsValue> {
    with_session(instance_id, |session| {
        let response = session.undo();
        serialize(&response, "Failed to serialize undo response")
    })
}

/// Step forward one history entry. Returns the restored snapshot, or
/// null when already at the newest entry.
#[wasm_bindgen]
pub fn redo(instance_id: &str) -> Result<JsValue, JsValue> {
    with_session(instance_id, |session| {
        let response = session.redo();
        serialize(&response, "Failed to serialize redo response")
    })
}

// ============================================================================
// Settings
// ============================================================================

/// Toggle a display setting. Returns the settings after the mutual
/// exclusion rules have run.
#[wasm_bindgen(js_name = updateSetting)]
pub fn update_setting(instance_id: &str, key: &str, value: bool) -> Result<JsValue, JsValue> {
    let key = setting_key_from_str(key)?;

    with_session(instance_id, |session| {
        let settings = session.update_setting(key, value);
        serialize(&settings, "Failed to serialize settings")
    })
}

// ============================================================================
// Collaborators: save & upload
// ============================================================================

/// Emit a save request carrying the current buffer; the host persists it
/// (drain via pollEvents).
#[wasm_bindgen(js_name = requestSave)]
pub fn request_save(instance_id: &str) -> Result<(), JsValue> {
    with_session(instance_id, |session| {
        session.request_save();
        Ok(())
    })
}

/// Announce that the user picked files to upload; the host-side handler
/// performs the transfer and reports back via finishUpload.
#[wasm_bindgen(js_name = beginUpload)]
pub fn begin_upload(instance_id: &str, file_count: usize) -> Result<(), JsValue> {
    with_session(instance_id, |session| {
        session.begin_upload(file_count);
        Ok(())
    })
}

/// Deliver the uploaded URLs, in result order. One image insertion is
/// queued per url and drained one per tick so insertions never race.
#[wasm_bindgen(js_name = finishUpload)]
pub fn finish_upload(instance_id: &str, urls: JsValue) -> Result<(), JsValue> {
    let urls: Vec<String> = deserialize(urls, "Invalid upload url list")?;
    wasm_log!("finishUpload called: id={}, urls={}", instance_id, urls.len());

    with_session(instance_id, |session| {
        session.finish_upload(urls);
        Ok(())
    })
}

// ============================================================================
// Clock & Events
// ============================================================================

/// Milliseconds clock for hosts driving ticks straight from WASM.
#[wasm_bindgen(js_name = nowMs)]
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now())
        .unwrap_or(0.0)
}

/// Host-driven clock: fires a due history commit and drains at most one
/// queued upload insertion. Returns `{committed, inserted}`.
#[wasm_bindgen]
pub fn tick(instance_id: &str, now_ms: f64) -> Result<JsValue, JsValue> {
    with_session(instance_id, |session| {
        let report = session.tick(now_ms);
        serialize(&report, "Failed to serialize tick report")
    })
}

/// Drain outbound collaborator events (save/html/catalog/upload) for the
/// host to act on.
#[wasm_bindgen(js_name = pollEvents)]
pub fn poll_events(instance_id: &str) -> Result<js_sys::Array, JsValue> {
    with_session(instance_id, |session| {
        let events = session.poll_events();
        let array = js_sys::Array::new();
        for event in &events {
            array.push(&serialize(event, "Failed to serialize event")?);
        }
        Ok(array)
    })
}

/// Emit onto a custom passthrough channel. Only Rust-side bus
/// subscribers observe these events.
#[wasm_bindgen(js_name = emitCustom)]
pub fn emit_custom(instance_id: &str, name: &str, payload: JsValue) -> Result<(), JsValue> {
    let payload: serde_json::Value = deserialize_optional(payload, "Invalid custom payload")?
        .unwrap_or(serde_json::Value::Null);

    with_session(instance_id, |session| {
        session.emit_custom(name, payload);
        Ok(())
    })
}

/// Current buffer text.
#[wasm_bindgen(js_name = getText)]
pub fn get_text(instance_id: &str) -> Result<String, JsValue> {
    with_session(instance_id, |session| Ok(session.text().to_string()))
}
