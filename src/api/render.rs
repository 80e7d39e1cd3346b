//! Render & scroll WASM API
//!
//! JavaScript-facing entry points for the render pipeline (full document
//! render, asynchronous enhancement completion) and the dual-pane scroll
//! synchronizer.

use wasm_bindgen::prelude::*;

use crate::api::helpers::{deserialize, serialize, validation_error, with_session};
use crate::scroll::{Pane, ScrollMetrics};
use crate::wasm_log;

fn pane_from_str(pane: &str) -> Result<Pane, JsValue> {
    match pane {
        "source" => Ok(Pane::Source),
        "preview" => Ok(Pane::Preview),
        other => Err(validation_error(format!("Unknown pane: {}", other))),
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Recompute the full document render.
///
/// Returns `{html, headings, jobs}`: first-pass HTML with placeholder
/// blocks, the heading catalog in document order, and the enhancement
/// jobs awaiting completion once the host's assets have loaded.
#[wasm_bindgen(js_name = renderDocument)]
pub fn render_document(instance_id: &str) -> Result<JsValue, JsValue> {
    wasm_log!("renderDocument called: id={}", instance_id);

    with_session(instance_id, |session| {
        let output = session.render();
        serialize(&output, "Failed to serialize render output")
    })
}

/// Complete one enhancement job with externally rendered HTML.
///
/// Returns the updated full document HTML, or null when the job was
/// stale (superseded render) and was dropped — the host must not apply
/// anything in that case.
#[wasm_bindgen(js_name = completeEnhancement)]
pub fn complete_enhancement(
    instance_id: &str,
    job_id: f64,
    generation: f64,
    html: &str,
) -> Result<JsValue, JsValue> {
    with_session(instance_id, |session| {
        let updated = session.complete_enhancement(job_id as u64, generation as u64, html);
        serialize(&updated, "Failed to serialize enhancement result")
    })
}

// ============================================================================
// Scroll Synchronization
// ============================================================================

/// Mark the pane under the pointer as the one driving synchronization.
#[wasm_bindgen(js_name = setActivePane)]
pub fn set_active_pane(instance_id: &str, pane: &str) -> Result<(), JsValue> {
    let pane = pane_from_str(pane)?;
    with_session(instance_id, |session| {
        session.set_active_pane(pane);
        Ok(())
    })
}

/// Handle a scroll event on `pane`.
///
/// `own` and `other` are `{scrollTop, scrollHeight, clientHeight}`
/// measured at event time. Returns the scrollTop to apply to the other
/// pane, or null when the event came from the passive pane and must be
/// ignored (re-entrancy guard).
#[wasm_bindgen(js_name = syncScroll)]
pub fn sync_scroll(
    instance_id: &str,
    pane: &str,
    own: JsValue,
    other: JsValue,
) -> Result<Option<f64>, JsValue> {
    let pane = pane_from_str(pane)?;
    let own: ScrollMetrics = deserialize(own, "Invalid scroll metrics")?;
    let other: ScrollMetrics = deserialize(other, "Invalid scroll metrics")?;

    with_session(instance_id, |session| {
        Ok(session.sync_scroll(pane, own, other))
    })
}
