//! Editor session
//!
//! One EditorSession per instance id, owning the buffer state, event bus,
//! history, render pipeline, scroll synchronizer, keymap, and the queue
//! of staggered upload insertions. Every buffer write goes through the
//! single mutation entry point so change subscribers fire exactly once
//! per logical edit.
//!
//! Dropping a session is teardown: bus subscriptions, history, and
//! pending timers go with it, and in-flight enhancement completions
//! become unaddressable.

pub mod keymap;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::bus::{EventBus, EventKind, EventPayload, OutboundEvent, Subscriber};
use crate::directives::{self, Directive, DirectiveConfig, DirectivePayload};
use crate::errors::EngineError;
use crate::history::History;
use crate::models::{EditorOptions, EditorState, Selection, SettingKey, Settings};
use crate::render::{RenderOutput, RenderPipeline};
use crate::scroll::{Pane, ScrollMetrics, ScrollSync};

pub use keymap::{KeyAction, KeyCombo, Keymap, KeymapEntry};

/// Buffer/selection snapshot returned to the host after an edit, so it
/// can write the textarea back and re-focus
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DirectiveResponse {
    pub text: String,
    pub selection_start: usize,
    pub selection_end: usize,
    /// Text for the host clipboard (copy/cut)
    pub clipboard: Option<String>,
}

/// Result of a key dispatch
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct KeyDispatch {
    pub handled: bool,
    pub response: Option<DirectiveResponse>,
}

/// What one tick did (host-observable for scheduling)
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    /// A debounce group committed to history
    pub committed: bool,
    /// One queued upload insertion was applied
    pub inserted: bool,
}

/// Who is writing the buffer, which decides the history policy
enum EditOrigin {
    /// Direct user input: rides the debounce timer
    Keystroke { now_ms: f64 },
    /// Discrete directive application: commits immediately
    Directive { now_ms: f64 },
    /// Undo/redo restoration: never re-enters history
    Restore,
}

/// Complete per-instance editor engine
pub struct EditorSession {
    id: String,
    state: EditorState,
    directive_config: DirectiveConfig,
    bus: EventBus,
    history: History,
    pipeline: RenderPipeline,
    scroll: ScrollSync,
    keymap: Keymap,
    pending_inserts: VecDeque<Directive>,
    outbox: Arc<Mutex<VecDeque<OutboundEvent>>>,
}

impl EditorSession {
    pub fn new(id: &str, options: EditorOptions) -> Self {
        let state = EditorState::new(options.initial_text.clone(), options.initial_settings());
        let history = History::new(
            options.history_length,
            options.history_debounce_ms,
            &options.initial_text,
        );

        let outbox: Arc<Mutex<VecDeque<OutboundEvent>>> = Arc::new(Mutex::new(VecDeque::new()));
        let mut bus = EventBus::new();
        wire_outbox(&mut bus, &outbox);

        Self {
            id: id.to_string(),
            state,
            directive_config: DirectiveConfig {
                tab_width: options.tab_width,
            },
            bus,
            history,
            pipeline: RenderPipeline::new(),
            scroll: ScrollSync::new(),
            keymap: Keymap::new(),
            pending_inserts: VecDeque::new(),
            outbox,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.state.raw_text
    }

    pub fn selection(&self) -> Selection {
        self.state.selection()
    }

    pub fn settings(&self) -> Settings {
        self.state.settings
    }

    /// Rust-side subscription seam (hosts embedding the rlib, tests).
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn pipeline_mut(&mut self) -> &mut RenderPipeline {
        &mut self.pipeline
    }

    pub fn keymap_mut(&mut self) -> &mut Keymap {
        &mut self.keymap
    }

    // ========================================================================
    // Buffer mutation
    // ========================================================================

    /// The single mutation entry point. Every writer — user input,
    /// directives, undo/redo — funnels through here so BufferChanged
    /// fires exactly once per logical edit.
    fn write_buffer(&mut self, text: String, selection: Selection, origin: EditOrigin) {
        self.state.replace(text, selection);

        match origin {
            EditOrigin::Keystroke { now_ms } => self.history.note_mutation(now_ms),
            EditOrigin::Directive { now_ms } => {
                self.history
                    .commit(&self.state.raw_text, self.state.selection(), now_ms);
            }
            EditOrigin::Restore => {}
        }

        self.bus.emit(&EventKind::BufferChanged, &EventPayload::None);
    }

    /// Host textarea input: the keystroke path.
    pub fn update_text(&mut self, text: String, selection: Selection, now_ms: f64) {
        self.write_buffer(text, selection, EditOrigin::Keystroke { now_ms });
    }

    /// Move the selection without touching the buffer.
    pub fn update_selection(&mut self, selection: Selection) {
        self.state.set_selection(selection);
    }

    // ========================================================================
    // Directives
    // ========================================================================

    pub fn apply_directive(
        &mut self,
        name: &str,
        payload: Option<&DirectivePayload>,
        now_ms: f64,
    ) -> DirectiveResponse {
        let directive = Directive::from_name(name, payload);
        self.apply_directive_value(&directive, now_ms)
    }

    pub fn apply_directive_value(&mut self, directive: &Directive, now_ms: f64) -> DirectiveResponse {
        // Refresh the current entry's selection so undo restores the
        // pre-edit cursor exactly
        self.history.sync_selection(self.state.selection());

        let outcome = directives::apply(
            &self.state.raw_text,
            self.state.selection(),
            directive,
            &self.directive_config,
        );

        if outcome.new_buffer != self.state.raw_text && directive.commits_immediately() {
            self.write_buffer(
                outcome.new_buffer,
                outcome.new_selection,
                EditOrigin::Directive { now_ms },
            );
        } else {
            self.state.set_selection(outcome.new_selection);
        }

        DirectiveResponse {
            text: self.state.raw_text.clone(),
            selection_start: self.state.selection().start,
            selection_end: self.state.selection().end,
            clipboard: outcome.clipboard,
        }
    }

    // ========================================================================
    // Keyboard dispatch
    // ========================================================================

    pub fn dispatch_key(&mut self, combo: &KeyCombo, now_ms: f64) -> KeyDispatch {
        let Some(action) = self.keymap.resolve(combo).cloned() else {
            return KeyDispatch {
                handled: false,
                response: None,
            };
        };

        let response = match action {
            KeyAction::Directive(name) => Some(self.apply_directive(&name, None, now_ms)),
            KeyAction::Undo => self.undo(),
            KeyAction::Redo => self.redo(),
            KeyAction::Save => {
                self.request_save();
                None
            }
        };

        KeyDispatch {
            handled: true,
            response,
        }
    }

    // ========================================================================
    // History
    // ========================================================================

    pub fn undo(&mut self) -> Option<DirectiveResponse> {
        // The group being typed must not be lost when it is undone over
        self.history
            .flush_pending(&self.state.raw_text, self.state.selection());

        let entry = self.history.undo()?;
        self.write_buffer(entry.text.clone(), entry.selection(), EditOrigin::Restore);
        Some(self.snapshot_response())
    }

    pub fn redo(&mut self) -> Option<DirectiveResponse> {
        let entry = self.history.redo()?;
        self.write_buffer(entry.text.clone(), entry.selection(), EditOrigin::Restore);
        Some(self.snapshot_response())
    }

    fn snapshot_response(&self) -> DirectiveResponse {
        DirectiveResponse {
            text: self.state.raw_text.clone(),
            selection_start: self.state.selection().start,
            selection_end: self.state.selection().end,
            clipboard: None,
        }
    }

    // ========================================================================
    // Collaborator events
    // ========================================================================

    pub fn request_save(&mut self) {
        let text = self.state.raw_text.clone();
        self.bus
            .emit(&EventKind::SaveRequested, &EventPayload::Text(text));
    }

    /// Announce an upload; the host-side handler does the transfer and
    /// reports back through [`EditorSession::finish_upload`].
    pub fn begin_upload(&mut self, file_count: usize) {
        self.bus.emit(
            &EventKind::UploadRequested,
            &EventPayload::FileCount(file_count),
        );
    }

    /// Queue one image insertion per url. Insertions drain one per tick
    /// so each becomes its own directive application, in result order.
    pub fn finish_upload(&mut self, urls: Vec<String>) {
        for url in urls {
            self.pending_inserts.push_back(Directive::Image {
                desc: String::new(),
                url,
            });
        }
    }

    /// Emit onto a host-defined passthrough channel. Only Rust-side
    /// subscribers registered through [`EditorSession::bus_mut`] observe
    /// these; the outbox ignores them.
    pub fn emit_custom(&mut self, name: &str, payload: serde_json::Value) {
        self.bus.emit(
            &EventKind::Custom(name.to_string()),
            &EventPayload::Json(payload),
        );
    }

    pub fn poll_events(&mut self) -> Vec<OutboundEvent> {
        match self.outbox.lock() {
            Ok(mut queue) => queue.drain(..).collect(),
            Err(_) => Vec::new(),
        }
    }

    // ========================================================================
    // Clock
    // ========================================================================

    /// Host-driven time: fires a due debounce commit and drains at most
    /// one staggered upload insertion.
    pub fn tick(&mut self, now_ms: f64) -> TickReport {
        let committed =
            self.history
                .commit_if_due(now_ms, &self.state.raw_text, self.state.selection());

        let inserted = match self.pending_inserts.pop_front() {
            Some(directive) => {
                self.apply_directive_value(&directive, now_ms);
                true
            }
            None => false,
        };

        TickReport { committed, inserted }
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    pub fn render(&mut self) -> RenderOutput {
        let output = self.pipeline.render(&self.state.raw_text);

        self.bus.emit(
            &EventKind::HtmlChanged,
            &EventPayload::Text(output.result.html.clone()),
        );
        self.bus.emit(
            &EventKind::CatalogChanged,
            &EventPayload::Headings(output.result.headings.clone()),
        );

        output
    }

    /// Apply a finished enhancement; stale completions are dropped.
    pub fn complete_enhancement(
        &mut self,
        job_id: u64,
        generation: u64,
        html: &str,
    ) -> Option<String> {
        let updated = self.pipeline.complete_job(job_id, generation, html)?;
        self.bus
            .emit(&EventKind::HtmlChanged, &EventPayload::Text(updated.clone()));
        Some(updated)
    }

    // ========================================================================
    // Settings & scroll
    // ========================================================================

    pub fn update_setting(&mut self, key: SettingKey, value: bool) -> Settings {
        self.state.settings.update(key, value);
        self.state.settings
    }

    pub fn set_active_pane(&mut self, pane: Pane) {
        self.scroll.set_active(pane);
    }

    pub fn sync_scroll(
        &mut self,
        pane: Pane,
        own: ScrollMetrics,
        other: ScrollMetrics,
    ) -> Option<f64> {
        self.scroll.on_scroll(pane, own, other)
    }
}

/// Build a subscriber forwarding matching payloads into the outbox.
fn outbox_subscriber(
    outbox: &Arc<Mutex<VecDeque<OutboundEvent>>>,
    map: fn(&EventPayload) -> Option<OutboundEvent>,
) -> Subscriber {
    let sink = Arc::clone(outbox);
    Box::new(move |payload| {
        if let Some(event) = map(payload) {
            sink.lock()
                .map_err(|_| EngineError::LockPoisoned)?
                .push_back(event);
        }
        Ok(())
    })
}

/// Forward collaborator events into the host-drained outbox.
fn wire_outbox(bus: &mut EventBus, outbox: &Arc<Mutex<VecDeque<OutboundEvent>>>) {
    bus.on(
        EventKind::SaveRequested,
        outbox_subscriber(outbox, |payload| match payload {
            EventPayload::Text(text) => Some(OutboundEvent::SaveRequested { text: text.clone() }),
            _ => None,
        }),
    );
    bus.on(
        EventKind::HtmlChanged,
        outbox_subscriber(outbox, |payload| match payload {
            EventPayload::Text(html) => Some(OutboundEvent::HtmlChanged { html: html.clone() }),
            _ => None,
        }),
    );
    bus.on(
        EventKind::CatalogChanged,
        outbox_subscriber(outbox, |payload| match payload {
            EventPayload::Headings(headings) => Some(OutboundEvent::CatalogChanged {
                headings: headings.clone(),
            }),
            _ => None,
        }),
    );
    bus.on(
        EventKind::UploadRequested,
        outbox_subscriber(outbox, |payload| match payload {
            EventPayload::FileCount(count) => Some(OutboundEvent::UploadRequested {
                file_count: *count,
            }),
            _ => None,
        }),
    );
}
