//! Editor state management
//!
//! This module contains the EditorState struct which represents the
//! complete mutable state of one editor instance: the raw text buffer,
//! the selection, and the display settings.
//!
//! This is the WASM-owned source of truth. The host textarea mirrors it,
//! never the other way around.

use serde::{Deserialize, Serialize};

use crate::models::{Selection, Settings};

/// Complete per-instance editor state (WASM-owned source of truth)
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EditorState {
    /// The raw markdown buffer
    pub raw_text: String,

    /// Current selection, in character offsets
    pub selection: Selection,

    /// Display settings (preview panes, fullscreen flags)
    pub settings: Settings,
}

impl EditorState {
    /// Create a new editor state with initial text and settings
    pub fn new(raw_text: String, settings: Settings) -> Self {
        Self {
            raw_text,
            selection: Selection::default(),
            settings,
        }
    }

    /// Number of characters in the buffer (selection offsets count chars,
    /// not bytes)
    pub fn char_len(&self) -> usize {
        self.raw_text.chars().count()
    }

    /// Get the current selection
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Set the selection, clamping it into the buffer bounds.
    ///
    /// Out-of-bounds offsets arrive after external text replacement; the
    /// contract is to clamp, never to fail.
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection.clamped(self.char_len());
    }

    /// Replace the buffer and selection together, clamping the selection
    /// against the new text.
    pub fn replace(&mut self, raw_text: String, selection: Selection) {
        self.raw_text = raw_text;
        self.selection = selection.clamped(self.char_len());
    }

    /// The selected text, by character offsets
    pub fn selected_text(&self) -> String {
        self.raw_text
            .chars()
            .skip(self.selection.start)
            .take(self.selection.len())
            .collect()
    }
}
