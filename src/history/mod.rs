//! Undo/redo history
//!
//! A bounded ring of whole-buffer snapshots with a cursor for redo.
//! Keystroke mutations ride a debounce timer so rapid typing collapses
//! into one entry per pause; directive-applied edits commit immediately.
//!
//! The timeline is linear: committing while the cursor is not at the tail
//! discards the redo entries first. Overflow evicts the oldest entry and
//! moves the cursor down so the current position is preserved.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::models::Selection;
use crate::utils::DebounceTimer;

/// One history snapshot: buffer text plus the selection at commit time
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    pub text: String,
    pub selection_start: usize,
    pub selection_end: usize,
    pub timestamp_ms: f64,
}

impl HistoryEntry {
    pub fn selection(&self) -> Selection {
        Selection::new(self.selection_start, self.selection_end)
    }
}

/// Manages the undo/redo snapshot ring for one editor instance
pub struct History {
    entries: VecDeque<HistoryEntry>,
    /// Index of the entry matching the current buffer
    cursor: usize,
    max_entries: usize,
    quiet_period_ms: f64,
    timer: DebounceTimer,
}

impl History {
    /// Create a history seeded with the mount-time buffer as entry 0, so
    /// the first undo returns to the initial text.
    pub fn new(max_entries: usize, quiet_period_ms: f64, initial_text: &str) -> Self {
        let mut entries = VecDeque::new();
        entries.push_back(HistoryEntry {
            text: initial_text.to_string(),
            selection_start: 0,
            selection_end: 0,
            timestamp_ms: 0.0,
        });

        Self {
            entries,
            cursor: 0,
            max_entries: max_entries.max(1),
            quiet_period_ms,
            timer: DebounceTimer::new(),
        }
    }

    /// A keystroke mutation happened: arm (or re-arm) the commit timer.
    pub fn note_mutation(&mut self, now_ms: f64) {
        self.timer.arm(now_ms, self.quiet_period_ms);
    }

    /// Refresh the selection stored on the current entry. Called right
    /// before a directive applies so undo restores the pre-edit selection
    /// exactly, not the selection as of the last commit.
    pub fn sync_selection(&mut self, selection: Selection) {
        if let Some(entry) = self.entries.get_mut(self.cursor) {
            entry.selection_start = selection.start;
            entry.selection_end = selection.end;
        }
    }

    /// Commit a snapshot now, cancelling any pending debounce.
    ///
    /// A snapshot identical to the current entry's text is skipped, so
    /// no-op edits never grow the timeline.
    pub fn commit(&mut self, text: &str, selection: Selection, timestamp_ms: f64) -> bool {
        self.timer.cancel();

        if self
            .entries
            .get(self.cursor)
            .map(|entry| entry.text == text)
            .unwrap_or(false)
        {
            return false;
        }

        // Linear timeline: drop the redo tail before appending
        self.entries.truncate(self.cursor + 1);
        self.entries.push_back(HistoryEntry {
            text: text.to_string(),
            selection_start: selection.start,
            selection_end: selection.end,
            timestamp_ms,
        });
        self.cursor = self.entries.len() - 1;

        if self.entries.len() > self.max_entries {
            self.entries.pop_front();
            self.cursor = self.cursor.saturating_sub(1);
        }

        true
    }

    /// Commit the pending debounce group if its quiet period has elapsed.
    pub fn commit_if_due(&mut self, now_ms: f64, text: &str, selection: Selection) -> bool {
        match self.timer.fire_if_due(now_ms) {
            Some(armed_at) => self.commit(text, selection, armed_at),
            None => false,
        }
    }

    /// Force any pending debounce group to commit, regardless of time.
    /// Called before undo so the group being typed is not lost.
    pub fn flush_pending(&mut self, text: &str, selection: Selection) {
        if let Some(armed_at) = self.timer.armed_at() {
            self.commit(text, selection, armed_at);
        }
    }

    /// Step one entry back. No-op at the earliest entry.
    pub fn undo(&mut self) -> Option<HistoryEntry> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor).cloned()
    }

    /// Step one entry forward. No-op at the newest entry.
    pub fn redo(&mut self) -> Option<HistoryEntry> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor).cloned()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_pending(&self) -> bool {
        self.timer.is_armed()
    }
}
