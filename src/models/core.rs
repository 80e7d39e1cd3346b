//! Core model types
//!
//! Selection ranges, display settings, and per-instance options. All of
//! these cross the JS boundary and carry serde derives.

use serde::{Deserialize, Serialize};

/// A selection range over the buffer, in character offsets.
///
/// Invariant: `start <= end`. A zero-length selection is a caret.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }

    pub fn caret(pos: usize) -> Self {
        Self { start: pos, end: pos }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Clamp both offsets into `[0, max_chars]`, preserving order.
    pub fn clamped(&self, max_chars: usize) -> Self {
        let start = self.start.min(max_chars);
        let end = self.end.min(max_chars);
        Self::new(start, end)
    }
}

/// One extracted heading, in document order
///
/// `anchor_id` is unique within a single render pass and is what the
/// catalog widget scrolls to.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Heading {
    pub text: String,
    /// Heading level, 1..=6
    pub level: u8,
    pub anchor_id: String,
}

/// Display setting keys the host can toggle
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SettingKey {
    Preview,
    HtmlPreview,
    PageFullscreen,
    Fullscreen,
}

/// Editor display settings
///
/// At most one of `preview` (rendered HTML pane) and `html_preview`
/// (raw HTML source pane) is on; both off means source-only editing.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub preview: bool,
    pub html_preview: bool,
    pub page_fullscreen: bool,
    pub fullscreen: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preview: true,
            html_preview: false,
            page_fullscreen: false,
            fullscreen: false,
        }
    }
}

impl Settings {
    /// Apply one toggle, enforcing the preview exclusion rules.
    ///
    /// Turning `preview` on forces `html_preview` off and vice versa.
    /// Turning either off leaves the other untouched.
    pub fn update(&mut self, key: SettingKey, value: bool) {
        match key {
            SettingKey::Preview => {
                self.preview = value;
                if value && self.html_preview {
                    self.html_preview = false;
                }
            }
            SettingKey::HtmlPreview => {
                self.html_preview = value;
                if value && self.preview {
                    self.preview = false;
                }
            }
            SettingKey::PageFullscreen => self.page_fullscreen = value,
            SettingKey::Fullscreen => self.fullscreen = value,
        }
    }
}

/// Options supplied at instance creation
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorOptions {
    /// Maximum number of history snapshots kept per instance
    pub history_length: usize,

    /// Indent unit width in spaces for tab / shift+tab
    pub tab_width: usize,

    /// Quiet period before a keystroke group commits to history
    pub history_debounce_ms: f64,

    /// Initial buffer contents
    pub initial_text: String,

    /// Show the rendered preview pane initially
    pub preview: bool,

    /// Show the raw HTML pane initially
    pub html_preview: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            history_length: 10,
            tab_width: 2,
            history_debounce_ms: 500.0,
            initial_text: String::new(),
            preview: true,
            html_preview: false,
        }
    }
}

impl EditorOptions {
    /// Initial settings derived from the options. A preview request wins
    /// over an html-preview request, mirroring the exclusion invariant.
    pub fn initial_settings(&self) -> Settings {
        Settings {
            preview: self.preview,
            html_preview: if self.preview { false } else { self.html_preview },
            page_fullscreen: false,
            fullscreen: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_normalizes_order() {
        let sel = Selection::new(7, 3);
        assert_eq!(sel.start, 3);
        assert_eq!(sel.end, 7);
    }

    #[test]
    fn test_selection_clamped_to_bounds() {
        let sel = Selection::new(5, 99).clamped(10);
        assert_eq!(sel, Selection::new(5, 10));

        let sel = Selection::new(50, 99).clamped(10);
        assert_eq!(sel, Selection::new(10, 10));
        assert!(sel.is_empty());
    }

    #[test]
    fn test_preview_excludes_html_preview() {
        let mut settings = Settings {
            preview: false,
            html_preview: true,
            ..Default::default()
        };

        settings.update(SettingKey::Preview, true);
        assert!(settings.preview);
        assert!(!settings.html_preview);
    }

    #[test]
    fn test_html_preview_excludes_preview() {
        let mut settings = Settings::default();
        assert!(settings.preview);

        settings.update(SettingKey::HtmlPreview, true);
        assert!(settings.html_preview);
        assert!(!settings.preview);
    }

    #[test]
    fn test_toggle_off_leaves_other_off() {
        let mut settings = Settings {
            preview: true,
            html_preview: false,
            ..Default::default()
        };

        settings.update(SettingKey::Preview, false);
        assert!(!settings.preview);
        assert!(!settings.html_preview);

        settings.update(SettingKey::HtmlPreview, false);
        assert!(!settings.preview);
        assert!(!settings.html_preview);
    }

    #[test]
    fn test_initial_settings_prefer_preview() {
        let options = EditorOptions {
            preview: true,
            html_preview: true,
            ..Default::default()
        };

        let settings = options.initial_settings();
        assert!(settings.preview);
        assert!(!settings.html_preview);
    }
}
