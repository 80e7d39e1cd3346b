//! Keyboard shortcut table
//!
//! Maps key combinations to directive names or editor actions. The table
//! is injectable configuration: hosts can replace any binding without
//! touching core logic. The default table mirrors the stock editor
//! shortcuts (ctrl+b bold, ctrl+1..6 headings, ctrl+z undo, ...).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A normalized key combination
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct KeyCombo {
    /// Key value: lowercase letter/digit, or "Tab", "ArrowUp", "ArrowDown"
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
}

impl KeyCombo {
    pub fn new(key: &str, ctrl: bool, shift: bool, alt: bool) -> Self {
        let key = if key.chars().count() == 1 {
            key.to_lowercase()
        } else {
            key.to_string()
        };
        Self { key, ctrl, shift, alt }
    }

    fn ctrl(key: &str) -> Self {
        Self::new(key, true, false, false)
    }

    fn ctrl_shift(key: &str) -> Self {
        Self::new(key, true, true, false)
    }

    fn ctrl_alt(key: &str) -> Self {
        Self::new(key, true, false, true)
    }

    fn plain(key: &str) -> Self {
        Self::new(key, false, false, false)
    }

    fn shift(key: &str) -> Self {
        Self::new(key, false, true, false)
    }
}

/// What a resolved shortcut does
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// Apply the named directive to the buffer
    Directive(String),
    Undo,
    Redo,
    Save,
}

impl KeyAction {
    /// Action names accepted from host remap entries: "undo", "redo",
    /// "save", or any directive name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "undo" => KeyAction::Undo,
            "redo" => KeyAction::Redo,
            "save" => KeyAction::Save,
            directive => KeyAction::Directive(directive.to_string()),
        }
    }
}

/// One host-supplied remap entry
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct KeymapEntry {
    #[serde(flatten)]
    pub combo: KeyCombo,
    pub action: String,
}

/// Injectable shortcut table
pub struct Keymap {
    bindings: HashMap<KeyCombo, KeyAction>,
}

impl Default for Keymap {
    fn default() -> Self {
        let mut bindings = HashMap::new();

        let directives: &[(KeyCombo, &str)] = &[
            (KeyCombo::ctrl("b"), "bold"),
            (KeyCombo::ctrl("i"), "italic"),
            (KeyCombo::ctrl("u"), "underline"),
            (KeyCombo::ctrl_shift("u"), "unorderedList"),
            (KeyCombo::ctrl_shift("s"), "strikeThrough"),
            (KeyCombo::ctrl("1"), "h1"),
            (KeyCombo::ctrl("2"), "h2"),
            (KeyCombo::ctrl("3"), "h3"),
            (KeyCombo::ctrl("4"), "h4"),
            (KeyCombo::ctrl("5"), "h5"),
            (KeyCombo::ctrl("6"), "h6"),
            (KeyCombo::ctrl("ArrowUp"), "sup"),
            (KeyCombo::ctrl("ArrowDown"), "sub"),
            (KeyCombo::ctrl("q"), "quote"),
            (KeyCombo::ctrl("o"), "orderedList"),
            (KeyCombo::ctrl_shift("c"), "code"),
            (KeyCombo::ctrl_alt("c"), "codeRow"),
            (KeyCombo::ctrl("c"), "ctrlC"),
            (KeyCombo::ctrl("x"), "ctrlX"),
            (KeyCombo::new("t", true, true, true), "table"),
            (KeyCombo::plain("Tab"), "tab"),
            (KeyCombo::shift("Tab"), "shiftTab"),
        ];
        for (combo, name) in directives {
            bindings.insert(combo.clone(), KeyAction::Directive((*name).to_string()));
        }

        bindings.insert(KeyCombo::ctrl("z"), KeyAction::Undo);
        bindings.insert(KeyCombo::ctrl_shift("z"), KeyAction::Redo);
        bindings.insert(KeyCombo::ctrl("s"), KeyAction::Save);

        Self { bindings }
    }
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self, combo: &KeyCombo) -> Option<&KeyAction> {
        self.bindings.get(combo)
    }

    /// Rebind one combination; replaces any existing binding.
    pub fn rebind(&mut self, combo: KeyCombo, action: KeyAction) {
        self.bindings.insert(combo, action);
    }

    /// Replace the whole table with host-supplied entries.
    pub fn replace(&mut self, entries: Vec<KeymapEntry>) {
        self.bindings.clear();
        for entry in entries {
            self.bindings
                .insert(entry.combo, KeyAction::from_name(&entry.action));
        }
    }
}
