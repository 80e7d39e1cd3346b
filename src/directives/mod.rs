//! Directive definitions
//!
//! A directive is a named text-transform command (bold, heading, list,
//! insert-image, ...) applied to the current selection. Directives are
//! stateless: applying one is a pure mapping from (buffer, selection,
//! directive) to (new buffer, new selection), implemented in [`engine`].
//!
//! Directive names follow the host-facing toolbar/shortcut vocabulary
//! ("bold", "h3", "codeRow", "shiftTab", ...). Unknown names parse to
//! [`Directive::Passthrough`], which never touches the buffer.

pub mod engine;

use serde::{Deserialize, Serialize};

pub use engine::{apply, DirectiveOutcome};

/// Payload for directives that carry host-supplied data (link, image)
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct DirectivePayload {
    pub desc: String,
    pub url: String,
}

/// The supported text-transform commands
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Directive {
    Bold,
    Italic,
    Underline,
    StrikeThrough,
    /// Heading level 1..=6
    Heading(u8),
    Quote,
    UnorderedList,
    OrderedList,
    /// Inline code span
    CodeRow,
    /// Fenced code block
    Code,
    Sub,
    Sup,
    Link { desc: String, url: String },
    Image { desc: String, url: String },
    Table,
    /// Tab: one indent unit
    Indent,
    /// Shift+Tab: remove one indent unit
    Outdent,
    Copy,
    Cut,
    /// Unknown or host-custom name; never mutates the buffer
    Passthrough(String),
}

impl Directive {
    /// Resolve a host-facing directive name, with an optional payload for
    /// the link/image directives. Unknown names become `Passthrough`.
    pub fn from_name(name: &str, payload: Option<&DirectivePayload>) -> Self {
        if let Some(level) = name
            .strip_prefix('h')
            .and_then(|rest| rest.parse::<u8>().ok())
            .filter(|level| (1..=6).contains(level))
        {
            return Directive::Heading(level);
        }

        let payload = payload.cloned().unwrap_or_default();
        match name {
            "bold" => Directive::Bold,
            "italic" => Directive::Italic,
            "underline" => Directive::Underline,
            "strikeThrough" => Directive::StrikeThrough,
            "quote" => Directive::Quote,
            "unorderedList" => Directive::UnorderedList,
            "orderedList" => Directive::OrderedList,
            "codeRow" => Directive::CodeRow,
            "code" => Directive::Code,
            "sub" => Directive::Sub,
            "sup" => Directive::Sup,
            "link" => Directive::Link {
                desc: payload.desc,
                url: payload.url,
            },
            "image" => Directive::Image {
                desc: payload.desc,
                url: payload.url,
            },
            "table" => Directive::Table,
            "tab" => Directive::Indent,
            "shiftTab" => Directive::Outdent,
            "ctrlC" => Directive::Copy,
            "ctrlX" => Directive::Cut,
            other => Directive::Passthrough(other.to_string()),
        }
    }

    /// Whether applying this directive is a discrete user action that
    /// commits to history immediately (as opposed to a keystroke that
    /// rides the debounce timer).
    pub fn commits_immediately(&self) -> bool {
        !matches!(self, Directive::Copy | Directive::Passthrough(_))
    }
}

/// Configuration the engine needs beyond the directive itself
#[derive(Clone, Copy, Debug)]
pub struct DirectiveConfig {
    /// Indent unit width in spaces (tab / shift+tab / nested lists)
    pub tab_width: usize,
}

impl Default for DirectiveConfig {
    fn default() -> Self {
        Self { tab_width: 2 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_names_resolve_to_levels() {
        assert_eq!(Directive::from_name("h1", None), Directive::Heading(1));
        assert_eq!(Directive::from_name("h6", None), Directive::Heading(6));
        // h0/h7 are not headings
        assert_eq!(
            Directive::from_name("h7", None),
            Directive::Passthrough("h7".to_string())
        );
    }

    #[test]
    fn test_unknown_name_is_passthrough() {
        let directive = Directive::from_name("prettier", None);
        assert_eq!(directive, Directive::Passthrough("prettier".to_string()));
        assert!(!directive.commits_immediately());
    }

    #[test]
    fn test_payload_feeds_link_and_image() {
        let payload = DirectivePayload {
            desc: "alt".into(),
            url: "a.png".into(),
        };
        assert_eq!(
            Directive::from_name("image", Some(&payload)),
            Directive::Image {
                desc: "alt".into(),
                url: "a.png".into()
            }
        );
    }

    #[test]
    fn test_copy_does_not_commit() {
        assert!(!Directive::from_name("ctrlC", None).commits_immediately());
        assert!(Directive::from_name("ctrlX", None).commits_immediately());
        assert!(Directive::from_name("bold", None).commits_immediately());
    }
}
