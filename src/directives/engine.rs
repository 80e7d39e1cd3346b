//! Directive application engine
//!
//! Pure transforms from (buffer, selection, directive) to the replacement
//! buffer and the new selection. Selection offsets are character offsets;
//! all byte arithmetic stays inside this module.
//!
//! Cursor policy: when the incoming selection is empty the cursor lands
//! immediately after the inserted content (between the markers for
//! wrapping directives); when it is non-empty the new selection spans the
//! full replacement. Line-wise directives always leave the transformed
//! line block selected.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::directives::{Directive, DirectiveConfig};
use crate::models::Selection;

static UNORDERED_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([ \t]*)[-*+][ \t]+").unwrap());
static ORDERED_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([ \t]*)\d+\.[ \t]+").unwrap());
static ANY_LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([ \t]*)(?:[-*+]|\d+\.)[ \t]+").unwrap());
static QUOTE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([ \t]*)>[ \t]?").unwrap());

/// Markup skeleton inserted by the table directive
const TABLE_SKELETON: &str = "\n| column | column |\n| - | - |\n| content | content |\n";

/// Result of applying a directive
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectiveOutcome {
    pub new_buffer: String,
    pub new_selection: Selection,
    /// Text for the host clipboard (copy/cut only)
    pub clipboard: Option<String>,
}

impl DirectiveOutcome {
    fn unchanged(buffer: &str, selection: Selection) -> Self {
        Self {
            new_buffer: buffer.to_string(),
            new_selection: selection,
            clipboard: None,
        }
    }
}

/// Apply `directive` to `buffer` at `selection`.
///
/// Out-of-bounds selections are clamped to the buffer, unknown directives
/// are a no-op; this function never fails.
pub fn apply(
    buffer: &str,
    selection: Selection,
    directive: &Directive,
    config: &DirectiveConfig,
) -> DirectiveOutcome {
    let selection = selection.clamped(buffer.chars().count());

    match directive {
        Directive::Bold => wrap(buffer, selection, "**", "**"),
        Directive::Italic => wrap(buffer, selection, "*", "*"),
        Directive::StrikeThrough => wrap(buffer, selection, "~", "~"),
        Directive::Underline => wrap(buffer, selection, "<u>", "</u>"),
        Directive::Sub => wrap(buffer, selection, "<sub>", "</sub>"),
        Directive::Sup => wrap(buffer, selection, "<sup>", "</sup>"),
        Directive::CodeRow => wrap(buffer, selection, "`", "`"),
        Directive::Heading(level) => {
            let marker = format!("{} ", "#".repeat(usize::from(*level)));
            wrap(buffer, selection, &marker, "")
        }
        Directive::Code => code_block(buffer, selection),
        Directive::Link { desc, url } => {
            insert_at(buffer, selection, &format!("[{}]({})", desc, url))
        }
        Directive::Image { desc, url } => {
            insert_at(buffer, selection, &format!("![{}]({})", desc, url))
        }
        Directive::Table => insert_at(buffer, selection, TABLE_SKELETON),
        Directive::Quote => toggle_line_marker(buffer, selection, &QUOTE_MARKER, &|_| "> ".to_string()),
        Directive::UnorderedList => {
            toggle_line_marker(buffer, selection, &UNORDERED_MARKER, &|_| "- ".to_string())
        }
        Directive::OrderedList => {
            toggle_line_marker(buffer, selection, &ORDERED_MARKER, &|n| format!("{}. ", n + 1))
        }
        Directive::Indent => {
            if selection.is_empty() {
                insert_at(buffer, selection, &" ".repeat(config.tab_width))
            } else {
                indent_lines(buffer, selection, config.tab_width)
            }
        }
        Directive::Outdent => outdent_lines(buffer, selection, config.tab_width),
        Directive::Copy => DirectiveOutcome {
            new_buffer: buffer.to_string(),
            new_selection: selection,
            clipboard: Some(selected_text(buffer, selection).to_string()),
        },
        Directive::Cut => cut(buffer, selection),
        Directive::Passthrough(_) => DirectiveOutcome::unchanged(buffer, selection),
    }
}

// ============================================================================
// Offset helpers
// ============================================================================

fn byte_of_char(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

fn char_count(text: &str) -> usize {
    text.chars().count()
}

fn selected_text(buffer: &str, selection: Selection) -> &str {
    let start = byte_of_char(buffer, selection.start);
    let end = byte_of_char(buffer, selection.end);
    &buffer[start..end]
}

fn splice(buffer: &str, selection: Selection, replacement: &str) -> String {
    let start = byte_of_char(buffer, selection.start);
    let end = byte_of_char(buffer, selection.end);
    let mut out = String::with_capacity(buffer.len() + replacement.len());
    out.push_str(&buffer[..start]);
    out.push_str(replacement);
    out.push_str(&buffer[end..]);
    out
}

// ============================================================================
// Selection-local transforms
// ============================================================================

fn wrap(buffer: &str, selection: Selection, prefix: &str, suffix: &str) -> DirectiveOutcome {
    let selected = selected_text(buffer, selection);
    let replacement = format!("{}{}{}", prefix, selected, suffix);
    let new_selection = if selection.is_empty() {
        Selection::caret(selection.start + char_count(prefix))
    } else {
        Selection::new(selection.start, selection.start + char_count(&replacement))
    };

    DirectiveOutcome {
        new_buffer: splice(buffer, selection, &replacement),
        new_selection,
        clipboard: None,
    }
}

fn insert_at(buffer: &str, selection: Selection, text: &str) -> DirectiveOutcome {
    DirectiveOutcome {
        new_buffer: splice(buffer, selection, text),
        new_selection: Selection::caret(selection.start + char_count(text)),
        clipboard: None,
    }
}

fn code_block(buffer: &str, selection: Selection) -> DirectiveOutcome {
    let selected = selected_text(buffer, selection);
    let replacement = format!("```\n{}\n```\n", selected);
    let new_selection = if selection.is_empty() {
        // Cursor on the language slot, right after the opening fence
        Selection::caret(selection.start + 3)
    } else {
        Selection::new(selection.start, selection.start + char_count(&replacement))
    };

    DirectiveOutcome {
        new_buffer: splice(buffer, selection, &replacement),
        new_selection,
        clipboard: None,
    }
}

fn cut(buffer: &str, selection: Selection) -> DirectiveOutcome {
    let clipboard = selected_text(buffer, selection).to_string();
    DirectiveOutcome {
        new_buffer: splice(buffer, selection, ""),
        new_selection: Selection::caret(selection.start),
        clipboard: Some(clipboard),
    }
}

// ============================================================================
// Line-wise transforms
// ============================================================================

/// Run `transform` over every line the selection touches (the cursor's
/// line for an empty selection) and leave the transformed block selected.
fn transform_line_block(
    buffer: &str,
    selection: Selection,
    transform: impl FnOnce(&[&str]) -> Vec<String>,
) -> DirectiveOutcome {
    let sel_start = byte_of_char(buffer, selection.start);
    let sel_end = byte_of_char(buffer, selection.end);

    let block_start = buffer[..sel_start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let block_end = buffer[sel_end..]
        .find('\n')
        .map(|i| sel_end + i)
        .unwrap_or(buffer.len());

    let lines: Vec<&str> = buffer[block_start..block_end].split('\n').collect();
    let new_block = transform(&lines).join("\n");

    let mut new_buffer = String::with_capacity(buffer.len() + new_block.len());
    new_buffer.push_str(&buffer[..block_start]);
    new_buffer.push_str(&new_block);
    new_buffer.push_str(&buffer[block_end..]);

    let block_start_chars = char_count(&buffer[..block_start]);
    DirectiveOutcome {
        new_buffer,
        new_selection: Selection::new(block_start_chars, block_start_chars + char_count(&new_block)),
        clipboard: None,
    }
}

/// Toggle a per-line marker family over the selection span.
///
/// If every non-blank line already carries this family's marker, the
/// markers are stripped (toggle-off). Otherwise each non-blank line gets
/// the marker, after stripping any other list-family marker so mixed
/// selections normalize to the requested family. Ordered markers are
/// renumbered from 1 within the span.
fn toggle_line_marker(
    buffer: &str,
    selection: Selection,
    family: &Regex,
    marker_for: &dyn Fn(usize) -> String,
) -> DirectiveOutcome {
    transform_line_block(buffer, selection, |lines| {
        let non_blank: Vec<&&str> = lines.iter().filter(|l| !l.trim().is_empty()).collect();
        let all_marked = !non_blank.is_empty() && non_blank.iter().all(|l| family.is_match(l));

        if all_marked {
            lines
                .iter()
                .map(|line| family.replace(line, "$1").into_owned())
                .collect()
        } else {
            let mut marked = 0usize;
            lines
                .iter()
                .map(|line| {
                    if line.trim().is_empty() {
                        return line.to_string();
                    }
                    let stripped = strip_any_marker(line);
                    let prefixed = format!("{}{}", marker_for(marked), stripped);
                    marked += 1;
                    prefixed
                })
                .collect()
        }
    })
}

fn strip_any_marker(line: &str) -> String {
    let without_list = ANY_LIST_MARKER.replace(line, "$1");
    QUOTE_MARKER.replace(&without_list, "$1").into_owned()
}

fn indent_lines(buffer: &str, selection: Selection, tab_width: usize) -> DirectiveOutcome {
    let unit = " ".repeat(tab_width);
    transform_line_block(buffer, selection, |lines| {
        lines
            .iter()
            .map(|line| {
                if line.is_empty() {
                    String::new()
                } else {
                    format!("{}{}", unit, line)
                }
            })
            .collect()
    })
}

fn outdent_lines(buffer: &str, selection: Selection, tab_width: usize) -> DirectiveOutcome {
    transform_line_block(buffer, selection, |lines| {
        lines
            .iter()
            .map(|line| {
                if let Some(rest) = line.strip_prefix('\t') {
                    return rest.to_string();
                }
                let leading_spaces = line.len() - line.trim_start_matches(' ').len();
                line[leading_spaces.min(tab_width)..].to_string()
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directives::DirectiveConfig;

    fn apply_named(buffer: &str, start: usize, end: usize, name: &str) -> DirectiveOutcome {
        apply(
            buffer,
            Selection::new(start, end),
            &Directive::from_name(name, None),
            &DirectiveConfig::default(),
        )
    }

    #[test]
    fn test_bold_wraps_selection() {
        let outcome = apply_named("hello world", 0, 5, "bold");
        assert_eq!(outcome.new_buffer, "**hello** world");
        assert_eq!(outcome.new_selection, Selection::new(0, 9));
    }

    #[test]
    fn test_empty_selection_places_cursor_between_markers() {
        let outcome = apply_named("hello", 5, 5, "bold");
        assert_eq!(outcome.new_buffer, "hello****");
        assert_eq!(outcome.new_selection, Selection::caret(7));
    }

    #[test]
    fn test_underline_uses_html_tags() {
        let outcome = apply_named("abc", 0, 3, "underline");
        assert_eq!(outcome.new_buffer, "<u>abc</u>");
        assert_eq!(outcome.new_selection, Selection::new(0, 10));
    }

    #[test]
    fn test_heading_prefixes_hash_markers() {
        let outcome = apply_named("title", 0, 5, "h3");
        assert_eq!(outcome.new_buffer, "### title");
        assert_eq!(outcome.new_selection, Selection::new(0, 9));
    }

    #[test]
    fn test_heading_on_empty_selection_places_cursor_after_marker() {
        let outcome = apply_named("", 0, 0, "h1");
        assert_eq!(outcome.new_buffer, "# ");
        assert_eq!(outcome.new_selection, Selection::caret(2));
    }

    #[test]
    fn test_code_block_cursor_lands_on_language_slot() {
        let outcome = apply_named("", 0, 0, "code");
        assert_eq!(outcome.new_buffer, "```\n\n```\n");
        assert_eq!(outcome.new_selection, Selection::caret(3));
    }

    #[test]
    fn test_inline_code_wraps_with_backticks() {
        let outcome = apply_named("let x", 0, 5, "codeRow");
        assert_eq!(outcome.new_buffer, "`let x`");
    }

    #[test]
    fn test_link_inserts_markup_and_advances_cursor() {
        let payload = crate::directives::DirectivePayload {
            desc: "docs".into(),
            url: "https://example.com".into(),
        };
        let outcome = apply(
            "see ",
            Selection::caret(4),
            &Directive::from_name("link", Some(&payload)),
            &DirectiveConfig::default(),
        );
        assert_eq!(outcome.new_buffer, "see [docs](https://example.com)");
        assert_eq!(outcome.new_selection, Selection::caret(31));
    }

    #[test]
    fn test_image_insert_replaces_selection() {
        let payload = crate::directives::DirectivePayload {
            desc: String::new(),
            url: "a.png".into(),
        };
        let outcome = apply(
            "old",
            Selection::new(0, 3),
            &Directive::from_name("image", Some(&payload)),
            &DirectiveConfig::default(),
        );
        assert_eq!(outcome.new_buffer, "![](a.png)");
    }

    #[test]
    fn test_quote_prefixes_every_selected_line() {
        let buffer = "one\ntwo\nthree";
        let outcome = apply_named(buffer, 0, 13, "quote");
        assert_eq!(outcome.new_buffer, "> one\n> two\n> three");
        assert_eq!(outcome.new_selection, Selection::new(0, 19));
    }

    #[test]
    fn test_quote_toggles_off_when_all_lines_quoted() {
        let buffer = "> one\n> two";
        let outcome = apply_named(buffer, 0, 11, "quote");
        assert_eq!(outcome.new_buffer, "one\ntwo");
    }

    #[test]
    fn test_unordered_list_skips_blank_lines() {
        let buffer = "one\n\ntwo";
        let outcome = apply_named(buffer, 0, 8, "unorderedList");
        assert_eq!(outcome.new_buffer, "- one\n\n- two");
    }

    #[test]
    fn test_ordered_list_renumbers_from_one() {
        let buffer = "b\nc\nd";
        let outcome = apply_named(buffer, 0, 5, "orderedList");
        assert_eq!(outcome.new_buffer, "1. b\n2. c\n3. d");
    }

    #[test]
    fn test_mixed_markers_normalize_to_requested_family() {
        let buffer = "- one\n2. two\nthree";
        let outcome = apply_named(buffer, 0, 18, "orderedList");
        assert_eq!(outcome.new_buffer, "1. one\n2. two\n3. three");
    }

    #[test]
    fn test_zero_length_selection_operates_on_cursor_line() {
        let buffer = "first\nsecond\nthird";
        // Cursor inside "second"
        let outcome = apply_named(buffer, 8, 8, "unorderedList");
        assert_eq!(outcome.new_buffer, "first\n- second\nthird");
        // The transformed line ends up selected
        assert_eq!(outcome.new_selection, Selection::new(6, 14));
    }

    #[test]
    fn test_indent_with_selection_prefixes_all_lines() {
        let buffer = "a\nb";
        let outcome = apply_named(buffer, 0, 3, "tab");
        assert_eq!(outcome.new_buffer, "  a\n  b");
    }

    #[test]
    fn test_indent_with_empty_selection_inserts_at_cursor() {
        let outcome = apply_named("ab", 1, 1, "tab");
        assert_eq!(outcome.new_buffer, "a  b");
        assert_eq!(outcome.new_selection, Selection::caret(3));
    }

    #[test]
    fn test_outdent_strips_one_indent_unit() {
        let buffer = "    deep\n  shallow\nflat";
        let outcome = apply_named(buffer, 0, 23, "shiftTab");
        assert_eq!(outcome.new_buffer, "  deep\nshallow\nflat");
    }

    #[test]
    fn test_outdent_strips_leading_tab() {
        let outcome = apply_named("\tx", 0, 2, "shiftTab");
        assert_eq!(outcome.new_buffer, "x");
    }

    #[test]
    fn test_copy_returns_clipboard_without_mutation() {
        let outcome = apply_named("hello world", 0, 5, "ctrlC");
        assert_eq!(outcome.new_buffer, "hello world");
        assert_eq!(outcome.clipboard.as_deref(), Some("hello"));
        assert_eq!(outcome.new_selection, Selection::new(0, 5));
    }

    #[test]
    fn test_cut_removes_selection_and_returns_clipboard() {
        let outcome = apply_named("hello world", 0, 6, "ctrlX");
        assert_eq!(outcome.new_buffer, "world");
        assert_eq!(outcome.clipboard.as_deref(), Some("hello "));
        assert_eq!(outcome.new_selection, Selection::caret(0));
    }

    #[test]
    fn test_unknown_directive_is_noop() {
        let outcome = apply_named("text", 0, 4, "nonsense");
        assert_eq!(outcome.new_buffer, "text");
        assert_eq!(outcome.new_selection, Selection::new(0, 4));
        assert!(outcome.clipboard.is_none());
    }

    #[test]
    fn test_out_of_bounds_selection_is_clamped() {
        let outcome = apply_named("abc", 1, 999, "bold");
        assert_eq!(outcome.new_buffer, "a**bc**");
    }

    #[test]
    fn test_wrap_handles_multibyte_text() {
        let outcome = apply_named("héllo wörld", 6, 11, "bold");
        assert_eq!(outcome.new_buffer, "héllo **wörld**");
        assert_eq!(outcome.new_selection, Selection::new(6, 15));
    }
}
