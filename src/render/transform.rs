//! Markdown-to-HTML transform seam
//!
//! The pipeline consumes a [`MarkdownTransform`] implementation; the
//! built-in default walks pulldown-cmark events so headings and fenced
//! code blocks can be routed through the pipeline's sink (anchor id
//! assignment, enhancement-job placement) while everything else renders
//! through the stock HTML writer.

use pulldown_cmark::{html, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::errors::TransformError;

/// Pipeline-side hooks the transform reports into while rendering
pub trait TransformSink {
    /// A heading was encountered; returns the anchor id to embed.
    fn heading(&mut self, level: u8, text: &str) -> String;

    /// A fenced/indented code block was encountered; returns the HTML to
    /// emit for it (plain block or enhancement placeholder).
    fn code_block(&mut self, lang: &str, source: &str) -> String;
}

/// Converts raw markup text to HTML, reporting structure to the sink
pub trait MarkdownTransform: Send {
    fn transform(&self, src: &str, sink: &mut dyn TransformSink)
        -> Result<String, TransformError>;
}

/// Default transform: CommonMark plus tables/strikethrough/task lists
pub struct CommonMarkTransform {
    options: Options,
}

impl Default for CommonMarkTransform {
    fn default() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        Self { options }
    }
}

impl CommonMarkTransform {
    pub fn new() -> Self {
        Self::default()
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    level as u8
}

impl MarkdownTransform for CommonMarkTransform {
    fn transform(
        &self,
        src: &str,
        sink: &mut dyn TransformSink,
    ) -> Result<String, TransformError> {
        fn flush<'a>(pending: &mut Vec<Event<'a>>, out: &mut String) {
            if !pending.is_empty() {
                html::push_html(out, pending.drain(..));
            }
        }

        let mut out = String::with_capacity(src.len() * 2);
        let mut pending: Vec<Event> = Vec::new();
        let mut parser = Parser::new_ext(src, self.options);

        while let Some(event) = parser.next() {
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    flush(&mut pending, &mut out);

                    // Capture the heading's inline content so the anchor
                    // id can be derived from its plain text
                    let mut inner: Vec<Event> = Vec::new();
                    let mut text = String::new();
                    for inner_event in parser.by_ref() {
                        match inner_event {
                            Event::End(TagEnd::Heading(_)) => break,
                            Event::Text(ref chunk) => {
                                text.push_str(chunk);
                                inner.push(inner_event);
                            }
                            Event::Code(ref chunk) => {
                                text.push_str(chunk);
                                inner.push(inner_event);
                            }
                            other => inner.push(other),
                        }
                    }

                    let level = heading_level(level);
                    let anchor_id = sink.heading(level, text.trim());
                    let mut inner_html = String::new();
                    html::push_html(&mut inner_html, inner.into_iter());

                    out.push_str(&format!(
                        "<h{} id=\"{}\">{}</h{}>\n",
                        level, anchor_id, inner_html, level
                    ));
                }
                Event::Start(Tag::CodeBlock(kind)) => {
                    flush(&mut pending, &mut out);

                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .unwrap_or("")
                            .to_string(),
                        CodeBlockKind::Indented => String::new(),
                    };

                    let mut source = String::new();
                    for inner_event in parser.by_ref() {
                        match inner_event {
                            Event::End(TagEnd::CodeBlock) => break,
                            Event::Text(chunk) => source.push_str(&chunk),
                            _ => {}
                        }
                    }

                    out.push_str(&sink.code_block(&lang, &source));
                }
                other => pending.push(other),
            }
        }

        flush(&mut pending, &mut out);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::escape_html;

    /// Minimal sink: slugless anchors, plain code blocks
    struct PlainSink {
        headings: Vec<(u8, String)>,
    }

    impl PlainSink {
        fn new() -> Self {
            Self { headings: Vec::new() }
        }
    }

    impl TransformSink for PlainSink {
        fn heading(&mut self, level: u8, text: &str) -> String {
            self.headings.push((level, text.to_string()));
            format!("anchor-{}", self.headings.len())
        }

        fn code_block(&mut self, lang: &str, source: &str) -> String {
            format!(
                "<pre><code class=\"language-{}\">{}</code></pre>\n",
                lang,
                escape_html(source)
            )
        }
    }

    #[test]
    fn test_paragraph_and_emphasis_render() {
        let transform = CommonMarkTransform::new();
        let mut sink = PlainSink::new();
        let html = transform.transform("some **bold** text", &mut sink).unwrap();

        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_headings_report_level_and_text() {
        let transform = CommonMarkTransform::new();
        let mut sink = PlainSink::new();
        let html = transform
            .transform("# One\n\ncontent\n\n### Three\n\n## Two", &mut sink)
            .unwrap();

        assert_eq!(
            sink.headings,
            vec![
                (1, "One".to_string()),
                (3, "Three".to_string()),
                (2, "Two".to_string())
            ]
        );
        assert!(html.contains("<h1 id=\"anchor-1\">One</h1>"));
        assert!(html.contains("<h3 id=\"anchor-2\">Three</h3>"));
    }

    #[test]
    fn test_heading_with_inline_markup_keeps_plain_text_for_anchor() {
        let transform = CommonMarkTransform::new();
        let mut sink = PlainSink::new();
        let html = transform.transform("## A `code` title", &mut sink).unwrap();

        assert_eq!(sink.headings, vec![(2, "A code title".to_string())]);
        assert!(html.contains("<code>code</code>"));
    }

    #[test]
    fn test_fenced_code_block_routes_through_sink() {
        let transform = CommonMarkTransform::new();
        let mut sink = PlainSink::new();
        let html = transform
            .transform("```rust\nlet x = 1;\n```", &mut sink)
            .unwrap();

        assert!(html.contains("class=\"language-rust\""));
        assert!(html.contains("let x = 1;"));
    }

    #[test]
    fn test_code_block_source_is_escaped_by_sink() {
        let transform = CommonMarkTransform::new();
        let mut sink = PlainSink::new();
        let html = transform
            .transform("```html\n<b>raw</b>\n```", &mut sink)
            .unwrap();

        assert!(html.contains("&lt;b&gt;raw&lt;/b&gt;"));
        assert!(!html.contains("<b>raw</b>"));
    }

    #[test]
    fn test_strikethrough_extension_enabled() {
        let transform = CommonMarkTransform::new();
        let mut sink = PlainSink::new();
        let html = transform.transform("~~gone~~", &mut sink).unwrap();

        assert!(html.contains("<del>gone</del>"));
    }
}
