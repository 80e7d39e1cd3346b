//! Two-phase render pipeline
//!
//! Phase one is synchronous: the injected transform produces HTML with
//! every claimed block emitted as a tagged placeholder, plus the heading
//! catalog. Phase two happens when the host's asset (syntax highlighter,
//! diagram renderer) finishes loading: the enhanced HTML for one job is
//! spliced over its placeholder. A render generation counter guards
//! against stale completions — a job from a superseded render is dropped.
//!
//! Transform failure never leaves a stale or blank preview: the raw text
//! is escaped into a `<pre>` fallback.

use serde::{Deserialize, Serialize};

use crate::models::Heading;
use crate::render::headings::{default_anchor_id, AnchorIdFn, HeadingCollector};
use crate::render::sanitize::{IdentitySanitizer, Sanitizer};
use crate::render::transform::{CommonMarkTransform, MarkdownTransform, TransformSink};
use crate::utils::escape_html;

/// Claims fenced blocks for asynchronous enhancement
pub trait BlockRenderer: Send {
    fn name(&self) -> &str;

    /// Whether this renderer wants the block with the given language tag.
    fn claims(&self, lang: &str) -> bool;
}

/// Claims every code block for external syntax highlighting
pub struct CodeHighlightRenderer;

impl BlockRenderer for CodeHighlightRenderer {
    fn name(&self) -> &str {
        "highlight"
    }

    fn claims(&self, _lang: &str) -> bool {
        true
    }
}

/// The synchronous product of one render pass
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenderResult {
    pub html: String,
    pub headings: Vec<Heading>,
}

/// One pending phase-two enhancement
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnhancementJob {
    pub id: u64,
    /// Render generation the job belongs to; completions from older
    /// generations are dropped
    pub generation: u64,
    pub renderer: String,
    pub lang: String,
    pub source: String,
}

/// First-pass result plus the jobs awaiting completion
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenderOutput {
    #[serde(flatten)]
    pub result: RenderResult,
    pub jobs: Vec<EnhancementJob>,
}

fn job_open_marker(id: u64) -> String {
    format!("<!--md-job:{}-->", id)
}

fn job_close_marker(id: u64) -> String {
    format!("<!--/md-job:{}-->", id)
}

fn plain_code_html(lang: &str, source: &str) -> String {
    if lang.is_empty() {
        format!("<pre><code>{}</code></pre>\n", escape_html(source))
    } else {
        format!(
            "<pre><code class=\"language-{}\">{}</code></pre>\n",
            lang,
            escape_html(source)
        )
    }
}

fn placeholder_html(id: u64, lang: &str, source: &str) -> String {
    let class_attr = if lang.is_empty() {
        String::new()
    } else {
        format!(" class=\"language-{}\"", lang)
    };
    format!(
        "{}<pre class=\"md-block-pending\" data-md-job=\"{}\"><code{}>{}</code></pre>\n{}",
        job_open_marker(id),
        id,
        class_attr,
        escape_html(source),
        job_close_marker(id)
    )
}

/// Sink wiring one render pass: anchor assignment + job placement
struct PassSink<'a> {
    collector: HeadingCollector<'a>,
    renderers: &'a [Box<dyn BlockRenderer>],
    jobs: Vec<EnhancementJob>,
    next_job_id: &'a mut u64,
    generation: u64,
}

impl TransformSink for PassSink<'_> {
    fn heading(&mut self, level: u8, text: &str) -> String {
        self.collector.record(level, text)
    }

    fn code_block(&mut self, lang: &str, source: &str) -> String {
        let claimed = self.renderers.iter().find(|r| r.claims(lang));
        match claimed {
            Some(renderer) => {
                let id = *self.next_job_id;
                *self.next_job_id += 1;
                self.jobs.push(EnhancementJob {
                    id,
                    generation: self.generation,
                    renderer: renderer.name().to_string(),
                    lang: lang.to_string(),
                    source: source.to_string(),
                });
                placeholder_html(id, lang, source)
            }
            None => plain_code_html(lang, source),
        }
    }
}

/// Recomputes the full RenderResult on every committed buffer change
pub struct RenderPipeline {
    transform: Box<dyn MarkdownTransform>,
    sanitizer: Box<dyn Sanitizer>,
    anchor_fn: AnchorIdFn,
    renderers: Vec<Box<dyn BlockRenderer>>,
    generation: u64,
    next_job_id: u64,
    last_html: String,
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self {
            transform: Box::new(CommonMarkTransform::new()),
            sanitizer: Box::new(IdentitySanitizer),
            anchor_fn: Box::new(default_anchor_id),
            renderers: vec![Box::new(CodeHighlightRenderer)],
            generation: 0,
            next_job_id: 1,
            last_html: String::new(),
        }
    }
}

impl RenderPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_transform(&mut self, transform: Box<dyn MarkdownTransform>) {
        self.transform = transform;
    }

    pub fn set_sanitizer(&mut self, sanitizer: Box<dyn Sanitizer>) {
        self.sanitizer = sanitizer;
    }

    pub fn set_anchor_fn(&mut self, anchor_fn: AnchorIdFn) {
        self.anchor_fn = anchor_fn;
    }

    pub fn register_block_renderer(&mut self, renderer: Box<dyn BlockRenderer>) {
        self.renderers.push(renderer);
    }

    pub fn clear_block_renderers(&mut self) {
        self.renderers.clear();
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn last_html(&self) -> &str {
        &self.last_html
    }

    /// Phase one: full recompute of HTML + headings + pending jobs.
    pub fn render(&mut self, src: &str) -> RenderOutput {
        self.generation += 1;

        let mut job_counter = self.next_job_id;
        let mut sink = PassSink {
            collector: HeadingCollector::new(&self.anchor_fn),
            renderers: &self.renderers,
            jobs: Vec::new(),
            next_job_id: &mut job_counter,
            generation: self.generation,
        };

        let (html, headings, jobs) = match self.transform.transform(src, &mut sink) {
            Ok(html) => {
                let headings = sink.collector.into_headings();
                (html, headings, sink.jobs)
            }
            Err(err) => {
                log::warn!("markdown transform failed, falling back to escaped raw: {}", err);
                let fallback = format!("<pre>{}</pre>\n", escape_html(src));
                (fallback, Vec::new(), Vec::new())
            }
        };
        self.next_job_id = job_counter;

        let sanitized = self.sanitizer.sanitize(&html);
        self.last_html = sanitized.clone();

        RenderOutput {
            result: RenderResult {
                html: sanitized,
                headings,
            },
            jobs,
        }
    }

    /// Phase two: splice one job's enhanced HTML over its placeholder.
    ///
    /// Returns the updated full document HTML, or None when the job is
    /// stale (older generation, unknown id) and was dropped.
    pub fn complete_job(&mut self, job_id: u64, generation: u64, html: &str) -> Option<String> {
        if generation != self.generation {
            log::debug!(
                "dropping stale enhancement job {} (generation {} != {})",
                job_id,
                generation,
                self.generation
            );
            return None;
        }

        let open = job_open_marker(job_id);
        let close = job_close_marker(job_id);
        let start = self.last_html.find(&open)?;
        let end = self.last_html[start..].find(&close).map(|i| start + i + close.len())?;

        let mut updated = String::with_capacity(self.last_html.len() + html.len());
        updated.push_str(&self.last_html[..start]);
        updated.push_str(&self.sanitizer.sanitize(html));
        updated.push_str(&self.last_html[end..]);

        self.last_html = updated.clone();
        Some(updated)
    }
}
