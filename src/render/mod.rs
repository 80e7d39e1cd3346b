//! Render Pipeline
//!
//! Converts the raw markdown buffer into sanitized HTML plus a heading
//! catalog, with pluggable block renderers enhanced asynchronously in a
//! second phase. The markdown-to-HTML transform and the sanitizer are
//! injected collaborators; defaults are a CommonMark transform and the
//! identity sanitizer.

pub mod headings;
pub mod pipeline;
pub mod sanitize;
pub mod transform;

pub use headings::{default_anchor_id, slugify, AnchorIdFn, HeadingCollector};
pub use pipeline::{
    BlockRenderer, CodeHighlightRenderer, EnhancementJob, RenderOutput, RenderPipeline,
    RenderResult,
};
pub use sanitize::{IdentitySanitizer, Sanitizer};
pub use transform::{CommonMarkTransform, MarkdownTransform, TransformSink};
