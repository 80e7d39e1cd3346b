//! Heading catalog extraction
//!
//! Every heading the transform encounters is recorded in document order
//! with an anchor id for the catalog widget. Anchor derivation is
//! caller-overridable; the default slugs the heading text and suffixes a
//! seen-count so duplicate headings stay distinct within one render pass.

use std::collections::HashMap;

use crate::models::Heading;

/// Anchor id derivation: (heading text, prior occurrences of it) -> id
pub type AnchorIdFn = Box<dyn Fn(&str, usize) -> String + Send>;

/// Lowercased, dash-separated slug of a heading text.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut last_dash = true;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Default anchor derivation: slug, with `-N` appended for duplicates.
pub fn default_anchor_id(text: &str, seen: usize) -> String {
    let slug = slugify(text);
    if seen == 0 {
        slug
    } else {
        format!("{}-{}", slug, seen)
    }
}

/// Accumulates headings for one render pass
pub struct HeadingCollector<'a> {
    headings: Vec<Heading>,
    seen: HashMap<String, usize>,
    anchor_fn: &'a AnchorIdFn,
}

impl<'a> HeadingCollector<'a> {
    pub fn new(anchor_fn: &'a AnchorIdFn) -> Self {
        Self {
            headings: Vec::new(),
            seen: HashMap::new(),
            anchor_fn,
        }
    }

    /// Record a heading and hand back its anchor id.
    pub fn record(&mut self, level: u8, text: &str) -> String {
        let seen = self.seen.entry(text.to_string()).or_insert(0);
        let anchor_id = (self.anchor_fn)(text, *seen);
        *seen += 1;

        self.headings.push(Heading {
            text: text.to_string(),
            level,
            anchor_id: anchor_id.clone(),
        });
        anchor_id
    }

    pub fn into_headings(self) -> Vec<Heading> {
        self.headings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_fn() -> AnchorIdFn {
        Box::new(default_anchor_id)
    }

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  spaced   out  "), "spaced-out");
        assert_eq!(slugify("C'est l'été"), "c-est-l-été");
    }

    #[test]
    fn test_duplicate_headings_get_distinct_anchors() {
        let anchor_fn = default_fn();
        let mut collector = HeadingCollector::new(&anchor_fn);

        let first = collector.record(2, "Setup");
        let second = collector.record(2, "Setup");
        let third = collector.record(3, "Setup");

        assert_eq!(first, "setup");
        assert_eq!(second, "setup-1");
        assert_eq!(third, "setup-2");
    }

    #[test]
    fn test_document_order_preserved() {
        let anchor_fn = default_fn();
        let mut collector = HeadingCollector::new(&anchor_fn);

        collector.record(1, "One");
        collector.record(3, "Three");
        collector.record(2, "Two");

        let headings = collector.into_headings();
        let levels: Vec<u8> = headings.iter().map(|h| h.level).collect();
        assert_eq!(levels, vec![1, 3, 2]);
    }

    #[test]
    fn test_custom_anchor_generator() {
        let anchor_fn: AnchorIdFn = Box::new(|text, seen| format!("x-{}-{}", text.len(), seen));
        let mut collector = HeadingCollector::new(&anchor_fn);

        assert_eq!(collector.record(1, "ab"), "x-2-0");
        assert_eq!(collector.record(1, "ab"), "x-2-1");
    }
}
