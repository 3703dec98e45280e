pub mod competitors;
pub mod fallback;
pub mod pricing;
pub mod profile;
pub mod reviews;
mod selectors;

use anyhow::{Context, Result};
use scraper::{ElementRef, Html};
use serde_json::Value;

use crate::record::RawRecord;

pub const INITIAL_REVIEWS: &str = "initial_reviews";

/// One extraction concern (profile, pricing, ...). Implementations return
/// `null`/empty defaults for missing markup instead of failing.
pub trait Extractor {
    fn name(&self) -> &'static str;
    fn extract(&self, document: &Html, source: &str) -> Result<RawRecord>;
}

/// Runs the extractors over one document and merges their fragments.
pub struct RecordAssembler {
    fragments: Vec<Box<dyn Extractor>>,
    reviews: Box<dyn Extractor>,
}

impl RecordAssembler {
    /// `fragments` merge in order, later ones win on key collision; the
    /// review extractor's `initial_reviews` list is assigned last.
    pub fn new(fragments: Vec<Box<dyn Extractor>>, reviews: Box<dyn Extractor>) -> Self {
        Self { fragments, reviews }
    }

    pub fn assemble(&self, document: &Html, source: &str) -> Result<RawRecord> {
        let mut fragments = Vec::with_capacity(self.fragments.len());
        for extractor in &self.fragments {
            fragments.push(run(extractor.as_ref(), document, source)?);
        }
        let reviews = run(self.reviews.as_ref(), document, source)?;
        Ok(merge(fragments, reviews))
    }

    pub fn assemble_html(&self, html: &str, source: &str) -> Result<RawRecord> {
        let document = Html::parse_document(html);
        self.assemble(&document, source)
    }
}

impl Default for RecordAssembler {
    /// profile → competitors → pricing, then reviews.
    fn default() -> Self {
        Self::new(
            vec![
                Box::new(profile::ProfileExtractor),
                Box::new(competitors::CompetitorExtractor),
                Box::new(pricing::PricingExtractor),
            ],
            Box::new(reviews::ReviewExtractor),
        )
    }
}

fn run(extractor: &dyn Extractor, document: &Html, source: &str) -> Result<RawRecord> {
    extractor
        .extract(document, source)
        .with_context(|| format!("{} extractor failed", extractor.name()))
}

/// Shallow last-writer-wins merge; `initial_reviews` comes only from the
/// review fragment and defaults to `[]`.
pub fn merge(fragments: impl IntoIterator<Item = RawRecord>, mut reviews: RawRecord) -> RawRecord {
    let mut record = RawRecord::new();
    for fragment in fragments {
        record.extend(fragment);
    }
    let initial = reviews
        .remove(INITIAL_REVIEWS)
        .unwrap_or_else(|| Value::Array(Vec::new()));
    record.insert(INITIAL_REVIEWS.to_string(), initial);
    record
}

pub(crate) fn fields<const N: usize>(pairs: [(&str, Value); N]) -> RawRecord {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Whitespace-collapsed text content, `None` when empty.
pub(crate) fn element_text(el: ElementRef<'_>) -> Option<String> {
    let text = el
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then_some(text)
}

pub(crate) fn attr_value(el: ElementRef<'_>, name: &str) -> Option<String> {
    el.value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// `content` for `<meta>`, text otherwise.
pub(crate) fn meta_or_text(el: ElementRef<'_>) -> Option<String> {
    if el.value().name() == "meta" {
        attr_value(el, "content")
    } else {
        element_text(el)
    }
}

/// Integer with thousands separators stripped: "1,234 reviews" → 1234.
pub(crate) fn parse_count(text: &str) -> Option<i64> {
    selectors::COUNT_RE
        .find(text)
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
}

pub(crate) fn parse_decimal(text: &str) -> Option<f64> {
    selectors::DECIMAL_RE
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
}

pub(crate) fn product_slug(url: &str) -> Option<String> {
    selectors::PRODUCT_SLUG_RE
        .captures(url)
        .map(|caps| caps[1].to_string())
}

// ── Tests ──
