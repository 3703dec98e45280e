use std::collections::HashSet;

use anyhow::Result;
use scraper::Html;
use serde_json::{json, Value};

use super::selectors::competitors as sel;
use super::{attr_value, element_text, fields, product_slug, Extractor};
use crate::record::RawRecord;

/// Alternatives (other products' review pages) and head-to-head comparisons.
pub struct CompetitorExtractor;

impl Extractor for CompetitorExtractor {
    fn name(&self) -> &'static str {
        "competitors"
    }

    fn extract(&self, document: &Html, source: &str) -> Result<RawRecord> {
        Ok(fields([
            ("alternatives", Value::Array(alternatives(document, source))),
            ("comparisons", Value::Array(comparisons(document))),
        ]))
    }
}

fn alternatives(document: &Html, source: &str) -> Vec<Value> {
    let own = product_slug(source);
    let mut seen = HashSet::new();

    document
        .select(&sel::ALTERNATIVE)
        .filter_map(|a| {
            let name = element_text(a)?;
            let href = attr_value(a, "href")?;
            let slug = sel::PRODUCT_REVIEWS_RE.captures(&href)?[1].to_string();
            Some((name, href, slug))
        })
        .filter(|(_, _, slug)| own.as_deref() != Some(slug.as_str()))
        .filter(|(_, href, _)| seen.insert(href.clone()))
        .map(|(name, href, _)| {
            json!({
                "competitor_name": name,
                "competitor_link": href,
                "competitor_rating": null,
                "competitor_reviews": null,
            })
        })
        .collect()
}

fn comparisons(document: &Html) -> Vec<Value> {
    document
        .select(&sel::COMPARISON)
        .filter_map(|a| {
            let href = attr_value(a, "href")?;
            Some(json!({
                "link": href,
                "competitor_name": element_text(a),
            }))
        })
        .collect()
}
