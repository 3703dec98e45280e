use anyhow::Result;
use scraper::{ElementRef, Html};
use serde_json::{json, Value};

use super::selectors::reviews as sel;
use super::{attr_value, element_text, fields, Extractor, INITIAL_REVIEWS};
use crate::record::RawRecord;

const MAX_REVIEWS: usize = 25;

/// Small sample of the reviews rendered on the product page.
pub struct ReviewExtractor;

impl Extractor for ReviewExtractor {
    fn name(&self) -> &'static str {
        "reviews"
    }

    fn extract(&self, document: &Html, source: &str) -> Result<RawRecord> {
        let blocks: Vec<ElementRef> = sel::BLOCK
            .iter()
            .map(|selector| document.select(selector).collect::<Vec<_>>())
            .find(|found| !found.is_empty())
            .unwrap_or_default();

        let reviews: Vec<Value> = blocks
            .into_iter()
            .take(MAX_REVIEWS)
            .enumerate()
            .map(|(i, block)| review(block, i + 1, source))
            .collect();

        Ok(fields([(INITIAL_REVIEWS, Value::Array(reviews))]))
    }
}

fn review(block: ElementRef<'_>, position: usize, source: &str) -> Value {
    let title = block
        .select(&sel::TITLE)
        .next()
        .and_then(element_text)
        .unwrap_or_else(|| format!("Review #{position}"));
    let rating = block
        .select(&sel::RATING)
        .next()
        .and_then(|el| attr_value(el, "data-rating"))
        .and_then(|r| r.parse::<f64>().ok());
    let published = block
        .select(&sel::DATE)
        .next()
        .and_then(|el| attr_value(el, "datetime"));
    let link = block
        .select(&sel::LINK)
        .next()
        .and_then(|a| attr_value(a, "href"));
    let review_id = link
        .as_deref()
        .and_then(|l| sel::REVIEW_ID_RE.captures(l))
        .and_then(|caps| caps[1].parse::<i64>().ok());

    json!({
        "review_id": review_id,
        "review_title": title,
        "review_rating": rating,
        "publish_date": published,
        "review_link": link.as_deref().unwrap_or(source),
    })
}
