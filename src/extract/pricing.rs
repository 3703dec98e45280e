use anyhow::Result;
use scraper::{ElementRef, Html};
use serde_json::{json, Value};

use super::selectors::pricing as sel;
use super::{element_text, fields, Extractor};
use crate::record::RawRecord;

const MAX_FEATURES: usize = 25;

/// Pricing plan cards: name, description and feature bullets.
pub struct PricingExtractor;

impl Extractor for PricingExtractor {
    fn name(&self) -> &'static str {
        "pricing"
    }

    fn extract(&self, document: &Html, _source: &str) -> Result<RawRecord> {
        let mut cards: Vec<ElementRef> = document.select(&sel::PLAN_CARD).collect();
        if cards.is_empty() {
            cards = document.select(&sel::PLAN_SECTION).collect();
        }

        let plans: Vec<Value> = cards.into_iter().filter_map(plan).collect();
        Ok(fields([("pricing_plans", Value::Array(plans))]))
    }
}

/// `None` when the card has no name, description or features.
fn plan(card: ElementRef<'_>) -> Option<Value> {
    let name = card.select(&sel::PLAN_NAME).next().and_then(element_text);
    let description = card
        .select(&sel::PLAN_DESCRIPTION)
        .next()
        .and_then(element_text);
    let features: Vec<String> = card
        .select(&sel::PLAN_FEATURE)
        .filter_map(element_text)
        .take(MAX_FEATURES)
        .collect();

    if name.is_none() && description.is_none() && features.is_empty() {
        return None;
    }
    Some(json!({
        "plan_name": name,
        "plan_description": description,
        "plan_features": features,
    }))
}
