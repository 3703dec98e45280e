use serde::Serialize;
use serde_json::{Map, Value};

/// Untyped merge of extractor output. Anything can be in here.
pub type RawRecord = Map<String, Value>;

/// Canonical key set, in output order.
pub const CANONICAL_FIELDS: [&str; 35] = [
    "product_id",
    "product_name",
    "product_logo",
    "g2_link",
    "what_is",
    "product_description",
    "positioning_against_competitor",
    "reviews",
    "rating",
    "company_id",
    "seller",
    "company_phone",
    "company_location",
    "company_founded_year",
    "company_annual_revenue",
    "company_ownership",
    "discussions_link",
    "supported_languages",
    "twitter",
    "number_of_followers_on_twitter",
    "linkedin",
    "number_of_employees_on_linkedin",
    "product_website",
    "company_website",
    "is_claimed",
    "categories",
    "screenshots",
    "videos",
    "download_links",
    "pricing_plans",
    "alternatives",
    "comparisons",
    "star_distribution",
    "g2_reviews_link",
    "initial_reviews",
];

/// Keys that always hold a JSON array after normalization.
pub const SEQUENCE_FIELDS: [&str; 8] = [
    "categories",
    "screenshots",
    "videos",
    "download_links",
    "pricing_plans",
    "alternatives",
    "comparisons",
    "initial_reviews",
];

pub const STAR_KEYS: [&str; 5] = ["1", "2", "3", "4", "5"];

/// Fixed-shape product record produced by the normalizer.
///
/// Only `normalize::normalize` builds these, so every canonical key is
/// present and in `CANONICAL_FIELDS` order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProductRecord(Map<String, Value>);

impl ProductRecord {
    pub(crate) fn from_canonical(fields: Map<String, Value>) -> Self {
        let record = Self(fields);
        debug_assert!(record.keys().eq(CANONICAL_FIELDS));
        record
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}
