use std::collections::{HashMap, HashSet};

use anyhow::Result;
use scraper::{ElementRef, Html};
use serde_json::{json, Map, Value};

use super::fallback::{attr_of, Fallback};
use super::selectors::{profile as sel, ANY_LINK, EXTERNAL_LINK};
use super::{attr_value, element_text, fields, meta_or_text, parse_count, parse_decimal, product_slug, Extractor};
use crate::record::{RawRecord, STAR_KEYS};

/// Product name, description, rating, company details and links.
pub struct ProfileExtractor;

impl Extractor for ProfileExtractor {
    fn name(&self) -> &'static str {
        "profile"
    }

    fn extract(&self, document: &Html, source: &str) -> Result<RawRecord> {
        let name = Fallback::texts(&*sel::NAME).resolve(document);
        let what_is = Fallback::texts(&*sel::WHAT_IS).resolve(document);

        let rating = document
            .select(&sel::RATING)
            .next()
            .and_then(meta_or_text)
            .and_then(|t| parse_decimal(&t));

        let reviews = sel::REVIEW_COUNT
            .iter()
            .fold(Fallback::new(), |chain, selector| {
                chain.or(move |doc: &Html| {
                    doc.select(selector)
                        .next()
                        .and_then(meta_or_text)
                        .and_then(|t| parse_count(&t))
                })
            })
            .resolve(document);

        let logo = Fallback::new()
            .or(attr_of(&sel::LOGO_ITEMPROP, "src"))
            .or(|doc: &Html| {
                doc.select(&sel::LOGO_ALT)
                    .find(|img| {
                        img.value()
                            .attr("alt")
                            .is_some_and(|alt| alt.to_lowercase().contains("logo"))
                    })
                    .and_then(|img| attr_value(img, "src"))
            })
            .or(attr_of(&sel::LOGO_CDN, "src"))
            .or(attr_of(&sel::ANY_IMAGE, "src"))
            .resolve(document);

        let links: Vec<String> = document
            .select(&ANY_LINK)
            .filter_map(|a| attr_value(a, "href"))
            .collect();
        let find_link = |pred: &dyn Fn(&str) -> bool| links.iter().find(|h| pred(h.as_str())).cloned();

        let twitter = find_link(&|h: &str| h.contains("twitter.com") || h.contains("//x.com/"));
        let linkedin = find_link(&|h: &str| h.contains("linkedin.com/company"));
        let product_website = find_link(&|h: &str| !h.contains("g2.com") && h.contains("features"))
            .or_else(|| find_link(&|h: &str| !h.contains("g2.com") && h.contains("product")));
        let company_website = document
            .select(&EXTERNAL_LINK)
            .filter_map(|a| attr_value(a, "href"))
            .find(|h| !["g2.com", "twitter.com", "linkedin.com"].iter().any(|d| h.contains(d)));

        let details = seller_details(document);
        let detail = |key: &str| details.get(key).cloned();

        let founded_year = detail("company_founded_year").map(|year| {
            year.trim()
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or(Value::String(year))
        });

        Ok(fields([
            ("product_id", json!(product_slug(source))),
            ("product_name", json!(name)),
            ("product_logo", json!(logo)),
            ("g2_link", json!(source)),
            ("what_is", json!(what_is)),
            ("product_description", json!(what_is)),
            ("positioning_against_competitor", Value::Null),
            ("reviews", json!(reviews)),
            ("rating", json!(rating)),
            ("company_id", Value::Null),
            ("seller", json!(detail("seller").or_else(|| name.clone()))),
            ("company_phone", json!(detail("company_phone"))),
            ("company_location", json!(detail("company_location"))),
            ("company_founded_year", founded_year.unwrap_or(Value::Null)),
            ("company_annual_revenue", json!(detail("company_annual_revenue"))),
            ("company_ownership", json!(detail("company_ownership"))),
            ("discussions_link", json!(first_href(document, &sel::DISCUSSIONS))),
            ("supported_languages", json!(detail("supported_languages"))),
            ("twitter", json!(twitter)),
            (
                "number_of_followers_on_twitter",
                json!(detail("number_of_followers_on_twitter").and_then(|v| parse_count(&v))),
            ),
            ("linkedin", json!(linkedin)),
            (
                "number_of_employees_on_linkedin",
                json!(detail("number_of_employees_on_linkedin").and_then(|v| parse_count(&v))),
            ),
            ("product_website", json!(product_website)),
            ("company_website", json!(company_website)),
            ("is_claimed", claimed(document)),
            ("categories", Value::Array(categories(document))),
            ("screenshots", json!(sources(document, &sel::SCREENSHOT, "src"))),
            ("videos", json!(sources(document, &sel::VIDEO, "src"))),
            ("download_links", json!(sources(document, &sel::DOWNLOAD, "href"))),
            ("pricing_plans", json!([])),
            ("alternatives", json!([])),
            ("comparisons", json!([])),
            ("star_distribution", Value::Object(star_distribution(document))),
            ("g2_reviews_link", json!(format!("{source}#reviews"))),
        ]))
    }
}

/// Category links, deduplicated by case-insensitive name.
fn categories(document: &Html) -> Vec<Value> {
    let mut seen = HashSet::new();
    document
        .select(&sel::CATEGORY_LINK)
        .filter_map(|a| Some((element_text(a)?, attr_value(a, "href")?)))
        .filter(|(label, _)| seen.insert(label.to_lowercase()))
        .map(|(label, href)| json!({"category_name": label, "category_link": href}))
        .collect()
}

/// Counts from rating bars; every star key is zero-filled.
fn star_distribution(document: &Html) -> Map<String, Value> {
    let mut out: Map<String, Value> = STAR_KEYS
        .iter()
        .map(|k| (k.to_string(), Value::from(0)))
        .collect();
    for bar in document.select(&sel::STAR_BAR) {
        let star = bar
            .value()
            .attr("data-star")
            .and_then(|s| s.trim().parse::<u8>().ok());
        let count = bar
            .value()
            .attr("data-count")
            .and_then(|c| c.trim().replace(',', "").parse::<i64>().ok());
        if let (Some(star @ 1..=5), Some(count)) = (star, count) {
            out.insert(star.to_string(), Value::from(count));
        }
    }
    out
}

/// Label/value pairs from the seller panel, keyed by canonical field name.
fn seller_details(document: &Html) -> HashMap<&'static str, String> {
    let mut pairs: Vec<(String, String)> = document
        .select(&sel::DETAIL_TERM)
        .filter_map(|dt| {
            let dd = dt
                .next_siblings()
                .filter_map(ElementRef::wrap)
                .next()
                .filter(|el| el.value().name() == "dd")?;
            Some((element_text(dt)?, element_text(dd)?))
        })
        .collect();

    pairs.extend(document.select(&sel::DETAIL_ROW).filter_map(|row| {
        let label = row.select(&sel::DETAIL_LABEL).next().and_then(element_text)?;
        let value = row.select(&sel::DETAIL_VALUE).next().and_then(element_text)?;
        Some((label, value))
    }));

    let mut out = HashMap::new();
    for (label, value) in pairs {
        if let Some(key) = detail_field(&label) {
            out.entry(key).or_insert(value);
        }
    }
    out
}

fn detail_field(label: &str) -> Option<&'static str> {
    let label = label.replace('®', "").to_lowercase();
    let field = match label.trim().trim_end_matches(':').trim() {
        "seller" | "vendor" => "seller",
        "hq location" | "headquarters" | "location" => "company_location",
        "year founded" | "founded" => "company_founded_year",
        "ownership" => "company_ownership",
        "phone" => "company_phone",
        "revenue" | "annual revenue" | "total revenue (usd mm)" => "company_annual_revenue",
        "languages supported" | "supported languages" | "languages" => "supported_languages",
        "twitter followers" => "number_of_followers_on_twitter",
        "employees on linkedin" | "linkedin page employees" => "number_of_employees_on_linkedin",
        _ => return None,
    };
    Some(field)
}

fn sources(document: &Html, selector: &scraper::Selector, attr: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    document
        .select(selector)
        .filter_map(|el| attr_value(el, attr))
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

fn first_href(document: &Html, selector: &scraper::Selector) -> Option<String> {
    document
        .select(selector)
        .find_map(|a| attr_value(a, "href"))
}

/// `true` when a claimed badge is present; unknown otherwise.
fn claimed(document: &Html) -> Value {
    match document.select(&sel::CLAIMED_BADGE).next() {
        Some(_) => Value::Bool(true),
        None => Value::Null,
    }
}
