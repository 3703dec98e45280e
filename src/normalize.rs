use serde_json::{json, Map, Value};

use crate::record::{ProductRecord, RawRecord, CANONICAL_FIELDS, SEQUENCE_FIELDS, STAR_KEYS};

/// Force a raw record into the canonical shape. Total: never fails, bad
/// values fall back to `null`, `0` or an empty/wrapped array.
pub fn normalize(mut raw: RawRecord) -> ProductRecord {
    let mut fields = Map::with_capacity(CANONICAL_FIELDS.len());

    for key in CANONICAL_FIELDS {
        let value = raw.remove(key).unwrap_or(Value::Null);
        let value = match key {
            "reviews" => try_parse_int(&value).map_or(Value::Null, Value::from),
            "rating" => try_parse_float(&value).map_or(Value::Null, Value::from),
            "star_distribution" => star_distribution(&value),
            "categories" => Value::Array(categories(as_sequence(value))),
            k if SEQUENCE_FIELDS.contains(&k) => Value::Array(as_sequence(value)),
            _ => value,
        };
        fields.insert(key.to_string(), value);
    }

    ProductRecord::from_canonical(fields)
}

/// Direct integer coercion. Numeric strings are accepted as-is; thousands
/// separators are not stripped here.
pub fn try_parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

pub fn try_parse_float(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

fn as_sequence(value: Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        other => vec![other],
    }
}

fn star_distribution(raw: &Value) -> Value {
    let counts = raw.as_object();
    let out: Map<String, Value> = STAR_KEYS
        .iter()
        .map(|key| {
            let count = counts
                .and_then(|m| m.get(*key))
                .and_then(try_parse_int)
                .unwrap_or(0);
            (key.to_string(), Value::from(count))
        })
        .collect();
    Value::Object(out)
}

fn categories(entries: Vec<Value>) -> Vec<Value> {
    entries
        .into_iter()
        .filter_map(|entry| match entry {
            Value::Object(mut m) => Some(json!({
                "category_name": m.remove("category_name").unwrap_or(Value::Null),
                "category_link": m.remove("category_link").unwrap_or(Value::Null),
            })),
            _ => None,
        })
        .collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn raw(value: Value) -> RawRecord {
        match value {
            Value::Object(m) => m,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn empty_record_gets_every_key() {
        let rec = normalize(RawRecord::new());
        assert!(rec.keys().eq(CANONICAL_FIELDS));
        assert_eq!(rec.get("product_name"), Some(&Value::Null));
        assert_eq!(rec.get("reviews"), Some(&Value::Null));
        for key in SEQUENCE_FIELDS {
            assert_eq!(rec.get(key), Some(&json!([])), "{key}");
        }
        assert_eq!(
            rec.get("star_distribution"),
            Some(&json!({"1": 0, "2": 0, "3": 0, "4": 0, "5": 0}))
        );
    }

    #[test]
    fn key_order_is_fixed() {
        let rec = normalize(raw(json!({
            "initial_reviews": [],
            "product_id": "acme",
            "rating": 4.0,
        })));
        let out = serde_json::to_string(&rec).unwrap();
        let id_at = out.find("\"product_id\"").unwrap();
        let rating_at = out.find("\"rating\"").unwrap();
        let reviews_at = out.find("\"initial_reviews\"").unwrap();
        assert!(id_at < rating_at && rating_at < reviews_at);
    }

    #[test]
    fn unknown_keys_dropped() {
        let rec = normalize(raw(json!({"product_name": "Acme", "tracking_pixel": "x"})));
        assert!(rec.get("tracking_pixel").is_none());
        assert_eq!(rec.get("product_name"), Some(&json!("Acme")));
    }

    #[test]
    fn numeric_strings_coerced() {
        let rec = normalize(raw(json!({
            "product_name": "Acme Widget",
            "rating": "4.7",
            "reviews": " 1234 ",
        })));
        assert_eq!(rec.get("rating"), Some(&json!(4.7)));
        assert_eq!(rec.get("reviews"), Some(&json!(1234)));
    }

    #[test]
    fn thousands_separator_is_not_stripped() {
        let rec = normalize(raw(json!({"reviews": "1,234"})));
        assert_eq!(rec.get("reviews"), Some(&Value::Null));
    }

    #[test]
    fn bad_rating_becomes_null() {
        let rec = normalize(raw(json!({"rating": "five stars"})));
        assert_eq!(rec.get("rating"), Some(&Value::Null));
        let rec = normalize(raw(json!({"rating": {"value": 4}})));
        assert_eq!(rec.get("rating"), Some(&Value::Null));
    }

    #[test]
    fn int_coercion_edges() {
        assert_eq!(try_parse_int(&json!(12)), Some(12));
        assert_eq!(try_parse_int(&json!(12.9)), Some(12));
        assert_eq!(try_parse_int(&json!(-3.5)), Some(-3));
        assert_eq!(try_parse_int(&json!("+7")), Some(7));
        assert_eq!(try_parse_int(&json!("4.7")), None);
        assert_eq!(try_parse_int(&json!(true)), Some(1));
        assert_eq!(try_parse_int(&json!([1])), None);
        assert_eq!(try_parse_int(&Value::Null), None);
    }

    #[test]
    fn float_coercion_rejects_non_finite() {
        assert_eq!(try_parse_float(&json!("inf")), None);
        assert_eq!(try_parse_float(&json!("NaN")), None);
        assert_eq!(try_parse_float(&json!(" 3.25 ")), Some(3.25));
        assert_eq!(try_parse_float(&json!(5)), Some(5.0));
    }

    #[test]
    fn categories_reduced_to_two_fields() {
        let rec = normalize(raw(json!({
            "categories": [
                {
                    "category_name": "Widget Tools",
                    "category_link": "https://x/categories/widget-tools",
                    "rank": 3
                },
                "stray string",
                42
            ]
        })));
        assert_eq!(
            rec.get("categories"),
            Some(&json!([{
                "category_name": "Widget Tools",
                "category_link": "https://x/categories/widget-tools"
            }]))
        );
    }

    #[test]
    fn category_missing_fields_become_null() {
        let rec = normalize(raw(json!({"categories": {"category_name": "Solo"}})));
        assert_eq!(
            rec.get("categories"),
            Some(&json!([{"category_name": "Solo", "category_link": null}]))
        );
    }

    #[test]
    fn bare_mapping_wrapped_into_list() {
        let contoso = json!({
            "competitor_name": "Contoso",
            "competitor_link": "https://x/products/contoso/reviews"
        });
        let rec = normalize(raw(json!({"alternatives": contoso.clone()})));
        assert_eq!(rec.get("alternatives"), Some(&json!([contoso])));
    }

    #[test]
    fn bare_scalar_wrapped_into_list() {
        let rec = normalize(raw(json!({"screenshots": "https://x/shot.png", "videos": 0})));
        assert_eq!(rec.get("screenshots"), Some(&json!(["https://x/shot.png"])));
        assert_eq!(rec.get("videos"), Some(&json!([0])));
    }

    #[test]
    fn star_distribution_defaults_and_drops_extras() {
        let rec = normalize(raw(json!({
            "star_distribution": {"5": "120", "4": 30, "3": "lots", "2": null, "0": 9}
        })));
        assert_eq!(
            rec.get("star_distribution"),
            Some(&json!({"1": 0, "2": 0, "3": 0, "4": 30, "5": 120}))
        );
    }

    #[test]
    fn star_distribution_non_mapping_is_zeroed() {
        let rec = normalize(raw(json!({"star_distribution": [5, 4, 3]})));
        assert_eq!(
            rec.get("star_distribution"),
            Some(&json!({"1": 0, "2": 0, "3": 0, "4": 0, "5": 0}))
        );
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            (-1.0e9f64..1.0e9).prop_map(Value::from),
            "-?[0-9]{1,6}(\\.[0-9]{1,3})?".prop_map(Value::from),
            "[ -~]{0,12}".prop_map(Value::from),
        ];
        leaf.prop_recursive(3, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::from),
                prop::collection::vec(("[a-z0-9_]{1,8}", inner), 0..6)
                    .prop_map(|pairs| Value::Object(pairs.into_iter().collect())),
            ]
        })
    }

    fn arb_raw() -> impl Strategy<Value = RawRecord> {
        let key = prop_oneof![
            prop::sample::select(CANONICAL_FIELDS.to_vec()).prop_map(String::from),
            "[a-z_]{1,10}",
        ];
        prop::collection::vec((key, arb_json()), 0..24)
            .prop_map(|pairs| pairs.into_iter().collect())
    }

    proptest! {
        #[test]
        fn always_canonical_shape(r in arb_raw()) {
            let rec = normalize(r);
            prop_assert!(rec.keys().eq(CANONICAL_FIELDS));

            let reviews = rec.get("reviews").unwrap();
            prop_assert!(reviews.is_null() || reviews.is_i64());
            let rating = rec.get("rating").unwrap();
            prop_assert!(rating.is_null() || rating.is_f64());

            for key in SEQUENCE_FIELDS {
                prop_assert!(rec.get(key).unwrap().is_array(), "{} not an array", key);
            }
        }

        #[test]
        fn star_distribution_complete(r in arb_raw()) {
            let rec = normalize(r);
            let sd = rec.get("star_distribution").unwrap().as_object().unwrap();
            prop_assert!(sd.keys().map(String::as_str).eq(STAR_KEYS));
            prop_assert!(sd.values().all(Value::is_i64));
        }

        #[test]
        fn categories_are_two_field_objects(r in arb_raw()) {
            let rec = normalize(r);
            for c in rec.get("categories").unwrap().as_array().unwrap() {
                let m = c.as_object().unwrap();
                prop_assert!(m.keys().map(String::as_str).eq(["category_name", "category_link"]));
            }
        }

        #[test]
        fn idempotent(r in arb_raw()) {
            let once = normalize(r);
            let again: RawRecord = serde_json::from_value(once.to_value()).unwrap();
            let twice = normalize(again);
            prop_assert_eq!(once, twice);
        }
    }
}
