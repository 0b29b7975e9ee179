//! Projection of sparse category weights onto a fixed vocabulary.

use catalog_client::{CatalogProduct, CategoryWeights};
use tracing::trace;

use crate::record::ProductRecord;
use crate::vocabulary::Vocabulary;

/// Public product page base; the barcode is appended verbatim.
pub const DEFAULT_PUBLIC_PRODUCT_URL: &str = "https://world.openfoodfacts.org/product/";

/// Builds the dense record for one product.
///
/// Returns `None` when `code`, `name` or `weights` is missing or empty; such
/// products are never indexed. `vector[i]` is `weights[vocabulary[i]]`, or 0
/// when the key is absent, not a number, or outside the `f32` range. Weights
/// are not normalized.
pub fn vectorize(
    code: Option<&str>,
    name: Option<&str>,
    image_front_url: Option<&str>,
    weights: Option<&CategoryWeights>,
    vocabulary: &Vocabulary,
    public_url_base: &str,
) -> Option<ProductRecord> {
    let code = non_blank(code)?;
    let name = non_blank(name)?;
    let weights = weights.filter(|w| !w.is_empty())?;

    let vector = vocabulary
        .iter()
        .map(|key| match weights.get(key) {
            None => 0.0,
            Some(value) => match value.as_f64().map(|w| w as f32) {
                Some(w) if w.is_finite() => w,
                _ => {
                    trace!("vectorize: code={code} key={key} unusable weight {value}");
                    0.0
                }
            },
        })
        .collect();

    Some(ProductRecord {
        code: code.to_string(),
        name: name.to_string(),
        image_front_url: non_blank(image_front_url).map(str::to_string),
        url: format!("{public_url_base}{code}"),
        vector,
    })
}

/// [`vectorize`] over a raw catalog product.
pub fn vectorize_product(
    product: &CatalogProduct,
    vocabulary: &Vocabulary,
    public_url_base: &str,
) -> Option<ProductRecord> {
    vectorize(
        product.code.as_deref(),
        product.product_name.as_deref(),
        product.image_front_url.as_deref(),
        product.category_weights(),
        vocabulary,
        public_url_base,
    )
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn vocab(keys: &[&str]) -> Vocabulary {
        Vocabulary::from_keys(keys.iter().map(|k| k.to_string()).collect()).unwrap()
    }

    fn weights(v: Value) -> CategoryWeights {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn absent_keys_default_to_zero() {
        let w = weights(json!({ "en:a": 2 }));
        let rec = vectorize(
            Some("1"),
            Some("Widget"),
            None,
            Some(&w),
            &vocab(&["en:a", "en:b"]),
            DEFAULT_PUBLIC_PRODUCT_URL,
        )
        .unwrap();

        assert_eq!(rec.vector, vec![2.0, 0.0]);
        assert_eq!(rec.url, "https://world.openfoodfacts.org/product/1");
        assert!(rec.image_front_url.is_none());
    }

    #[test]
    fn vector_follows_vocabulary_order() {
        let w = weights(json!({ "en:c": 3.5, "en:a": 1.25, "en:zzz": 9 }));
        let v = vocab(&["en:a", "en:b", "en:c"]);
        let rec = vectorize(Some("7"), Some("n"), Some("img"), Some(&w), &v, "base/").unwrap();

        assert_eq!(rec.vector.len(), v.len());
        assert_eq!(rec.vector, vec![1.25, 0.0, 3.5]);
        assert_eq!(rec.image_front_url.as_deref(), Some("img"));
        assert_eq!(rec.url, "base/7");
    }

    #[test]
    fn non_numeric_weights_count_as_absent() {
        let w = weights(json!({ "en:a": "lots", "en:b": null, "en:c": 4 }));
        let rec = vectorize(
            Some("1"),
            Some("n"),
            None,
            Some(&w),
            &vocab(&["en:a", "en:b", "en:c"]),
            "",
        )
        .unwrap();
        assert_eq!(rec.vector, vec![0.0, 0.0, 4.0]);
    }

    #[test]
    fn weights_beyond_f32_count_as_absent() {
        let w = weights(json!({ "en:a": 1e300, "en:b": -1e300, "en:c": 0.5 }));
        let rec = vectorize(
            Some("1"),
            Some("n"),
            None,
            Some(&w),
            &vocab(&["en:a", "en:b", "en:c"]),
            "",
        )
        .unwrap();
        assert_eq!(rec.vector, vec![0.0, 0.0, 0.5]);
    }

    #[test]
    fn mandatory_fields() {
        let w = weights(json!({ "en:a": 1 }));
        let empty = CategoryWeights::new();
        let v = vocab(&["en:a"]);

        assert!(vectorize(None, Some("n"), None, Some(&w), &v, "").is_none());
        assert!(vectorize(Some(""), Some("n"), None, Some(&w), &v, "").is_none());
        assert!(vectorize(Some("3"), Some(""), None, Some(&w), &v, "").is_none());
        assert!(vectorize(Some("3"), Some("  "), None, Some(&w), &v, "").is_none());
        assert!(vectorize(Some("3"), None, None, Some(&w), &v, "").is_none());
        assert!(vectorize(Some("3"), Some("n"), None, None, &v, "").is_none());
        assert!(vectorize(Some("3"), Some("n"), None, Some(&empty), &v, "").is_none());
    }

    #[test]
    fn empty_image_is_dropped() {
        let w = weights(json!({ "en:a": 1 }));
        let rec = vectorize(Some("1"), Some("n"), Some(""), Some(&w), &vocab(&["en:a"]), "")
            .unwrap();
        assert!(rec.image_front_url.is_none());
    }

    #[test]
    fn product_wrapper_reads_nested_weights() {
        let product: CatalogProduct = serde_json::from_value(json!({
            "code": "5",
            "product_name": "Soup",
            "image_front_url": "https://img/5.jpg",
            "ecoscore_extended_data": { "impact": { "likeliest_recipe": { "en:b": 0.5 } } }
        }))
        .unwrap();

        let rec = vectorize_product(&product, &vocab(&["en:a", "en:b"]), "u/").unwrap();
        assert_eq!(rec.code, "5");
        assert_eq!(rec.vector, vec![0.0, 0.5]);
    }
}
