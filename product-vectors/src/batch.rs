//! Batch preparation: vectorize every product once, first occurrence wins.

use std::collections::HashSet;

use catalog_client::CatalogProduct;
use tracing::{debug, info, trace};

use crate::record::ProductRecord;
use crate::vectorizer::vectorize_product;
use crate::vocabulary::Vocabulary;

/// Vectorizes `items` in input order.
///
/// Products rejected by [`vectorize_product`] are skipped, as are later
/// duplicates of a code already accepted. Output order is acceptance order.
pub fn prepare_batch(
    items: &[CatalogProduct],
    vocabulary: &Vocabulary,
    public_url_base: &str,
) -> Vec<ProductRecord> {
    let mut seen: HashSet<String> = HashSet::with_capacity(items.len());
    let mut out = Vec::with_capacity(items.len());
    let mut incomplete = 0usize;
    let mut duplicates = 0usize;

    for item in items {
        let Some(record) = vectorize_product(item, vocabulary, public_url_base) else {
            incomplete += 1;
            continue;
        };
        if !seen.insert(record.code.clone()) {
            trace!("prepare_batch: duplicate code={} skipped", record.code);
            duplicates += 1;
            continue;
        }
        out.push(record);
    }

    debug!("prepare_batch: skipped incomplete={incomplete} duplicates={duplicates}");
    info!("prepare_batch: {} products extracted", out.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn product(code: &str, name: &str, weights: Value) -> CatalogProduct {
        serde_json::from_value(json!({
            "code": code,
            "product_name": name,
            "ecoscore_extended_data": { "impact": { "likeliest_recipe": weights } }
        }))
        .unwrap()
    }

    fn vocab() -> Vocabulary {
        Vocabulary::from_keys(vec!["en:a".into(), "en:b".into()]).unwrap()
    }

    #[test]
    fn first_occurrence_wins() {
        let items = vec![
            product("1", "Widget", json!({ "en:a": 2 })),
            product("1", "Dup", json!({ "en:b": 5 })),
            product("3", "", json!({ "en:a": 1 })),
        ];

        let records = prepare_batch(&items, &vocab(), "u/");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code, "1");
        assert_eq!(records[0].name, "Widget");
        assert_eq!(records[0].vector, vec![2.0, 0.0]);
    }

    #[test]
    fn rejected_item_does_not_claim_its_code() {
        let items = vec![
            product("9", "", json!({ "en:a": 1 })),
            product("9", "Real", json!({ "en:b": 1 })),
        ];

        let records = prepare_batch(&items, &vocab(), "u/");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Real");
    }

    #[test]
    fn keeps_input_order() {
        let items = vec![
            product("3", "c", json!({ "en:a": 1 })),
            product("1", "a", json!({ "en:a": 1 })),
            CatalogProduct::default(),
            product("2", "b", json!({ "en:b": 1 })),
            product("1", "a again", json!({ "en:b": 1 })),
        ];

        let codes: Vec<String> = prepare_batch(&items, &vocab(), "u/")
            .into_iter()
            .map(|r| r.code)
            .collect();
        assert_eq!(codes, ["3", "1", "2"]);
    }
}
