//! Vocabulary: the ordered list of category keys that defines vector dimensions.
//!
//! Built once per dataset from the first-seen order of keys across a batch of
//! catalog products, capped to a maximum size, then reused unchanged for every
//! record and every query derived from that dataset.

use std::collections::HashSet;

use catalog_client::{CatalogProduct, CategoryWeights};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::DatasetError;

/// Only English recipe categories are kept by default.
pub const DEFAULT_VOCABULARY_PREFIX: &str = "en:";
/// Default dimension cap.
pub const DEFAULT_VOCABULARY_MAX_SIZE: usize = 1500;

/// Knobs for [`Vocabulary::build`].
#[derive(Clone, Debug)]
pub struct VocabularyOptions {
    /// Keys must start with this namespace prefix.
    pub prefix: String,
    /// Upper bound on the number of dimensions.
    pub max_size: usize,
}

impl Default for VocabularyOptions {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_VOCABULARY_PREFIX.to_string(),
            max_size: DEFAULT_VOCABULARY_MAX_SIZE,
        }
    }
}

/// Immutable, duplicate-free, order-significant list of category keys.
///
/// Serialized as a plain JSON array; deserialization rejects duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    keys: Vec<String>,
}

impl Vocabulary {
    /// Scans `items` in order and collects the qualifying category keys.
    pub fn build<'a, I>(items: I, opts: &VocabularyOptions) -> Self
    where
        I: IntoIterator<Item = &'a CatalogProduct>,
    {
        let mut builder = VocabularyBuilder::new(opts);
        for item in items {
            if let Some(weights) = item.category_weights() {
                builder.scan(weights);
            }
        }
        builder.finish()
    }

    /// Rebuilds a vocabulary from persisted keys, keeping their order.
    ///
    /// # Errors
    /// [`DatasetError::DuplicateKey`] if a key appears twice.
    pub fn from_keys(keys: Vec<String>) -> Result<Self, DatasetError> {
        let mut seen = HashSet::with_capacity(keys.len());
        for key in &keys {
            if !seen.insert(key.as_str()) {
                return Err(DatasetError::DuplicateKey(key.clone()));
            }
        }
        Ok(Self { keys })
    }

    /// Number of dimensions.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in dimension order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Identifier of the exact key sequence. Reordering the keys changes it.
    pub fn fingerprint(&self) -> String {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, self.keys.join("\n").as_bytes()).to_string()
    }
}

impl TryFrom<Vec<String>> for Vocabulary {
    type Error = DatasetError;

    fn try_from(keys: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_keys(keys)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(v: Vocabulary) -> Self {
        v.keys
    }
}

/// Insertion-ordered set of keys with a namespace filter and a size cap.
pub struct VocabularyBuilder<'o> {
    opts: &'o VocabularyOptions,
    seen: HashSet<String>,
    keys: Vec<String>,
}

impl<'o> VocabularyBuilder<'o> {
    pub fn new(opts: &'o VocabularyOptions) -> Self {
        Self {
            opts,
            seen: HashSet::new(),
            keys: Vec::new(),
        }
    }

    /// Appends every unseen key of `weights` that carries the configured prefix.
    pub fn scan(&mut self, weights: &CategoryWeights) {
        for key in weights.keys() {
            if key.starts_with(&self.opts.prefix) && !self.seen.contains(key) {
                self.seen.insert(key.clone());
                self.keys.push(key.clone());
            }
        }
    }

    /// Truncates to `max_size` (first-seen keys win) and freezes the result.
    pub fn finish(mut self) -> Vocabulary {
        let distinct = self.keys.len();
        if distinct > self.opts.max_size {
            self.keys.truncate(self.opts.max_size);
            debug!(
                "vocabulary: dropped {} keys beyond cap {}",
                distinct - self.opts.max_size,
                self.opts.max_size
            );
        }

        info!("vocabulary: {} categories extracted", self.keys.len());
        Vocabulary { keys: self.keys }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn product(weights: Value) -> CatalogProduct {
        serde_json::from_value(json!({
            "code": "1",
            "product_name": "p",
            "ecoscore_extended_data": { "impact": { "likeliest_recipe": weights } }
        }))
        .unwrap()
    }

    #[test]
    fn first_seen_order_without_duplicates() {
        let items = vec![
            product(json!({ "en:b": 1, "en:a": 2 })),
            CatalogProduct::default(),
            product(json!({ "en:a": 3, "en:c": 4, "en:b": 5 })),
        ];

        let vocab = Vocabulary::build(&items, &VocabularyOptions::default());
        assert_eq!(vocab.keys(), ["en:b", "en:a", "en:c"]);
    }

    #[test]
    fn fingerprint_tracks_key_order() {
        let ab = Vocabulary::from_keys(vec!["en:a".into(), "en:b".into()]).unwrap();
        let ba = Vocabulary::from_keys(vec!["en:b".into(), "en:a".into()]).unwrap();

        assert_eq!(ab.fingerprint(), ab.clone().fingerprint());
        assert_ne!(ab.fingerprint(), ba.fingerprint());
        assert_ne!(ab.fingerprint(), Vocabulary::default().fingerprint());
    }

    #[test]
    fn foreign_namespaces_are_ignored() {
        let items = vec![product(json!({ "fr:sucre": 1, "en:sugar": 2, "de:zucker": 3 }))];

        let vocab = Vocabulary::build(&items, &VocabularyOptions::default());
        assert_eq!(vocab.keys(), ["en:sugar"]);
    }

    #[test]
    fn empty_and_missing_maps_contribute_nothing() {
        let items = vec![product(json!({})), CatalogProduct::default()];

        let vocab = Vocabulary::build(&items, &VocabularyOptions::default());
        assert!(vocab.is_empty());
    }

    #[test]
    fn cap_keeps_first_discovered_keys() {
        let opts = VocabularyOptions {
            max_size: 1500,
            ..Default::default()
        };
        let items: Vec<CatalogProduct> = (0..40)
            .map(|chunk| {
                let weights: serde_json::Map<String, Value> = (0..50)
                    .map(|i| (format!("en:k{:04}", chunk * 50 + i), json!(1)))
                    .collect();
                product(Value::Object(weights))
            })
            .collect();

        let vocab = Vocabulary::build(&items, &opts);
        assert_eq!(vocab.len(), 1500);
        assert_eq!(vocab.keys()[0], "en:k0000");
        assert_eq!(vocab.keys()[1499], "en:k1499");
    }

    #[test]
    fn under_cap_is_untouched() {
        let opts = VocabularyOptions {
            max_size: 3,
            ..Default::default()
        };
        let items = vec![product(json!({ "en:a": 1, "en:b": 1, "en:c": 1 }))];
        assert_eq!(Vocabulary::build(&items, &opts).len(), 3);
    }

    #[test]
    fn build_is_deterministic() {
        let items = vec![
            product(json!({ "en:x": 1, "en:y": 1 })),
            product(json!({ "en:z": 1, "en:x": 1 })),
        ];
        let opts = VocabularyOptions::default();
        assert_eq!(
            Vocabulary::build(&items, &opts),
            Vocabulary::build(&items, &opts)
        );
    }

    #[test]
    fn json_round_trip_rejects_duplicates() {
        let vocab: Vocabulary = serde_json::from_str(r#"["en:a","en:b"]"#).unwrap();
        assert_eq!(serde_json::to_string(&vocab).unwrap(), r#"["en:a","en:b"]"#);

        assert!(serde_json::from_str::<Vocabulary>(r#"["en:a","en:a"]"#).is_err());
    }
}
