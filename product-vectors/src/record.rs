//! Core data models used by the library.

use serde::{Deserialize, Serialize};

/// A product projected onto a vocabulary: one dense vector plus display metadata.
///
/// `vector[i]` is the product's weight for `vocabulary[i]` (0 when absent).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub image_front_url: Option<String>,
    /// Public product page.
    pub url: String,
    pub vector: Vec<f32>,
}

/// One ranked match returned by the index, nearest first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimilarProduct {
    pub score: f32,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub image_front_url: Option<String>,
    pub url: String,
    /// [`crate::Vocabulary::fingerprint`] the stored point was built with.
    #[serde(skip_serializing, default)]
    pub vocabulary_id: Option<String>,
}

/// Nearest-neighbour request sent to a [`crate::VectorIndex`].
#[derive(Clone, Debug)]
pub struct SimilarityQuery {
    pub vector: Vec<f32>,
    pub limit: u64,
    /// Points whose `code` equals this value must not be returned.
    pub exclude_code: Option<String>,
}
