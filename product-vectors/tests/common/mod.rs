#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use catalog_client::{CatalogError, CatalogProduct};
use product_vectors::{
    CatalogFuture, IndexError, IndexFuture, ProductCatalog, ProductRecord, SimilarProduct,
    SimilarityQuery, VectorIndex, Vocabulary,
};
use serde_json::{Value, json};

pub fn product(code: &str, name: &str, weights: Value) -> CatalogProduct {
    serde_json::from_value(json!({
        "code": code,
        "product_name": name,
        "image_front_url": format!("https://images.example/{code}.jpg"),
        "ecoscore_extended_data": { "impact": { "likeliest_recipe": weights } }
    }))
    .unwrap()
}

/// Catalog backed by maps; a `None` page simulates a failed request.
#[derive(Default)]
pub struct FakeCatalog {
    pub products: HashMap<String, CatalogProduct>,
    pub pages: Vec<Option<Vec<CatalogProduct>>>,
    pub fail_lookups: bool,
}

impl FakeCatalog {
    pub fn with_products(items: Vec<CatalogProduct>) -> Self {
        let products = items
            .into_iter()
            .filter_map(|p| p.code.clone().map(|c| (c, p)))
            .collect();
        Self {
            products,
            ..Default::default()
        }
    }
}

impl ProductCatalog for FakeCatalog {
    fn fetch_product<'a>(&'a self, code: &'a str) -> CatalogFuture<'a, Option<CatalogProduct>> {
        Box::pin(async move {
            if self.fail_lookups {
                return Err(CatalogError::Timeout);
            }
            Ok(self.products.get(code).cloned())
        })
    }

    fn fetch_page(&self, page: u32) -> CatalogFuture<'_, Vec<CatalogProduct>> {
        Box::pin(async move {
            match self.pages.get(page as usize - 1) {
                Some(Some(items)) => Ok(items.clone()),
                Some(None) => Err(CatalogError::Server(503)),
                None => Ok(Vec::new()),
            }
        })
    }
}

/// Exact squared-L2 index held in memory.
#[derive(Default)]
pub struct InMemoryIndex {
    pub records: Mutex<Vec<ProductRecord>>,
    pub dim: Mutex<Option<usize>>,
    /// Fingerprint stamped on hits; `None` for points stored without one.
    pub vocabulary_id: Mutex<Option<String>>,
    pub fail_queries: bool,
    /// Ignore `exclude_code`, as a misbehaving backend would.
    pub ignore_exclusion: bool,
    pub queries: Mutex<Vec<SimilarityQuery>>,
}

impl InMemoryIndex {
    pub fn seeded(dimension: usize, records: Vec<ProductRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            dim: Mutex::new(Some(dimension)),
            ..Default::default()
        }
    }

    /// Seeded as if migrated with `vocabulary`.
    pub fn migrated(vocabulary: &Vocabulary, records: Vec<ProductRecord>) -> Self {
        let index = Self::seeded(vocabulary.len(), records);
        *index.vocabulary_id.lock().unwrap() = Some(vocabulary.fingerprint());
        index
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

impl VectorIndex for InMemoryIndex {
    fn replace_collection<'a>(
        &'a self,
        vocabulary: &'a Vocabulary,
        records: &'a [ProductRecord],
    ) -> IndexFuture<'a, u64> {
        Box::pin(async move {
            let dimension = vocabulary.len();
            if dimension == 0 {
                return Err(IndexError::InvalidDimension(0));
            }
            if let Some(bad) = records.iter().find(|r| r.vector.len() != dimension) {
                return Err(IndexError::VectorSizeMismatch {
                    code: bad.code.clone(),
                    got: bad.vector.len(),
                    want: dimension,
                });
            }
            *self.records.lock().unwrap() = records.to_vec();
            *self.dim.lock().unwrap() = Some(dimension);
            *self.vocabulary_id.lock().unwrap() = Some(vocabulary.fingerprint());
            Ok(records.len() as u64)
        })
    }

    fn query(&self, query: SimilarityQuery) -> IndexFuture<'_, Vec<SimilarProduct>> {
        Box::pin(async move {
            self.queries.lock().unwrap().push(query.clone());
            if self.fail_queries {
                return Err(IndexError::Qdrant("connection refused".into()));
            }

            let records = self.records.lock().unwrap();
            let vocabulary_id = self.vocabulary_id.lock().unwrap().clone();
            let mut hits: Vec<SimilarProduct> = records
                .iter()
                .filter(|r| {
                    self.ignore_exclusion || query.exclude_code.as_deref() != Some(r.code.as_str())
                })
                .map(|r| SimilarProduct {
                    score: squared_l2(&r.vector, &query.vector),
                    code: r.code.clone(),
                    name: r.name.clone(),
                    image_front_url: r.image_front_url.clone(),
                    url: r.url.clone(),
                    vocabulary_id: vocabulary_id.clone(),
                })
                .collect();
            hits.sort_by(|a, b| a.score.total_cmp(&b.score));
            hits.truncate(query.limit as usize);
            Ok(hits)
        })
    }

    fn count(&self) -> IndexFuture<'_, u64> {
        Box::pin(async move { Ok(self.records.lock().unwrap().len() as u64) })
    }

    fn dimension(&self) -> IndexFuture<'_, Option<usize>> {
        Box::pin(async move { Ok(*self.dim.lock().unwrap()) })
    }
}
