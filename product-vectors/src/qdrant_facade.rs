//! Thin adapter around `qdrant-client` implementing [`VectorIndex`].
//!
//! All Qdrant builders live here; the rest of the crate only sees
//! [`ProductRecord`], [`SimilarityQuery`] and [`SimilarProduct`].

use std::collections::HashMap;

use indicatif::{ProgressBar, ProgressStyle};
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, CreateFieldIndexCollectionBuilder,
    DeleteCollectionBuilder, Distance, FieldType, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, Value as QValue, VectorParamsBuilder, vectors_config,
};
use qdrant_client::{Payload, Qdrant};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::config::{DistanceKind, QdrantConfig};
use crate::errors::IndexError;
use crate::filters::{self, CODE_FIELD};
use crate::index::{IndexFuture, VectorIndex};
use crate::record::{ProductRecord, SimilarProduct, SimilarityQuery};
use crate::vocabulary::Vocabulary;

/// Qdrant-backed product index bound to one collection.
pub struct QdrantIndex {
    client: Qdrant,
    collection: String,
    distance: DistanceKind,
    batch_size: usize,
}

impl QdrantIndex {
    /// Connects lazily; no request is made until the first operation.
    ///
    /// # Errors
    /// `IndexError::Config` for an empty url/collection or a zero batch size,
    /// `IndexError::Qdrant` if the client cannot be built.
    pub fn new(cfg: &QdrantConfig) -> Result<Self, IndexError> {
        if cfg.url.trim().is_empty() {
            return Err(IndexError::Config("qdrant url is empty".into()));
        }
        if cfg.collection.trim().is_empty() {
            return Err(IndexError::Config("collection is empty".into()));
        }
        if cfg.batch_size == 0 {
            return Err(IndexError::Config("batch_size must be > 0".into()));
        }

        let mut builder = Qdrant::from_url(&cfg.url);
        if let Some(key) = &cfg.api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| IndexError::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            collection: cfg.collection.clone(),
            distance: cfg.distance,
            batch_size: cfg.batch_size,
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    async fn recreate(&self, dimension: usize) -> Result<(), IndexError> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(qerr)?;
        if exists {
            warn!("Dropping existing collection '{}'", self.collection);
            self.client
                .delete_collection(DeleteCollectionBuilder::new(&self.collection))
                .await
                .map_err(qerr)?;
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection).vectors_config(
                    VectorParamsBuilder::new(dimension as u64, to_distance(self.distance)),
                ),
            )
            .await
            .map_err(qerr)?;

        self.client
            .create_field_index(
                CreateFieldIndexCollectionBuilder::new(
                    &self.collection,
                    CODE_FIELD,
                    FieldType::Keyword,
                )
                .wait(true),
            )
            .await
            .map_err(qerr)?;

        info!(
            "Collection '{}' created with size={} distance={:?}",
            self.collection, dimension, self.distance
        );
        Ok(())
    }

    async fn write_records(
        &self,
        records: &[ProductRecord],
        vocabulary_id: &str,
    ) -> Result<u64, IndexError> {
        let total_chunks = records.len().div_ceil(self.batch_size);
        let pb = ProgressBar::new(total_chunks as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
        ) {
            pb.set_style(style.progress_chars("##-"));
        }

        let mut written: u64 = 0;
        for chunk in records.chunks(self.batch_size) {
            let points = chunk
                .iter()
                .map(|r| to_point(r, vocabulary_id))
                .collect::<Result<Vec<_>, _>>()?;

            self.client
                .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
                .await
                .map_err(qerr)?;

            written += chunk.len() as u64;
            pb.inc(1);
        }

        pb.finish_with_message("upload complete");
        Ok(written)
    }
}

impl VectorIndex for QdrantIndex {
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

            let vocabulary_id = vocabulary.fingerprint();
            self.recreate(dimension).await?;
            let written = self.write_records(records, &vocabulary_id).await?;
            info!(
                "Wrote {} products into '{}' (vocabulary {})",
                written, self.collection, vocabulary_id
            );
            Ok(written)
        })
    }

    fn query(&self, query: SimilarityQuery) -> IndexFuture<'_, Vec<SimilarProduct>> {
        Box::pin(async move {
            debug!(
                "Searching in '{}' with limit={} exclude={:?}",
                self.collection, query.limit, query.exclude_code
            );

            let mut builder = SearchPointsBuilder::new(&self.collection, query.vector, query.limit)
                .with_payload(true);
            if let Some(code) = &query.exclude_code {
                builder = builder.filter(filters::exclude_code(code));
            }

            let res = self.client.search_points(builder).await.map_err(qerr)?;

            let hits = res
                .result
                .into_iter()
                .map(|p| to_similar(p.score, p.payload))
                .collect::<Result<Vec<_>, _>>()?;
            debug!("Search completed: {} hits returned", hits.len());
            Ok(hits)
        })
    }

    fn count(&self) -> IndexFuture<'_, u64> {
        Box::pin(async move {
            let res = self
                .client
                .count(CountPointsBuilder::new(&self.collection).exact(true))
                .await
                .map_err(qerr)?;
            Ok(res.result.map(|r| r.count).unwrap_or(0))
        })
    }

    fn dimension(&self) -> IndexFuture<'_, Option<usize>> {
        Box::pin(async move {
            let exists = self
                .client
                .collection_exists(&self.collection)
                .await
                .map_err(qerr)?;
            if !exists {
                return Ok(None);
            }

            let info = self
                .client
                .collection_info(&self.collection)
                .await
                .map_err(qerr)?;
            let config = info
                .result
                .and_then(|i| i.config)
                .and_then(|c| c.params)
                .and_then(|p| p.vectors_config)
                .and_then(|v| v.config);

            match config {
                Some(vectors_config::Config::Params(p)) => Ok(Some(p.size as usize)),
                Some(vectors_config::Config::ParamsMap(_)) => Err(IndexError::Config(format!(
                    "collection '{}' uses named vectors",
                    self.collection
                ))),
                None => Ok(None),
            }
        })
    }
}

/// Stored payload of one point.
#[derive(Deserialize)]
struct StoredPayload {
    code: String,
    name: String,
    #[serde(default)]
    image_front_url: Option<String>,
    url: String,
    #[serde(default)]
    vocabulary_id: Option<String>,
}

fn qerr(e: qdrant_client::QdrantError) -> IndexError {
    IndexError::Qdrant(e.to_string())
}

fn to_distance(kind: DistanceKind) -> Distance {
    match kind {
        DistanceKind::Cosine => Distance::Cosine,
        DistanceKind::Dot => Distance::Dot,
        DistanceKind::Euclid => Distance::Euclid,
    }
}

/// Stable point id: the same barcode always maps to the same UUID.
fn point_id(code: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, code.as_bytes()).to_string()
}

fn to_point(r: &ProductRecord, vocabulary_id: &str) -> Result<PointStruct, IndexError> {
    let payload = json!({
        "code": r.code,
        "name": r.name,
        "image_front_url": r.image_front_url,
        "url": r.url,
        "vocabulary_id": vocabulary_id,
    });
    let payload =
        Payload::try_from(payload).map_err(|e| IndexError::InvalidPayload(e.to_string()))?;
    trace!("point code={} dim={}", r.code, r.vector.len());
    Ok(PointStruct::new(point_id(&r.code), r.vector.clone(), payload))
}

fn to_similar(score: f32, payload: HashMap<String, QValue>) -> Result<SimilarProduct, IndexError> {
    let stored: StoredPayload = serde_json::from_value(qpayload_to_json(payload))
        .map_err(|e| IndexError::InvalidPayload(e.to_string()))?;
    Ok(SimilarProduct {
        score,
        code: stored.code,
        name: stored.name,
        image_front_url: stored.image_front_url,
        url: stored.url,
        vocabulary_id: stored.vocabulary_id,
    })
}

/// Converts a Qdrant payload into JSON. Nested structs and lists map to `Null`.
fn qpayload_to_json(mut p: HashMap<String, QValue>) -> serde_json::Value {
    use qdrant_client::qdrant::value::Kind as K;
    let mut m = serde_json::Map::new();
    for (k, v) in p.drain() {
        let j = match v.kind {
            Some(K::StringValue(s)) => serde_json::Value::String(s),
            Some(K::IntegerValue(i)) => serde_json::Value::Number(i.into()),
            Some(K::DoubleValue(f)) => json!(f),
            Some(K::BoolValue(b)) => serde_json::Value::Bool(b),
            _ => serde_json::Value::Null,
        };
        m.insert(k, j);
    }
    serde_json::Value::Object(m)
}
