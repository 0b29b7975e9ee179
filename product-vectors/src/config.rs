//! Runtime configuration read from the environment.

use std::path::PathBuf;
use std::str::FromStr;

use catalog_client::CatalogConfig;

use crate::errors::ConfigError;
use crate::vectorizer::DEFAULT_PUBLIC_PRODUCT_URL;
use crate::vocabulary::VocabularyOptions;

/// Number of neighbours returned by a similarity query.
pub const DEFAULT_TOP_K: u64 = 3;

/// Distance function used for the vector space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DistanceKind {
    Cosine,
    Dot,
    /// Euclidean distance (L2).
    #[default]
    Euclid,
}

impl FromStr for DistanceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cosine" => Ok(Self::Cosine),
            "dot" => Ok(Self::Dot),
            "euclid" | "euclidean" | "l2" => Ok(Self::Euclid),
            _ => Err(ConfigError::EnvParse {
                key: "QDRANT_DISTANCE".into(),
                value: s.into(),
            }),
        }
    }
}

/// Qdrant connection and collection settings.
#[derive(Clone, Debug)]
pub struct QdrantConfig {
    /// gRPC endpoint, e.g. `http://localhost:6334`.
    pub url: String,
    pub api_key: Option<String>,
    pub collection: String,
    pub distance: DistanceKind,
    /// Points per upsert request.
    pub batch_size: usize,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".into(),
            api_key: None,
            collection: "food-col".into(),
            distance: DistanceKind::default(),
            batch_size: 256,
        }
    }
}

/// Knobs of a similarity query.
#[derive(Clone, Debug)]
pub struct SimilarityOptions {
    pub top_k: u64,
    /// Prefix of the public product page; the barcode is appended.
    pub public_product_url: String,
}

impl Default for SimilarityOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            public_product_url: DEFAULT_PUBLIC_PRODUCT_URL.into(),
        }
    }
}

/// Everything the pipelines and the API need.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    /// Search pages fetched when building a dataset.
    pub catalog_pages: u32,
    pub vocabulary: VocabularyOptions,
    pub similarity: SimilarityOptions,
    pub dataset_root: PathBuf,
    pub qdrant: QdrantConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            catalog_pages: 10,
            vocabulary: VocabularyOptions::default(),
            similarity: SimilarityOptions::default(),
            dataset_root: PathBuf::from("datasets"),
            qdrant: QdrantConfig::default(),
        }
    }
}

impl AppConfig {
    /// Build configuration from environment variables.
    ///
    /// Environment variables used:
    /// - `CATALOG_BASE_URL` (default: "https://world.openfoodfacts.org")
    /// - `CATALOG_PAGE_SIZE` (default: 1000)
    /// - `CATALOG_PAGES` (default: 10)
    /// - `CATALOG_TIMEOUT_SECS` (default: 30)
    /// - `CATALOG_USER_AGENT`
    /// - `PUBLIC_PRODUCT_URL` (default: "https://world.openfoodfacts.org/product/")
    /// - `VOCABULARY_PREFIX` (default: "en:")
    /// - `VOCABULARY_MAX_SIZE` (default: 1500)
    /// - `SIMILAR_TOP_K` (default: 3)
    /// - `DATASET_ROOT` (default: "datasets")
    /// - `QDRANT_URL` (default: "http://localhost:6334")
    /// - `QDRANT_API_KEY` (optional)
    /// - `QDRANT_COLLECTION` (default: "food-col")
    /// - `QDRANT_DISTANCE` (values: "Cosine" | "Dot" | "Euclid"; default: "Euclid")
    /// - `QDRANT_BATCH_SIZE` (default: 256)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);
        let d = Self::default();

        let catalog = CatalogConfig {
            base_url: env.string("CATALOG_BASE_URL").unwrap_or(d.catalog.base_url),
            page_size: env.parse("CATALOG_PAGE_SIZE")?.unwrap_or(d.catalog.page_size),
            timeout_secs: env
                .parse("CATALOG_TIMEOUT_SECS")?
                .unwrap_or(d.catalog.timeout_secs),
            user_agent: env
                .string("CATALOG_USER_AGENT")
                .unwrap_or(d.catalog.user_agent),
        };

        let vocabulary = VocabularyOptions {
            prefix: env
                .string("VOCABULARY_PREFIX")
                .unwrap_or(d.vocabulary.prefix),
            max_size: env
                .parse("VOCABULARY_MAX_SIZE")?
                .unwrap_or(d.vocabulary.max_size),
        };

        let similarity = SimilarityOptions {
            top_k: env.parse("SIMILAR_TOP_K")?.unwrap_or(d.similarity.top_k),
            public_product_url: env
                .string("PUBLIC_PRODUCT_URL")
                .unwrap_or(d.similarity.public_product_url),
        };

        let qdrant = QdrantConfig {
            url: env.string("QDRANT_URL").unwrap_or(d.qdrant.url),
            api_key: env.string("QDRANT_API_KEY"),
            collection: env.string("QDRANT_COLLECTION").unwrap_or(d.qdrant.collection),
            distance: env.parse("QDRANT_DISTANCE")?.unwrap_or(d.qdrant.distance),
            batch_size: env.parse("QDRANT_BATCH_SIZE")?.unwrap_or(d.qdrant.batch_size),
        };

        let cfg = Self {
            catalog,
            catalog_pages: env.parse("CATALOG_PAGES")?.unwrap_or(d.catalog_pages),
            vocabulary,
            similarity,
            dataset_root: env
                .string("DATASET_ROOT")
                .map(PathBuf::from)
                .unwrap_or(d.dataset_root),
            qdrant,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog_pages == 0 {
            return Err(ConfigError::Invalid("CATALOG_PAGES must be > 0".into()));
        }
        if self.catalog.page_size == 0 {
            return Err(ConfigError::Invalid("CATALOG_PAGE_SIZE must be > 0".into()));
        }
        if self.vocabulary.max_size == 0 {
            return Err(ConfigError::Invalid(
                "VOCABULARY_MAX_SIZE must be > 0".into(),
            ));
        }
        if self.similarity.top_k == 0 {
            return Err(ConfigError::Invalid("SIMILAR_TOP_K must be > 0".into()));
        }
        if self.qdrant.url.trim().is_empty() {
            return Err(ConfigError::Invalid("QDRANT_URL is empty".into()));
        }
        if self.qdrant.collection.trim().is_empty() {
            return Err(ConfigError::Invalid("QDRANT_COLLECTION is empty".into()));
        }
        if self.qdrant.batch_size == 0 {
            return Err(ConfigError::Invalid("QDRANT_BATCH_SIZE must be > 0".into()));
        }
        Ok(())
    }
}

/// Variable source with typed accessors. Blank values count as unset.
struct Env<'f, F>(&'f F);

impl<F> Env<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn parse<T: FromStr>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.string(key) {
            None => Ok(None),
            Some(v) => v.trim().parse::<T>().map(Some).map_err(|_| ConfigError::EnvParse {
                key: key.into(),
                value: v,
            }),
        }
    }
}
