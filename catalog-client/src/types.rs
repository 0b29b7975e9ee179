//! Wire types returned by the Open Food Facts APIs.
//!
//! Only the fields the vectorization pipeline reads are modelled; everything
//! else in the response is ignored by serde.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Sparse recipe-category weights, e.g. `{"en:sugar": 45.0, "en:cocoa": 12.5}`.
///
/// Key order is the order of the JSON object as sent by the catalog.
pub type CategoryWeights = Map<String, Value>;

/// A raw product record as the catalog returns it.
///
/// Every field is optional: catalog data is user-contributed and any of them
/// may be missing, `null` or of the wrong JSON type. A mistyped field decodes
/// as `None` instead of failing the whole record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub product_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image_front_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub ecoscore_extended_data: Option<EcoscoreExtendedData>,
}

impl CatalogProduct {
    /// Returns `impact.likeliest_recipe` when the product carries one.
    pub fn category_weights(&self) -> Option<&CategoryWeights> {
        self.ecoscore_extended_data
            .as_ref()?
            .impact
            .as_ref()?
            .likeliest_recipe
            .as_ref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EcoscoreExtendedData {
    #[serde(default, deserialize_with = "lenient_object")]
    pub impact: Option<EcoscoreImpact>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EcoscoreImpact {
    #[serde(default, deserialize_with = "lenient_object")]
    pub likeliest_recipe: Option<CategoryWeights>,
}

/// Body of `GET /cgi/search.pl?json=1`.
///
/// Items stay raw so one undecodable product cannot fail the page.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub products: Vec<Value>,
}

/// Body of `GET /api/v2/product/{code}.json`.
///
/// `status` is `1` when the product exists and `0` otherwise.
#[derive(Debug, Deserialize)]
pub(crate) struct ProductResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: Option<String>,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub product: Option<CatalogProduct>,
}

/// Barcodes occasionally arrive as JSON numbers; accept both.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Decodes `T` from a JSON object; any other shape, or an object that does
/// not fit `T`, becomes `None`.
fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(v @ Value::Object(_)) => serde_json::from_value(v).ok(),
        _ => None,
    })
}
