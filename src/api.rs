//! Catalog REST client

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::CatalogConfig;
use crate::state::{CatalogItem, CatalogQuery, TypeTag};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("{url} returned HTTP {status}")]
    Status { status: u16, url: String },
    #[error("unexpected response shape: {0}")]
    Shape(String),
    #[error("response parse error: {0}")]
    Decode(String),
}

impl ApiError {
    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_decode() {
            ApiError::Decode(error.to_string())
        } else {
            ApiError::Transport(error.to_string())
        }
    }
}

/// The backend the catalog reads from
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// One page of records for the query's filter.
    async fn fetch_page(&self, query: &CatalogQuery) -> Result<Vec<CatalogItem>, ApiError>;

    async fn fetch_item(&self, id: u32) -> Result<CatalogItem, ApiError>;

    async fn fetch_types(&self) -> Result<Vec<TypeTag>, ApiError>;
}

/// [`CatalogSource`] over HTTP + JSON
#[derive(Clone, Debug)]
pub struct HttpCatalog {
    http: reqwest::Client,
    config: CatalogConfig,
}

impl HttpCatalog {
    pub fn new(config: CatalogConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::from_reqwest)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    async fn get_json(&self, url: &str) -> Result<Value, ApiError> {
        debug!(%url, "GET");
        let response = self.http.get(url).send().await.map_err(|err| {
            warn!(%url, %err, "request failed");
            ApiError::from_reqwest(err)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "unsuccessful response");
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.json().await.map_err(ApiError::from_reqwest)
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn fetch_page(&self, query: &CatalogQuery) -> Result<Vec<CatalogItem>, ApiError> {
        let body = self.get_json(&self.config.page_url(query)).await?;
        decode_list(body)
    }

    async fn fetch_item(&self, id: u32) -> Result<CatalogItem, ApiError> {
        let body = self.get_json(&self.config.item_url(id)).await?;
        serde_json::from_value(body).map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn fetch_types(&self) -> Result<Vec<TypeTag>, ApiError> {
        let body = self.get_json(&self.config.types_url()).await?;
        let mut types: Vec<TypeTag> = decode_list(body)?;
        types.sort_by_key(|tag| tag.id);
        Ok(types)
    }
}

/// Accept either a bare array or an object wrapping one. For objects the
/// first array-valued property (in document order) wins.
pub fn unwrap_item_array(body: Value) -> Result<Vec<Value>, ApiError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(map) => map
            .into_iter()
            .find_map(|(_, value)| match value {
                Value::Array(items) => Some(items),
                _ => None,
            })
            .ok_or_else(|| ApiError::Shape("object has no array property".to_string())),
        other => Err(ApiError::Shape(format!(
            "expected array or object, got {}",
            json_kind(&other)
        ))),
    }
}

fn decode_list<T: DeserializeOwned>(body: Value) -> Result<Vec<T>, ApiError> {
    unwrap_item_array(body)?
        .into_iter()
        .map(|value| serde_json::from_value(value).map_err(|err| ApiError::Decode(err.to_string())))
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_unwrap_bare_array() {
        let items = unwrap_item_array(json!([{"id": 1}, {"id": 2}])).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_unwrap_wrapped_array() {
        let items = unwrap_item_array(json!({"total": 3, "data": [{"id": 1}]})).unwrap();
        assert_eq!(items, vec![json!({"id": 1})]);
    }

    #[test]
    fn test_unwrap_picks_first_array_property() {
        let items = unwrap_item_array(json!({"results": [1], "extra": [2, 3]})).unwrap();
        assert_eq!(items, vec![json!(1)]);
    }

    #[test]
    fn test_unwrap_rejects_other_shapes() {
        assert!(matches!(
            unwrap_item_array(json!({"count": 0})),
            Err(ApiError::Shape(_))
        ));
        assert!(matches!(
            unwrap_item_array(json!("nope")),
            Err(ApiError::Shape(msg)) if msg.contains("string")
        ));
    }

    #[test]
    fn test_decode_list_reports_bad_records() {
        let result: Result<Vec<CatalogItem>, _> = decode_list(json!([{"name": "no id"}]));
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[test]
    fn test_decode_list_of_types() {
        let types: Vec<TypeTag> =
            decode_list(json!([{"id": 10, "name": "Feu", "image": "feu.png"}])).unwrap();
        assert_eq!(
            types,
            vec![TypeTag {
                id: 10,
                name: "Feu".into(),
                image: "feu.png".into(),
            }]
        );
    }
}
