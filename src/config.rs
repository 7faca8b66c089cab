//! Runtime configuration for the catalog backend

use std::time::Duration;

use crate::state::{CatalogQuery, DEFAULT_PAGE_LIMIT};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_CATALOG_PATH: &str = "pokemons";
pub const DEFAULT_TYPES_PATH: &str = "types";
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where the catalog lives and how to talk to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Base URL of the REST backend, without trailing slash
    pub base_url: String,
    /// Collection path for catalog records
    pub catalog_path: String,
    /// Collection path for type tags
    pub types_path: String,
    /// Page size requested from the backend
    pub limit: u32,
    /// Quiet period before a typed search term is applied
    pub debounce: Duration,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            catalog_path: DEFAULT_CATALOG_PATH.to_string(),
            types_path: DEFAULT_TYPES_PATH.to_string(),
            limit: DEFAULT_PAGE_LIMIT,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl CatalogConfig {
    pub fn new(
        base_url: &str,
        catalog_path: &str,
        types_path: &str,
        limit: u32,
        debounce_ms: u64,
        timeout_secs: u64,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            catalog_path: catalog_path.trim_matches('/').to_string(),
            types_path: types_path.trim_matches('/').to_string(),
            limit: limit.max(1),
            debounce: Duration::from_millis(debounce_ms),
            timeout: Duration::from_secs(timeout_secs.max(1)),
        }
    }

    /// `GET {base}/{catalog}?page=..&limit=..[&types=..]*[&name=..]`
    pub fn page_url(&self, query: &CatalogQuery) -> String {
        let mut url = format!(
            "{}/{}?page={}&limit={}",
            self.base_url, self.catalog_path, query.page, query.limit
        );
        for type_id in &query.filter.type_ids {
            url.push_str(&format!("&types={type_id}"));
        }
        if let Some(term) = &query.filter.search_term {
            url.push_str(&format!("&name={}", urlencoding::encode(term)));
        }
        url
    }

    pub fn item_url(&self, id: u32) -> String {
        format!("{}/{}/{}", self.base_url, self.catalog_path, id)
    }

    pub fn types_url(&self) -> String {
        format!("{}/{}", self.base_url, self.types_path)
    }
}
