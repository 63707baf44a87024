//! Immich REST client.
//!
//! Endpoints used:
//! - `GET  /api/users/me`
//! - `POST /api/search/metadata`
//! - `POST /api/search/statistics`
//! - `PUT  /api/assets/{id}`

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::asset::Asset;
use crate::catalog::{AssetUpdate, Catalog, UserInfo};
use crate::error::CatalogError;
use crate::filter::SearchFilter;

const USER_AGENT: &str = concat!("tzfix/", env!("CARGO_PKG_VERSION"));
const API_KEY_HEADER: &str = "x-api-key";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const SEARCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImmichConfig {
    pub base_url: String,
    pub api_key: String,
}

impl ImmichConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchRequest<'a> {
    #[serde(flatten)]
    pub filter: &'a SearchFilter,
    pub page: u32,
    pub size: u32,
    pub with_exif: bool,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub assets: SearchPage,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchPage {
    #[serde(default)]
    pub items: Vec<Value>,
}

impl SearchPage {
    /// Decodes each item on its own so one malformed record cannot fail the
    /// page. Records that do not fit the asset shape keep their id and name
    /// but lose their EXIF data, which classifies them as skipped.
    fn into_assets(self) -> Vec<Asset> {
        self.items.into_iter().map(decode_item).collect()
    }
}

fn decode_item(item: Value) -> Asset {
    let id = item
        .get("id")
        .and_then(Value::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok());
    let file_name = item
        .get("originalFileName")
        .and_then(Value::as_str)
        .unwrap_or("Unknown")
        .to_string();

    match serde_json::from_value::<Asset>(item) {
        Ok(asset) => asset,
        Err(err) => {
            warn!(asset_id = ?id, file = %file_name, error = %err, "malformed asset record; EXIF ignored");
            Asset::new(id.unwrap_or_else(Uuid::nil), file_name)
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatisticsResponse {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub count: Option<u64>,
}

impl StatisticsResponse {
    fn total(&self) -> Option<u64> {
        self.total.or(self.count)
    }
}

#[derive(Debug, Clone)]
pub struct ImmichClient {
    http: reqwest::Client,
    base_url: String,
}

impl ImmichClient {
    pub fn new(config: &ImmichConfig) -> Result<Self, CatalogError> {
        let mut api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| CatalogError::Config(format!("API key is not a valid header value: {e}")))?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(self::config)?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn ensure_success(response: Response) -> Result<Response, CatalogError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(CatalogError::Status {
        status: status.as_u16(),
        body,
    })
}

fn config(err: impl fmt::Display) -> CatalogError {
    CatalogError::Config(format!("could not build HTTP client: {err}"))
}

fn network(err: reqwest::Error) -> CatalogError {
    CatalogError::Network(err.to_string())
}

fn decode(err: reqwest::Error) -> CatalogError {
    CatalogError::Decode(err.to_string())
}

#[async_trait]
impl Catalog for ImmichClient {
    async fn current_user(&self) -> Result<UserInfo, CatalogError> {
        let response = self
            .http
            .get(self.url("/api/users/me"))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(network)?;
        ensure_success(response).await?.json().await.map_err(decode)
    }

    async fn list_assets(
        &self,
        filter: &SearchFilter,
        page: u32,
        size: u32,
    ) -> Result<Vec<Asset>, CatalogError> {
        let body = SearchRequest {
            filter,
            page,
            size,
            with_exif: true,
        };
        debug!(page, size, "searching assets");

        let response = self
            .http
            .post(self.url("/api/search/metadata"))
            .timeout(SEARCH_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(network)?;
        let parsed: SearchResponse = ensure_success(response).await?.json().await.map_err(decode)?;
        Ok(parsed.assets.into_assets())
    }

    async fn count_assets(&self, filter: &SearchFilter) -> Option<u64> {
        let response = self
            .http
            .post(self.url("/api/search/statistics"))
            .timeout(REQUEST_TIMEOUT)
            .json(filter)
            .send()
            .await
            .ok()?;
        if response.status() != StatusCode::OK {
            debug!(status = %response.status(), "statistics endpoint unavailable");
            return None;
        }
        let stats: StatisticsResponse = response.json().await.ok()?;
        stats.total()
    }

    async fn update_asset(&self, id: Uuid, update: &AssetUpdate) -> Result<(), CatalogError> {
        let response = self
            .http
            .put(self.url(&format!("/api/assets/{id}")))
            .timeout(REQUEST_TIMEOUT)
            .json(update)
            .send()
            .await
            .map_err(network)?;
        ensure_success(response).await?;
        Ok(())
    }
}
