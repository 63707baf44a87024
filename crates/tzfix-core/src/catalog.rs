use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::asset::Asset;
use crate::error::CatalogError;
use crate::filter::SearchFilter;

/// Body of a per-asset metadata update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetUpdate {
    /// Capture time rendered in the target zone (RFC 3339).
    pub date_time_original: String,
    pub time_zone: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub email: Option<String>,
}

/// The remote media catalog, consumed as plain request/response calls.
///
/// Implementations must not retry; callers decide what a failure means.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// The account the configured credentials belong to.
    async fn current_user(&self) -> Result<UserInfo, CatalogError>;

    /// One page (1-based) of assets matching `filter`, with EXIF data.
    async fn list_assets(
        &self,
        filter: &SearchFilter,
        page: u32,
        size: u32,
    ) -> Result<Vec<Asset>, CatalogError>;

    /// Best-effort total for `filter`; `None` when unavailable.
    async fn count_assets(&self, filter: &SearchFilter) -> Option<u64>;

    async fn update_asset(&self, id: Uuid, update: &AssetUpdate) -> Result<(), CatalogError>;
}
