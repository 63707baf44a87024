#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use tzfix_core::{Asset, AssetUpdate, Catalog, CatalogError, SearchFilter, UserInfo};
use uuid::Uuid;

pub fn asset(name: &str, captured_at: Option<&str>, coords: Option<(f64, f64)>) -> Asset {
    let mut asset = Asset::new(Uuid::new_v4(), name);
    if let Some(ts) = captured_at {
        asset = asset.with_capture_time(ts);
    }
    if let Some((lat, lng)) = coords {
        asset = asset.with_coordinates(lat, lng);
    }
    asset
}

/// Maps the two test cities to their zones; everything else is unresolvable.
pub fn city_resolver(latitude: f64, _longitude: f64) -> Option<String> {
    if (latitude - 48.85).abs() < 0.5 {
        Some("Europe/Paris".to_string())
    } else if (latitude - 51.5).abs() < 0.5 {
        Some("Europe/London".to_string())
    } else {
        None
    }
}

/// In-memory catalog serving scripted pages and recording updates.
pub struct FakeCatalog {
    pages: Mutex<VecDeque<Result<Vec<Asset>, CatalogError>>>,
    pub requested_pages: Mutex<Vec<u32>>,
    pub updates: Mutex<Vec<(Uuid, AssetUpdate)>>,
    failing_updates: HashSet<Uuid>,
    total: Option<u64>,
}

impl FakeCatalog {
    pub fn with_pages(pages: Vec<Result<Vec<Asset>, CatalogError>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            requested_pages: Mutex::new(Vec::new()),
            updates: Mutex::new(Vec::new()),
            failing_updates: HashSet::new(),
            total: None,
        }
    }

    pub fn single_page(assets: Vec<Asset>) -> Self {
        Self::with_pages(vec![Ok(assets)])
    }

    pub fn failing_update_for(mut self, id: Uuid) -> Self {
        self.failing_updates.insert(id);
        self
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    pub fn update_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn current_user(&self) -> Result<UserInfo, CatalogError> {
        Ok(UserInfo {
            email: Some("owner@example.com".into()),
        })
    }

    async fn list_assets(
        &self,
        _filter: &SearchFilter,
        page: u32,
        _size: u32,
    ) -> Result<Vec<Asset>, CatalogError> {
        self.requested_pages.lock().unwrap().push(page);
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn count_assets(&self, _filter: &SearchFilter) -> Option<u64> {
        self.total
    }

    async fn update_asset(&self, id: Uuid, update: &AssetUpdate) -> Result<(), CatalogError> {
        if self.failing_updates.contains(&id) {
            return Err(CatalogError::Status {
                status: 400,
                body: "bad request".into(),
            });
        }
        self.updates.lock().unwrap().push((id, update.clone()));
        Ok(())
    }
}
