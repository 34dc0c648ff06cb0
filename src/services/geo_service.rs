//! GEO and brand-list service

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use ts_rs::TS;

use crate::affiliate::geo::{lookup_geo, normalize_geo};
use crate::config::TS_EXPORT_PATH;
use crate::errors::{Result, TrackdeskError};
use crate::storage::{BrandList, Geo, SeaOrmStorage};

/// Request to create a GEO
#[derive(Debug, Clone, Default)]
pub struct CreateGeoRequest {
    /// Free-text label, normalized to a canonical code
    pub code: String,
    /// Display name (defaults to the code)
    pub name: Option<String>,
    /// Defaults to the end of the list
    pub sort_order: Option<i32>,
}

/// Request to update a GEO (None = keep existing)
#[derive(Debug, Clone, Default)]
pub struct UpdateGeoRequest {
    pub code: Option<String>,
    pub name: Option<String>,
    pub sort_order: Option<i32>,
}

/// Result of resolving a free-text label against the configured GEOs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct GeoResolution {
    pub input: String,
    /// Canonical code, or the best-effort normalized label
    pub code: String,
    /// Whether `code` came from the alias table
    pub alias_matched: bool,
    /// false = needs setup
    pub known: bool,
    pub geo: Option<Geo>,
}

pub struct GeoService {
    storage: Arc<SeaOrmStorage>,
}

impl GeoService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn list_geos(&self) -> Result<Vec<Geo>> {
        self.storage.list_geos().await
    }

    pub async fn get_geo(&self, id: i32) -> Result<Geo> {
        self.storage
            .get_geo(id)
            .await?
            .ok_or_else(|| TrackdeskError::not_found(format!("GEO {} not found", id)))
    }

    pub async fn create_geo(&self, req: CreateGeoRequest) -> Result<Geo> {
        let code = normalize_code(&req.code)?;
        if self.storage.find_geo_by_code(&code).await?.is_some() {
            return Err(TrackdeskError::conflict(format!("GEO '{}' already exists", code)));
        }

        let name = req
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| code.clone());
        let sort_order = match req.sort_order {
            Some(order) => order,
            None => self.storage.list_geos().await?.len() as i32,
        };

        let geo = self.storage.insert_geo(&code, &name, sort_order).await?;
        info!("GeoService: created GEO '{}'", geo.code);
        Ok(geo)
    }

    pub async fn update_geo(&self, id: i32, req: UpdateGeoRequest) -> Result<Geo> {
        let mut geo = self.get_geo(id).await?;

        if let Some(code) = req.code {
            let code = normalize_code(&code)?;
            if code != geo.code
                && let Some(other) = self.storage.find_geo_by_code(&code).await?
                && other.id != id
            {
                return Err(TrackdeskError::conflict(format!("GEO '{}' already exists", code)));
            }
            geo.code = code;
        }
        if let Some(name) = req.name.map(|n| n.trim().to_string()) {
            if name.is_empty() {
                return Err(TrackdeskError::validation("GEO name cannot be empty"));
            }
            geo.name = name;
        }
        if let Some(order) = req.sort_order {
            geo.sort_order = order;
        }

        self.storage.update_geo(&geo).await
    }

    pub async fn delete_geo(&self, id: i32) -> Result<()> {
        if !self.storage.delete_geo(id).await? {
            return Err(TrackdeskError::not_found(format!("GEO {} not found", id)));
        }
        Ok(())
    }

    pub async fn reorder_geos(&self, ids: &[i32]) -> Result<Vec<Geo>> {
        validate_order(ids)?;
        self.storage.reorder_geos(ids).await?;
        self.storage.list_geos().await
    }

    /// 将任意标签解析为 GEO 代码并检查是否已配置；从不因无法匹配而报错
    pub async fn resolve_label(&self, label: &str) -> Result<GeoResolution> {
        let alias_matched = lookup_geo(label).is_some();
        let code = normalize_geo(label);
        let geo = if code.is_empty() {
            None
        } else {
            self.storage.find_geo_by_code(&code).await?
        };

        Ok(GeoResolution {
            input: label.to_string(),
            code,
            alias_matched,
            known: geo.is_some(),
            geo,
        })
    }

    // ============ Brand lists ============

    pub async fn list_brand_lists(&self, geo_id: i32) -> Result<Vec<BrandList>> {
        self.get_geo(geo_id).await?;
        self.storage.list_brand_lists(geo_id).await
    }

    pub async fn create_brand_list(&self, geo_id: i32, name: &str) -> Result<BrandList> {
        self.get_geo(geo_id).await?;
        let name = validate_list_name(name)?;
        let sort_order = self.storage.list_brand_lists(geo_id).await?.len() as i32;
        let list = self.storage.insert_brand_list(geo_id, &name, sort_order).await?;
        info!("GeoService: created brand list '{}' in GEO {}", list.name, geo_id);
        Ok(list)
    }

    pub async fn rename_brand_list(&self, geo_id: i32, list_id: i32, name: &str) -> Result<BrandList> {
        self.owned_list(geo_id, list_id).await?;
        let name = validate_list_name(name)?;
        self.storage.rename_brand_list(list_id, &name).await
    }

    pub async fn delete_brand_list(&self, geo_id: i32, list_id: i32) -> Result<()> {
        self.owned_list(geo_id, list_id).await?;
        self.storage.delete_brand_list(list_id).await?;
        Ok(())
    }

    pub async fn reorder_brand_lists(&self, geo_id: i32, ids: &[i32]) -> Result<Vec<BrandList>> {
        self.get_geo(geo_id).await?;
        validate_order(ids)?;
        self.storage.reorder_brand_lists(geo_id, ids).await?;
        self.storage.list_brand_lists(geo_id).await
    }

    async fn owned_list(&self, geo_id: i32, list_id: i32) -> Result<BrandList> {
        self.storage
            .get_brand_list(list_id)
            .await?
            .filter(|l| l.geo_id == geo_id)
            .ok_or_else(|| {
                TrackdeskError::not_found(format!(
                    "Brand list {} not found in GEO {}",
                    list_id, geo_id
                ))
            })
    }
}

fn normalize_code(label: &str) -> Result<String> {
    let code = normalize_geo(label);
    if code.is_empty() {
        return Err(TrackdeskError::validation(format!(
            "'{}' does not contain a usable GEO code",
            label
        )));
    }
    Ok(code)
}

fn validate_list_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TrackdeskError::validation("Brand list name cannot be empty"));
    }
    Ok(name.to_string())
}

fn validate_order(ids: &[i32]) -> Result<()> {
    if ids.is_empty() {
        return Err(TrackdeskError::validation("Order cannot be empty"));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = ids.iter().find(|id| !seen.insert(**id)) {
        return Err(TrackdeskError::validation(format!(
            "Id {} appears more than once",
            dup
        )));
    }
    Ok(())
}
