//! Brand management service

use std::sync::Arc;

use tracing::info;

use crate::errors::{Result, TrackdeskError};
use crate::storage::{Brand, BrandStatus, SeaOrmStorage};
use crate::utils::url_validator::normalize_optional_url;

#[derive(Debug, Clone, Default)]
pub struct CreateBrandRequest {
    pub name: String,
    pub default_url: Option<String>,
    pub status: Option<BrandStatus>,
}

/// Request to update a brand
///
/// `None` keeps the current value; `default_url: Some("")` removes it.
#[derive(Debug, Clone, Default)]
pub struct UpdateBrandRequest {
    pub name: Option<String>,
    pub default_url: Option<String>,
    pub status: Option<BrandStatus>,
}

pub struct BrandService {
    storage: Arc<SeaOrmStorage>,
}

impl BrandService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn list_brands(&self, status: Option<BrandStatus>) -> Result<Vec<Brand>> {
        self.storage.list_brands(status).await
    }

    pub async fn get_brand(&self, id: i32) -> Result<Brand> {
        self.storage
            .get_brand(id)
            .await?
            .ok_or_else(|| TrackdeskError::not_found(format!("Brand {} not found", id)))
    }

    pub async fn create_brand(&self, req: CreateBrandRequest) -> Result<Brand> {
        let name = validate_name(&req.name)?;
        let default_url = normalize_optional_url(req.default_url.as_deref())?;

        if self.storage.find_brand_by_name(&name).await?.is_some() {
            return Err(TrackdeskError::conflict(format!("Brand '{}' already exists", name)));
        }

        let brand = self
            .storage
            .insert_brand(&name, default_url, req.status.unwrap_or_default())
            .await?;
        info!("BrandService: created '{}'", brand.name);
        Ok(brand)
    }

    pub async fn update_brand(&self, id: i32, req: UpdateBrandRequest) -> Result<Brand> {
        let mut brand = self.get_brand(id).await?;

        if let Some(name) = req.name {
            let name = validate_name(&name)?;
            if name != brand.name
                && let Some(other) = self.storage.find_brand_by_name(&name).await?
                && other.id != id
            {
                return Err(TrackdeskError::conflict(format!("Brand '{}' already exists", name)));
            }
            brand.name = name;
        }
        if let Some(url) = req.default_url.as_deref() {
            brand.default_url = normalize_optional_url(Some(url))?;
        }
        if let Some(status) = req.status {
            brand.status = status;
        }

        let updated = self.storage.update_brand(&brand).await?;
        info!("BrandService: updated '{}' (status={})", updated.name, updated.status);
        Ok(updated)
    }

    pub async fn delete_brand(&self, id: i32) -> Result<()> {
        if !self.storage.delete_brand(id).await? {
            return Err(TrackdeskError::not_found(format!("Brand {} not found", id)));
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TrackdeskError::validation("Brand name cannot be empty"));
    }
    Ok(name.to_string())
}
