//! Website management service

use std::sync::Arc;

use tracing::info;

use super::sub_id_format::SubIdPattern;
use crate::errors::{Result, TrackdeskError};
use crate::storage::{SeaOrmStorage, Website};

/// Request to create a website
#[derive(Debug, Clone)]
pub struct CreateWebsiteRequest {
    pub name: String,
    /// Empty = `{RAND:8}`
    pub format_pattern: Option<String>,
}

/// Request to update a website (None = keep existing)
#[derive(Debug, Clone, Default)]
pub struct UpdateWebsiteRequest {
    pub name: Option<String>,
    pub format_pattern: Option<String>,
}

pub struct WebsiteService {
    storage: Arc<SeaOrmStorage>,
}

impl WebsiteService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn list_websites(&self) -> Result<Vec<Website>> {
        self.storage.list_websites().await
    }

    pub async fn get_website(&self, id: i32) -> Result<Website> {
        self.storage
            .get_website(id)
            .await?
            .ok_or_else(|| TrackdeskError::not_found(format!("Website {} not found", id)))
    }

    pub async fn create_website(&self, req: CreateWebsiteRequest) -> Result<Website> {
        let name = validate_name(&req.name)?;
        let pattern = req.format_pattern.unwrap_or_default().trim().to_string();
        SubIdPattern::parse(&pattern)?;

        if self.storage.find_website_by_name(&name).await?.is_some() {
            return Err(TrackdeskError::conflict(format!(
                "Website '{}' already exists",
                name
            )));
        }

        let website = self.storage.insert_website(&name, &pattern).await?;
        info!("WebsiteService: created '{}' (id={})", website.name, website.id);
        Ok(website)
    }

    pub async fn update_website(&self, id: i32, req: UpdateWebsiteRequest) -> Result<Website> {
        let existing = self.get_website(id).await?;

        let name = match req.name {
            Some(name) => validate_name(&name)?,
            None => existing.name.clone(),
        };
        if name != existing.name
            && let Some(other) = self.storage.find_website_by_name(&name).await?
            && other.id != id
        {
            return Err(TrackdeskError::conflict(format!(
                "Website '{}' already exists",
                name
            )));
        }

        let pattern = match req.format_pattern {
            Some(p) => {
                let p = p.trim().to_string();
                SubIdPattern::parse(&p)?;
                p
            }
            None => existing.format_pattern,
        };

        let website = self.storage.update_website(id, &name, &pattern).await?;
        info!("WebsiteService: updated website {}", id);
        Ok(website)
    }

    /// 删除网站及其 Sub-ID；存在不可变 Sub-ID 时拒绝
    pub async fn delete_website(&self, id: i32) -> Result<()> {
        let website = self.get_website(id).await?;

        // 不可变检查与删除在同一事务内完成
        if !self.storage.delete_website(id).await? {
            return Err(TrackdeskError::not_found(format!("Website {} not found", id)));
        }
        info!("WebsiteService: deleted '{}' (id={})", website.name, id);
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TrackdeskError::validation("Website name cannot be empty"));
    }
    Ok(name.to_string())
}
