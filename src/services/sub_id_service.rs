//! Sub-ID management service
//!
//! Generation, immutability rules, bulk import/generate and CSV export.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::sub_id_format::SubIdPattern;
use super::{BatchOutcome, DEFAULT_MAX_BATCH_SIZE, check_batch_size};
use crate::errors::{Result, TrackdeskError};
use crate::storage::{NewSubId, SeaOrmStorage, SubId, SubIdFilter, Website};
use crate::utils::csv_handler::{ExportColumns, sub_ids_to_csv};
use crate::utils::url_validator::normalize_optional_url;

/// Collision retries before giving up on a generated value
pub const MAX_GENERATE_ATTEMPTS: u64 = 10;

// ============ Request DTOs ============

/// Request to create a Sub-ID
#[derive(Debug, Clone, Default)]
pub struct CreateSubIdRequest {
    /// Explicit value (None = generate from the website pattern)
    pub value: Option<String>,
    /// Destination URL; supplying one locks the record
    pub url: Option<String>,
    pub task_id: Option<String>,
}

/// Request to update a Sub-ID
///
/// `None` keeps the current value; `Some("")` clears `url`/`task_id`.
#[derive(Debug, Clone, Default)]
pub struct UpdateSubIdRequest {
    pub value: Option<String>,
    pub url: Option<String>,
    pub task_id: Option<String>,
    pub comment_posted: Option<bool>,
}

/// Single bulk-import item
#[derive(Debug, Clone, Default)]
pub struct ImportSubIdItem {
    pub value: String,
    pub url: Option<String>,
    pub task_id: Option<String>,
}

/// Export payload
#[derive(Debug, Clone)]
pub struct SubIdExport {
    pub filename: String,
    pub content: String,
    pub rows: usize,
}

// ============ SubIdService Implementation ============

pub struct SubIdService {
    storage: Arc<SeaOrmStorage>,
    max_batch_size: usize,
}

impl SubIdService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self {
            storage,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }

    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size.max(1);
        self
    }

    async fn website(&self, website_id: i32) -> Result<Website> {
        self.storage
            .get_website(website_id)
            .await?
            .ok_or_else(|| TrackdeskError::not_found(format!("Website {} not found", website_id)))
    }

    pub async fn list_sub_ids(&self, website_id: i32, filter: SubIdFilter) -> Result<Vec<SubId>> {
        self.website(website_id).await?;
        self.storage.list_sub_ids(website_id, &filter).await
    }

    pub async fn get_sub_id(&self, id: i32) -> Result<SubId> {
        self.storage
            .get_sub_id(id)
            .await?
            .ok_or_else(|| TrackdeskError::not_found(format!("Sub-ID {} not found", id)))
    }

    /// 根据网站模板生成一个未被占用的值
    pub async fn generate_value(&self, website: &Website) -> Result<String> {
        let pattern = SubIdPattern::parse(&website.format_pattern)?;
        let base_seq = if pattern.uses_sequence() {
            self.storage.count_sub_ids(website.id).await? + 1
        } else {
            0
        };

        for attempt in 0..MAX_GENERATE_ATTEMPTS {
            let value = pattern.render(Utc::now(), base_seq + attempt);
            if !self.storage.sub_id_value_exists(&value).await? {
                return Ok(value);
            }
            debug!(
                "Generated Sub-ID '{}' collides (attempt {}/{})",
                value,
                attempt + 1,
                MAX_GENERATE_ATTEMPTS
            );
            if pattern.is_constant_per_day() {
                break;
            }
        }

        Err(TrackdeskError::conflict(format!(
            "Could not generate a unique Sub-ID for website '{}'",
            website.name
        )))
    }

    pub async fn create_sub_id(&self, website_id: i32, req: CreateSubIdRequest) -> Result<SubId> {
        let website = self.website(website_id).await?;
        let url = normalize_optional_url(req.url.as_deref())?;

        let value = match req.value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => {
                validate_value(v)?;
                if self.storage.sub_id_value_exists(v).await? {
                    return Err(TrackdeskError::conflict(format!(
                        "Sub-ID '{}' already exists",
                        v
                    )));
                }
                v.to_string()
            }
            None => self.generate_value(&website).await?,
        };

        let record = self
            .storage
            .insert_sub_id(&NewSubId {
                website_id,
                value,
                is_immutable: url.is_some(),
                url,
                task_id: normalize_task_id(req.task_id.as_deref()),
                comment_posted: false,
            })
            .await?;

        info!(
            "SubIdService: created '{}' for website '{}'",
            record.value, website.name
        );
        Ok(record)
    }

    pub async fn update_sub_id(&self, id: i32, req: UpdateSubIdRequest) -> Result<SubId> {
        let mut record = self.get_sub_id(id).await?;

        if let Some(value) = req.value.as_deref().map(str::trim)
            && value != record.value
        {
            if record.is_immutable {
                return Err(TrackdeskError::immutable(format!(
                    "Sub-ID '{}' is immutable; its value cannot change",
                    record.value
                )));
            }
            validate_value(value)?;
            if self.storage.sub_id_value_exists(value).await? {
                return Err(TrackdeskError::conflict(format!(
                    "Sub-ID '{}' already exists",
                    value
                )));
            }
            record.value = value.to_string();
        }

        if let Some(url) = req.url.as_deref() {
            let url = normalize_optional_url(Some(url))?;
            if url != record.url {
                if record.is_immutable {
                    return Err(TrackdeskError::immutable(format!(
                        "Sub-ID '{}' is immutable; its URL cannot change",
                        record.value
                    )));
                }
                // 设置 URL 后锁定
                record.is_immutable = url.is_some();
                record.url = url;
            }
        }

        if let Some(task_id) = req.task_id.as_deref() {
            record.task_id = normalize_task_id(Some(task_id));
        }
        if let Some(posted) = req.comment_posted {
            record.comment_posted = posted;
        }

        let updated = self.storage.update_sub_id(&record).await?;
        info!("SubIdService: updated '{}'", updated.value);
        Ok(updated)
    }

    pub async fn delete_sub_id(&self, id: i32) -> Result<()> {
        let record = self.get_sub_id(id).await?;
        if record.is_immutable {
            return Err(TrackdeskError::immutable(format!(
                "Sub-ID '{}' is immutable and cannot be deleted",
                record.value
            )));
        }

        if !self.storage.delete_sub_id(id).await? {
            return Err(TrackdeskError::not_found(format!("Sub-ID {} not found", id)));
        }
        info!("SubIdService: deleted '{}'", record.value);
        Ok(())
    }

    /// 逐项导入；带 URL 的条目写入后即不可变
    pub async fn import_sub_ids(
        &self,
        website_id: i32,
        items: Vec<ImportSubIdItem>,
    ) -> Result<BatchOutcome<SubId>> {
        check_batch_size(items.len(), self.max_batch_size)?;
        self.website(website_id).await?;

        let mut outcome = BatchOutcome::default();
        let mut seen: HashSet<String> = HashSet::new();

        for item in items {
            let value = item.value.trim().to_string();
            if !seen.insert(value.clone()) {
                outcome.push_failure(value, "Duplicate value in batch");
                continue;
            }
            let result = self.import_one(website_id, &value, item).await;
            outcome.record(value, result);
        }

        info!(
            "SubIdService: import into website {} finished ({} created, {} failed)",
            website_id,
            outcome.success.len(),
            outcome.failed.len()
        );
        Ok(outcome)
    }

    async fn import_one(&self, website_id: i32, value: &str, item: ImportSubIdItem) -> Result<SubId> {
        validate_value(value)?;
        let url = normalize_optional_url(item.url.as_deref())?;
        if self.storage.sub_id_value_exists(value).await? {
            return Err(TrackdeskError::conflict(format!(
                "Sub-ID '{}' already exists",
                value
            )));
        }

        self.storage
            .insert_sub_id(&NewSubId {
                website_id,
                value: value.to_string(),
                is_immutable: url.is_some(),
                url,
                task_id: normalize_task_id(item.task_id.as_deref()),
                comment_posted: false,
            })
            .await
    }

    /// 连续生成 `count` 个新值，单项失败不影响其余
    pub async fn generate_sub_ids(&self, website_id: i32, count: usize) -> Result<BatchOutcome<SubId>> {
        check_batch_size(count, self.max_batch_size)?;
        let website = self.website(website_id).await?;

        let mut outcome = BatchOutcome::default();
        for index in 0..count {
            let result = match self.generate_value(&website).await {
                Ok(value) => {
                    self.storage
                        .insert_sub_id(&NewSubId {
                            website_id,
                            value,
                            ..Default::default()
                        })
                        .await
                }
                Err(e) => Err(e),
            };
            outcome.record(format!("#{}", index + 1), result);
        }

        info!(
            "SubIdService: generated {} Sub-IDs for '{}' ({} failed)",
            outcome.success.len(),
            website.name,
            outcome.failed.len()
        );
        Ok(outcome)
    }

    pub async fn export_sub_ids(&self, website_id: i32, columns: ExportColumns) -> Result<SubIdExport> {
        let website = self.website(website_id).await?;
        let records = self
            .storage
            .list_sub_ids(website_id, &SubIdFilter::default())
            .await?;

        let content = sub_ids_to_csv(&records, columns)?;
        Ok(SubIdExport {
            filename: crate::utils::csv_handler::generate_export_filename(&website.name),
            content,
            rows: records.len(),
        })
    }
}

fn validate_value(value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(TrackdeskError::validation("Sub-ID value cannot be empty"));
    }
    if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(TrackdeskError::validation(format!(
            "Sub-ID '{}' must not contain whitespace",
            value
        )));
    }
    Ok(())
}

fn normalize_task_id(task_id: Option<&str>) -> Option<String> {
    task_id
        .map(|t| t.trim().trim_start_matches('#'))
        .filter(|t| !t.is_empty())
        .map(String::from)
}
