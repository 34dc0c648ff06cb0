//! Task reconciliation service
//!
//! Reads tasks from the tracker, builds lineup comments for Sub-IDs and
//! keeps the `comment_posted` flags in step with what the tracker holds.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use ts_rs::TS;

use super::geo_service::{GeoResolution, GeoService};
use super::{BatchFailedItem, DEFAULT_MAX_BATCH_SIZE, check_batch_size};
use crate::affiliate::comment::{TrackerComment, build_comment};
use crate::affiliate::lineup::extract_links;
use crate::affiliate::params::{TrackingParam, resolve_tracking_param};
use crate::config::{TS_EXPORT_PATH, TrackerConfig};
use crate::errors::{Result, TrackdeskError};
use crate::storage::{SeaOrmStorage, SubId, SubIdFilter};
use crate::tracker::{TaskTracker, find_field, resolve_field_value};

// ============ Response DTOs ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct ResolvedField {
    pub name: String,
    pub field_type: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct LineupLink {
    pub url: String,
    pub tracking_param: Option<TrackingParam>,
}

/// Task overview for the reconciliation screen.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct TaskSummary {
    pub task_id: String,
    pub name: String,
    pub status: Option<String>,
    pub url: Option<String>,
    pub custom_fields: Vec<ResolvedField>,
    pub brand: Option<String>,
    pub geo_label: Option<String>,
    pub geo: Option<GeoResolution>,
    /// GEO field missing or not configured
    pub needs_setup: bool,
    pub has_lineup: bool,
    pub links: Vec<LineupLink>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct CommentPreview {
    pub sub_id: SubId,
    pub task_id: String,
    pub comment: TrackerComment,
    pub text: String,
    pub fallback: bool,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct PostedCommentResult {
    pub sub_id: SubId,
    pub comment_id: String,
    pub fallback: bool,
}

/// Outcome of posting comments for many Sub-IDs.
#[derive(Debug, Clone, Default)]
pub struct CommentBatchOutcome {
    pub posted: Vec<PostedCommentResult>,
    /// Already posted, not forced
    pub skipped: Vec<i32>,
    pub failed: Vec<BatchFailedItem>,
}

/// Outcome of a comment-flag sync.
#[derive(Debug, Clone, Default)]
pub struct CommentSyncOutcome {
    pub checked: usize,
    pub marked: Vec<SubId>,
    pub failed: Vec<BatchFailedItem>,
}

// ============ TaskService Implementation ============

pub struct TaskService {
    storage: Arc<SeaOrmStorage>,
    tracker: Arc<dyn TaskTracker>,
    geo_field: String,
    brand_field: String,
    max_batch_size: usize,
}

impl TaskService {
    pub fn new(storage: Arc<SeaOrmStorage>, tracker: Arc<dyn TaskTracker>) -> Self {
        let defaults = TrackerConfig::default();
        Self {
            storage,
            tracker,
            geo_field: defaults.geo_field,
            brand_field: defaults.brand_field,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }

    pub fn with_field_names(mut self, geo_field: &str, brand_field: &str) -> Self {
        self.geo_field = geo_field.to_string();
        self.brand_field = brand_field.to_string();
        self
    }

    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size.max(1);
        self
    }

    pub async fn task_summary(&self, task_id: &str) -> Result<TaskSummary> {
        let task = self.tracker.get_task(task_id).await?;

        let custom_fields = task
            .custom_fields
            .iter()
            .map(|f| ResolvedField {
                name: f.name.clone(),
                field_type: f.field_type.clone(),
                value: resolve_field_value(f),
            })
            .collect();

        let brand = find_field(&task.custom_fields, &self.brand_field).and_then(resolve_field_value);
        let geo_label = find_field(&task.custom_fields, &self.geo_field).and_then(resolve_field_value);
        let geo = match geo_label.as_deref() {
            Some(label) => Some(
                GeoService::new(self.storage.clone())
                    .resolve_label(label)
                    .await?,
            ),
            None => None,
        };
        let needs_setup = !geo.as_ref().is_some_and(|g| g.known);

        let found = extract_links(task.description_text());
        let has_lineup = found.is_some();
        let links = found
            .unwrap_or_default()
            .into_iter()
            .map(|url| LineupLink {
                tracking_param: resolve_tracking_param(&url),
                url,
            })
            .collect();

        Ok(TaskSummary {
            task_id: task.id.clone(),
            name: task.name.clone(),
            status: task.status.as_ref().map(|s| s.status.clone()),
            url: task.url.clone(),
            custom_fields,
            brand,
            geo_label,
            geo,
            needs_setup,
            has_lineup,
            links,
        })
    }

    async fn linked_sub_id(&self, sub_id: i32) -> Result<(SubId, String)> {
        let record = self
            .storage
            .get_sub_id(sub_id)
            .await?
            .ok_or_else(|| TrackdeskError::not_found(format!("Sub-ID {} not found", sub_id)))?;
        let task_id = record
            .task_id
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                TrackdeskError::validation(format!(
                    "Sub-ID '{}' is not linked to a task",
                    record.value
                ))
            })?;
        Ok((record, task_id))
    }

    pub async fn preview_comment(&self, sub_id: i32) -> Result<CommentPreview> {
        let (record, task_id) = self.linked_sub_id(sub_id).await?;
        let task = self.tracker.get_task(&task_id).await?;
        let comment = build_comment(task.description_text(), &task_id, &record.value);

        Ok(CommentPreview {
            text: comment.plain_text(),
            fallback: comment.is_fallback(),
            sub_id: record,
            task_id,
            comment,
        })
    }

    /// 构建并发送评论，成功后标记 `comment_posted`
    pub async fn post_comment(&self, sub_id: i32) -> Result<PostedCommentResult> {
        let (record, task_id) = self.linked_sub_id(sub_id).await?;
        self.post_for(record, &task_id).await
    }

    async fn post_for(&self, mut record: SubId, task_id: &str) -> Result<PostedCommentResult> {
        let task = self.tracker.get_task(task_id).await?;
        let comment = build_comment(task.description_text(), task_id, &record.value);
        let posted = self.tracker.post_comment(task_id, &comment).await?;

        self.storage.set_comment_posted(record.id, true).await?;
        record.comment_posted = true;

        info!(
            "TaskService: posted comment {} for '{}' on task {}",
            posted.id_string(),
            record.value,
            task_id
        );
        Ok(PostedCommentResult {
            sub_id: record,
            comment_id: posted.id_string(),
            fallback: comment.is_fallback(),
        })
    }

    /// 顺序发送；已发送的跳过（除非 force），单项失败记录后继续
    pub async fn bulk_post_comments(&self, ids: Vec<i32>, force: bool) -> Result<CommentBatchOutcome> {
        check_batch_size(ids.len(), self.max_batch_size)?;

        let mut outcome = CommentBatchOutcome::default();
        let mut seen = HashSet::new();
        for id in ids {
            if !seen.insert(id) {
                continue;
            }
            let result = match self.linked_sub_id(id).await {
                Ok((record, _)) if record.comment_posted && !force => {
                    outcome.skipped.push(id);
                    continue;
                }
                Ok((record, task_id)) => self.post_for(record, &task_id).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(posted) => outcome.posted.push(posted),
                Err(e) => {
                    warn!("TaskService: comment for Sub-ID {} failed: {}", id, e);
                    outcome.failed.push(BatchFailedItem {
                        key: id.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            "TaskService: bulk comments done ({} posted, {} skipped, {} failed)",
            outcome.posted.len(),
            outcome.skipped.len(),
            outcome.failed.len()
        );
        Ok(outcome)
    }

    /// 对网站下已关联任务但未标记的 Sub-ID，检查任务评论中是否已出现其值
    pub async fn sync_comment_flags(&self, website_id: i32) -> Result<CommentSyncOutcome> {
        if self.storage.get_website(website_id).await?.is_none() {
            return Err(TrackdeskError::not_found(format!(
                "Website {} not found",
                website_id
            )));
        }

        let filter = SubIdFilter {
            linked: Some(true),
            ..Default::default()
        };
        let candidates: Vec<SubId> = self
            .storage
            .list_sub_ids(website_id, &filter)
            .await?
            .into_iter()
            .filter(|s| !s.comment_posted)
            .collect();

        let mut outcome = CommentSyncOutcome::default();
        for mut record in candidates {
            let Some(task_id) = record.task_id.clone() else {
                continue;
            };
            outcome.checked += 1;

            let found = match self.tracker.list_comments(&task_id).await {
                Ok(comments) => comments.iter().any(|c| c.comment_text.contains(&record.value)),
                Err(e) => {
                    warn!(
                        "TaskService: listing comments of task {} failed: {}",
                        task_id, e
                    );
                    outcome.failed.push(BatchFailedItem {
                        key: record.value.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if found {
                if let Err(e) = self.storage.set_comment_posted(record.id, true).await {
                    outcome.failed.push(BatchFailedItem {
                        key: record.value.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
                record.comment_posted = true;
                outcome.marked.push(record);
            }
        }

        info!(
            "TaskService: synced website {} ({} checked, {} marked, {} failed)",
            website_id,
            outcome.checked,
            outcome.marked.len(),
            outcome.failed.len()
        );
        Ok(outcome)
    }
}
