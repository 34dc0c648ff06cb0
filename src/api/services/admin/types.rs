//! Admin API 类型定义
//!
//! 请求体与批量操作响应；领域模型（Website、SubId、Geo...）直接序列化返回。

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::affiliate::comment::TrackerComment;
use crate::affiliate::params::TrackingParam;
use crate::config::TS_EXPORT_PATH;
use crate::services::{
    BatchFailedItem, BatchOutcome, CommentBatchOutcome, CommentSyncOutcome, PostedCommentResult,
};
use crate::storage::{BrandStatus, Ranking, RankingInput, SubId};

/// 统一响应信封
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

// ============ Websites ============

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct PostNewWebsite {
    pub name: String,
    /// Sub-ID 模板，例如 `SITE-{YYYY}{MM}-{SEQ:4}`
    pub format_pattern: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct UpdateWebsite {
    pub name: Option<String>,
    pub format_pattern: Option<String>,
}

// ============ Sub-IDs ============

#[derive(Serialize, Deserialize, Clone, Debug, Default, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct GetSubIdsQuery {
    pub search: Option<String>,
    pub linked: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct PostNewSubId {
    pub value: Option<String>,
    pub url: Option<String>,
    pub task_id: Option<String>,
}

/// 空字符串表示清空 `url` / `task_id`
#[derive(Serialize, Deserialize, Clone, Debug, Default, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct UpdateSubId {
    pub value: Option<String>,
    pub url: Option<String>,
    pub task_id: Option<String>,
    pub comment_posted: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct GenerateSubIdsRequest {
    pub count: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct ImportSubIdRow {
    pub value: String,
    pub url: Option<String>,
    pub task_id: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct ImportSubIdsRequest {
    pub items: Vec<ImportSubIdRow>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct ExportQuery {
    /// 2 或 4，默认 2
    pub columns: Option<u8>,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct BulkCommentRequest {
    pub ids: Vec<i32>,
    /// 已发送过的也重新发送
    pub force: Option<bool>,
}

// ============ GEOs / brands / rankings ============

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct PostNewGeo {
    pub code: String,
    pub name: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct UpdateGeo {
    pub code: Option<String>,
    pub name: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct ReorderRequest {
    pub ids: Vec<i32>,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct GeoLabelQuery {
    pub label: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct BrandListRequest {
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct GetBrandsQuery {
    pub status: Option<BrandStatus>,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct PostNewBrand {
    pub name: String,
    pub default_url: Option<String>,
    pub status: Option<BrandStatus>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct UpdateBrand {
    pub name: Option<String>,
    /// 空字符串表示移除默认链接
    pub default_url: Option<String>,
    pub status: Option<BrandStatus>,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct RankingsRequest {
    pub rankings: Vec<RankingInput>,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct LineupQuery {
    pub sub_id: String,
}

// ============ Tools ============

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct TrackingParamRequest {
    pub url: String,
    /// 提供时返回替换后的链接
    pub new_value: Option<String>,
    /// 仅替换值等于该值的参数
    pub old_value: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct TrackingParamResponse {
    pub url: String,
    pub param: Option<TrackingParam>,
    pub cloaked: bool,
    pub rewritten: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct CommentToolRequest {
    pub description: String,
    pub task_id: String,
    pub sub_id: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct CommentToolResponse {
    pub comment: TrackerComment,
    pub text: String,
    pub fallback: bool,
    pub links: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct GeoLabelResponse {
    pub input: String,
    pub code: String,
    pub alias_matched: bool,
}

// ============ Batch responses ============

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct BatchFailedItemResponse {
    pub key: String,
    pub reason: String,
}

impl From<BatchFailedItem> for BatchFailedItemResponse {
    fn from(item: BatchFailedItem) -> Self {
        Self {
            key: item.key,
            reason: item.reason,
        }
    }
}

fn failed_items(items: Vec<BatchFailedItem>) -> Vec<BatchFailedItemResponse> {
    items.into_iter().map(Into::into).collect()
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct SubIdBatchResponse {
    pub success: Vec<SubId>,
    pub failed: Vec<BatchFailedItemResponse>,
}

impl From<BatchOutcome<SubId>> for SubIdBatchResponse {
    fn from(outcome: BatchOutcome<SubId>) -> Self {
        Self {
            success: outcome.success,
            failed: failed_items(outcome.failed),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct RankingBatchResponse {
    pub success: Vec<Ranking>,
    pub failed: Vec<BatchFailedItemResponse>,
}

impl From<BatchOutcome<Ranking>> for RankingBatchResponse {
    fn from(outcome: BatchOutcome<Ranking>) -> Self {
        Self {
            success: outcome.success,
            failed: failed_items(outcome.failed),
        }
    }
}

#[derive(Serialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct CommentBatchResponse {
    pub posted: Vec<PostedCommentResult>,
    pub skipped: Vec<i32>,
    pub failed: Vec<BatchFailedItemResponse>,
}

impl From<CommentBatchOutcome> for CommentBatchResponse {
    fn from(outcome: CommentBatchOutcome) -> Self {
        Self {
            posted: outcome.posted,
            skipped: outcome.skipped,
            failed: failed_items(outcome.failed),
        }
    }
}

#[derive(Serialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct CommentSyncResponse {
    pub checked: usize,
    pub marked: Vec<SubId>,
    pub failed: Vec<BatchFailedItemResponse>,
}

impl From<CommentSyncOutcome> for CommentSyncResponse {
    fn from(outcome: CommentSyncOutcome) -> Self {
        Self {
            checked: outcome.checked,
            marked: outcome.marked,
            failed: failed_items(outcome.failed),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct DeletedResponse {
    pub id: i32,
}
