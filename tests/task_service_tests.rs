//! Task reconciliation tests
//!
//! The tracker is replaced by an in-memory mock; storage is a temporary
//! SQLite database.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use tempfile::TempDir;

use trackdesk::affiliate::TrackerComment;
use trackdesk::config::DatabaseConfig;
use trackdesk::errors::{Result, TrackdeskError};
use trackdesk::services::{
    CreateGeoRequest, CreateSubIdRequest, CreateWebsiteRequest, GeoService, SubIdService,
    TaskService, WebsiteService,
};
use trackdesk::storage::{SeaOrmStorage, SubId, Website};
use trackdesk::tracker::{CustomField, PostedComment, Task, TaskComment, TaskTracker};

const LINEUP: &str = "Intro text\n\
                      ## 🎯 TOP PICKS LINEUP\n\
                      | Brand | Link |\n\
                      |---|---|\n\
                      | Brand X | https://aff.example.com/click?clickid=t1 |\n\
                      | Brand Y | https://go.linkcloak.io/brand-y |\n\
                      ## Notes\n\
                      done";

// =============================================================================
// Mock tracker
// =============================================================================

#[derive(Default)]
struct MockTracker {
    tasks: HashMap<String, Task>,
    comments: HashMap<String, Vec<TaskComment>>,
    /// task ids whose comment listing fails
    broken: Vec<String>,
    posted: Mutex<Vec<(String, TrackerComment)>>,
}

impl MockTracker {
    fn with_task(mut self, task: Task) -> Self {
        self.tasks.insert(task.id.clone(), task);
        self
    }

    fn with_comment(mut self, task_id: &str, text: &str) -> Self {
        let list = self.comments.entry(task_id.to_string()).or_default();
        list.push(TaskComment {
            id: format!("c{}", list.len() + 1),
            comment_text: text.to_string(),
            date: None,
        });
        self
    }

    fn posted(&self) -> Vec<(String, TrackerComment)> {
        self.posted.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskTracker for MockTracker {
    async fn get_task(&self, task_id: &str) -> Result<Task> {
        self.tasks
            .get(task_id)
            .cloned()
            .ok_or_else(|| TrackdeskError::tracker_not_found(format!("Task {} not found", task_id)))
    }

    async fn list_comments(&self, task_id: &str) -> Result<Vec<TaskComment>> {
        if self.broken.iter().any(|t| t == task_id) {
            return Err(TrackdeskError::tracker_request("connection reset"));
        }
        Ok(self.comments.get(task_id).cloned().unwrap_or_default())
    }

    async fn post_comment(&self, task_id: &str, comment: &TrackerComment) -> Result<PostedComment> {
        self.get_task(task_id).await?;
        let mut posted = self.posted.lock().unwrap();
        posted.push((task_id.to_string(), comment.clone()));
        Ok(PostedComment {
            id: json!(posted.len()),
            date: None,
        })
    }
}

fn task(id: &str, description: &str) -> Task {
    Task {
        id: id.to_string(),
        name: format!("Task {}", id),
        markdown_description: Some(description.to_string()),
        ..Default::default()
    }
}

// =============================================================================
// Test Setup
// =============================================================================

async fn setup() -> (TempDir, Arc<SeaOrmStorage>, Website) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("task_test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let storage = Arc::new(
        SeaOrmStorage::new(&db_url, "sqlite", &DatabaseConfig::default())
            .await
            .expect("Failed to create storage"),
    );
    let site = WebsiteService::new(storage.clone())
        .create_website(CreateWebsiteRequest {
            name: "reviews.example".into(),
            format_pattern: None,
        })
        .await
        .expect("create website");
    (temp_dir, storage, site)
}

async fn sub_id(storage: &Arc<SeaOrmStorage>, site: &Website, value: &str, task: Option<&str>) -> SubId {
    SubIdService::new(storage.clone())
        .create_sub_id(
            site.id,
            CreateSubIdRequest {
                value: Some(value.to_string()),
                url: None,
                task_id: task.map(String::from),
            },
        )
        .await
        .expect("create sub id")
}

fn service(storage: &Arc<SeaOrmStorage>, tracker: Arc<MockTracker>) -> TaskService {
    TaskService::new(storage.clone(), tracker)
}

// =============================================================================
// Task summary
// =============================================================================

#[tokio::test]
async fn test_task_summary_resolves_fields_and_links() {
    let (_dir, storage, _site) = setup().await;
    GeoService::new(storage.clone())
        .create_geo(CreateGeoRequest {
            code: "UK".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    let mut t = task("t1", LINEUP);
    t.custom_fields = vec![
        serde_json::from_value::<CustomField>(json!({
            "id": "f1",
            "name": "geo",
            "type": "drop_down",
            "value": 1,
            "type_config": { "options": [
                { "id": "o0", "name": "Germany", "orderindex": 0 },
                { "id": "o1", "name": "United Kingdom", "orderindex": 1 }
            ]}
        }))
        .unwrap(),
        serde_json::from_value::<CustomField>(json!({
            "id": "f2",
            "name": "Brand",
            "type": "short_text",
            "value": "Brand X"
        }))
        .unwrap(),
    ];
    let tracker = Arc::new(MockTracker::default().with_task(t));

    let summary = service(&storage, tracker).task_summary("t1").await.unwrap();
    assert_eq!(summary.name, "Task t1");
    assert_eq!(summary.brand.as_deref(), Some("Brand X"));
    assert_eq!(summary.geo_label.as_deref(), Some("United Kingdom"));
    let geo = summary.geo.unwrap();
    assert_eq!(geo.code, "UK");
    assert!(geo.known);
    assert!(!summary.needs_setup);
    assert!(summary.has_lineup);
    assert_eq!(summary.links.len(), 1);
    assert_eq!(summary.links[0].url, "https://aff.example.com/click?clickid=t1");
    assert_eq!(summary.links[0].tracking_param.as_ref().unwrap().name, "clickid");
    assert_eq!(summary.custom_fields.len(), 2);
}

#[tokio::test]
async fn test_task_summary_without_geo_needs_setup() {
    let (_dir, storage, _site) = setup().await;
    let tracker = Arc::new(MockTracker::default().with_task(task("t2", "no lineup here")));

    let summary = service(&storage, tracker).task_summary("t2").await.unwrap();
    assert!(summary.geo.is_none());
    assert!(summary.needs_setup);
    assert!(!summary.has_lineup);
    assert!(summary.links.is_empty());
}

#[tokio::test]
async fn test_task_summary_unknown_task() {
    let (_dir, storage, _site) = setup().await;
    let err = service(&storage, Arc::new(MockTracker::default()))
        .task_summary("missing")
        .await
        .unwrap_err();
    assert!(matches!(err, TrackdeskError::TrackerNotFound(_)));
}

// =============================================================================
// Comments
// =============================================================================

#[tokio::test]
async fn test_preview_requires_linked_task() {
    let (_dir, storage, site) = setup().await;
    let record = sub_id(&storage, &site, "FREE-1", None).await;

    let err = service(&storage, Arc::new(MockTracker::default()))
        .preview_comment(record.id)
        .await
        .unwrap_err();
    assert!(matches!(err, TrackdeskError::Validation(_)));
}

#[tokio::test]
async fn test_preview_rewrites_lineup() {
    let (_dir, storage, site) = setup().await;
    let record = sub_id(&storage, &site, "SID-42", Some("t1")).await;
    let tracker = Arc::new(MockTracker::default().with_task(task("t1", LINEUP)));

    let preview = service(&storage, tracker.clone())
        .preview_comment(record.id)
        .await
        .unwrap();
    assert!(!preview.fallback);
    assert_eq!(preview.task_id, "t1");
    assert!(preview.text.contains("Sub-ID: SID-42"));
    assert!(preview.text.contains("https://aff.example.com/click?clickid=SID-42"));
    assert!(!preview.text.contains("linkcloak"));
    // preview never posts
    assert!(tracker.posted().is_empty());
    assert!(!storage.get_sub_id(record.id).await.unwrap().unwrap().comment_posted);
}

#[tokio::test]
async fn test_post_comment_marks_sub_id() {
    let (_dir, storage, site) = setup().await;
    let record = sub_id(&storage, &site, "SID-9", Some("t3")).await;
    let tracker = Arc::new(MockTracker::default().with_task(task("t3", "plain brief")));

    let result = service(&storage, tracker.clone())
        .post_comment(record.id)
        .await
        .unwrap();
    assert!(result.fallback);
    assert!(result.sub_id.comment_posted);
    assert_eq!(result.comment_id, "1");

    let posted = tracker.posted();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].0, "t3");
    assert_eq!(posted[0].1.plain_text(), "Sub-ID: SID-9");
    assert!(storage.get_sub_id(record.id).await.unwrap().unwrap().comment_posted);
}

#[tokio::test]
async fn test_post_comment_failure_leaves_flag() {
    let (_dir, storage, site) = setup().await;
    let record = sub_id(&storage, &site, "SID-10", Some("gone")).await;

    let err = service(&storage, Arc::new(MockTracker::default()))
        .post_comment(record.id)
        .await
        .unwrap_err();
    assert!(matches!(err, TrackdeskError::TrackerNotFound(_)));
    assert!(!storage.get_sub_id(record.id).await.unwrap().unwrap().comment_posted);
}

#[tokio::test]
async fn test_bulk_post_skips_posted_and_reports_failures() {
    let (_dir, storage, site) = setup().await;
    let tracker = Arc::new(MockTracker::default().with_task(task("t1", LINEUP)));
    let svc = service(&storage, tracker.clone());

    let first = sub_id(&storage, &site, "B-1", Some("t1")).await;
    let second = sub_id(&storage, &site, "B-2", Some("t1")).await;
    let unlinked = sub_id(&storage, &site, "B-3", None).await;
    let missing_task = sub_id(&storage, &site, "B-4", Some("nope")).await;
    svc.post_comment(first.id).await.unwrap();

    let outcome = svc
        .bulk_post_comments(
            vec![first.id, second.id, second.id, unlinked.id, missing_task.id],
            false,
        )
        .await
        .unwrap();
    assert_eq!(outcome.skipped, vec![first.id]);
    assert_eq!(outcome.posted.len(), 1);
    assert_eq!(outcome.posted[0].sub_id.value, "B-2");
    let failed: Vec<String> = outcome.failed.iter().map(|f| f.key.clone()).collect();
    assert_eq!(failed, vec![unlinked.id.to_string(), missing_task.id.to_string()]);
    // one from post_comment, one from the batch
    assert_eq!(tracker.posted().len(), 2);
}

#[tokio::test]
async fn test_bulk_post_force_reposts() {
    let (_dir, storage, site) = setup().await;
    let tracker = Arc::new(MockTracker::default().with_task(task("t1", LINEUP)));
    let svc = service(&storage, tracker.clone());
    let record = sub_id(&storage, &site, "F-1", Some("t1")).await;
    svc.post_comment(record.id).await.unwrap();

    let outcome = svc.bulk_post_comments(vec![record.id], true).await.unwrap();
    assert!(outcome.skipped.is_empty());
    assert_eq!(outcome.posted.len(), 1);
    assert_eq!(tracker.posted().len(), 2);
}

#[tokio::test]
async fn test_bulk_post_respects_batch_limit() {
    let (_dir, storage, _site) = setup().await;
    let svc = service(&storage, Arc::new(MockTracker::default())).with_max_batch_size(2);

    let err = svc.bulk_post_comments(vec![1, 2, 3], false).await.unwrap_err();
    assert!(matches!(err, TrackdeskError::Validation(_)));
    let err = svc.bulk_post_comments(vec![], false).await.unwrap_err();
    assert!(matches!(err, TrackdeskError::Validation(_)));
}

// =============================================================================
// Flag sync
// =============================================================================

#[tokio::test]
async fn test_sync_marks_sub_ids_found_in_comments() {
    let (_dir, storage, site) = setup().await;
    let found = sub_id(&storage, &site, "SYNC-1", Some("t1")).await;
    let absent = sub_id(&storage, &site, "SYNC-2", Some("t2")).await;
    let broken = sub_id(&storage, &site, "SYNC-3", Some("t3")).await;
    sub_id(&storage, &site, "SYNC-4", None).await;

    let mut tracker = MockTracker::default()
        .with_comment("t1", "Sub-ID: SYNC-1 posted by hand")
        .with_comment("t2", "Sub-ID: OTHER");
    tracker.broken.push("t3".into());

    let outcome = service(&storage, Arc::new(tracker))
        .sync_comment_flags(site.id)
        .await
        .unwrap();
    assert_eq!(outcome.checked, 3);
    assert_eq!(outcome.marked.len(), 1);
    assert_eq!(outcome.marked[0].id, found.id);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].key, "SYNC-3");

    assert!(storage.get_sub_id(found.id).await.unwrap().unwrap().comment_posted);
    assert!(!storage.get_sub_id(absent.id).await.unwrap().unwrap().comment_posted);
    assert!(!storage.get_sub_id(broken.id).await.unwrap().unwrap().comment_posted);
}

#[tokio::test]
async fn test_sync_unknown_website() {
    let (_dir, storage, _site) = setup().await;
    let err = service(&storage, Arc::new(MockTracker::default()))
        .sync_comment_flags(9999)
        .await
        .unwrap_err();
    assert!(matches!(err, TrackdeskError::NotFound(_)));
}
