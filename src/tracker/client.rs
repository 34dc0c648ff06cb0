//! HTTP client for the task tracker.
//!
//! ureq is blocking, so every call runs inside `spawn_blocking`.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, trace};
use ureq::Agent;

use super::models::{CommentList, PostedComment, Task, TaskComment};
use crate::affiliate::TrackerComment;
use crate::config::TrackerConfig;
use crate::errors::{Result, TrackdeskError};

/// Task-tracker operations used by the reconciliation service.
#[async_trait]
pub trait TaskTracker: Send + Sync {
    async fn get_task(&self, task_id: &str) -> Result<Task>;

    async fn list_comments(&self, task_id: &str) -> Result<Vec<TaskComment>>;

    async fn post_comment(&self, task_id: &str, comment: &TrackerComment)
    -> Result<PostedComment>;
}

pub struct HttpTaskTracker {
    base_url: String,
    api_token: String,
    agent: Agent,
}

impl HttpTaskTracker {
    pub fn new(config: &TrackerConfig) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout.max(1))))
            .build()
            .into();

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.trim().to_string(),
            agent,
        }
    }

    fn task_url(&self, task_id: &str, suffix: &str) -> Result<String> {
        let task_id = task_id.trim();
        if task_id.is_empty() {
            return Err(TrackdeskError::validation("Task id cannot be empty"));
        }
        Ok(format!(
            "{}/task/{}{}",
            self.base_url,
            urlencoding::encode(task_id),
            suffix
        ))
    }

    fn auth_header(&self) -> Result<String> {
        if self.api_token.is_empty() {
            return Err(TrackdeskError::tracker_unauthorized(
                "Task tracker API token is not configured",
            ));
        }
        Ok(format!("Bearer {}", self.api_token))
    }

    async fn run_blocking<T, F>(f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        tokio::task::spawn_blocking(f).await.map_err(|e| {
            error!("Task tracker spawn_blocking failed: {}", e);
            TrackdeskError::tracker_request(format!("Tracker request aborted: {}", e))
        })?
    }
}

/// Map a ureq failure to the tracker error taxonomy.
fn map_ureq_error(url: &str, err: ureq::Error) -> TrackdeskError {
    match err {
        ureq::Error::StatusCode(401) | ureq::Error::StatusCode(403) => {
            TrackdeskError::tracker_unauthorized(format!("Tracker rejected credentials for {}", url))
        }
        ureq::Error::StatusCode(404) => {
            TrackdeskError::tracker_not_found(format!("Tracker returned 404 for {}", url))
        }
        other => {
            error!("Task tracker request to \"{}\" failed: {}", url, other);
            TrackdeskError::tracker_request(format!("Request to {} failed: {}", url, other))
        }
    }
}

#[async_trait]
impl TaskTracker for HttpTaskTracker {
    async fn get_task(&self, task_id: &str) -> Result<Task> {
        let url = self.task_url(task_id, "?include_markdown_description=true")?;
        let auth = self.auth_header()?;
        let agent = self.agent.clone();
        trace!("Fetching task from {}", url);

        Self::run_blocking(move || {
            let resp = agent
                .get(&url)
                .header("Authorization", &auth)
                .call()
                .map_err(|e| map_ureq_error(&url, e))?;
            resp.into_body()
                .read_json::<Task>()
                .map_err(|e| TrackdeskError::serialization(format!("Invalid task payload: {}", e)))
        })
        .await
    }

    async fn list_comments(&self, task_id: &str) -> Result<Vec<TaskComment>> {
        let url = self.task_url(task_id, "/comment")?;
        let auth = self.auth_header()?;
        let agent = self.agent.clone();
        trace!("Listing comments from {}", url);

        Self::run_blocking(move || {
            let resp = agent
                .get(&url)
                .header("Authorization", &auth)
                .call()
                .map_err(|e| map_ureq_error(&url, e))?;
            let list: CommentList = resp.into_body().read_json().map_err(|e| {
                TrackdeskError::serialization(format!("Invalid comment list payload: {}", e))
            })?;
            Ok(list.comments)
        })
        .await
    }

    async fn post_comment(
        &self,
        task_id: &str,
        comment: &TrackerComment,
    ) -> Result<PostedComment> {
        let url = self.task_url(task_id, "/comment")?;
        let auth = self.auth_header()?;
        let agent = self.agent.clone();
        let body = comment.clone();
        trace!("Posting comment to {}", url);

        Self::run_blocking(move || {
            let resp = agent
                .post(&url)
                .header("Authorization", &auth)
                .send_json(&body)
                .map_err(|e| map_ureq_error(&url, e))?;
            resp.into_body().read_json::<PostedComment>().map_err(|e| {
                TrackdeskError::serialization(format!("Invalid comment response: {}", e))
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(token: &str) -> HttpTaskTracker {
        HttpTaskTracker::new(&TrackerConfig {
            base_url: "https://tracker.example.com/api/v2/".to_string(),
            api_token: token.to_string(),
            ..TrackerConfig::default()
        })
    }

    #[test]
    fn test_task_url_encodes_id() {
        let c = client("tok");
        assert_eq!(
            c.task_url("abc 1", "/comment").unwrap(),
            "https://tracker.example.com/api/v2/task/abc%201/comment"
        );
        assert!(matches!(
            c.task_url("  ", ""),
            Err(TrackdeskError::Validation(_))
        ));
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            map_ureq_error("u", ureq::Error::StatusCode(401)),
            TrackdeskError::TrackerUnauthorized(_)
        ));
        assert!(matches!(
            map_ureq_error("u", ureq::Error::StatusCode(404)),
            TrackdeskError::TrackerNotFound(_)
        ));
        assert!(matches!(
            map_ureq_error("u", ureq::Error::StatusCode(502)),
            TrackdeskError::TrackerRequest(_)
        ));
    }

    #[tokio::test]
    async fn test_missing_token_fails_without_request() {
        let result = client("").get_task("86abc123").await;
        assert!(matches!(result, Err(TrackdeskError::TrackerUnauthorized(_))));
    }

    #[tokio::test]
    #[ignore] // 需要网络访问与真实 token
    async fn test_real_tracker_request() {
        let token = std::env::var("TD__TRACKER__API_TOKEN").unwrap_or_default();
        let c = HttpTaskTracker::new(&TrackerConfig {
            api_token: token,
            ..TrackerConfig::default()
        });
        let result = c.get_task("0").await;
        assert!(result.is_err());
    }
}
