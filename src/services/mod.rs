//! Service layer for business logic
//!
//! Shared by the HTTP handlers and the CLI. Every rule that is not a
//! database constraint (Sub-ID immutability, ranking position checks,
//! comment reconciliation) lives here.

mod brand_service;
mod geo_service;
mod ranking_service;
mod sub_id_format;
mod sub_id_service;
mod task_service;
mod website_service;

pub use brand_service::*;
pub use geo_service::*;
pub use ranking_service::*;
pub use sub_id_format::{DEFAULT_PATTERN, SubIdPattern};
pub use sub_id_service::*;
pub use task_service::*;
pub use website_service::*;

/// Default upper bound on items per bulk request
pub const DEFAULT_MAX_BATCH_SIZE: usize = 5000;

// ============ Batch Operation DTOs ============

/// Single failed batch item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailedItem {
    /// Identifies the input item (value, brand id, Sub-ID id, index)
    pub key: String,
    pub reason: String,
}

/// Outcome of a sequential bulk operation: items keep going after a failure.
#[derive(Debug, Clone)]
pub struct BatchOutcome<T> {
    pub success: Vec<T>,
    pub failed: Vec<BatchFailedItem>,
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self {
            success: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<T> BatchOutcome<T> {
    pub fn push_failure(&mut self, key: impl Into<String>, reason: impl ToString) {
        self.failed.push(BatchFailedItem {
            key: key.into(),
            reason: reason.to_string(),
        });
    }

    /// 合并单项结果
    pub fn record(&mut self, key: impl Into<String>, result: crate::errors::Result<T>) {
        match result {
            Ok(item) => self.success.push(item),
            Err(e) => {
                let key = key.into();
                tracing::warn!("Batch item '{}' failed: {}", key, e);
                self.push_failure(key, e);
            }
        }
    }
}

pub(crate) fn check_batch_size(len: usize, max: usize) -> crate::errors::Result<()> {
    if len == 0 {
        return Err(crate::errors::TrackdeskError::validation("Batch is empty"));
    }
    if len > max {
        return Err(crate::errors::TrackdeskError::validation(format!(
            "Batch size {} exceeds the maximum of {}",
            len, max
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TrackdeskError;

    #[test]
    fn test_batch_outcome_record() {
        let mut outcome: BatchOutcome<i32> = BatchOutcome::default();
        outcome.record("a", Ok(1));
        outcome.record("b", Err(TrackdeskError::validation("bad input")));
        outcome.record("c", Ok(3));
        assert_eq!(outcome.success, vec![1, 3]);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].key, "b");
        assert!(outcome.failed[0].reason.contains("bad input"));
    }

    #[test]
    fn test_check_batch_size() {
        assert!(check_batch_size(1, 10).is_ok());
        assert!(check_batch_size(0, 10).is_err());
        assert!(check_batch_size(11, 10).is_err());
    }
}
