//! External task-tracker integration: API models, custom-field resolution
//! and the HTTP client behind the [`TaskTracker`] trait.

pub mod client;
pub mod custom_fields;
pub mod models;

pub use client::{HttpTaskTracker, TaskTracker};
pub use custom_fields::{find_field, resolve_field_value};
pub use models::{CustomField, DropdownOption, PostedComment, Task, TaskComment};
