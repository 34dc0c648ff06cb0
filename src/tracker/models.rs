//! Task-tracker API payloads (ClickUp v2 shapes).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// 仅在请求 `include_markdown_description=true` 时返回
    #[serde(default)]
    pub markdown_description: Option<String>,
    #[serde(default)]
    pub text_content: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
}

impl Task {
    /// Best available description text: markdown, then rich text, then plain.
    pub fn description_text(&self) -> &str {
        [
            self.markdown_description.as_deref(),
            self.description.as_deref(),
            self.text_content.as_deref(),
        ]
        .into_iter()
        .flatten()
        .find(|text| !text.trim().is_empty())
        .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskStatus {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomField {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: String,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub type_config: Option<TypeConfig>,
}

impl CustomField {
    pub fn options(&self) -> &[DropdownOption] {
        self.type_config
            .as_ref()
            .map(|c| c.options.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeConfig {
    #[serde(default)]
    pub options: Vec<DropdownOption>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DropdownOption {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// labels 字段使用 `label`，drop_down 字段使用 `name`
    #[serde(default)]
    pub label: Option<String>,
    /// 数字或数字字符串
    #[serde(default)]
    pub orderindex: Option<serde_json::Value>,
}

impl DropdownOption {
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.label.as_deref())
    }

    pub fn order_index(&self) -> Option<i64> {
        match self.orderindex.as_ref()? {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentList {
    #[serde(default)]
    pub comments: Vec<TaskComment>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskComment {
    pub id: String,
    #[serde(default)]
    pub comment_text: String,
    #[serde(default)]
    pub date: Option<String>,
}

/// Response of a comment POST. The id is numeric in some API versions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostedComment {
    pub id: serde_json::Value,
    #[serde(default)]
    pub date: Option<serde_json::Value>,
}

impl PostedComment {
    pub fn id_string(&self) -> String {
        match &self.id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_task() {
        let task: Task = serde_json::from_value(serde_json::json!({
            "id": "86abc123",
            "name": "Casino review",
            "description": "plain",
            "markdown_description": "## 🎯 TOP PICKS LINEUP",
            "status": { "status": "in progress" },
            "custom_fields": [{
                "id": "f1",
                "name": "GEO",
                "type": "drop_down",
                "value": 1,
                "type_config": { "options": [
                    { "id": "o0", "name": "UK", "orderindex": 0 },
                    { "id": "o1", "name": "USA", "orderindex": "1" }
                ]}
            }]
        }))
        .unwrap();

        assert_eq!(task.description_text(), "## 🎯 TOP PICKS LINEUP");
        assert_eq!(task.custom_fields[0].options()[1].order_index(), Some(1));
        assert_eq!(task.status.unwrap().status, "in progress");
    }

    #[test]
    fn test_posted_comment_id() {
        let posted: PostedComment =
            serde_json::from_value(serde_json::json!({ "id": 458, "date": 1 })).unwrap();
        assert_eq!(posted.id_string(), "458");
    }
}
