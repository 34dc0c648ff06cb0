//! Custom-field value resolution.
//!
//! Dropdown and label fields store option references (an order index or an
//! option id) instead of the label; the options array shipped with the field
//! is the lookup table.

use serde_json::Value;

use super::models::{CustomField, DropdownOption};

/// Find a field by name, case-insensitively.
pub fn find_field<'a>(fields: &'a [CustomField], name: &str) -> Option<&'a CustomField> {
    let name = name.trim();
    fields.iter().find(|f| f.name.trim().eq_ignore_ascii_case(name))
}

/// Human-readable value of a field, or `None` when it is empty or points at
/// an option that does not exist.
pub fn resolve_field_value(field: &CustomField) -> Option<String> {
    let value = field.value.as_ref()?;
    let options = field.options();

    if options.is_empty() {
        return literal(value);
    }

    match value {
        Value::Array(items) => {
            let labels: Vec<String> = items
                .iter()
                .filter_map(|item| resolve_option(options, item))
                .collect();
            (!labels.is_empty()).then(|| labels.join(", "))
        }
        other => resolve_option(options, other),
    }
}

fn resolve_option(options: &[DropdownOption], value: &Value) -> Option<String> {
    let option = match value {
        Value::Number(n) => by_index(options, n.as_i64()?),
        Value::String(s) => options
            .iter()
            .find(|o| o.id == *s)
            .or_else(|| s.trim().parse::<i64>().ok().and_then(|n| by_index(options, n))),
        Value::Object(map) => map
            .get("id")
            .and_then(Value::as_str)
            .and_then(|id| options.iter().find(|o| o.id == id)),
        _ => None,
    }?;
    option.display_name().map(str::to_string)
}

/// Match on `orderindex` first, then on array position.
fn by_index(options: &[DropdownOption], index: i64) -> Option<&DropdownOption> {
    options
        .iter()
        .find(|o| o.order_index() == Some(index))
        .or_else(|| usize::try_from(index).ok().and_then(|i| options.get(i)))
}

fn literal(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(literal).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Object(map) => map
            .get("name")
            .or_else(|| map.get("label"))
            .and_then(literal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::models::TypeConfig;
    use serde_json::json;

    fn option(id: &str, name: &str, orderindex: Value) -> DropdownOption {
        DropdownOption {
            id: id.to_string(),
            name: Some(name.to_string()),
            label: None,
            orderindex: Some(orderindex),
        }
    }

    fn dropdown(value: Value) -> CustomField {
        CustomField {
            id: "f1".to_string(),
            name: "GEO".to_string(),
            field_type: "drop_down".to_string(),
            value: Some(value),
            type_config: Some(TypeConfig {
                options: vec![
                    option("uuid-uk", "UK", json!(0)),
                    option("uuid-us", "USA", json!("1")),
                    option("uuid-de", "Germany", json!(5)),
                ],
            }),
        }
    }

    #[test]
    fn test_numeric_value_resolves_orderindex() {
        assert_eq!(resolve_field_value(&dropdown(json!(1))).as_deref(), Some("USA"));
        assert_eq!(resolve_field_value(&dropdown(json!("5"))).as_deref(), Some("Germany"));
        // 无匹配 orderindex 时按位置
        assert_eq!(resolve_field_value(&dropdown(json!(2))).as_deref(), Some("Germany"));
    }

    #[test]
    fn test_option_id_value() {
        assert_eq!(
            resolve_field_value(&dropdown(json!("uuid-uk"))).as_deref(),
            Some("UK")
        );
        assert_eq!(
            resolve_field_value(&dropdown(json!(["uuid-uk", "uuid-de"]))).as_deref(),
            Some("UK, Germany")
        );
    }

    #[test]
    fn test_unresolvable_index_is_absent() {
        assert_eq!(resolve_field_value(&dropdown(json!(42))), None);
        assert_eq!(resolve_field_value(&dropdown(json!("nope"))), None);
        assert_eq!(resolve_field_value(&dropdown(Value::Null)), None);
    }

    #[test]
    fn test_literal_fields() {
        let mut field = dropdown(json!("  Brand X "));
        field.type_config = None;
        assert_eq!(resolve_field_value(&field).as_deref(), Some("Brand X"));
        field.value = None;
        assert_eq!(resolve_field_value(&field), None);
    }

    #[test]
    fn test_find_field_ignores_case() {
        let fields = vec![dropdown(json!(0))];
        assert!(find_field(&fields, "geo").is_some());
        assert!(find_field(&fields, "brand").is_none());
    }
}
