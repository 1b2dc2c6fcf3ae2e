// Wire Format Table - property type to destination-API value shape
// The destination's property contract lives here as data so it can be
// overridden from a JSON file without touching the view state machines.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::PropertyType;

/// Shape a raw input string is wrapped into before it is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireShape {
    /// `{"date": {"start": v}}`
    Date,
    /// `{"select": {"name": v}}`
    Select,
    /// `{"multi_select": [{"name": a}, {"name": b}]}` from `"a, b"`
    MultiSelect,
    /// `{"url": v}`
    Url,
    /// `{"title": [{"text": {"content": v}}]}`
    Title,
    /// `{"rich_text": [{"text": {"content": v}}]}`
    RichText,
    /// `{"relation": [{"id": v}]}`
    Relation,
    /// The raw string itself.
    Passthrough,
}

impl WireShape {
    pub fn wrap(self, raw: &str) -> Value {
        match self {
            WireShape::Date => json!({ "date": { "start": raw } }),
            WireShape::Select => json!({ "select": { "name": raw } }),
            WireShape::MultiSelect => json!({
                "multi_select": split_selections(raw)
                    .into_iter()
                    .map(|name| json!({ "name": name }))
                    .collect::<Vec<_>>()
            }),
            WireShape::Url => json!({ "url": raw }),
            WireShape::Title => json!({ "title": [{ "text": { "content": raw } }] }),
            WireShape::RichText => json!({ "rich_text": [{ "text": { "content": raw } }] }),
            WireShape::Relation => json!({ "relation": [{ "id": raw }] }),
            WireShape::Passthrough => Value::String(raw.to_string()),
        }
    }
}

/// Splits a comma-separated selection into trimmed, non-empty, first-seen-unique names.
pub fn split_selections(raw: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        if !names.iter().any(|seen| seen == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// On-disk override format: `{"shapes": {"number": "rich_text"}, "fallback": "passthrough"}`.
#[derive(Debug, Default, Deserialize)]
struct WireFormatOverrides {
    #[serde(default)]
    shapes: HashMap<String, WireShape>,
    #[serde(default)]
    fallback: Option<WireShape>,
}

#[derive(Debug, Clone)]
pub struct WireFormatTable {
    shapes: HashMap<PropertyType, WireShape>,
    fallback: WireShape,
}

impl Default for WireFormatTable {
    fn default() -> Self {
        Self::notion()
    }
}

impl WireFormatTable {
    /// The shapes Notion's page-creation endpoint accepts.
    pub fn notion() -> Self {
        let shapes = [
            (PropertyType::Date, WireShape::Date),
            (PropertyType::Select, WireShape::Select),
            (PropertyType::MultiSelect, WireShape::MultiSelect),
            (PropertyType::Url, WireShape::Url),
            (PropertyType::Title, WireShape::Title),
            (PropertyType::RichText, WireShape::RichText),
            (PropertyType::Text, WireShape::RichText),
            (PropertyType::RelationSelect, WireShape::Relation),
            (PropertyType::CreatedTime, WireShape::Passthrough),
        ]
        .into_iter()
        .collect();

        Self {
            shapes,
            fallback: WireShape::Passthrough,
        }
    }

    /// Notion defaults with the entries of `json` laid over them.
    pub fn from_json(json: &str) -> AppResult<Self> {
        let overrides: WireFormatOverrides = serde_json::from_str(json).map_err(|e| {
            AppError::ConfigurationError(format!("Invalid wire format table: {}", e))
        })?;

        let mut table = Self::notion();
        for (tag, shape) in overrides.shapes {
            table.shapes.insert(PropertyType::from(tag), shape);
        }
        if let Some(fallback) = overrides.fallback {
            table.fallback = fallback;
        }
        Ok(table)
    }

    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AppError::ConfigurationError(format!(
                "Failed to read wire format table {}: {}",
                path.display(),
                e
            ))
        })?;
        let table = Self::from_json(&json)?;
        info!("Loaded wire format table from {}", path.display());
        Ok(table)
    }

    pub fn shape_for(&self, kind: &PropertyType) -> WireShape {
        self.shapes.get(kind).copied().unwrap_or(self.fallback)
    }

    pub fn format(&self, kind: &PropertyType, raw: &str) -> Value {
        self.shape_for(kind).wrap(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_date_shape() {
        let table = WireFormatTable::notion();
        assert_eq!(
            table.format(&PropertyType::Date, "2024-03-05"),
            json!({"date": {"start": "2024-03-05"}})
        );
    }

    #[test]
    fn test_multi_select_trims_and_dedupes() {
        let table = WireFormatTable::notion();
        assert_eq!(
            table.format(&PropertyType::MultiSelect, " web, ai ,, web"),
            json!({"multi_select": [{"name": "web"}, {"name": "ai"}]})
        );
    }

    #[test]
    fn test_title_and_rich_text_wrap_content() {
        let table = WireFormatTable::notion();
        assert_eq!(
            table.format(&PropertyType::Title, "Hello"),
            json!({"title": [{"text": {"content": "Hello"}}]})
        );
        assert_eq!(
            table.format(&PropertyType::Text, "note"),
            json!({"rich_text": [{"text": {"content": "note"}}]})
        );
    }

    #[test]
    fn test_unknown_type_uses_fallback() {
        let table = WireFormatTable::notion();
        assert_eq!(
            table.format(&PropertyType::from("checkbox"), "true"),
            json!("true")
        );
    }

    #[test]
    fn test_overrides_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"shapes": {{"number": "rich_text", "select": "passthrough"}}, "fallback": "url"}}"#
        )
        .unwrap();

        let table = WireFormatTable::load(file.path()).unwrap();
        assert_eq!(table.shape_for(&PropertyType::from("number")), WireShape::RichText);
        assert_eq!(table.shape_for(&PropertyType::Select), WireShape::Passthrough);
        assert_eq!(table.shape_for(&PropertyType::from("email")), WireShape::Url);
        assert_eq!(table.shape_for(&PropertyType::Date), WireShape::Date);
    }

    #[test]
    fn test_invalid_override_is_configuration_error() {
        let result = WireFormatTable::from_json(r#"{"shapes": {"date": "calendar"}}"#);
        assert!(matches!(result, Err(AppError::ConfigurationError(_))));
    }
}
