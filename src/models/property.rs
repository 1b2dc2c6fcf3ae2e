// Destination database property schema and the values edited against it

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Type tag of a destination-database property.
///
/// Unrecognised tags are kept verbatim in [`PropertyType::Other`] so they can
/// still be rendered as plain text and routed through the wire-format table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PropertyType {
    Title,
    RichText,
    Url,
    Date,
    Select,
    MultiSelect,
    CreatedTime,
    RelationSelect,
    Text,
    Other(String),
}

impl PropertyType {
    pub fn as_str(&self) -> &str {
        match self {
            PropertyType::Title => "title",
            PropertyType::RichText => "rich_text",
            PropertyType::Url => "url",
            PropertyType::Date => "date",
            PropertyType::Select => "select",
            PropertyType::MultiSelect => "multi_select",
            PropertyType::CreatedTime => "created_time",
            PropertyType::RelationSelect => "relation_select",
            PropertyType::Text => "text",
            PropertyType::Other(tag) => tag.as_str(),
        }
    }

    /// Whether values are picked from the definition's `options`.
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            PropertyType::Select | PropertyType::MultiSelect | PropertyType::RelationSelect
        )
    }
}

impl From<String> for PropertyType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "title" => PropertyType::Title,
            "rich_text" => PropertyType::RichText,
            "url" => PropertyType::Url,
            "date" => PropertyType::Date,
            "select" => PropertyType::Select,
            "multi_select" => PropertyType::MultiSelect,
            "created_time" => PropertyType::CreatedTime,
            "relation_select" => PropertyType::RelationSelect,
            "text" => PropertyType::Text,
            _ => PropertyType::Other(tag),
        }
    }
}

impl From<&str> for PropertyType {
    fn from(tag: &str) -> Self {
        PropertyType::from(tag.to_string())
    }
}

impl From<PropertyType> for String {
    fn from(kind: PropertyType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyOption {
    pub label: String,
    pub value: String,
}

impl PropertyOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PropertyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<PropertyOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_title: Option<String>,
}

impl PropertyDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: PropertyType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            options: None,
            database_id: None,
            database_title: None,
        }
    }

    pub fn with_options(mut self, options: Vec<PropertyOption>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn options(&self) -> &[PropertyOption] {
        self.options.as_deref().unwrap_or(&[])
    }
}

/// Catalog shown until the schema endpoint answers, and kept when it fails.
pub fn builtin_catalog() -> Vec<PropertyDefinition> {
    let choice = |pairs: &[(&str, &str)]| {
        pairs
            .iter()
            .map(|(label, value)| PropertyOption::new(*label, *value))
            .collect::<Vec<_>>()
    };

    vec![
        PropertyDefinition::new("createdAt", "Created", PropertyType::CreatedTime),
        PropertyDefinition::new("date", "Date", PropertyType::Date),
        PropertyDefinition::new("nature", "Nature", PropertyType::Select).with_options(choice(&[
            ("Technical", "technical"),
            ("Business", "business"),
            ("Legal", "legal"),
        ])),
        PropertyDefinition::new("tags", "Tags", PropertyType::MultiSelect).with_options(choice(&[
            ("Web", "web"),
            ("AI", "ai"),
            ("Design", "design"),
        ])),
        PropertyDefinition::new("mainCategory", "MainCategory", PropertyType::Select).with_options(
            choice(&[
                ("Development", "development"),
                ("Marketing", "marketing"),
                ("Management", "management"),
            ]),
        ),
        PropertyDefinition::new("subCategory", "SubCategory", PropertyType::Select).with_options(
            choice(&[
                ("Frontend", "frontend"),
                ("Backend", "backend"),
                ("Infrastructure", "infrastructure"),
            ]),
        ),
        PropertyDefinition::new("importance", "Importance", PropertyType::Select).with_options(
            choice(&[("High", "high"), ("Medium", "medium"), ("Low", "low")]),
        ),
    ]
}

/// Formatted property values keyed by [`PropertyDefinition::id`].
///
/// Only the page controller writes to it; it is sent wholesale on submit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyValueMap(BTreeMap<String, Value>);

impl PropertyValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.0.get(id)
    }

    pub fn insert(&mut self, id: impl Into<String>, value: Value) {
        self.0.insert(id.into(), value);
    }

    /// Drops every entry whose id is not in `catalog`.
    pub fn retain_catalog(&mut self, catalog: &[PropertyDefinition]) {
        self.0
            .retain(|id, _| catalog.iter().any(|definition| &definition.id == id));
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
