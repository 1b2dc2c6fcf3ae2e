// Property Editor - one control per catalog entry, pushes formatted values
// upward on every committed edit, supports manual reordering.

use chrono::{DateTime, Local, NaiveDate};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{PropertyDefinition, PropertyType};
use crate::view::model::{ControlView, PropertyControlView};
use crate::wire_format::{split_selections, WireFormatTable};

/// A committed edit, formatted for the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyEdit {
    pub property_id: String,
    pub value: Value,
}

#[derive(Debug, Clone)]
pub struct PropertyEditor {
    entries: Vec<PropertyDefinition>,
    /// Raw values backing the controlled inputs, keyed by property id.
    inputs: HashMap<String, String>,
    mounted_at: DateTime<Local>,
    wire: Arc<WireFormatTable>,
}

impl PropertyEditor {
    /// `mounted_at` is captured once: it is the read-only creation time and
    /// the default for date entries.
    pub fn new(
        catalog: Vec<PropertyDefinition>,
        wire: Arc<WireFormatTable>,
        mounted_at: DateTime<Local>,
    ) -> Self {
        let mut editor = Self {
            entries: Vec::new(),
            inputs: HashMap::new(),
            mounted_at,
            wire,
        };
        editor.replace_catalog(catalog);
        editor
    }

    pub fn entries(&self) -> &[PropertyDefinition] {
        &self.entries
    }

    pub fn contains(&self, property_id: &str) -> bool {
        self.definition(property_id).is_some()
    }

    fn definition(&self, property_id: &str) -> Option<&PropertyDefinition> {
        self.entries.iter().find(|d| d.id == property_id)
    }

    pub fn created_display(&self) -> String {
        self.mounted_at.format("%Y/%m/%d %H:%M").to_string()
    }

    /// Installs a new catalog in its given order. Inputs of ids that survive
    /// are kept; new date entries get the mount date.
    pub fn replace_catalog(&mut self, catalog: Vec<PropertyDefinition>) {
        self.inputs
            .retain(|id, _| catalog.iter().any(|definition| &definition.id == id));
        let today = self.mounted_at.date_naive().format("%Y-%m-%d").to_string();
        for definition in catalog.iter().filter(|d| d.kind == PropertyType::Date) {
            self.inputs
                .entry(definition.id.clone())
                .or_insert_with(|| today.clone());
        }
        self.entries = catalog;
    }

    /// Formatted values for the inputs that were pre-filled rather than typed.
    pub fn default_edits(&self) -> Vec<PropertyEdit> {
        self.entries
            .iter()
            .filter(|d| d.kind == PropertyType::Date)
            .filter_map(|d| {
                self.inputs.get(&d.id).map(|raw| PropertyEdit {
                    property_id: d.id.clone(),
                    value: self.wire.format(&d.kind, raw),
                })
            })
            .collect()
    }

    /// Commits `raw` for `property_id`. Returns `None` for ids outside the
    /// catalog and for read-only entries.
    pub fn edit(&mut self, property_id: &str, raw: &str) -> Option<PropertyEdit> {
        let definition = self.definition(property_id)?;
        let normalized = match &definition.kind {
            PropertyType::CreatedTime => return None,
            PropertyType::Date => normalize_date(raw),
            PropertyType::Select | PropertyType::RelationSelect => option_value(definition, raw),
            PropertyType::MultiSelect => split_selections(raw)
                .iter()
                .map(|selection| option_value(definition, selection))
                .collect::<Vec<_>>()
                .join(", "),
            _ => raw.to_string(),
        };
        let value = self.wire.format(&definition.kind, &normalized);

        self.inputs.insert(property_id.to_string(), normalized);
        Some(PropertyEdit {
            property_id: property_id.to_string(),
            value,
        })
    }

    /// Moves the entry at `from` so it ends up at index `to`. Display order only.
    pub fn move_entry(&mut self, from: usize, to: usize) -> bool {
        if from >= self.entries.len() || to >= self.entries.len() {
            return false;
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        true
    }

    pub fn render(&self) -> Vec<PropertyControlView> {
        self.entries
            .iter()
            .enumerate()
            .map(|(position, definition)| PropertyControlView {
                id: definition.id.clone(),
                name: definition.name.clone(),
                kind: definition.kind.clone(),
                position,
                control: self.control_for(definition),
            })
            .collect()
    }

    fn control_for(&self, definition: &PropertyDefinition) -> ControlView {
        let value = self.inputs.get(&definition.id).cloned().unwrap_or_default();
        match &definition.kind {
            PropertyType::CreatedTime => ControlView::Timestamp {
                display: self.created_display(),
            },
            PropertyType::Date => ControlView::DatePicker { value },
            PropertyType::RichText => ControlView::TextArea { value },
            PropertyType::Select | PropertyType::RelationSelect => ControlView::SingleChoice {
                options: definition.options().to_vec(),
                selected: Some(value).filter(|v| !v.is_empty()),
                placeholder: if definition.kind == PropertyType::RelationSelect {
                    "Select a related page".to_string()
                } else {
                    format!("Select {}", definition.name)
                },
            },
            PropertyType::MultiSelect => ControlView::MultiChoice {
                options: definition.options().to_vec(),
                selected: split_selections(&value),
                placeholder: format!("Select {}", definition.name),
            },
            _ => ControlView::TextInput { value },
        }
    }
}

/// `YYYY-MM-DD` stays as is, RFC 3339 timestamps keep their calendar date,
/// anything else passes through for the endpoint to judge.
fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").is_ok() {
        return trimmed.to_string();
    }
    match DateTime::parse_from_rfc3339(trimmed) {
        Ok(timestamp) => timestamp.date_naive().format("%Y-%m-%d").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Maps a chosen label to its option value; unknown choices pass through.
fn option_value(definition: &PropertyDefinition, choice: &str) -> String {
    let options = definition.options();
    if options.iter().any(|o| o.value == choice) {
        return choice.to_string();
    }
    options
        .iter()
        .find(|o| o.label == choice)
        .map(|o| o.value.clone())
        .unwrap_or_else(|| choice.to_string())
}
