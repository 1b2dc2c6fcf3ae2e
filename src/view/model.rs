// Declarative view model - what a front end renders, produced by the
// components' render functions and never mutated by the front end itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{PropertyOption, PropertyType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Original,
    Translated,
    Both,
}

impl ViewMode {
    pub fn needs_translation(self) -> bool {
        matches!(self, ViewMode::Translated | ViewMode::Both)
    }
}

/// `Adaptive` panes sit side by side on wide viewports and stack on narrow ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaneLayout {
    Single,
    Adaptive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleView {
    pub title: String,
    /// Sanitized markup, safe to inject.
    pub body_html: String,
    pub date: String,
    pub source_url: String,
    pub author: Option<String>,
    pub site_name: Option<String>,
    pub header_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TranslatedPane {
    Pending,
    Ready { article: ArticleView },
    Failed { message: String, retryable: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentView {
    pub mode: ViewMode,
    pub layout: PaneLayout,
    /// Rendered first whenever present.
    pub original: Option<ArticleView>,
    pub translated: Option<TranslatedPane>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum ControlView {
    TextArea {
        value: String,
    },
    TextInput {
        value: String,
    },
    DatePicker {
        value: String,
    },
    Timestamp {
        display: String,
    },
    SingleChoice {
        options: Vec<PropertyOption>,
        selected: Option<String>,
        placeholder: String,
    },
    MultiChoice {
        options: Vec<PropertyOption>,
        selected: Vec<String>,
        placeholder: String,
    },
}

impl ControlView {
    pub fn is_editable(&self) -> bool {
        !matches!(self, ControlView::Timestamp { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyControlView {
    pub id: String,
    pub name: String,
    pub kind: PropertyType,
    pub position: usize,
    #[serde(flatten)]
    pub control: ControlView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// Toast notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadingView {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageView {
    pub url_input: String,
    pub url_submit_enabled: bool,
    pub content: Option<ContentView>,
    pub properties: Vec<PropertyControlView>,
    pub create_page_enabled: bool,
    pub catalog_reload_enabled: bool,
    pub last_page_id: Option<String>,
    pub loading: Option<LoadingView>,
    pub notifications: Vec<Notification>,
}
