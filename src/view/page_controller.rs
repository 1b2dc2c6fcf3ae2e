// Page Controller - owns Content, the property catalog and PropertyValueMap;
// sequences the collaborator calls as begin/complete pairs so results that
// arrive for superseded state are dropped instead of applied.

use chrono::{DateTime, Local, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    builtin_catalog, Content, CreatedPage, PageSubmission, PropertyDefinition, PropertyValueMap,
    TranslatedContent,
};
use crate::sanitize::HtmlSanitizer;
use crate::view::content_viewer::{ContentViewer, TranslationTicket};
use crate::view::model::{LoadingView, Notification, NotificationLevel, PageView, ViewMode};
use crate::view::property_editor::PropertyEditor;
use crate::wire_format::WireFormatTable;

static HTTP_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://[^\s/$.?#][^\s]*$").expect("valid url pattern"));

/// The four kinds of collaborator call. At most one call of each kind is in
/// flight; calls of different kinds may overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    Scrape,
    Translate,
    LoadCatalog,
    CreatePage,
}

impl CallKind {
    pub fn status_message(self) -> &'static str {
        match self {
            CallKind::Scrape => "Extracting content from URL...",
            CallKind::Translate => "Translating...",
            CallKind::LoadCatalog => "Loading database properties...",
            CallKind::CreatePage => "Saving to Notion...",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallId {
    pub kind: CallKind,
    seq: u64,
}

impl CallId {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone)]
pub struct ScrapeTicket {
    pub call: CallId,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct TranslateTicket {
    pub call: CallId,
    pub translation: TranslationTicket,
}

#[derive(Debug, Clone)]
pub struct CatalogTicket {
    pub call: CallId,
    catalog_version: u64,
}

#[derive(Debug, Clone)]
pub struct CreatePageTicket {
    pub call: CallId,
    generation: u64,
    pub submission: PageSubmission,
}

#[derive(Debug)]
pub struct PageController {
    url_input: String,
    viewer: Option<ContentViewer>,
    content_generation: u64,
    editor: PropertyEditor,
    catalog_version: u64,
    values: PropertyValueMap,
    in_flight: Vec<CallId>,
    next_seq: u64,
    notifications: Vec<Notification>,
    notification_ttl: chrono::Duration,
    last_page_id: Option<String>,
    sanitizer: Arc<HtmlSanitizer>,
}

impl PageController {
    pub fn new(
        sanitizer: Arc<HtmlSanitizer>,
        wire: Arc<WireFormatTable>,
        notification_ttl: chrono::Duration,
    ) -> Self {
        Self::mounted_at(sanitizer, wire, notification_ttl, Local::now())
    }

    /// Same as [`PageController::new`] with an explicit mount time.
    pub fn mounted_at(
        sanitizer: Arc<HtmlSanitizer>,
        wire: Arc<WireFormatTable>,
        notification_ttl: chrono::Duration,
        mounted_at: DateTime<Local>,
    ) -> Self {
        let mut controller = Self {
            url_input: String::new(),
            viewer: None,
            content_generation: 0,
            editor: PropertyEditor::new(builtin_catalog(), wire, mounted_at),
            catalog_version: 0,
            values: PropertyValueMap::new(),
            in_flight: Vec::new(),
            next_seq: 0,
            notifications: Vec::new(),
            notification_ttl,
            last_page_id: None,
            sanitizer,
        };
        controller.apply_default_edits();
        controller
    }

    pub fn content(&self) -> Option<&Content> {
        self.viewer.as_ref().map(|viewer| viewer.content())
    }

    pub fn viewer(&self) -> Option<&ContentViewer> {
        self.viewer.as_ref()
    }

    pub fn content_generation(&self) -> u64 {
        self.content_generation
    }

    pub fn catalog(&self) -> &[PropertyDefinition] {
        self.editor.entries()
    }

    pub fn catalog_version(&self) -> u64 {
        self.catalog_version
    }

    pub fn values(&self) -> &PropertyValueMap {
        &self.values
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn last_page_id(&self) -> Option<&str> {
        self.last_page_id.as_deref()
    }

    pub fn is_pending(&self, kind: CallKind) -> bool {
        self.in_flight.iter().any(|call| call.kind == kind)
    }

    fn begin(&mut self, kind: CallKind) -> Option<CallId> {
        if self.is_pending(kind) {
            debug!("Ignoring {:?}: previous call still pending", kind);
            return None;
        }
        self.next_seq += 1;
        let call = CallId {
            kind,
            seq: self.next_seq,
        };
        self.in_flight.push(call);
        debug!("Started {:?} call #{}", kind, call.seq());
        Some(call)
    }

    /// Retires `call`. Returns `false` when it is no longer the tracked call of its kind.
    fn finish(&mut self, call: CallId) -> bool {
        match self.in_flight.iter().position(|tracked| *tracked == call) {
            Some(index) => {
                self.in_flight.remove(index);
                true
            }
            None => false,
        }
    }

    fn notify(&mut self, level: NotificationLevel, title: &str, message: impl Into<String>) {
        let now = Utc::now();
        self.notifications.push(Notification {
            id: Uuid::new_v4(),
            level,
            title: title.to_string(),
            message: message.into(),
            created_at: now,
            expires_at: now
                .checked_add_signed(self.notification_ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        });
    }

    fn apply_default_edits(&mut self) {
        for edit in self.editor.default_edits() {
            self.values.insert(edit.property_id, edit.value);
        }
    }

    pub fn set_url_input(&mut self, url: &str) {
        self.url_input = url.to_string();
    }

    /// Empty input is ignored; malformed input is reported and not sent.
    pub fn begin_scrape(&mut self, url: &str) -> Option<ScrapeTicket> {
        self.url_input = url.to_string();
        let url = url.trim();
        if url.is_empty() {
            return None;
        }
        if !HTTP_URL.is_match(url) {
            self.notify(
                NotificationLevel::Error,
                "Invalid URL",
                format!("Enter an http(s) URL, got: {}", url),
            );
            return None;
        }
        let call = self.begin(CallKind::Scrape)?;
        Some(ScrapeTicket {
            call,
            url: url.to_string(),
        })
    }

    /// On success replaces Content, which resets the viewer and drops any
    /// cached or in-flight translation.
    pub fn complete_scrape(&mut self, ticket: ScrapeTicket, result: AppResult<Content>) -> bool {
        if !self.finish(ticket.call) {
            debug!("Discarding stale scrape result for {}", ticket.url);
            return false;
        }
        match result {
            Ok(content) => {
                info!("Loaded content {} from {}", content.id, ticket.url);
                self.content_generation += 1;
                self.in_flight.retain(|call| call.kind != CallKind::Translate);
                self.viewer = Some(ContentViewer::new(
                    content,
                    self.content_generation,
                    self.sanitizer.clone(),
                ));
                self.last_page_id = None;
                self.notify(
                    NotificationLevel::Success,
                    "Content extracted",
                    "The page content was extracted.",
                );
            }
            Err(err) => {
                warn!("Scrape of {} failed: {}", ticket.url, err);
                self.notify(
                    NotificationLevel::Error,
                    "Extraction failed",
                    format!("Failed to extract the URL: {}", err.user_message()),
                );
            }
        }
        true
    }

    pub fn select_mode(&mut self, mode: ViewMode) -> Option<TranslateTicket> {
        let translation = self.viewer.as_mut()?.select_mode(mode)?;
        self.track_translation(translation)
    }

    pub fn retry_translation(&mut self) -> Option<TranslateTicket> {
        let translation = self.viewer.as_mut()?.retry_translation()?;
        self.track_translation(translation)
    }

    fn track_translation(&mut self, translation: TranslationTicket) -> Option<TranslateTicket> {
        let call = self.begin(CallKind::Translate)?;
        Some(TranslateTicket { call, translation })
    }

    pub fn complete_translation(
        &mut self,
        ticket: TranslateTicket,
        result: AppResult<TranslatedContent>,
    ) -> bool {
        if !self.finish(ticket.call) {
            debug!(
                "Discarding stale translation for content {}",
                ticket.translation.content_id
            );
            return false;
        }
        let failure = result.as_ref().err().map(|err| err.user_message());
        let applied = match self.viewer.as_mut() {
            Some(viewer) => viewer.resolve_translation(&ticket.translation, result),
            None => false,
        };
        if !applied {
            debug!(
                "Translation for content {} no longer matches the viewer",
                ticket.translation.content_id
            );
            return false;
        }
        match failure {
            None => self.notify(
                NotificationLevel::Success,
                "Translation complete",
                "The content was translated.",
            ),
            Some(message) => {
                warn!(
                    "Translation of {} failed: {}",
                    ticket.translation.content_id, message
                );
                self.notify(
                    NotificationLevel::Error,
                    "Translation failed",
                    format!("Translation failed: {}", message),
                );
            }
        }
        true
    }

    pub fn begin_catalog_load(&mut self) -> Option<CatalogTicket> {
        let call = self.begin(CallKind::LoadCatalog)?;
        Some(CatalogTicket {
            call,
            catalog_version: self.catalog_version,
        })
    }

    /// On success installs the catalog and drops values for ids it no longer has.
    /// On failure the current catalog stays.
    pub fn complete_catalog_load(
        &mut self,
        ticket: CatalogTicket,
        result: AppResult<Vec<PropertyDefinition>>,
    ) -> bool {
        if !self.finish(ticket.call) || ticket.catalog_version != self.catalog_version {
            debug!("Discarding stale property catalog");
            return false;
        }
        match result {
            Ok(catalog) => {
                info!("Installed property catalog with {} entries", catalog.len());
                self.catalog_version += 1;
                self.values.retain_catalog(&catalog);
                self.editor.replace_catalog(catalog);
                for edit in self.editor.default_edits() {
                    if self.values.get(&edit.property_id).is_none() {
                        self.values.insert(edit.property_id, edit.value);
                    }
                }
            }
            Err(err) => {
                warn!("Failed to fetch property catalog: {}", err);
                self.notify(
                    NotificationLevel::Error,
                    "Property load failed",
                    format!(
                        "Failed to fetch database properties: {}",
                        err.user_message()
                    ),
                );
            }
        }
        true
    }

    /// Catalog membership is the only gate; returns whether the edit was taken.
    pub fn edit_property(&mut self, property_id: &str, raw: &str) -> bool {
        match self.editor.edit(property_id, raw) {
            Some(edit) => {
                self.values.insert(edit.property_id, edit.value);
                true
            }
            None => {
                debug!("Ignoring edit of {}", property_id);
                false
            }
        }
    }

    pub fn move_property(&mut self, from: usize, to: usize) -> bool {
        self.editor.move_entry(from, to)
    }

    /// Requires loaded content; snapshots the current values.
    pub fn begin_create_page(&mut self) -> Option<CreatePageTicket> {
        let content_id = self.content()?.id.clone();
        let call = self.begin(CallKind::CreatePage)?;
        Some(CreatePageTicket {
            call,
            generation: self.content_generation,
            submission: PageSubmission {
                content_id,
                properties: self.values.clone(),
            },
        })
    }

    pub fn complete_create_page(
        &mut self,
        ticket: CreatePageTicket,
        result: AppResult<CreatedPage>,
    ) -> bool {
        if !self.finish(ticket.call) {
            return false;
        }
        match result {
            Ok(page) => {
                info!(
                    "Created page {} for content {}",
                    page.page_id, ticket.submission.content_id
                );
                self.notify(
                    NotificationLevel::Success,
                    "Notion page created",
                    format!("Saved to Notion as page {}.", page.page_id),
                );
                // The acknowledgement is shown either way, but only tied to
                // the content it was created from.
                if ticket.generation == self.content_generation {
                    self.last_page_id = Some(page.page_id);
                }
            }
            Err(err) => {
                warn!("Page creation failed: {}", err);
                self.notify(
                    NotificationLevel::Error,
                    "Save failed",
                    format!("Failed to save to Notion: {}", err.user_message()),
                );
            }
        }
        true
    }

    pub fn dismiss_notification(&mut self, id: Uuid) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        self.notifications.len() != before
    }

    pub fn prune_notifications(&mut self, now: DateTime<Utc>) {
        self.notifications.retain(|n| n.expires_at > now);
    }

    pub fn render(&self) -> PageView {
        PageView {
            url_input: self.url_input.clone(),
            url_submit_enabled: !self.is_pending(CallKind::Scrape)
                && !self.url_input.trim().is_empty(),
            content: self.viewer.as_ref().map(ContentViewer::render),
            properties: self.editor.render(),
            create_page_enabled: self.viewer.is_some() && !self.is_pending(CallKind::CreatePage),
            catalog_reload_enabled: !self.is_pending(CallKind::LoadCatalog),
            last_page_id: self.last_page_id.clone(),
            loading: self.in_flight.last().map(|call| LoadingView {
                message: call.kind.status_message().to_string(),
            }),
            notifications: self.notifications.clone(),
        }
    }
}
