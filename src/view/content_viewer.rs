// Content Viewer - tri-mode article preview with a lazily requested,
// cached translation.

use std::sync::Arc;

use crate::error::AppResult;
use crate::models::{Content, ContentId, TranslatedContent};
use crate::sanitize::HtmlSanitizer;
use crate::view::model::{ArticleView, ContentView, PaneLayout, TranslatedPane, ViewMode};

/// Identifies one invocation of the translation provider.
///
/// A result is only applied while the viewer still shows the same content
/// generation and is still waiting on the same attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationTicket {
    pub content_id: ContentId,
    pub generation: u64,
    pub attempt: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TranslationState {
    NotRequested,
    Pending { attempt: u32 },
    /// Body is already sanitized.
    Ready(TranslatedContent),
    Failed { attempt: u32, message: String },
}

#[derive(Debug, Clone)]
pub struct ContentViewer {
    content: Content,
    sanitized_body: String,
    generation: u64,
    mode: ViewMode,
    translation: TranslationState,
    attempts: u32,
    sanitizer: Arc<HtmlSanitizer>,
}

impl ContentViewer {
    /// Starts in [`ViewMode::Original`] with no translation requested.
    pub fn new(content: Content, generation: u64, sanitizer: Arc<HtmlSanitizer>) -> Self {
        let sanitized_body = sanitizer.sanitize(&content.body);
        Self {
            content,
            sanitized_body,
            generation,
            mode: ViewMode::Original,
            translation: TranslationState::NotRequested,
            attempts: 0,
            sanitizer,
        }
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn translation(&self) -> &TranslationState {
        &self.translation
    }

    /// Switches mode immediately. Returns a ticket when the provider has to be
    /// invoked, which happens only on the first entry into a translated mode.
    pub fn select_mode(&mut self, mode: ViewMode) -> Option<TranslationTicket> {
        self.mode = mode;
        if mode.needs_translation() && self.translation == TranslationState::NotRequested {
            return Some(self.issue_ticket());
        }
        None
    }

    /// Re-invokes the provider after a failure. No-op in any other state.
    pub fn retry_translation(&mut self) -> Option<TranslationTicket> {
        match self.translation {
            TranslationState::Failed { .. } => Some(self.issue_ticket()),
            _ => None,
        }
    }

    fn issue_ticket(&mut self) -> TranslationTicket {
        self.attempts += 1;
        self.translation = TranslationState::Pending {
            attempt: self.attempts,
        };
        TranslationTicket {
            content_id: self.content.id.clone(),
            generation: self.generation,
            attempt: self.attempts,
        }
    }

    pub fn is_current(&self, ticket: &TranslationTicket) -> bool {
        ticket.generation == self.generation
            && ticket.content_id == self.content.id
            && self.translation
                == TranslationState::Pending {
                    attempt: ticket.attempt,
                }
    }

    /// Applies a provider result. Returns `false` when the ticket is stale.
    pub fn resolve_translation(
        &mut self,
        ticket: &TranslationTicket,
        result: AppResult<TranslatedContent>,
    ) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.translation = match result {
            Ok(translated) => TranslationState::Ready(TranslatedContent {
                body: self.sanitizer.sanitize(&translated.body),
                title: translated.title,
            }),
            Err(err) => TranslationState::Failed {
                attempt: ticket.attempt,
                message: err.user_message(),
            },
        };
        true
    }

    fn article(&self, title: &str, body_html: &str) -> ArticleView {
        ArticleView {
            title: title.to_string(),
            body_html: body_html.to_string(),
            date: self.content.date.clone(),
            source_url: self.content.url.clone(),
            author: self.content.author.clone(),
            site_name: self.content.site_name.clone(),
            header_image: self.content.header_image.clone(),
        }
    }

    fn translated_pane(&self) -> TranslatedPane {
        match &self.translation {
            TranslationState::NotRequested | TranslationState::Pending { .. } => {
                TranslatedPane::Pending
            }
            TranslationState::Ready(translated) => TranslatedPane::Ready {
                article: self.article(&translated.title, &translated.body),
            },
            TranslationState::Failed { message, .. } => TranslatedPane::Failed {
                message: message.clone(),
                retryable: true,
            },
        }
    }

    pub fn render(&self) -> ContentView {
        let original = || self.article(&self.content.title, &self.sanitized_body);
        match self.mode {
            ViewMode::Original => ContentView {
                mode: self.mode,
                layout: PaneLayout::Single,
                original: Some(original()),
                translated: None,
            },
            ViewMode::Translated => ContentView {
                mode: self.mode,
                layout: PaneLayout::Single,
                original: None,
                translated: Some(self.translated_pane()),
            },
            ViewMode::Both => ContentView {
                mode: self.mode,
                layout: PaneLayout::Adaptive,
                original: Some(original()),
                translated: Some(self.translated_pane()),
            },
        }
    }
}
