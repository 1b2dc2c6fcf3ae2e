// Scripted in-memory backend shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

use notion_clipper::backend::{
    PageCreationInterface, SchemaInterface, ScrapeInterface, TranslateInterface,
};
use notion_clipper::models::{
    Content, ContentId, CreatedPage, PageSubmission, PropertyDefinition, TranslatedContent,
};
use notion_clipper::sanitize::HtmlSanitizer;
use notion_clipper::session::Session;
use notion_clipper::view::PageView;
use notion_clipper::wire_format::WireFormatTable;
use notion_clipper::{AppError, AppResult};

#[derive(Default)]
pub struct MockBackend {
    pub contents: Mutex<HashMap<String, Content>>,
    pub translations: Mutex<HashMap<String, TranslatedContent>>,
    pub catalog: Mutex<Option<Vec<PropertyDefinition>>>,
    pub translate_gate: Option<Arc<Semaphore>>,
    pub fail_create: AtomicBool,
    pub panic_on_scrape: AtomicBool,
    pub scrape_calls: AtomicUsize,
    pub translate_calls: AtomicUsize,
    pub catalog_calls: AtomicUsize,
    pub translated_ids: Mutex<Vec<ContentId>>,
    pub submissions: Mutex<Vec<PageSubmission>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translation calls block until the returned semaphore hands out permits.
    pub fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let backend = Self {
            translate_gate: Some(gate.clone()),
            ..Self::default()
        };
        (backend, gate)
    }

    pub fn with_content(self, url: &str, content: Content) -> Self {
        self.contents.lock().unwrap().insert(url.to_string(), content);
        self
    }

    pub fn with_translation(self, id: &str, translated: TranslatedContent) -> Self {
        self.translations
            .lock()
            .unwrap()
            .insert(id.to_string(), translated);
        self
    }

    pub fn with_catalog(self, catalog: Vec<PropertyDefinition>) -> Self {
        *self.catalog.lock().unwrap() = Some(catalog);
        self
    }

    pub fn scrapes(&self) -> usize {
        self.scrape_calls.load(Ordering::SeqCst)
    }

    pub fn translations_requested(&self) -> usize {
        self.translate_calls.load(Ordering::SeqCst)
    }

    pub fn last_submission(&self) -> Option<PageSubmission> {
        self.submissions.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ScrapeInterface for MockBackend {
    async fn scrape(&self, url: &str) -> AppResult<Content> {
        self.scrape_calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_scrape.load(Ordering::SeqCst) {
            panic!("scraper crashed");
        }
        self.contents
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::endpoint(Some(500), "Scraping error: 404"))
    }
}

#[async_trait]
impl TranslateInterface for MockBackend {
    async fn translate(&self, content_id: &ContentId) -> AppResult<TranslatedContent> {
        self.translate_calls.fetch_add(1, Ordering::SeqCst);
        self.translated_ids.lock().unwrap().push(content_id.clone());
        if let Some(gate) = &self.translate_gate {
            gate.acquire()
                .await
                .map_err(|e| AppError::Transport(e.to_string()))?
                .forget();
        }
        let translated = self.translations.lock().unwrap().get(content_id.as_str()).cloned();
        translated.ok_or_else(|| AppError::Transport("translation service unavailable".to_string()))
    }
}

#[async_trait]
impl SchemaInterface for MockBackend {
    async fn property_catalog(&self) -> AppResult<Vec<PropertyDefinition>> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        self.catalog
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::endpoint(Some(500), "Notion token missing"))
    }
}

#[async_trait]
impl PageCreationInterface for MockBackend {
    async fn create_page(&self, submission: &PageSubmission) -> AppResult<CreatedPage> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(AppError::Endpoint {
                status: Some(500),
                message: "Failed to create Notion page".to_string(),
                details: Some("database not shared".to_string()),
            });
        }
        let mut submissions = self.submissions.lock().unwrap();
        submissions.push(submission.clone());
        Ok(CreatedPage {
            page_id: format!("page-{}", submissions.len()),
        })
    }
}

pub fn article(id: &str, title: &str, body: &str, url: &str) -> Content {
    Content::new(id, title, body, url, "2024-01-01")
}

pub fn session(backend: Arc<MockBackend>) -> Session {
    Session::new(
        backend,
        Arc::new(HtmlSanitizer::default()),
        Arc::new(WireFormatTable::notion()),
        chrono::Duration::seconds(60),
    )
}

/// Polls the session until `done` holds, for calls that cannot be settled
/// because another call is deliberately held open.
pub async fn wait_for(session: &Session, done: impl Fn(&PageView) -> bool) -> PageView {
    for _ in 0..400 {
        let view = session.view().await;
        if done(&view) {
            return view;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("Timed out waiting for session state");
}
