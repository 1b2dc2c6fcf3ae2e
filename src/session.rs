// Session - asynchronous driver of one PageController. Collaborator calls run
// as background tasks; every mutating operation answers with the view as it
// stands right away and results land through the controller's stale checks.

use chrono::Utc;
use futures::FutureExt;
use std::future::Future;
use std::mem;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

use crate::backend::BackendInterface;
use crate::error::{AppError, AppResult};
use crate::sanitize::HtmlSanitizer;
use crate::view::{CallKind, PageController, PageView, ViewMode};
use crate::wire_format::WireFormatTable;

/// Runs a collaborator call, turning a panic into a failed result so the
/// call is still completed and retired.
async fn guarded<T>(kind: CallKind, call: impl Future<Output = AppResult<T>>) -> AppResult<T> {
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(result) => result,
        Err(_) => {
            error!("{:?} call panicked", kind);
            Err(AppError::Internal(format!("{:?} call failed unexpectedly", kind)))
        }
    }
}

pub struct Session {
    id: Uuid,
    controller: Arc<Mutex<PageController>>,
    backend: Arc<dyn BackendInterface>,
    tasks: Mutex<JoinSet<()>>,
}

impl Session {
    pub fn new(
        backend: Arc<dyn BackendInterface>,
        sanitizer: Arc<HtmlSanitizer>,
        wire: Arc<WireFormatTable>,
        notification_ttl: chrono::Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            controller: Arc::new(Mutex::new(PageController::new(
                sanitizer,
                wire,
                notification_ttl,
            ))),
            backend,
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    async fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock().await;
        while let Some(finished) = tasks.try_join_next() {
            if let Err(e) = finished {
                warn!("Session {} task failed: {}", self.id, e);
            }
        }
        tasks.spawn(task);
    }

    /// Renders the current view after dropping expired notifications.
    pub async fn view(&self) -> PageView {
        let mut controller = self.controller.lock().await;
        controller.prune_notifications(Utc::now());
        controller.render()
    }

    #[instrument(skip(self), fields(session = %self.id))]
    pub async fn submit_url(&self, url: &str) -> PageView {
        let mut controller = self.controller.lock().await;
        if let Some(ticket) = controller.begin_scrape(url) {
            let backend = self.backend.clone();
            let shared = self.controller.clone();
            self.spawn(async move {
                let result = guarded(CallKind::Scrape, backend.scrape(&ticket.url)).await;
                shared.lock().await.complete_scrape(ticket, result);
            })
            .await;
        }
        controller.render()
    }

    #[instrument(skip(self), fields(session = %self.id))]
    pub async fn select_mode(&self, mode: ViewMode) -> PageView {
        let mut controller = self.controller.lock().await;
        if let Some(ticket) = controller.select_mode(mode) {
            self.spawn_translation(ticket).await;
        }
        controller.render()
    }

    #[instrument(skip(self), fields(session = %self.id))]
    pub async fn retry_translation(&self) -> PageView {
        let mut controller = self.controller.lock().await;
        if let Some(ticket) = controller.retry_translation() {
            self.spawn_translation(ticket).await;
        }
        controller.render()
    }

    async fn spawn_translation(&self, ticket: crate::view::TranslateTicket) {
        let backend = self.backend.clone();
        let shared = self.controller.clone();
        self.spawn(async move {
            let call = backend.translate(&ticket.translation.content_id);
            let result = guarded(CallKind::Translate, call).await;
            shared.lock().await.complete_translation(ticket, result);
        })
        .await;
    }

    #[instrument(skip(self), fields(session = %self.id))]
    pub async fn reload_catalog(&self) -> PageView {
        let mut controller = self.controller.lock().await;
        if let Some(ticket) = controller.begin_catalog_load() {
            let backend = self.backend.clone();
            let shared = self.controller.clone();
            self.spawn(async move {
                let result = guarded(CallKind::LoadCatalog, backend.property_catalog()).await;
                shared.lock().await.complete_catalog_load(ticket, result);
            })
            .await;
        }
        controller.render()
    }

    /// Edits of ids outside the current catalog are ignored.
    #[instrument(skip(self, value), fields(session = %self.id))]
    pub async fn edit_property(&self, property_id: &str, value: &str) -> PageView {
        let mut controller = self.controller.lock().await;
        controller.edit_property(property_id, value);
        controller.render()
    }

    #[instrument(skip(self), fields(session = %self.id))]
    pub async fn move_property(&self, from: usize, to: usize) -> AppResult<PageView> {
        let mut controller = self.controller.lock().await;
        if !controller.move_property(from, to) {
            return Err(AppError::Validation(format!(
                "Cannot move property {} to {} in a catalog of {}",
                from,
                to,
                controller.catalog().len()
            )));
        }
        Ok(controller.render())
    }

    #[instrument(skip(self), fields(session = %self.id))]
    pub async fn create_page(&self) -> PageView {
        let mut controller = self.controller.lock().await;
        if let Some(ticket) = controller.begin_create_page() {
            let backend = self.backend.clone();
            let shared = self.controller.clone();
            self.spawn(async move {
                let call = backend.create_page(&ticket.submission);
                let result = guarded(CallKind::CreatePage, call).await;
                shared.lock().await.complete_create_page(ticket, result);
            })
            .await;
        }
        controller.render()
    }

    pub async fn dismiss_notification(&self, notification_id: Uuid) -> AppResult<PageView> {
        let mut controller = self.controller.lock().await;
        if !controller.dismiss_notification(notification_id) {
            return Err(AppError::NotFound(format!(
                "Notification {} not found",
                notification_id
            )));
        }
        Ok(controller.render())
    }

    /// Waits until every collaborator call started so far, and any started by
    /// their completions, has been applied.
    pub async fn settle(&self) {
        loop {
            let mut running = mem::take(&mut *self.tasks.lock().await);
            if running.is_empty() {
                break;
            }
            debug!("Session {} waiting on {} calls", self.id, running.len());
            while let Some(finished) = running.join_next().await {
                if let Err(e) = finished {
                    warn!("Session {} task failed: {}", self.id, e);
                }
            }
        }
    }

    /// Cancels outstanding collaborator calls.
    pub async fn shutdown(&self) {
        self.tasks.lock().await.abort_all();
    }
}
