// Session Registry - live sessions keyed by id, least recently used evicted
// once capacity is reached.

use futures::future::join_all;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::backend::BackendInterface;
use crate::error::{AppError, AppResult};
use crate::sanitize::HtmlSanitizer;
use crate::session::Session;
use crate::wire_format::WireFormatTable;

pub struct SessionRegistry {
    sessions: Mutex<LruCache<Uuid, Arc<Session>>>,
    backend: Arc<dyn BackendInterface>,
    sanitizer: Arc<HtmlSanitizer>,
    wire: Arc<WireFormatTable>,
    notification_ttl: chrono::Duration,
}

impl SessionRegistry {
    pub fn new(
        capacity: usize,
        backend: Arc<dyn BackendInterface>,
        sanitizer: Arc<HtmlSanitizer>,
        wire: Arc<WireFormatTable>,
        notification_ttl: chrono::Duration,
    ) -> AppResult<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or_else(|| {
            AppError::ConfigurationError("Session capacity must be at least 1".to_string())
        })?;
        Ok(Self {
            sessions: Mutex::new(LruCache::new(capacity)),
            backend,
            sanitizer,
            wire,
            notification_ttl,
        })
    }

    /// Registers a new session and starts its property schema load.
    pub async fn create(&self) -> Arc<Session> {
        let session = Arc::new(Session::new(
            self.backend.clone(),
            self.sanitizer.clone(),
            self.wire.clone(),
            self.notification_ttl,
        ));
        session.reload_catalog().await;

        let evicted = self.sessions.lock().await.push(session.id(), session.clone());
        if let Some((id, old)) = evicted {
            if id != session.id() {
                info!("Evicting least recently used session {}", id);
                old.shutdown().await;
            }
        }
        info!("Created session {}", session.id());
        session
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Arc<Session>> {
        self.sessions
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))
    }

    pub async fn remove(&self, id: Uuid) -> AppResult<()> {
        let session = self
            .sessions
            .lock()
            .await
            .pop(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))?;
        session.shutdown().await;
        info!("Removed session {}", id);
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Lets every live session finish its outstanding calls.
    pub async fn settle_all(&self) {
        let sessions: Vec<Arc<Session>> = self
            .sessions
            .lock()
            .await
            .iter()
            .map(|(_, session)| session.clone())
            .collect();
        join_all(sessions.iter().map(|session| session.settle())).await;
    }
}
