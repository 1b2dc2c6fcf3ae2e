use std::sync::Arc;
use crate::{
    backend::{BackendInterface, HttpBackend},
    config::Config,
    registry::SessionRegistry,
    sanitize::HtmlSanitizer,
    wire_format::WireFormatTable,
};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Initialize backend client
        let backend = HttpBackend::new(config.backend.base_url.clone(), config.backend_timeout())?;
        Self::with_backend(config, Arc::new(backend))
    }

    /// Wires sessions to an arbitrary backend implementation.
    pub fn with_backend(
        config: Config,
        backend: Arc<dyn BackendInterface>,
    ) -> anyhow::Result<Self> {
        let wire = match &config.wire_format_path {
            Some(path) => WireFormatTable::load(path)?,
            None => WireFormatTable::notion(),
        };

        let registry = SessionRegistry::new(
            config.session.capacity,
            backend,
            Arc::new(HtmlSanitizer::default()),
            Arc::new(wire),
            config.notification_ttl(),
        )?;

        Ok(Self {
            registry: Arc::new(registry),
            config,
        })
    }
}
