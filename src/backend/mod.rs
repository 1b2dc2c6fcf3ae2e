// Backend collaborators - the four remote operations the page depends on,
// one trait per concern so tests can script each independently.

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{Content, ContentId, CreatedPage, PageSubmission, PropertyDefinition, TranslatedContent};

pub mod http;

pub use http::HttpBackend;

#[async_trait]
pub trait ScrapeInterface: Send + Sync {
    async fn scrape(&self, url: &str) -> AppResult<Content>;
}

#[async_trait]
pub trait TranslateInterface: Send + Sync {
    async fn translate(&self, content_id: &ContentId) -> AppResult<TranslatedContent>;
}

#[async_trait]
pub trait SchemaInterface: Send + Sync {
    /// Property definitions in the destination database's order.
    async fn property_catalog(&self) -> AppResult<Vec<PropertyDefinition>>;
}

#[async_trait]
pub trait PageCreationInterface: Send + Sync {
    async fn create_page(&self, submission: &PageSubmission) -> AppResult<CreatedPage>;
}

/// Everything a session needs from the outside world.
pub trait BackendInterface:
    ScrapeInterface + TranslateInterface + SchemaInterface + PageCreationInterface
{
}

impl<T> BackendInterface for T where
    T: ScrapeInterface + TranslateInterface + SchemaInterface + PageCreationInterface
{
}
