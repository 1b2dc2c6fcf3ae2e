// Notion Clipper - URL to scraped article to translated preview to Notion page

// Data model shared by the view and the backend
pub mod models;

// Declarative view components and the page controller that owns their state
pub mod view;

// Remote collaborators (scrape, translate, schema, page creation)
pub mod backend;

// Property wire shapes and HTML sanitization
pub mod sanitize;
pub mod wire_format;

// Session driver, registry and HTTP surface
pub mod registry;
pub mod server;
pub mod session;

// Common utilities
pub mod app_state;
pub mod config;
pub mod error;

// Re-exports for convenience
pub use error::{AppError, AppResult};
