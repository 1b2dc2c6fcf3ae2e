// View layer - synchronous components that own page state and render it
// into the declarative view model.

pub mod content_viewer;
pub mod model;
pub mod page_controller;
pub mod property_editor;

pub use content_viewer::{ContentViewer, TranslationState, TranslationTicket};
pub use model::{
    ArticleView, ContentView, ControlView, LoadingView, Notification, NotificationLevel, PageView,
    PaneLayout, PropertyControlView, TranslatedPane, ViewMode,
};
pub use page_controller::{
    CallId, CallKind, CatalogTicket, CreatePageTicket, PageController, ScrapeTicket,
    TranslateTicket,
};
pub use property_editor::{PropertyEdit, PropertyEditor};
