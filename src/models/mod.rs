// Data model shared by the view components and the backend collaborators

pub mod content;
pub mod page;
pub mod property;

pub use content::{Content, ContentId, TranslatedContent};
pub use page::{CreatedPage, PageSubmission};
pub use property::{
    builtin_catalog, PropertyDefinition, PropertyOption, PropertyType, PropertyValueMap,
};
