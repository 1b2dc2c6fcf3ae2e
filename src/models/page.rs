// Page-creation request and acknowledgement

use serde::{Deserialize, Serialize};

use super::content::ContentId;
use super::property::PropertyValueMap;

/// Everything the creation endpoint needs: the article it was scraped into and
/// the formatted property values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSubmission {
    pub content_id: ContentId,
    pub properties: PropertyValueMap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPage {
    pub page_id: String,
}
