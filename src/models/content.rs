// Scraped article content and its translated counterpart

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identifier the backend assigned to a scraped article.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ContentId(pub String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ContentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// The scrape endpoint hands out database row ids, older deployments send strings.
impl<'de> Deserialize<'de> for ContentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => ContentId(n.to_string()),
            RawId::Text(s) => ContentId(s),
        })
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Article data returned by the scrape collaborator.
///
/// Immutable once fetched; a new scrape replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub id: ContentId,
    pub title: String,
    /// HTML as delivered by the scraper, unsanitized.
    #[serde(alias = "content")]
    pub body: String,
    pub url: String,
    #[serde(alias = "publish_date", default, deserialize_with = "null_as_empty")]
    pub date: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub site_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub header_image: Option<String>,
}

impl Content {
    pub fn new(
        id: impl Into<ContentId>,
        title: impl Into<String>,
        body: impl Into<String>,
        url: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            url: url.into(),
            date: date.into(),
            author: None,
            site_name: None,
            description: None,
            header_image: None,
        }
    }
}

/// Machine translation of a [`Content`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedContent {
    pub title: String,
    pub body: String,
}

impl TranslatedContent {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}
