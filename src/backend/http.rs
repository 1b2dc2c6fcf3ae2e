// HTTP Backend - JSON-over-HTTP client for the scrape, translate, schema and
// page-creation endpoints.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, instrument};

use super::{PageCreationInterface, SchemaInterface, ScrapeInterface, TranslateInterface};
use crate::error::{AppError, AppResult};
use crate::models::{
    Content, ContentId, CreatedPage, PageSubmission, PropertyDefinition, PropertyType,
    TranslatedContent,
};

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::ConfigurationError(format!("HTTP client: {}", e)))?;
        Ok(Self::with_reqwest_client(client, base_url))
    }

    /// Use a preconfigured reqwest client.
    pub fn with_reqwest_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    async fn read_json(response: reqwest::Response) -> AppResult<Value> {
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(error_from_body(Some(status.as_u16()), &text));
        }
        serde_json::from_str(&text).map_err(|e| {
            AppError::MalformedResponse(format!("expected a JSON body ({})", e))
        })
    }

    async fn post(&self, path: &str, body: &Value) -> AppResult<Value> {
        let response = self.client.post(self.endpoint(path)).json(body).send().await?;
        Self::read_json(response).await
    }
}

/// Builds an endpoint failure out of an error body, falling back to the raw
/// text when the body carries no message.
pub(crate) fn error_from_body(status: Option<u16>, text: &str) -> AppError {
    let body: Value = serde_json::from_str(text).unwrap_or(Value::Null);
    let message = ["error", "message"]
        .iter()
        .find_map(|field| body.get(*field).and_then(Value::as_str))
        .map(str::to_string)
        .or_else(|| {
            let trimmed = text.trim();
            (!trimmed.is_empty() && !body.is_object()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| match status {
            Some(status) => format!("Request failed with status {}", status),
            None => "Request failed".to_string(),
        });
    AppError::Endpoint {
        status,
        message,
        details: body.get("details").and_then(detail_text),
    }
}

fn detail_text(details: &Value) -> Option<String> {
    match details {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// The content store keys rows by integer id; keep numeric ids numeric on the wire.
fn content_id_json(id: &ContentId) -> Value {
    match id.as_str().parse::<i64>() {
        Ok(n) => json!(n),
        Err(_) => json!(id.as_str()),
    }
}

fn required_str(body: &Value, field: &str) -> AppResult<String> {
    body.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| AppError::MalformedResponse(format!("missing `{}`", field)))
}

pub(crate) fn parse_translation(body: &Value) -> AppResult<TranslatedContent> {
    Ok(TranslatedContent::new(
        required_str(body, "translated_title")?,
        required_str(body, "translated_content")?,
    ))
}

/// Accepts a bare array of definitions, or the `{status, data}` envelope with
/// `data` as an array or a name-keyed map whose order is the catalog order.
pub(crate) fn parse_catalog(body: &Value) -> AppResult<Vec<PropertyDefinition>> {
    if body.get("status").and_then(Value::as_str) == Some("error") {
        return Err(error_from_body(None, &body.to_string()));
    }
    let data = match body {
        Value::Array(_) => body,
        _ => body
            .get("data")
            .ok_or_else(|| AppError::MalformedResponse("missing `data`".to_string()))?,
    };
    match data {
        Value::Array(_) => Ok(serde_json::from_value(data.clone())?),
        Value::Object(entries) => entries
            .iter()
            .map(|(key, entry)| keyed_definition(key, entry))
            .collect(),
        _ => Err(AppError::MalformedResponse(
            "`data` is neither a list nor a map".to_string(),
        )),
    }
}

fn keyed_definition(key: &str, entry: &Value) -> AppResult<PropertyDefinition> {
    match entry {
        Value::String(tag) => Ok(PropertyDefinition::new(key, key, PropertyType::from(tag.as_str()))),
        Value::Object(fields) => {
            let mut fields: Map<String, Value> = fields.clone();
            fields.entry("id").or_insert_with(|| json!(key));
            fields.entry("name").or_insert_with(|| json!(key));
            Ok(serde_json::from_value(Value::Object(fields))?)
        }
        _ => Err(AppError::MalformedResponse(format!(
            "property `{}` has no definition",
            key
        ))),
    }
}

pub(crate) fn parse_created_page(body: &Value) -> AppResult<CreatedPage> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(error_from_body(None, &body.to_string()));
    }
    let page = body
        .get("notion_page_id")
        .ok_or_else(|| AppError::MalformedResponse("missing `notion_page_id`".to_string()))?;
    match page {
        Value::String(id) if !id.is_empty() => Ok(CreatedPage {
            page_id: id.clone(),
        }),
        Value::Object(_) if page.get("status").and_then(Value::as_str) == Some("error") => {
            Err(error_from_body(None, &page.to_string()))
        }
        Value::Object(_) => page
            .get("data")
            .and_then(|data| data.get("page_id"))
            .and_then(Value::as_str)
            .map(|id| CreatedPage {
                page_id: id.to_string(),
            })
            .ok_or_else(|| AppError::MalformedResponse("missing `data.page_id`".to_string())),
        _ => Err(AppError::MalformedResponse(
            "`notion_page_id` is empty".to_string(),
        )),
    }
}

#[async_trait]
impl ScrapeInterface for HttpBackend {
    #[instrument(skip(self))]
    async fn scrape(&self, url: &str) -> AppResult<Content> {
        let body = self.post("/api/scrape", &json!({ "url": url })).await?;
        let content: Content = serde_json::from_value(body)?;
        debug!("Scraped content {} ({} bytes)", content.id, content.body.len());
        Ok(content)
    }
}

#[async_trait]
impl TranslateInterface for HttpBackend {
    #[instrument(skip(self))]
    async fn translate(&self, content_id: &ContentId) -> AppResult<TranslatedContent> {
        let body = self
            .post(
                "/api/translate",
                &json!({ "content_id": content_id_json(content_id) }),
            )
            .await?;
        parse_translation(&body)
    }
}

#[async_trait]
impl SchemaInterface for HttpBackend {
    #[instrument(skip(self))]
    async fn property_catalog(&self) -> AppResult<Vec<PropertyDefinition>> {
        let response = self
            .client
            .get(self.endpoint("/api/notion/properties"))
            .send()
            .await?;
        let body = Self::read_json(response).await?;
        parse_catalog(&body)
    }
}

#[async_trait]
impl PageCreationInterface for HttpBackend {
    #[instrument(skip(self, submission), fields(content_id = %submission.content_id))]
    async fn create_page(&self, submission: &PageSubmission) -> AppResult<CreatedPage> {
        let body = self
            .post(
                "/api/save-to-notion",
                &json!({
                    "content_id": content_id_json(&submission.content_id),
                    "properties": submission.properties,
                }),
            )
            .await?;
        parse_created_page(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_message_and_details() {
        let err = error_from_body(
            Some(500),
            r#"{"error": "Failed to create page", "details": "database not shared"}"#,
        );
        assert_eq!(err.user_message(), "Failed to create page\ndatabase not shared");
    }

    #[test]
    fn test_error_body_falls_back_to_text() {
        let err = error_from_body(Some(502), "Bad Gateway");
        assert_eq!(err.user_message(), "Bad Gateway");

        let err = error_from_body(Some(500), "{}");
        assert_eq!(err.user_message(), "Request failed with status 500");
    }

    #[test]
    fn test_translation_requires_both_fields() {
        let ok = parse_translation(&json!({
            "id": 1,
            "translated_title": "T2",
            "translated_content": "<p>B2</p>"
        }))
        .unwrap();
        assert_eq!(ok, TranslatedContent::new("T2", "<p>B2</p>"));

        let missing = parse_translation(&json!({ "id": 1, "translated_title": null }));
        assert!(matches!(missing, Err(AppError::MalformedResponse(_))));
    }

    #[test]
    fn test_keyed_catalog_keeps_order() {
        let catalog = parse_catalog(&json!({
            "status": "success",
            "data": {
                "Title": { "id": "title", "type": "title" },
                "Tags": { "id": "tags", "name": "Tags", "type": "multi_select",
                          "options": [{ "label": "Web", "value": "web" }] },
                "Notes": "rich_text"
            }
        }))
        .unwrap();

        let ids: Vec<_> = catalog.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["title", "tags", "Notes"]);
        assert_eq!(catalog[0].name, "Title");
        assert_eq!(catalog[1].options().len(), 1);
        assert_eq!(catalog[2].kind, PropertyType::RichText);
    }

    #[test]
    fn test_catalog_array_and_error_envelope() {
        let catalog = parse_catalog(&json!([
            { "id": "date", "name": "Date", "type": "date" }
        ]))
        .unwrap();
        assert_eq!(catalog[0].kind, PropertyType::Date);

        let err = parse_catalog(&json!({
            "status": "error",
            "message": "Notion token missing",
            "type": "validation_error"
        }))
        .unwrap_err();
        assert_eq!(err.user_message(), "Notion token missing");
    }

    #[test]
    fn test_created_page_forms() {
        let plain = parse_created_page(&json!({ "success": true, "notion_page_id": "p-1" }));
        assert_eq!(plain.unwrap().page_id, "p-1");

        let wrapped = parse_created_page(&json!({
            "success": true,
            "notion_page_id": { "status": "success", "data": { "page_id": "p-2" } }
        }));
        assert_eq!(wrapped.unwrap().page_id, "p-2");

        let failed = parse_created_page(&json!({
            "success": true,
            "notion_page_id": { "status": "error", "error": "Invalid property", "details": "tags" }
        }))
        .unwrap_err();
        assert!(matches!(failed, AppError::Endpoint { .. }));
        assert_eq!(failed.user_message(), "Invalid property\ntags");
    }

    #[test]
    fn test_numeric_content_id_stays_numeric() {
        assert_eq!(content_id_json(&ContentId::new("42")), json!(42));
        assert_eq!(content_id_json(&ContentId::new("abc")), json!("abc"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let backend = HttpBackend::with_reqwest_client(reqwest::Client::new(), "http://host:5000/");
        assert_eq!(backend.endpoint("/api/scrape"), "http://host:5000/api/scrape");
    }
}
