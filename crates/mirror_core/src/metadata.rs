use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::node::DocumentNode;

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("metadata not found: {0}")]
    NotFound(String),
    #[error("timestamp {0} is out of range")]
    InvalidTimestamp(i64),
    #[error("embedded payload is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}

impl MetadataError {
    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleMetadata {
    pub title: String,
    pub cover_url: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Extracted article: metadata plus the body container tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArticle {
    pub metadata: ArticleMetadata,
    pub body: DocumentNode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub markdown_body: String,
    pub metadata: ArticleMetadata,
}

pub fn timestamp(epoch_seconds: i64) -> Result<DateTime<Utc>, MetadataError> {
    DateTime::from_timestamp(epoch_seconds, 0).ok_or(MetadataError::InvalidTimestamp(epoch_seconds))
}

/// Article fields of the platform's JSON article API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiArticle {
    pub title: String,
    pub content_html: String,
    pub cover_url: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl ApiArticle {
    pub fn from_json(payload: &str) -> Result<Self, MetadataError> {
        let value: Value = serde_json::from_str(payload)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, MetadataError> {
        let title = required_str(value, "title")?;
        let content_html = required_str(value, "content")?;
        let created = timestamp(required_i64(value, "created")?)?;
        let updated = timestamp(required_i64(value, "updated")?)?;
        let cover_url = value
            .get("image_url")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(ToOwned::to_owned);

        Ok(Self {
            title: title.to_string(),
            content_html: content_html.to_string(),
            cover_url,
            created,
            updated,
        })
    }
}

/// Navigate `initialState.entities.<articles|columns>.<first id>` of the page's
/// embedded `js-initialData` payload and read `created`/`updated`.
pub fn timestamps_from_initial_data(
    data: &Value,
) -> Result<(DateTime<Utc>, DateTime<Utc>), MetadataError> {
    let entities = data
        .pointer("/initialState/entities")
        .ok_or_else(|| MetadataError::not_found("initialState.entities"))?;

    let entity = ["articles", "columns"]
        .iter()
        .filter_map(|kind| entities.get(kind).and_then(Value::as_object))
        .find_map(|by_id| by_id.values().next())
        .ok_or_else(|| MetadataError::not_found("initialState.entities.articles.<id>"))?;

    let created = timestamp(required_i64(entity, "created")?)?;
    let updated = timestamp(required_i64(entity, "updated")?)?;
    Ok((created, updated))
}

fn required_str<'a>(value: &'a Value, key: &str) -> Result<&'a str, MetadataError> {
    value
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| MetadataError::not_found(key))
}

fn required_i64(value: &Value, key: &str) -> Result<i64, MetadataError> {
    value
        .get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| MetadataError::not_found(key))
}
