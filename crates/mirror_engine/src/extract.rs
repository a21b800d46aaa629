use mirror_core::{
    timestamps_from_initial_data, ApiArticle, ArticleMetadata, MetadataError, ParsedArticle,
};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::html::{element_to_node, parse_fragment};

/// Where article payloads come from. Both modes feed the same converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SourceMode {
    /// JSON article API: `<api_endpoint><id>`.
    #[default]
    Api,
    /// Scraped article page with an embedded `js-initialData` payload.
    Page,
}

impl SourceMode {
    /// Url to fetch for a catalog entry.
    pub fn source_url(self, entry_url: &str, api_endpoint: &str, article_id: &str) -> String {
        match self {
            SourceMode::Api => format!("{api_endpoint}{article_id}"),
            SourceMode::Page => entry_url.to_string(),
        }
    }

    pub fn extractor(self) -> Box<dyn ArticleExtractor> {
        match self {
            SourceMode::Api => Box::new(ApiJsonExtractor),
            SourceMode::Page => Box::new(PageHtmlExtractor),
        }
    }
}

pub trait ArticleExtractor: Send + Sync {
    fn extract(&self, payload: &str) -> Result<ParsedArticle, MetadataError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ApiJsonExtractor;

impl ArticleExtractor for ApiJsonExtractor {
    fn extract(&self, payload: &str) -> Result<ParsedArticle, MetadataError> {
        let article = ApiArticle::from_json(payload)?;
        Ok(ParsedArticle {
            body: parse_fragment(&article.content_html),
            metadata: ArticleMetadata {
                title: article.title,
                cover_url: article.cover_url,
                created: article.created,
                updated: article.updated,
            },
        })
    }
}

const TITLE_SELECTOR: &str = r#"h1[class^="Post-Title"]"#;
const COVER_SELECTOR: &str = r#"meta[property="og:image"]"#;
const INITIAL_DATA_SELECTOR: &str = r#"script[id="js-initialData"]"#;
const BODY_SELECTOR: &str = r#"div[class^="RichText"]"#;

/// Legacy page scraper:
/// - title from the `Post-Title` heading
/// - cover from `og:image`
/// - timestamps from the embedded `js-initialData` json
/// - body from the first `RichText` container
#[derive(Debug, Default, Clone, Copy)]
pub struct PageHtmlExtractor;

impl ArticleExtractor for PageHtmlExtractor {
    fn extract(&self, payload: &str) -> Result<ParsedArticle, MetadataError> {
        let doc = Html::parse_document(payload);

        let title = select_first(&doc, TITLE_SELECTOR)
            .map(|h1| h1.text().collect::<String>().trim().to_string())
            .filter(|title| !title.is_empty())
            .ok_or_else(|| MetadataError::NotFound("Post-Title heading".to_string()))?;

        let cover_url = select_first(&doc, COVER_SELECTOR)
            .and_then(|meta| meta.value().attr("content"))
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(ToOwned::to_owned);

        let initial_data = select_first(&doc, INITIAL_DATA_SELECTOR)
            .map(|script| script.text().collect::<String>())
            .ok_or_else(|| MetadataError::NotFound("js-initialData script".to_string()))?;
        let initial_data: serde_json::Value = serde_json::from_str(&initial_data)?;
        let (created, updated) = timestamps_from_initial_data(&initial_data)?;

        let body = select_first(&doc, BODY_SELECTOR)
            .map(element_to_node)
            .ok_or_else(|| MetadataError::NotFound("RichText body".to_string()))?;

        Ok(ParsedArticle {
            metadata: ArticleMetadata {
                title,
                cover_url,
                created,
                updated,
            },
            body,
        })
    }
}

fn select_first<'a>(doc: &'a Html, selector: &str) -> Option<scraper::ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    doc.select(&selector).next()
}
