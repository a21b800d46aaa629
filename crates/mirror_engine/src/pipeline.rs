use std::path::PathBuf;
use std::sync::Arc;

use chrono::FixedOffset;
use mirror_core::{CatalogEntry, Converter, LinkRewriteTable, MarkdownConverter, MetadataError};
use mirror_logging::{mirror_debug, mirror_warn};
use serde::{Deserialize, Serialize};

use crate::decode::{decode_payload, DecodeError};
use crate::extract::{ArticleExtractor, SourceMode};
use crate::fetch::{Fetcher, NullProgressSink, ProgressSink};
use crate::filename::{article_slug, OutputLayout};
use crate::frontmatter::{build_post_document, FrontMatter};
use crate::persist::{AtomicFileWriter, PersistError};
use crate::{EngineEvent, FetchError, FetchMetadata, JobId, JobProgress, Stage};

/// What happens to an article's cover image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoverPolicy {
    /// Download next to the post as the configured cover file.
    #[default]
    Download,
    /// Reference the remote url from the front matter.
    Link,
    Skip,
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub source_mode: SourceMode,
    pub api_endpoint: String,
    pub layout: OutputLayout,
    pub cover: CoverPolicy,
    pub post_type: Option<String>,
    pub utc_offset: FixedOffset,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error("write failed: {0}")]
    Persist(#[from] PersistError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleOutcome {
    pub slug: String,
    pub title: String,
    pub index_path: PathBuf,
    pub cover_path: Option<PathBuf>,
    /// How the article payload was fetched.
    pub fetch: FetchMetadata,
}

/// Fetch, extract, convert and write one article.
///
/// Nothing touches the output directory until the payload has been converted,
/// so a metadata failure leaves no files behind.
pub struct ArticlePipeline {
    settings: PipelineSettings,
    fetcher: Arc<dyn Fetcher>,
    cover_fetcher: Arc<dyn Fetcher>,
    extractor: Box<dyn ArticleExtractor>,
    converter: Box<dyn Converter>,
    links: Arc<LinkRewriteTable>,
}

impl ArticlePipeline {
    pub fn new(
        settings: PipelineSettings,
        fetcher: Arc<dyn Fetcher>,
        cover_fetcher: Arc<dyn Fetcher>,
        links: Arc<LinkRewriteTable>,
    ) -> Self {
        let extractor = settings.source_mode.extractor();
        Self {
            settings,
            fetcher,
            cover_fetcher,
            extractor,
            converter: Box::new(MarkdownConverter),
            links,
        }
    }

    pub async fn process(
        &self,
        job_id: JobId,
        entry: &CatalogEntry,
        sink: &dyn ProgressSink,
    ) -> Result<ArticleOutcome, PipelineError> {
        let slug = article_slug(&entry.url);
        let source_url =
            self.settings
                .source_mode
                .source_url(&entry.url, &self.settings.api_endpoint, &slug);
        mirror_debug!("job {} fetching {} from {}", job_id, entry.url, source_url);

        let fetched = self.fetcher.fetch(job_id, &source_url, sink).await?;
        let fetch = &fetched.metadata;
        if fetch.final_url != fetch.original_url {
            mirror_debug!(
                "job {} followed {} redirect(s) to {}",
                job_id,
                fetch.redirect_count,
                fetch.final_url
            );
        }
        mirror_debug!(
            "job {} received {} bytes after {} attempt(s)",
            job_id,
            fetch.byte_len,
            fetch.attempts
        );
        emit(sink, job_id, Stage::Converting);

        let decoded = decode_payload(&fetched.bytes, fetched.metadata.content_type.as_deref())?;
        let article = self.extractor.extract(&decoded.text)?;
        let converted = self.converter.convert(&article, &self.links);
        let metadata = &converted.metadata;
        mirror_debug!(
            "job {} converted '{}' ({} bytes of markdown)",
            job_id,
            metadata.title,
            converted.markdown_body.len()
        );

        let cover_bytes = match (self.settings.cover, metadata.cover_url.as_deref()) {
            (CoverPolicy::Download, Some(cover_url)) => self.download_cover(job_id, cover_url).await,
            _ => None,
        };
        let front_matter = FrontMatter {
            title: &metadata.title,
            created: metadata.created,
            updated: metadata.updated,
            post_type: self.settings.post_type.as_deref(),
            cover: match self.settings.cover {
                CoverPolicy::Link => metadata.cover_url.as_deref(),
                CoverPolicy::Download | CoverPolicy::Skip => None,
            },
            series: entry.series.as_ref(),
        };
        let document =
            build_post_document(&front_matter, self.settings.utc_offset, &converted.markdown_body);

        emit(sink, job_id, Stage::Writing);
        let layout = &self.settings.layout;
        let writer = AtomicFileWriter::new(layout.article_dir(&slug));
        let index_path = writer.write(&layout.index_filename, &document)?;
        let cover_path = cover_bytes
            .map(|bytes| writer.write_bytes(&layout.cover_filename, &bytes))
            .transpose()?;
        emit(sink, job_id, Stage::Done);

        Ok(ArticleOutcome {
            slug,
            title: metadata.title.clone(),
            index_path,
            cover_path,
            fetch: fetched.metadata,
        })
    }

    /// A missing cover is not worth losing the article over.
    async fn download_cover(&self, job_id: JobId, url: &str) -> Option<Vec<u8>> {
        match self.cover_fetcher.fetch(job_id, url, &NullProgressSink).await {
            Ok(output) => Some(output.bytes),
            Err(err) => {
                mirror_warn!("job {} cover download failed for {}: {}", job_id, url, err);
                None
            }
        }
    }
}

fn emit(sink: &dyn ProgressSink, job_id: JobId, stage: Stage) {
    sink.emit(EngineEvent::Progress(JobProgress {
        job_id,
        stage,
        bytes: None,
        attempt: None,
    }));
}
