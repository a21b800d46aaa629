//! Mirror engine: fetching, extraction, output and effect execution.
mod catalog;
mod decode;
mod engine;
mod extract;
mod fetch;
mod filename;
mod frontmatter;
mod html;
mod persist;
mod pipeline;
mod types;

pub use catalog::{load_catalog, parse_catalog, CatalogError};
pub use decode::{decode_payload, DecodeError, DecodedPayload};
pub use engine::{BatchReport, BatchRunner};
pub use extract::{ApiJsonExtractor, ArticleExtractor, PageHtmlExtractor, SourceMode};
pub use fetch::{
    pick_delay, ChannelProgressSink, FetchSettings, Fetcher, NullProgressSink, ProgressSink,
    ReqwestFetcher, RetryPolicy, RetryingFetcher, DEFAULT_USER_AGENT,
};
pub use filename::{article_slug, OutputLayout};
pub use frontmatter::{build_post_document, local_timestamp, FrontMatter};
pub use html::{element_to_node, parse_fragment};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use pipeline::{ArticleOutcome, ArticlePipeline, CoverPolicy, PipelineError, PipelineSettings};
pub use types::{
    EngineEvent, FailureKind, FetchError, FetchMetadata, FetchOutput, JobId, JobProgress, Stage,
};
