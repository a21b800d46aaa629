//! Mirror core: pure document conversion and the batch state machine.
//!
//! Nothing in this crate performs I/O. The engine crate feeds it parsed
//! trees and executes the effects it returns.
mod catalog;
mod convert;
mod effect;
mod links;
mod metadata;
mod msg;
mod node;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, StopPolicy};
pub use msg::Msg;
pub use state::{BatchState, JobId, JobResultKind, SessionState, Stage};
pub use update::update;
pub use view_model::{BatchViewModel, JobRowView};
pub use catalog::{Catalog, CatalogEntry, SeriesRef};
pub use convert::{
    render_code_block, render_image, render_inline_run, render_link, render_markdown,
    render_unordered_list, Converter, MarkdownConverter, NEW_WINDOW_TARGET,
};
pub use links::{strip_redirect, LinkRewriteTable, REDIRECT_HOST};
pub use metadata::{
    timestamp, timestamps_from_initial_data, ApiArticle, ArticleMetadata, ConversionResult,
    MetadataError, ParsedArticle,
};
pub use node::{DocumentNode, Tag, CODE_BLOCK_CLASS};
