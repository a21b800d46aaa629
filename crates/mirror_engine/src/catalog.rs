use std::fs;
use std::path::Path;

use mirror_core::Catalog;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse catalog {path}: {source}")]
    Parse {
        path: String,
        source: ron::error::SpannedError,
    },
}

/// Load a RON catalog: `(entries: [(url: "...", series: Some((name: "...", order: 1)))])`.
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_catalog(&content).map_err(|source| CatalogError::Parse {
        path: path.display().to_string(),
        source,
    })
}

pub fn parse_catalog(content: &str) -> Result<Catalog, ron::error::SpannedError> {
    ron::from_str(content)
}
