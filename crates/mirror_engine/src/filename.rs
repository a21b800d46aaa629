use std::path::PathBuf;

use sha2::{Digest, Sha256};

/// Directory name for an article: the trailing path segment of its url,
/// made filesystem-safe. Falls back to a short url hash when nothing usable is left.
pub fn article_slug(url: &str) -> String {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');
    let segment = match path.rsplit_once('/') {
        Some((head, tail)) if !head.ends_with('/') && !head.is_empty() => tail,
        _ => "",
    };

    let sanitized = sanitize_segment(segment);
    if sanitized.is_empty() {
        format!("article-{}", short_hash(url))
    } else {
        sanitized
    }
}

/// Where one article's files land: `<root>/<slug>/<index>` and `<root>/<slug>/<cover>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub root: PathBuf,
    pub index_filename: String,
    pub cover_filename: String,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index_filename: "index.md".to_string(),
            cover_filename: "featured.png".to_string(),
        }
    }

    pub fn article_dir(&self, slug: &str) -> PathBuf {
        self.root.join(slug)
    }

    pub fn index_path(&self, slug: &str) -> PathBuf {
        self.article_dir(slug).join(&self.index_filename)
    }

    pub fn cover_path(&self, slug: &str) -> PathBuf {
        self.article_dir(slug).join(&self.cover_filename)
    }
}

fn sanitize_segment(input: &str) -> String {
    let mut compacted = String::with_capacity(input.len());
    let mut prev_underscore = false;
    for c in input.chars() {
        let c = if is_forbidden(c) { '_' } else { c };
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }

    let mut name = compacted.trim_matches(&['_', ' ', '.'][..]).to_string();
    if name.chars().count() > 80 {
        name = name.chars().take(80).collect();
    }
    if is_reserved_windows_name(&name) {
        name.push('_');
    }
    name
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '%' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    digest.iter().take(4).map(|byte| format!("{byte:02x}")).collect()
}
