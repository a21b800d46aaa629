use std::borrow::Cow;
use std::collections::HashMap;

use url::Url;

/// Host of the source platform's outbound-link redirect.
pub const REDIRECT_HOST: &str = "link.zhihu.com";
const REDIRECT_TARGET_PARAM: &str = "target";

/// Exact-match table from original URL to rewritten URL.
///
/// Built once before a batch starts and shared read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRewriteTable {
    entries: HashMap<String, String>,
}

impl LinkRewriteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map every url that starts with `from_prefix` to the same url with the
    /// prefix replaced by `to_prefix`. Urls outside the prefix are skipped.
    pub fn from_prefix_swap<'a>(
        urls: impl IntoIterator<Item = &'a str>,
        from_prefix: &str,
        to_prefix: &str,
    ) -> Self {
        urls.into_iter()
            .filter_map(|url| {
                url.strip_prefix(from_prefix)
                    .map(|rest| (url.to_string(), format!("{to_prefix}{rest}")))
            })
            .collect()
    }

    pub fn insert(&mut self, original: impl Into<String>, rewritten: impl Into<String>) {
        self.entries.insert(original.into(), rewritten.into());
    }

    pub fn get(&self, original: &str) -> Option<&str> {
        self.entries.get(original).map(String::as_str)
    }

    /// Rewritten form of `url` when known, `url` itself otherwise.
    pub fn resolve<'a>(&'a self, url: &'a str) -> &'a str {
        self.get(url).unwrap_or(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for LinkRewriteTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Unwrap the platform's outbound redirect (`https://link.zhihu.com/?target=<encoded>`)
/// into the decoded target. Any other href is returned untouched.
pub fn strip_redirect(href: &str) -> Cow<'_, str> {
    let trimmed = href.trim();
    let absolute: Cow<'_, str> = if trimmed.starts_with("//") {
        Cow::Owned(format!("https:{trimmed}"))
    } else {
        Cow::Borrowed(trimmed)
    };

    let Ok(parsed) = Url::parse(&absolute) else {
        return Cow::Borrowed(trimmed);
    };
    if parsed.host_str() != Some(REDIRECT_HOST) {
        return Cow::Borrowed(trimmed);
    }

    parsed
        .query_pairs()
        .find(|(key, _)| key == REDIRECT_TARGET_PARAM)
        .map(|(_, target)| target.into_owned())
        .filter(|target| Url::parse(target).is_ok())
        .map(Cow::Owned)
        .unwrap_or(Cow::Borrowed(trimmed))
}
