use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use chrono::{FixedOffset, Local, Offset};
use mirror_engine::{CoverPolicy, FetchSettings, OutputLayout, RetryPolicy, SourceMode, DEFAULT_USER_AGENT};
use mirror_logging::mirror_info;
use serde::{Deserialize, Serialize};

const PAGE_POST_TYPE: &str = "post";

/// Settings read from `mirror.ron`. Every field has a default, so a partial
/// file (or none at all) is fine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    pub source_mode: SourceMode,
    /// Prefix the article id is appended to in `Api` mode.
    pub api_endpoint: String,
    /// Catalog urls under this prefix are rewritten to `target_prefix` in links.
    pub source_prefix: String,
    pub target_prefix: String,
    pub output_dir: PathBuf,
    pub index_filename: String,
    pub cover_filename: String,
    /// `None` follows the source mode: downloaded for `Api`, linked for `Page`.
    pub cover: Option<CoverPolicy>,
    /// Front matter `type`; `None` writes `post` for `Page` and nothing for `Api`.
    pub post_type: Option<String>,
    /// Front matter offset; `None` uses the host's local offset.
    pub utc_offset_minutes: Option<i32>,
    pub politeness_delays_secs: Vec<u64>,
    pub article_fetch: FetchConfig,
    pub cover_fetch: FetchConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub max_attempts: u32,
    pub retry_delays_secs: Vec<u64>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: RetryPolicy::default().max_attempts,
            retry_delays_secs: vec![1, 2, 3, 4],
            request_timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetchConfig {
    fn for_images() -> Self {
        Self {
            max_attempts: RetryPolicy::for_images().max_attempts,
            ..Self::default()
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            delays: seconds(&self.retry_delays_secs),
        }
    }

    /// Apply timeout and agent on top of `base`.
    pub fn fetch_settings(&self, base: FetchSettings) -> FetchSettings {
        FetchSettings {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            user_agent: self.user_agent.clone(),
            ..base
        }
    }
}

impl Default for MirrorConfig {
    fn default() -> Self {
        let layout = OutputLayout::new("content/articles");
        Self {
            source_mode: SourceMode::default(),
            api_endpoint: "https://api.zhihu.com/article/".to_string(),
            source_prefix: "https://zhuanlan.zhihu.com/p".to_string(),
            target_prefix: "https://example.com/articles".to_string(),
            output_dir: layout.root,
            index_filename: layout.index_filename,
            cover_filename: layout.cover_filename,
            cover: None,
            post_type: None,
            utc_offset_minutes: None,
            politeness_delays_secs: vec![1, 2, 3, 4],
            article_fetch: FetchConfig::default(),
            cover_fetch: FetchConfig::for_images(),
        }
    }
}

impl MirrorConfig {
    /// Read `path`, or fall back to defaults when it does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            mirror_info!("no config at {}; using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(content)
    }

    pub fn cover_policy(&self) -> CoverPolicy {
        self.cover.unwrap_or(match self.source_mode {
            SourceMode::Api => CoverPolicy::Download,
            SourceMode::Page => CoverPolicy::Link,
        })
    }

    pub fn post_type(&self) -> Option<String> {
        match (&self.post_type, self.source_mode) {
            (Some(post_type), _) => Some(post_type.clone()),
            (None, SourceMode::Page) => Some(PAGE_POST_TYPE.to_string()),
            (None, SourceMode::Api) => None,
        }
    }

    pub fn layout(&self) -> OutputLayout {
        OutputLayout {
            root: self.output_dir.clone(),
            index_filename: self.index_filename.clone(),
            cover_filename: self.cover_filename.clone(),
        }
    }

    pub fn utc_offset(&self) -> anyhow::Result<FixedOffset> {
        match self.utc_offset_minutes {
            Some(minutes) => FixedOffset::east_opt(minutes * 60)
                .with_context(|| format!("utc_offset_minutes {minutes} is out of range")),
            None => Ok(Local::now().offset().fix()),
        }
    }

    pub fn politeness_delays(&self) -> Vec<Duration> {
        seconds(&self.politeness_delays_secs)
    }
}

fn seconds(values: &[u64]) -> Vec<Duration> {
    values.iter().copied().map(Duration::from_secs).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let config = MirrorConfig::parse(
            r#"(
                source_mode: Page,
                target_prefix: "https://blog.example/posts",
                post_type: Some("post"),
                utc_offset_minutes: Some(480),
                article_fetch: (max_attempts: 3),
            )"#,
        )
        .unwrap();

        assert_eq!(config.source_mode, SourceMode::Page);
        assert_eq!(config.target_prefix, "https://blog.example/posts");
        assert_eq!(config.post_type.as_deref(), Some("post"));
        assert_eq!(config.source_prefix, MirrorConfig::default().source_prefix);
        assert_eq!(config.article_fetch.max_attempts, 3);
        assert_eq!(config.article_fetch.retry_delays_secs, vec![1, 2, 3, 4]);
        assert_eq!(config.cover_fetch.max_attempts, 10);
        assert_eq!(config.utc_offset().unwrap(), FixedOffset::east_opt(8 * 3600).unwrap());
    }

    #[test]
    fn cover_policy_and_post_type_follow_source_mode_unless_set() {
        let mut config = MirrorConfig::default();
        assert_eq!(config.cover_policy(), CoverPolicy::Download);
        assert_eq!(config.post_type(), None);

        config.source_mode = SourceMode::Page;
        assert_eq!(config.cover_policy(), CoverPolicy::Link);
        assert_eq!(config.post_type().as_deref(), Some("post"));

        config.cover = Some(CoverPolicy::Skip);
        config.post_type = Some("note".to_string());
        assert_eq!(config.cover_policy(), CoverPolicy::Skip);
        assert_eq!(config.post_type().as_deref(), Some("note"));

        config.source_mode = SourceMode::Api;
        assert_eq!(config.post_type().as_deref(), Some("note"));
    }

    #[test]
    fn fetch_config_maps_onto_engine_settings() {
        let fetch = FetchConfig {
            request_timeout_secs: 3,
            retry_delays_secs: vec![5],
            ..FetchConfig::default()
        };
        let settings = fetch.fetch_settings(FetchSettings::for_images());
        assert_eq!(settings.request_timeout, Duration::from_secs(3));
        assert_eq!(settings.allowed_content_types, vec!["image/*".to_string()]);
        assert_eq!(fetch.retry_policy().delays, vec![Duration::from_secs(5)]);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = MirrorConfig::load(&dir.path().join("mirror.ron")).unwrap();
        assert_eq!(config, MirrorConfig::default());
    }

    #[test]
    fn out_of_range_offset_is_rejected() {
        let config = MirrorConfig {
            utc_offset_minutes: Some(24 * 60),
            ..MirrorConfig::default()
        };
        assert!(config.utc_offset().is_err());
    }
}
