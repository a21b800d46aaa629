use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use futures_util::StreamExt;
use mirror_logging::{mirror_debug, mirror_warn};
use rand::seq::SliceRandom;
use reqwest::header::CONTENT_TYPE;

use crate::{EngineEvent, FailureKind, FetchError, FetchMetadata, FetchOutput, JobId, JobProgress, Stage};

/// Desktop browser identity; the platform rejects unknown agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Limits for a single GET.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    /// Accepted mime types; `type/*` matches a whole family. Empty accepts anything.
    pub allowed_content_types: Vec<String>,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(10),
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
            allowed_content_types: ["text/html", "application/xhtml+xml", "application/json"]
                .map(String::from)
                .to_vec(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetchSettings {
    /// Cover downloads: any image type, larger payloads.
    pub fn for_images() -> Self {
        Self {
            max_bytes: 20 * 1024 * 1024,
            allowed_content_types: vec!["image/*".to_string()],
            ..Self::default()
        }
    }

    fn accepts(&self, content_type: &str) -> bool {
        if self.allowed_content_types.is_empty() {
            return true;
        }
        let mime = content_type.split(';').next().unwrap_or_default().trim();
        self.allowed_content_types
            .iter()
            .any(|allowed| match allowed.strip_suffix("/*") {
                Some(family) => mime
                    .split_once('/')
                    .is_some_and(|(ty, _)| ty.eq_ignore_ascii_case(family)),
                None => allowed.eq_ignore_ascii_case(mime),
            })
    }
}

/// Bounded attempts with a delay drawn at random from a small fixed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delays: Vec<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            delays: [1, 2, 3, 4].map(Duration::from_secs).to_vec(),
        }
    }
}

impl RetryPolicy {
    pub fn for_images() -> Self {
        Self {
            max_attempts: 10,
            ..Self::default()
        }
    }

    pub fn no_delay(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            delays: Vec::new(),
        }
    }

    pub fn next_delay(&self) -> Duration {
        pick_delay(&self.delays)
    }
}

/// One of `delays` at random, zero when empty.
pub fn pick_delay(delays: &[Duration]) -> Duration {
    delays
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(Duration::ZERO)
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

/// Forwards progress to the batch runner.
pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Discards progress; for one-off downloads nobody watches.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _event: EngineEvent) {}
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(
        &self,
        job_id: JobId,
        url: &str,
        sink: &dyn ProgressSink,
    ) -> Result<FetchOutput, FetchError>;
}

/// Single-attempt HTTP GET.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn client(&self, redirects: Arc<AtomicUsize>) -> reqwest::Result<reqwest::Client> {
        let limit = self.settings.redirect_limit;
        let policy = reqwest::redirect::Policy::custom(move |attempt| {
            let seen = attempt.previous().len();
            redirects.store(seen, Ordering::Relaxed);
            if seen >= limit {
                attempt.error("redirect limit exceeded")
            } else {
                attempt.follow()
            }
        });

        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .user_agent(self.settings.user_agent.as_str())
            .redirect(policy)
            .build()
    }

    fn too_large(&self, actual: u64) -> FailureKind {
        FailureKind::TooLarge {
            max_bytes: self.settings.max_bytes,
            actual: Some(actual),
        }
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(
        &self,
        job_id: JobId,
        url: &str,
        sink: &dyn ProgressSink,
    ) -> Result<FetchOutput, FetchError> {
        let fail = |kind: FailureKind, message: String| FetchError::new(kind, url, message);
        let from_reqwest = |err: reqwest::Error| fail(classify(&err), err.to_string());

        let parsed =
            reqwest::Url::parse(url).map_err(|err| fail(FailureKind::InvalidUrl, err.to_string()))?;
        let redirects = Arc::new(AtomicUsize::new(0));
        let client = self
            .client(redirects.clone())
            .map_err(|err| fail(FailureKind::Network, err.to_string()))?;

        let response = client.get(parsed).send().await.map_err(from_reqwest)?;
        let status = response.status();
        if !status.is_success() {
            return Err(fail(FailureKind::HttpStatus(status.as_u16()), status.to_string()));
        }
        if let Some(declared) = response.content_length() {
            if declared > self.settings.max_bytes {
                return Err(fail(self.too_large(declared), "declared length".to_string()));
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        if let Some(ct) = content_type.as_deref().filter(|ct| !self.settings.accepts(ct)) {
            return Err(fail(
                FailureKind::UnsupportedContentType {
                    content_type: ct.to_string(),
                },
                "rejected by allowlist".to_string(),
            ));
        }
        let final_url = response.url().to_string();

        let mut bytes = Vec::new();
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(from_reqwest)?;
            let received = (bytes.len() + chunk.len()) as u64;
            if received > self.settings.max_bytes {
                return Err(fail(self.too_large(received), "body exceeded limit".to_string()));
            }
            bytes.extend_from_slice(&chunk);
            sink.emit(EngineEvent::Progress(JobProgress {
                job_id,
                stage: Stage::Fetching,
                bytes: Some(received),
                attempt: None,
            }));
        }

        Ok(FetchOutput {
            metadata: FetchMetadata {
                original_url: url.to_string(),
                final_url,
                redirect_count: redirects.load(Ordering::Relaxed),
                content_type,
                byte_len: bytes.len() as u64,
                attempts: 1,
            },
            bytes,
        })
    }
}

fn classify(err: &reqwest::Error) -> FailureKind {
    if err.is_timeout() {
        FailureKind::Timeout
    } else if err.is_redirect() {
        FailureKind::RedirectLimitExceeded
    } else {
        FailureKind::Network
    }
}

/// Wraps a fetcher with [`RetryPolicy`]. Non-retryable failures return at once;
/// after the last attempt the final failure is returned.
pub struct RetryingFetcher<F> {
    inner: F,
    policy: RetryPolicy,
}

impl<F: Fetcher> RetryingFetcher<F> {
    pub fn new(inner: F, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait::async_trait]
impl<F: Fetcher> Fetcher for RetryingFetcher<F> {
    async fn fetch(
        &self,
        job_id: JobId,
        url: &str,
        sink: &dyn ProgressSink,
    ) -> Result<FetchOutput, FetchError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            sink.emit(EngineEvent::Progress(JobProgress {
                job_id,
                stage: Stage::Fetching,
                bytes: None,
                attempt: Some(attempt),
            }));

            match self.inner.fetch(job_id, url, sink).await {
                Ok(mut output) => {
                    output.metadata.attempts = attempt;
                    return Ok(output);
                }
                Err(err) if err.kind.is_retryable() && attempt < max_attempts => {
                    let delay = self.policy.next_delay();
                    mirror_warn!(
                        "attempt {}/{}: {}; retrying in {:?}",
                        attempt,
                        max_attempts,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    mirror_debug!("giving up after {} attempt(s): {}", attempt, err);
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowlist_matches_families_and_ignores_parameters() {
        let images = FetchSettings::for_images();
        assert!(images.accepts("image/png"));
        assert!(images.accepts("IMAGE/webp"));
        assert!(!images.accepts("text/html"));

        let pages = FetchSettings::default();
        assert!(pages.accepts("application/json; charset=utf-8"));
        assert!(!pages.accepts("application/zip"));

        let open = FetchSettings {
            allowed_content_types: Vec::new(),
            ..FetchSettings::default()
        };
        assert!(open.accepts("application/octet-stream"));
    }
}
