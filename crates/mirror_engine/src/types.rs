use std::fmt;

pub use mirror_core::{JobId, Stage};

/// Progress for the job in flight; `bytes` while downloading, `attempt` per retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobProgress {
    pub job_id: JobId,
    pub stage: Stage,
    pub bytes: Option<u64>,
    /// 1-based.
    pub attempt: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Progress(JobProgress),
}

/// Raw payload of one successful GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub redirect_count: usize,
    pub content_type: Option<String>,
    pub byte_len: u64,
    /// Attempts it took, counting the successful one.
    pub attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} for {url}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub url: String,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Network,
}

impl FailureKind {
    /// Failures that may go away on another attempt. Bad urls, oversized
    /// payloads and wrong content types fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        match self {
            FailureKind::HttpStatus(_)
            | FailureKind::Timeout
            | FailureKind::RedirectLimitExceeded
            | FailureKind::Network => true,
            FailureKind::InvalidUrl
            | FailureKind::TooLarge { .. }
            | FailureKind::UnsupportedContentType { .. } => false,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => f.write_str("invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => f.write_str("timed out"),
            FailureKind::RedirectLimitExceeded => f.write_str("too many redirects"),
            FailureKind::TooLarge { max_bytes, actual } => match actual {
                Some(actual) => write!(f, "payload of {actual} bytes exceeds {max_bytes}"),
                None => write!(f, "payload exceeds {max_bytes} bytes"),
            },
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unexpected content type {content_type}")
            }
            FailureKind::Network => f.write_str("network error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_name_the_url() {
        let err = FetchError::new(FailureKind::HttpStatus(503), "https://a/p/1", "Service Unavailable");
        assert_eq!(
            err.to_string(),
            "http status 503 for https://a/p/1: Service Unavailable"
        );
    }

    #[test]
    fn only_transient_failures_retry() {
        assert!(FailureKind::Timeout.is_retryable());
        assert!(FailureKind::HttpStatus(404).is_retryable());
        assert!(!FailureKind::InvalidUrl.is_retryable());
        assert!(!FailureKind::TooLarge {
            max_bytes: 1,
            actual: None
        }
        .is_retryable());
    }
}
