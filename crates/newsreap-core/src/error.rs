//! Error type shared by site adapters

use std::io;

/// Error from listing a category page or enriching an article.
///
/// Any variant returned by [`Source::list_category`](crate::Source::list_category)
/// counts as one failed attempt for that category; the scanner retries the same
/// offset. Errors from [`Source::enrich`](crate::Source::enrich) drop the article.
#[derive(Debug)]
pub enum FetchError {
    /// HTTP error with optional status code
    Http {
        status: Option<u16>,
        message: String,
    },
    /// I/O error (including request timeouts)
    Io(io::Error),
    /// Response body could not be decoded
    Decode(String),
    /// Page markup did not have the expected structure
    Layout(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http {
                status: Some(s),
                message,
            } => write!(f, "HTTP {s}: {message}"),
            Self::Http {
                status: None,
                message,
            } => write!(f, "HTTP error: {message}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Decode(msg) => write!(f, "decode error: {msg}"),
            Self::Layout(msg) => write!(f, "unexpected layout: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl FetchError {
    /// Create HTTP error from reqwest error
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        if e.is_decode() {
            return Self::Decode(e.to_string());
        }
        Self::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }

    /// Whether a later attempt could plausibly succeed.
    ///
    /// Does not change the scanner's retry policy, which retries every listing
    /// failure up to its threshold; it only picks the log level of repeats.
    pub fn is_retryable(&self) -> bool {
        match self {
            // 404/410: page is gone
            Self::Http { status, .. } => !matches!(status, Some(404) | Some(410)),
            Self::Io(e) => e.kind() != io::ErrorKind::StorageFull,
            Self::Decode(_) | Self::Layout(_) => false,
        }
    }
}

impl From<io::Error> for FetchError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_err(status: u16) -> FetchError {
        FetchError::Http {
            status: Some(status),
            message: "test".to_string(),
        }
    }

    #[test]
    fn http_404_not_retryable() {
        assert!(!http_err(404).is_retryable());
    }

    #[test]
    fn http_503_retryable() {
        assert!(http_err(503).is_retryable());
    }

    #[test]
    fn http_none_status_retryable() {
        let err = FetchError::Http {
            status: None,
            message: "connection refused".to_string(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn io_timeout_retryable() {
        let err = FetchError::from(io::Error::new(io::ErrorKind::TimedOut, "timeout"));
        assert!(err.is_retryable());
    }

    #[test]
    fn layout_not_retryable() {
        assert!(!FetchError::Layout("no listing block".into()).is_retryable());
    }

    #[test]
    fn json_error_becomes_decode() {
        let e = serde_json::from_str::<u32>("nope").unwrap_err();
        assert!(matches!(FetchError::from(e), FetchError::Decode(_)));
    }

    #[test]
    fn display_http_with_status() {
        assert_eq!(format!("{}", http_err(502)), "HTTP 502: test");
    }

    #[test]
    fn display_layout() {
        let err = FetchError::Layout("no header".into());
        assert_eq!(format!("{err}"), "unexpected layout: no header");
    }
}
