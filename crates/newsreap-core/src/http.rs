//! Blocking HTTP access for site adapters.
//!
//! Uses async reqwest internally with tokio::time::timeout for stuck requests,
//! but presents a sync interface for the pipeline's scanner and worker threads.

use std::io;
use std::sync::{LazyLock, OnceLock};
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::FetchError;

/// Timeouts applied to every adapter request
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    /// Upper bound for one request, from send to the last body byte
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(60),
            user_agent: concat!("newsreap/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

static HTTP_CONFIG: OnceLock<HttpConfig> = OnceLock::new();

/// Install the global HTTP configuration.
///
/// Must run before the first request; later calls are ignored.
pub fn set_http_config(config: HttpConfig) {
    if HTTP_CONFIG.set(config).is_err() {
        log::debug!("HTTP config already set, ignoring");
    }
}

/// Current HTTP configuration (defaults if never set)
fn http_config() -> &'static HttpConfig {
    HTTP_CONFIG.get_or_init(HttpConfig::default)
}

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    let config = http_config();
    reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .user_agent(config.user_agent.clone())
        .pool_max_idle_per_host(8)
        .build()
        .expect("failed to build HTTP client")
});

/// Shared tokio runtime for HTTP operations.
static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// HTTP GET → response body as text.
///
/// Non-2xx statuses are errors. Blocks the calling thread.
pub fn get_text(url: &str) -> Result<String, FetchError> {
    let timeout = http_config().request_timeout;

    SHARED_RUNTIME.handle().block_on(async {
        let request = async {
            let response = SHARED_CLIENT
                .get(url)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| FetchError::from_reqwest(&e))?;

            response
                .text()
                .await
                .map_err(|e| FetchError::from_reqwest(&e))
        };

        match tokio::time::timeout(timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("request timeout ({}s)", timeout.as_secs()),
            ))),
        }
    })
}

/// HTTP GET → JSON body decoded into `T`.
pub fn get_json<T: DeserializeOwned>(url: &str) -> Result<T, FetchError> {
    let body = get_text(url)?;
    serde_json::from_str(&body).map_err(|e| FetchError::Decode(format!("{url}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_timeouts() {
        let config = HttpConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert!(config.request_timeout >= config.connect_timeout);
        assert!(config.user_agent.starts_with("newsreap/"));
    }

    #[test]
    fn unreachable_host_is_http_error() {
        // Loopback discard port: refused immediately, no DNS involved
        let err = get_text("http://127.0.0.1:9/").unwrap_err();
        assert!(matches!(err, FetchError::Http { status: None, .. }));
    }
}
