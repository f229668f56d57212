//! # HTTP Fetch
//!
//! One GET per pull on a blocking thread, with connect/read timeouts and
//! no retry. Any failure is logged at `warn` and becomes an empty body, so
//! a pull over a dead connection is a no-op rather than an error.

use std::future::Future;
use std::io::Read;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::HttpSettings;
use crate::error::{SyncError, SyncResult};

/// Largest body read from the server.
const MAX_BODY_BYTES: u64 = 32 * 1024 * 1024;

/// Source of raw record files.
pub trait Fetcher: Send + Sync {
    /// Body of `url`, or empty when it could not be fetched.
    fn fetch(&self, url: &str) -> impl Future<Output = Vec<u8>> + Send;
}

/// [`Fetcher`] backed by `ureq`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
    read_timeout: Duration,
}

impl HttpFetcher {
    pub fn new(settings: &HttpSettings) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(settings.connect_timeout())
            .timeout_read(settings.read_timeout())
            .build();
        HttpFetcher {
            agent,
            read_timeout: settings.read_timeout(),
        }
    }

    /// Like [`Fetcher::fetch`] but keeps the error.
    pub async fn try_fetch(&self, url: &str) -> SyncResult<Vec<u8>> {
        let agent = self.agent.clone();
        let url = url.to_string();
        let timeout_secs = self.read_timeout.as_secs();
        tokio::task::spawn_blocking(move || get_blocking(&agent, &url, timeout_secs)).await?
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        HttpFetcher::new(&HttpSettings::default())
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Vec<u8> {
        match self.try_fetch(url).await {
            Ok(body) => {
                debug!(url = %url, bytes = body.len(), "Fetched");
                body
            }
            Err(e) => {
                warn!(url = %url, error = %e, retryable = e.is_retryable(), "Fetch failed, treating as no data");
                Vec::new()
            }
        }
    }
}

fn get_blocking(agent: &ureq::Agent, url: &str, timeout_secs: u64) -> SyncResult<Vec<u8>> {
    let response = agent.get(url).call().map_err(|e| match e {
        ureq::Error::Status(status, _) => SyncError::HttpStatus {
            status,
            url: url.to_string(),
        },
        ureq::Error::Transport(t) => SyncError::ConnectionFailed(t.to_string()),
    })?;

    let mut body = Vec::new();
    response
        .into_reader()
        .take(MAX_BODY_BYTES)
        .read_to_end(&mut body)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => {
                SyncError::Timeout(timeout_secs)
            }
            _ => SyncError::ConnectionFailed(e.to_string()),
        })?;
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick() -> HttpFetcher {
        HttpFetcher::new(&HttpSettings {
            connect_timeout_secs: 1,
            read_timeout_secs: 1,
            base_url: None,
        })
    }

    #[tokio::test]
    async fn test_unreachable_server_is_no_data() {
        // Port 9 on loopback refuses connections
        let fetcher = quick();
        let url = "http://127.0.0.1:9/dk/customers.txt";

        assert!(matches!(
            fetcher.try_fetch(url).await,
            Err(SyncError::ConnectionFailed(_)) | Err(SyncError::Timeout(_))
        ));
        assert!(fetcher.fetch(url).await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_url_is_no_data() {
        assert!(quick().fetch("not a url").await.is_empty());
    }
}
