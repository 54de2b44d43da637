//! Remote directory fetcher
//!
//! Fetches a single page of students over HTTP. No retries happen here;
//! callers decide whether to try again.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use super::message::UserPage;
use crate::config::Config;

/// Errors from fetching a page
#[derive(Error, Debug)]
pub enum FetchError {
    /// Could not build the HTTP client
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Transport failure (unreachable host, timeout, reset connection)
    #[error("Network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("Server returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// The body was not a valid page
    #[error("Malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// Transport-level failure (as opposed to a bad payload)
    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Network { .. } | FetchError::Status { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, FetchError::Decode { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Network { source, .. } if source.is_timeout())
    }
}

/// Source of remote student pages
pub trait RemoteFetcher: Send + Sync {
    /// Fetch one page (1-based) of the directory
    fn fetch_page(&self, page: u32) -> impl Future<Output = Result<UserPage, FetchError>> + Send;
}

/// HTTP implementation of [`RemoteFetcher`]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    /// Create a fetcher for the API rooted at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("roster/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a fetcher from configuration
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::new(&config.api_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of a directory page
    pub fn page_url(&self, page: u32) -> String {
        format!("{}/users?page={}", self.base_url, page)
    }
}

impl RemoteFetcher for HttpFetcher {
    fn fetch_page(&self, page: u32) -> impl Future<Output = Result<UserPage, FetchError>> + Send {
        async move {
            let url = self.page_url(page);
            debug!("Fetching {}", url);

            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|source| FetchError::Network {
                    url: url.clone(),
                    source,
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    url,
                    status: status.as_u16(),
                });
            }

            let body = response
                .text()
                .await
                .map_err(|source| FetchError::Network {
                    url: url.clone(),
                    source,
                })?;

            let page = UserPage::decode(&body).map_err(|source| FetchError::Decode {
                url: url.clone(),
                source,
            })?;

            debug!("Fetched page {} with {} students", page.page, page.data.len());
            Ok(page)
        }
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Scripted fetcher for merger and coordinator tests

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::models::Student;

    /// Replays queued responses; an empty queue answers HTTP 503
    #[derive(Default)]
    pub struct ScriptedFetcher {
        responses: Mutex<VecDeque<Result<UserPage, FetchError>>>,
        calls: AtomicUsize,
        delay: Option<Duration>,
    }

    impl ScriptedFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        /// Delay every response (to widen race windows in tests)
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn respond(self, students: Vec<Student>) -> Self {
            self.push(Ok(UserPage::single(students)));
            self
        }

        pub fn fail(self, error: FetchError) -> Self {
            self.push(Err(error));
            self
        }

        pub fn push(&self, response: Result<UserPage, FetchError>) {
            self.responses.lock().unwrap().push_back(response);
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl RemoteFetcher for ScriptedFetcher {
        fn fetch_page(
            &self,
            page: u32,
        ) -> impl Future<Output = Result<UserPage, FetchError>> + Send {
            async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                if let Some(delay) = self.delay {
                    tokio::time::sleep(delay).await;
                }
                let next = self.responses.lock().unwrap().pop_front();
                next.unwrap_or_else(|| {
                    Err(FetchError::Status {
                        url: format!("mock://users?page={}", page),
                        status: 503,
                    })
                })
            }
        }
    }

    /// A decode error as produced by a malformed body
    pub fn decode_error() -> FetchError {
        FetchError::Decode {
            url: "mock://users?page=1".to_string(),
            source: UserPage::decode("<html>oops</html>").unwrap_err(),
        }
    }
}
