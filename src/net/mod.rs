//! HTTP download of dataset sources.
//!
//! Redirects are followed by hand rather than by the HTTP client so that the
//! hop limit and the failure mode are explicit. There is no retry: the first
//! failure aborts the run.

use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{StatusCode, Url};

use crate::util::{Error, Result};

/// Downloader configuration.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Maximum number of redirects followed for a single fetch.
    pub max_redirects: usize,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_redirects: 10,
            user_agent: concat!("imgpack/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// HTTP GET with bounded redirect following.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: reqwest::Client,
    config: DownloadConfig,
}

impl Downloader {
    /// Downloader with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(DownloadConfig::default())
    }

    pub fn with_config(config: DownloadConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Fetch `url` and return the complete response body.
    ///
    /// A 3xx response with a `Location` header is followed (relative
    /// locations resolve against the current URL); 200 returns the body;
    /// any other status fails with [`Error::HttpStatus`].
    #[tracing::instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let mut current = Url::parse(url)
            .map_err(|e| Error::other(format!("Invalid URL {url}: {e}")))?;
        let mut hops = 0usize;

        loop {
            let response = self.client.get(current.clone()).send().await?;
            let status = response.status();

            if status.is_redirection() {
                let next = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|loc| current.join(loc).ok())
                    .ok_or_else(|| Error::MissingRedirectLocation {
                        url: current.to_string(),
                    })?;

                hops += 1;
                if hops > self.config.max_redirects {
                    return Err(Error::TooManyRedirects {
                        url: url.to_string(),
                        limit: self.config.max_redirects,
                    });
                }

                tracing::debug!(status = status.as_u16(), from = %current, to = %next, "redirect");
                current = next;
                continue;
            }

            if status != StatusCode::OK {
                return Err(Error::HttpStatus {
                    status: status.as_u16(),
                    url: current.to_string(),
                });
            }

            let body = response.bytes().await?;
            tracing::info!(url = %current, bytes = body.len(), "downloaded");
            return Ok(body.to_vec());
        }
    }

    /// Fetch several URLs concurrently.
    ///
    /// Results come back in input order. The first failure (in input order)
    /// is returned and the downloads still in flight are aborted.
    pub async fn fetch_all(&self, urls: &[&str]) -> Result<Vec<Vec<u8>>> {
        let mut handles = urls
            .iter()
            .map(|url| {
                let this = self.clone();
                let url = url.to_string();
                tokio::spawn(async move { this.fetch(&url).await })
            })
            .collect::<Vec<_>>()
            .into_iter();

        let mut bodies = Vec::with_capacity(urls.len());
        while let Some(handle) = handles.next() {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(Error::other(format!("Download task failed: {e}"))),
            };
            match result {
                Ok(body) => bodies.push(body),
                Err(e) => {
                    for rest in handles {
                        rest.abort();
                    }
                    return Err(e);
                }
            }
        }
        Ok(bodies)
    }
}
