//! GitHub HTTP client implementation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::atom::decode_feed;
use crate::domain::entities::SourceEntry;
use crate::domain::ports::SourceClient;
use crate::error::FetchError;

const USER_AGENT: &str = concat!("github-diff-feed/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed implementation of the source client
pub struct GithubClientImpl {
    http: Client,
}

impl GithubClientImpl {
    /// Build a client whose every request is bounded by `timeout`
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http })
    }

    async fn handle_response(&self, response: reqwest::Response) -> Result<String, FetchError> {
        let status = response.status();

        if status.is_success() {
            let bytes = response.bytes().await?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        } else {
            Err(FetchError::Status {
                url: response.url().to_string(),
                status: status.as_u16(),
            })
        }
    }
}

#[async_trait]
impl SourceClient for GithubClientImpl {
    async fn fetch_feed(&self, url: &str) -> Result<Vec<SourceEntry>, FetchError> {
        let response = self.http.get(url).send().await?;
        let body = self.handle_response(response).await?;
        decode_feed(&body)
    }

    async fn fetch_body(&self, url: &str) -> Result<String, FetchError> {
        let response = self.http.get(url).send().await?;
        self.handle_response(response).await
    }

    async fn ping(&self, url: &str) -> Result<(), FetchError> {
        let response = self.http.get(url).send().await?;
        self.handle_response(response).await.map(|_| ())
    }
}
