use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};

use crate::config::ProviderConfig;
use crate::error::{QuoteError, Result};

use super::request::build_headers;
use super::FetchResult;

/// Status and body of a completed GET, whatever the status.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Seam between the quote client and the network.
#[async_trait]
pub trait QuoteTransport: Send + Sync {
    /// Issue a GET. Only transport-level failures are errors; HTTP statuses are returned.
    async fn get(&self, url: &str) -> FetchResult<HttpResponse>;
}

pub struct HttpTransport {
    client: Client,
    headers: HeaderMap,
}

impl HttpTransport {
    pub fn from_config(provider: &ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(provider.timeout)
            .build()?;
        let headers = build_headers(&provider.headers)?;
        Ok(Self { client, headers })
    }
}

#[async_trait]
impl QuoteTransport for HttpTransport {
    async fn get(&self, url: &str) -> FetchResult<HttpResponse> {
        let response = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|err| QuoteError::network(format!("Request failed: {err}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| QuoteError::network(format!("Failed to read response body: {err}")))?;

        Ok(HttpResponse { status, body })
    }
}
