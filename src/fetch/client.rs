use crate::config::{ProviderConfig, RequestConfig};
use crate::error::{QuoteError, Result};
use crate::records::QuoteRecord;

use super::decode::{parse_history_payload, parse_quote_payload, QuoteSnapshot};
use super::request::request_target;
use super::transport::{HttpTransport, QuoteTransport};
use super::FetchResult;

/// Fetches and validates the two chart payloads that make up one [`QuoteRecord`].
pub struct QuoteClient<T = HttpTransport> {
    provider: ProviderConfig,
    transport: T,
}

impl QuoteClient<HttpTransport> {
    pub fn from_config(provider: &ProviderConfig) -> Result<Self> {
        let transport = HttpTransport::from_config(provider)?;
        Ok(Self::with_transport(provider.clone(), transport))
    }
}

impl<T: QuoteTransport> QuoteClient<T> {
    pub fn with_transport(provider: ProviderConfig, transport: T) -> Self {
        Self {
            provider,
            transport,
        }
    }

    /// Fetch quote and history concurrently; both must succeed for a record to exist.
    pub async fn fetch(&self, symbol: &str) -> FetchResult<QuoteRecord> {
        let (snapshot, sparkline) =
            futures::try_join!(self.fetch_quote(symbol), self.fetch_history(symbol))?;
        log::debug!(
            "{symbol}: price {:.2}, {} sparkline points",
            snapshot.price,
            sparkline.len()
        );
        Ok(snapshot.into_record(sparkline))
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn quote_target(&self, symbol: &str) -> FetchResult<String> {
        self.target(&self.provider.quote, symbol)
    }

    pub fn history_target(&self, symbol: &str) -> FetchResult<String> {
        self.target(&self.provider.history, symbol)
    }

    async fn fetch_quote(&self, symbol: &str) -> FetchResult<QuoteSnapshot> {
        let target = self.quote_target(symbol)?;
        let outcome = self
            .get_body(&target, "Quote")
            .await
            .and_then(|body| parse_quote_payload(&body));
        outcome.map_err(|err| {
            log::error!("Error fetching quote for {symbol}: {err}");
            err.with_details(symbol, &target)
        })
    }

    async fn fetch_history(&self, symbol: &str) -> FetchResult<Vec<f64>> {
        let target = self.history_target(symbol)?;
        let outcome = self
            .get_body(&target, "Chart")
            .await
            .and_then(|body| parse_history_payload(&body));
        outcome.map_err(|err| {
            log::error!("Error fetching chart for {symbol}: {err}");
            err.with_details(symbol, &target)
        })
    }

    async fn get_body(&self, target: &str, label: &str) -> FetchResult<String> {
        let response = self.transport.get(target).await?;
        if !response.status.is_success() {
            return Err(QuoteError::network(format!(
                "{label} fetch failed: {}",
                response.status
            )));
        }
        log::debug!("{label} response from {target}: {} bytes", response.body.len());
        Ok(response.body)
    }

    fn target(&self, request: &RequestConfig, symbol: &str) -> FetchResult<String> {
        request_target(&self.provider, request, symbol)
            .map_err(|err| err.with_details(symbol, &self.provider.url_template))
    }
}
