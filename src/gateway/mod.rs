use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::cache::{Clock, QuoteCache, SystemClock};
use crate::config::Config;
use crate::error::{QuoteError, Result};
use crate::fetch::{FetchResult, HttpTransport, QuoteClient, QuoteTransport};
use crate::records::QuoteRecord;

pub mod boundary;

pub use boundary::{
    boundary_channel, BoundaryClient, BoundaryMessage, BoundaryReceiver, BoundaryRequest,
    BoundaryResponse, ErrorEnvelope, QuoteSource,
};

/// Pending requests the boundary channel buffers before senders wait.
pub const BOUNDARY_CAPACITY: usize = 64;

/// Background-side entry point: serve from the cache, otherwise fetch and remember.
pub struct RequestGateway<T = HttpTransport, C = SystemClock> {
    client: QuoteClient<T>,
    cache: Mutex<QuoteCache<C>>,
}

impl RequestGateway<HttpTransport, SystemClock> {
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = QuoteClient::from_config(&config.provider)?;
        let cache = QuoteCache::new(config.cache.freshness);
        Ok(Self::new(client, cache))
    }
}

impl<T: QuoteTransport, C: Clock> RequestGateway<T, C> {
    pub fn new(client: QuoteClient<T>, cache: QuoteCache<C>) -> Self {
        Self {
            client,
            cache: Mutex::new(cache),
        }
    }

    pub fn client(&self) -> &QuoteClient<T> {
        &self.client
    }

    /// Concurrent misses for one symbol each fetch; the last completed write wins.
    pub async fn get_stock_data(&self, symbol: &str) -> FetchResult<QuoteRecord> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(QuoteError::validation("Symbol must not be empty"));
        }

        let cached = self.lock_cache().get(symbol);
        if let Some(record) = cached {
            log::debug!("{symbol}: served from cache");
            return Ok(record);
        }

        let record = self.client.fetch(symbol).await?;
        self.lock_cache().put(symbol, record.clone());
        Ok(record)
    }

    pub async fn respond(&self, request: BoundaryRequest) -> BoundaryResponse {
        match request {
            BoundaryRequest::GetStockData { symbol } => {
                let outcome = self.get_stock_data(&symbol).await;
                if let Err(err) = &outcome {
                    log::error!("Stock data request for {symbol} failed: {err}");
                }
                BoundaryResponse::from(outcome)
            }
        }
    }

    pub fn sweep(&self) -> usize {
        self.lock_cache().sweep()
    }

    pub fn cache_len(&self) -> usize {
        self.lock_cache().len()
    }

    fn lock_cache(&self) -> MutexGuard<'_, QuoteCache<C>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Answer boundary requests until every [`BoundaryClient`] is gone.
pub async fn serve<T, C>(gateway: Arc<RequestGateway<T, C>>, mut requests: BoundaryReceiver)
where
    T: QuoteTransport + 'static,
    C: Clock + 'static,
{
    while let Some(BoundaryMessage { request, reply }) = requests.recv().await {
        let gateway = Arc::clone(&gateway);
        tokio::spawn(async move {
            let response = gateway.respond(request).await;
            if reply.send(response).is_err() {
                log::warn!("Page context went away before its reply was ready");
            }
        });
    }
    log::info!("Boundary channel closed, background context stopping");
}

/// Periodically evict stale cache entries for as long as the task lives.
pub fn spawn_sweeper<T, C>(gateway: Arc<RequestGateway<T, C>>, period: Duration) -> JoinHandle<()>
where
    T: QuoteTransport + 'static,
    C: Clock + 'static,
{
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let removed = gateway.sweep();
            if removed > 0 {
                log::debug!("Cache sweep removed {removed} stale entries");
            }
        }
    })
}

/// Running background context: serve loop plus sweeper.
pub struct BackgroundHandle {
    client: BoundaryClient,
    server: JoinHandle<()>,
    sweeper: JoinHandle<()>,
}

impl BackgroundHandle {
    pub fn client(&self) -> BoundaryClient {
        self.client.clone()
    }

    /// Drop the handle's own sender, wait for the serve loop to drain and stop the sweeper.
    pub async fn shutdown(self) -> Result<()> {
        let BackgroundHandle {
            client,
            server,
            sweeper,
        } = self;
        drop(client);
        sweeper.abort();
        server.await?;
        Ok(())
    }
}

pub fn spawn_background<T, C>(gateway: RequestGateway<T, C>) -> BackgroundHandle
where
    T: QuoteTransport + 'static,
    C: Clock + 'static,
{
    let period = gateway.lock_cache().freshness();
    let gateway = Arc::new(gateway);
    let (client, requests) = boundary_channel(BOUNDARY_CAPACITY);

    let sweeper = spawn_sweeper(Arc::clone(&gateway), period);
    let server = tokio::spawn(serve(gateway, requests));

    BackgroundHandle {
        client,
        server,
        sweeper,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ManualClock, DEFAULT_FRESHNESS};
    use crate::fetch::client::tests::{
        FakeTransport, HISTORY_BODY, HISTORY_URL, QUOTE_BODY, QUOTE_URL,
    };
    use reqwest::StatusCode;
    use std::sync::atomic::Ordering;

    fn gateway_with(
        transport: FakeTransport,
        clock: Arc<ManualClock>,
    ) -> RequestGateway<FakeTransport, Arc<ManualClock>> {
        let client = QuoteClient::with_transport(Config::builtin().provider, transport);
        RequestGateway::new(client, QuoteCache::with_clock(DEFAULT_FRESHNESS, clock))
    }

    fn healthy_transport() -> FakeTransport {
        let transport = FakeTransport::default();
        transport.respond(QUOTE_URL, StatusCode::OK, QUOTE_BODY);
        transport.respond(HISTORY_URL, StatusCode::OK, HISTORY_BODY);
        transport
    }

    fn calls(gateway: &RequestGateway<FakeTransport, Arc<ManualClock>>) -> usize {
        gateway.client().transport().calls.load(Ordering::SeqCst)
    }

    #[tokio::test]
    async fn miss_fetches_then_hit_serves_from_cache() {
        let clock = Arc::new(ManualClock::new());
        let gateway = gateway_with(healthy_transport(), Arc::clone(&clock));

        let first = gateway.get_stock_data("AAPL").await.expect("first fetch");
        assert_eq!(calls(&gateway), 2);

        clock.advance(Duration::from_secs(10));
        let second = gateway.get_stock_data("AAPL").await.expect("cached fetch");
        assert_eq!(first, second);
        assert_eq!(calls(&gateway), 2, "fresh hit must not refetch");

        clock.advance(Duration::from_secs(25));
        gateway.get_stock_data("AAPL").await.expect("refetch");
        assert_eq!(calls(&gateway), 4, "stale entry triggers a new fetch");
    }

    #[tokio::test]
    async fn failed_fetch_is_not_cached() {
        let transport = FakeTransport::default();
        transport.respond(QUOTE_URL, StatusCode::OK, QUOTE_BODY);
        transport.respond(
            HISTORY_URL,
            StatusCode::OK,
            r#"{"chart": {"result": [{"indicators": {"quote": [{"close": [1.0]}]}}]}}"#,
        );
        let gateway = gateway_with(transport, Arc::new(ManualClock::new()));

        let response = gateway
            .respond(BoundaryRequest::GetStockData {
                symbol: "AAPL".to_string(),
            })
            .await;

        let envelope = response.into_result().expect_err("history too short");
        assert_eq!(envelope.error, "Insufficient price data available");
        assert_eq!(
            envelope.details.map(|d| d.request_target),
            Some(HISTORY_URL.to_string())
        );
        assert_eq!(gateway.cache_len(), 0);
    }

    #[tokio::test]
    async fn rejects_blank_symbol() {
        let gateway = gateway_with(healthy_transport(), Arc::new(ManualClock::new()));
        let err = gateway.get_stock_data("  ").await.expect_err("blank symbol");
        assert!(err.is_validation());
        assert_eq!(calls(&gateway), 0);
    }

    #[tokio::test]
    async fn background_context_answers_over_boundary() {
        let gateway = gateway_with(healthy_transport(), Arc::new(ManualClock::new()));
        let background = spawn_background(gateway);
        let client = background.client();

        let record = client.get_stock_data("AAPL").await.expect("quote over boundary");
        assert_eq!(record.symbol, "AAPL");

        let envelope = client
            .get_stock_data("MSFT")
            .await
            .expect_err("no canned response for MSFT");
        assert_eq!(envelope.details.map(|d| d.symbol), Some("MSFT".to_string()));

        drop(client);
        background.shutdown().await.expect("clean shutdown");
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_evicts_on_its_period() {
        let clock = Arc::new(ManualClock::new());
        let gateway = Arc::new(gateway_with(healthy_transport(), Arc::clone(&clock)));
        gateway.get_stock_data("AAPL").await.expect("prime cache");
        assert_eq!(gateway.cache_len(), 1);

        let sweeper = spawn_sweeper(Arc::clone(&gateway), DEFAULT_FRESHNESS);
        clock.advance(Duration::from_secs(31));
        tokio::time::sleep(Duration::from_secs(31)).await;

        assert_eq!(gateway.cache_len(), 0);
        sweeper.abort();
    }
}
