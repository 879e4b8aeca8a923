use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::records::QuoteRecord;

pub mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub data: QuoteRecord,
    pub stored_at: Instant,
}

/// Per-symbol memo of fetched quotes with a fixed freshness window.
///
/// `get` never evicts; stale entries linger until the next [`QuoteCache::sweep`].
pub struct QuoteCache<C = SystemClock> {
    entries: HashMap<String, CacheEntry>,
    freshness: Duration,
    clock: C,
}

impl QuoteCache<SystemClock> {
    pub fn new(freshness: Duration) -> Self {
        Self::with_clock(freshness, SystemClock)
    }
}

impl<C: Clock> QuoteCache<C> {
    pub fn with_clock(freshness: Duration, clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            freshness,
            clock,
        }
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    pub fn get(&self, symbol: &str) -> Option<QuoteRecord> {
        let entry = self.entries.get(symbol)?;
        let age = self.clock.now().saturating_duration_since(entry.stored_at);
        (age < self.freshness).then(|| entry.data.clone())
    }

    pub fn put(&mut self, symbol: &str, record: QuoteRecord) {
        let entry = CacheEntry {
            data: record,
            stored_at: self.clock.now(),
        };
        self.entries.insert(symbol.to_string(), entry);
    }

    /// Drop every entry older than the freshness window and report how many went.
    pub fn sweep(&mut self) -> usize {
        let now = self.clock.now();
        let freshness = self.freshness;
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.stored_at) <= freshness);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
