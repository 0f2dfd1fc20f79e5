use std::sync::Arc;

use dashmap::DashMap;
use tokio::time::{Duration, Instant, interval};

use crate::metrics::TRACKED_CLIENTS;

// Per-client token bucket with continuous refill.
// Tokens accumulate at `rate` per second up to `burst`; each allowed
// call consumes one. Elapsed time comes from the monotonic clock.
pub struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(burst: u32, now: Instant) -> Self {
        Self {
            tokens: burst as f64,
            last_refill: now,
        }
    }

    fn allow(&mut self, rate: f64, burst: u32, now: Instant) -> bool {
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * rate).min(burst as f64);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            return true;
        }

        false
    }
}

// Bucket + when the client last called, allowed or not
struct ClientEntry {
    bucket: TokenBucket,
    last_seen: Instant,
}

// Per-client limiter registry. Shared between the request handlers and
// the background sweeper; all mutation goes through the map's own locks.
pub struct ClientRegistry {
    clients: DashMap<String, ClientEntry>,
    rate: f64, // tokens per second
    burst: u32,
    idle_timeout: Duration,
}

impl ClientRegistry {
    pub fn new(requests_per_minute: u32, burst: u32, idle_timeout: Duration) -> Self {
        Self {
            clients: DashMap::new(),
            rate: requests_per_minute as f64 / 60.0,
            burst,
            idle_timeout,
        }
    }

    // Check one call for `id`. Creates the bucket on first sight (the
    // entry API guarantees a single bucket per id under concurrent
    // calls) and refreshes last_seen even when the call is denied.
    pub fn allow(&self, id: &str) -> bool {
        let now = Instant::now();

        let mut entry = self
            .clients
            .entry(id.to_string())
            .or_insert_with(|| ClientEntry {
                bucket: TokenBucket::new(self.burst, now),
                last_seen: now,
            });

        entry.last_seen = now;
        entry.bucket.allow(self.rate, self.burst, now)
    }

    // One sweep cycle: drop every client idle longer than the timeout,
    // measured against the cycle's start time. Holds the map locks only
    // for the scan itself.
    pub fn sweep(&self) {
        let now = Instant::now();
        let idle_timeout = self.idle_timeout;

        let before = self.tracked();
        self.clients
            .retain(|_, entry| now.duration_since(entry.last_seen) <= idle_timeout);

        let evicted = before.saturating_sub(self.tracked());
        if evicted > 0 {
            tracing::debug!("Swept {} idle clients", evicted);
        }
        TRACKED_CLIENTS.set(self.tracked() as f64);
    }

    pub fn tracked(&self) -> usize {
        self.clients.len()
    }
}

// Background sweeper - runs one sweep per period for the process lifetime
pub async fn sweeper(registry: Arc<ClientRegistry>, period: Duration) {
    let mut ticker = interval(period);

    tracing::info!("Client sweeper started (period: {:?})", period);

    loop {
        ticker.tick().await;
        registry.sweep();
    }
}
