use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};

use crate::config::RateLimitConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Per-key counter with window expiry. Kept behind a trait so the
/// in-process map can be swapped for a shared store when the service
/// runs on more than one instance.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increment the counter for `key`, resetting it once `window` has
    /// elapsed since the counter was opened. Returns the count after
    /// the increment.
    async fn increment(&self, key: &str, window: Duration) -> u32;
}

/// Fixed-window counters in a process-local map.
#[derive(Default)]
pub struct InMemoryCounterStore {
    entries: Mutex<HashMap<String, (u32, Instant)>>,
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn increment(&self, key: &str, window: Duration) -> u32 {
        let mut entries = self.entries.lock().expect("counter store poisoned");
        let now = Instant::now();
        // Sweep elapsed windows so the map tracks active clients only.
        entries.retain(|_, (_, opened)| now.duration_since(*opened) < window);
        let entry = entries.entry(key.to_string()).or_insert((0, now));
        entry.0 += 1;
        entry.0
    }
}

/// Fixed-window limiter applied to the auth route group.
pub struct RateLimiter {
    store: Box<dyn CounterStore>,
    window: Duration,
    max_requests: u32,
}

impl RateLimiter {
    pub fn new(store: Box<dyn CounterStore>, config: &RateLimitConfig) -> Self {
        Self {
            store,
            window: Duration::from_secs(config.window_secs),
            max_requests: config.max_requests,
        }
    }

    pub async fn check(&self, key: &str) -> Result<(), ApiError> {
        let count = self.store.increment(key, self.window).await;
        if count > self.max_requests {
            tracing::warn!(%key, count, "rate limit exceeded");
            return Err(ApiError::RateLimited);
        }
        Ok(())
    }
}

/// Client key: the peer address. `x-forwarded-for` is consulted only
/// when `trust_proxy` is set, since a direct client controls the header
/// and could rotate it to reset its counter on every request.
fn client_key(request: &Request, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(forwarded) = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
        {
            if let Some(first) = forwarded.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = client_key(&request, state.config.rate_limit.trust_proxy);
    state.limiter.check(&key).await?;
    Ok(next.run(request).await)
}
