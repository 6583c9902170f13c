use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

#[derive(Debug)]
struct Windows {
    clients: HashMap<String, VecDeque<Instant>>,
    last_sweep: Instant,
}

/// Sliding-window request counter keyed by client address.
///
/// Clients with no request inside the window are dropped once per window, so
/// the table only holds recently active addresses.
#[derive(Debug, Clone)]
pub struct IpRateLimiter {
    windows: Arc<Mutex<Windows>>,
    window: Duration,
    max_requests: usize,
}

impl IpRateLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            windows: Arc::new(Mutex::new(Windows {
                clients: HashMap::new(),
                last_sweep: Instant::now(),
            })),
            window,
            max_requests,
        }
    }

    pub fn allow(&self, client: &str) -> bool {
        self.allow_at(client, Instant::now())
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.windows.lock().clients.len()
    }

    fn allow_at(&self, client: &str, now: Instant) -> bool {
        let mut windows = self.windows.lock();

        if now.saturating_duration_since(windows.last_sweep) >= self.window {
            let window = self.window;
            windows.clients.retain(|_, hits| {
                hits.back()
                    .is_some_and(|last| now.saturating_duration_since(*last) <= window)
            });
            windows.last_sweep = now;
        }

        let hits = windows.clients.entry(client.to_string()).or_default();
        while hits
            .front()
            .is_some_and(|first| now.saturating_duration_since(*first) > self.window)
        {
            hits.pop_front();
        }

        let allowed = hits.len() < self.max_requests;
        if allowed {
            hits.push_back(now);
        } else if hits.is_empty() {
            windows.clients.remove(client);
        }
        allowed
    }
}
