//! Per-client sliding-window rate limiter for the pipeline entry point.
//!
//! Each client identity (e.g. a source address) gets a window of request
//! timestamps. Admission drops timestamps older than the window, rejects
//! with a computed retry-after when the window is full, and records the
//! request otherwise. A periodic, interval-gated sweep evicts clients that
//! have been idle for more than twice the window, bounding memory under
//! many distinct clients.
//!
//! The limiter is an injectable component constructed once per process, not
//! a module-level global, and takes its notion of time from a [`Clock`] so
//! tests can drive it deterministically.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Source of "now" for the limiter.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Request admitted and recorded
    Admitted,

    /// Over the limit; the next slot opens after `retry_after`
    Rejected { retry_after: Duration },
}

impl Admission {
    /// Whether the request was admitted.
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

struct LimiterState {
    clients: HashMap<String, VecDeque<Instant>>,
    last_sweep: Instant,
}

/// Sliding-window rate limiter. Default: 5 requests per 60 seconds.
pub struct RateLimiter<C: Clock = SystemClock> {
    state: Mutex<LimiterState>,
    max_requests: usize,
    window: Duration,
    sweep_interval: Duration,
    clock: C,
}

impl RateLimiter<SystemClock> {
    /// Create a limiter on the system clock.
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self::with_clock(max_requests, window, SystemClock)
    }
}

impl Default for RateLimiter<SystemClock> {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(60))
    }
}

impl<C: Clock> RateLimiter<C> {
    /// Create a limiter with an injected clock.
    pub fn with_clock(max_requests: usize, window: Duration, clock: C) -> Self {
        let now = clock.now();
        Self {
            state: Mutex::new(LimiterState {
                clients: HashMap::new(),
                last_sweep: now,
            }),
            max_requests,
            window,
            sweep_interval: window,
            clock,
        }
    }

    /// Check whether `client` may make a request now, recording it if so.
    pub fn check(&self, client: &str) -> Admission {
        let now = self.clock.now();
        let mut state = self.state.lock().unwrap();

        self.maybe_sweep(&mut state, now);

        let log = state.clients.entry(client.to_string()).or_default();

        // Drop timestamps that have fallen outside the window.
        while let Some(&oldest) = log.front() {
            if now.duration_since(oldest) >= self.window {
                log.pop_front();
            } else {
                break;
            }
        }

        if log.len() >= self.max_requests {
            if let Some(&oldest) = log.front() {
                // The oldest request in the window determines when the next
                // slot opens.
                let retry_after = (oldest + self.window).saturating_duration_since(now);
                return Admission::Rejected { retry_after };
            }
        }

        log.push_back(now);
        Admission::Admitted
    }

    /// Number of tracked clients (sweep-dependent).
    pub fn client_count(&self) -> usize {
        self.state.lock().unwrap().clients.len()
    }

    /// Evict clients idle for more than twice the window.
    ///
    /// Interval-gated: runs at most once per window, under the same lock as
    /// the admission path, so the sweep never races a check.
    fn maybe_sweep(&self, state: &mut LimiterState, now: Instant) {
        if now.duration_since(state.last_sweep) < self.sweep_interval {
            return;
        }
        state.last_sweep = now;

        let idle_cutoff = self.window * 2;
        state.clients.retain(|_, log| match log.back() {
            Some(&last) => now.duration_since(last) < idle_cutoff,
            None => false,
        });
    }
}
