use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use dashmap::DashMap;
use parking_lot::Mutex;

/// Weighted sliding window: the previous window's count decays linearly as
/// the current window progresses.
#[derive(Debug)]
struct SlidingWindow {
    window_size: Duration,
    limit: u64,
    current_window_start: Instant,
    current_count: u64,
    prev_count: u64,
    last_seen: Instant,
}

impl SlidingWindow {
    fn new(window_size: Duration, limit: u64, now: Instant) -> Self {
        Self {
            window_size,
            limit,
            current_window_start: now,
            current_count: 0,
            prev_count: 0,
            last_seen: now,
        }
    }

    fn roll(&mut self, now: Instant) {
        let elapsed = now.duration_since(self.current_window_start);
        if elapsed >= self.window_size * 2 {
            self.prev_count = 0;
            self.current_count = 0;
            self.current_window_start = now;
        } else if elapsed >= self.window_size {
            self.prev_count = self.current_count;
            self.current_count = 0;
            self.current_window_start += self.window_size;
        }
    }

    fn effective(&self, now: Instant) -> f64 {
        let elapsed = now.duration_since(self.current_window_start);
        let weight = (elapsed.as_secs_f64() / self.window_size.as_secs_f64()).min(1.0);
        (self.prev_count as f64) * (1.0 - weight) + (self.current_count as f64)
    }

    /// Counts an attempt if the window has room. On refusal returns the
    /// seconds until the current window closes.
    fn allow(&mut self, now: Instant) -> Result<(), u64> {
        self.last_seen = now;
        self.roll(now);

        if self.effective(now) < self.limit as f64 {
            self.current_count += 1;
            Ok(())
        } else {
            let closes = self.current_window_start + self.window_size;
            Err(closes.saturating_duration_since(now).as_secs().max(1))
        }
    }
}

/// Per-key attempt throttle for credential checks.
#[derive(Clone)]
pub struct AttemptLimiter {
    map: Arc<DashMap<String, Arc<Mutex<SlidingWindow>>>>,
    window_size: Duration,
    limit: u64,
}

impl AttemptLimiter {
    pub fn new(limit: u64, window_size: Duration) -> Self {
        Self {
            map: Arc::new(DashMap::new()),
            window_size,
            limit,
        }
    }

    fn window(&self, key: &str, now: Instant) -> Arc<Mutex<SlidingWindow>> {
        self.map
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SlidingWindow::new(self.window_size, self.limit, now))))
            .clone()
    }

    /// Records an attempt for `key`. `Err(retry_after_secs)` when throttled.
    pub fn check(&self, key: &str) -> Result<(), u64> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<(), u64> {
        let window = self.window(key, now);
        let mut guard = window.lock();
        guard.allow(now)
    }

    /// Forgets all attempts for `key`, e.g. after a successful sign-in.
    pub fn reset(&self, key: &str) {
        self.map.remove(key);
    }

    /// Drops keys idle for two full windows. Returns how many were removed.
    pub fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let ttl = self.window_size * 2;
        let before = self.map.len();
        self.map
            .retain(|_, window| now.duration_since(window.lock().last_seen) <= ttl);
        before - self.map.len()
    }

    pub fn tracked_keys(&self) -> usize {
        self.map.len()
    }
}
