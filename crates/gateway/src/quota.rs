//! Per-key hourly request quota.
//!
//! A sliding window of request timestamps is kept per API key digest.
//! A request is admitted (and counted) if fewer than `limit` requests
//! fall inside the window; otherwise it is rejected with
//! [`Error::RateLimited`]. A limit of zero disables the quota.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use sr_domain::{Error, Result};

pub struct KeyRegistry {
    limit: u32,
    window: Duration,
    usage: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl KeyRegistry {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            usage: Mutex::new(HashMap::new()),
        }
    }

    /// Admit one request for `key`, recording it on success.
    pub fn admit(&self, key: &str) -> Result<()> {
        self.admit_at(key, Instant::now())
    }

    fn admit_at(&self, key: &str, now: Instant) -> Result<()> {
        if self.limit == 0 {
            return Ok(());
        }
        let mut usage = self.usage.lock();
        let stamps = usage.entry(key.to_owned()).or_default();
        while let Some(front) = stamps.front() {
            if now.duration_since(*front) >= self.window {
                stamps.pop_front();
            } else {
                break;
            }
        }
        if stamps.len() >= self.limit as usize {
            return Err(Error::RateLimited(format!(
                "rate limit of {} requests per hour exceeded",
                self.limit
            )));
        }
        stamps.push_back(now);
        Ok(())
    }
}
