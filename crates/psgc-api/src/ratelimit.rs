//! Fixed-window request limiting keyed by client address.
//!
//! One shared [`RateLimiter`] sits in front of the whole router. The
//! window restarts when it expires; there is no sliding behaviour, which
//! keeps the bookkeeping to one counter per address.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::Deserialize;

/// Limiter configuration, deserialised from the server config file.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RateLimitConfig {
  #[serde(default = "default_max_requests")]
  pub max_requests: u32,
  #[serde(default = "default_window_secs")]
  pub window_secs:  u64,
}

fn default_max_requests() -> u32 { 100 }

fn default_window_secs() -> u64 { 15 * 60 }

impl Default for RateLimitConfig {
  fn default() -> Self {
    Self {
      max_requests: default_max_requests(),
      window_secs:  default_window_secs(),
    }
  }
}

struct Window {
  started: Instant,
  count:   u32,
}

pub struct RateLimiter {
  max_requests: u32,
  window:       Duration,
  windows:      Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
  pub fn new(config: RateLimitConfig) -> Self {
    Self {
      max_requests: config.max_requests,
      window:       Duration::from_secs(config.window_secs),
      windows:      Mutex::new(HashMap::new()),
    }
  }

  /// Record a hit for `addr`; returns `false` once the address has
  /// exhausted its window.
  pub fn allow(&self, addr: IpAddr) -> bool {
    let mut windows = self
      .windows
      .lock()
      .unwrap_or_else(PoisonError::into_inner);
    let now = Instant::now();
    let window = windows
      .entry(addr)
      .or_insert(Window { started: now, count: 0 });
    if now.duration_since(window.started) >= self.window {
      window.started = now;
      window.count = 0;
    }
    window.count += 1;
    window.count <= self.max_requests
  }
}

#[cfg(test)]
mod tests {
  use std::net::Ipv4Addr;

  use super::*;

  fn addr(last: u8) -> IpAddr { IpAddr::V4(Ipv4Addr::new(10, 0, 0, last)) }

  #[test]
  fn requests_over_the_window_budget_are_refused() {
    let limiter = RateLimiter::new(RateLimitConfig {
      max_requests: 3,
      window_secs:  60,
    });
    assert!(limiter.allow(addr(1)));
    assert!(limiter.allow(addr(1)));
    assert!(limiter.allow(addr(1)));
    assert!(!limiter.allow(addr(1)));
  }

  #[test]
  fn addresses_have_independent_windows() {
    let limiter = RateLimiter::new(RateLimitConfig {
      max_requests: 1,
      window_secs:  60,
    });
    assert!(limiter.allow(addr(1)));
    assert!(!limiter.allow(addr(1)));
    assert!(limiter.allow(addr(2)));
  }

  #[test]
  fn an_expired_window_restarts_the_count() {
    let limiter = RateLimiter::new(RateLimitConfig {
      max_requests: 1,
      window_secs:  0,
    });
    assert!(limiter.allow(addr(1)));
    // Zero-length window: every request starts a fresh one.
    assert!(limiter.allow(addr(1)));
  }
}
