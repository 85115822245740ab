//! Per-client fixed-window rate limiting for form submissions.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::http::HeaderMap;

/// Fixed-window counter keyed by client identity. The window starts at the
/// first submission and resets once it has fully elapsed.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    max: u32,
    window: Duration,
    state: Mutex<HashMap<String, Window>>,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

impl FixedWindowLimiter {
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max: max.max(1),
            window,
            state: Mutex::new(HashMap::new()),
        }
    }

    /// Record one attempt for `key`. `Err` carries the seconds remaining in
    /// the current window.
    pub fn check(&self, key: &str) -> Result<(), u64> {
        let now = Instant::now();
        let mut state = match self.state.lock() {
            Ok(state) => state,
            // A poisoned counter fails open rather than blocking submissions.
            Err(poisoned) => poisoned.into_inner(),
        };
        let window = state.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.count = 0;
        }
        if window.count >= self.max {
            let elapsed = now.duration_since(window.started);
            let remaining = self.window.saturating_sub(elapsed);
            return Err(remaining.as_secs().max(1));
        }
        window.count += 1;
        Ok(())
    }
}

/// Client identity for rate limiting: the first `X-Forwarded-For` hop when
/// present (the original client behind proxies), else the peer address.
pub fn client_ip(headers: &HeaderMap, peer: &str) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| peer.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_the_limit_then_rejects() {
        let limiter = FixedWindowLimiter::new(3, Duration::from_secs(3600));
        assert!(limiter.check("1.2.3.4").is_ok());
        assert!(limiter.check("1.2.3.4").is_ok());
        assert!(limiter.check("1.2.3.4").is_ok());
        let retry = limiter.check("1.2.3.4").expect_err("fourth rejected");
        assert!(retry > 0 && retry <= 3600);
    }

    #[test]
    fn keys_are_independent() {
        let limiter = FixedWindowLimiter::new(1, Duration::from_secs(3600));
        assert!(limiter.check("1.2.3.4").is_ok());
        assert!(limiter.check("5.6.7.8").is_ok());
        assert!(limiter.check("1.2.3.4").is_err());
    }

    #[test]
    fn window_resets_after_it_elapses() {
        let limiter = FixedWindowLimiter::new(1, Duration::from_millis(10));
        assert!(limiter.check("1.2.3.4").is_ok());
        assert!(limiter.check("1.2.3.4").is_err());
        std::thread::sleep(Duration::from_millis(15));
        assert!(limiter.check("1.2.3.4").is_ok());
    }

    #[test]
    fn forwarded_for_uses_the_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            "203.0.113.9, 10.0.0.1".parse().expect("header value"),
        );
        assert_eq!(client_ip(&headers, "10.0.0.2"), "203.0.113.9");
        assert_eq!(client_ip(&HeaderMap::new(), "10.0.0.2"), "10.0.0.2");
    }
}
