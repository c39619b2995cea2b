//! Request pacing and rotating browser identity

use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;
use tracing::info;

/// Realistic desktop browser user agents
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:123.0) Gecko/20100101 Firefox/123.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2.1 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
];

/// Headers sent with every request besides the user agent
const STATIC_HEADERS: &[(&str, &str)] = &[
    ("Accept-Language", "zh-CN,zh;q=0.9,en;q=0.8"),
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
    ),
    ("Accept-Encoding", "gzip, deflate, br"),
    ("Connection", "keep-alive"),
    ("Upgrade-Insecure-Requests", "1"),
    ("Sec-Fetch-Dest", "document"),
    ("Sec-Fetch-Mode", "navigate"),
    ("Sec-Fetch-Site", "none"),
    ("Cache-Control", "max-age=0"),
];

/// Ordered set of request headers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    headers: Vec<(String, String)>,
}

impl HeaderSet {
    /// Create an empty header set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a header (names compare case-insensitively)
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(slot) => slot.1 = value,
            None => self.headers.push((name, value)),
        }
    }

    /// Look up a header value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// User agent, if set
    pub fn user_agent(&self) -> Option<&str> {
        self.get("User-Agent")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

/// Randomized delays and header rotation between network-touching steps
#[derive(Debug, Clone)]
pub struct Throttle {
    min_delay: Duration,
    max_delay: Duration,
    user_agents: Vec<String>,
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(Duration::from_secs(3), Duration::from_secs(10))
    }
}

impl Throttle {
    /// Create a throttle delaying between `min_delay` and `max_delay`; the bounds are ordered
    pub fn new(min_delay: Duration, max_delay: Duration) -> Self {
        let (min_delay, max_delay) = if min_delay <= max_delay {
            (min_delay, max_delay)
        } else {
            (max_delay, min_delay)
        };

        Self {
            min_delay,
            max_delay,
            user_agents: USER_AGENTS.iter().map(|ua| ua.to_string()).collect(),
        }
    }

    /// Throttle that never sleeps
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Replace the user agent pool; an empty pool keeps the built-in one
    pub fn with_user_agents(mut self, user_agents: Vec<String>) -> Self {
        if !user_agents.is_empty() {
            self.user_agents = user_agents;
        }
        self
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Size of the user agent pool
    pub fn user_agent_count(&self) -> usize {
        self.user_agents.len()
    }

    /// Draw a delay uniformly from `[min_delay, max_delay]`
    pub fn next_delay(&self) -> Duration {
        if self.min_delay == self.max_delay {
            return self.min_delay;
        }

        let secs = rand::thread_rng()
            .gen_range(self.min_delay.as_secs_f64()..=self.max_delay.as_secs_f64());
        Duration::try_from_secs_f64(secs).unwrap_or(self.max_delay)
    }

    /// Sleep for a random delay and return it
    pub async fn pause(&self) -> Duration {
        let delay = self.next_delay();
        if !delay.is_zero() {
            info!("Waiting {:.1}s...", delay.as_secs_f64());
            tokio::time::sleep(delay).await;
        }
        delay
    }

    /// Build a header set with a randomly chosen user agent
    pub fn headers(&self) -> HeaderSet {
        let user_agent = self
            .user_agents
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or(USER_AGENTS[0]);

        let mut headers = HeaderSet::new();
        headers.insert("User-Agent", user_agent);
        for (name, value) in STATIC_HEADERS {
            headers.insert(*name, *value);
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_next_delay_within_bounds() {
        let throttle = Throttle::new(Duration::from_millis(100), Duration::from_millis(300));
        for _ in 0..200 {
            let delay = throttle.next_delay();
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(300));
        }
    }

    #[test]
    fn test_bounds_are_ordered() {
        let throttle = Throttle::new(Duration::from_secs(10), Duration::from_secs(3));
        assert_eq!(throttle.min_delay(), Duration::from_secs(3));
        assert_eq!(throttle.max_delay(), Duration::from_secs(10));
    }

    #[test]
    fn test_fixed_delay() {
        let throttle = Throttle::new(Duration::from_secs(2), Duration::from_secs(2));
        assert_eq!(throttle.next_delay(), Duration::from_secs(2));
        assert_eq!(Throttle::disabled().next_delay(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_disabled_pause_returns_immediately() {
        assert_eq!(Throttle::disabled().pause().await, Duration::ZERO);
    }

    #[test]
    fn test_headers_rotate_user_agent_only() {
        let throttle = Throttle::default();
        let mut seen = HashSet::new();

        for _ in 0..200 {
            let headers = throttle.headers();
            assert_eq!(headers.len(), STATIC_HEADERS.len() + 1);
            let user_agent = headers.user_agent().unwrap().to_string();
            assert!(USER_AGENTS.contains(&user_agent.as_str()));
            assert_eq!(headers.get("accept-language"), Some("zh-CN,zh;q=0.9,en;q=0.8"));
            assert_eq!(headers.get("Cache-Control"), Some("max-age=0"));
            seen.insert(user_agent);
        }

        // 200 draws over a pool of 5 hit more than one value
        assert!(seen.len() > 1);
    }

    #[test]
    fn test_custom_user_agent_pool() {
        let throttle = Throttle::disabled().with_user_agents(vec!["test-agent/1.0".to_string()]);
        assert_eq!(throttle.user_agent_count(), 1);
        assert_eq!(throttle.headers().user_agent(), Some("test-agent/1.0"));

        let throttle = Throttle::disabled().with_user_agents(Vec::new());
        assert_eq!(throttle.user_agent_count(), USER_AGENTS.len());
    }

    #[test]
    fn test_header_set_insert_replaces() {
        let mut headers = HeaderSet::new();
        assert!(headers.is_empty());
        headers.insert("Accept", "a");
        headers.insert("accept", "b");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("ACCEPT"), Some("b"));
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec![("Accept", "b")]);
    }
}
