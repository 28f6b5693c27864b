use std::time::Duration;

/// Default freshness window of a cached resource.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Per-resource cache configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceOptions {
    /// Key under which the resource is stored; shared by every consumer using it
    pub cache_key: String,
    /// How long a written entry stays fresh
    pub ttl: Duration,
    /// Period of background refreshes; zero disables auto-refresh
    pub refresh_interval: Duration,
    /// Serve stale data immediately and refetch in the background
    pub stale_while_revalidate: bool,
}

impl ResourceOptions {
    /// Options for `cache_key` with default TTL, no auto-refresh and
    /// stale-while-revalidate enabled.
    pub fn new(cache_key: impl Into<String>) -> Self {
        Self {
            cache_key: cache_key.into(),
            ttl: DEFAULT_TTL,
            refresh_interval: Duration::ZERO,
            stale_while_revalidate: true,
        }
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn stale_while_revalidate(mut self, enabled: bool) -> Self {
        self.stale_while_revalidate = enabled;
        self
    }

    /// True when a refresh interval is configured.
    pub fn auto_refresh(&self) -> bool {
        !self.refresh_interval.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ResourceOptions::new("company:9:applications");
        assert_eq!(options.ttl, Duration::from_secs(300));
        assert!(!options.auto_refresh());
        assert!(options.stale_while_revalidate);
    }

    #[test]
    fn test_builder_overrides() {
        let options = ResourceOptions::new("k")
            .ttl(Duration::from_millis(1000))
            .refresh_interval(Duration::from_secs(30))
            .stale_while_revalidate(false);

        assert_eq!(options.ttl, Duration::from_millis(1000));
        assert!(options.auto_refresh());
        assert!(!options.stale_while_revalidate);
    }
}
