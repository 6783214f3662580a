use std::time::Duration;

/// Tunables for the SessionManager. Defaults match `spec.md` §4.4: a
/// one-hour session TTL, swept by a cleanup tick every five minutes.
#[derive(Debug, Clone, Copy)]
pub struct SessionManagerConfig {
    pub ttl: Duration,
    pub cleanup_interval: Duration,
}

impl Default for SessionManagerConfig {
    fn default() -> Self {
        Self { ttl: Duration::from_secs(60 * 60), cleanup_interval: Duration::from_secs(5 * 60) }
    }
}
