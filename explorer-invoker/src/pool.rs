use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tonic::transport::{Channel, ClientTlsConfig, Endpoint};

use crate::error::InvokeError;

const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(2 * 60);
const DEFAULT_CAPACITY: usize = 100;
const DIAL_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct PoolKey {
    pub endpoint: String,
    pub tls: bool,
    pub server_name: Option<String>,
}

struct Entry {
    channel: Channel,
    created_at: Instant,
    last_used: Instant,
}

/// Keyed cache of dialed HTTP/2 channels, swept for TTL/idle expiry before
/// every lookup and LRU-evicted at capacity. See `spec.md` §4.3, "Connection
/// pool". A single `Mutex` guards the map; the pool is never held across an
/// `.await`.
pub struct ChannelPool {
    entries: Mutex<HashMap<PoolKey, Entry>>,
    ttl: Duration,
    idle_timeout: Duration,
    capacity: usize,
}

impl Default for ChannelPool {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: DEFAULT_TTL,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl ChannelPool {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn with_limits(ttl: Duration, idle_timeout: Duration, capacity: usize) -> Self {
        Self { entries: Mutex::new(HashMap::new()), ttl, idle_timeout, capacity }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    #[cfg(test)]
    fn contains(&self, key: &PoolKey) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    pub async fn get_or_connect(&self, key: &PoolKey) -> Result<Channel, InvokeError> {
        self.sweep();

        if let Some(channel) = self.hit(key) {
            return Ok(channel);
        }

        self.make_room();

        let channel = dial(key).await?;
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.clone(), Entry { channel: channel.clone(), created_at: now, last_used: now });
        Ok(channel)
    }

    /// Drops every session's channels; used when a session is torn down.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    fn hit(&self, key: &PoolKey) -> Option<Channel> {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries.get_mut(key)?;
        entry.last_used = Instant::now();
        Some(entry.channel.clone())
    }

    fn sweep(&self) {
        let mut entries = self.entries.lock().unwrap();
        let now = Instant::now();
        let ttl = self.ttl;
        let idle_timeout = self.idle_timeout;
        entries.retain(|_, e| {
            now.duration_since(e.created_at) < ttl && now.duration_since(e.last_used) < idle_timeout
        });
    }

    fn make_room(&self) {
        let mut entries = self.entries.lock().unwrap();
        if entries.len() < self.capacity {
            return;
        }
        if let Some(lru_key) = entries.iter().min_by_key(|(_, e)| e.last_used).map(|(k, _)| k.clone()) {
            entries.remove(&lru_key);
        }
    }
}

async fn dial(key: &PoolKey) -> Result<Channel, InvokeError> {
    let scheme = if key.tls { "https" } else { "http" };
    let uri = format!("{scheme}://{}", key.endpoint);

    let mut builder: Endpoint = Channel::from_shared(uri)
        .map_err(|e| InvokeError::DialFailed(format!("invalid endpoint '{}': {e}", key.endpoint)))?
        .connect_timeout(DIAL_TIMEOUT);

    if key.tls {
        let mut tls = ClientTlsConfig::new().with_enabled_roots();
        if let Some(name) = &key.server_name {
            tls = tls.domain_name(name.clone());
        }
        builder = builder
            .tls_config(tls)
            .map_err(|e| InvokeError::DialFailed(format!("TLS configuration error: {e}")))?;
    }

    builder
        .connect()
        .await
        .map_err(|e| InvokeError::DialFailed(format!("failed to dial '{}': {e}", key.endpoint)))
}
