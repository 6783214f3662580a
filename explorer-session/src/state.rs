use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use explorer_invoker::Invoker;
use explorer_registry::Registry;
use rand::RngCore;

/// Per-client bundle of descriptor registry plus outbound connection pool,
/// identified by an opaque token (`spec.md` §3, "Session").
///
/// `last_used` is an atomic unix-millis timestamp rather than a field behind
/// the map's own lock, so [`super::SessionManager::get`] can bump it while
/// holding only the map's read side — the primitive Open Question 2 in
/// `spec.md` §9 asks implementers to pin down explicitly.
pub struct SessionState {
    pub id: String,
    pub created_at: i64,
    last_used: AtomicI64,
    pub registry: Registry,
    pub invoker: Invoker,
}

impl SessionState {
    pub fn new(id: String) -> Self {
        let now = now_millis();
        Self { id, created_at: now, last_used: AtomicI64::new(now), registry: Registry::new(), invoker: Invoker::new() }
    }

    pub fn last_used(&self) -> i64 {
        self.last_used.load(Ordering::Relaxed)
    }

    pub fn touch(&self) {
        self.last_used.store(now_millis(), Ordering::Relaxed);
    }
}

pub fn now_millis() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).expect("system clock before unix epoch").as_millis() as i64
}

/// A fresh 128-bit, hex-encoded session identifier (`spec.md` §3).
pub fn new_session_id() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
