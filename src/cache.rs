//! Expiring in-memory cache for configuration lookups.
//!
//! Bounded key-value store with per-entry TTL, insertion-order eviction at
//! capacity, and a background sweep task that evicts expired entries nobody
//! reads again. The aggregator keeps one private instance per client; other
//! consumers can build their own with custom limits.

use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::debug;

/// Tuning options for a [`ConfigCache`] instance.
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// TTL applied when `set` is called without one. Zero means never expire.
    pub default_ttl: Duration,
    /// Maximum number of entries held at once.
    pub max_size: usize,
    /// Interval between background sweeps. Zero disables the sweep task.
    pub sweep_interval: Duration,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            default_ttl: Duration::ZERO,
            max_size: 1000,
            sweep_interval: Duration::from_secs(5 * 60),
        }
    }
}

/// One cached value with its expiry metadata.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    stored_at: Instant,
    ttl: Duration,
    /// Insertion sequence number, used to match queue slots on eviction.
    seq: u64,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        !self.ttl.is_zero() && now.duration_since(self.stored_at) > self.ttl
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    /// Insertion order as (seq, key) pairs. Slots whose seq no longer
    /// matches the live entry are stale and skipped during eviction.
    order: VecDeque<(u64, String)>,
    next_seq: u64,
}

impl CacheState {
    /// Evict the oldest-inserted key still present.
    fn evict_oldest(&mut self) {
        while let Some((seq, key)) = self.order.pop_front() {
            if self.entries.get(&key).is_some_and(|entry| entry.seq == seq) {
                self.entries.remove(&key);
                debug!(key = %key, "cache capacity eviction");
                return;
            }
        }
    }

    fn sweep(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        self.order
            .retain(|(seq, key)| matches!(self.entries.get(key), Some(e) if e.seq == *seq));
        before - self.entries.len()
    }
}

/// In-memory TTL cache for parsed configuration values.
pub struct ConfigCache {
    state: Arc<Mutex<CacheState>>,
    options: CacheOptions,
    sweep_task: Mutex<Option<JoinHandle<()>>>,
}

impl ConfigCache {
    /// Create a cache and start its background sweep task.
    ///
    /// Must be called within a Tokio runtime when `sweep_interval` is
    /// non-zero.
    pub fn new(options: CacheOptions) -> Self {
        let state = Arc::new(Mutex::new(CacheState::default()));

        let sweep_task = if options.sweep_interval.is_zero() {
            None
        } else {
            let state = Arc::clone(&state);
            let interval = options.sweep_interval;
            Some(tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                // The first tick completes immediately; skip it.
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    let evicted = state.lock().unwrap().sweep(Instant::now());
                    if evicted > 0 {
                        debug!(evicted, "cache sweep evicted expired entries");
                    }
                }
            }))
        };

        Self {
            state,
            options,
            sweep_task: Mutex::new(sweep_task),
        }
    }

    /// Insert or overwrite a value.
    ///
    /// Passing no TTL applies the instance default. When inserting a new key
    /// at capacity, the oldest-inserted key still present is evicted first.
    /// Overwriting an existing key keeps its original insertion position.
    pub fn set(&self, key: impl Into<String>, value: Value, ttl: Option<Duration>) {
        let key = key.into();
        let ttl = ttl.unwrap_or(self.options.default_ttl);
        let mut state = self.state.lock().unwrap();

        let existing_seq = state.entries.get(&key).map(|entry| entry.seq);
        if existing_seq.is_none() && state.entries.len() >= self.options.max_size {
            state.evict_oldest();
        }

        let seq = match existing_seq {
            Some(seq) => seq,
            None => {
                let seq = state.next_seq;
                state.next_seq += 1;
                state.order.push_back((seq, key.clone()));
                seq
            }
        };

        state.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
                ttl,
                seq,
            },
        );
    }

    /// Look up a value, evicting it if its TTL has elapsed.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut state = self.state.lock().unwrap();
        match state.entries.get(key) {
            Some(entry) if entry.is_expired(Instant::now()) => {
                state.entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    /// Whether a live (non-expired) entry exists, with the same eviction
    /// behavior as [`get`](Self::get).
    pub fn has(&self, key: &str) -> bool {
        let mut state = self.state.lock().unwrap();
        match state.entries.get(key) {
            Some(entry) if entry.is_expired(Instant::now()) => {
                state.entries.remove(key);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Remove an entry. Returns `true` if it was present.
    pub fn delete(&self, key: &str) -> bool {
        self.state.lock().unwrap().entries.remove(key).is_some()
    }

    /// Drop all entries.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        state.entries.clear();
        state.order.clear();
    }

    /// Number of entries currently held (including not-yet-swept expired ones).
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current size and key set, for diagnostics.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock().unwrap();
        CacheStats {
            size: state.entries.len(),
            keys: state.entries.keys().cloned().collect(),
        }
    }

    /// Stop the background sweep and drop all entries. Safe to call more
    /// than once.
    pub fn destroy(&self) {
        if let Some(task) = self.sweep_task.lock().unwrap().take() {
            task.abort();
        }
        self.clear();
    }
}

impl Drop for ConfigCache {
    fn drop(&mut self) {
        if let Some(task) = self.sweep_task.lock().unwrap().take() {
            task.abort();
        }
    }
}

/// Diagnostic snapshot of cache contents.
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
}
