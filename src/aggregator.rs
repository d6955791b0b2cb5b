//! The configuration aggregator: fetch, parse, substitute, merge, cache.
//!
//! One aggregator owns one live configuration tree. Units are loaded
//! strictly sequentially (later units overwrite earlier top-level keys),
//! readers are gated on a one-shot readiness transition, and every applied
//! change invalidates the private lookup cache.

use crate::cache::{CacheOptions, ConfigCache};
use crate::error::{ConfigError, Result};
use crate::merge::shallow_merge;
use crate::options::{ClientOptions, ConfigSelector};
use crate::parser::{self, ConfigFormat};
use crate::placeholder;
use crate::source::ConfigSource;
use serde_json::{Map, Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Cache key for whole-tree lookups.
const ROOT_KEY: &str = "__root__";

/// Cache tuning for the aggregator's private instance.
const CACHE_TTL: Duration = Duration::from_secs(5 * 60);
const CACHE_MAX_SIZE: usize = 100;
const CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(2 * 60);

/// Aggregates remote configuration units into one queryable tree.
///
/// Cloning is cheap; clones share the same aggregate, cache, and readiness
/// state. Must be constructed within a Tokio runtime (the cache sweep and
/// the initial load run as spawned tasks).
#[derive(Clone)]
pub struct ConfigAggregator {
    inner: Arc<Inner>,
}

struct Inner {
    options: ClientOptions,
    source: Arc<dyn ConfigSource>,
    /// The live merged tree. The lock is held across each whole merge, so
    /// readers never observe a partially merged aggregate.
    aggregate: Mutex<Map<String, Value>>,
    cache: ConfigCache,
    ready_tx: watch::Sender<bool>,
    ready_rx: watch::Receiver<bool>,
    /// Bumped after every applied content, for post-readiness change
    /// observers.
    revision_tx: watch::Sender<u64>,
    watch_task: Mutex<Option<JoinHandle<()>>>,
}

impl ConfigAggregator {
    /// Validate options and start the aggregator.
    ///
    /// When a [`ConfigSelector`] is configured, the initial load runs in the
    /// background: a failed initial load is logged and leaves the aggregator
    /// permanently not ready (callers may rebuild it to retry). Without a
    /// selector, nothing is loaded until [`load_all`](Self::load_all) is
    /// called explicitly.
    pub fn new(options: ClientOptions, source: Arc<dyn ConfigSource>) -> Result<Self> {
        options.validate()?;

        info!(
            server = %options.server_addr(),
            namespace = %options.namespace,
            "configuration client initialized"
        );

        let (ready_tx, ready_rx) = watch::channel(false);
        let (revision_tx, _) = watch::channel(0u64);
        let inner = Arc::new(Inner {
            options,
            source,
            aggregate: Mutex::new(Map::new()),
            cache: ConfigCache::new(CacheOptions {
                default_ttl: CACHE_TTL,
                max_size: CACHE_MAX_SIZE,
                sweep_interval: CACHE_SWEEP_INTERVAL,
            }),
            ready_tx,
            ready_rx,
            revision_tx,
            watch_task: Mutex::new(None),
        });

        if inner.options.config.is_some() {
            let inner = Arc::clone(&inner);
            tokio::spawn(async move {
                if let Err(err) = Inner::load_all(inner).await {
                    warn!(error = %err, "initial configuration load failed");
                }
            });
        }

        Ok(Self { inner })
    }

    /// Whether the initial load has completed.
    pub fn is_ready(&self) -> bool {
        *self.inner.ready_rx.borrow()
    }

    /// The whole aggregate tree. Suspends until the aggregator is ready.
    pub async fn get_config(&self) -> Result<Value> {
        self.inner.wait_ready().await;
        self.inner.get_data(None)
    }

    /// One top-level key of the aggregate. Suspends until the aggregator is
    /// ready; absent keys fail with [`ConfigError::NotFound`].
    pub async fn get(&self, key: &str) -> Result<Value> {
        self.inner.wait_ready().await;
        self.inner.get_data(Some(key))
    }

    /// Load the configured units now, in declaration order.
    ///
    /// Unlike the automatic initial load, errors propagate to the caller.
    /// Fails with a validation error when no selector is configured.
    pub async fn load_all(&self) -> Result<()> {
        Inner::load_all(Arc::clone(&self.inner)).await
    }

    /// Observe applied configuration changes as a monotonically increasing
    /// revision counter.
    pub fn subscribe_changes(&self) -> watch::Receiver<u64> {
        self.inner.revision_tx.subscribe()
    }

    /// Diagnostic snapshot of the private lookup cache.
    pub fn cache_stats(&self) -> crate::cache::CacheStats {
        self.inner.cache.stats()
    }

    /// Stop background activity and drop cached state. Idempotent; does not
    /// revert readiness.
    pub fn shutdown(&self) {
        if let Some(task) = self.inner.watch_task.lock().unwrap().take() {
            task.abort();
        }
        self.inner.cache.destroy();
        debug!("configuration aggregator shut down");
    }
}

impl std::fmt::Debug for ConfigAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigAggregator")
            .field("server", &self.inner.options.server_addr())
            .field("namespace", &self.inner.options.namespace)
            .field("ready", &self.is_ready())
            .finish_non_exhaustive()
    }
}

impl Inner {
    /// Suspend until the readiness transition fires.
    ///
    /// If readiness never arrives (failed initial load), the future never
    /// resolves; surfacing the load failure is the constructor caller's
    /// responsibility.
    async fn wait_ready(&self) {
        let mut rx = self.ready_rx.clone();
        if rx.wait_for(|ready| *ready).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Cache-first lookup against the aggregate tree.
    fn get_data(&self, key: Option<&str>) -> Result<Value> {
        let cache_key = key.unwrap_or(ROOT_KEY);
        if let Some(hit) = self.cache.get(cache_key) {
            return Ok(hit);
        }

        // The cache fill happens under the aggregate lock. A concurrent
        // merge invalidates under the same lock, so a reader can never
        // re-insert a pre-merge value after the invalidation ran.
        let aggregate = self.aggregate.lock().unwrap();
        let value = match key {
            Some(key) => aggregate
                .get(key)
                .cloned()
                .ok_or_else(|| ConfigError::not_found(key))?,
            None => Value::Object(aggregate.clone()),
        };
        self.cache.set(cache_key, value.clone(), None);
        Ok(value)
    }

    async fn load_all(self: Arc<Self>) -> Result<()> {
        let Some(selector) = self.options.config.clone() else {
            return Err(ConfigError::missing_option("config"));
        };

        self.load_one(&selector.data_id, &selector.group, selector.format)
            .await?;
        for common in &selector.commons {
            self.load_one(&common.data_id, &common.group, common.format)
                .await?;
        }

        if selector.subscribe {
            Arc::clone(&self).start_watch(&selector).await?;
        }

        self.ready_tx.send_replace(true);
        info!("configuration aggregate ready");
        Ok(())
    }

    /// Fetch one unit and apply its content.
    async fn load_one(
        &self,
        data_id: &str,
        group: &str,
        format: Option<ConfigFormat>,
    ) -> Result<()> {
        let content = self
            .source
            .fetch(data_id, group)
            .await
            .map_err(|err| ConfigError::load_error(data_id, group, err))?;
        if content.is_empty() {
            return Err(ConfigError::load_error(
                data_id,
                group,
                "config content is empty",
            ));
        }

        debug!(data_id, group, "configuration unit fetched");
        self.apply_content(&content, Some(data_id), format);
        Ok(())
    }

    /// Parse, substitute, and merge raw content into the aggregate.
    ///
    /// Parse failures never propagate: an explicitly requested or detected
    /// format that fails falls back to YAML, and a failed YAML parse wraps
    /// the raw text as `{ "content": <raw> }`.
    fn apply_content(&self, content: &str, data_id: Option<&str>, format: Option<ConfigFormat>) {
        let parsed = match format {
            Some(format) => parser::parse(content, format),
            None => parser::auto_parse(content, data_id),
        };

        let value = match parsed {
            Ok(value) => value,
            Err(err) => {
                debug!(error = %err, "parse failed, falling back to YAML");
                match parser::parse(content, ConfigFormat::Yaml) {
                    Ok(value) => value,
                    Err(yaml_err) => {
                        debug!(error = %yaml_err, "YAML fallback failed, wrapping raw content");
                        json!({ "content": content })
                    }
                }
            }
        };

        // Primitive top-level results carry no placeholders worth resolving.
        let value = if self.options.enable_env_vars
            && matches!(value, Value::Object(_) | Value::Array(_))
        {
            placeholder::substitute_env(&value)
        } else {
            value
        };

        let changed = {
            let mut aggregate = self.aggregate.lock().unwrap();
            let changed = if matches!(value, Value::Object(_)) {
                shallow_merge(&mut aggregate, value)
            } else {
                warn!(
                    data_id = data_id.unwrap_or(""),
                    "parsed configuration is not a mapping, nothing to merge"
                );
                false
            };
            // Invalidate while still holding the aggregate lock, so every
            // cache fill racing this merge lands strictly before or strictly
            // after the clear.
            self.cache.clear();
            changed
        };

        if changed {
            self.revision_tx.send_modify(|revision| *revision += 1);
        }
    }

    /// Register for change pushes on the primary unit and apply each
    /// delivery as it arrives.
    async fn start_watch(self: Arc<Self>, selector: &ConfigSelector) -> Result<()> {
        let mut rx = self
            .source
            .watch(&selector.data_id, &selector.group)
            .await
            .map_err(|err| ConfigError::load_error(&selector.data_id, &selector.group, err))?;

        let inner = Arc::clone(&self);
        let data_id = selector.data_id.clone();
        let format = selector.format;
        let task = tokio::spawn(async move {
            while let Some(content) = rx.recv().await {
                debug!(data_id = %data_id, "configuration change pushed");
                inner.apply_content(&content, Some(&data_id), format);
            }
            debug!(data_id = %data_id, "configuration change stream closed");
        });
        *self.watch_task.lock().unwrap() = Some(task);
        Ok(())
    }
}
