//! Remote configuration ingestion and caching core.
//!
//! Fetches raw configuration text from a remote source, detects its format,
//! parses it into a structured value, merges it into a live in-memory tree,
//! substitutes environment placeholders, caches lookups, and notifies
//! consumers when new data arrives.
//!
//! ## Pipeline
//! fetch → detect/parse → substitute → merge → invalidate cache
//!
//! The transport behind the remote source is out of scope: anything
//! implementing [`ConfigSource`] plugs in.
//!
//! ```no_run
//! use remote_config::{ClientOptions, ConfigAggregator, ConfigSelector, ConfigSource};
//! use std::sync::Arc;
//!
//! # async fn example(source: Arc<dyn ConfigSource>) -> remote_config::Result<()> {
//! let options = ClientOptions {
//!     server: "config.internal:8848".to_string(),
//!     namespace: "dev".to_string(),
//!     access_key: "ak".to_string(),
//!     secret_key: "sk".to_string(),
//!     enable_env_vars: true,
//!     config: Some(ConfigSelector::new("app.json").with_subscribe(true)),
//! };
//!
//! let aggregator = ConfigAggregator::new(options, source)?;
//! // Suspends until the initial load completes.
//! let database = aggregator.get("database").await?;
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod cache;
pub mod error;
pub mod merge;
pub mod options;
pub mod parser;
pub mod placeholder;
pub mod source;

pub use aggregator::ConfigAggregator;
pub use cache::{CacheOptions, CacheStats, ConfigCache};
pub use error::{ConfigError, Result};
pub use options::{ClientOptions, CommonConfig, ConfigSelector, DEFAULT_GROUP};
pub use parser::ConfigFormat;
pub use source::ConfigSource;
