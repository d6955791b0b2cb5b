//! The remote configuration collaborator seam.

use async_trait::async_trait;
use tokio::sync::mpsc;

/// A remote source of raw configuration text.
///
/// The transport behind this trait is out of scope for the core: anything
/// that can return configuration text for a `(data_id, group)` pair and
/// push change notifications qualifies.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Fetch the raw text of one configuration unit.
    async fn fetch(&self, data_id: &str, group: &str) -> anyhow::Result<String>;

    /// Register for change pushes on one configuration unit.
    ///
    /// Each delivery on the returned channel is the full new content of the
    /// unit. Delivery is at-most-once per change; the receiver does not
    /// deduplicate.
    async fn watch(&self, data_id: &str, group: &str) -> anyhow::Result<mpsc::Receiver<String>>;
}
