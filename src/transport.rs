use async_trait::async_trait;

/// Outbound channel that delivers rendered alert messages
///
/// Messages may contain lightweight markup (bold markers, emoji); rendering it is up to the
/// implementation. Implementations must be `Send + Sync` as the dispatcher runs on its own task.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, message: &str) -> anyhow::Result<()>;
}
