//! Message channel port

use crate::Result;
use async_trait::async_trait;

/// Producer side of an ordered-per-key, at-least-once message channel.
///
/// The contract requires in-order delivery for all messages sharing one
/// key (a fixed partition-per-key assignment); without it an older update
/// could overwrite a newer store state. The consumer side is wired by the
/// channel adapter, which drives
/// [`UpdateApplier`](crate::consumer::UpdateApplier) per delivered message
/// and acknowledges on success.
#[async_trait]
pub trait UpdateChannel: Send + Sync {
    async fn publish(&self, topic: &str, key: &str, payload: Vec<u8>) -> Result<()>;
}
