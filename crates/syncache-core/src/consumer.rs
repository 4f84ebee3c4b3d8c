//! Consumer side of the queue-driven policy

use crate::error::{CoordinatorError, Result};
use crate::ports::RecordStore;
use std::sync::Arc;
use syncache_types::{UpdateEnvelope, SCHEMA_VERSION};
use tracing::debug;

/// Applies delivered channel messages to the store.
///
/// The channel adapter calls [`apply`](Self::apply) once per delivered
/// message and acknowledges on `Ok`. An `Err` means the message is logged
/// and skipped, terminally; there is no dead-letter queue. Because the
/// store update is a keyed overwrite, redelivery under at-least-once
/// semantics is idempotent.
pub struct UpdateApplier {
    store: Arc<dyn RecordStore>,
}

impl UpdateApplier {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn apply(&self, payload: &[u8]) -> Result<()> {
        let envelope: UpdateEnvelope = serde_json::from_slice(payload)?;
        if envelope.schema_version != SCHEMA_VERSION {
            return Err(CoordinatorError::Serialization(format!(
                "unsupported envelope schema version {} (expected {})",
                envelope.schema_version, SCHEMA_VERSION
            )));
        }

        let update = envelope.update;
        let record = self.store.update(update.id, &update.name).await?;
        debug!(id = record.id, name = %record.name, "applied channel update");
        Ok(())
    }
}
