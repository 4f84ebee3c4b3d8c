//! Channel message envelope

use crate::RecordPatch;
use serde::{Deserialize, Serialize};

/// Current envelope schema version. Consumers reject anything else.
pub const SCHEMA_VERSION: u32 = 1;

/// Versioned, tagged payload published on the update channel. The schema
/// version rides alongside the patch so a consumer can fail fast on a
/// producer/consumer mismatch instead of misreading the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateEnvelope {
    pub schema_version: u32,
    pub update: RecordPatch,
}

impl UpdateEnvelope {
    pub fn new(update: RecordPatch) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            update,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_current_version() {
        let envelope = UpdateEnvelope::new(RecordPatch {
            id: 7,
            name: "x".to_string(),
        });
        assert_eq!(envelope.schema_version, SCHEMA_VERSION);

        let json = serde_json::to_string(&envelope).unwrap();
        let back: UpdateEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back, envelope);
    }
}
