//! Serialized form of the game state.
//!
//! The blob is a JSON envelope `{"state": {...}, "version": N}`. Decoding
//! ignores unknown fields and repairs level/hp invariants.

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::game::GameState;

/// Current blob version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    state: &'a GameState,
    version: u32,
}

#[derive(Deserialize)]
struct Envelope {
    state: GameState,
    #[serde(default)]
    version: u32,
}

/// Serialize `state` into a blob.
pub fn encode(state: &GameState) -> Result<String, StorageError> {
    let envelope = EnvelopeRef {
        state,
        version: SNAPSHOT_VERSION,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Parse a blob written by [`encode`] (or an older version of it).
///
/// # Errors
/// Returns `Corrupt` for malformed JSON and `UnsupportedVersion` for blobs
/// from a newer format.
pub fn decode(blob: &str) -> Result<GameState, StorageError> {
    let envelope: Envelope = serde_json::from_str(blob)?;
    if envelope.version > SNAPSHOT_VERSION {
        return Err(StorageError::UnsupportedVersion {
            found: envelope.version,
            supported: SNAPSHOT_VERSION,
        });
    }

    let mut state = envelope.state;
    let repaired = state.normalize();
    if repaired > 0 {
        tracing::warn!(repaired, "repaired inconsistent fields in stored game state");
    }
    Ok(state)
}
