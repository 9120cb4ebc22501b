//! Per-user document persistence.
//!
//! A [`DocumentStore`] keeps one JSON document per user id. Writes take a
//! [`SnapshotPatch`]; with `merge = true` fields absent from the patch are
//! left alone and nested maps are merged key by key.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::StoreError;
use crate::snapshot::{Snapshot, SnapshotPatch};

#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the stored document, `None` when the user has none yet.
    async fn get_document(&self, user_id: &str) -> Result<Option<Snapshot>, StoreError>;

    /// Upsert. `merge = false` replaces the whole document.
    async fn put_document(
        &self,
        user_id: &str,
        patch: &SnapshotPatch,
        merge: bool,
    ) -> Result<(), StoreError>;
}

/// Merge `patch` into `target`. Objects merge recursively; arrays and
/// scalars replace.
pub fn merge_json(target: &mut serde_json::Value, patch: serde_json::Value) {
    match (target, patch) {
        (serde_json::Value::Object(target), serde_json::Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

/// Apply a write to an optional stored body and return the new body.
pub(crate) fn apply_patch(
    stored: Option<serde_json::Value>,
    patch: &SnapshotPatch,
    merge: bool,
) -> Result<serde_json::Value, StoreError> {
    let patch = serde_json::to_value(patch)?;
    Ok(match stored {
        Some(mut body) if merge => {
            merge_json(&mut body, patch);
            body
        }
        _ => patch,
    })
}

/// Decode a stored body, rejecting anything but a JSON object.
pub(crate) fn decode(user_id: &str, body: serde_json::Value) -> Result<Snapshot, StoreError> {
    if !body.is_object() {
        return Err(StoreError::Corrupt {
            user_id: user_id.to_string(),
            message: "document is not an object".into(),
        });
    }
    Ok(serde_json::from_value(body)?)
}
