use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{apply_patch, decode, DocumentStore};
use crate::error::StoreError;
use crate::snapshot::{Snapshot, SnapshotPatch};

/// In-process store. Can be told to fail, which tests use to drive the
/// load-error and save-error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<String, serde_json::Value>>,
    failing: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw document, bypassing the patch encoding.
    pub fn insert_raw(&self, user_id: &str, body: serde_json::Value) {
        self.lock().insert(user_id.to_string(), body);
    }

    pub fn raw(&self, user_id: &str) -> Option<serde_json::Value> {
        self.lock().get(user_id).cloned()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, serde_json::Value>> {
        self.docs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("memory store set to fail".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn get_document(&self, user_id: &str) -> Result<Option<Snapshot>, StoreError> {
        self.check()?;
        let body = self.lock().get(user_id).cloned();
        body.map(|body| decode(user_id, body)).transpose()
    }

    async fn put_document(
        &self,
        user_id: &str,
        patch: &SnapshotPatch,
        merge: bool,
    ) -> Result<(), StoreError> {
        self.check()?;
        let mut docs = self.lock();
        let body = apply_patch(docs.remove(user_id), patch, merge)?;
        docs.insert(user_id.to_string(), body);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
