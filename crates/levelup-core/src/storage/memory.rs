//! In-memory backend for tests and throwaway sessions.

use std::cell::RefCell;
use std::rc::Rc;

use super::snapshot;
use super::StateStorage;
use crate::error::StorageError;
use crate::game::GameState;

/// Keeps the encoded blob in memory.
///
/// Clones share the same slot, so a test can hand one clone to a store and
/// inspect or reopen through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blob: Rc<RefCell<Option<String>>>,
    saves: Rc<RefCell<usize>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw blob as last saved.
    pub fn blob(&self) -> Option<String> {
        self.blob.borrow().clone()
    }

    /// Replace the raw blob, bypassing encoding.
    pub fn set_blob(&self, blob: impl Into<String>) {
        *self.blob.borrow_mut() = Some(blob.into());
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self) -> Result<Option<GameState>, StorageError> {
        self.blob
            .borrow()
            .as_deref()
            .map(snapshot::decode)
            .transpose()
    }

    fn save(&mut self, state: &GameState) -> Result<(), StorageError> {
        let blob = snapshot::encode(state)?;
        *self.blob.borrow_mut() = Some(blob);
        *self.saves.borrow_mut() += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        *self.blob.borrow_mut() = None;
        Ok(())
    }
}
