use crate::error::{RecoveryError, Result};
use crate::types::KEY_LEN;
use rand::Rng;
use std::fs;
use std::path::Path;

/// A 512-slot repeating XOR key, built up incrementally by the recovery
/// strategies. Each slot is either a resolved byte value or unresolved.
///
/// The statistical attacks legitimately leave gaps, so `None` is a normal
/// final state for a slot, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    slots: [Option<u8>; KEY_LEN],
}

impl Default for Key {
    fn default() -> Self {
        Self::empty()
    }
}

impl Key {
    /// A key with every slot unresolved.
    pub fn empty() -> Self {
        Self {
            slots: [None; KEY_LEN],
        }
    }

    /// A fully-resolved key from raw bytes.
    pub fn from_bytes(bytes: &[u8; KEY_LEN]) -> Self {
        let mut slots = [None; KEY_LEN];
        for (slot, &b) in slots.iter_mut().zip(bytes.iter()) {
            *slot = Some(b);
        }
        Self { slots }
    }

    /// Generate a fully-resolved key of uniform random bytes.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        let mut bytes = [0u8; KEY_LEN];
        rng.fill(&mut bytes[..]);
        Self::from_bytes(&bytes)
    }

    pub fn get(&self, slot: usize) -> Option<u8> {
        self.slots[slot % KEY_LEN]
    }

    /// Resolve one slot. Later writes overwrite earlier ones; callers
    /// order their writes weakest-evidence-first.
    pub fn resolve(&mut self, slot: usize, value: u8) {
        self.slots[slot % KEY_LEN] = Some(value);
    }

    pub fn resolved_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn unresolved_count(&self) -> usize {
        KEY_LEN - self.resolved_count()
    }

    pub fn is_fully_resolved(&self) -> bool {
        self.resolved_count() == KEY_LEN
    }

    /// Normalize a key derived at ciphertext offset `offset` back to the
    /// canonical zero-offset alignment the cipher always uses:
    /// `canonical[j] = derived[(j - offset) mod KEY_LEN]`.
    pub fn normalized(&self, offset: usize) -> Key {
        let shift = offset % KEY_LEN;
        let mut slots = [None; KEY_LEN];
        for (j, slot) in slots.iter_mut().enumerate() {
            *slot = self.slots[(j + KEY_LEN - shift) % KEY_LEN];
        }
        Self { slots }
    }

    /// XOR `data` against the cycling key, starting at key slot
    /// `start_slot`. Unresolved slots decrypt as 0, so unknown key
    /// regions pass ciphertext through unchanged.
    pub fn xor_cycle(&self, data: &[u8], start_slot: usize) -> Vec<u8> {
        data.iter()
            .enumerate()
            .map(|(i, &b)| b ^ self.slots[(start_slot + i) % KEY_LEN].unwrap_or(0))
            .collect()
    }

    /// Serialize to the storage format: a JSON array of 512 entries,
    /// `null` marking unresolved slots.
    pub fn to_storage_bytes(&self) -> Result<Vec<u8>> {
        let entries: Vec<Option<u8>> = self.slots.to_vec();
        serde_json::to_vec(&entries).map_err(|e| RecoveryError::KeyFormat {
            file: "<memory>".to_string(),
            reason: e.to_string(),
        })
    }

    /// Write the key to disk in the storage format.
    pub fn store<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_storage_bytes()?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Load a key from disk, rejecting anything that is not exactly 512
    /// entries.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().display().to_string();
        let bytes = fs::read(path.as_ref())?;
        let entries: Vec<Option<u8>> =
            serde_json::from_slice(&bytes).map_err(|e| RecoveryError::KeyFormat {
                file: path_str.clone(),
                reason: e.to_string(),
            })?;
        if entries.len() != KEY_LEN {
            return Err(RecoveryError::KeyFormat {
                file: path_str,
                reason: format!("expected {} entries, found {}", KEY_LEN, entries.len()),
            });
        }
        let mut slots = [None; KEY_LEN];
        slots.copy_from_slice(&entries);
        Ok(Self { slots })
    }
}
